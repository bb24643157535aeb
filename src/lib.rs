pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod history;
pub mod render;
pub mod session;
pub mod smoke;
pub mod table;

pub use config::SmokeConfig;
pub use dataset::Person;
pub use session::Session;
pub use smoke::{run, run_to, SmokeReport};
