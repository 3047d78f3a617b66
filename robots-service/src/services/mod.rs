pub mod database;
pub mod error;
pub mod metrics;

pub use database::RobotsDb;
pub use error::RobotsError;
pub use metrics::{get_metrics, init_metrics};
