pub mod greeting;
pub mod health;
pub mod robots;

pub use greeting::{error_page, hello};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use robots::all_robots;
