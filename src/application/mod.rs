pub mod app_error;
pub mod use_cases;

pub use app_error::*;
