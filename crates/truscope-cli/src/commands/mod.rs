//! Command implementations.

pub mod batch;
pub mod check;
pub mod config;

pub use self::batch::execute_batch;
pub use self::check::execute_check;
pub use self::config::execute_config;
