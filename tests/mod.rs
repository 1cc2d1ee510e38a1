pub mod dispatch;
pub mod macros;
pub mod types;
