pub mod admin;
pub mod compositions;
pub mod config;
pub mod guard;

pub use guard::check_guard;
