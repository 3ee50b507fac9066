pub mod config;
pub mod files;

pub use config::Config;
