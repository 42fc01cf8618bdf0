pub mod build;
pub mod config;
pub mod editors;
pub mod status;
