pub mod batchmode;
pub mod config;
pub mod cycle;
pub mod deploy;
pub mod discovery;
pub mod error;
pub mod io;
pub mod lock;
pub mod paths;
pub mod poll;
pub mod strategy;
pub mod trigger;
pub mod types;
pub mod version;

pub use error::{BuildError, Result};
