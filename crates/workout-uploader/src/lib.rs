pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod publish;
pub mod workout;

pub use error::{Result, UploaderError};
