pub mod api;
pub mod bot;
pub mod chart;
pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod parser;
pub mod telegram;

pub use error::{Error, Result};

// Declare tests module only when testing
#[cfg(test)]
pub mod tests;
