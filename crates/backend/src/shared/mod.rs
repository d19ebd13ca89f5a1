pub mod config;
pub mod data;
pub mod error;
pub mod fiscal;
pub mod format;
