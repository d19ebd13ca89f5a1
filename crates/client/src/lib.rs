//! Native client of the sales dashboard backend.
//!
//! Each module wraps one screen's worth of data: it fetches from the API,
//! keeps the latest list locally and derives totals from it.

pub mod admin;
pub mod api;
pub mod budget;
pub mod config;
pub mod division;
pub mod error;
pub mod export;
pub mod formatters;
pub mod gross_profit;
pub mod sales;
pub mod session;

#[cfg(test)]
mod test_support;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};
