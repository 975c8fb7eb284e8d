//! Client amount filter service
//!
//! Takes uploaded spreadsheets, keeps the rows whose amount column exceeds
//! 30,000 and returns the combined rows as JSON or as a formatted workbook.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
