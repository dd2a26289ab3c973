//! Backend for browsing Mergington High School extracurricular activities
//! and managing their rosters by email address.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod web;

pub use config::Config;
pub use error::AppError;
