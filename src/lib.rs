//! Weather tools backed by the National Weather Service API, with a session
//! context that tracks recent queries and derives threshold alerts.

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod formatters;
pub mod gateway;
pub mod models;
pub mod queries;
pub mod resolver;
pub mod service;

pub use config::Config;
pub use context::SessionContext;
pub use gateway::{Gateway, HttpGateway};
pub use queries::WeatherQueries;
pub use service::Weather;
