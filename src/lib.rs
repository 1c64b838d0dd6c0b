//! Backend for the healthcare stocks dashboard.
//!
//! Proxies Twelve Data time series and assembles multi-symbol line charts
//! for the browser charting widget.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
