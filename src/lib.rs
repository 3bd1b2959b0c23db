//! Dealer contract KPI dashboard: CSV loading, aggregation and reporting

pub mod cli;
pub mod config;
pub mod services;
pub mod tui;
pub mod types;
