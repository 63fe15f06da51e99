pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod report;

// Application use cases and their ports, plus the adapters behind them
pub mod app;
pub mod infra;
