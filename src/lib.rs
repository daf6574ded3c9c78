pub mod ai_provider;
pub mod capture;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod server;
pub mod views;
