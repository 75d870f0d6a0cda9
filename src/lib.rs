pub mod app;
pub mod calculator;
pub mod config;
pub mod http;
pub mod session;
pub mod stats;
pub mod utils;
