pub mod client;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod logger;
pub mod models;
pub mod pricing;
pub mod services;
pub mod shutdown;
pub mod web;
