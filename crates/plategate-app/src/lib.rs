//! Application service layer - access gate use case, config, scanning

pub mod app;
pub mod config;
pub mod repository;
pub mod scanner;
