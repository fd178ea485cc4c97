//! Domain layer - confusion tables, plate normalization, matching and access policy

pub mod model;
pub mod repository;
pub mod service;
