//! Configuration and request/upstream data types

pub mod config;
pub mod models;
