//! Shared data model and configuration

pub mod config;
pub mod models;
