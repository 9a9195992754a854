//! Diesel models mirroring the SQLite schema, plus the server configuration.

pub mod appointment;
pub mod call;
pub mod company;
pub mod compliance;
pub mod config;
pub mod fraud;
pub mod intelligence;
pub mod nurturing;
pub mod operator;
pub mod rejection;
pub mod roleplay;
pub mod schedule;
