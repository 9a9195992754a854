//! DTO modules that bridge services with templates and APIs.

pub mod api;
pub mod appointments;
pub mod calls;
pub mod companies;
pub mod compliance;
pub mod fraud;
pub mod intelligence;
pub mod nurturing;
pub mod operators;
pub mod rejections;
pub mod roleplay;
pub mod schedule;
