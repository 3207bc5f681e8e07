//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod layouts;
pub mod pages;
pub mod types;
