//! Application services: rendering, provisioning and the repository seams.

pub mod error;
pub mod provision;
pub mod render;
pub mod repos;
