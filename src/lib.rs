//! Render stored pages through their mode's transformer and their layout.
//!
//! The entry point is [`application::render::PageRenderer`]; storage sits
//! behind the traits in [`application::repos`], with Postgres and in-memory
//! implementations under [`infra`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
