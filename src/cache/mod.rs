//! Render cache.
//!
//! Memoises rendered documents keyed by `(page id, updated_at)`. Because the
//! key carries the page version, an edit that bumps `updated_at` makes the
//! previous entry unreachable without any explicit invalidation.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! page_limit = 256
//! ```

mod config;
pub(crate) mod lock;
mod store;

pub use config::CacheConfig;
pub use store::{CacheLookup, RenderCache};
