//! Single-flight render cache.
//!
//! Each page id owns at most one slot. A slot holds the `updated_at` it was
//! rendered for and a shared handle to the render, which is either still
//! running or already resolved. Concurrent callers asking for the same
//! version clone the handle and await the same result.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use metrics::counter;
use time::OffsetDateTime;
use tracing::debug;

use crate::application::render::{RenderError, RenderedDocument};

use super::config::CacheConfig;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

type SharedRender = Shared<BoxFuture<'static, Result<RenderedDocument, RenderError>>>;

struct Slot {
    updated_at: OffsetDateTime,
    generation: u64,
    render: SharedRender,
}

/// How a `get_or_render` call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// A finished document for this version was stored.
    Hit,
    /// A render for this version was already running; the caller joined it.
    Coalesced,
    /// No usable entry; this caller started the render.
    Miss,
    /// The caller holds an older version than the cached one and rendered
    /// without touching the cache.
    Bypass,
}

impl CacheLookup {
    fn metric(self) -> &'static str {
        match self {
            CacheLookup::Hit => "quire_render_cache_hit_total",
            CacheLookup::Coalesced => "quire_render_cache_coalesced_total",
            CacheLookup::Miss => "quire_render_cache_miss_total",
            CacheLookup::Bypass => "quire_render_cache_bypass_total",
        }
    }
}

enum Lookup<Fut> {
    Joined(SharedRender, CacheLookup),
    Bypass(Fut),
}

type Slots = Arc<Mutex<LruCache<String, Slot>>>;

pub struct RenderCache {
    slots: Slots,
    generation: AtomicU64,
}

impl RenderCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            slots: Arc::new(Mutex::new(LruCache::new(config.page_limit_non_zero()))),
            generation: AtomicU64::new(0),
        }
    }

    /// Return the document for `page_id` at version `updated_at`, calling
    /// `render` only when no render for that exact version exists yet.
    ///
    /// The render runs on its own task: a caller that stops awaiting does not
    /// cancel it for the others. A failed render removes its own slot when it
    /// finishes, even if every caller has gone, so the next call retries.
    pub async fn get_or_render<F, Fut>(
        &self,
        page_id: &str,
        updated_at: OffsetDateTime,
        render: F,
    ) -> Result<RenderedDocument, RenderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RenderedDocument, RenderError>> + Send + 'static,
    {
        let lookup = {
            let mut slots = mutex_lock(&self.slots, SOURCE, "get_or_render");
            let existing = slots.get(page_id).map(|slot| {
                let finished = slot.render.peek().is_some();
                (slot.updated_at, slot.render.clone(), finished)
            });
            match existing {
                Some((cached_at, shared, finished)) if cached_at == updated_at => {
                    let kind = if finished {
                        CacheLookup::Hit
                    } else {
                        CacheLookup::Coalesced
                    };
                    Lookup::Joined(shared, kind)
                }
                Some((cached_at, ..)) if cached_at > updated_at => Lookup::Bypass(render()),
                _ => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                    let shared = spawn_render(
                        render(),
                        Arc::clone(&self.slots),
                        page_id.to_string(),
                        generation,
                    );
                    let slot = Slot {
                        updated_at,
                        generation,
                        render: shared.clone(),
                    };
                    if let Some((evicted, _)) = slots.push(page_id.to_string(), slot) {
                        let reason = if evicted == page_id { "stale" } else { "capacity" };
                        counter!("quire_render_cache_evict_total", "reason" => reason)
                            .increment(1);
                    }
                    Lookup::Joined(shared, CacheLookup::Miss)
                }
            }
        };

        let (shared, kind) = match lookup {
            Lookup::Joined(shared, kind) => (shared, kind),
            Lookup::Bypass(fut) => {
                counter!(CacheLookup::Bypass.metric()).increment(1);
                debug!(target: SOURCE, page_id, "render cache holds a newer version; bypassing");
                return fut.await;
            }
        };

        counter!(kind.metric()).increment(1);
        debug!(target: SOURCE, page_id, lookup = ?kind, "render cache lookup");

        shared.await
    }

    /// `updated_at` of the entry currently held for `page_id`.
    pub fn cached_version(&self, page_id: &str) -> Option<OffsetDateTime> {
        mutex_lock(&self.slots, SOURCE, "cached_version")
            .peek(page_id)
            .map(|slot| slot.updated_at)
    }

    pub fn invalidate(&self, page_id: &str) {
        mutex_lock(&self.slots, SOURCE, "invalidate").pop(page_id);
    }

    /// Drop every entry. Needed after a layout is replaced, since that does
    /// not change any page's `updated_at`.
    pub fn invalidate_all(&self) {
        mutex_lock(&self.slots, SOURCE, "invalidate_all").clear();
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.slots, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop the slot for `page_id` if it still belongs to `generation`; a newer
/// render that replaced it is left alone.
fn forget(slots: &Mutex<LruCache<String, Slot>>, page_id: &str, generation: u64) {
    let mut slots = mutex_lock(slots, SOURCE, "forget");
    let current = slots.peek(page_id).map(|slot| slot.generation);
    if current == Some(generation) {
        slots.pop(page_id);
    }
}

fn spawn_render<Fut>(fut: Fut, slots: Slots, page_id: String, generation: u64) -> SharedRender
where
    Fut: Future<Output = Result<RenderedDocument, RenderError>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let result = AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(RenderError::aborted("render task panicked")));
        if result.is_err() {
            forget(&slots, &page_id, generation);
        }
        result
    });
    async move {
        handle
            .await
            .unwrap_or_else(|err| Err(RenderError::aborted(err.to_string())))
    }
    .boxed()
    .shared()
}
