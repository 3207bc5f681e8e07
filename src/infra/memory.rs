//! In-process repository used by tests and local demos.
//!
//! All three tables sit behind one lock so reference checks and the writes
//! they guard are atomic, matching the foreign keys of the Postgres schema.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{
    CreatePageParams, LayoutsRepo, ModesRepo, PagesRepo, PagesWriteRepo, ReferenceDataRepo,
    RepoError, UpdatePageParams,
};
use crate::cache::lock::{rw_read, rw_write};
use crate::domain::entities::{LayoutRecord, ModeRecord, PageRecord};
use crate::domain::pages::{next_updated_at, truncate_to_micros, validate_page_id};

const SOURCE: &str = "infra::memory";

type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

#[derive(Default)]
struct Tables {
    modes: BTreeMap<i32, ModeRecord>,
    layouts: BTreeMap<i32, LayoutRecord>,
    pages: BTreeMap<String, PageRecord>,
}

impl Tables {
    fn check_references(&self, mode_id: i32, layout_id: i32) -> Result<(), RepoError> {
        if !self.modes.contains_key(&mode_id) {
            return Err(RepoError::integrity(format!("mode {mode_id} does not exist")));
        }
        if !self.layouts.contains_key(&layout_id) {
            return Err(RepoError::integrity(format!(
                "layout {layout_id} does not exist"
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
    clock: Clock,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::with_clock(OffsetDateTime::now_utc)
    }

    /// Use `clock` for `created_at` and `updated_at` stamps.
    pub fn with_clock<C>(clock: C) -> Self
    where
        C: Fn() -> OffsetDateTime + Send + Sync + 'static,
    {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            clock: Arc::new(clock),
        }
    }

    fn now(&self) -> OffsetDateTime {
        truncate_to_micros((self.clock)())
    }

    /// Insert or replace a page without reference checks.
    ///
    /// Storage engines without foreign keys can hold dangling references;
    /// this lets tests reproduce them.
    pub fn put_page_unchecked(&self, page: PageRecord) {
        rw_write(&self.tables, SOURCE, "put_page_unchecked")
            .pages
            .insert(page.id.clone(), page);
    }
}

fn invalid_id(id: &str) -> Result<(), RepoError> {
    validate_page_id(id).map_err(|err| RepoError::InvalidInput {
        message: err.to_string(),
    })
}

#[async_trait]
impl ModesRepo for InMemoryRepository {
    async fn find_mode_by_id(&self, id: i32) -> Result<Option<ModeRecord>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "find_mode_by_id")
            .modes
            .get(&id)
            .cloned())
    }

    async fn list_modes(&self) -> Result<Vec<ModeRecord>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "list_modes")
            .modes
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LayoutsRepo for InMemoryRepository {
    async fn find_layout_by_id(&self, id: i32) -> Result<Option<LayoutRecord>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "find_layout_by_id")
            .layouts
            .get(&id)
            .cloned())
    }

    async fn list_layouts(&self) -> Result<Vec<LayoutRecord>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "list_layouts")
            .layouts
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PagesRepo for InMemoryRepository {
    async fn find_page_by_id(&self, id: &str) -> Result<Option<PageRecord>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "find_page_by_id")
            .pages
            .get(id)
            .cloned())
    }

    async fn list_page_ids(&self) -> Result<Vec<String>, RepoError> {
        Ok(rw_read(&self.tables, SOURCE, "list_page_ids")
            .pages
            .keys()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PagesWriteRepo for InMemoryRepository {
    async fn create_page(&self, params: CreatePageParams) -> Result<PageRecord, RepoError> {
        invalid_id(&params.id)?;
        let now = self.now();
        let mut tables = rw_write(&self.tables, SOURCE, "create_page");
        if tables.pages.contains_key(&params.id) {
            return Err(RepoError::Duplicate {
                constraint: "pages_pkey".to_string(),
            });
        }
        tables.check_references(params.mode_id, params.layout_id)?;

        let record = PageRecord {
            id: params.id,
            created_at: now,
            updated_at: now,
            mode_id: params.mode_id,
            layout_id: params.layout_id,
            title: params.title,
            content: params.content,
        };
        tables.pages.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_page(&self, params: UpdatePageParams) -> Result<PageRecord, RepoError> {
        let now = self.now();
        let mut tables = rw_write(&self.tables, SOURCE, "update_page");
        tables.check_references(params.mode_id, params.layout_id)?;
        let page = tables.pages.get_mut(&params.id).ok_or(RepoError::NotFound)?;

        page.mode_id = params.mode_id;
        page.layout_id = params.layout_id;
        page.title = params.title;
        page.content = params.content;
        page.updated_at = next_updated_at(page.updated_at, now);
        Ok(page.clone())
    }

    async fn delete_page(&self, id: &str) -> Result<(), RepoError> {
        rw_write(&self.tables, SOURCE, "delete_page")
            .pages
            .remove(id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ReferenceDataRepo for InMemoryRepository {
    async fn insert_mode_if_absent(&self, mode: &ModeRecord) -> Result<bool, RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "insert_mode_if_absent");
        if tables.modes.contains_key(&mode.id) {
            return Ok(false);
        }
        tables.modes.insert(mode.id, mode.clone());
        Ok(true)
    }

    async fn insert_layout_if_absent(&self, layout: &LayoutRecord) -> Result<bool, RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "insert_layout_if_absent");
        if tables.layouts.contains_key(&layout.id) {
            return Ok(false);
        }
        tables.layouts.insert(layout.id, layout.clone());
        Ok(true)
    }

    async fn insert_page_if_absent(&self, page: &PageRecord) -> Result<bool, RepoError> {
        invalid_id(&page.id)?;
        let mut tables = rw_write(&self.tables, SOURCE, "insert_page_if_absent");
        if tables.pages.contains_key(&page.id) {
            return Ok(false);
        }
        tables.check_references(page.mode_id, page.layout_id)?;
        tables.pages.insert(page.id.clone(), page.clone());
        Ok(true)
    }

    async fn replace_layout(&self, layout: &LayoutRecord) -> Result<(), RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "replace_layout");
        let existing = tables
            .layouts
            .get_mut(&layout.id)
            .ok_or(RepoError::NotFound)?;
        existing.header = layout.header.clone();
        existing.footer = layout.footer.clone();
        Ok(())
    }

    async fn delete_mode(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "delete_mode");
        if let Some(page) = tables.pages.values().find(|page| page.mode_id == id) {
            return Err(RepoError::integrity(format!(
                "mode {id} is still referenced by page `{}`",
                page.id
            )));
        }
        tables.modes.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn delete_layout(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = rw_write(&self.tables, SOURCE, "delete_layout");
        if let Some(page) = tables.pages.values().find(|page| page.layout_id == id) {
            return Err(RepoError::integrity(format!(
                "layout {id} is still referenced by page `{}`",
                page.id
            )));
        }
        tables
            .layouts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
