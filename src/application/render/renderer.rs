use std::sync::Arc;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, error, warn};

use crate::application::repos::{LayoutsRepo, ModesRepo, PagesRepo, RepoError};
use crate::cache::RenderCache;
use crate::domain::entities::{ModeRecord, PageRecord};
use crate::domain::types::ModeKind;

use super::compose::compose_layout;
use super::modes::ModeRegistry;
use super::template::TemplateBindings;
use super::types::{RenderError, RenderedDocument};

const SOURCE: &str = "application::render::renderer";

const BYLINE_FORMAT: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [month repr:long] [day], [year] at [hour repr:12]:[minute] [period] UTC"
);

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Prefix markdown bodies with the page title and creation date.
    pub markdown_byline: bool,
}

/// Resolves a page, its mode and its layout, and produces the final document.
///
/// Cloning is cheap; every clone shares the repositories, the registry and
/// the cache.
#[derive(Clone)]
pub struct PageRenderer {
    pages: Arc<dyn PagesRepo>,
    modes: Arc<dyn ModesRepo>,
    layouts: Arc<dyn LayoutsRepo>,
    registry: Arc<ModeRegistry>,
    cache: Option<Arc<RenderCache>>,
    options: RenderOptions,
}

impl PageRenderer {
    pub fn new(
        pages: Arc<dyn PagesRepo>,
        modes: Arc<dyn ModesRepo>,
        layouts: Arc<dyn LayoutsRepo>,
        registry: Arc<ModeRegistry>,
    ) -> Self {
        Self {
            pages,
            modes,
            layouts,
            registry,
            cache: None,
            options: RenderOptions::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<RenderCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cache(&self) -> Option<&Arc<RenderCache>> {
        self.cache.as_ref()
    }

    /// Render the page addressed by `page_id`.
    ///
    /// With a cache attached, the page record is always read first so the
    /// cache key carries its current `updated_at`.
    pub async fn render(&self, page_id: &str) -> Result<RenderedDocument, RenderError> {
        let page = self
            .pages
            .find_page_by_id(page_id)
            .await
            .map_err(|err| repo_failure("find_page_by_id", page_id, err))?
            .ok_or_else(|| {
                debug!(target: SOURCE, page_id, "page not found");
                RenderError::PageNotFound {
                    page_id: page_id.to_string(),
                }
            })?;

        let Some(cache) = self.cache.clone() else {
            return self.render_record(&page).await;
        };

        let renderer = self.clone();
        let updated_at = page.updated_at;
        let id = page.id.clone();
        cache
            .get_or_render(&id, updated_at, move || async move {
                renderer.render_record(&page).await
            })
            .await
    }

    /// Render an already-loaded page record, bypassing the cache.
    pub async fn render_record(&self, page: &PageRecord) -> Result<RenderedDocument, RenderError> {
        let mode = self.resolve_mode(page).await?;
        let layout = self
            .layouts
            .find_layout_by_id(page.layout_id)
            .await
            .map_err(|err| repo_failure("find_layout_by_id", &page.id, err))?
            .ok_or_else(|| {
                error!(
                    target: SOURCE,
                    page_id = %page.id,
                    layout_id = page.layout_id,
                    "page references a missing layout"
                );
                RenderError::BrokenLayoutReference {
                    page_id: page.id.clone(),
                    layout_id: page.layout_id,
                }
            })?;

        let transformed = self.registry.transform(&mode, &page.content).inspect_err(|err| {
            error!(
                target: SOURCE,
                page_id = %page.id,
                mode_id = mode.id,
                mode = %mode.name,
                error = %err,
                "content transformation failed"
            );
        })?;

        let body = if self.options.markdown_byline && mode.name == ModeKind::Markdown.as_str() {
            let mut with_byline = byline(page);
            with_byline.push_str(&transformed);
            with_byline
        } else {
            transformed
        };

        let bindings = TemplateBindings { title: &page.title };
        let document = compose_layout(&layout, &bindings, &body);

        debug!(
            target: SOURCE,
            page_id = %page.id,
            mode = %mode.name,
            layout_id = layout.id,
            bytes = document.len(),
            "page rendered"
        );

        Ok(RenderedDocument {
            body: document,
            last_modified: page.updated_at,
        })
    }

    async fn resolve_mode(&self, page: &PageRecord) -> Result<ModeRecord, RenderError> {
        self.modes
            .find_mode_by_id(page.mode_id)
            .await
            .map_err(|err| repo_failure("find_mode_by_id", &page.id, err))?
            .ok_or_else(|| {
                error!(
                    target: SOURCE,
                    page_id = %page.id,
                    mode_id = page.mode_id,
                    "page references a missing mode"
                );
                RenderError::BrokenModeReference {
                    page_id: page.id.clone(),
                    mode_id: page.mode_id,
                }
            })
    }
}

fn repo_failure(operation: &'static str, page_id: &str, err: RepoError) -> RenderError {
    warn!(
        target: SOURCE,
        operation,
        page_id,
        error = %err,
        "repository lookup failed"
    );
    RenderError::repository_unavailable(format!("{operation} failed: {err}"))
}

fn byline(page: &PageRecord) -> String {
    format!(
        "<h1>{}</h1><h4>{}</h4>",
        page.title,
        format_created_at(page.created_at)
    )
}

fn format_created_at(created_at: OffsetDateTime) -> String {
    created_at
        .to_offset(UtcOffset::UTC)
        .format(BYLINE_FORMAT)
        .unwrap_or_else(|_| created_at.date().to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn created_at_uses_long_form_utc() {
        let formatted = format_created_at(datetime!(2025-06-12 10:33:00 UTC));
        assert_eq!(formatted, "Thu, June 12, 2025 at 10:33 AM UTC");
    }

    #[test]
    fn created_at_is_converted_to_utc() {
        let formatted = format_created_at(datetime!(2025-06-22 20:02:00 -3));
        assert_eq!(formatted, "Sun, June 22, 2025 at 11:02 PM UTC");
    }
}
