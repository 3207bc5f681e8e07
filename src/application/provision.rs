//! Idempotent provisioning of modes, layouts and starter pages.
//!
//! Every record is written only when no record with the same id exists, so
//! re-running a seed against a populated store changes nothing. Layouts may
//! optionally be overwritten in place to roll out a revised header.

use time::OffsetDateTime;
use time::macros::datetime;
use tracing::{debug, info};

use crate::application::repos::{ReferenceDataRepo, RepoError};
use crate::domain::entities::{LayoutRecord, ModeRecord, PageRecord};
use crate::domain::types::ModeKind;

const SOURCE: &str = "application::provision";

const QUIZBIN_SEEDED_AT: OffsetDateTime = datetime!(2025-06-22 23:02:00 UTC);

const QUIZBIN_HEADER: &str = r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>%REPLACE_WITH_TITLE_ID%</title>

    <!-- SEO Meta Tags -->
    <meta name="description" content="QuizBin">
    <meta name="keywords" content="QuizBin">
    <meta name="author" content="Randolph Ledesma">
    <meta name="robots" content="index, follow">

    <meta name="theme-color" content="#ffffff">
    <meta http-equiv="X-UA-Compatible" content="IE=edge">

    <link rel="stylesheet" href="https://assets.quizbin.com/normalize.css">
  </head>
  <body>"##;

const QUIZBIN_FOOTER: &str = "</body></html>";

const QUIZBIN_INDEX: &str = "\n<h1>QuizBin</h1>\n<p>Welcome to QuizBin blog</p>\n";

const QUIZBIN_ABOUT: &str = "\n> TODO\n";

/// A set of reference records to provision together.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub modes: Vec<ModeRecord>,
    pub layouts: Vec<LayoutRecord>,
    pub pages: Vec<PageRecord>,
}

/// Modes for every built-in transformer, numbered in declaration order.
pub fn builtin_modes() -> Vec<ModeRecord> {
    ModeKind::ALL
        .iter()
        .zip(1..)
        .map(|(kind, id)| ModeRecord {
            id,
            name: kind.as_str().to_string(),
        })
        .collect()
}

/// The QuizBin site: built-in modes, one layout and two starter pages.
pub fn quizbin_fixture() -> Fixture {
    let page = |id: &str, mode_id: i32, title: &str, content: &str| PageRecord {
        id: id.to_string(),
        created_at: QUIZBIN_SEEDED_AT,
        updated_at: QUIZBIN_SEEDED_AT,
        mode_id,
        layout_id: 1,
        title: title.to_string(),
        content: content.to_string(),
    };

    Fixture {
        modes: builtin_modes(),
        layouts: vec![LayoutRecord {
            id: 1,
            header: QUIZBIN_HEADER.to_string(),
            footer: QUIZBIN_FOOTER.to_string(),
        }],
        pages: vec![
            page("index", 2, "QuizBin", QUIZBIN_INDEX),
            page("about", 1, "About", QUIZBIN_ABOUT),
        ],
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionOptions {
    /// Overwrite layouts that already exist with the fixture's version.
    pub refresh_layouts: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub inserted: usize,
    pub skipped: usize,
    pub refreshed: usize,
}

impl ProvisionReport {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Write `fixture` into `repo`, skipping records whose id is already taken.
///
/// Modes and layouts go first so the pages' references resolve.
pub async fn provision(
    repo: &dyn ReferenceDataRepo,
    fixture: &Fixture,
    options: ProvisionOptions,
) -> Result<ProvisionReport, RepoError> {
    let mut report = ProvisionReport::default();

    for mode in &fixture.modes {
        let inserted = repo.insert_mode_if_absent(mode).await?;
        debug!(target: SOURCE, mode_id = mode.id, inserted, "mode provisioned");
        report.record(inserted);
    }

    for layout in &fixture.layouts {
        let inserted = repo.insert_layout_if_absent(layout).await?;
        if !inserted && options.refresh_layouts {
            repo.replace_layout(layout).await?;
            report.refreshed += 1;
            debug!(target: SOURCE, layout_id = layout.id, "layout refreshed");
            continue;
        }
        debug!(target: SOURCE, layout_id = layout.id, inserted, "layout provisioned");
        report.record(inserted);
    }

    for page in &fixture.pages {
        let inserted = repo.insert_page_if_absent(page).await?;
        debug!(target: SOURCE, page_id = %page.id, inserted, "page provisioned");
        report.record(inserted);
    }

    info!(
        target: SOURCE,
        inserted = report.inserted,
        skipped = report.skipped,
        refreshed = report.refreshed,
        "provisioning finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use crate::domain::layouts::lint_layout;

    use super::*;

    #[test]
    fn builtin_modes_are_numbered_from_one() {
        let modes = builtin_modes();
        let names: Vec<_> = modes.iter().map(|m| (m.id, m.name.as_str())).collect();
        assert_eq!(names, [(1, "markdown"), (2, "html"), (3, "plain")]);
    }

    #[test]
    fn quizbin_layouts_pass_lint() {
        for layout in quizbin_fixture().layouts {
            lint_layout(&layout).expect("bundled layout is balanced");
        }
    }

    #[test]
    fn quizbin_header_keeps_hex_attribute_values() {
        let header = &quizbin_fixture().layouts[0].header;
        assert!(header.contains(r##"<meta name="theme-color" content="#ffffff">"##));
        assert!(header.contains(r#"content="IE=edge""#));
        assert!(header.trim_end().ends_with("<body>"), "{header}");
    }

    #[test]
    fn quizbin_pages_reference_bundled_records() {
        let fixture = quizbin_fixture();
        for page in &fixture.pages {
            assert!(fixture.modes.iter().any(|m| m.id == page.mode_id));
            assert!(fixture.layouts.iter().any(|l| l.id == page.layout_id));
        }
    }
}
