//! Domain entities mirrored from persistent storage.
//!
//! Pages refer to their mode and layout by id only. Modes and layouts never
//! point back at the pages that use them.

use serde::Serialize;
use time::OffsetDateTime;

/// Placeholder inside layout headers replaced by the page title.
///
/// Existing stored layouts embed this exact literal; changing it breaks them.
pub const TITLE_PLACEHOLDER: &str = "%REPLACE_WITH_TITLE_ID%";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeRecord {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutRecord {
    pub id: i32,
    pub header: String,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub id: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub mode_id: i32,
    pub layout_id: i32,
    pub title: String,
    pub content: String,
}
