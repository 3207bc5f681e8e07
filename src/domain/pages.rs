//! Page identity and lifecycle rules.

use time::{Duration, OffsetDateTime};

use super::error::DomainError;

const MAX_PAGE_ID_LEN: usize = 128;

/// Validate a user-facing page id (the slug used to address the page).
pub fn validate_page_id(id: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::validation("page id must not be empty"));
    }
    if id.len() > MAX_PAGE_ID_LEN {
        return Err(DomainError::validation(format!(
            "page id must be at most {MAX_PAGE_ID_LEN} bytes"
        )));
    }
    if let Some(ch) = id
        .chars()
        .find(|ch| ch.is_whitespace() || *ch == '/' || ch.is_control())
    {
        return Err(DomainError::validation(format!(
            "page id `{id}` contains invalid character {ch:?}"
        )));
    }
    Ok(())
}

/// Next `updated_at` for a page mutation.
///
/// Clocks may repeat or step backwards; the stored timestamp still has to
/// move forward so render caches keyed on it observe every edit. Storage keeps
/// microsecond precision, hence the minimum step.
pub fn next_updated_at(previous: OffsetDateTime, now: OffsetDateTime) -> OffsetDateTime {
    let now = truncate_to_micros(now);
    let floor = previous + Duration::microseconds(1);
    if now >= floor { now } else { floor }
}

pub fn truncate_to_micros(value: OffsetDateTime) -> OffsetDateTime {
    let micros = value.microsecond();
    value.replace_microsecond(micros).unwrap_or(value)
}
