//! Placeholder substitution for layout headers.
//!
//! The recognised placeholders are a closed set. Substitution is a single
//! left-to-right pass over the template: inserted values are never scanned
//! again, so a title containing a placeholder token stays literal.

use crate::domain::entities::TITLE_PLACEHOLDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Title,
}

impl Placeholder {
    pub const ALL: [Placeholder; 1] = [Placeholder::Title];

    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Title => TITLE_PLACEHOLDER,
        }
    }
}

/// Values bound to each placeholder for one render.
#[derive(Debug, Clone, Copy)]
pub struct TemplateBindings<'a> {
    pub title: &'a str,
}

impl<'a> TemplateBindings<'a> {
    pub fn value(&self, placeholder: Placeholder) -> &'a str {
        match placeholder {
            Placeholder::Title => self.title,
        }
    }
}

/// Replace every recognised placeholder in `template`. Unrecognised
/// `%...%` text is copied through unchanged.
pub fn substitute(template: &str, bindings: &TemplateBindings<'_>) -> String {
    let mut out = String::with_capacity(template.len() + bindings.title.len());
    let mut rest = template;

    while let Some((offset, placeholder)) = next_placeholder(rest) {
        out.push_str(&rest[..offset]);
        out.push_str(bindings.value(placeholder));
        rest = &rest[offset + placeholder.token().len()..];
    }

    out.push_str(rest);
    out
}

fn next_placeholder(haystack: &str) -> Option<(usize, Placeholder)> {
    Placeholder::ALL
        .into_iter()
        .filter_map(|placeholder| {
            haystack
                .find(placeholder.token())
                .map(|offset| (offset, placeholder))
        })
        .min_by_key(|(offset, _)| *offset)
}
