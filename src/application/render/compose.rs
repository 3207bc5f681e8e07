//! Layout composition: header, body, footer, in that order.

use crate::domain::entities::LayoutRecord;

use super::template::{TemplateBindings, substitute};

/// Concatenate the three parts. No structural validation happens here; see
/// `domain::layouts::lint_layout` for the offline check.
pub fn compose(header: &str, body: &str, footer: &str) -> String {
    let mut document = String::with_capacity(header.len() + body.len() + footer.len());
    document.push_str(header);
    document.push_str(body);
    document.push_str(footer);
    document
}

/// Wrap `body` in `layout`, substituting placeholders in the header only.
pub fn compose_layout(layout: &LayoutRecord, bindings: &TemplateBindings<'_>, body: &str) -> String {
    let header = substitute(&layout.header, bindings);
    compose(&header, body, &layout.footer)
}
