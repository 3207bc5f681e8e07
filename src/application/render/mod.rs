//! Page rendering pipeline.
//!
//! A render resolves the page, its mode and its layout, runs the mode's
//! transformer over the raw content, substitutes the layout header's
//! placeholders and concatenates `header + body + footer`. Every stage is
//! pure; the only await points are repository lookups.

mod compose;
mod markdown;
mod modes;
mod renderer;
mod sanitize;
mod template;
mod types;

pub use compose::{compose, compose_layout};
pub use markdown::MarkdownTransformer;
pub use modes::{
    ContentTransformer, HtmlTransformer, ModeRegistry, PlainTransformer, RegistryOptions,
    escape_html,
};
pub use renderer::{PageRenderer, RenderOptions};
pub use sanitize::Sanitized;
pub use template::{Placeholder, TemplateBindings, substitute};
pub use types::{RenderError, RenderedDocument};
