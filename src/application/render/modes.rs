//! Mode registry: maps a page's mode to the strategy that turns its raw
//! content into an HTML body.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::render::types::RenderError;
use crate::domain::entities::ModeRecord;
use crate::domain::types::ModeKind;

use super::markdown::MarkdownTransformer;
use super::sanitize::Sanitized;

/// Turns raw page content into an HTML body. Implementations must be pure:
/// identical input yields identical output, with no shared mutable state.
pub trait ContentTransformer: Send + Sync {
    fn transform(&self, raw: &str) -> Result<String, RenderError>;
}

/// Trusted HTML, emitted verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTransformer;

impl ContentTransformer for HtmlTransformer {
    fn transform(&self, raw: &str) -> Result<String, RenderError> {
        Ok(raw.to_string())
    }
}

/// Plain text, escaped and wrapped so line breaks and spacing survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTransformer;

impl ContentTransformer for PlainTransformer {
    fn transform(&self, raw: &str) -> Result<String, RenderError> {
        let escaped = escape_html(raw);
        let mut html = String::with_capacity(escaped.len() + 32);
        html.push_str(r#"<pre class="plain-text">"#);
        html.push_str(&escaped);
        html.push_str("</pre>");
        Ok(html)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryOptions {
    /// Clean `html` and `markdown` output with the body sanitiser.
    pub sanitize_html: bool,
}

/// Lookup table from mode name to transformer.
#[derive(Clone, Default)]
pub struct ModeRegistry {
    transformers: HashMap<String, Arc<dyn ContentTransformer>>,
}

impl ModeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the `markdown`, `html` and `plain` transformers.
    pub fn builtin(options: RegistryOptions) -> Self {
        let mut registry = Self::empty();
        registry.register(ModeKind::Plain.as_str(), PlainTransformer);
        if options.sanitize_html {
            registry.register(ModeKind::Markdown.as_str(), Sanitized::new(MarkdownTransformer::new()));
            registry.register(ModeKind::Html.as_str(), Sanitized::new(HtmlTransformer));
        } else {
            registry.register(ModeKind::Markdown.as_str(), MarkdownTransformer::new());
            registry.register(ModeKind::Html.as_str(), HtmlTransformer);
        }
        registry
    }

    /// Register (or replace) the transformer for a mode name.
    pub fn register<T>(&mut self, name: impl Into<String>, transformer: T)
    where
        T: ContentTransformer + 'static,
    {
        self.transformers.insert(name.into(), Arc::new(transformer));
    }

    pub fn supports(&self, name: &str) -> bool {
        self.transformers.contains_key(name)
    }

    pub fn transform(&self, mode: &ModeRecord, raw: &str) -> Result<String, RenderError> {
        let transformer =
            self.transformers
                .get(mode.name.as_str())
                .ok_or_else(|| RenderError::UnknownMode {
                    mode_id: mode.id,
                    name: mode.name.clone(),
                })?;
        transformer.transform(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(id: i32, name: &str) -> ModeRecord {
        ModeRecord {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn html_passes_through_verbatim() {
        let registry = ModeRegistry::builtin(RegistryOptions::default());
        let raw = "\n<h1>QuizBin</h1>\n<p onclick=\"x()\">Welcome</p>\n";
        assert_eq!(registry.transform(&mode(2, "html"), raw).unwrap(), raw);
    }

    #[test]
    fn plain_escapes_and_preserves_whitespace() {
        let registry = ModeRegistry::builtin(RegistryOptions::default());
        let body = registry
            .transform(&mode(3, "plain"), "a < b && \"c\"\n  indented 'd'")
            .unwrap();
        assert_eq!(
            body,
            "<pre class=\"plain-text\">a &lt; b &amp;&amp; &quot;c&quot;\n  indented &#39;d&#39;</pre>"
        );
    }

    #[test]
    fn unknown_mode_name_is_reported_with_id() {
        let registry = ModeRegistry::builtin(RegistryOptions::default());
        let err = registry.transform(&mode(7, "asciidoc"), "= Title").unwrap_err();
        match err {
            RenderError::UnknownMode { mode_id, name } => {
                assert_eq!(mode_id, 7);
                assert_eq!(name, "asciidoc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_transformers_can_be_registered() {
        struct Shout;
        impl ContentTransformer for Shout {
            fn transform(&self, raw: &str) -> Result<String, RenderError> {
                Ok(raw.to_uppercase())
            }
        }

        let mut registry = ModeRegistry::empty();
        assert!(!registry.supports("shout"));
        registry.register("shout", Shout);
        assert!(registry.supports("shout"));
        assert_eq!(registry.transform(&mode(4, "shout"), "hey").unwrap(), "HEY");
    }

    #[test]
    fn sanitising_registry_cleans_html_mode() {
        let registry = ModeRegistry::builtin(RegistryOptions {
            sanitize_html: true,
        });
        let body = registry
            .transform(&mode(2, "html"), "<p>ok</p><script>bad()</script>")
            .unwrap();
        assert_eq!(body, "<p>ok</p>");
    }
}
