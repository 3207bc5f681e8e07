//! Optional HTML sanitisation for page bodies.
//!
//! Off by default: stored content is author-controlled. Operators hosting
//! content from less trusted authors enable `render.sanitize_html`.

use std::borrow::Cow;

use ammonia::Builder as AmmoniaBuilder;

use crate::application::render::types::RenderError;

use super::modes::ContentTransformer;

const FORBIDDEN_STYLE_SUBSTRINGS: [&str; 6] = [
    "expression(",
    "javascript:",
    "vbscript:",
    "-moz-binding",
    "behavior:",
    "behaviour:",
];

pub(crate) fn build_body_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    builder.add_tags(&[
        "section", "figure", "figcaption", "mark", "style", "video", "audio", "source", "picture",
        "track",
    ]);
    builder.rm_clean_content_tags(&["style"]);
    builder.add_generic_attributes(&["class", "id", "style"]);
    builder.add_generic_attribute_prefixes(&["data-"]);
    builder.add_tag_attributes("code", &["class"]);
    builder.add_tag_attributes("pre", &["class"]);
    builder.add_tag_attributes("img", &["width", "height", "loading"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);

    builder.attribute_filter(|_element, attribute, value| {
        if attribute.eq_ignore_ascii_case("style") {
            sanitize_style_attribute(value).map(Cow::Owned)
        } else {
            Some(Cow::Borrowed(value))
        }
    });

    builder
}

fn sanitize_style_attribute(value: &str) -> Option<String> {
    let kept: Vec<&str> = value
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let lower = decl.to_ascii_lowercase();
            !FORBIDDEN_STYLE_SUBSTRINGS
                .iter()
                .any(|needle| lower.contains(needle))
                && !lower.contains("url(")
        })
        .collect();

    (!kept.is_empty()).then(|| kept.join("; "))
}

/// Runs another transformer, then cleans its output.
pub struct Sanitized<T> {
    inner: T,
    sanitizer: AmmoniaBuilder<'static>,
}

impl<T: ContentTransformer> Sanitized<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            sanitizer: build_body_sanitizer(),
        }
    }
}

impl<T: ContentTransformer> ContentTransformer for Sanitized<T> {
    fn transform(&self, raw: &str) -> Result<String, RenderError> {
        let html = self.inner.transform(raw)?;
        Ok(self.sanitizer.clean(&html).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::modes::HtmlTransformer;

    #[test]
    fn style_filter_keeps_safe_rules() {
        assert_eq!(
            sanitize_style_attribute("color: red; padding: 4px;").as_deref(),
            Some("color: red; padding: 4px")
        );
    }

    #[test]
    fn style_filter_drops_script_urls() {
        assert_eq!(
            sanitize_style_attribute("background: url('javascript:alert(1)'); color: red").as_deref(),
            Some("color: red")
        );
        assert_eq!(sanitize_style_attribute("expression(test)"), None);
    }

    #[test]
    fn sanitized_html_strips_scripts_and_handlers() {
        let transformer = Sanitized::new(HtmlTransformer);
        let html = transformer
            .transform(r#"<h1 onclick="x()">Hi</h1><script>alert(1)</script>"#)
            .expect("sanitised");
        assert_eq!(html, "<h1>Hi</h1>");
    }
}
