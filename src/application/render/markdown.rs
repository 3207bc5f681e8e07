use comrak::options::Options;
use comrak::{Arena, format_html, parse_document};
use once_cell::sync::Lazy;

use crate::application::render::types::RenderError;
use crate::domain::types::ModeKind;

use super::modes::ContentTransformer;

static DEFAULT_OPTIONS: Lazy<Options<'static>> = Lazy::new(default_options);

/// CommonMark plus the GFM extensions authors expect.
///
/// Raw HTML inside markdown is emitted as written: page authors are trusted
/// the same way `html` mode content is. Fenced code keeps its info string as
/// a `language-*` class and its body is escaped, never interpreted.
pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;

    let render = &mut options.render;
    render.r#unsafe = true;
    render.sourcepos = false;

    options
}

pub struct MarkdownTransformer {
    options: &'static Options<'static>,
}

impl MarkdownTransformer {
    pub fn new() -> Self {
        Self {
            options: &DEFAULT_OPTIONS,
        }
    }
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTransformer for MarkdownTransformer {
    fn transform(&self, raw: &str) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, raw, self.options);

        let mut html = String::with_capacity(raw.len() + raw.len() / 2);
        format_html(root, self.options, &mut html).map_err(|err| RenderError::Transform {
            mode: ModeKind::Markdown.to_string(),
            message: err.to_string(),
        })?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        MarkdownTransformer::new()
            .transform(markdown)
            .expect("markdown renders")
    }

    #[test]
    fn renders_headings_and_emphasis() {
        let html = render("# Title\n\nSome *emphasis* and **strong** text.\n");
        assert!(html.contains("<h1>Title</h1>"), "{html}");
        assert!(html.contains("<em>emphasis</em>"), "{html}");
        assert!(html.contains("<strong>strong</strong>"), "{html}");
    }

    #[test]
    fn renders_links_and_blockquotes() {
        let html = render("> quoted [link](https://example.com)\n");
        assert!(html.contains("<blockquote>"), "{html}");
        assert!(
            html.contains(r#"<a href="https://example.com">link</a>"#),
            "{html}"
        );
    }

    #[test]
    fn fenced_code_keeps_language_and_literal_content() {
        let html = render("```cpp\n#include <iostream>\n# not a heading *nor emphasis*\n```\n");
        assert!(html.contains(r#"<code class="language-cpp">"#), "{html}");
        assert!(html.contains("#include &lt;iostream&gt;"), "{html}");
        assert!(html.contains("# not a heading *nor emphasis*"), "{html}");
        assert!(!html.contains("<h1>"), "{html}");
        assert!(!html.contains("<em>"), "{html}");
    }

    #[test]
    fn empty_input_renders_empty_body() {
        assert_eq!(render(""), "");
    }
}
