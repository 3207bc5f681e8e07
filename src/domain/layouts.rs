//! Offline lint for layout records.
//!
//! Layouts are operator-authored and wrapped around every rendered body, so a
//! header that opens `<body>` without the footer closing it breaks every page
//! using the layout. The check runs from the `lint-layouts` command, never on
//! the render path.

use quick_xml::Reader;
use quick_xml::events::Event;
use quick_xml::name::QName;

use super::entities::{LayoutRecord, TITLE_PLACEHOLDER};
use super::error::DomainError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Check that the header carries the title placeholder and that header and
/// footer together form a balanced document.
pub fn lint_layout(layout: &LayoutRecord) -> Result<(), DomainError> {
    if !layout.header.contains(TITLE_PLACEHOLDER) {
        return Err(DomainError::validation(format!(
            "layout {} header is missing `{TITLE_PLACEHOLDER}`",
            layout.id
        )));
    }

    let document = format!("{}{}", layout.header, layout.footer);
    check_balanced(&document).map_err(|message| {
        DomainError::invariant(format!("layout {} is unbalanced: {message}", layout.id))
    })
}

/// HTML is not XML, so end-name matching is done here, case-insensitively.
fn create_html_reader(document: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

fn check_balanced(document: &str) -> Result<(), String> {
    let mut reader = create_html_reader(document);
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) => {
                let raw = elem.name().as_ref().to_vec();
                let name = String::from_utf8_lossy(&raw).to_ascii_lowercase();
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    continue;
                }
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    reader
                        .read_to_end(QName(&raw))
                        .map_err(|_| format!("`<{name}>` is never closed"))?;
                    continue;
                }
                open.push(name);
            }
            Ok(Event::End(elem)) => {
                let name = String::from_utf8_lossy(elem.name().as_ref()).to_ascii_lowercase();
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    continue;
                }
                match open.pop() {
                    Some(expected) if expected == name => {}
                    Some(expected) => return Err(format!("`</{name}>` closes `<{expected}>`")),
                    None => return Err(format!("`</{name}>` has no matching open tag")),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "parse error at byte {}: {err}",
                    reader.error_position()
                ));
            }
        }
    }

    match open.pop() {
        Some(name) => Err(format!("`<{name}>` is never closed")),
        None => Ok(()),
    }
}
