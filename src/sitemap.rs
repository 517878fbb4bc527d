//! Sitemap document parsing.
//!
//! Reads a [sitemaps.org 0.9](https://www.sitemaps.org/protocol.html) document
//! straight from the response bytes. Every child element of the root becomes one
//! [`SitemapEntry`], regardless of the child's own name, so both `<urlset>` /
//! `<url>` and `<sitemapindex>` / `<sitemap>` documents are accepted.
//!
//! For each child, the first descendant `{ns}loc` and the first descendant
//! `{ns}lastmod` in document order are read. Elements in any other namespace
//! are ignored. Text is returned as written in the document: entity and
//! character references are decoded, whitespace is left alone.

use crate::error::SitemapError;
use crate::models::SitemapEntry;
use quick_xml::NsReader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use tracing::{debug, instrument};

/// Namespace of the Sitemap 0.9 protocol.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    Lastmod,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"loc" => Some(Field::Loc),
            b"lastmod" => Some(Field::Lastmod),
            _ => None,
        }
    }
}

/// Text of the element currently being captured.
#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
    // Only text before the first child element counts.
    child_seen: bool,
}

/// Fields collected for the root child currently open.
#[derive(Debug, Default)]
struct PendingEntry {
    loc: Option<String>,
    lastmod: Option<String>,
}

impl PendingEntry {
    fn wants(&self, field: Field) -> bool {
        match field {
            Field::Loc => self.loc.is_none(),
            Field::Lastmod => self.lastmod.is_none(),
        }
    }

    fn set(&mut self, field: Field, text: String) {
        match field {
            Field::Loc => self.loc = Some(text),
            Field::Lastmod => self.lastmod = Some(text),
        }
    }

    fn finish(self, index: usize) -> Result<SitemapEntry, SitemapError> {
        let url = self.loc.ok_or(SitemapError::MissingElement {
            index,
            element: "loc",
        })?;
        let lastmod = self.lastmod.ok_or(SitemapError::MissingElement {
            index,
            element: "lastmod",
        })?;
        Ok(SitemapEntry {
            url,
            // An empty <lastmod/> carries no date.
            last_modified: (!lastmod.is_empty()).then_some(lastmod),
        })
    }
}

fn in_sitemap_ns(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(n)) if *n == SITEMAP_NS.as_bytes())
}

/// Parse a sitemap document into rows, in document order.
///
/// # Errors
///
/// - [`SitemapError::Xml`] when the reader rejects the bytes (bad syntax,
///   mismatched end tags, undecodable text)
/// - [`SitemapError::Malformed`] when there is no root element, more than one
///   root, stray text outside the root, or the document ends inside an element
/// - [`SitemapError::MissingElement`] when a child of the root has no `loc` or
///   no `lastmod` descendant
///
/// A document is all-or-nothing: on error no rows are returned.
#[instrument(level = "debug", skip_all, fields(bytes = body.len()))]
pub fn parse_sitemap(body: &[u8]) -> Result<Vec<SitemapEntry>, SitemapError> {
    let mut reader = NsReader::from_reader(body);
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut root_closed = false;
    let mut pending: Option<PendingEntry> = None;
    let mut capture: Option<Capture> = None;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let namespaced = in_sitemap_ns(&ns);

        match event {
            Event::Start(e) => {
                if depth == 0 && root_closed {
                    return Err(SitemapError::Malformed(
                        "more than one root element".to_string(),
                    ));
                }
                depth += 1;
                if let Some(c) = capture.as_mut() {
                    c.child_seen = true;
                }
                if depth == 2 {
                    pending = Some(PendingEntry::default());
                } else if depth > 2 && capture.is_none() && namespaced {
                    let field = Field::from_local_name(e.local_name().as_ref());
                    if let (Some(field), Some(p)) = (field, pending.as_ref()) {
                        if p.wants(field) {
                            capture = Some(Capture {
                                field,
                                depth,
                                text: String::new(),
                                child_seen: false,
                            });
                        }
                    }
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    if root_closed {
                        return Err(SitemapError::Malformed(
                            "more than one root element".to_string(),
                        ));
                    }
                    // <urlset/>: a root with no children.
                    root_closed = true;
                } else if depth == 1 {
                    entries.push(PendingEntry::default().finish(entries.len())?);
                } else {
                    if let Some(c) = capture.as_mut() {
                        c.child_seen = true;
                    }
                    if namespaced && capture.is_none() {
                        let field = Field::from_local_name(e.local_name().as_ref());
                        if let (Some(field), Some(p)) = (field, pending.as_mut()) {
                            if p.wants(field) {
                                p.set(field, String::new());
                            }
                        }
                    }
                }
            }
            Event::End(_) => {
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let (Some(c), Some(p)) = (capture.take(), pending.as_mut()) {
                        p.set(c.field, c.text);
                    }
                }
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if let Some(p) = pending.take() {
                        entries.push(p.finish(entries.len())?);
                    }
                } else if depth == 0 {
                    root_closed = true;
                }
            }
            Event::Text(e) => {
                let text = e.decode()?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(SitemapError::Malformed(
                            "text outside the root element".to_string(),
                        ));
                    }
                } else if let Some(c) = capture.as_mut() {
                    if c.depth == depth && !c.child_seen {
                        c.text.push_str(&text);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(c) = capture.as_mut() {
                    if c.depth == depth && !c.child_seen {
                        c.text.push_str(&e.decode()?);
                    }
                }
            }
            Event::GeneralRef(e) => {
                let Some(c) = capture.as_mut() else {
                    continue;
                };
                if c.depth != depth || c.child_seen {
                    continue;
                }
                if let Some(ch) = e.resolve_char_ref()? {
                    c.text.push(ch);
                } else {
                    let name = e.decode()?;
                    match resolve_predefined_entity(&name) {
                        Some(value) => c.text.push_str(value),
                        None => {
                            return Err(SitemapError::Malformed(format!(
                                "unknown entity &{name};"
                            )));
                        }
                    }
                }
            }
            Event::Eof => {
                if depth != 0 {
                    return Err(SitemapError::Malformed(
                        "document ended inside an element".to_string(),
                    ));
                }
                if !root_closed {
                    return Err(SitemapError::Malformed("no root element".to_string()));
                }
                break;
            }
            _ => {}
        }
    }

    debug!(count = entries.len(), "Parsed sitemap entries");
    Ok(entries)
}
