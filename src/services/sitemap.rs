// src/services/sitemap.rs

//! Sitemap reader.
//!
//! Extracts the `<loc>` of every `<url>` entry of a `<urlset>` document in
//! document order. Other child elements (`lastmod`, `changefreq`, image
//! extensions, ...) are ignored.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{AppError, Result};

/// Read the sitemap at `path`.
pub fn read_sitemap(path: &Path) -> Result<Vec<String>> {
    let source_name = path.display().to_string();
    let xml = fs::read_to_string(path).map_err(|e| AppError::sitemap(&source_name, e))?;
    parse_sitemap(&xml, &source_name)
}

/// Parse a sitemap document held in memory.
///
/// `source_name` only labels errors.
pub fn parse_sitemap(xml: &str, source_name: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut urls = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut entry: Option<Option<String>> = None;
    let mut loc_text: Option<String> = None;

    let fail = |message: String| AppError::sitemap(source_name, message);

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            fail(format!(
                "malformed XML at byte {}: {}",
                reader.error_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                let name = e.local_name();
                let name = name.as_ref();
                match depth {
                    0 => {
                        check_root(name, seen_root).map_err(&fail)?;
                        seen_root = true;
                    }
                    1 if name == b"url" => entry = Some(None),
                    2 if name == b"loc" && entry.is_some() => loc_text = Some(String::new()),
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(ref e) => {
                let name = e.local_name();
                let name = name.as_ref();
                match depth {
                    0 => {
                        check_root(name, seen_root).map_err(&fail)?;
                        seen_root = true;
                    }
                    1 if name == b"url" => {
                        return Err(fail(format!("url entry #{} has no <loc>", urls.len() + 1)));
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if let Some(text) = loc_text.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| fail(format!("bad escape in <loc>: {err}")))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(ref e) => {
                if let Some(text) = loc_text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                let name = e.local_name();
                match (depth, name.as_ref()) {
                    (2, b"loc") => {
                        if let (Some(slot), Some(text)) = (entry.as_mut(), loc_text.take()) {
                            *slot = Some(text.trim().to_string());
                        }
                    }
                    (1, b"url") => match entry.take().flatten() {
                        Some(loc) if !loc.is_empty() => urls.push(loc),
                        _ => {
                            return Err(fail(format!(
                                "url entry #{} has no <loc>",
                                urls.len() + 1
                            )));
                        }
                    },
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(fail("document has no <urlset> root".to_string()));
    }
    if depth != 0 {
        return Err(fail("unexpected end of document".to_string()));
    }

    log::debug!("Parsed {} URLs from {}", urls.len(), source_name);
    Ok(urls)
}

fn check_root(name: &[u8], seen_root: bool) -> std::result::Result<(), String> {
    if seen_root {
        return Err("more than one root element".to_string());
    }
    if name != b"urlset" {
        return Err(format!(
            "expected <urlset> root, found <{}>",
            String::from_utf8_lossy(name)
        ));
    }
    Ok(())
}
