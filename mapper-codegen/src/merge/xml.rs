//! Fragment-level merge of mapper XML documents

use std::collections::HashSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::dom::{XmlDocument, XmlNode};
use crate::error::{CodegenError, Result};

/// A direct child of the old root, as a byte range of the old text
#[derive(Debug)]
struct OldChild {
    id: Option<String>,
    /// Start of any comments directly above the element
    start: usize,
    end: usize,
}

fn attribute(element: &BytesStart<'_>, name: &str) -> std::result::Result<Option<String>, String> {
    match element.try_get_attribute(name).map_err(|e| e.to_string())? {
        Some(attr) => Ok(Some(
            attr.unescape_value().map_err(|e| e.to_string())?.into_owned(),
        )),
        None => Ok(None),
    }
}

/// Merge `fresh` into the text of an existing document.
///
/// Old root children whose `id` matches a fresh fragment are replaced by
/// it. Everything else is kept verbatim, in its old order, after the fresh
/// fragments. A different root element or namespace fails the merge.
pub fn merge_xml(existing: &str, fresh: &XmlDocument, file: &str) -> Result<String> {
    let children = scan(existing, fresh).map_err(|reason| CodegenError::MergeError {
        file: file.to_string(),
        reason,
    })?;

    let fresh_ids: HashSet<&str> = fresh.root.elements().filter_map(|e| e.id()).collect();
    let mut merged = fresh.clone();
    for child in children {
        let replaced = child
            .id
            .as_deref()
            .map(|id| fresh_ids.contains(id))
            .unwrap_or(false);
        if !replaced {
            merged
                .root
                .children
                .push(XmlNode::Raw(existing[child.start..child.end].to_string()));
        }
    }
    Ok(merged.render())
}

fn scan(existing: &str, fresh: &XmlDocument) -> std::result::Result<Vec<OldChild>, String> {
    let mut reader = Reader::from_str(existing);
    let mut children = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut pending_comment: Option<usize> = None;
    let mut open: Option<(Option<String>, usize)> = None;

    // a comment not followed by an element is kept on its own
    let detached = |start: usize, end: usize| OldChild {
        id: None,
        start,
        end: start + existing[start..end].trim_end().len(),
    };

    loop {
        let before = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed XML near byte {}: {}", before, e))?;
        let after = reader.buffer_position();

        match event {
            Event::Start(e) if depth == 0 => {
                check_root(&e, fresh)?;
                seen_root = true;
                depth = 1;
            }
            Event::Empty(e) if depth == 0 => {
                check_root(&e, fresh)?;
                seen_root = true;
            }
            Event::Start(e) if depth == 1 => {
                let id = attribute(&e, "id")?;
                open = Some((id, pending_comment.take().unwrap_or(before)));
                depth += 1;
            }
            Event::Empty(e) if depth == 1 => {
                let id = attribute(&e, "id")?;
                children.push(OldChild {
                    id,
                    start: pending_comment.take().unwrap_or(before),
                    end: after,
                });
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                match depth {
                    1 => {
                        if let Some((id, start)) = open.take() {
                            children.push(OldChild { id, start, end: after });
                        }
                    }
                    0 => {
                        if let Some(start) = pending_comment.take() {
                            children.push(detached(start, before));
                        }
                    }
                    _ => {}
                }
            }
            Event::Comment(_) if depth == 1 => {
                pending_comment.get_or_insert(before);
            }
            Event::Text(text) if depth == 1 => {
                // a blank line separates a comment from the next element
                let raw = String::from_utf8_lossy(&text);
                if !raw.trim().is_empty() || raw.matches('\n').count() > 1 {
                    if let Some(start) = pending_comment.take() {
                        children.push(detached(start, before));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err("no root element".to_string());
    }
    Ok(children)
}

fn check_root(root: &BytesStart<'_>, fresh: &XmlDocument) -> std::result::Result<(), String> {
    let name = String::from_utf8_lossy(root.name().as_ref()).into_owned();
    if name != fresh.root.name {
        return Err(format!(
            "root element is <{}>, expected <{}>",
            name, fresh.root.name
        ));
    }
    let namespace = attribute(root, "namespace")?;
    let expected = fresh.root.attribute("namespace");
    if namespace.as_deref() != expected {
        return Err(format!(
            "namespace is {}, expected {}",
            namespace.as_deref().unwrap_or("<none>"),
            expected.unwrap_or("<none>")
        ));
    }
    Ok(())
}
