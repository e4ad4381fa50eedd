// crates/svgdata-core/src/parse.rs
//
// quick-xml 0.38 decoder for SVG documents.
// - Every element must resolve to the registry's namespace
// - Elements are built through the registry; unknown tags fall back to a
//   passthrough node that keeps tag, attributes and children
// - Modeled attributes are consumed by the element decoder, the rest are
//   preserved verbatim
//
// Text policy:
// - Text, CDATA and entity references are accumulated per element
// - Whitespace-only text is formatting and is dropped when the element closes

use quick_xml::NsReader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::ResolveResult;
use std::str;
use tracing::{debug, trace, warn};

use crate::attrs::AttrMap;
use crate::model::Node;
use crate::path::PathError;
use crate::registry::Registry;
use crate::units::LengthError;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("utf8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    #[error("element <{element}> is outside the {expected} namespace (found {found:?})")]
    Namespace {
        element: String,
        expected: String,
        found: Option<String>,
    },

    #[error("undeclared namespace prefix on <{element}>: {prefix}")]
    UnknownPrefix { element: String, prefix: String },

    /// A required attribute is absent, or present but unparsable (`source`
    /// then holds the reason).
    #[error("<{element}> is missing required attribute {attribute}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        #[source]
        source: Option<LengthError>,
    },

    #[error("<{element}> has an invalid {attribute} length: {source}")]
    InvalidLength {
        element: String,
        attribute: &'static str,
        #[source]
        source: LengthError,
    },

    #[error("<{element}> has invalid {attribute} data: {source}")]
    InvalidPath {
        element: String,
        attribute: &'static str,
        #[source]
        source: PathError,
    },

    #[error("unknown entity reference: &{0};")]
    UnknownEntity(String),

    #[error("no root element found")]
    NoRootElement,

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse an SVG document with the default registry.
pub fn parse_document(data: &[u8]) -> ParseResult<Node> {
    parse_document_with(data, Registry::global())
}

/// Parse an SVG document, building elements through `registry`.
///
/// Everything before the first start tag (prolog, comments, doctype, text) is
/// skipped. Any error aborts the whole parse.
pub fn parse_document_with(data: &[u8], registry: &Registry) -> ParseResult<Node> {
    let mut reader = NsReader::from_reader(data);
    let mut buf = Vec::new();

    // Elements still open, innermost last, with their accumulated text.
    let mut open: Vec<(Node, String)> = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        match event {
            Event::Start(e) => {
                let node = open_element(registry, &resolved, &e)?;
                open.push((node, String::new()));
            }
            Event::Empty(e) => {
                let node = open_element(registry, &resolved, &e)?;
                match open.last_mut() {
                    Some((parent, _)) => {
                        parent.add_child(node);
                    }
                    None => return Ok(finish_document(node)),
                }
            }
            Event::End(e) => {
                let Some((mut node, text)) = open.pop() else {
                    let name = str::from_utf8(e.name().as_ref())?.to_string();
                    return Err(ParseError::UnexpectedEnd(name));
                };
                if !text.trim().is_empty() {
                    node.set_text(text);
                }
                match open.last_mut() {
                    Some((parent, _)) => {
                        parent.add_child(node);
                    }
                    None => return Ok(finish_document(node)),
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = open.last_mut() {
                    text.push_str(&t.decode()?);
                }
            }
            Event::CData(c) => {
                if let Some((_, text)) = open.last_mut() {
                    text.push_str(&c.decode()?);
                }
            }
            Event::GeneralRef(r) => {
                if let Some((_, text)) = open.last_mut() {
                    resolve_reference(&r, text)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match open.pop() {
        Some((node, _)) => Err(ParseError::Unclosed(node.tag().to_string())),
        None => Err(ParseError::NoRootElement),
    }
}

fn finish_document(root: Node) -> Node {
    debug!(
        root = root.tag(),
        children = root.children().len(),
        "parsed document"
    );
    root
}

fn open_element(
    registry: &Registry,
    resolved: &ResolveResult<'_>,
    e: &BytesStart<'_>,
) -> ParseResult<Node> {
    let tag = str::from_utf8(e.local_name().as_ref())?.to_string();

    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(str::from_utf8(ns.as_ref())?),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(ParseError::UnknownPrefix {
                element: tag,
                prefix: String::from_utf8_lossy(prefix).into_owned(),
            });
        }
    };
    if namespace != Some(registry.namespace()) {
        return Err(ParseError::Namespace {
            element: tag,
            expected: registry.namespace().to_string(),
            found: namespace.map(str::to_string),
        });
    }

    let mut node = registry.create(namespace, &tag);
    *node.attrs_mut() = attrs_to_map(e, &tag)?;
    node.decode_attrs()?;
    Ok(node)
}

/// Collect attributes by local name. Namespace declarations are not stored;
/// other prefixed attributes are dropped since the model has a single
/// namespace.
fn attrs_to_map(e: &BytesStart<'_>, tag: &str) -> ParseResult<AttrMap> {
    let mut out = AttrMap::new();
    for a in e.attributes().with_checks(false) {
        let a = a?;
        let key = str::from_utf8(a.key.as_ref())?;
        if key == "xmlns" || key.starts_with("xmlns:") {
            trace!(element = tag, attribute = key, "skipping namespace declaration");
            continue;
        }
        if key.contains(':') {
            warn!(element = tag, attribute = key, "dropping namespaced attribute");
            continue;
        }
        let val = a.unescape_value()?.into_owned();
        if out.insert(key, val).is_some() {
            warn!(element = tag, attribute = key, "repeated attribute, keeping the last value");
        }
    }
    Ok(out)
}

fn resolve_reference(r: &BytesRef<'_>, text: &mut String) -> ParseResult<()> {
    if let Some(ch) = r.resolve_char_ref()? {
        text.push(ch);
        return Ok(());
    }
    let name = r.decode()?;
    let resolved =
        resolve_predefined_entity(&name).ok_or_else(|| ParseError::UnknownEntity(name.to_string()))?;
    text.push_str(resolved);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    const NS: &str = r#"xmlns="http://www.w3.org/2000/svg""#;

    #[test]
    fn text_references_are_resolved() {
        let doc = format!(r#"<svg {NS}><style>a &gt; b &amp;&#65;<![CDATA[<c>]]></style></svg>"#);
        let root = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(root.children()[0].text(), "a > b &A<c>");
    }

    #[test]
    fn whitespace_only_text_is_formatting() {
        let doc = format!("<svg {NS}>\n  <g>\n  </g>\n</svg>");
        let root = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(root.text(), "");
        assert_eq!(root.children()[0].text(), "");
    }

    #[test]
    fn namespace_declarations_are_not_attributes() {
        let doc = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1"><a xlink:href="x"/></svg>"#;
        let root = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(root.attrs().len(), 1);
        assert_eq!(root.attrs().get("version"), Some("1.1"));
        assert!(root.children()[0].attrs().is_empty());
    }

    #[test]
    fn prefixed_elements_in_the_namespace_are_accepted() {
        let doc = r#"<s:svg xmlns:s="http://www.w3.org/2000/svg"><s:circle r="2"/></s:svg>"#;
        let root = parse_document(doc.as_bytes()).unwrap();
        assert_eq!(root.tag(), "svg");
        assert_eq!(root.children()[0].tag(), "circle");
        assert!(matches!(root.children()[0].element(), Element::Circle(_)));
    }

    #[test]
    fn undeclared_prefix_fails() {
        let doc = format!(r#"<svg {NS}><x:g/></svg>"#);
        assert!(matches!(
            parse_document(doc.as_bytes()),
            Err(ParseError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn unclosed_root_fails() {
        let doc = format!(r#"<svg {NS}><g>"#);
        assert!(parse_document(doc.as_bytes()).is_err());
    }
}
