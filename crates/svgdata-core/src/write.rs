use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::model::Node;
use crate::registry::SVG_NS;

const PROLOG: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WriteResult<T> = Result<T, WriteError>;

/// Output settings for [`render_document_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Written as the root element's `xmlns`, replacing any stored value.
    pub namespace: String,
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
}

impl RenderOptions {
    pub fn pretty() -> Self {
        Self {
            indent: Some(2),
            ..Self::default()
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            namespace: SVG_NS.to_string(),
            indent: None,
        }
    }
}

/// Render `root` as a standalone SVG document, two-space indented when
/// `pretty` is set.
pub fn render_document(root: &Node, pretty: bool) -> WriteResult<Vec<u8>> {
    let options = if pretty {
        RenderOptions::pretty()
    } else {
        RenderOptions::default()
    };
    render_document_with(root, &options)
}

pub fn render_document_with(root: &Node, options: &RenderOptions) -> WriteResult<Vec<u8>> {
    let mut out = Vec::with_capacity(PROLOG.len() + 1);
    out.extend_from_slice(PROLOG.as_bytes());
    out.push(b'\n');

    let out = match options.indent {
        Some(size) => {
            let mut writer = Writer::new_with_indent(out, b' ', size);
            write_node(&mut writer, root, Some(&options.namespace))?;
            writer.into_inner()
        }
        None => {
            let mut writer = Writer::new(out);
            write_node(&mut writer, root, Some(&options.namespace))?;
            writer.into_inner()
        }
    };
    debug!(root = root.tag(), bytes = out.len(), "rendered document");
    Ok(out)
}

pub fn render_document_to_path<P: AsRef<Path>>(
    root: &Node,
    options: &RenderOptions,
    path: P,
) -> WriteResult<()> {
    let bytes = render_document_with(root, options)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// `namespace` is only set for the document element.
fn write_node<W: Write>(
    writer: &mut Writer<W>,
    node: &Node,
    namespace: Option<&str>,
) -> WriteResult<()> {
    let attrs = node.encoded_attrs();
    let mut start = BytesStart::new(node.tag());
    if let Some(ns) = namespace {
        start.push_attribute(("xmlns", ns));
    }
    for (key, value) in &attrs {
        if namespace.is_some() && key == "xmlns" {
            continue;
        }
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children().is_empty() && node.text().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if node.children().is_empty() {
        writer.write_event(Event::Text(BytesText::new(node.text())))?;
    } else {
        for child in node.children() {
            write_node(writer, child, None)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn render_str(root: &Node, pretty: bool) -> String {
        String::from_utf8(render_document(root, pretty).unwrap()).unwrap()
    }

    #[test]
    fn compact_output_has_prolog_and_forced_namespace() {
        let mut root = Node::root();
        root.set_attr("xmlns", "urn:wrong").set_attr("width", "10");
        let out = render_str(&root, false);
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\"/>"
        );
    }

    #[test]
    fn pretty_output_indents_two_spaces() {
        let mut group = Node::group();
        group.add_child(Node::circle(Point::new(1.0, 2.0), 3.0));
        let mut root = Node::root();
        root.add_child(group);
        let out = render_str(&root, true);
        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
            <svg xmlns=\"http://www.w3.org/2000/svg\">\n  \
            <g>\n    \
            <circle cx=\"1\" cy=\"2\" r=\"3\"/>\n  \
            </g>\n\
            </svg>";
        assert_eq!(out, expected);
    }

    #[test]
    fn text_is_escaped_and_kept_inline() {
        let mut root = Node::root();
        root.add_child(Node::style("a > b & c"));
        let out = render_str(&root, true);
        assert!(out.contains("<style>a &gt; b &amp; c</style>"), "{out}");
    }

    #[test]
    fn text_is_dropped_when_children_exist() {
        let mut group = Node::group();
        group.set_text("ignored");
        group.add_child(Node::new("desc"));
        let out = render_str(&group, false);
        assert!(!out.contains("ignored"), "{out}");
        assert!(out.ends_with("<g xmlns=\"http://www.w3.org/2000/svg\"><desc/></g>"));
    }

    #[test]
    fn only_the_root_gets_a_namespace() {
        let mut root = Node::root();
        let mut child = Node::new("metadata");
        child.set_attr("xmlns", "urn:kept");
        root.add_child(child);
        let out = render_str(&root, false);
        assert!(out.contains("<metadata xmlns=\"urn:kept\"/>"), "{out}");
    }

    #[test]
    fn options_use_serde_defaults() {
        let options: RenderOptions = serde_json::from_str(r#"{"indent":4}"#).unwrap();
        assert_eq!(options.namespace, SVG_NS);
        assert_eq!(options.indent, Some(4));
        assert_eq!(RenderOptions::pretty().indent, Some(2));
    }

    #[test]
    fn custom_namespace_is_applied() {
        let options = RenderOptions {
            namespace: "urn:test".to_string(),
            indent: None,
        };
        let out = render_document_with(&Node::new("doc"), &options).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("<doc xmlns=\"urn:test\"/>"));
    }
}
