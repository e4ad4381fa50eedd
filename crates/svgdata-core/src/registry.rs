use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::trace;

use crate::model::{Node, Point};
use crate::path::PathData;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Builds an empty node of a specific kind. The decoder assigns the tag
/// name afterwards.
pub type Constructor = fn() -> Node;

/// Tag name to node constructor, for a single namespace.
///
/// Build it once, then share it read-only; there is no way to unregister.
#[derive(Debug, Clone)]
pub struct Registry {
    namespace: String,
    constructors: HashMap<String, Constructor>,
    fallback: Constructor,
}

impl Registry {
    /// An empty registry: every tag resolves to the passthrough fallback.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            constructors: HashMap::new(),
            fallback: unknown,
        }
    }

    /// The SVG namespace with every modeled element kind registered.
    pub fn standard() -> Self {
        let mut registry = Self::new(SVG_NS);
        registry
            .register("svg", Node::root)
            .register("g", Node::group)
            .register("style", || Node::style(""))
            .register("circle", || Node::circle(Point::default(), 0.0))
            .register("rect", || Node::rect(0.0, 0.0, 0.0, 0.0))
            .register("path", || Node::path(PathData::default()))
            .register("polyline", || Node::polyline(Vec::new()))
            .register("polygon", || Node::polygon(Vec::new()));
        registry
    }

    /// Process-wide read-only instance of [`Registry::standard`].
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::standard)
    }

    /// Route `tag` to `constructor`. Registering a tag again replaces the
    /// earlier entry.
    pub fn register(&mut self, tag: impl Into<String>, constructor: Constructor) -> &mut Self {
        self.constructors.insert(tag.into(), constructor);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Constructor for `tag`; the fallback when the namespace differs or the
    /// tag is not registered.
    pub fn resolve(&self, namespace: Option<&str>, tag: &str) -> Constructor {
        if namespace != Some(self.namespace.as_str()) {
            trace!(tag, ?namespace, "foreign namespace, using fallback");
            return self.fallback;
        }
        match self.constructors.get(tag) {
            Some(constructor) => *constructor,
            None => {
                trace!(tag, "unregistered tag, using fallback");
                self.fallback
            }
        }
    }

    /// Resolve and run the constructor, naming the node `tag`.
    pub fn create(&self, namespace: Option<&str>, tag: &str) -> Node {
        let mut node = (self.resolve(namespace, tag))();
        node.set_tag(tag);
        node
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

fn unknown() -> Node {
    Node::new("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    #[test]
    fn standard_tags_build_typed_nodes() {
        let registry = Registry::standard();
        let circle = registry.create(Some(SVG_NS), "circle");
        assert_eq!(circle.tag(), "circle");
        assert!(matches!(circle.element(), Element::Circle(_)));

        let polyline = registry.create(Some(SVG_NS), "polyline");
        assert!(matches!(polyline.element(), Element::Polyline(_)));
        assert!(matches!(
            registry.create(Some(SVG_NS), "svg").element(),
            Element::Root
        ));
    }

    #[test]
    fn unknown_tags_fall_back_to_passthrough() {
        let registry = Registry::standard();
        let node = registry.create(Some(SVG_NS), "feGaussianBlur");
        assert_eq!(node.tag(), "feGaussianBlur");
        assert_eq!(node.element(), &Element::Unknown);
    }

    #[test]
    fn foreign_namespace_falls_back() {
        let registry = Registry::standard();
        let node = registry.create(Some("urn:other"), "circle");
        assert_eq!(node.element(), &Element::Unknown);
        let node = registry.create(None, "circle");
        assert_eq!(node.element(), &Element::Unknown);
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = Registry::new("urn:test");
        registry.register("dot", Node::group);
        registry.register("dot", || Node::circle(Point::default(), 1.0));
        assert!(registry.contains("dot"));
        let node = registry.create(Some("urn:test"), "dot");
        assert_eq!(node.tag(), "dot");
        assert!(matches!(node.element(), Element::Circle(c) if c.radius == 1.0));
    }

    #[test]
    fn global_is_the_standard_table() {
        let global = Registry::global();
        assert_eq!(global.namespace(), SVG_NS);
        for tag in ["svg", "g", "style", "circle", "rect", "path", "polyline", "polygon"] {
            assert!(global.contains(tag), "{tag}");
        }
    }
}
