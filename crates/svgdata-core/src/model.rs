use serde::Serialize;

use crate::attrs::AttrMap;
use crate::parse::{ParseError, ParseResult};
use crate::path::{PathData, format_points, parse_points};
use crate::serde_f64::{self, fmt_f64};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    #[serde(serialize_with = "serde_f64::ser_f64_compact")]
    pub x: f64,
    #[serde(serialize_with = "serde_f64::ser_f64_compact")]
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Circle {
    pub center: Point,
    #[serde(serialize_with = "serde_f64::ser_f64_compact")]
    pub radius: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rect {
    #[serde(serialize_with = "serde_f64::ser_f64_compact")]
    pub x: f64,
    #[serde(serialize_with = "serde_f64::ser_f64_compact")]
    pub y: f64,
    #[serde(serialize_with = "serde_f64::ser_f64_compact")]
    pub width: f64,
    #[serde(serialize_with = "serde_f64::ser_f64_compact")]
    pub height: f64,
}

impl Rect {
    pub fn from_bounds(min: Point, max: Point) -> Self {
        Self {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }
}

/// Point list of a `<polyline>` or `<polygon>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Polyshape {
    pub points: Vec<Point>,
}

/// Typed payload of a node. Passthrough kinds carry nothing beyond the
/// node's attributes and children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Element {
    Root,
    Group,
    Style,
    Unknown,
    Circle(Circle),
    Rect(Rect),
    Path(PathData),
    Polyline(Polyshape),
    Polygon(Polyshape),
}

impl Element {
    /// Consume the attributes this kind models from `attrs`.
    fn decode(&mut self, tag: &str, attrs: &mut AttrMap) -> ParseResult<()> {
        match self {
            Element::Root | Element::Group | Element::Style | Element::Unknown => {}
            Element::Circle(circle) => {
                circle.center.x = extract_length_or_zero(tag, attrs, "cx")?;
                circle.center.y = extract_length_or_zero(tag, attrs, "cy")?;
                circle.radius = extract_length_or_zero(tag, attrs, "r")?;
            }
            Element::Rect(rect) => {
                rect.x = extract_length_or_zero(tag, attrs, "x")?;
                rect.y = extract_length_or_zero(tag, attrs, "y")?;
                rect.width = extract_required_length(tag, attrs, "width")?;
                rect.height = extract_required_length(tag, attrs, "height")?;
            }
            Element::Path(path) => {
                let d = attrs.remove("d").unwrap_or_default();
                *path = PathData::parse(&d).map_err(|source| ParseError::InvalidPath {
                    element: tag.to_string(),
                    attribute: "d",
                    source,
                })?;
            }
            Element::Polyline(shape) | Element::Polygon(shape) => {
                let points = attrs.remove("points").unwrap_or_default();
                shape.points = parse_points(&points).map_err(|source| ParseError::InvalidPath {
                    element: tag.to_string(),
                    attribute: "points",
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Write the modeled fields into `attrs`, a copy of the stored map.
    fn encode(&self, attrs: &mut AttrMap) {
        match self {
            Element::Root | Element::Group | Element::Style | Element::Unknown => {}
            Element::Circle(circle) => {
                attrs.insert("cx", fmt_f64(circle.center.x));
                attrs.insert("cy", fmt_f64(circle.center.y));
                attrs.insert("r", fmt_f64(circle.radius));
            }
            Element::Rect(rect) => {
                attrs.insert("x", fmt_f64(rect.x));
                attrs.insert("y", fmt_f64(rect.y));
                attrs.insert("width", fmt_f64(rect.width));
                attrs.insert("height", fmt_f64(rect.height));
            }
            Element::Path(path) => {
                if !path.is_empty() {
                    attrs.insert("d", path.to_string());
                }
            }
            Element::Polyline(shape) | Element::Polygon(shape) => {
                if !shape.points.is_empty() {
                    attrs.insert("points", format_points(&shape.points));
                }
            }
        }
    }
}

fn extract_length_or_zero(tag: &str, attrs: &mut AttrMap, key: &'static str) -> ParseResult<f64> {
    attrs
        .extract_length_or(key, 0.0)
        .map_err(|source| ParseError::InvalidLength {
            element: tag.to_string(),
            attribute: key,
            source,
        })
}

/// An unparsable value counts as missing.
fn extract_required_length(tag: &str, attrs: &mut AttrMap, key: &'static str) -> ParseResult<f64> {
    let missing = |source| ParseError::MissingAttribute {
        element: tag.to_string(),
        attribute: key,
        source,
    };
    attrs
        .extract_length(key)
        .map_err(|err| missing(Some(err)))?
        .ok_or_else(|| missing(None))
}

/// One element of the document tree.
///
/// Children are owned by their parent. Text is only written out when the
/// node has no children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    tag: String,

    #[serde(skip_serializing_if = "AttrMap::is_empty")]
    attrs: AttrMap,

    element: Element,

    #[serde(skip_serializing_if = "String::is_empty")]
    text: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    /// A passthrough node: attributes and children are kept as-is.
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_element(tag, Element::Unknown)
    }

    pub fn with_element(tag: impl Into<String>, element: Element) -> Self {
        Self {
            tag: tag.into(),
            attrs: AttrMap::new(),
            element,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// The `<svg>` document element.
    pub fn root() -> Self {
        Self::with_element("svg", Element::Root)
    }

    pub fn group() -> Self {
        Self::with_element("g", Element::Group)
    }

    pub fn style(css: impl Into<String>) -> Self {
        let mut node = Self::with_element("style", Element::Style);
        node.text = css.into();
        node
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::with_element("circle", Element::Circle(Circle { center, radius }))
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_element(
            "rect",
            Element::Rect(Rect {
                x,
                y,
                width,
                height,
            }),
        )
    }

    pub fn rect_from_bounds(min: Point, max: Point) -> Self {
        Self::with_element("rect", Element::Rect(Rect::from_bounds(min, max)))
    }

    pub fn path(data: PathData) -> Self {
        Self::with_element("path", Element::Path(data))
    }

    pub fn polyline(points: Vec<Point>) -> Self {
        Self::with_element("polyline", Element::Polyline(Polyshape { points }))
    }

    pub fn polygon(points: Vec<Point>) -> Self {
        Self::with_element("polygon", Element::Polygon(Polyshape { points }))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    /// Stored attributes, excluding those modeled by [`Node::element`].
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut AttrMap {
        &mut self.attrs
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attrs.insert(key, value);
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn add_child(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Attributes as written out: a fresh copy of the stored map with the
    /// element's modeled fields added. The stored map is left untouched.
    pub fn encoded_attrs(&self) -> AttrMap {
        let mut attrs = self.attrs.clone();
        self.element.encode(&mut attrs);
        attrs
    }

    /// Move modeled attributes out of the stored map into the element.
    pub(crate) fn decode_attrs(&mut self) -> ParseResult<()> {
        self.element.decode(&self.tag, &mut self.attrs)
    }
}
