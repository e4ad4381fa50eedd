use svgdata_core::model::Circle;
use svgdata_core::path::{Command, PathCommand};
use svgdata_core::{
    Element, Node, ParseError, PathData, Point, Registry, SVG_NS, parse_document,
    parse_document_with, render_document,
};

fn render_str(root: &Node, pretty: bool) -> String {
    String::from_utf8(render_document(root, pretty).expect("render")).expect("utf8")
}

#[test]
fn modeled_tree_round_trips() {
    let mut group = Node::group();
    group
        .set_attr("class", "shapes")
        .add_child(Node::circle(Point::new(10.0, 20.0), 2.5))
        .add_child(Node::rect(1.0, 2.0, 30.0, 40.0));
    let mut root = Node::root();
    root.set_attr("width", "100")
        .add_child(Node::style("circle { fill: red; }"))
        .add_child(group);

    let reparsed = parse_document(&render_document(&root, true).expect("render")).expect("parse");
    assert_eq!(reparsed, root);
}

#[test]
fn unknown_element_keeps_its_attributes() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><foo bar="baz"/></svg>"#);
    let root = parse_document(doc.as_bytes()).expect("parse");
    let foo = &root.children()[0];
    assert_eq!(foo.tag(), "foo");
    assert_eq!(foo.element(), &Element::Unknown);
    assert_eq!(foo.attrs().len(), 1);
    assert_eq!(foo.attrs().get("bar"), Some("baz"));

    let out = render_str(&root, false);
    assert!(out.contains(r#"<foo bar="baz"/>"#), "{out}");
}

#[test]
fn rect_without_size_is_rejected() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><rect x="0" y="0"/></svg>"#);
    let err = parse_document(doc.as_bytes()).unwrap_err();
    assert!(
        matches!(err, ParseError::MissingAttribute { ref element, .. } if element == "rect"),
        "{err}"
    );
}

#[test]
fn missing_namespace_is_rejected() {
    let err = parse_document(b"<svg><circle r=\"1\"/></svg>").unwrap_err();
    assert!(
        matches!(err, ParseError::Namespace { found: None, .. }),
        "{err}"
    );

    let err = parse_document(br#"<svg xmlns="urn:other"/>"#).unwrap_err();
    assert!(
        matches!(err, ParseError::Namespace { found: Some(ref ns), .. } if ns == "urn:other"),
        "{err}"
    );
}

#[test]
fn input_without_elements_has_no_root() {
    let docs: [&[u8]; 2] = [b"", b"<?xml version=\"1.0\"?>\n<!-- nothing -->\n"];
    for doc in docs {
        assert!(matches!(
            parse_document(doc),
            Err(ParseError::NoRootElement)
        ));
    }
}

#[test]
fn path_data_is_normalized_on_output() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><path d="M 10,10 L 20,20 L 30,10 Z"/></svg>"#);
    let root = parse_document(doc.as_bytes()).expect("parse");
    let Element::Path(path) = root.children()[0].element() else {
        panic!("expected a path element");
    };
    assert_eq!(path.subpaths().len(), 1);
    assert_eq!(path.subpaths()[0].end(), Point::new(10.0, 10.0));

    let out = render_str(&root, false);
    assert!(out.contains(r#"<path d="M10 10L20 20L30 10Z"/>"#), "{out}");
}

#[test]
fn invalid_path_data_fails_the_parse() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><path d="M0 0 Q1 2 3"/></svg>"#);
    assert!(matches!(
        parse_document(doc.as_bytes()),
        Err(ParseError::InvalidPath { attribute: "d", .. })
    ));
}

#[test]
fn collaborator_built_tree_renders() {
    let path = PathData::from_commands([
        PathCommand::new(Command::MOVE_TO, vec![0.0, 0.0]).expect("move"),
        PathCommand::new(Command::LINE_TO, vec![5.0, 0.5]).expect("line"),
        PathCommand::new(Command::CLOSE_PATH, vec![]).expect("close"),
    ]);
    let mut root = Node::root();
    root.add_child(Node::path(path))
        .add_child(Node::polyline(vec![Point::new(0.0, 0.0), Point::new(1.0, 2.0)]))
        .add_child(Node::rect_from_bounds(Point::new(1.0, 1.0), Point::new(3.0, 4.0)));

    let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
        <svg xmlns=\"http://www.w3.org/2000/svg\">\n  \
        <path d=\"M0 0L5 0.5Z\"/>\n  \
        <polyline points=\"0,0 1,2\"/>\n  \
        <rect height=\"3\" width=\"2\" x=\"1\" y=\"1\"/>\n\
        </svg>";
    assert_eq!(render_str(&root, true), expected);
}

#[test]
fn custom_registry_controls_element_kinds() {
    let mut registry = Registry::new(SVG_NS);
    registry.register("svg", Node::root);
    registry.register("dot", || Node::circle(Point::default(), 0.0));

    let doc = format!(r#"<svg xmlns="{SVG_NS}"><dot r="4"/><circle r="4"/></svg>"#);
    let root = parse_document_with(doc.as_bytes(), &registry).expect("parse");

    assert_eq!(root.children()[0].tag(), "dot");
    assert_eq!(
        root.children()[0].element(),
        &Element::Circle(Circle {
            center: Point::default(),
            radius: 4.0
        })
    );
    // Not registered here, so the attribute stays raw.
    assert_eq!(root.children()[1].element(), &Element::Unknown);
    assert_eq!(root.children()[1].attrs().get("r"), Some("4"));
}

#[test]
fn units_are_resolved_to_pixels() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><circle cx="1in" cy="72pt" r="2.54cm"/></svg>"#);
    let root = parse_document(doc.as_bytes()).expect("parse");
    let Element::Circle(circle) = root.children()[0].element() else {
        panic!("expected a circle");
    };
    assert_eq!(circle.center, Point::new(96.0, 96.0));
    assert!((circle.radius - 96.0).abs() < 1e-9);
}

#[test]
fn rect_with_unparsable_size_is_rejected() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><rect width="abc" height="5"/></svg>"#);
    let err = parse_document(doc.as_bytes()).unwrap_err();
    assert!(
        matches!(
            err,
            ParseError::MissingAttribute {
                attribute: "width",
                source: Some(_),
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn out_of_range_numbers_fail_the_parse() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><circle r="1e400"/></svg>"#);
    assert!(matches!(
        parse_document(doc.as_bytes()),
        Err(ParseError::InvalidLength { attribute: "r", .. })
    ));

    let doc = format!(r#"<svg xmlns="{SVG_NS}"><path d="M1e400 0 L1 1"/></svg>"#);
    assert!(matches!(
        parse_document(doc.as_bytes()),
        Err(ParseError::InvalidPath { attribute: "d", .. })
    ));
}

#[test]
fn extreme_numbers_survive_a_round_trip() {
    let doc = format!(
        r#"<svg xmlns="{SVG_NS}"><path d="M1.7976931348623157e308 -4.9e-324 l+.5e-3 1E+2"/><circle r="1e300" cx="-1e-300"/></svg>"#
    );
    let root = parse_document(doc.as_bytes()).expect("parse");
    let out = render_document(&root, false).expect("render");
    assert_eq!(parse_document(&out).expect("reparse"), root);
}

#[test]
fn empty_geometry_renders_without_attributes() {
    let doc = format!(r#"<svg xmlns="{SVG_NS}"><path/><polyline/><polygon points=""/></svg>"#);
    let root = parse_document(doc.as_bytes()).expect("parse");
    let out = render_str(&root, false);
    assert!(out.contains("<path/><polyline/><polygon/>"), "{out}");
}
