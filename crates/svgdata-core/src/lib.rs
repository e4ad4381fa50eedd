pub mod attrs;
pub mod model;
pub mod parse;
pub mod path;
pub mod registry;
pub mod serde_f64;
pub mod units;
pub mod write;
pub use attrs::AttrMap;
pub use model::{Element, Node, Point};
pub use parse::{ParseError, ParseResult, parse_document, parse_document_with};
pub use path::{PathData, PathError, PathResult};
pub use registry::{Registry, SVG_NS};
pub use units::{LengthError, LengthResult, parse_length};
pub use write::{
    RenderOptions, WriteError, WriteResult, render_document, render_document_to_path,
    render_document_with,
};
