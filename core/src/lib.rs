mod cursor;
mod engine;
mod filter;
mod iterator;
mod models;
mod tree;
pub mod window;

pub use crate::engine::{CoreEngine, CoreError, CoreOptions};
pub use crate::filter::NodeFilter;
pub use crate::iterator::{Predicate, Step, TreeItem, TreeIterator};
pub use crate::models::{JsonNodeKind, JsonPathSegment, Row, RowPage, SessionInfo};
pub use crate::tree::{JsonNode, JsonTree, LeafValue};
pub use crate::window::VisibleSlice;
