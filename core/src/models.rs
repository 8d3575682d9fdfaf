use serde::{Deserialize, Serialize};

/// JSON type of the value a tree node represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JsonNodeKind {
  Array,
  Object,
  String,
  Number,
  Boolean,
  Null,
}

impl JsonNodeKind {
  pub fn is_container(self) -> bool {
    matches!(self, JsonNodeKind::Array | JsonNodeKind::Object)
  }
}

/// One step of a node path; a path serializes as a plain array like `["foo", 0, "bar"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum JsonPathSegment {
  Key(String),
  Index(u64),
}

impl JsonPathSegment {
  /// Array position this segment addresses, accepting stringly indices (`"2"`).
  pub fn as_index(&self) -> Option<usize> {
    match self {
      JsonPathSegment::Index(i) => usize::try_from(*i).ok(),
      JsonPathSegment::Key(k) => k.parse::<usize>().ok(),
    }
  }
}

impl From<&str> for JsonPathSegment {
  fn from(k: &str) -> Self {
    JsonPathSegment::Key(k.to_string())
  }
}

impl From<u64> for JsonPathSegment {
  fn from(i: u64) -> Self {
    JsonPathSegment::Index(i)
  }
}

impl std::fmt::Display for JsonPathSegment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      JsonPathSegment::Key(k) => f.write_str(k),
      JsonPathSegment::Index(i) => write!(f, "{i}"),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
  pub session_id: String,
  pub created_at_ms: i64,
  /// Nodes built for the document, root included.
  pub node_count: usize,
  pub total_visible_rows: usize,
}

/// Descriptor of one visible row handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
  /// 0-based visible row index at the time the row was produced.
  pub index: usize,
  pub path: Vec<JsonPathSegment>,
  pub key: Option<JsonPathSegment>,
  pub kind: JsonNodeKind,
  pub depth: usize,
  pub indent: usize,
  pub is_leaf: bool,
  pub child_count: usize,
  /// Collapse state as the renderer should show it (always true while a filter is active).
  pub expanded: bool,
  pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowPage {
  pub rows: Vec<Row>,
  pub next_cursor: Option<String>,
  pub reached_end: bool,
}
