use std::{
  collections::HashMap,
  sync::Arc,
  time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
  cursor::{decode_cursor, encode_cursor, RowCursor},
  filter::NodeFilter,
  models::{JsonNodeKind, JsonPathSegment, Row, RowPage, SessionInfo},
  tree::{JsonNode, JsonTree, LeafValue},
  window,
};

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("unknown session: {0}")]
  UnknownSession(String),
  #[error("invalid filter pattern: {0}")]
  InvalidPattern(#[from] regex::Error),
  #[error("bad cursor token: {0}")]
  BadCursor(String),
  #[error("cursor is stale: the tree changed since it was issued")]
  StaleCursor,
}

#[derive(Debug, Clone)]
pub struct CoreOptions {
  pub default_page_size: usize,
  pub preview_max_chars: usize,
  /// Treat filter text as a literal substring instead of a regular expression.
  pub literal_filter: bool,
}

impl Default for CoreOptions {
  fn default() -> Self {
    Self {
      default_page_size: 100,
      preview_max_chars: 120,
      literal_filter: true,
    }
  }
}

#[derive(Debug)]
struct SessionState {
  created_at_ms: i64,
  tree: JsonTree,
  /// Bumped on every mutation that can move rows; cursors carry the value they were minted at.
  generation: u64,
}

impl SessionState {
  fn info(&self, session_id: &str) -> SessionInfo {
    SessionInfo {
      session_id: session_id.to_string(),
      created_at_ms: self.created_at_ms,
      node_count: self.tree.node_count(),
      total_visible_rows: self.tree.total_visible_rows(),
    }
  }
}

/// Owns one navigable tree per loaded document, addressed by session id.
#[derive(Clone)]
pub struct CoreEngine {
  options: CoreOptions,
  sessions: Arc<Mutex<HashMap<String, SessionState>>>,
}

impl CoreEngine {
  pub fn new(options: CoreOptions) -> Self {
    Self {
      options,
      sessions: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  pub fn options(&self) -> &CoreOptions {
    &self.options
  }

  /// IPC API: open_document(value) -> { session, first_page }
  pub fn open_document(&self, value: &Value) -> (SessionInfo, RowPage) {
    let session_id = Uuid::new_v4().to_string();
    let state = SessionState {
      created_at_ms: now_ms(),
      tree: JsonTree::build(value),
      generation: 0,
    };
    let info = state.info(&session_id);
    let first_page = page_from(
      &session_id,
      &state,
      None,
      self.options.default_page_size,
      &self.options,
    );
    debug!(
      session_id = %session_id,
      nodes = info.node_count,
      rows = info.total_visible_rows,
      "document opened"
    );
    self.sessions.lock().insert(session_id, state);
    (info, first_page)
  }

  /// Discard the session's tree and rebuild it from a new document.
  pub fn replace_document(&self, session_id: &str, value: &Value) -> Result<SessionInfo, CoreError> {
    let tree = JsonTree::build(value);
    self.with_session(session_id, |s| {
      s.tree = tree;
      s.generation += 1;
      let info = s.info(session_id);
      debug!(session_id, nodes = info.node_count, "document replaced");
      info
    })
  }

  pub fn close_session(&self, session_id: &str) -> Result<(), CoreError> {
    match self.sessions.lock().remove(session_id) {
      Some(_) => {
        debug!(session_id, "session closed");
        Ok(())
      }
      None => Err(CoreError::UnknownSession(session_id.to_string())),
    }
  }

  pub fn session_info(&self, session_id: &str) -> Result<SessionInfo, CoreError> {
    self.with_session(session_id, |s| s.info(session_id))
  }

  /// Returns false when `path` does not resolve exactly (nothing is changed then).
  pub fn set_expanded(
    &self,
    session_id: &str,
    path: &[JsonPathSegment],
    expanded: bool,
  ) -> Result<bool, CoreError> {
    self.with_session(session_id, |s| {
      let changed = s.tree.set_expanded(path, expanded);
      if changed {
        s.generation += 1;
      }
      trace!(session_id, ?path, expanded, changed, "set_expanded");
      changed
    })
  }

  pub fn toggle_expanded(
    &self,
    session_id: &str,
    path: &[JsonPathSegment],
  ) -> Result<Option<bool>, CoreError> {
    self.with_session(session_id, |s| {
      let now = s.tree.toggle_expanded(path);
      if now.is_some() {
        s.generation += 1;
      }
      trace!(session_id, ?path, expanded = ?now, "toggle_expanded");
      now
    })
  }

  /// Returns the new total row count.
  pub fn set_expanded_all(&self, session_id: &str, expanded: bool) -> Result<usize, CoreError> {
    self.with_session(session_id, |s| {
      s.tree.set_expanded_all(expanded);
      s.generation += 1;
      let rows = s.tree.total_visible_rows();
      debug!(session_id, expanded, rows, "set_expanded_all");
      rows
    })
  }

  /// Filter rows by `text`; blank text clears the filter. Returns the new total row count.
  pub fn apply_filter(&self, session_id: &str, text: &str) -> Result<usize, CoreError> {
    if text.trim().is_empty() {
      return self.clear_filter(session_id);
    }
    let filter = if self.options.literal_filter {
      NodeFilter::literal(text)?
    } else {
      NodeFilter::new(text)?
    };
    self.with_session(session_id, |s| {
      s.tree.apply_filter(&filter);
      s.generation += 1;
      let rows = s.tree.total_visible_rows();
      debug!(session_id, filter = filter.text(), rows, "filter applied");
      rows
    })
  }

  pub fn clear_filter(&self, session_id: &str) -> Result<usize, CoreError> {
    self.with_session(session_id, |s| {
      s.tree.clear_filter();
      s.generation += 1;
      let rows = s.tree.total_visible_rows();
      debug!(session_id, rows, "filter cleared");
      rows
    })
  }

  pub fn total_visible_rows(&self, session_id: &str) -> Result<usize, CoreError> {
    self.with_session(session_id, |s| s.tree.total_visible_rows())
  }

  /// IPC API: slice_visible(session_id, start, length) -> rows [start, start+length)
  pub fn slice_visible(
    &self,
    session_id: &str,
    start_index: usize,
    length: usize,
  ) -> Result<Vec<Row>, CoreError> {
    let preview_max = self.options.preview_max_chars;
    self.with_session(session_id, |s| {
      trace!(session_id, start_index, length, "slice_visible");
      let tree = &s.tree;
      window::slice_visible(tree, start_index, length)
        .enumerate()
        .map(|(i, n)| row_from_node(tree, n, start_index + i, preview_max))
        .collect()
    })
  }

  /// IPC API: next_page(session_id, cursor, page_size) -> RowPage
  ///
  /// A `None` cursor starts at the first row. A `page_size` of 0 uses the default.
  pub fn next_page(
    &self,
    session_id: &str,
    cursor: Option<&str>,
    page_size: usize,
  ) -> Result<RowPage, CoreError> {
    let cursor = decode_cursor(cursor)?;
    let page_size = if page_size == 0 {
      self.options.default_page_size
    } else {
      page_size
    };
    self.with_session(session_id, |s| {
      if let Some(c) = &cursor {
        if c.session_id != session_id {
          return Err(CoreError::BadCursor("cursor was issued by another session".into()));
        }
        if c.generation != s.generation {
          return Err(CoreError::StaleCursor);
        }
        if window::node_at_index_path(&s.tree, &c.index_path).is_none() {
          return Err(CoreError::BadCursor("cursor does not point at a visible row".into()));
        }
      }
      trace!(session_id, page_size, "next_page");
      Ok(page_from(session_id, s, cursor.as_ref(), page_size, &self.options))
    })
    .and_then(|page| page)
  }

  pub fn index_of_path(
    &self,
    session_id: &str,
    path: &[JsonPathSegment],
  ) -> Result<Option<usize>, CoreError> {
    self.with_session(session_id, |s| window::index_of_path(&s.tree, path))
  }

  pub fn path_at_index(
    &self,
    session_id: &str,
    index: usize,
  ) -> Result<Option<Vec<JsonPathSegment>>, CoreError> {
    self.with_session(session_id, |s| window::path_at_index(&s.tree, index))
  }

  pub fn next_visible(
    &self,
    session_id: &str,
    path: Option<&[JsonPathSegment]>,
  ) -> Result<Option<Row>, CoreError> {
    self.visible_row(session_id, |t| window::next_visible(t, path))
  }

  pub fn previous_visible(
    &self,
    session_id: &str,
    path: Option<&[JsonPathSegment]>,
  ) -> Result<Option<Row>, CoreError> {
    self.visible_row(session_id, |t| window::previous_visible(t, path))
  }

  pub fn first_visible(&self, session_id: &str) -> Result<Option<Row>, CoreError> {
    self.visible_row(session_id, window::first_visible)
  }

  pub fn last_visible(&self, session_id: &str) -> Result<Option<Row>, CoreError> {
    self.visible_row(session_id, window::last_visible)
  }

  fn visible_row(
    &self,
    session_id: &str,
    pick: impl for<'t> FnOnce(&'t JsonTree) -> Option<&'t JsonNode>,
  ) -> Result<Option<Row>, CoreError> {
    let preview_max = self.options.preview_max_chars;
    self.with_session(session_id, |s| {
      let tree = &s.tree;
      let node = pick(tree)?;
      let index = window::index_of_path(tree, node.path())?;
      Some(row_from_node(tree, node, index, preview_max))
    })
  }

  fn with_session<R>(
    &self,
    session_id: &str,
    f: impl FnOnce(&mut SessionState) -> R,
  ) -> Result<R, CoreError> {
    let mut sessions = self.sessions.lock();
    let s = sessions
      .get_mut(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    Ok(f(s))
  }
}

fn page_from(
  session_id: &str,
  s: &SessionState,
  cursor: Option<&RowCursor>,
  page_size: usize,
  options: &CoreOptions,
) -> RowPage {
  let tree = &s.tree;
  let index_path = cursor.map(|c| c.index_path.as_slice()).unwrap_or(&[]);
  let mut slice = window::slice_after(tree, index_path, page_size);
  let mut rows = Vec::with_capacity(page_size.min(tree.total_visible_rows()));
  let mut index = None;
  for node in slice.by_ref() {
    let i = match index {
      Some(prev) => prev + 1,
      None => window::index_of_path(tree, node.path()).unwrap_or(0),
    };
    index = Some(i);
    rows.push(row_from_node(tree, node, i, options.preview_max_chars));
  }

  let reached_end = rows.is_empty() || !slice.has_more();
  let next_cursor = match (reached_end, slice.position()) {
    (false, Some(p)) => Some(encode_cursor(&RowCursor {
      session_id: session_id.to_string(),
      index_path: p.to_vec(),
      generation: s.generation,
    })),
    _ => None,
  };
  RowPage {
    rows,
    next_cursor,
    reached_end,
  }
}

fn row_from_node(tree: &JsonTree, node: &JsonNode, index: usize, preview_max_chars: usize) -> Row {
  Row {
    index,
    path: node.path().to_vec(),
    key: node.key().cloned(),
    kind: node.kind(),
    depth: node.depth(),
    indent: node.indent(),
    is_leaf: node.is_leaf(),
    child_count: node.child_count(),
    expanded: !node.is_leaf() && tree.is_open(node),
    preview: preview(node, preview_max_chars),
  }
}

fn preview(node: &JsonNode, max: usize) -> String {
  let n = node.child_count();
  match (node.kind(), node.leaf()) {
    (JsonNodeKind::Object, _) if n == 0 => "{}".to_string(),
    (JsonNodeKind::Object, _) => format!("{{…}} {n} keys"),
    (JsonNodeKind::Array, _) if n == 0 => "[]".to_string(),
    (JsonNodeKind::Array, _) => format!("[…] {n} items"),
    (_, Some(LeafValue::String(s))) => truncate_chars(s, max),
    (_, Some(LeafValue::Number(v))) => v.to_string(),
    (_, Some(LeafValue::Boolean(b))) => b.to_string(),
    _ => "null".to_string(),
  }
}

fn truncate_chars(s: &str, max: usize) -> String {
  if max == 0 {
    return String::new();
  }
  let mut out = String::new();
  for (i, ch) in s.chars().enumerate() {
    if i >= max {
      out.push('…');
      break;
    }
    out.push(ch);
  }
  out
}

fn now_ms() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as i64
}
