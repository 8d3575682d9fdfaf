use std::cell::Cell;

use serde_json::Value;

use crate::{
  filter::NodeFilter,
  iterator::{Predicate, TreeItem, TreeIterator},
  models::{JsonNodeKind, JsonPathSegment},
};

/// Primitive payload of a leaf node.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
  String(String),
  Number(serde_json::Number),
  Boolean(bool),
  Null,
}

#[derive(Debug, Clone)]
enum Content {
  Leaf(LeafValue),
  Container(Vec<JsonNode>),
}

/// One node per JSON value of the loaded document.
#[derive(Debug, Clone)]
pub struct JsonNode {
  kind: JsonNodeKind,
  key: Option<JsonPathSegment>,
  path: Vec<JsonPathSegment>,
  indent: usize,
  content: Content,
  expanded: bool,
  hidden: bool,
  // `None` = dirty; recomputed on the next read.
  visible_count: Cell<Option<usize>>,
  visible_count_including_collapsed: Cell<Option<usize>>,
}

impl TreeItem for JsonNode {
  fn children(&self) -> Option<&[JsonNode]> {
    match &self.content {
      Content::Container(children) => Some(children),
      Content::Leaf(_) => None,
    }
  }
}

impl JsonNode {
  pub fn kind(&self) -> JsonNodeKind {
    self.kind
  }

  /// Property name or array index under the parent; `None` for the root.
  pub fn key(&self) -> Option<&JsonPathSegment> {
    self.key.as_ref()
  }

  pub fn path(&self) -> &[JsonPathSegment] {
    &self.path
  }

  pub fn depth(&self) -> usize {
    self.path.len()
  }

  pub fn indent(&self) -> usize {
    self.indent
  }

  pub fn leaf(&self) -> Option<&LeafValue> {
    match &self.content {
      Content::Leaf(v) => Some(v),
      Content::Container(_) => None,
    }
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self.content, Content::Leaf(_))
  }

  pub fn is_root(&self) -> bool {
    self.key.is_none()
  }

  pub fn is_array_child(&self) -> bool {
    matches!(self.key, Some(JsonPathSegment::Index(_)))
  }

  pub fn child_count(&self) -> usize {
    self.children().map_or(0, <[JsonNode]>::len)
  }

  pub fn is_expanded(&self) -> bool {
    self.expanded
  }

  pub fn is_hidden(&self) -> bool {
    self.hidden
  }

  /// Rows this subtree contributes: itself plus, when open, each child's count.
  /// A hidden node contributes nothing.
  ///
  /// With `include_collapsed`, every container counts as open.
  pub fn visible_descendant_count(&self, include_collapsed: bool) -> usize {
    if self.hidden {
      return 0;
    }
    let cell = if include_collapsed {
      &self.visible_count_including_collapsed
    } else {
      &self.visible_count
    };
    if let Some(n) = cell.get() {
      return n;
    }
    let mut n = 1;
    if include_collapsed || self.expanded {
      if let Content::Container(children) = &self.content {
        n += children
          .iter()
          .map(|c| c.visible_descendant_count(include_collapsed))
          .sum::<usize>();
      }
    }
    cell.set(Some(n));
    n
  }

  /// Position of the child addressed by `seg`.
  pub(crate) fn child_position(&self, seg: &JsonPathSegment) -> Option<usize> {
    let children = self.children()?;
    match self.kind {
      JsonNodeKind::Array => seg.as_index().filter(|&i| i < children.len()),
      _ => children.iter().position(|c| match (c.key.as_ref(), seg) {
        (Some(JsonPathSegment::Key(a)), JsonPathSegment::Key(b)) => a == b,
        _ => false,
      }),
    }
  }

  /// Child positions from this node down to the descendant at relative `path`.
  pub(crate) fn index_path_to(&self, path: &[JsonPathSegment]) -> Option<Vec<usize>> {
    let mut node = self;
    let mut out = Vec::with_capacity(path.len());
    for seg in path {
      let i = node.child_position(seg)?;
      node = node.children()?.get(i)?;
      out.push(i);
    }
    Some(out)
  }

  fn children_mut(&mut self) -> Option<&mut Vec<JsonNode>> {
    match &mut self.content {
      Content::Container(children) => Some(children),
      Content::Leaf(_) => None,
    }
  }

  fn invalidate(&self) {
    self.visible_count.set(None);
    self.visible_count_including_collapsed.set(None);
  }
}

fn build_node(
  value: &Value,
  key: Option<JsonPathSegment>,
  path: Vec<JsonPathSegment>,
  indent: usize,
  count: &mut usize,
) -> JsonNode {
  *count += 1;
  // Top-level rows start at column 0; array elements indent their children further.
  let child_indent = match &key {
    None => 0,
    Some(JsonPathSegment::Index(_)) => indent + 5,
    Some(JsonPathSegment::Key(_)) => indent + 2,
  };
  let child_path = |seg: &JsonPathSegment| {
    let mut p = Vec::with_capacity(path.len() + 1);
    p.extend_from_slice(&path);
    p.push(seg.clone());
    p
  };

  let (kind, content) = match value {
    Value::Array(items) => {
      let children = items
        .iter()
        .enumerate()
        .map(|(i, v)| {
          let seg = JsonPathSegment::Index(i as u64);
          let p = child_path(&seg);
          build_node(v, Some(seg), p, child_indent, count)
        })
        .collect();
      (JsonNodeKind::Array, Content::Container(children))
    }
    Value::Object(map) => {
      let children = map
        .iter()
        .map(|(k, v)| {
          let seg = JsonPathSegment::Key(k.clone());
          let p = child_path(&seg);
          build_node(v, Some(seg), p, child_indent, count)
        })
        .collect();
      (JsonNodeKind::Object, Content::Container(children))
    }
    Value::String(s) => (JsonNodeKind::String, Content::Leaf(LeafValue::String(s.clone()))),
    Value::Number(n) => (JsonNodeKind::Number, Content::Leaf(LeafValue::Number(n.clone()))),
    Value::Bool(b) => (JsonNodeKind::Boolean, Content::Leaf(LeafValue::Boolean(*b))),
    Value::Null => (JsonNodeKind::Null, Content::Leaf(LeafValue::Null)),
  };

  JsonNode {
    kind,
    expanded: key.is_none(),
    key,
    path,
    indent,
    content,
    hidden: false,
    visible_count: Cell::new(None),
    visible_count_including_collapsed: Cell::new(None),
  }
}

fn hidden(node: &JsonNode) -> bool {
  node.hidden
}

fn collapsed(node: &JsonNode) -> bool {
  !node.expanded
}

/// Navigable tree over one loaded JSON document.
///
/// Built once per document; expand/collapse and filtering mutate nodes in place.
#[derive(Debug, Clone)]
pub struct JsonTree {
  root: JsonNode,
  node_count: usize,
  filter_active: bool,
}

impl JsonTree {
  pub fn build(value: &Value) -> Self {
    let mut node_count = 0;
    let root = build_node(value, None, Vec::new(), 0, &mut node_count);
    Self {
      root,
      node_count,
      filter_active: false,
    }
  }

  pub fn root(&self) -> &JsonNode {
    &self.root
  }

  pub fn node_count(&self) -> usize {
    self.node_count
  }

  pub fn has_filter(&self) -> bool {
    self.filter_active
  }

  /// Whether `node`'s children are rows (subject to their own visibility).
  /// A filter reveals matches under collapsed ancestors, so it opens everything.
  pub fn is_open(&self, node: &JsonNode) -> bool {
    !node.hidden && (self.filter_active || node.expanded)
  }

  /// Collapse-aware count while unfiltered, collapse-ignoring while filtered.
  pub fn visible_count(&self, node: &JsonNode) -> usize {
    node.visible_descendant_count(self.filter_active)
  }

  /// Visible rows, excluding the root container.
  pub fn total_visible_rows(&self) -> usize {
    self.visible_count(&self.root).saturating_sub(1)
  }

  /// Iterator with the standard visibility predicates: hidden nodes are skipped, collapsed
  /// nodes are not descended into unless a filter is active.
  pub fn iter(&self) -> TreeIterator<'_, JsonNode> {
    let skip: Predicate<'_, JsonNode> = &hidden;
    let skip_children = if self.filter_active {
      None
    } else {
      let p: Predicate<'_, JsonNode> = &collapsed;
      Some(p)
    };
    TreeIterator::with_predicates(&self.root, Some(skip), skip_children)
  }

  /// Deepest node matching a prefix of `path`. Compare `path().len()` to detect a partial match.
  pub fn node_at_path(&self, path: &[JsonPathSegment]) -> &JsonNode {
    let mut node = &self.root;
    for seg in path {
      match node.child_position(seg).and_then(|i| node.children()?.get(i)) {
        Some(child) => node = child,
        None => break,
      }
    }
    node
  }

  pub fn resolve(&self, path: &[JsonPathSegment]) -> Option<&JsonNode> {
    let node = self.node_at_path(path);
    (node.depth() == path.len()).then_some(node)
  }

  /// Child positions from the root to the node at `path`.
  pub fn index_path_of(&self, path: &[JsonPathSegment]) -> Option<Vec<usize>> {
    self.root.index_path_to(path)
  }

  /// True when the node exists and would appear as a row.
  pub fn is_visible(&self, path: &[JsonPathSegment]) -> bool {
    if path.is_empty() {
      return false;
    }
    let mut node = &self.root;
    for (depth, seg) in path.iter().enumerate() {
      if depth > 0 && !self.is_open(node) {
        return false;
      }
      match node.child_position(seg).and_then(|i| node.children()?.get(i)) {
        Some(child) if !child.hidden => node = child,
        _ => return false,
      }
    }
    true
  }

  /// Set one node's expand flag. Only an exact path match is mutated; the root stays expanded.
  ///
  /// Invalidates cached counts on the node and its ancestors only.
  pub fn set_expanded(&mut self, path: &[JsonPathSegment], expanded: bool) -> bool {
    if path.is_empty() {
      return false;
    }
    match self.node_mut(path) {
      Some(node) => {
        node.expanded = expanded;
        true
      }
      None => false,
    }
  }

  /// Flip one node's expand flag, returning the new value.
  pub fn toggle_expanded(&mut self, path: &[JsonPathSegment]) -> Option<bool> {
    if path.is_empty() {
      return None;
    }
    let node = self.node_mut(path)?;
    node.expanded = !node.expanded;
    Some(node.expanded)
  }

  /// Force every node's expand flag. The root is always left expanded.
  pub fn set_expanded_all(&mut self, expanded: bool) {
    fn walk(node: &mut JsonNode, expanded: bool) {
      node.expanded = expanded;
      node.invalidate();
      if let Some(children) = node.children_mut() {
        for c in children {
          walk(c, expanded);
        }
      }
    }
    walk(&mut self.root, expanded);
    self.root.expanded = true;
  }

  /// Post-order filter pass: a node is hidden when it does not match and (for a non-empty
  /// container) all of its children are hidden.
  pub fn apply_filter(&mut self, filter: &NodeFilter) {
    fn walk(node: &mut JsonNode, filter: &NodeFilter) {
      node.invalidate();
      let all_children_hidden = match node.children_mut() {
        Some(children) if !children.is_empty() => {
          for c in children.iter_mut() {
            walk(c, filter);
          }
          Some(children.iter().all(|c| c.hidden))
        }
        _ => None,
      };
      let self_hidden = !filter.matches(node);
      node.hidden = match all_children_hidden {
        Some(all_hidden) => self_hidden && all_hidden,
        None => self_hidden,
      };
    }
    walk(&mut self.root, filter);
    self.filter_active = true;
  }

  pub fn clear_filter(&mut self) {
    fn walk(node: &mut JsonNode) {
      node.hidden = false;
      node.invalidate();
      if let Some(children) = node.children_mut() {
        for c in children {
          walk(c);
        }
      }
    }
    walk(&mut self.root);
    self.filter_active = false;
  }

  /// Walk `path` mutably, invalidating each node on the way. `None` unless the whole path resolves.
  fn node_mut(&mut self, path: &[JsonPathSegment]) -> Option<&mut JsonNode> {
    let index_path = self.index_path_of(path)?;
    let mut node = &mut self.root;
    node.invalidate();
    for i in index_path {
      node = node.children_mut()?.get_mut(i)?;
      node.invalidate();
    }
    Some(node)
  }
}
