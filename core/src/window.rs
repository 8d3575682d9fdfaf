//! Translation between visible row indices and tree paths, and lazy row windows.
//!
//! Nothing here flattens the tree: lookups descend along one root-to-node path using the
//! memoized per-node visible counts.

use crate::{
  iterator::{Step, TreeItem, TreeIterator},
  models::JsonPathSegment,
  tree::{JsonNode, JsonTree},
};

/// Visible row index of the node at `path`.
///
/// A path that stops resolving (unknown segment, hidden node, collapsed ancestor) is truncated
/// to its deepest visible ancestor. `None` when not even the first segment is visible.
pub fn index_of_path(tree: &JsonTree, path: &[JsonPathSegment]) -> Option<usize> {
  let mut node = tree.root();
  let mut acc = 0usize;
  let mut found = None;
  for (depth, seg) in path.iter().enumerate() {
    if depth > 0 {
      if !tree.is_open(node) {
        break;
      }
      // Step over the parent row itself.
      acc += 1;
    }
    let Some(children) = node.children() else {
      break;
    };
    let Some(pos) = node.child_position(seg) else {
      break;
    };
    let child = &children[pos];
    if child.is_hidden() {
      break;
    }
    acc += children[..pos]
      .iter()
      .map(|c| tree.visible_count(c))
      .sum::<usize>();
    found = Some(acc);
    node = child;
  }
  found
}

/// Node shown at visible row `index`, or `None` past the end.
pub fn item_at_index(tree: &JsonTree, index: usize) -> Option<&JsonNode> {
  let mut node = tree.root();
  let mut remaining = index;
  loop {
    let children = node.children()?;
    let mut next = None;
    for child in children {
      let span = tree.visible_count(child);
      if span == 0 {
        continue;
      }
      if remaining == 0 {
        return Some(child);
      }
      if remaining < span {
        remaining -= 1;
        next = Some(child);
        break;
      }
      remaining -= span;
    }
    node = next?;
  }
}

/// Node at iterator `index_path`, provided it is currently shown as a row.
pub fn node_at_index_path<'a>(tree: &'a JsonTree, index_path: &[usize]) -> Option<&'a JsonNode> {
  if index_path.is_empty() {
    return None;
  }
  let mut node = tree.root();
  for &i in index_path {
    node = node.children()?.get(i)?;
  }
  tree.is_visible(node.path()).then_some(node)
}

pub fn path_at_index(tree: &JsonTree, index: usize) -> Option<Vec<JsonPathSegment>> {
  item_at_index(tree, index).map(|n| n.path().to_vec())
}

/// Position `it` on the visible node at `path` with a directed walk.
///
/// Returns the node when the walk reached exactly `path`.
pub fn seek_path<'a>(
  it: &mut TreeIterator<'a, JsonNode>,
  path: &[JsonPathSegment],
) -> Option<&'a JsonNode> {
  if path.is_empty() || !it.first() {
    return None;
  }
  let target = it.tree().index_path_to(path)?;
  let found = it.forward(|_, index_path| {
    let depth = index_path.len() - 1;
    match target.get(depth) {
      Some(&want) if index_path[depth] == want => {
        if depth + 1 == target.len() {
          Step::Stop
        } else {
          Step::Child
        }
      }
      Some(&want) if index_path[depth] < want => Step::Sibling,
      _ => Step::Stop,
    }
  })?;
  (it.index_path() == target.as_slice()).then_some(found)
}

/// Lazy, finite run of visible nodes produced by stepping a private iterator.
///
/// Single-use: once exhausted it stays exhausted.
#[derive(Debug, Clone)]
pub struct VisibleSlice<'a> {
  it: Option<TreeIterator<'a, JsonNode>>,
  remaining: usize,
  yield_current: bool,
}

impl<'a> VisibleSlice<'a> {
  fn empty() -> Self {
    Self {
      it: None,
      remaining: 0,
      yield_current: false,
    }
  }

  /// Index-path of the last node yielded; the resume point for cursor paging.
  pub fn position(&self) -> Option<&[usize]> {
    self.it.as_ref().map(|it| it.index_path())
  }

  /// Whether another visible node follows the last one yielded.
  pub fn has_more(&self) -> bool {
    match &self.it {
      Some(it) if !self.yield_current => it.clone().next(),
      Some(it) => it.current().is_some(),
      None => false,
    }
  }
}

impl<'a> Iterator for VisibleSlice<'a> {
  type Item = &'a JsonNode;

  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }
    let it = self.it.as_mut()?;
    if self.yield_current {
      self.yield_current = false;
    } else if !it.next() {
      self.remaining = 0;
      return None;
    }
    self.remaining -= 1;
    it.current()
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (0, Some(self.remaining))
  }
}

/// Up to `length` visible nodes starting at row `start_index`.
///
/// Empty when `start_index` is past the last row.
pub fn slice_visible(tree: &JsonTree, start_index: usize, length: usize) -> VisibleSlice<'_> {
  if length == 0 {
    return VisibleSlice::empty();
  }
  let Some(start) = item_at_index(tree, start_index) else {
    return VisibleSlice::empty();
  };
  let mut it = tree.iter();
  if seek_path(&mut it, start.path()).is_none() {
    return VisibleSlice::empty();
  }
  VisibleSlice {
    it: Some(it),
    remaining: length,
    yield_current: true,
  }
}

/// Up to `length` visible nodes following the node at `index_path` (exclusive).
///
/// An empty `index_path` starts from the first visible row (inclusive).
pub fn slice_after<'a>(tree: &'a JsonTree, index_path: &[usize], length: usize) -> VisibleSlice<'a> {
  let mut it = tree.iter();
  if index_path.is_empty() {
    if it.current().is_none() {
      return VisibleSlice::empty();
    }
    return VisibleSlice {
      it: Some(it),
      remaining: length,
      yield_current: true,
    };
  }
  let Some(node) = node_at_index_path(tree, index_path) else {
    return VisibleSlice::empty();
  };
  if seek_path(&mut it, node.path()).is_none() {
    return VisibleSlice::empty();
  }
  VisibleSlice {
    it: Some(it),
    remaining: length,
    yield_current: false,
  }
}

/// Visible node after `path`; wraps to the first row at the end or when `path` is not found.
pub fn next_visible<'a>(tree: &'a JsonTree, path: Option<&[JsonPathSegment]>) -> Option<&'a JsonNode> {
  let mut it = tree.iter();
  if let Some(path) = path {
    if seek_path(&mut it, path).is_some() && it.next() {
      return it.current();
    }
  }
  it.first();
  it.current()
}

/// Visible node before `path`; wraps to the last row at the start or when `path` is not found.
pub fn previous_visible<'a>(
  tree: &'a JsonTree,
  path: Option<&[JsonPathSegment]>,
) -> Option<&'a JsonNode> {
  let mut it = tree.iter();
  if let Some(path) = path {
    if seek_path(&mut it, path).is_some() && it.previous() {
      return it.current();
    }
  }
  it.last();
  it.current()
}

pub fn first_visible(tree: &JsonTree) -> Option<&JsonNode> {
  let mut it = tree.iter();
  it.first();
  it.current()
}

pub fn last_visible(tree: &JsonTree) -> Option<&JsonNode> {
  let mut it = tree.iter();
  it.last();
  it.current()
}
