//! Cursor over a generic multi-way tree.
//!
//! The tree root acts as a container: it is never a stopping point, and the
//! cursor always sits on one of its descendants (or nowhere, for an empty tree).
//! A position is the index-path of child offsets from the root, so saving and
//! restoring a cursor is a plain `Vec<usize>` copy.

/// A node with an optional ordered list of children.
///
/// `None` means leaf. `Some(&[])` is an empty container, which is still not a leaf.
pub trait TreeItem: Sized {
  fn children(&self) -> Option<&[Self]>;
}

/// Instruction returned by a [`TreeIterator::forward`] visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Sibling,
  Child,
  Stop,
}

pub type Predicate<'a, T> = &'a dyn Fn(&T) -> bool;

pub struct TreeIterator<'a, T> {
  tree: &'a T,
  index_path: Vec<usize>,
  skip: Option<Predicate<'a, T>>,
  skip_children: Option<Predicate<'a, T>>,
}

impl<T> Clone for TreeIterator<'_, T> {
  fn clone(&self) -> Self {
    Self {
      tree: self.tree,
      index_path: self.index_path.clone(),
      skip: self.skip,
      skip_children: self.skip_children,
    }
  }
}

impl<T> std::fmt::Debug for TreeIterator<'_, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TreeIterator")
      .field("index_path", &self.index_path)
      .field("skip", &self.skip.is_some())
      .field("skip_children", &self.skip_children.is_some())
      .finish()
  }
}

impl<'a, T: TreeItem> TreeIterator<'a, T> {
  /// Unfiltered iterator positioned at the first node.
  pub fn new(tree: &'a T) -> Self {
    Self::with_predicates(tree, None, None)
  }

  /// - `skip`: the node and its whole subtree are never stopping points.
  /// - `skip_children`: the node is a stopping point but is never descended into.
  ///
  /// Neither predicate is applied to the root container.
  pub fn with_predicates(
    tree: &'a T,
    skip: Option<Predicate<'a, T>>,
    skip_children: Option<Predicate<'a, T>>,
  ) -> Self {
    let mut it = Self {
      tree,
      index_path: Vec::new(),
      skip,
      skip_children,
    };
    it.first();
    it
  }

  pub fn tree(&self) -> &'a T {
    self.tree
  }

  /// Node under the cursor; `None` only when the tree has no unskipped node.
  pub fn current(&self) -> Option<&'a T> {
    if self.index_path.is_empty() {
      return None;
    }
    self.item_at(&self.index_path)
  }

  pub fn index_path(&self) -> &[usize] {
    &self.index_path
  }

  /// Move the cursor to an index-path saved earlier.
  ///
  /// Fails (leaving the cursor untouched) when the path does not resolve to a node.
  /// Predicates are not consulted: restoring onto a now-skipped node is allowed, and the
  /// next step continues from there.
  pub fn seek(&mut self, index_path: &[usize]) -> bool {
    if index_path.is_empty() || self.item_at(index_path).is_none() {
      return false;
    }
    self.index_path.clear();
    self.index_path.extend_from_slice(index_path);
    true
  }

  /// Next node in pre-order. Returns false and keeps the cursor in place at the end.
  pub fn next(&mut self) -> bool {
    if self.go_to_child() {
      return true;
    }
    if self.go_to_right_sibling() {
      return true;
    }

    let saved = self.index_path.clone();
    while self.go_to_parent() {
      if self.go_to_right_sibling() {
        return true;
      }
    }
    self.index_path = saved;
    false
  }

  /// Previous node in pre-order. Returns false at the first node.
  pub fn previous(&mut self) -> bool {
    if self.index_path.is_empty() {
      return false;
    }
    if self.go_to_left_sibling() {
      self.go_to_right_most_descendant();
      return true;
    }
    self.go_to_parent()
  }

  /// Jump to the first node. Returns whether the tree has one.
  pub fn first(&mut self) -> bool {
    self.index_path.clear();
    self.go_to_child()
  }

  /// Jump to the right-most reachable descendant. Returns whether the tree has one.
  pub fn last(&mut self) -> bool {
    self.index_path.clear();
    self.go_to_right_most_descendant()
  }

  /// Directed walk: `visit` decides at each node whether to move to the next sibling,
  /// descend into the first child, or stop.
  ///
  /// The walk ends at the node where `visit` returns [`Step::Stop`], or where the
  /// requested move is impossible; that node is returned. Callers check the result
  /// against the node they were seeking.
  pub fn forward<F>(&mut self, mut visit: F) -> Option<&'a T>
  where
    F: FnMut(&'a T, &[usize]) -> Step,
  {
    loop {
      let item = self.current()?;
      let moved = match visit(item, &self.index_path) {
        Step::Sibling => self.go_to_right_sibling(),
        Step::Child => self.go_to_child(),
        Step::Stop => return Some(item),
      };
      if !moved {
        return Some(item);
      }
    }
  }

  fn item_at(&self, index_path: &[usize]) -> Option<&'a T> {
    let mut item = self.tree;
    for &i in index_path {
      item = item.children()?.get(i)?;
    }
    Some(item)
  }

  fn node(&self) -> Option<&'a T> {
    self.item_at(&self.index_path)
  }

  fn parent(&self) -> Option<&'a T> {
    let (_, parent_path) = self.index_path.split_last()?;
    self.item_at(parent_path)
  }

  fn is_skip(&self, item: &T) -> bool {
    self.skip.is_some_and(|f| f(item))
  }

  fn is_skip_children(&self, item: &T) -> bool {
    !self.index_path.is_empty() && self.skip_children.is_some_and(|f| f(item))
  }

  fn skip_forward(&self, children: &[T], from: usize) -> Option<usize> {
    (from..children.len()).find(|&i| !self.is_skip(&children[i]))
  }

  fn skip_backward(&self, children: &[T], end: usize) -> Option<usize> {
    (0..end.min(children.len())).rev().find(|&i| !self.is_skip(&children[i]))
  }

  fn go_to_parent(&mut self) -> bool {
    if self.index_path.len() <= 1 {
      return false;
    }
    self.index_path.pop();
    true
  }

  fn go_to_child(&mut self) -> bool {
    let Some(item) = self.node() else {
      return false;
    };
    if self.is_skip_children(item) {
      return false;
    }
    let Some(children) = item.children() else {
      return false;
    };
    match self.skip_forward(children, 0) {
      Some(i) => {
        self.index_path.push(i);
        true
      }
      None => false,
    }
  }

  fn go_to_right_most_child(&mut self) -> bool {
    let Some(item) = self.node() else {
      return false;
    };
    if self.is_skip_children(item) {
      return false;
    }
    let Some(children) = item.children() else {
      return false;
    };
    match self.skip_backward(children, children.len()) {
      Some(i) => {
        self.index_path.push(i);
        true
      }
      None => false,
    }
  }

  fn go_to_right_most_descendant(&mut self) -> bool {
    if !self.go_to_right_most_child() {
      return false;
    }
    while self.go_to_right_most_child() {}
    true
  }

  fn go_to_right_sibling(&mut self) -> bool {
    let Some(&i) = self.index_path.last() else {
      return false;
    };
    let Some(children) = self.parent().and_then(|p| p.children()) else {
      return false;
    };
    match self.skip_forward(children, i + 1) {
      Some(j) => {
        if let Some(last) = self.index_path.last_mut() {
          *last = j;
        }
        true
      }
      None => false,
    }
  }

  fn go_to_left_sibling(&mut self) -> bool {
    let Some(&i) = self.index_path.last() else {
      return false;
    };
    let Some(children) = self.parent().and_then(|p| p.children()) else {
      return false;
    };
    match self.skip_backward(children, i) {
      Some(j) => {
        if let Some(last) = self.index_path.last_mut() {
          *last = j;
        }
        true
      }
      None => false,
    }
  }
}
