use jt_core::{Predicate, Step, TreeItem, TreeIterator};

#[derive(Debug)]
struct N {
  value: i32,
  children: Option<Vec<N>>,
}

impl TreeItem for N {
  fn children(&self) -> Option<&[N]> {
    self.children.as_deref()
  }
}

fn leaf(value: i32) -> N {
  N {
    value,
    children: None,
  }
}

fn node(value: i32, children: Vec<N>) -> N {
  N {
    value,
    children: Some(children),
  }
}

fn root(children: Vec<N>) -> N {
  node(-1, children)
}

fn pred<'a>(f: &'a dyn Fn(&N) -> bool) -> Option<Predicate<'a, N>> {
  Some(f)
}

fn value(it: &TreeIterator<'_, N>) -> Option<i32> {
  it.current().map(|n| n.value)
}

// 0 -> 1 -> (2, 3)
fn small_tree() -> N {
  root(vec![node(0, vec![node(1, vec![leaf(2), leaf(3)])])])
}

// 0 -> 1 -> (2, 3); 4 -> 5
fn two_branch_tree() -> N {
  root(vec![
    node(0, vec![node(1, vec![leaf(2), leaf(3)])]),
    node(4, vec![leaf(5)]),
  ])
}

#[test]
fn empty_tree_has_no_current() {
  let tree = root(vec![]);
  let mut it = TreeIterator::new(&tree);
  assert_eq!(value(&it), None);
  assert!(!it.next());
  assert_eq!(value(&it), None);
  assert!(!it.previous());
  assert_eq!(value(&it), None);
  assert!(!it.first());
  assert!(!it.last());
}

#[test]
fn single_node_tree_stays_put() {
  let tree = root(vec![leaf(0)]);
  let mut it = TreeIterator::new(&tree);
  assert_eq!(value(&it), Some(0));
  assert!(!it.next());
  assert_eq!(value(&it), Some(0));
  assert!(!it.previous());
  assert_eq!(value(&it), Some(0));
}

#[test]
fn first_and_last() {
  let tree = root(vec![leaf(0), leaf(1)]);
  let mut it = TreeIterator::new(&tree);
  assert!(it.last());
  assert_eq!(value(&it), Some(1));
  assert!(it.first());
  assert_eq!(value(&it), Some(0));
  assert!(it.next());
  assert_eq!(value(&it), Some(1));
  it.first();
  assert_eq!(value(&it), Some(0));
}

#[test]
fn last_descends_to_right_most_leaf() {
  let tree = two_branch_tree();
  let mut it = TreeIterator::new(&tree);
  it.last();
  assert_eq!(value(&it), Some(5));
  assert_eq!(it.index_path(), &[1, 0]);
}

#[test]
fn first_and_last_with_skip() {
  let tree = root(vec![leaf(0), leaf(1)]);

  let skip_zero = |n: &N| n.value == 0;
  let mut it = TreeIterator::with_predicates(&tree, pred(&skip_zero), None);
  it.first();
  assert_eq!(value(&it), Some(1));

  let skip_one = |n: &N| n.value == 1;
  let mut it = TreeIterator::with_predicates(&tree, pred(&skip_one), None);
  it.last();
  assert_eq!(value(&it), Some(0));
}

#[test]
fn forward_follows_visitor() {
  let tree = root(vec![
    node(0, vec![node(1, vec![leaf(2), leaf(3)])]),
    node(4, vec![node(5, vec![leaf(6), leaf(7)])]),
  ]);
  let mut it = TreeIterator::new(&tree);
  let found = it.forward(|n, _| match n.value {
    0 => Step::Sibling,
    4 => Step::Child,
    _ => Step::Stop,
  });
  assert_eq!(found.map(|n| n.value), Some(5));
  assert_eq!(value(&it), Some(5));
  assert_eq!(it.index_path(), &[1, 0]);
}

#[test]
fn forward_stops_where_move_is_impossible() {
  let tree = root(vec![leaf(0), leaf(1)]);
  let mut it = TreeIterator::new(&tree);
  let found = it.forward(|_, _| Step::Sibling);
  assert_eq!(found.map(|n| n.value), Some(1));

  it.first();
  let found = it.forward(|_, _| Step::Child);
  assert_eq!(found.map(|n| n.value), Some(0));
}

#[test]
fn iterate_small_tree_both_ways() {
  let tree = small_tree();
  let mut it = TreeIterator::new(&tree);
  let mut seen = vec![value(&it).unwrap()];
  while it.next() {
    seen.push(value(&it).unwrap());
  }
  assert_eq!(seen, vec![0, 1, 2, 3]);
  assert_eq!(value(&it), Some(3));

  let mut back = vec![value(&it).unwrap()];
  while it.previous() {
    back.push(value(&it).unwrap());
  }
  assert_eq!(back, vec![3, 2, 1, 0]);
  assert_eq!(value(&it), Some(0));
}

#[test]
fn iterate_with_skipped_leaf() {
  let tree = small_tree();
  let skip = |n: &N| n.value == 2;
  let mut it = TreeIterator::with_predicates(&tree, pred(&skip), None);
  assert_eq!(value(&it), Some(0));
  assert!(it.next());
  assert_eq!(value(&it), Some(1));
  assert!(it.next());
  assert_eq!(value(&it), Some(3));
  assert!(!it.next());
  assert_eq!(value(&it), Some(3));

  assert!(it.previous());
  assert_eq!(value(&it), Some(1));
  assert!(it.previous());
  assert_eq!(value(&it), Some(0));
  assert!(!it.previous());
}

#[test]
fn iterate_with_skipped_subtree() {
  let tree = two_branch_tree();
  let skip = |n: &N| n.value == 1;
  let mut it = TreeIterator::with_predicates(&tree, pred(&skip), None);
  assert_eq!(value(&it), Some(0));
  assert!(it.next());
  assert_eq!(value(&it), Some(4));
  assert!(it.next());
  assert_eq!(value(&it), Some(5));
  assert!(!it.next());

  assert_eq!(value(&it), Some(5));
  assert!(it.previous());
  assert_eq!(value(&it), Some(4));
  assert!(it.previous());
  assert_eq!(value(&it), Some(0));
  assert!(!it.previous());
}

#[test]
fn iterate_with_skip_children() {
  let tree = two_branch_tree();
  let collapsed = |n: &N| n.value == 1;
  let mut it = TreeIterator::with_predicates(&tree, None, pred(&collapsed));
  assert_eq!(value(&it), Some(0));
  assert!(it.next());
  assert_eq!(value(&it), Some(1));
  assert!(it.next());
  assert_eq!(value(&it), Some(4));
  assert!(it.next());
  assert_eq!(value(&it), Some(5));
  assert!(!it.next());

  assert!(it.previous());
  assert_eq!(value(&it), Some(4));
  assert!(it.previous());
  assert_eq!(value(&it), Some(1));
  assert!(it.previous());
  assert_eq!(value(&it), Some(0));
  assert!(!it.previous());
}

#[test]
fn empty_container_is_a_stop_but_has_nothing_below() {
  let tree = root(vec![node(0, vec![]), leaf(1)]);
  let mut it = TreeIterator::new(&tree);
  assert_eq!(value(&it), Some(0));
  assert!(it.next());
  assert_eq!(value(&it), Some(1));
}

#[test]
fn saved_position_restores_on_a_second_cursor() {
  let tree = two_branch_tree();
  let mut a = TreeIterator::new(&tree);
  a.next();
  a.next();
  let saved = a.index_path().to_vec();
  assert_eq!(value(&a), Some(2));

  let mut b = TreeIterator::new(&tree);
  assert!(b.seek(&saved));
  assert_eq!(value(&b), Some(2));
  assert!(b.next());
  assert_eq!(value(&b), Some(3));
  // `a` is unaffected by `b` moving.
  assert_eq!(value(&a), Some(2));

  let mut c = a.clone();
  c.next();
  assert_eq!(value(&c), Some(3));
  assert_eq!(value(&a), Some(2));

  assert!(!b.seek(&[7, 7]));
  assert!(!b.seek(&[]));
  assert_eq!(value(&b), Some(3));
}
