// src/site/tree.rs
// =============================================================================
// The site tree.
//
// Each node is a path segment; the root is the crawled host. Adding
// "/docs/guide/intro" to a tree rooted at "example.com" gives:
//
//   example.com
//   └── docs
//       └── guide
//           └── intro
//
// Invariants held after every add():
// - siblings never share a value
// - children are always sorted ascending by value
//
// Because of those two rules the shape of the tree depends only on WHICH paths
// were added, never on the order they arrived in.
//
// Rust concepts:
// - Owned recursion: every node owns a Vec of child nodes, no parent pointers
// - Slices: &[&str] lets us walk the path segments without copying them
// - binary_search_by: gives us the match OR the sorted insertion point
// =============================================================================

use serde::{Deserialize, Serialize};

/// One node of a site tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteTree {
    /// The path segment (or the host, for the root)
    pub value: String,
    /// Sorted ascending by `value`, no duplicates
    pub children: Vec<SiteTree>,
}

impl SiteTree {
    /// Creates a tree with a single root node and no children.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// Adds a URL path to the tree.
    ///
    /// Leading and trailing `/` are ignored, so `/a/b/`, `a/b` and `/a/b` all
    /// land on the same node. A path that is empty after trimming (such as `/`)
    /// is represented by the root itself and changes nothing. Segments are
    /// always matched against the root's children, never against the root's own
    /// value, so a page at `/example.com` becomes a child of the root even when
    /// the root is `example.com`.
    ///
    /// Adding the same path twice leaves the tree unchanged.
    pub fn add(&mut self, path: &str) {
        let segments = segments(path);
        if segments.is_empty() {
            return;
        }
        self.insert(&segments);
    }

    // Walks down one level per segment. `segments` is never empty here.
    fn insert(&mut self, segments: &[&str]) {
        let (first, rest) = match segments.split_first() {
            Some(split) => split,
            None => return,
        };

        match self.child_index(first) {
            // Already have this segment: keep descending
            Ok(i) => {
                if !rest.is_empty() {
                    self.children[i].insert(rest);
                }
            }
            // New segment: build the whole remaining chain at once and slot it
            // in at the position binary search gave us
            Err(i) => self.children.insert(i, chain(first, rest)),
        }
    }

    fn child_index(&self, value: &str) -> Result<usize, usize> {
        self.children
            .binary_search_by(|child| child.value.as_str().cmp(value))
    }

    /// Returns true when every segment of `path` exists as a chain below the
    /// root. The empty path is always contained.
    pub fn contains(&self, path: &str) -> bool {
        let mut node = self;
        for segment in segments(path) {
            match node.child_index(segment) {
                Ok(i) => node = &node.children[i],
                Err(_) => return false,
            }
        }
        true
    }

    /// Looks up a direct child by value.
    pub fn child(&self, value: &str) -> Option<&SiteTree> {
        self.child_index(value).ok().map(|i| &self.children[i])
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SiteTree::node_count)
            .sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// Splits a path into its non-empty segments. Empty segments (from "a//b")
// would create nameless nodes, so they are dropped.
fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

// Builds first -> rest[0] -> rest[1] -> ... as a single-branch subtree.
fn chain(first: &str, rest: &[&str]) -> SiteTree {
    let mut node = SiteTree::new(first);
    if let Some((next, rest)) = rest.split_first() {
        node.children.push(chain(next, rest));
    }
    node
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Result<usize, usize> from binary_search_by?
//    - Ok(i) means "found it at index i"
//    - Err(i) means "not here, but inserting at i keeps the Vec sorted"
//    - One call answers both questions we need for sorted insertion
//
// 2. Why no parent pointers?
//    - We only ever walk from the root downwards
//    - Without back references every node has exactly one owner (its parent's
//      Vec), so there are no Rc/RefCell cycles to worry about
//
// 3. Why #[derive(Serialize, Deserialize)]?
//    - Callers hand finished trees to other systems (JSON, RPC, ...)
//    - serde generates the conversion code for us
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tree: &SiteTree) -> Vec<&str> {
        tree.children.iter().map(|c| c.value.as_str()).collect()
    }

    // Recursively checks sorted + unique siblings at every node
    fn assert_sorted(tree: &SiteTree) {
        for pair in tree.children.windows(2) {
            assert!(
                pair[0].value < pair[1].value,
                "children of '{}' out of order: '{}' then '{}'",
                tree.value,
                pair[0].value,
                pair[1].value
            );
        }
        for child in &tree.children {
            assert_sorted(child);
        }
    }

    #[test]
    fn test_empty_path_is_noop() {
        let mut tree = SiteTree::new("example.com");
        tree.add("");
        tree.add("/");
        tree.add("///");
        assert_eq!(tree, SiteTree::new("example.com"));
    }

    #[test]
    fn test_single_path_builds_chain() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/docs/guide/intro");

        assert_eq!(values(&tree), vec!["docs"]);
        let docs = tree.child("docs").unwrap();
        assert_eq!(values(docs), vec!["guide"]);
        let guide = docs.child("guide").unwrap();
        assert_eq!(values(guide), vec!["intro"]);
        assert!(guide.child("intro").unwrap().is_leaf());
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_prefix_merge() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/a/b");
        tree.add("/a/c");

        assert_eq!(values(&tree), vec!["a"]);
        assert_eq!(values(tree.child("a").unwrap()), vec!["b", "c"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut once = SiteTree::new("example.com");
        once.add("/a/b/c");

        let mut twice = once.clone();
        twice.add("/a/b/c");
        twice.add("a/b/c/");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_leading_and_trailing_slashes_ignored() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/about/");
        tree.add("about");
        assert_eq!(values(&tree), vec!["about"]);
    }

    #[test]
    fn test_children_sorted_regardless_of_insert_order() {
        let mut tree = SiteTree::new("example.com");
        for path in ["/m", "/z", "/a", "/k", "/b", "/y", "/a/z", "/a/a", "/a/m"] {
            tree.add(path);
        }
        assert_eq!(values(&tree), vec!["a", "b", "k", "m", "y", "z"]);
        assert_eq!(values(tree.child("a").unwrap()), vec!["a", "m", "z"]);
        assert_sorted(&tree);
    }

    #[test]
    fn test_shape_independent_of_order() {
        let paths = [
            "/blog/2024/hello",
            "/blog",
            "/about/team",
            "/blog/2023",
            "/about",
            "/contact",
            "/blog/2024/bye",
        ];

        let mut forward = SiteTree::new("example.com");
        for path in paths {
            forward.add(path);
        }
        let mut backward = SiteTree::new("example.com");
        for path in paths.iter().rev() {
            backward.add(path);
        }

        assert_eq!(forward, backward);
        assert_sorted(&forward);
    }

    #[test]
    fn test_sorted_invariant_many_paths() {
        // A deterministic pseudo-random mix of paths
        let mut tree = SiteTree::new("example.com");
        let words = ["x", "b", "q", "a", "m", "c", "zz", "aa"];
        for i in 0..200usize {
            let depth = 1 + i % 4;
            let path: Vec<&str> = (0..depth)
                .map(|d| words[(i * 7 + d * 13) % words.len()])
                .collect();
            tree.add(&path.join("/"));
        }
        assert_sorted(&tree);
    }

    #[test]
    fn test_repeated_segment_is_nested() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/docs/docs");
        assert!(tree.contains("/docs/docs"));
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_segment_equal_to_root_becomes_child() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/example.com/x");
        assert_eq!(values(&tree), vec!["example.com"]);
        assert!(tree.contains("example.com/x"));
    }

    #[test]
    fn test_double_slashes_collapse() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/a//b");
        assert!(tree.contains("/a/b"));
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_contains() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/a/b");
        assert!(tree.contains("/"));
        assert!(tree.contains("/a"));
        assert!(tree.contains("/a/b/"));
        assert!(!tree.contains("/b"));
        assert!(!tree.contains("/a/b/c"));
    }

    #[test]
    fn test_serializes_to_json() {
        let mut tree = SiteTree::new("example.com");
        tree.add("/a");
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": "example.com",
                "children": [{ "value": "a", "children": [] }]
            })
        );
    }
}
