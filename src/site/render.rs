// src/site/render.rs
// =============================================================================
// Renders a SiteTree as an indented text tree for the terminal:
//
//   example.com
//   ├── about
//   └── blog
//       ├── 2023
//       └── 2024
// =============================================================================

use super::SiteTree;

/// Renders the tree, one node per line, root first. The output ends with a
/// newline.
pub fn render(tree: &SiteTree) -> String {
    let mut out = String::new();
    out.push_str(&tree.value);
    out.push('\n');
    render_children(tree, "", &mut out);
    out
}

// `prefix` is the run of "│   " / "    " columns inherited from ancestors
fn render_children(tree: &SiteTree, prefix: &str, out: &mut String) {
    let last = tree.children.len().saturating_sub(1);
    for (i, child) in tree.children.iter().enumerate() {
        let (branch, indent) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&child.value);
        out.push('\n');
        render_children(child, &format!("{prefix}{indent}"), out);
    }
}
