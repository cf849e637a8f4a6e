// src/site/mod.rs
// =============================================================================
// This module holds the site tree: the sorted map of every path a crawl found.
//
// Submodules:
// - tree: the SiteTree data structure and path insertion
// - render: turns a SiteTree into an indented text tree for the terminal
//
// The tree has no concurrency of its own. Only the spider's orchestrator
// mutates it while a crawl runs; afterwards it belongs to the caller.
// =============================================================================

mod render;
mod tree;

pub use render::render;
pub use tree::SiteTree;
