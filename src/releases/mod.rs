// src/releases/mod.rs
// =============================================================================
// This module handles the GitHub release download statistics.
//
// Submodules:
// - model: Typed Release/Asset structs, classification heuristics and
//   per-OS aggregation
// - fetch: Sequential paginated fetch of the releases API
//
// Rust concepts:
// - Modules: Organizing related functionality
// - Public API: What other parts of the app can use
// =============================================================================

mod fetch;
mod model;

// Re-export the public API
pub use fetch::{fetch_releases, DEFAULT_OWNER, DEFAULT_REPO};
pub use model::{Asset, OsDownloads, Release};
