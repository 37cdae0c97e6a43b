// src/keybindings/mod.rs
// =============================================================================
// This module contains the JSON -> LaTeX keybinding documentation pipeline.
//
// Submodules:
// - escape: Escapes LaTeX-special characters in free text
// - entry: Normalizes raw JSON records into canonical entries
// - table: Groups entries by category and renders the LaTeX tables
//
// This file (mod.rs) is the module root - it exposes the one-call API the
// rest of the application uses: raw records + template text in, finished
// document text out. Reading the input files and writing the output file
// stay with the caller.
//
// Rust concepts:
// - Modules: Organize code into namespaces
// - pub use: Re-export items to simplify imports for users of this module
// - thiserror: Derive readable error messages for the domain errors
// =============================================================================

mod entry;
mod escape;
mod table;

// Re-export public items from submodules
pub use entry::{Binding, KeybindingEntry, RawKeybinding};
pub use escape::escape_latex_text;
pub use table::KeybindingTables;

use thiserror::Error;
use tracing::info;

// The template file must contain this token; it is replaced exactly once
// with the generated tables
pub const TEMPLATE_PLACEHOLDER: &str = "%{template}";

// Everything that can go wrong while normalizing or rendering keybindings.
// All of these are terminal: the run fails, nothing is retried and no
// partial output is written.
#[derive(Debug, Error)]
pub enum KeybindingError {
    /// A raw binding's "key" was an array with more or fewer than one key
    #[error("ambiguous binding for input method '{input_method}': expected a single key, got {count}")]
    InvalidBinding { input_method: String, count: usize },

    /// A category title too long to word-wrap inside a table header
    #[error("category title '{title}' is too long to render (the cap is 50 characters)")]
    CategoryTitleTooLong { title: String },
}

// Renders the full keybindings document
//
// Parameters:
//   records: the merged raw records from every input file
//   template: the template text containing the %{template} placeholder
//
// Returns: the template with the placeholder substituted (exactly once)
// by the generated tables, or the first normalization/rendering error.
pub fn render_document(
    records: Vec<RawKeybinding>,
    template: &str,
) -> Result<String, KeybindingError> {
    let total_keys: usize = records
        .iter()
        .map(|r| r.bindings.as_ref().map_or(0, |b| b.len()))
        .sum();
    let unbound_entries = records.iter().filter(|r| r.bindings.is_none()).count();
    info!(
        "Found {} entries; total keys: {}; unbound entries: {}",
        records.len(),
        total_keys,
        unbound_entries
    );

    info!("Parsing json entries.");
    let tables = KeybindingTables::from_raw_records(records)?;

    info!("Generating latex output.");
    let output = tables.render()?;

    Ok(template.replacen(TEMPLATE_PLACEHOLDER, &output, 1))
}
