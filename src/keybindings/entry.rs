// src/keybindings/entry.rs
// =============================================================================
// This module turns raw JSON keybinding records into canonical entries.
//
// The CDDA keybindings.json format is loose: category, name and bindings are
// all optional, and a binding's "key" field can be either a string or an
// array. Normalization happens exactly once, here, at construction time:
// - category defaults to "General"
// - name defaults to the id, title-cased with underscores turned into spaces
// - bindings default to an empty list (rendered later as "<unbound>")
// After construction an entry is immutable; the formatter only reads it.
//
// Rust concepts:
// - serde derive: Mapping loose JSON onto typed structs
// - Untagged enums: Accepting "key": "j" and "key": ["j"] with one type
// - Result: Failing fast on ambiguous input instead of guessing
// =============================================================================

use serde::Deserialize;
use tracing::debug;

use super::escape::escape_latex_text;
use super::KeybindingError;

// A raw record exactly as it appears in the JSON input.
// Unknown fields (CDDA files carry "type" and friends) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawKeybinding {
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bindings: Option<Vec<RawBinding>>,
}

// One raw input-method/key pair from the JSON input
#[derive(Debug, Clone, Deserialize)]
pub struct RawBinding {
    pub input_method: String,
    pub key: RawKey,
}

// The "key" field comes in two shapes in the wild: a plain string or an
// array of strings. An array is only valid when it holds exactly one key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawKey {
    Single(String),
    Many(Vec<String>),
}

// One canonical input-method/key pair, immutable after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub input_method: String,
    pub key: String,
}

impl Binding {
    // Builds a Binding from a raw record
    //
    // Fails with InvalidBinding when the raw "key" is an array whose length
    // is not exactly 1 - an ambiguous multi-key binding we refuse to guess at.
    pub fn from_raw(raw: RawBinding) -> Result<Self, KeybindingError> {
        let key = match raw.key {
            RawKey::Single(key) => key,
            RawKey::Many(mut keys) => {
                if keys.len() != 1 {
                    return Err(KeybindingError::InvalidBinding {
                        input_method: raw.input_method,
                        count: keys.len(),
                    });
                }
                keys.remove(0)
            }
        };

        Ok(Binding {
            input_method: raw.input_method,
            key,
        })
    }

    // Renders this binding as the "input & key" tail of a table row
    //
    // An empty key means the action is unbound; both columns get the
    // placeholder so the row stays visually complete.
    pub fn to_latex(&self) -> String {
        if self.key.is_empty() {
            return "<unbound> & <unbound>".to_string();
        }
        let key = escape_latex_text(&self.key);
        format!("{} & \\cmd{{{}}}", self.input_method, key)
    }

    // Whether two bindings refer to the same key, case-insensitively
    // ("A" and "a" are the same physical key)
    pub fn is_same_binding(&self, other: &Binding) -> bool {
        self.key.to_lowercase() == other.key.to_lowercase()
    }
}

// One documented action: id, category, display name and its bindings
#[derive(Debug, Clone)]
pub struct KeybindingEntry {
    pub id: String,
    pub category: String,
    pub name: String,
    pub bindings: Vec<Binding>,
}

impl KeybindingEntry {
    // Names longer than this wrap inside the table's name column, costing
    // extra physical lines in the rendered table
    pub const MAX_NAME_LINE_LENGTH: usize = 30;

    // Normalizes a raw record into a canonical entry
    //
    // Defaulting policy:
    //   category -> "General"
    //   name     -> title-cased id with underscores replaced by spaces
    //   bindings -> empty (rendered as "<unbound>")
    //
    // Bindings are sorted case-insensitively by key so multi-binding rows
    // come out in a stable order regardless of input order.
    pub fn from_raw(raw: RawKeybinding) -> Result<Self, KeybindingError> {
        let category = raw.category.unwrap_or_else(|| "General".to_string());

        let name = match raw.name {
            Some(name) => name,
            None => {
                let name = title_case(&raw.id).replace('_', " ");
                debug!("no name for: {}; replacing with: {}", raw.id, name);
                name
            }
        };

        let mut bindings = Vec::new();
        match raw.bindings {
            Some(raw_bindings) => {
                for raw_binding in raw_bindings {
                    bindings.push(Binding::from_raw(raw_binding)?);
                }
                bindings.sort_by_key(|b| b.key.to_lowercase());
            }
            None => debug!("no bindings for: {}", raw.id),
        }

        Ok(KeybindingEntry {
            id: raw.id,
            category,
            name,
            bindings,
        })
    }

    // How many physical table lines this entry occupies: one per binding
    // (minimum 1 for the "<unbound>" row) plus the wrap lines a long name
    // needs in the name column
    pub fn num_text_lines(&self) -> usize {
        let num_bindings = if self.bindings.is_empty() {
            1
        } else {
            self.bindings.len()
        };

        let name_len = self.name.chars().count();
        let lines_for_name = if name_len >= Self::MAX_NAME_LINE_LENGTH {
            name_len.div_ceil(Self::MAX_NAME_LINE_LENGTH)
        } else {
            0
        };

        num_bindings + lines_for_name
    }

    // The presentation title of this entry's category
    // ("aim_menu" -> "Aim Menu"; "combat" and "Combat" both -> "Combat")
    pub fn category_title(&self) -> String {
        title_case(&self.category.replace('_', " "))
    }

    // Renders this entry as one or more LaTeX table rows (without row colors,
    // which the formatter adds)
    //
    // Parameters:
    //   is_last_entry: the final entry of a category ends with a hard '\\'
    //                  terminator; every other entry ends with '\hlx' so the
    //                  alternating color banding stays unbroken
    //
    // Multi-binding entries are touchy because of the row colors: the first
    // N-1 bindings render with a blank name column, and the last row carries
    // a \multirow spanning backwards over all of them.
    pub fn to_latex(&self, is_last_entry: bool) -> Vec<String> {
        let end_line = if is_last_entry { r"\\" } else { r"\hlx" };
        let mut rows = Vec::new();

        if self.bindings.len() <= 1 {
            // One or zero bindings: a single plain row
            let bindings = match self.bindings.first() {
                Some(binding) => binding.to_latex(),
                None => "<unbound> & <unbound>".to_string(),
            };
            let name = escape_latex_text(&self.name);
            rows.push(format!("{name} & {bindings} {end_line}"));
        } else {
            for (i, binding) in self.bindings.iter().enumerate() {
                if i == self.bindings.len() - 1 {
                    // Last binding: span the name cell back over all rows
                    let cell = format!(
                        "\\multirow{{-{}}}{{*}}{{{}}}",
                        self.bindings.len(),
                        escape_latex_text(&self.name)
                    );
                    rows.push(format!("{cell} & {} {end_line}", binding.to_latex()));
                } else {
                    rows.push(format!("& {} \\\\", binding.to_latex()));
                }
            }
        }

        rows
    }
}

// Title-cases a string the way the original documents were generated:
// a letter is uppercased when it follows a non-letter (start of string,
// space, underscore, digit) and lowercased otherwise.
//
// Example: "move_north" -> "Move_North", "ABC def" -> "Abc Def"
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(ch);
            prev_is_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawKeybinding {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_for_sparse_record() {
        let entry = KeybindingEntry::from_raw(raw(r#"{"id": "move_north"}"#)).unwrap();
        assert_eq!(entry.category, "General");
        assert_eq!(entry.name, "Move North");
        assert!(entry.bindings.is_empty());
    }

    #[test]
    fn test_explicit_fields_win_over_defaults() {
        let entry = KeybindingEntry::from_raw(raw(
            r#"{"id": "quicksave", "category": "meta", "name": "Quick save"}"#,
        ))
        .unwrap();
        assert_eq!(entry.category, "meta");
        assert_eq!(entry.name, "Quick save");
    }

    #[test]
    fn test_key_accepts_string_or_singleton_array() {
        let entry = KeybindingEntry::from_raw(raw(
            r#"{"id": "x", "bindings": [
                {"input_method": "keyboard", "key": "a"},
                {"input_method": "keyboard", "key": ["b"]}
            ]}"#,
        ))
        .unwrap();
        assert_eq!(entry.bindings.len(), 2);
        assert_eq!(entry.bindings[0].key, "a");
        assert_eq!(entry.bindings[1].key, "b");
    }

    #[test]
    fn test_multi_key_array_is_rejected() {
        let result = KeybindingEntry::from_raw(raw(
            r#"{"id": "x", "bindings": [{"input_method": "keyboard", "key": ["a", "b"]}]}"#,
        ));
        assert!(matches!(
            result,
            Err(KeybindingError::InvalidBinding { count: 2, .. })
        ));
    }

    #[test]
    fn test_empty_key_array_is_rejected() {
        let result = KeybindingEntry::from_raw(raw(
            r#"{"id": "x", "bindings": [{"input_method": "keyboard", "key": []}]}"#,
        ));
        assert!(matches!(
            result,
            Err(KeybindingError::InvalidBinding { count: 0, .. })
        ));
    }

    #[test]
    fn test_bindings_sorted_case_insensitively() {
        let entry = KeybindingEntry::from_raw(raw(
            r#"{"id": "x", "bindings": [
                {"input_method": "keyboard", "key": "Z"},
                {"input_method": "keyboard", "key": "a"},
                {"input_method": "keyboard", "key": "B"}
            ]}"#,
        ))
        .unwrap();
        let keys: Vec<&str> = entry.bindings.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "B", "Z"]);
    }

    #[test]
    fn test_is_same_binding_ignores_case() {
        let a = Binding {
            input_method: "kb".to_string(),
            key: "A".to_string(),
        };
        let b = Binding {
            input_method: "kb".to_string(),
            key: "a".to_string(),
        };
        assert!(a.is_same_binding(&b));
    }

    #[test]
    fn test_num_text_lines_minimum_one() {
        let entry = KeybindingEntry::from_raw(raw(r#"{"id": "x", "name": "Short"}"#)).unwrap();
        assert_eq!(entry.num_text_lines(), 1);
    }

    #[test]
    fn test_num_text_lines_counts_bindings() {
        let entry = KeybindingEntry::from_raw(raw(
            r#"{"id": "x", "name": "Short", "bindings": [
                {"input_method": "keyboard", "key": "a"},
                {"input_method": "gamepad", "key": "b"}
            ]}"#,
        ))
        .unwrap();
        assert_eq!(entry.num_text_lines(), 2);
    }

    #[test]
    fn test_num_text_lines_adds_wrap_lines_for_long_names() {
        // 35 chars >= the 30-char threshold: ceil(35 / 30) = 2 extra lines
        let name = "a".repeat(35);
        let entry =
            KeybindingEntry::from_raw(raw(&format!(r#"{{"id": "x", "name": "{name}"}}"#))).unwrap();
        assert_eq!(entry.num_text_lines(), 1 + 2);
    }

    #[test]
    fn test_category_title_normalization() {
        let entry =
            KeybindingEntry::from_raw(raw(r#"{"id": "x", "category": "aim_menu"}"#)).unwrap();
        assert_eq!(entry.category_title(), "Aim Menu");
    }

    #[test]
    fn test_unbound_entry_renders_placeholders() {
        let entry = KeybindingEntry::from_raw(raw(r#"{"id": "x", "name": "X"}"#)).unwrap();
        let rows = entry.to_latex(true);
        assert_eq!(rows, vec![r"X & <unbound> & <unbound> \\"]);
    }

    #[test]
    fn test_single_binding_row() {
        let entry = KeybindingEntry::from_raw(raw(
            r#"{"id": "x", "name": "X", "bindings": [{"input_method": "keyboard", "key": "j"}]}"#,
        ))
        .unwrap();
        let rows = entry.to_latex(false);
        assert_eq!(rows, vec![r"X & keyboard & \cmd{j} \hlx"]);
    }

    #[test]
    fn test_multi_binding_rows_span_name_cell() {
        let entry = KeybindingEntry::from_raw(raw(
            r#"{"id": "x", "name": "X", "bindings": [
                {"input_method": "keyboard", "key": "a"},
                {"input_method": "keyboard", "key": "b"}
            ]}"#,
        ))
        .unwrap();
        let rows = entry.to_latex(true);
        assert_eq!(
            rows,
            vec![
                r"& keyboard & \cmd{a} \\",
                r"\multirow{-2}{*}{X} & keyboard & \cmd{b} \\",
            ]
        );
    }

    #[test]
    fn test_name_with_specials_is_escaped() {
        let entry = KeybindingEntry::from_raw(raw(r#"{"id": "x", "name": "Drop & run"}"#)).unwrap();
        let rows = entry.to_latex(true);
        assert_eq!(rows, vec![r"Drop \& run & <unbound> & <unbound> \\"]);
    }

    #[test]
    fn test_title_case_matches_generated_docs() {
        assert_eq!(title_case("move_north"), "Move_North");
        assert_eq!(title_case("ABC def"), "Abc Def");
        assert_eq!(title_case("pause4effect"), "Pause4Effect");
    }
}
