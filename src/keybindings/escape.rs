// src/keybindings/escape.rs
// =============================================================================
// This module escapes free text before it gets embedded in LaTeX markup.
//
// LaTeX treats several ASCII characters as markup, so any user-controlled
// text (key names, action names) must be escaped before we paste it into
// a table cell.
//
// Two escape layers:
// - Simple escapes: & % $ # _ { } are prefixed with a backslash
// - Complex escapes: \ ~ ^ are replaced with their named LaTeX commands,
//   but ONLY when the whole input is a single character (a bare key cap).
//   Multi-character strings keep these characters as-is. This narrow rule
//   matches the behavior the rest of the documents were built around, so
//   it must not be generalized.
//
// Rust concepts:
// - char iteration: Scanning a string one character at a time
// - match: Mapping specific characters to replacements
// - String building: Growing an output string with push/push_str
// =============================================================================

// Escapes LaTeX-special characters in a piece of free text
//
// Parameters:
//   text: the raw text to escape (borrowed as &str)
//
// Returns: String with all needed substitutions applied
//
// Rules, applied in order:
// 1. Every occurrence of & % $ # _ { } gets a backslash prefix.
// 2. If the input is exactly one character long, ~ ^ \ map to
//    \textasciitilde, \textasciicircum and \textbackslash.
// 3. A literal single space becomes the token "<space>".
//
// NOT idempotent: feeding an already-escaped string back in will
// double-escape it (e.g. "\&" -> "\&" stays, but "\" alone maps away).
// Callers must escape exactly once.
//
// Example:
//   escape_latex_text("100% & $5") -> "100\\% \\& \\$5"
//   escape_latex_text("~")         -> "\\textasciitilde"
//   escape_latex_text("a~b")       -> "a~b" (tilde untouched, input too long)
pub fn escape_latex_text(text: &str) -> String {
    const SIMPLE_ESCAPES: &str = "&%$#_{}";

    // Single pass: copy every character, prefixing the simple set with '\'
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if SIMPLE_ESCAPES.contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    // The complex map only applies to single-character inputs. Anything in
    // the simple set is already two characters by now, so checking the
    // escaped string here matches checking the original.
    if escaped.chars().count() == 1 {
        match escaped.chars().next() {
            Some('~') => return r"\textasciitilde".to_string(),
            Some('^') => return r"\textasciicircum".to_string(),
            Some('\\') => return r"\textbackslash".to_string(),
            _ => {}
        }
    }

    if escaped == " " {
        return "<space>".to_string();
    }

    escaped
}
