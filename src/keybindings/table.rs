// src/keybindings/table.rs
// =============================================================================
// This module groups entries by category and renders them as LaTeX tables.
//
// How rendering works:
// 1. Entries are bucketed under their presentation category title and
//    sorted by display name; categories render in alphabetical order.
// 2. Each category is packed into blocks: a running line counter flushes
//    the pending rows into a finished table before an entry would push the
//    block to MAX_LINES, so no single table overflows a page.
// 3. Every block after the first for a category is a continuation and gets
//    " (cont.)" appended to its header title.
// 4. Row backgrounds alternate white/gray by entry index within the
//    category, NOT per block, so the banding carries across continuations.
//
// About multirows and colors, see:
// https://tex.stackexchange.com/questions/269547/rowcolor-for-a-multirow
//
// Rust concepts:
// - BTreeMap: Keeps category titles sorted, which makes output deterministic
// - Result: Header rendering can fail on unrenderably long titles
// =============================================================================

use std::collections::BTreeMap;

use super::entry::{KeybindingEntry, RawKeybinding};
use super::KeybindingError;

// All keybinding entries, grouped by category title and ready to render
#[derive(Debug)]
pub struct KeybindingTables {
    categories: BTreeMap<String, Vec<KeybindingEntry>>,
}

impl KeybindingTables {
    // A block is flushed before an entry would push it to this many lines
    const MAX_LINES: usize = 50;
    // Indentation of the row lines inside the generated LaTeX
    const TAB_SPACES: usize = 12;
    // Alternating row background colors
    const ROW_COLORS: [&'static str; 2] = ["white", "gray!10"];
    // Category titles render on one header line below this width
    const MAX_TITLE_LINE_LENGTH: usize = 25;
    // Titles at or beyond this length cannot be rendered at all
    const MAX_TITLE_LENGTH: usize = 50;

    // Normalizes raw records and groups them by category title
    //
    // "combat" and "Combat" both land under the single title "Combat".
    // Entries within a category are sorted by display name.
    pub fn from_raw_records(records: Vec<RawKeybinding>) -> Result<Self, KeybindingError> {
        let mut categories: BTreeMap<String, Vec<KeybindingEntry>> = BTreeMap::new();

        for record in records {
            let entry = KeybindingEntry::from_raw(record)?;
            categories
                .entry(entry.category_title())
                .or_default()
                .push(entry);
        }

        for entries in categories.values_mut() {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(KeybindingTables { categories })
    }

    // Renders every category as LaTeX tables, in alphabetical category order,
    // joined with newlines
    pub fn render(&self) -> Result<String, KeybindingError> {
        let mut tables = Vec::new();
        for category_name in self.categories.keys() {
            tables.push(self.category_table(category_name)?);
        }
        Ok(tables.join("\n"))
    }

    // Renders one category: one table per block, continuations separated
    // from the previous block by a blank line
    fn category_table(&self, category_name: &str) -> Result<String, KeybindingError> {
        let mut tables = Vec::new();
        for (i, block) in self.category_blocks(category_name).into_iter().enumerate() {
            let mut header = Self::table_header(category_name, i != 0, i == 0)?;
            if i > 0 {
                header = format!("\n{header}");
            }
            tables.push([header, block, Self::table_footer()].join("\n"));
        }
        Ok(tables.join("\n"))
    }

    // Packs a category's entries into blocks bounded by MAX_LINES
    //
    // The pending rows are flushed BEFORE adding an entry that would reach
    // the limit, so an entry never straddles two tables. The color index
    // follows the entry's position in the category so the alternation
    // survives a flush.
    fn category_blocks(&self, category_name: &str) -> Vec<String> {
        let entries = match self.categories.get(category_name) {
            Some(entries) => entries,
            None => return Vec::new(),
        };

        let mut blocks = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut total_lines = 0;

        for (i, entry) in entries.iter().enumerate() {
            let entry_lines = entry.num_text_lines();
            if entry_lines + total_lines >= Self::MAX_LINES {
                blocks.push(pending.join("\n"));
                pending.clear();
                total_lines = 0;
            }
            total_lines += entry_lines;

            let is_last_entry = i == entries.len() - 1;
            let color = Self::ROW_COLORS[i % Self::ROW_COLORS.len()];
            pending.push(Self::entry_rows(entry, is_last_entry, color));
        }

        if !pending.is_empty() {
            blocks.push(pending.join("\n"));
        }

        blocks
    }

    // Renders one entry as indented, colored row lines
    //
    // Every physical row of the entry gets the same \rowcolor; the
    // alternation happens between entries, not between an entry's rows.
    fn entry_rows(entry: &KeybindingEntry, is_last_entry: bool, color: &str) -> String {
        let indent = " ".repeat(Self::TAB_SPACES);
        let mut rows = Vec::new();
        for row in entry.to_latex(is_last_entry) {
            rows.push(format!("{indent}\\rowcolor{{{color}}}"));
            rows.push(format!("{indent}{row}"));
        }
        rows.join("\n")
    }

    // The fixed preamble of one table block: comment banner, tabularx
    // environment, category title row and the bold column headers
    fn table_header(
        category_name: &str,
        is_continuation: bool,
        add_comment_separator: bool,
    ) -> Result<String, KeybindingError> {
        let mut header = vec![
            format!("%\n% {category_name}\n%"),
            r"        \begin{tabularx}{\linewidth}{ | X | l | l | }".to_string(),
            Self::title_row(category_name, is_continuation)?,
            r"            \toprule".to_string(),
            // color for the next row
            r"            \rowcolor{impt}".to_string(),
            r"            \textbf{Name} &  \textbf{Input} & \textbf{Key} \tabularnewline \hline \hline"
                .to_string(),
        ];

        if add_comment_separator {
            header.insert(0, format!("% {}", "-".repeat(120)));
        }
        Ok(header.join("\n"))
    }

    // The \multicolumn row carrying the category title
    //
    // Short titles fit on one line. Longer ones word-wrap inside a
    // \makecell at MAX_TITLE_LINE_LENGTH characters of word content per
    // line, with a footnote-size ". . ." marker before the second line.
    // A full title (continuation suffix included) at MAX_TITLE_LENGTH or
    // more is a configuration error: there is no sane way to render it.
    fn title_row(category_name: &str, is_continuation: bool) -> Result<String, KeybindingError> {
        let cont_name = if is_continuation { " (cont.)" } else { "" };
        let full_category_name = format!("{category_name}{cont_name}");
        let indent = " ".repeat(Self::TAB_SPACES);

        if category_name.chars().count() < Self::MAX_TITLE_LINE_LENGTH {
            let content = format!(
                "\\multicolumn{{3}}{{l}}{{\\cellcolor{{lightblue}} \\headbf{{{category_name}}}{cont_name}}} \\\\"
            );
            return Ok(format!("{indent}{content}"));
        }

        if full_category_name.chars().count() >= Self::MAX_TITLE_LENGTH {
            return Err(KeybindingError::CategoryTitleTooLong {
                title: full_category_name,
            });
        }

        // Greedy word wrap: push words until the accumulated word content
        // spills past the line width, then start the next line with the
        // word that spilled
        let mut lines: Vec<Vec<&str>> = Vec::new();
        let mut current_line: Vec<&str> = Vec::new();
        for word in full_category_name.split(' ') {
            current_line.push(word);
            let current_line_len: usize = current_line.iter().map(|w| w.chars().count()).sum();
            if current_line_len > Self::MAX_TITLE_LINE_LENGTH {
                let popped_word = current_line.pop();
                lines.push(current_line.clone());
                current_line.clear();
                if let Some(popped_word) = popped_word {
                    current_line.push(popped_word);
                }
            }
        }
        lines.push(current_line);

        let mut output = vec![format!(
            "{indent}{}",
            r"\multicolumn{3}{l}{\headbf{\makecell[l]{\cellcolor{lightblue} "
        )];
        for (i, line) in lines.iter().enumerate() {
            if i == 1 {
                output.push(r"\footnotesize{. . .}\\\cellcolor{lightblue}".to_string());
            }
            output.push(line.join(" "));
        }
        output.push(r"}}} \\".to_string());
        Ok(output.concat())
    }

    // The fixed tail of every table block
    fn table_footer() -> String {
        [
            r"            \bottomrule",
            r"        \end{tabularx}",
            r"        \spacebtwtables",
        ]
        .join("\n")
    }
}
