//! Label and local extraction.
//!
//! A single forward pass over the document text. Labels are lines ending in
//! `:`; locals are introduced by `store <name>` lines. Both lists keep
//! document order and duplicates.

use tracing::debug;

const STORE_PREFIX: &str = "store ";

/// Labels and locals of one document, in the order they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    pub labels: Vec<String>,
    pub locals: Vec<String>,
}

impl SymbolTable {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.locals.is_empty()
    }
}

/// Scan `text` once and collect its labels and locals.
///
/// A line may contribute to both lists. A `store` line without a name is
/// skipped.
pub fn extract(text: &str) -> SymbolTable {
    let mut symbols = SymbolTable::default();

    for line in text.split('\n') {
        let trimmed = line.trim();

        if let Some(label) = trimmed.strip_suffix(':') {
            symbols.labels.push(label.to_string());
        }

        if let Some(rest) = trimmed.strip_prefix(STORE_PREFIX) {
            if let Some(name) = rest.split_whitespace().next() {
                symbols.locals.push(name.to_string());
            }
        }
    }

    debug!(
        "Extracted {} labels and {} locals",
        symbols.labels.len(),
        symbols.locals.len()
    );
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use quickcheck::QuickCheck;

    #[test]
    fn test_extract_labels_and_locals() {
        let text = indoc! {"
            start:
              push 1
              store x
            loop:
              load x
              store y 2
              goto loop
        "};
        let symbols = extract(text);
        assert_eq!(symbols.labels, vec!["start", "loop"]);
        assert_eq!(symbols.locals, vec!["x", "y"]);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let symbols = extract("a:\nstore v\na:\nstore v\n");
        assert_eq!(symbols.labels, vec!["a", "a"]);
        assert_eq!(symbols.locals, vec!["v", "v"]);
    }

    #[test]
    fn test_store_without_name_is_skipped() {
        let symbols = extract("store \nstore\n   store    \t\nstore  z");
        assert_eq!(symbols.locals, vec!["z"]);
    }

    #[test]
    fn test_store_prefix_is_case_sensitive() {
        let symbols = extract("Store x\nSTORE y\nstorex z");
        assert!(symbols.locals.is_empty());
    }

    #[test]
    fn test_line_contributing_to_both_lists() {
        let symbols = extract("store done:");
        assert_eq!(symbols.labels, vec!["store done"]);
        assert_eq!(symbols.locals, vec!["done:"]);
    }

    #[test]
    fn test_only_one_trailing_colon_is_removed() {
        let symbols = extract("odd::\n:\r\n");
        assert_eq!(symbols.labels, vec!["odd:", ""]);
    }

    #[test]
    fn test_empty_document() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extract_matches_reference_filter() {
        fn prop(lines: Vec<String>) -> bool {
            let lines: Vec<String> = lines.into_iter().map(|l| l.replace('\n', " ")).collect();
            let text = lines.join("\n");

            let expected_labels: Vec<String> = lines
                .iter()
                .map(|l| l.trim())
                .filter(|t| t.ends_with(':'))
                .map(|t| t[..t.len() - 1].to_string())
                .collect();
            let expected_locals: Vec<String> = lines
                .iter()
                .map(|l| l.trim())
                .filter_map(|t| t.strip_prefix("store "))
                .filter_map(|rest| rest.split_whitespace().next())
                .map(str::to_string)
                .collect();

            let symbols = extract(&text);
            symbols.labels == expected_labels && symbols.locals == expected_locals
        }

        QuickCheck::new()
            .tests(500)
            .quickcheck(prop as fn(Vec<String>) -> bool);
    }
}
