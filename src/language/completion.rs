//! Context-sensitive completion for Stacky.
//!
//! The engine looks only at the text of the cursor line up to the cursor and
//! at the symbol table extracted when the document was opened. Each rule
//! below contributes a block of suggestions; the blocks are concatenated in a
//! fixed order (commands, constants, types, labels, variables) without
//! deduplication.

use tracing::debug;

use super::symbols::SymbolTable;
use super::tokenizer::is_word_char;
use super::vocabulary::{COMMANDS, CONSTANTS, LABEL_COMMANDS, LOCAL_COMMANDS, TYPE_NAMES};

/// Category of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    Command,
    Constant,
    Type,
    Label,
    Variable,
}

impl SuggestionKind {
    /// Short description shown next to the suggestion.
    pub fn detail(&self) -> &'static str {
        match self {
            SuggestionKind::Command => "command",
            SuggestionKind::Constant => "constant",
            SuggestionKind::Type => "type",
            SuggestionKind::Label => "label",
            SuggestionKind::Variable => "variable",
        }
    }
}

/// Character columns `[start, end)` on the cursor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordRange {
    pub start: usize,
    pub end: usize,
}

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub kind: SuggestionKind,
    pub insert_text: String,
    pub detail: String,
    pub documentation: String,
    /// The in-progress word that accepting this suggestion replaces.
    pub range: WordRange,
}

impl Suggestion {
    fn new(kind: SuggestionKind, name: &str, range: WordRange) -> Self {
        let (insert_text, documentation) = match kind {
            SuggestionKind::Command => (format!("{} ", name), format!("Stacky command: {}", name)),
            _ => (name.to_string(), format!("{} {}", kind.detail(), name)),
        };

        Self {
            label: name.to_string(),
            kind,
            insert_text,
            detail: kind.detail().to_string(),
            documentation,
            range,
        }
    }
}

/// Cursor location inside a document: 0-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

impl CursorPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Immutable view of a document handed to completion providers.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSnapshot<'a> {
    pub text: &'a str,
    pub symbols: &'a SymbolTable,
}

impl<'a> DocumentSnapshot<'a> {
    pub fn new(text: &'a str, symbols: &'a SymbolTable) -> Self {
        Self { text, symbols }
    }

    /// Text of line `line`, or the empty string past the end of the document.
    pub fn line(&self, line: usize) -> &'a str {
        self.text.split('\n').nth(line).unwrap_or("")
    }
}

/// A completion source bound to a language by the host.
pub trait CompletionProvider: Send + Sync {
    /// Characters whose entry triggers completion automatically.
    fn trigger_characters(&self) -> &[char];

    fn provide(&self, document: &DocumentSnapshot<'_>, position: CursorPosition) -> Vec<Suggestion>;
}

/// Completion provider for Stacky documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackyCompletionProvider;

impl CompletionProvider for StackyCompletionProvider {
    fn trigger_characters(&self) -> &[char] {
        &[' ']
    }

    fn provide(
        &self,
        document: &DocumentSnapshot<'_>,
        position: CursorPosition,
    ) -> Vec<Suggestion> {
        complete(document.line(position.line), position.column, document.symbols)
    }
}

/// What the text before the cursor says about the expected next word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    /// Line text up to the cursor.
    pub prefix: String,
    pub in_comment: bool,
    pub line_head: bool,
    pub after_push: bool,
    pub after_convert: bool,
    /// Last whitespace-separated word of the prefix, empty if none.
    pub last_token: String,
    pub word: WordRange,
}

impl CompletionContext {
    /// Analyze `line_text` with the cursor at character column `cursor`.
    pub fn analyze(line_text: &str, cursor: usize) -> Self {
        let prefix: String = line_text.chars().take(cursor).collect();
        let prefix_len = prefix.chars().count();
        let word_len = prefix.chars().rev().take_while(|&c| is_word_char(c)).count();

        let line_head = line_text.is_empty()
            || prefix.trim().is_empty()
            || (prefix.split_whitespace().count() <= 1 && !prefix.ends_with(char::is_whitespace));

        Self {
            in_comment: prefix.contains(';'),
            line_head,
            after_push: ends_with_push(&prefix),
            after_convert: is_convert_operand(&prefix),
            last_token: prefix.split_whitespace().last().unwrap_or("").to_string(),
            word: WordRange {
                start: prefix_len - word_len,
                end: prefix_len,
            },
            prefix,
        }
    }

    /// Build the suggestion list for this context.
    pub fn suggestions(&self, symbols: &SymbolTable) -> Vec<Suggestion> {
        if self.in_comment {
            return Vec::new();
        }

        let mut suggestions = Vec::new();

        if self.line_head {
            self.emit(&mut suggestions, SuggestionKind::Command, COMMANDS.iter().copied());
        }

        if self.after_push {
            self.emit(&mut suggestions, SuggestionKind::Constant, CONSTANTS.iter().copied());
        }

        if self.after_convert {
            self.emit(&mut suggestions, SuggestionKind::Type, TYPE_NAMES.iter().copied());
        }

        let last_token = self.last_token.as_str();
        if LABEL_COMMANDS.contains(&last_token) {
            let labels = symbols.labels.iter().map(String::as_str);
            self.emit(&mut suggestions, SuggestionKind::Label, labels);
        }

        if LOCAL_COMMANDS.contains(&last_token) {
            let locals = symbols.locals.iter().map(String::as_str);
            self.emit(&mut suggestions, SuggestionKind::Variable, locals);
        }

        suggestions
    }

    fn emit<'n>(
        &self,
        suggestions: &mut Vec<Suggestion>,
        kind: SuggestionKind,
        names: impl IntoIterator<Item = &'n str>,
    ) {
        suggestions.extend(names.into_iter().map(|name| Suggestion::new(kind, name, self.word)));
    }
}

/// Compute the suggestions for the cursor at character column `cursor` of
/// `line_text`.
pub fn complete(line_text: &str, cursor: usize, symbols: &SymbolTable) -> Vec<Suggestion> {
    let context = CompletionContext::analyze(line_text, cursor);
    let suggestions = context.suggestions(symbols);
    debug!(
        "Completion for prefix {:?}: {} suggestions (line_head={}, push={}, convert={}, last={:?})",
        context.prefix,
        suggestions.len(),
        context.line_head,
        context.after_push,
        context.after_convert,
        context.last_token
    );
    suggestions
}

/// The prefix ends with the word `push`, possibly followed by whitespace.
fn ends_with_push(prefix: &str) -> bool {
    prefix
        .trim_end()
        .strip_suffix("push")
        .is_some_and(|before| !before.ends_with(is_word_char))
}

/// The prefix is `convert`, optionally followed by whitespace and one
/// partial word, with nothing else on the line.
fn is_convert_operand(prefix: &str) -> bool {
    let Some(rest) = prefix.trim_start().strip_prefix("convert") else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let operand = rest.trim_start();
    operand.len() < rest.len() && !operand.contains(char::is_whitespace)
}
