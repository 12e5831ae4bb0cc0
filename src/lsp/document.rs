use std::sync::Arc;

use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};
use tracing::{debug, warn};

use crate::language::SymbolTable;

/// State for an open text document managed by the LSP server.
#[derive(Debug)]
pub struct LspDocumentState {
    pub uri: Url,
    pub language_id: String,
    pub text: Rope,
    pub version: i32,
    /// Labels and locals extracted from the text the document was opened
    /// with. Edits do not update it.
    pub symbols: Arc<SymbolTable>,
}

/// LSP document with state for open files.
#[derive(Debug)]
pub struct LspDocument {
    pub id: u32,
    pub state: tokio::sync::RwLock<LspDocumentState>,
}

/// Convert an LSP position to a char index in `text`, clamped to the line.
///
/// `position.character` counts UTF-16 code units, the LSP default encoding.
pub fn lsp_position_to_char(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line);
    let line_end = line_start + line_content_len(text, line);
    let start_unit = text.char_to_utf16_cu(line_start);
    let end_unit = text.char_to_utf16_cu(line_end);
    let unit = (start_unit + position.character as usize).min(end_unit);
    text.utf16_cu_to_char(unit)
}

/// Char column of the UTF-16 offset `units` within `line`, clamped to the
/// line. An offset inside a surrogate pair maps to that character.
pub fn utf16_to_char_column(line: &str, units: usize) -> usize {
    let mut seen = 0;
    for (column, c) in line.chars().enumerate() {
        seen += c.len_utf16();
        if seen > units {
            return column;
        }
    }
    line.chars().count()
}

/// UTF-16 offset of char column `column` within `line`.
pub fn char_to_utf16_column(line: &str, column: usize) -> usize {
    line.chars().take(column).map(char::len_utf16).sum()
}

/// Length of `line` in chars, excluding its line terminator.
fn line_content_len(text: &Rope, line: usize) -> usize {
    let slice = text.line(line);
    let mut len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
        len -= 1;
    }
    if len > 0 && slice.char(len - 1) == '\r' {
        len -= 1;
    }
    len
}

impl LspDocumentState {
    pub fn new(
        uri: Url,
        language_id: String,
        text: &str,
        version: i32,
        symbols: SymbolTable,
    ) -> Self {
        Self {
            uri,
            language_id,
            text: Rope::from_str(text),
            version,
            symbols: Arc::new(symbols),
        }
    }

    /// Apply `changes` in order. Changes for a version that is not newer
    /// than the current one are ignored; returns whether anything changed.
    pub fn apply(&mut self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) -> bool {
        if version <= self.version {
            warn!(
                "Ignoring stale changes for {} (version {} <= {})",
                self.uri, version, self.version
            );
            return false;
        }

        for change in changes {
            match change.range {
                Some(range) => {
                    let start = lsp_position_to_char(&range.start, &self.text);
                    let end = lsp_position_to_char(&range.end, &self.text).max(start);
                    self.text.remove(start..end);
                    self.text.insert(start, &change.text);
                }
                None => self.text = Rope::from_str(&change.text),
            }
        }

        debug!("Applied changes to {} (version {} -> {})", self.uri, self.version, version);
        self.version = version;
        true
    }

    /// Text of `line` without its terminator, or the empty string past the
    /// end of the document.
    pub fn line(&self, line: usize) -> String {
        if line >= self.text.len_lines() {
            return String::new();
        }
        self.text
            .line(line)
            .chars()
            .take(line_content_len(&self.text, line))
            .collect()
    }
}

impl LspDocument {
    pub fn new(id: u32, state: LspDocumentState) -> Self {
        Self {
            id,
            state: tokio::sync::RwLock::new(state),
        }
    }

    pub async fn uri(&self) -> Url {
        self.state.read().await.uri.clone()
    }

    pub async fn language_id(&self) -> String {
        self.state.read().await.language_id.clone()
    }

    pub async fn text(&self) -> String {
        self.state.read().await.text.to_string()
    }

    pub async fn version(&self) -> i32 {
        self.state.read().await.version
    }

    pub async fn line(&self, line: usize) -> String {
        self.state.read().await.line(line)
    }

    pub async fn symbols(&self) -> Arc<SymbolTable> {
        Arc::clone(&self.state.read().await.symbols)
    }

    pub async fn apply(&self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) -> bool {
        self.state.write().await.apply(changes, version)
    }
}
