use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock as SyncRwLock};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::Client;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Documentation, MarkupContent,
    MarkupKind, Position, Range, SemanticToken, TextEdit, Url,
};
use tracing::{debug, info, trace};

use crate::error::{Result, StackyError};
use crate::language::{
    extract, register_stacky, CursorPosition, DocumentSnapshot, LanguageConfig, LanguageHost,
    LanguageRegistry, Suggestion, SuggestionKind, SymbolTable, STACKY_LANGUAGE_ID,
};
use crate::lsp::document::{
    char_to_utf16_column, utf16_to_char_column, LspDocument, LspDocumentState,
};
use crate::lsp::execution_provider::{create_engine, EngineConfig};

mod handlers;
mod state;
mod utils;

pub use state::StackyBackend;
use utils::{semantic_token_type, SemanticTokensBuilder};

/// Command id for running the current document through the interpreter.
pub const RUN_COMMAND: &str = "stacky.run";

/// Custom request returning the editor configuration of Stacky.
pub const LANGUAGE_CONFIGURATION_METHOD: &str = "stacky/languageConfiguration";

/// Response of `stacky/languageConfiguration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageConfiguration {
    pub id: String,
    #[serde(flatten)]
    pub config: LanguageConfig,
}

impl StackyBackend {
    /// Creates a new backend with Stacky registered and the interpreter
    /// selected by `engine_config`.
    pub fn new(
        client: Client,
        engine_config: &EngineConfig,
        client_process_id: Option<u32>,
    ) -> Self {
        let mut registry = LanguageRegistry::new();
        register_stacky(&mut registry);

        let engine = create_engine(engine_config);
        if let Some(engine) = &engine {
            info!("Using {} engine for {}", engine.engine_name(), RUN_COMMAND);
        }

        Self {
            client,
            documents_by_uri: Arc::new(RwLock::new(HashMap::new())),
            serial_document_id: Arc::new(AtomicU32::new(0)),
            registry: Arc::new(SyncRwLock::new(registry)),
            engine,
            client_process_id: Arc::new(Mutex::new(client_process_id)),
        }
    }

    fn next_document_id(&self) -> u32 {
        self.serial_document_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Register Stacky again; a no-op once it is registered.
    pub fn register_stacky(&self) -> bool {
        register_stacky(&mut *self.registry.write())
    }

    pub fn is_registered(&self, language_id: &str) -> bool {
        self.registry.read().is_registered(language_id)
    }

    /// Handler for `stacky/languageConfiguration`.
    pub async fn language_configuration(
        &self,
    ) -> tower_lsp::jsonrpc::Result<LanguageConfiguration> {
        let config = self
            .registry
            .read()
            .language_config(STACKY_LANGUAGE_ID)
            .cloned()
            .ok_or_else(tower_lsp::jsonrpc::Error::invalid_request)?;
        Ok(LanguageConfiguration {
            id: STACKY_LANGUAGE_ID.to_string(),
            config,
        })
    }

    pub(crate) async fn get_document(&self, uri: &Url) -> Option<Arc<LspDocument>> {
        self.documents_by_uri.read().await.get(uri).cloned()
    }

    /// Store a newly opened document. Its symbol table is extracted here,
    /// once, when the language is registered.
    async fn open_document(
        &self,
        uri: Url,
        language_id: String,
        text: &str,
        version: i32,
    ) -> Arc<LspDocument> {
        let symbols = if self.is_registered(&language_id) {
            extract(text)
        } else {
            debug!("Language {} is not registered, skipping symbol extraction", language_id);
            SymbolTable::default()
        };

        let id = self.next_document_id();
        let document = Arc::new(LspDocument::new(
            id,
            LspDocumentState::new(uri.clone(), language_id, text, version, symbols),
        ));
        self.documents_by_uri
            .write()
            .await
            .insert(uri.clone(), Arc::clone(&document));
        info!("Opened document: URI={}, id={}, version={}", uri, id, version);
        document
    }

    /// Completion items for `position` in `uri`, or `None` when the document
    /// is unknown or its language has no completion provider.
    async fn completion_items(&self, uri: &Url, position: Position) -> Option<Vec<CompletionItem>> {
        let document = self.get_document(uri).await?;
        let state = document.state.read().await;
        let provider = self.registry.read().completion_provider(&state.language_id)?;

        let text = state.text.to_string();
        let line = state.line(position.line as usize);
        let snapshot = DocumentSnapshot::new(&text, &state.symbols);
        let column = utf16_to_char_column(&line, position.character as usize);
        let cursor = CursorPosition::new(position.line as usize, column);
        let suggestions = provider.provide(&snapshot, cursor);

        debug!(
            "Completion at {}:{:?} produced {} suggestions",
            uri,
            position,
            suggestions.len()
        );
        Some(
            suggestions
                .into_iter()
                .enumerate()
                .map(|(index, suggestion)| {
                    to_completion_item(index, suggestion, position.line, &line)
                })
                .collect(),
        )
    }

    /// Delta-encoded semantic tokens for the whole document.
    async fn semantic_tokens(&self, uri: &Url) -> Option<Vec<SemanticToken>> {
        let document = self.get_document(uri).await?;
        let state = document.state.read().await;
        let tokenizer = self.registry.read().tokenizer(&state.language_id)?;

        let mut builder = SemanticTokensBuilder::new();
        for line_number in 0..state.text.len_lines() {
            let line = state.line(line_number);
            // UTF-16 offset of every char boundary on the line
            let offsets: Vec<usize> = std::iter::once(0)
                .chain(line.chars().scan(0, |units, c| {
                    *units += c.len_utf16();
                    Some(*units)
                }))
                .collect();

            for token in tokenizer.tokenize_line(&line) {
                if let Some((token_type, modifiers)) = semantic_token_type(token.kind) {
                    trace!("Token {:?} at {}:{}", token.kind, line_number, token.start);
                    let start = offsets[token.start];
                    builder.push(
                        line_number as u32,
                        start as u32,
                        (offsets[token.end] - start) as u32,
                        token_type,
                        modifiers,
                    );
                }
            }
        }
        Some(builder.build())
    }

    /// Run the document named by the first command argument through the
    /// interpreter and return its output verbatim.
    async fn run_document(&self, arguments: &[Value]) -> Result<String> {
        let uri = arguments
            .first()
            .and_then(Value::as_str)
            .and_then(|s| Url::parse(s).ok())
            .ok_or_else(|| StackyError::InvalidArguments {
                command: RUN_COMMAND.to_string(),
                reason: "expected a document URI".to_string(),
            })?;

        let engine = self.engine.clone().ok_or(StackyError::EngineUnavailable)?;
        let document = self
            .get_document(&uri)
            .await
            .ok_or_else(|| StackyError::UnknownDocument(uri.clone()))?;
        let source = document.text().await;

        info!("Running {} ({} bytes) with {}", uri, source.len(), engine.engine_name());
        let output = engine.run(&source).await;
        debug!("Interpreter output for {}: {:?}", uri, output);
        Ok(output)
    }
}

/// LSP completion item kind for a suggestion kind.
fn completion_item_kind(kind: SuggestionKind) -> CompletionItemKind {
    match kind {
        SuggestionKind::Command => CompletionItemKind::METHOD,
        SuggestionKind::Constant => CompletionItemKind::VALUE,
        SuggestionKind::Type => CompletionItemKind::KEYWORD,
        SuggestionKind::Label => CompletionItemKind::FIELD,
        SuggestionKind::Variable => CompletionItemKind::VARIABLE,
    }
}

/// `line_text` converts the suggestion's char range to UTF-16 positions.
fn to_completion_item(
    index: usize,
    suggestion: Suggestion,
    line: u32,
    line_text: &str,
) -> CompletionItem {
    let position = |column: usize| {
        Position::new(line, char_to_utf16_column(line_text, column) as u32)
    };
    let range = Range {
        start: position(suggestion.range.start),
        end: position(suggestion.range.end),
    };

    CompletionItem {
        label: suggestion.label,
        kind: Some(completion_item_kind(suggestion.kind)),
        detail: Some(suggestion.detail),
        documentation: Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: suggestion.documentation,
        })),
        // Clients sort by label unless told otherwise
        sort_text: Some(format!("{:04}", index)),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: suggestion.insert_text,
        })),
        ..Default::default()
    }
}
