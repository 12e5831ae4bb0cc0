//! In-process LSP harness shared by the integration tests.
//!
//! The backend is driven through `LspService::inner`, so requests run on the
//! test's own runtime without a transport. Client notifications sent before
//! the service is initialized are dropped by tower-lsp, which keeps
//! `log_message` calls from blocking.

#![allow(dead_code)]

use serde_json::Value;
use tower_lsp::jsonrpc;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, ExecuteCommandParams, InitializeParams,
    InitializeResult, Position, Range, SemanticToken, SemanticTokensParams, SemanticTokensResult,
    TextDocumentContentChangeEvent, TextDocumentIdentifier, TextDocumentItem,
    TextDocumentPositionParams, Url, VersionedTextDocumentIdentifier,
};
use tower_lsp::{ClientSocket, LanguageServer, LspService};

use stacky_language_server::language::STACKY_LANGUAGE_ID;
use stacky_language_server::lsp::backend::StackyBackend;
use stacky_language_server::lsp::execution_provider::EngineConfig;

pub struct TestServer {
    service: LspService<StackyBackend>,
    _socket: ClientSocket,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_engine(EngineConfig::None)
    }

    pub fn with_engine(engine_config: EngineConfig) -> Self {
        let (service, socket) =
            LspService::new(|client| StackyBackend::new(client, &engine_config, None));
        Self {
            service,
            _socket: socket,
        }
    }

    pub fn backend(&self) -> &StackyBackend {
        self.service.inner()
    }

    pub async fn initialize(&self) -> InitializeResult {
        self.backend()
            .initialize(InitializeParams::default())
            .await
            .expect("initialize failed")
    }

    /// Open a Stacky document at `file:///tmp/<name>`.
    pub async fn open_document(&self, name: &str, text: &str) -> Url {
        self.open_with_language(name, STACKY_LANGUAGE_ID, text).await
    }

    pub async fn open_with_language(&self, name: &str, language_id: &str, text: &str) -> Url {
        let uri = document_uri(name);
        self.backend()
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.clone(),
                    language_id: language_id.to_string(),
                    version: 1,
                    text: text.to_string(),
                },
            })
            .await;
        uri
    }

    /// Insert `text` at `line:character` as a ranged change.
    pub async fn insert_text(
        &self,
        uri: &Url,
        version: i32,
        line: u32,
        character: u32,
        text: &str,
    ) {
        let at = Position::new(line, character);
        self.change(
            uri,
            version,
            vec![TextDocumentContentChangeEvent {
                range: Some(Range { start: at, end: at }),
                range_length: None,
                text: text.to_string(),
            }],
        )
        .await;
    }

    pub async fn change(
        &self,
        uri: &Url,
        version: i32,
        content_changes: Vec<TextDocumentContentChangeEvent>,
    ) {
        self.backend()
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri.clone(),
                    version,
                },
                content_changes,
            })
            .await;
    }

    pub async fn close_document(&self, uri: &Url) {
        self.backend()
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
            })
            .await;
    }

    /// Completion items at `line:character`, or `None` when the server has
    /// nothing to offer for the document.
    pub async fn completion(
        &self,
        uri: &Url,
        line: u32,
        character: u32,
    ) -> Option<Vec<CompletionItem>> {
        let response = self
            .backend()
            .completion(CompletionParams {
                text_document_position: TextDocumentPositionParams {
                    text_document: TextDocumentIdentifier { uri: uri.clone() },
                    position: Position::new(line, character),
                },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
                context: None,
            })
            .await
            .expect("completion failed");

        response.map(|response| match response {
            CompletionResponse::Array(items) => items,
            CompletionResponse::List(list) => list.items,
        })
    }

    /// Labels of the completion items at `line:character`.
    pub async fn completion_labels(&self, uri: &Url, line: u32, character: u32) -> Vec<String> {
        self.completion(uri, line, character)
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.label)
            .collect()
    }

    pub async fn semantic_tokens(&self, uri: &Url) -> Option<Vec<SemanticToken>> {
        let result = self
            .backend()
            .semantic_tokens_full(SemanticTokensParams {
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
                text_document: TextDocumentIdentifier { uri: uri.clone() },
            })
            .await
            .expect("semantic tokens failed");

        result.map(|result| match result {
            SemanticTokensResult::Tokens(tokens) => tokens.data,
            SemanticTokensResult::Partial(partial) => partial.data,
        })
    }

    pub async fn execute_command(
        &self,
        command: &str,
        arguments: Vec<Value>,
    ) -> jsonrpc::Result<Option<Value>> {
        self.backend()
            .execute_command(ExecuteCommandParams {
                command: command.to_string(),
                arguments,
                work_done_progress_params: Default::default(),
            })
            .await
    }
}

pub fn document_uri(name: &str) -> Url {
    Url::parse(&format!("file:///tmp/{}", name)).expect("invalid test URI")
}
