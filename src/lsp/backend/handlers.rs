//! LSP request and notification handlers
//!
//! - Lifecycle (initialize, initialized, shutdown)
//! - Document sync (did_open, did_change, did_close)
//! - Completion and semantic tokens
//! - Commands (stacky.run)

use serde_json::Value;
use tower_lsp::{LanguageServer, jsonrpc};
use tower_lsp::lsp_types::{
    CompletionOptions, CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, ExecuteCommandOptions,
    ExecuteCommandParams, InitializeParams, InitializeResult, InitializedParams, MessageType,
    PositionEncodingKind, SemanticTokens, SemanticTokensFullOptions, SemanticTokensOptions,
    SemanticTokensParams, SemanticTokensResult, SemanticTokensServerCapabilities,
    ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tracing::{debug, error, info, warn};

use super::state::StackyBackend;
use super::utils::semantic_tokens_legend;
use super::RUN_COMMAND;
use crate::error::StackyError;

#[tower_lsp::async_trait]
impl LanguageServer for StackyBackend {
    /// Handles the LSP initialize request, advertising capabilities.
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!("Received initialize: process_id={:?}", params.process_id);

        if let Some(client_pid) = params.process_id {
            let mut locked_pid = self.client_process_id.lock();
            if let Some(cmdline_pid) = *locked_pid {
                if cmdline_pid != client_pid {
                    warn!(
                        "Client PID mismatch: command line ({}) vs LSP ({})",
                        cmdline_pid, client_pid
                    );
                }
            }
            *locked_pid = Some(client_pid);
        }

        let trigger_characters = self.registry.read().trigger_characters();

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Positions are converted from and to UTF-16 code units
                position_encoding: Some(PositionEncodingKind::UTF16),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(trigger_characters),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                semantic_tokens_provider: Some(
                    SemanticTokensServerCapabilities::SemanticTokensOptions(
                        SemanticTokensOptions {
                            legend: semantic_tokens_legend(),
                            full: Some(SemanticTokensFullOptions::Bool(true)),
                            range: None,
                            ..Default::default()
                        },
                    ),
                ),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![RUN_COMMAND.to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, params: InitializedParams) {
        info!("Initialized: {:?}", params);
        self.client
            .log_message(MessageType::INFO, "Stacky language server initialized")
            .await;
    }

    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("Received shutdown request");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        info!(
            "Opening document: URI={}, language={}, version={}",
            item.uri, item.language_id, item.version
        );
        self.open_document(item.uri, item.language_id, &item.text, item.version)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!("textDocument/didChange: URI={}, version={}", uri, version);

        match self.get_document(&uri).await {
            Some(document) => {
                if !document.apply(params.content_changes, version).await {
                    warn!("Failed to apply changes to document with URI={}", uri);
                }
            }
            None => warn!("Failed to find document with URI={}", uri),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        match self.documents_by_uri.write().await.remove(&uri) {
            Some(document) => info!("Closed document: {}, id: {}", uri, document.id),
            None => warn!("Failed to find document with URI={}", uri),
        }
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> jsonrpc::Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!("Completion request at {}:{:?}", uri, position);

        Ok(self
            .completion_items(&uri, position)
            .await
            .map(CompletionResponse::Array))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> jsonrpc::Result<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;
        debug!("Semantic tokens request for: {}", uri);

        Ok(self.semantic_tokens(&uri).await.map(|data| {
            debug!("Generated {} semantic tokens", data.len());
            SemanticTokensResult::Tokens(SemanticTokens {
                result_id: None,
                data,
            })
        }))
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> jsonrpc::Result<Option<Value>> {
        info!("workspace/executeCommand: {}", params.command);

        if params.command != RUN_COMMAND {
            return Err(StackyError::UnknownCommand(params.command).into());
        }

        match self.run_document(&params.arguments).await {
            Ok(output) => {
                self.client.log_message(MessageType::INFO, output.clone()).await;
                Ok(Some(Value::String(output)))
            }
            Err(e) => {
                error!("{} failed: {}", RUN_COMMAND, e);
                Err(e.into())
            }
        }
    }
}
