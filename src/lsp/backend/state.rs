//! Backend state management
//!
//! This module defines the StackyBackend struct, which holds all state for
//! the LSP server: open documents, the language registry and the optional
//! interpreter.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use parking_lot::{Mutex, RwLock as SyncRwLock};
use tokio::sync::RwLock;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::language::LanguageRegistry;
use crate::lsp::document::LspDocument;
use crate::lsp::execution_provider::ExecutionEngine;

/// The Stacky language server backend, managing state and handling LSP requests.
#[derive(Clone)]
pub struct StackyBackend {
    pub(super) client: Client,
    pub(super) documents_by_uri: Arc<RwLock<HashMap<Url, Arc<LspDocument>>>>,
    pub(super) serial_document_id: Arc<AtomicU32>,
    /// Languages bound to this server; only documents of a registered
    /// language get completion and highlighting
    pub(super) registry: Arc<SyncRwLock<LanguageRegistry>>,
    /// External interpreter behind `stacky.run`, if configured
    pub(super) engine: Option<Arc<dyn ExecutionEngine>>,
    pub(super) client_process_id: Arc<Mutex<Option<u32>>>,
}

// Manual Debug implementation since ExecutionEngine doesn't implement Debug
impl std::fmt::Debug for StackyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackyBackend")
            .field("engine", &self.engine.as_ref().map(|engine| engine.engine_name()))
            .field("languages", &self.registry.read().language_ids().collect::<Vec<_>>())
            .finish()
    }
}
