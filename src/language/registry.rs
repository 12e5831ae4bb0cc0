//! Language registration.
//!
//! A host (an editor or the language server itself) exposes a small
//! language-service surface. `register_stacky` binds the Stacky tokenizer,
//! comment syntax and completion provider to it exactly once per language id.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info};

use super::completion::{CompletionProvider, StackyCompletionProvider};
use super::tokenizer::{LineTokenizer, StackyTokenizer};

/// Language id under which Stacky is registered.
pub const STACKY_LANGUAGE_ID: &str = "stacky";

/// Single-line comment marker of Stacky.
pub const LINE_COMMENT: &str = ";";

/// Editor-facing language configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    pub line_comment: String,
}

/// The language-service surface a host exposes.
pub trait LanguageHost {
    fn is_registered(&self, id: &str) -> bool;

    fn register_language(&mut self, id: &str);

    fn set_tokenizer(&mut self, id: &str, tokenizer: Arc<dyn LineTokenizer>);

    fn set_language_config(&mut self, id: &str, config: LanguageConfig);

    fn register_completion_provider(&mut self, id: &str, provider: Arc<dyn CompletionProvider>);
}

/// Everything bound to one language id.
#[derive(Clone, Default)]
pub struct LanguageEntry {
    pub tokenizer: Option<Arc<dyn LineTokenizer>>,
    pub config: Option<LanguageConfig>,
    pub completion: Option<Arc<dyn CompletionProvider>>,
}

impl std::fmt::Debug for LanguageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageEntry")
            .field("tokenizer", &self.tokenizer.is_some())
            .field("config", &self.config)
            .field(
                "completion_triggers",
                &self.completion.as_ref().map(|p| p.trigger_characters().to_vec()),
            )
            .finish()
    }
}

/// In-memory host used by the language server.
///
/// Provider slots are keyed by language id, so binding a slot again replaces
/// the previous provider instead of adding a second one.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    languages: FxHashMap<String, LanguageEntry>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&LanguageEntry> {
        self.languages.get(id)
    }

    pub fn tokenizer(&self, id: &str) -> Option<Arc<dyn LineTokenizer>> {
        self.get(id).and_then(|entry| entry.tokenizer.clone())
    }

    pub fn completion_provider(&self, id: &str) -> Option<Arc<dyn CompletionProvider>> {
        self.get(id).and_then(|entry| entry.completion.clone())
    }

    pub fn language_config(&self, id: &str) -> Option<&LanguageConfig> {
        self.get(id).and_then(|entry| entry.config.as_ref())
    }

    /// Trigger characters of every registered completion provider, without
    /// duplicates, in registration-independent order.
    pub fn trigger_characters(&self) -> Vec<String> {
        let mut triggers: Vec<String> = self
            .languages
            .values()
            .filter_map(|entry| entry.completion.as_ref())
            .flat_map(|provider| provider.trigger_characters().iter().map(char::to_string))
            .collect();
        triggers.sort();
        triggers.dedup();
        triggers
    }

    pub fn language_ids(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    fn entry(&mut self, id: &str) -> &mut LanguageEntry {
        self.languages.entry(id.to_string()).or_default()
    }
}

impl LanguageHost for LanguageRegistry {
    fn is_registered(&self, id: &str) -> bool {
        self.languages.contains_key(id)
    }

    fn register_language(&mut self, id: &str) {
        self.entry(id);
    }

    fn set_tokenizer(&mut self, id: &str, tokenizer: Arc<dyn LineTokenizer>) {
        self.entry(id).tokenizer = Some(tokenizer);
    }

    fn set_language_config(&mut self, id: &str, config: LanguageConfig) {
        self.entry(id).config = Some(config);
    }

    fn register_completion_provider(&mut self, id: &str, provider: Arc<dyn CompletionProvider>) {
        self.entry(id).completion = Some(provider);
    }
}

/// Register Stacky with `host`. Returns `false` without touching the host
/// when the language id is already registered.
pub fn register_stacky<H: LanguageHost + ?Sized>(host: &mut H) -> bool {
    if host.is_registered(STACKY_LANGUAGE_ID) {
        debug!("Language {} already registered", STACKY_LANGUAGE_ID);
        return false;
    }

    host.register_language(STACKY_LANGUAGE_ID);
    host.set_tokenizer(STACKY_LANGUAGE_ID, Arc::new(StackyTokenizer));
    host.set_language_config(
        STACKY_LANGUAGE_ID,
        LanguageConfig {
            line_comment: LINE_COMMENT.to_string(),
        },
    );
    host.register_completion_provider(STACKY_LANGUAGE_ID, Arc::new(StackyCompletionProvider));

    info!("Registered language {}", STACKY_LANGUAGE_ID);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::completion::{CursorPosition, DocumentSnapshot};
    use crate::language::symbols::extract;
    use crate::language::tokenizer::TokenKind;

    /// Host that counts every call, to observe what registration does.
    #[derive(Default)]
    struct RecordingHost {
        registry: LanguageRegistry,
        calls: Vec<&'static str>,
    }

    impl LanguageHost for RecordingHost {
        fn is_registered(&self, id: &str) -> bool {
            self.registry.is_registered(id)
        }

        fn register_language(&mut self, id: &str) {
            self.calls.push("register_language");
            self.registry.register_language(id);
        }

        fn set_tokenizer(&mut self, id: &str, tokenizer: Arc<dyn LineTokenizer>) {
            self.calls.push("set_tokenizer");
            self.registry.set_tokenizer(id, tokenizer);
        }

        fn set_language_config(&mut self, id: &str, config: LanguageConfig) {
            self.calls.push("set_language_config");
            self.registry.set_language_config(id, config);
        }

        fn register_completion_provider(
            &mut self,
            id: &str,
            provider: Arc<dyn CompletionProvider>,
        ) {
            self.calls.push("register_completion_provider");
            self.registry.register_completion_provider(id, provider);
        }
    }

    #[test]
    fn test_register_binds_everything() {
        let mut registry = LanguageRegistry::new();
        assert!(!registry.is_registered(STACKY_LANGUAGE_ID));
        assert!(register_stacky(&mut registry));
        assert!(registry.is_registered(STACKY_LANGUAGE_ID));

        let config = registry.language_config(STACKY_LANGUAGE_ID).unwrap();
        assert_eq!(config.line_comment, ";");
        assert_eq!(registry.trigger_characters(), vec![" ".to_string()]);

        let tokenizer = registry.tokenizer(STACKY_LANGUAGE_ID).unwrap();
        assert_eq!(tokenizer.tokenize_line("push")[0].kind, TokenKind::Keyword);
    }

    #[test]
    fn test_second_registration_is_a_no_op() {
        let mut host = RecordingHost::default();
        assert!(register_stacky(&mut host));
        let calls_after_first = host.calls.len();
        assert_eq!(calls_after_first, 4);

        assert!(!register_stacky(&mut host));
        assert_eq!(host.calls.len(), calls_after_first);
    }

    #[test]
    fn test_idempotent_provider_behavior() {
        let text = "start:\nstore x\ngoto ";
        let symbols = extract(text);
        let snapshot = DocumentSnapshot::new(text, &symbols);
        let position = CursorPosition::new(2, 5);

        let mut once = LanguageRegistry::new();
        register_stacky(&mut once);
        let mut twice = LanguageRegistry::new();
        register_stacky(&mut twice);
        register_stacky(&mut twice);

        let from_once = once
            .completion_provider(STACKY_LANGUAGE_ID)
            .unwrap()
            .provide(&snapshot, position);
        let from_twice = twice
            .completion_provider(STACKY_LANGUAGE_ID)
            .unwrap()
            .provide(&snapshot, position);
        assert_eq!(from_once, from_twice);
        assert_eq!(once.trigger_characters(), twice.trigger_characters());
    }

    #[test]
    fn test_rebinding_a_slot_replaces_it() {
        let mut registry = LanguageRegistry::new();
        registry.register_completion_provider("other", Arc::new(StackyCompletionProvider));
        registry.register_completion_provider("other", Arc::new(StackyCompletionProvider));
        assert_eq!(registry.language_ids().count(), 1);
        assert_eq!(registry.trigger_characters().len(), 1);
    }

    #[test]
    fn test_unregistered_language_has_no_providers() {
        let registry = LanguageRegistry::new();
        assert!(registry.tokenizer("stacky").is_none());
        assert!(registry.completion_provider("stacky").is_none());
        assert!(registry.language_config("stacky").is_none());
    }
}
