//! LSP protocol handler implementations
//!
//! This module contains the `tower_lsp::LanguageServer` trait implementation
//! for the Dawn backend:
//! - Lifecycle handlers (initialize, initialized, shutdown)
//! - Document lifecycle (did_open, did_change, did_close)
//! - Completion and completion resolve
//! - Semantic tokens
//!
//! Cancellation is not honoured: every request is cheap and runs to completion.

use std::sync::Arc;

use tower_lsp::{LanguageServer, jsonrpc};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializeParams, InitializeResult, InitializedParams, MessageType, SemanticTokens,
    SemanticTokensFullOptions, SemanticTokensOptions, SemanticTokensParams,
    SemanticTokensResult, SemanticTokensServerCapabilities, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
};
use tower_lsp::jsonrpc::Result as LspResult;

use tracing::{debug, info, warn};

use crate::analysis::legend;
use crate::lsp::completion;
use crate::lsp::models::LspDocument;

use super::state::DawnBackend;

#[tower_lsp::async_trait]
impl LanguageServer for DawnBackend {
    /// Handles the LSP initialize request, advertising capabilities.
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!("Received initialize from process {:?}", params.process_id);
        debug!("Initialize params: {:?}", params);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    ..Default::default()
                })),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), ",".to_string()]),
                    resolve_provider: Some(true),
                    ..Default::default()
                }),
                semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(
                    SemanticTokensOptions {
                        legend: legend(),
                        full: Some(SemanticTokensFullOptions::Bool(true)),
                        range: None,
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    /// Handles the LSP initialized notification.
    async fn initialized(&self, params: InitializedParams) {
        info!("Initialized: {:?}", params);
        self.client
            .log_message(MessageType::INFO, "Dawn language server initialized")
            .await;
    }

    /// Handles the LSP shutdown request.
    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("Received shutdown request");
        Ok(())
    }

    /// Handles opening a text document and publishes diagnostics.
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        info!("Opening document: URI={}, version={}", item.uri, item.version);

        self.load_adjacent_framework(&item.uri).await;

        let document = Arc::new(LspDocument::new(item.uri.clone(), &item.text, item.version));
        if self.documents_by_uri.insert(item.uri, document.clone()).is_some() {
            debug!("Replaced an already open document");
        }

        self.publish_diagnostics(&document).await;
    }

    /// Applies incremental changes to a text document and re-publishes diagnostics.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!("textDocument/didChange: URI={}, version={}", uri, version);

        let Some(document) = self.document(&uri) else {
            warn!("Failed to find document with URI={}", uri);
            return;
        };

        if document.apply(params.content_changes, version).await.is_some() {
            self.publish_diagnostics(&document).await;
        } else {
            warn!("Failed to apply changes to document with URI={}", uri);
        }
    }

    /// Handles closing a text document, removing it from state and clearing diagnostics.
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if self.documents_by_uri.remove(&uri).is_some() {
            info!("Closed document: {}", uri);
        } else {
            warn!("Failed to find document with URI={}", uri);
        }
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    /// Offers every known name; the cursor position is not used.
    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!("Completion request at {}:{:?}", uri, position);

        match self.completion_items(&uri, position).await {
            Some(items) => {
                debug!("Returning {} completion items", items.len());
                Ok(Some(CompletionResponse::Array(items)))
            }
            None => {
                debug!("Document not found: {}", uri);
                Ok(None)
            }
        }
    }

    /// Fills in the detail of the selected completion item.
    async fn completion_resolve(&self, item: CompletionItem) -> LspResult<CompletionItem> {
        Ok(completion::resolve(item))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> LspResult<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;
        debug!("Semantic tokens request for: {}", uri);

        let Some(data) = self.semantic_tokens(&uri).await else {
            debug!("Document not found: {}", uri);
            return Ok(None);
        };

        debug!("Generated {} semantic tokens", data.len());
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data,
        })))
    }
}
