//! In-process LSP client for integration tests.
//!
//! The server runs on a tokio task and talks JSON-RPC over an in-memory
//! duplex pipe, framed with `Content-Length` headers exactly as over stdio.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream, WriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tower_lsp::Server;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionResponse, Position, PublishDiagnosticsParams, Range, SemanticToken,
    SemanticTokensResult, TextDocumentContentChangeEvent, Url,
};

use dawn_language_server::build_service;
use dawn_language_server::config::ServerConfig;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `$body` against a freshly initialized in-process server, then shuts it down.
#[macro_export]
macro_rules! with_lsp_client {
    ($test_name:ident, $config:expr, |$client:ident| $body:block) => {
        #[tokio::test]
        async fn $test_name() {
            #[allow(unused_mut)]
            let mut $client = crate::common::LspClient::start($config).await;
            $client.initialize().await;
            $body
            $client.shutdown().await;
        }
    };
}

pub struct LspClient {
    writer: WriteHalf<DuplexStream>,
    incoming: mpsc::UnboundedReceiver<Value>,
    /// Result of the `initialize` request.
    pub initialize_result: Value,
    notifications: VecDeque<Value>,
    next_request_id: u64,
    server: JoinHandle<()>,
    reader: JoinHandle<()>,
}

async fn read_message<R>(reader: &mut BufReader<R>) -> Option<Value>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut content_length = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            content_length = value.trim().parse::<usize>().ok();
        }
    }

    let mut body = vec![0; content_length?];
    reader.read_exact(&mut body).await.ok()?;
    serde_json::from_slice(&body).ok()
}

impl LspClient {
    pub async fn start(config: ServerConfig) -> Self {
        let (client_io, server_io) = tokio::io::duplex(1 << 20);
        let (server_read, server_write) = tokio::io::split(server_io);
        let (client_read, writer) = tokio::io::split(client_io);

        let (service, socket) = build_service(config);
        let server = tokio::spawn(async move {
            Server::new(server_read, server_write, socket).serve(service).await;
        });

        let (sender, incoming) = mpsc::unbounded_channel();
        let reader = tokio::spawn(async move {
            let mut reader = BufReader::new(client_read);
            while let Some(message) = read_message(&mut reader).await {
                if sender.send(message).is_err() {
                    break;
                }
            }
        });

        Self {
            writer,
            incoming,
            initialize_result: Value::Null,
            notifications: VecDeque::new(),
            next_request_id: 1,
            server,
            reader,
        }
    }

    async fn write(&mut self, message: Value) {
        let body = message.to_string();
        let frame = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.writer.write_all(frame.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn next_message(&mut self) -> Value {
        timeout(RESPONSE_TIMEOUT, self.incoming.recv())
            .await
            .expect("timed out waiting for the server")
            .expect("server closed the connection")
    }

    /// Sends a request and returns its `result`, queueing notifications seen meanwhile.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_request_id;
        self.next_request_id += 1;
        let mut message = json!({"jsonrpc": "2.0", "id": id, "method": method});
        if !params.is_null() {
            message["params"] = params;
        }
        self.write(message).await;

        loop {
            let message = self.next_message().await;
            if message.get("method").is_some() {
                if let Some(server_id) = message.get("id") {
                    let server_id = server_id.clone();
                    self.write(json!({"jsonrpc": "2.0", "id": server_id, "result": null})).await;
                } else {
                    self.notifications.push_back(message);
                }
                continue;
            }
            if message["id"] == json!(id) {
                assert!(message.get("error").is_none(), "{} failed: {}", method, message);
                return message["result"].clone();
            }
        }
    }

    pub async fn notify(&mut self, method: &str, params: Value) {
        let mut message = json!({"jsonrpc": "2.0", "method": method});
        if !params.is_null() {
            message["params"] = params;
        }
        self.write(message).await;
    }

    /// Waits for the next notification with the given method.
    pub async fn await_notification(&mut self, method: &str) -> Value {
        if let Some(index) = self.notifications.iter().position(|n| n["method"] == method) {
            return self.notifications.remove(index).unwrap_or_default();
        }
        loop {
            let message = self.next_message().await;
            if message["method"] == method {
                return message;
            }
            if message.get("method").is_some() {
                self.notifications.push_back(message);
            }
        }
    }

    pub async fn initialize(&mut self) {
        self.initialize_result = self
            .request("initialize", json!({"processId": null, "rootUri": null, "capabilities": {}}))
            .await;
        self.notify("initialized", json!({})).await;
    }

    pub async fn shutdown(mut self) {
        self.request("shutdown", Value::Null).await;
        self.notify("exit", Value::Null).await;
        let _ = timeout(RESPONSE_TIMEOUT, &mut self.server).await;
        self.reader.abort();
    }

    pub async fn open_document(&mut self, uri: &Url, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({"textDocument": {"uri": uri, "languageId": "dawn", "version": 1, "text": text}}),
        )
        .await;
    }

    pub async fn change_document(&mut self, uri: &Url, version: i32, changes: Vec<TextDocumentContentChangeEvent>) {
        self.notify(
            "textDocument/didChange",
            json!({"textDocument": {"uri": uri, "version": version}, "contentChanges": changes}),
        )
        .await;
    }

    pub async fn close_document(&mut self, uri: &Url) {
        self.notify("textDocument/didClose", json!({"textDocument": {"uri": uri}})).await;
    }

    /// Waits for diagnostics published for `uri`, skipping those for other documents.
    pub async fn await_diagnostics(&mut self, uri: &Url) -> PublishDiagnosticsParams {
        loop {
            let message = self.await_notification("textDocument/publishDiagnostics").await;
            let params: PublishDiagnosticsParams = serde_json::from_value(message["params"].clone()).unwrap();
            if &params.uri == uri {
                return params;
            }
        }
    }

    pub async fn completion(&mut self, uri: &Url, position: Position) -> Option<Vec<CompletionItem>> {
        let result = self
            .request(
                "textDocument/completion",
                json!({"textDocument": {"uri": uri}, "position": position}),
            )
            .await;
        match serde_json::from_value::<Option<CompletionResponse>>(result).unwrap()? {
            CompletionResponse::Array(items) => Some(items),
            CompletionResponse::List(list) => Some(list.items),
        }
    }

    pub async fn resolve_completion(&mut self, item: &CompletionItem) -> CompletionItem {
        let result = self
            .request("completionItem/resolve", serde_json::to_value(item).unwrap())
            .await;
        serde_json::from_value(result).unwrap()
    }

    pub async fn semantic_tokens(&mut self, uri: &Url) -> Option<Vec<SemanticToken>> {
        let result = self
            .request("textDocument/semanticTokens/full", json!({"textDocument": {"uri": uri}}))
            .await;
        match serde_json::from_value::<Option<SemanticTokensResult>>(result).unwrap()? {
            SemanticTokensResult::Tokens(tokens) => Some(tokens.data),
            SemanticTokensResult::Partial(partial) => Some(partial.data),
        }
    }
}

/// Undoes the delta encoding: `(line, start, length, type, modifiers)` per token.
pub fn decode_tokens(data: &[SemanticToken]) -> Vec<(u32, u32, u32, u32, u32)> {
    let mut line = 0;
    let mut start = 0;
    data.iter()
        .map(|token| {
            if token.delta_line > 0 {
                line += token.delta_line;
                start = token.delta_start;
            } else {
                start += token.delta_start;
            }
            (line, start, token.length, token.token_type, token.token_modifiers_bitset)
        })
        .collect()
}

pub fn edit(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
    TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))),
        range_length: None,
        text: text.to_string(),
    }
}

pub fn document_uri(name: &str) -> Url {
    Url::parse(&format!("file:///tmp/dawn-tests/{}", name)).unwrap()
}
