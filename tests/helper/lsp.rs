//! LSP request/notification test utilities

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tower_lsp::ClientSocket;
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::lsp_types::*;

pub const PACKAGE_JSON_URI: &str = "file:///project/package.json";

/// Create an LSP initialize request
pub fn create_initialize_request(id: i64) -> Request {
    create_initialize_request_with_options(id, None)
}

/// Create an LSP initialize request carrying `initializationOptions`
pub fn create_initialize_request_with_options(id: i64, options: Option<Value>) -> Request {
    Request::build("initialize")
        .id(id)
        .params(
            serde_json::to_value(InitializeParams {
                initialization_options: options,
                ..Default::default()
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP initialized notification
pub fn create_initialized_notification() -> Request {
    Request::build("initialized")
        .params(serde_json::to_value(InitializedParams {}).unwrap())
        .finish()
}

/// Create an LSP didOpen notification
pub fn create_did_open_notification(uri: &str, content: &str) -> Request {
    Request::build("textDocument/didOpen")
        .params(
            serde_json::to_value(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.parse().unwrap(),
                    language_id: "json".to_string(),
                    version: 1,
                    text: content.to_string(),
                },
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP didChange notification
pub fn create_did_change_notification(uri: &str, content: &str, version: i32) -> Request {
    Request::build("textDocument/didChange")
        .params(
            serde_json::to_value(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri.parse().unwrap(),
                    version,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: content.to_string(),
                }],
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP codeAction request
pub fn create_code_action_request(id: i64, uri: &str, line: u32, character: u32) -> Request {
    Request::build("textDocument/codeAction")
        .id(id)
        .params(
            serde_json::to_value(CodeActionParams {
                text_document: TextDocumentIdentifier {
                    uri: uri.parse().unwrap(),
                },
                range: Range {
                    start: Position { line, character },
                    end: Position { line, character },
                },
                context: CodeActionContext {
                    diagnostics: vec![],
                    only: None,
                    trigger_kind: None,
                },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP inlayHint request covering `lines`
pub fn create_inlay_hint_request(id: i64, uri: &str, lines: u32) -> Request {
    Request::build("textDocument/inlayHint")
        .id(id)
        .params(
            serde_json::to_value(InlayHintParams {
                text_document: TextDocumentIdentifier {
                    uri: uri.parse().unwrap(),
                },
                range: Range {
                    start: Position { line: 0, character: 0 },
                    end: Position { line: lines, character: 0 },
                },
                work_done_progress_params: Default::default(),
            })
            .unwrap(),
        )
        .finish()
}

/// Create an LSP completion request
pub fn create_completion_request(id: i64, uri: &str, line: u32, character: u32) -> Request {
    Request::build("textDocument/completion")
        .id(id)
        .params(
            serde_json::to_value(CompletionParams {
                text_document_position: TextDocumentPositionParams {
                    text_document: TextDocumentIdentifier {
                        uri: uri.parse().unwrap(),
                    },
                    position: Position { line, character },
                },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
                context: None,
            })
            .unwrap(),
        )
        .finish()
}

/// Create a workspace/executeCommand request
pub fn create_execute_command_request(id: i64, command: &str, arguments: Vec<Value>) -> Request {
    Request::build("workspace/executeCommand")
        .id(id)
        .params(
            serde_json::to_value(ExecuteCommandParams {
                command: command.to_string(),
                arguments,
                work_done_progress_params: Default::default(),
            })
            .unwrap(),
        )
        .finish()
}

/// Collect notifications in background and return a receiver
pub fn spawn_notification_collector(mut socket: ClientSocket) -> mpsc::Receiver<Request> {
    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        while let Some(notification) = socket.next().await {
            if tx.send(notification).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Collect server messages like `spawn_notification_collector`, answering
/// every `workspace/applyEdit` request with the given `applied` flag
pub fn spawn_edit_answering_collector(
    socket: ClientSocket,
    applied: bool,
) -> mpsc::Receiver<Request> {
    let (tx, rx) = mpsc::channel(100);
    let (mut requests, mut responses) = socket.split();

    tokio::spawn(async move {
        while let Some(request) = requests.next().await {
            if request.method() == "workspace/applyEdit"
                && let Some(id) = request.id().cloned()
                && responses
                    .send(Response::from_ok(id, json!({ "applied": applied })))
                    .await
                    .is_err()
            {
                break;
            }
            if tx.send(request).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Wait for a notification with the specified method name from the receiver
pub async fn wait_for_notification(
    rx: &mut mpsc::Receiver<Request>,
    method: &str,
) -> Option<Request> {
    let timeout_duration = Duration::from_secs(5);

    loop {
        match timeout(timeout_duration, rx.recv()).await {
            Ok(Some(notification)) => {
                if notification.method() == method {
                    return Some(notification);
                }
                // Skip other notifications (like log_message)
            }
            _ => return None,
        }
    }
}

/// Wait for the next publishDiagnostics notification and decode it
pub async fn next_diagnostics(rx: &mut mpsc::Receiver<Request>) -> PublishDiagnosticsParams {
    let notification = wait_for_notification(rx, "textDocument/publishDiagnostics")
        .await
        .expect("Expected publishDiagnostics notification");
    serde_json::from_value(notification.params().unwrap().clone()).unwrap()
}

/// Skip the cache-only publish and return the one sent after fetching
pub async fn fetched_diagnostics(rx: &mut mpsc::Receiver<Request>) -> PublishDiagnosticsParams {
    next_diagnostics(rx).await;
    next_diagnostics(rx).await
}
