//! LSP server initialization and lifecycle

use tower_lsp::{LspService, Server};
use tracing::info;

use crate::logging::init_file_logging;
use crate::lsp::backend::Backend;

/// Serve the language server over stdio until the client disconnects
pub async fn run_server(log_json: bool) -> anyhow::Result<()> {
    // stdout belongs to the transport; without a log file we run silent
    let _guard = init_file_logging(log_json)
        .inspect_err(|e| eprintln!("File logging disabled: {e:#}"))
        .ok();

    info!("Starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("Server stopped");
    Ok(())
}
