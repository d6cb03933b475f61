use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::{self, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use crate::config::LensConfig;
use crate::lsp::code_action::{DependencyIndex, generate_update_actions};
use crate::lsp::commands::{self, LensCommand};
use crate::lsp::completion::{completion_items, picker_payload};
use crate::lsp::diagnostics::generate_diagnostics;
use crate::lsp::inlay_hints::inlay_hints;
use crate::lsp::interaction::Interaction;
use crate::lsp::render::{RenderPlan, plan_cached};
use crate::lsp::span_range;
use crate::lsp::zones::{ClickableZone, ZoneTracker};
use crate::parser::package_json::PackageJsonScanner;
use crate::parser::traits::Scanner;
use crate::parser::types::{DependencyLocation, VersionSpan};
use crate::version::client::RegistryClient;
use crate::version::registries::npm::NpmRegistry;
use crate::version::registry::Registry;

type Documents = Arc<Mutex<HashMap<Url, DocumentState>>>;

/// State fixed at `initialize` and shared by every document
struct Session {
    config: LensConfig,
    registry: RegistryClient,
    /// Client accepts `workspace/inlayHint/refresh`
    inlay_refresh: bool,
}

struct DocumentState {
    content: String,
    plan: RenderPlan,
    zones: ZoneTracker,
    interaction: Interaction,
}

impl DocumentState {
    fn new(content: String, guard: Duration) -> Self {
        Self {
            content,
            plan: RenderPlan::default(),
            zones: ZoneTracker::new(),
            interaction: Interaction::new(guard),
        }
    }

    /// Recompute plan and zones from the stored text and cached metadata
    fn replan(&mut self, scanner: &dyn Scanner, session: &Session) {
        let decorations = &session.config.decorations;
        self.plan = plan_cached(&self.content, scanner, &session.registry, decorations);
        self.zones
            .rebuild(&self.content, &self.plan.dependencies, decorations);
    }
}

pub struct Backend {
    client: Client,
    scanner: Arc<dyn Scanner>,
    /// Replaces the npm registry built from the session config
    transport: Option<Arc<dyn Registry>>,
    session: OnceLock<Arc<Session>>,
    documents: Documents,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self::with_transport(client, None)
    }

    /// Build a Backend that sends every registry request to `registry`
    pub fn build(client: Client, registry: Arc<dyn Registry>) -> Self {
        Self::with_transport(client, Some(registry))
    }

    fn with_transport(client: Client, transport: Option<Arc<dyn Registry>>) -> Self {
        Self {
            client,
            scanner: Arc::new(PackageJsonScanner::new()),
            transport,
            session: OnceLock::new(),
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            inlay_hint_provider: Some(OneOf::Left(true)),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec!["\"".to_string()]),
                ..Default::default()
            }),
            code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: commands::ALL.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn create_session(&self, config: LensConfig, inlay_refresh: bool) -> Session {
        let transport: Arc<dyn Registry> = match &self.transport {
            Some(registry) => registry.clone(),
            None => Arc::new(NpmRegistry::new(&config.registry_url)),
        };

        Session {
            registry: RegistryClient::new(transport),
            config,
            inlay_refresh,
        }
    }

    /// Session from `initialize`, or a default one if requests arrive first
    fn session(&self) -> Arc<Session> {
        self.session
            .get_or_init(|| Arc::new(self.create_session(LensConfig::default(), false)))
            .clone()
    }

    async fn open_or_update(&self, uri: Url, content: String) {
        if !self.scanner.can_scan(uri.as_str()) {
            debug!("Ignoring {}", uri);
            return;
        }

        let session = self.session();
        {
            let mut documents = self.documents.lock().await;
            match documents.get_mut(&uri) {
                Some(document) => document.content = content,
                None => {
                    let guard = Duration::from_millis(session.config.picker_guard_ms);
                    documents.insert(uri.clone(), DocumentState::new(content, guard));
                }
            }
        }

        refresh_document(
            self.client.clone(),
            self.scanner.clone(),
            session,
            self.documents.clone(),
            uri,
        )
        .await;
    }

    /// Drop cached metadata and re-render every open document
    async fn refresh_all(&self) {
        let session = self.session();
        session.registry.clear_cache();

        let uris: Vec<Url> = self.documents.lock().await.keys().cloned().collect();
        info!("Refreshing {} documents", uris.len());

        for uri in uris {
            refresh_document(
                self.client.clone(),
                self.scanner.clone(),
                session.clone(),
                self.documents.clone(),
                uri,
            )
            .await;
        }
    }

    /// Resolved dependency whose version text holds the position
    async fn dependency_at(&self, uri: &Url, position: Position) -> Option<DependencyLocation> {
        let documents = self.documents.lock().await;
        let document = documents.get(uri)?;

        DependencyIndex::new(&document.plan.dependencies)
            .find_at_position(position)
            .map(|dependency| dependency.location.clone())
    }

    async fn picker_result(&self, zone: &ClickableZone) -> Result<Option<Value>> {
        let session = self.session();
        let Some(info) = session
            .registry
            .get_package_info(&zone.dependency.package_name)
            .await
        else {
            return Ok(None);
        };

        let Some(payload) = picker_payload(&zone.dependency, &info, session.config.show_prerelease)
        else {
            return Ok(None);
        };

        serde_json::to_value(payload).map(Some).map_err(|e| {
            warn!("Failed to serialize picker payload: {}", e);
            jsonrpc::Error::internal_error()
        })
    }

    async fn apply_version(&self, uri: &Url, span: VersionSpan, version: String) -> bool {
        let edit = WorkspaceEdit {
            changes: Some(HashMap::from([(
                uri.clone(),
                vec![TextEdit {
                    range: span_range(span),
                    new_text: version,
                }],
            )])),
            ..Default::default()
        };

        match self.client.apply_edit(edit).await {
            Ok(response) => {
                if !response.applied {
                    warn!("Client rejected edit: {:?}", response.failure_reason);
                }
                response.applied
            }
            Err(e) => {
                warn!("Failed to apply edit: {}", e);
                false
            }
        }
    }

    async fn execute(&self, command: LensCommand) -> Result<Option<Value>> {
        match command {
            LensCommand::Refresh => {
                self.refresh_all().await;
                Ok(None)
            }
            LensCommand::OpenPicker { uri, position } => {
                let zone = {
                    let mut documents = self.documents.lock().await;
                    let Some(document) = documents.get_mut(&uri) else {
                        return Ok(None);
                    };
                    let zone = document
                        .zones
                        .lookup(position.line as usize, position.character as usize)
                        .cloned();
                    if let Some(zone) = &zone {
                        document.interaction.open_picker(zone.clone());
                    }
                    zone
                };

                match zone {
                    Some(zone) => self.picker_result(&zone).await,
                    None => Ok(None),
                }
            }
            LensCommand::SelectionChanged {
                uri,
                position,
                origin,
            } => {
                let opened = {
                    let mut documents = self.documents.lock().await;
                    let Some(document) = documents.get_mut(&uri) else {
                        return Ok(None);
                    };
                    let zone = document
                        .zones
                        .lookup(position.line as usize, position.character as usize);
                    document
                        .interaction
                        .on_selection(zone, origin, Instant::now())
                        .cloned()
                };

                match opened {
                    Some(zone) => self.picker_result(&zone).await,
                    None => Ok(None),
                }
            }
            LensCommand::ApplyVersion {
                uri,
                position,
                version,
            } => {
                let span = {
                    let mut documents = self.documents.lock().await;
                    let Some(document) = documents.get_mut(&uri) else {
                        return Ok(Some(Value::Bool(false)));
                    };
                    let span = document
                        .zones
                        .lookup(position.line as usize, position.character as usize)
                        .map(ClickableZone::replace_span);
                    // Selection changes caused by the edit must not reopen the picker
                    document.interaction.edit_applied(Instant::now());
                    span
                };

                let Some(span) = span else {
                    warn!("No dependency at {}:{}", position.line, position.character);
                    return Ok(Some(Value::Bool(false)));
                };

                let applied = self.apply_version(&uri, span, version).await;
                Ok(Some(Value::Bool(applied)))
            }
            LensCommand::PickerClosed { uri } => {
                if let Some(document) = self.documents.lock().await.get_mut(&uri) {
                    document.interaction.close_picker();
                }
                Ok(None)
            }
        }
    }
}

/// Re-plan a stored document from cached metadata and publish diagnostics
///
/// Returns false when the document is no longer open.
async fn publish_plan(
    client: &Client,
    scanner: &dyn Scanner,
    session: &Session,
    documents: &Mutex<HashMap<Url, DocumentState>>,
    uri: &Url,
) -> bool {
    let diagnostics = {
        let mut documents = documents.lock().await;
        let Some(document) = documents.get_mut(uri) else {
            return false;
        };
        document.replan(scanner, session);
        generate_diagnostics(&document.plan.dependencies)
    };

    client
        .publish_diagnostics(uri.clone(), diagnostics, None)
        .await;
    true
}

/// Publish from the cache now, then fetch missing metadata in the background
/// and publish again from whatever text the document holds by then
async fn refresh_document(
    client: Client,
    scanner: Arc<dyn Scanner>,
    session: Arc<Session>,
    documents: Documents,
    uri: Url,
) {
    if !publish_plan(&client, &*scanner, &session, &documents, &uri).await {
        return;
    }

    let Some(content) = documents
        .lock()
        .await
        .get(&uri)
        .map(|document| document.content.clone())
    else {
        return;
    };

    tokio::spawn(async move {
        let locations = scanner.scan(&content);
        let fetched = session
            .registry
            .prefetch(locations.iter().map(|l| l.package_name.as_str()))
            .await;

        if fetched.is_empty() {
            return;
        }

        info!("Fetched {} packages, re-rendering {}", fetched.len(), uri);

        if publish_plan(&client, &*scanner, &session, &documents, &uri).await
            && session.inlay_refresh
            && let Err(e) = client.inlay_hint_refresh().await
        {
            warn!("Inlay hint refresh failed: {}", e);
        }
    });
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let config = match params.initialization_options {
            Some(options) => serde_json::from_value(options).unwrap_or_else(|e| {
                warn!("Invalid initializationOptions, using defaults: {}", e);
                LensConfig::default()
            }),
            None => LensConfig::default(),
        };
        let inlay_refresh = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.inlay_hint.as_ref())
            .and_then(|inlay_hint| inlay_hint.refresh_support)
            .unwrap_or(false);

        info!(registry = %config.registry_url, "Starting session");
        if self
            .session
            .set(Arc::new(self.create_session(config, inlay_refresh)))
            .is_err()
        {
            warn!("Session already initialized");
        }

        self.client
            .log_message(MessageType::INFO, "LSP server initializing")
            .await;
        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.client
            .log_message(MessageType::INFO, "LSP server shutting down")
            .await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.client
            .log_message(
                MessageType::LOG,
                format!("Document opened: {}", params.text_document.uri),
            )
            .await;

        self.open_or_update(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // With FULL sync mode, the last content change contains the full document text
        let Some(content) = params.content_changes.into_iter().last().map(|c| c.text) else {
            return;
        };

        self.open_or_update(params.text_document.uri, content).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if self.documents.lock().await.remove(&uri).is_some() {
            self.client.publish_diagnostics(uri, vec![], None).await;
        }
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        let documents = self.documents.lock().await;
        let Some(document) = documents.get(&params.text_document.uri) else {
            return Ok(None);
        };
        Ok(Some(inlay_hints(&document.plan.annotations, params.range)))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(location) = self.dependency_at(&uri, position).await else {
            return Ok(None);
        };

        let session = self.session();
        let Some(info) = session
            .registry
            .get_package_info(&location.package_name)
            .await
        else {
            return Ok(None);
        };

        let items = completion_items(&location, &info, session.config.show_prerelease);
        if items.is_empty() {
            return Ok(None);
        }

        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items,
        })))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let documents = self.documents.lock().await;
        let Some(document) = documents.get(&uri) else {
            return Ok(None);
        };

        let index = DependencyIndex::new(&document.plan.dependencies);
        let Some(dependency) = index.find_at_position(params.range.start) else {
            return Ok(None);
        };

        let actions = generate_update_actions(dependency, &uri);
        if actions.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            actions
                .into_iter()
                .map(CodeActionOrCommand::CodeAction)
                .collect(),
        ))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let command = LensCommand::parse(&params.command, &params.arguments)
            .map_err(|e| jsonrpc::Error::invalid_params(e.to_string()))?;
        debug!("Executing {:?}", command);

        self.execute(command).await
    }
}
