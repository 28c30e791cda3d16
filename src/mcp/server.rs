/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin
/// 2. Processes tool calls against the life tracker
/// 3. Sends JSON-RPC responses to stdout
///
/// It also watches today's items through the storage change feed: whenever a
/// tool call touched something that belongs to today, the streak check runs
/// once after the call and any celebration is appended to the tool's reply.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use jsonrpc_core::ErrorCode;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::storage::{ChangeEvent, ChangeFilter, OrganizerStorage, SubscriptionId};
use crate::tools::{self, ToolError};
use crate::{local_today, LifeTrackerServer, ServerError};

/// Why a tools/call could not produce a result
#[derive(Error, Debug)]
enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    Arguments(#[from] serde_json::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// MCP server that handles communication with the client
pub struct McpServer {
    tracker: LifeTrackerServer,
    /// Whether the client sent its initialized notification
    initialized: bool,
    /// Source of "today"; the device clock unless replaced
    clock: fn() -> NaiveDate,
    /// Set by the change feed when one of today's items changed
    day_dirty: Arc<AtomicBool>,
    /// The day currently watched and its subscription
    watch: Option<(NaiveDate, SubscriptionId)>,
}

impl McpServer {
    pub fn new(tracker: LifeTrackerServer) -> Self {
        Self::with_clock(tracker, local_today)
    }

    /// Create a server with a fixed notion of "today", used by tests
    pub fn with_clock(tracker: LifeTrackerServer, clock: fn() -> NaiveDate) -> Self {
        Self {
            tracker,
            initialized: false,
            clock,
            day_dirty: Arc::new(AtomicBool::new(false)),
            watch: None,
        }
    }

    pub fn tracker(&self) -> &LifeTrackerServer {
        &self.tracker
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        // an app start is a trigger too: stale streaks get reset right away
        let today = (self.clock)();
        self.watch_day(today);
        if let Some(note) = self.run_streak_check(today).await {
            info!("Startup streak check: {}", note);
        }

        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        self.unwatch();
        Ok(())
    }

    /// Process a single line of JSON-RPC input
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    ErrorCode::ParseError,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };
        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client initialized");
            }
            other => debug!("Ignoring notification {}", other),
        }
    }

    fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(init)) => {
                let client = init
                    .client_info
                    .map(|c| format!("{} {}", c.name, c.version.unwrap_or_default()))
                    .unwrap_or_else(|| "unknown client".to_string());
                info!("MCP client connected: {} (protocol {})", client, init.protocol_version);
            }
            Some(Err(e)) => warn!("Unrecognized initialize params: {}", e),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Life Tracker MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": tool_definitions() }))
    }

    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let today = (self.clock)();
        self.watch_day(today);
        if tool_params.name == "streak_check" {
            self.day_dirty.store(false, Ordering::SeqCst);
        }

        let mut result = match self.dispatch(&tool_params.name, tool_params.arguments, today).await {
            Ok(text) => ToolCallResult::success(text),
            Err(DispatchError::Tool(e)) if e.is_internal() => {
                error!("Tool {} failed: {}", tool_params.name, e);
                return JsonRpcResponse::error(id, error_codes::STORAGE_ERROR, e.to_string(), None);
            }
            Err(DispatchError::Arguments(e)) => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    format!("Invalid arguments for {}: {}", tool_params.name, e),
                    None,
                );
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        };

        if self.day_dirty.swap(false, Ordering::SeqCst) {
            if let Some(note) = self.run_streak_check(today).await {
                result.append(&note);
            }
        }

        JsonRpcResponse::from_serializable(id, &result)
    }

    async fn dispatch(
        &self,
        name: &str,
        args: Map<String, Value>,
        today: NaiveDate,
    ) -> Result<String, DispatchError> {
        let storage = self.tracker.storage();
        let rewards = self.tracker.rewards();

        let message = match name {
            "habit_create" => tools::create_habit(storage, parse_args(args)?).await?.message,
            "habit_update" => tools::update_habit(storage, parse_args(args)?).await?.message,
            "habit_toggle" => {
                tools::toggle_habit(storage, rewards, parse_args(args)?, today).await?.message
            }
            "habit_list" => tools::list_habits(storage, parse_args(args)?, today).await?.message,
            "task_create" => tools::create_task(storage, parse_args(args)?).await?.message,
            "task_complete" => tools::complete_task(storage, rewards, parse_args(args)?).await?.message,
            "homework_create" => tools::create_homework(storage, parse_args(args)?).await?.message,
            "homework_complete" => {
                tools::complete_homework(storage, rewards, parse_args(args)?).await?.message
            }
            "day_progress" => tools::day_progress(storage, parse_args(args)?, today).await?.message,
            "profile_status" => tools::profile_status(storage, parse_args(args)?).await?.message,
            "streak_check" => {
                tools::check_streak(storage, self.tracker.flags(), parse_args(args)?, today)
                    .await?
                    .message
            }
            _ => return Err(DispatchError::UnknownTool(name.to_string())),
        };
        Ok(message)
    }

    /// Subscribe to changes of `today`'s items, moving the watch on a new day
    fn watch_day(&mut self, today: NaiveDate) {
        if matches!(self.watch, Some((day, _)) if day == today) {
            return;
        }
        self.unwatch();

        let dirty = Arc::clone(&self.day_dirty);
        let id = self.tracker.storage().subscribe(
            ChangeFilter::day_items(today),
            Arc::new(move |event: &ChangeEvent| {
                debug!("Change affecting today: {:?}", event);
                dirty.store(true, Ordering::SeqCst);
            }),
        );
        debug!("Watching items of {}", today);
        self.watch = Some((today, id));
    }

    fn unwatch(&mut self) {
        if let Some((_, id)) = self.watch.take() {
            self.tracker.storage().unsubscribe(id);
        }
    }

    /// Run one streak pass; failures are logged and retried on the next trigger
    async fn run_streak_check(&self, today: NaiveDate) -> Option<String> {
        match self.tracker.evaluate_streak(today).await {
            Ok(outcome) => outcome.message(),
            Err(e) => {
                warn!("Streak check failed, will retry on the next change: {}", e);
                None
            }
        }
    }
}

fn parse_args<P: DeserializeOwned>(args: Map<String, Value>) -> Result<P, serde_json::Error> {
    serde_json::from_value(Value::Object(args))
}

fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(P);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"})),
    }
}

/// Every tool this server exposes, with schemas derived from the params types
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool::<tools::CreateHabitParams>("habit_create", "Create a new daily habit to track"),
        tool::<tools::UpdateHabitParams>(
            "habit_update",
            "Rename, describe, pause or resume a habit",
        ),
        tool::<tools::ToggleHabitParams>(
            "habit_toggle",
            "Mark a habit done for today or a past date, or unmark it if already done",
        ),
        tool::<tools::ListHabitsParams>(
            "habit_list",
            "List habits with their current streaks and today's state",
        ),
        tool::<tools::CreateTaskParams>("task_create", "Add a task, optionally with a due time"),
        tool::<tools::CompleteTaskParams>("task_complete", "Complete or reopen a task"),
        tool::<tools::CreateHomeworkParams>(
            "homework_create",
            "Add a homework assignment, optionally with a subject and due date",
        ),
        tool::<tools::CompleteHomeworkParams>(
            "homework_complete",
            "Complete or reopen a homework assignment",
        ),
        tool::<tools::DayProgressParams>(
            "day_progress",
            "Show how much of a day's tasks, homework and habits is done",
        ),
        tool::<tools::ProfileStatusParams>(
            "profile_status",
            "Show XP, level progress and the daily streak",
        ),
        tool::<tools::StreakCheckParams>(
            "streak_check",
            "Evaluate today's completion and update the daily streak",
        ),
    ]
}
