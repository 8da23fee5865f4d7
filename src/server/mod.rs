//! Line-delimited JSON-RPC server over stdio
//!
//! One request is read, handled to completion and answered before the next
//! line is read, so the index never sees concurrent access.

pub mod protocol;
pub mod tools;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::core::{SearchError, SearchResult};
use crate::index::SemanticIndexer;
use protocol::{RpcRequest, RpcResponse};
use tools::ToolCall;

/// Methods the server answers
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Initialize,
    ListTools,
    CallTool(ToolCall),
    /// `notifications/*`: handled silently, never answered
    Notification(String),
}

impl Method {
    pub fn parse(method: &str, params: Value) -> SearchResult<Self> {
        match method {
            "initialize" => Ok(Method::Initialize),
            "tools/list" => Ok(Method::ListTools),
            "tools/call" => ToolCall::from_params(params).map(Method::CallTool),
            m if m.starts_with("notifications/") => Ok(Method::Notification(m.to_string())),
            other => Err(SearchError::MalformedRequest(format!("Method not found: {other}"))),
        }
    }
}

pub struct Server {
    indexer: SemanticIndexer,
}

impl Server {
    pub fn new(indexer: SemanticIndexer) -> Self {
        Self { indexer }
    }

    /// Handle one raw input line. `None` means nothing should be written back.
    pub fn handle_line(&mut self, line: &str) -> Option<RpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                warn!("Rejected unparsable request: {}", e);
                Some(RpcResponse::error(Value::Null, format!("Malformed request: {e}")))
            }
        }
    }

    pub fn handle_request(&mut self, request: RpcRequest) -> Option<RpcResponse> {
        let id = request.id;
        debug!("Handling {}", request.method);

        let method = match Method::parse(&request.method, request.params) {
            Ok(method) => method,
            Err(e) => {
                warn!("{}", e);
                return Some(RpcResponse::error(id, e.to_string()));
            }
        };

        let result = match method {
            Method::Initialize => Ok(json!({
                "status": "ready",
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            Method::ListTools => Ok(tools::descriptors()),
            Method::CallTool(call) => call.execute(&mut self.indexer),
            Method::Notification(name) => {
                debug!("Notification {}", name);
                return None;
            }
        };

        Some(match result {
            Ok(value) => RpcResponse::success(id, value),
            Err(e) => RpcResponse::error(id, e.to_string()),
        })
    }

    /// Serve requests from stdin until it closes
    pub async fn serve_stdio(&mut self) -> Result<()> {
        info!(
            "Semantic search server ready (base: {})",
            self.indexer.base_dir().display()
        );
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Answer each line of `reader` on `writer`. A line that is not UTF-8
    /// gets an error reply; only I/O failures end the loop.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: tokio::io::AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read request")?;
            if read == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line),
                Err(e) => {
                    warn!("Rejected request that is not UTF-8: {}", e);
                    Some(RpcResponse::error(Value::Null, format!("Malformed request: {e}")))
                }
            };

            if let Some(response) = response {
                let mut encoded = serde_json::to_string(&response)
                    .context("Failed to encode response")?;
                encoded.push('\n');
                writer
                    .write_all(encoded.as_bytes())
                    .await
                    .context("Failed to write response")?;
                writer.flush().await.context("Failed to flush response")?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }
}
