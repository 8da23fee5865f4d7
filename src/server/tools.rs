//! Tool calls exposed over `tools/call`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::{SearchError, SearchResult};
use crate::index::context::MatchContext;
use crate::index::search::Relevance;
use crate::index::SemanticIndexer;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexArgs {
    /// Resolved against the base directory; defaults to the base itself
    #[serde(default = "default_root")]
    pub root_path: String,
    #[serde(default)]
    pub force: bool,
}

fn default_root() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub threshold: Option<f32>,
}

/// Every tool the server understands
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    SemanticSearch(SearchArgs),
    IndexCodebase(IndexArgs),
    GetIndexStatus,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl ToolCall {
    /// Parse the `params` of a `tools/call` request
    pub fn from_params(params: Value) -> SearchResult<Self> {
        let call: CallParams = serde_json::from_value(params)
            .map_err(|e| SearchError::MalformedRequest(format!("invalid tools/call params: {e}")))?;

        match call.name.as_str() {
            "semantic_search" => serde_json::from_value(call.arguments)
                .map(ToolCall::SemanticSearch)
                .map_err(bad_arguments("semantic_search")),
            "index_codebase" => {
                let args = if call.arguments.is_null() { json!({}) } else { call.arguments };
                serde_json::from_value(args)
                    .map(ToolCall::IndexCodebase)
                    .map_err(bad_arguments("index_codebase"))
            }
            "get_index_status" => Ok(ToolCall::GetIndexStatus),
            other => Err(SearchError::MalformedRequest(format!("Unknown tool: {other}"))),
        }
    }

    /// Run the call against `indexer`.
    ///
    /// Only argument errors come back as `Err`; tool-level failures are
    /// reported inside the result object with `success: false`.
    pub fn execute(self, indexer: &mut SemanticIndexer) -> SearchResult<Value> {
        let value = match self {
            ToolCall::IndexCodebase(args) => index_codebase(indexer, args),
            ToolCall::SemanticSearch(args) => semantic_search(indexer, args)?,
            ToolCall::GetIndexStatus => index_status(indexer),
        };
        Ok(value)
    }
}

fn bad_arguments(tool: &'static str) -> impl Fn(serde_json::Error) -> SearchError {
    move |e| SearchError::MalformedRequest(format!("invalid arguments for {tool}: {e}"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexSuccess {
    success: bool,
    message: String,
    indexed: usize,
    total_files: usize,
    skipped: usize,
    root_path: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexFailed {
    success: bool,
    message: String,
    error: &'static str,
    indexed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    success: bool,
    query: String,
    result_count: usize,
    results: Vec<SearchResultItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultItem {
    file_path: String,
    similarity: f32,
    relevance: Relevance,
    context: MatchContext,
    preview: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    success: bool,
    indexed: bool,
    file_count: usize,
    last_updated: Option<DateTime<Utc>>,
    root_path: Option<String>,
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| json!({"success": false, "message": e.to_string()}))
}

fn index_codebase(indexer: &mut SemanticIndexer, args: IndexArgs) -> Value {
    match indexer.index_codebase(&args.root_path, args.force) {
        Ok(report) => {
            let mut message = format!(
                "Indexed {} of {} files in {}ms",
                report.indexed, report.total_files, report.time_taken_ms
            );
            if report.limit_reached {
                message.push_str(" (file limit reached)");
            }
            to_value(IndexSuccess {
                success: true,
                message,
                indexed: report.indexed,
                total_files: report.total_files,
                skipped: report.skipped.len(),
                root_path: report.root.display().to_string(),
                timestamp: report.timestamp,
            })
        }
        Err(failure) => to_value(IndexFailed {
            success: false,
            message: failure.error.to_string(),
            error: failure.error.kind(),
            indexed: failure.indexed,
        }),
    }
}

fn semantic_search(indexer: &SemanticIndexer, args: SearchArgs) -> SearchResult<Value> {
    match indexer.semantic_search(&args.query, args.limit, args.threshold) {
        Ok(matches) => {
            let results: Vec<SearchResultItem> = matches
                .into_iter()
                .map(|m| SearchResultItem {
                    file_path: m.path.display().to_string(),
                    similarity: m.similarity,
                    relevance: m.relevance,
                    context: m.context,
                    preview: m.preview,
                })
                .collect();
            Ok(to_value(SearchResponse {
                success: true,
                query: args.query,
                result_count: results.len(),
                results,
                message: None,
            }))
        }
        Err(SearchError::NotIndexed) => Ok(to_value(SearchResponse {
            success: false,
            query: args.query,
            result_count: 0,
            results: Vec::new(),
            message: Some(SearchError::NotIndexed.to_string()),
        })),
        Err(e) => Err(e),
    }
}

fn index_status(indexer: &SemanticIndexer) -> Value {
    let status = indexer.status();
    to_value(StatusResponse {
        success: true,
        indexed: status.indexed,
        file_count: status.count,
        last_updated: status.last_updated,
        root_path: indexer.root().map(|p| p.display().to_string()),
    })
}

/// Descriptors returned by `tools/list`
pub fn descriptors() -> Value {
    json!({
        "tools": [
            {
                "name": "semantic_search",
                "description": "Search the indexed codebase by meaning",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "Natural language query"},
                        "limit": {"type": "integer", "minimum": 1, "maximum": 1000},
                        "threshold": {"type": "number", "description": "Minimum cosine similarity"}
                    },
                    "required": ["query"]
                }
            },
            {
                "name": "index_codebase",
                "description": "Index source files under a directory",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "rootPath": {"type": "string"},
                        "force": {"type": "boolean", "description": "Clear the index before walking"}
                    }
                }
            },
            {
                "name": "get_index_status",
                "description": "Report whether an index exists and how many files it holds",
                "inputSchema": {"type": "object", "properties": {}}
            }
        ]
    })
}
