//! MCP server implementation

use crate::protocol::*;
use crate::tools;
use anyhow::Result;
use serde_json::Value;
use syllabo_core::{Pipeline, SyllaboError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> McpServer<'a> {
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// Serve line-delimited JSON-RPC on stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();

        let mut reader = BufReader::new(stdin);
        let mut writer = BufWriter::new(stdout);
        let mut line = String::new();

        tracing::info!("MCP server listening on stdio");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        &format!("Parse error: {}", e),
                    );
                    self.write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            // Notifications carry no id and get no reply
            if request.id.is_none() && request.method.starts_with("notifications/") {
                tracing::debug!(method = %request.method, "Notification received");
                continue;
            }

            let response = self.handle_request(&request).await;
            self.write_response(&mut writer, &response).await?;
        }

        tracing::info!("MCP server stopped");
        Ok(())
    }

    async fn write_response<W: AsyncWriteExt + Unpin>(
        &self,
        writer: &mut W,
        response: &JsonRpcResponse,
    ) -> Result<()> {
        let json = serde_json::to_string(response)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id.clone(), serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "syllabo",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = tools::all_definitions();
        JsonRpcResponse::success(request.id.clone(), serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        tracing::info!(tool = name, "Tool call");

        let result = match name {
            "analyze" => tools::handle_analyze(self.pipeline, arguments).await,
            "generate_material" => tools::handle_generate_material(self.pipeline, arguments).await,
            "material_types" => tools::handle_material_types().await,
            _ => {
                return JsonRpcResponse::error(
                    request.id.clone(),
                    error_codes::INVALID_PARAMS,
                    &format!("Unknown tool: {}", name),
                )
            }
        };

        let tool_result = result.unwrap_or_else(|e| {
            tracing::warn!(tool = name, error = %e, "Tool call failed");
            error_result(&e)
        });

        match serde_json::to_value(tool_result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INTERNAL_ERROR,
                &format!("Failed to serialize tool result: {}", e),
            ),
        }
    }
}

/// Tool-level failure carrying the pipeline's error category
fn error_result(error: &anyhow::Error) -> ToolResult {
    let category = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<SyllaboError>())
        .map(|e| e.category());

    ToolResult {
        content: vec![Content::Text {
            text: format!("Error: {}", error),
        }],
        structured_content: Some(serde_json::json!({
            "category": category.map(|c| Value::String(c.to_string())).unwrap_or(Value::Null),
            "message": error.to_string(),
        })),
        is_error: Some(true),
    }
}

pub async fn start_server(pipeline: &Pipeline) -> Result<()> {
    let server = McpServer::new(pipeline);
    server.run().await
}
