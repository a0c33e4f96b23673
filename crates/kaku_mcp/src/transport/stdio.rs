//! stdio transport
//!
//! One JSON-RPC message per line in, one response per line out.

use crate::{JsonRpcRequest, JsonRpcResponse, McpServer};
use kaku_common::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Serve stdin/stdout until stdin closes
pub async fn serve(server: &McpServer) -> Result<()> {
    tracing::info!("Starting Kakuyomu MCP server with stdio transport");
    serve_lines(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    tracing::info!("Kakuyomu MCP server shutting down");
    Ok(())
}

/// Serve newline-delimited JSON-RPC from `reader` to `writer`
pub async fn serve_lines<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        tracing::debug!("Received: {}", line);

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => server.handle_request(request).await,
            Err(e) => {
                tracing::error!("Failed to parse request: {}", e);
                Some(JsonRpcResponse::parse_error(&e))
            }
        };

        // Notifications don't get responses
        if let Some(resp) = response {
            let response_json = serde_json::to_string(&resp)?;
            tracing::debug!("Sending: {}", response_json);

            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    Ok(())
}
