//! Standard I/O transport
//!
//! Line-delimited JSON-RPC over stdin/stdout. All logging goes to stderr so
//! stdout stays clean for protocol traffic.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter},
    sync::Mutex,
};
use tracing::{debug, error, info, warn};

use super::{JsonRpcMessage, McpMessage, MessageHandler};

/// Outcome of one read from the input stream
enum ReadOutcome {
    Message(McpMessage),
    BlankLine,
    Eof,
}

/// Standard I/O transport for local MCP client integration
pub struct StdioTransport {
    writer: Arc<Mutex<BufWriter<tokio::io::Stdout>>>,
    shutdown_signal: Arc<Mutex<bool>>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            writer: Arc::new(Mutex::new(BufWriter::new(tokio::io::stdout()))),
            shutdown_signal: Arc::new(Mutex::new(false)),
        }
    }

    async fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_signal.lock().await
    }

    async fn request_shutdown(&self) {
        *self.shutdown_signal.lock().await = true;
    }

    /// Write one JSON-RPC message followed by a newline and flush
    async fn write_message(&self, message: &McpMessage) -> Result<()> {
        let json_str = serde_json::to_string(&message.to_jsonrpc())
            .context("Failed to serialize message to JSON")?;
        debug!("Sending message: {}", json_str);

        let mut writer = self.writer.lock().await;
        writer
            .write_all(json_str.as_bytes())
            .await
            .context("Failed to write message to stdout")?;
        writer
            .write_all(b"\n")
            .await
            .context("Failed to write newline to stdout")?;
        writer.flush().await.context("Failed to flush stdout")?;
        Ok(())
    }

    /// Read and parse one JSON-RPC line from the input stream.
    ///
    /// EOF and blank lines are distinct outcomes: a blank line is skipped,
    /// while EOF means the client closed its end and the loop must stop.
    async fn read_message<R>(reader: &mut R) -> Result<ReadOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("EOF received on stdin");
                Ok(ReadOutcome::Eof)
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return Ok(ReadOutcome::BlankLine);
                }
                debug!("Received line: {}", trimmed);
                let jsonrpc: JsonRpcMessage = serde_json::from_str(trimmed)
                    .map_err(|e| anyhow::Error::new(e).context("Failed to parse JSON-RPC message"))?;
                jsonrpc.to_mcp_message().map(ReadOutcome::Message)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from stdin")),
        }
    }

    async fn process_messages(&self, handler: Box<dyn MessageHandler + Send + Sync>) -> Result<()> {
        let stdin = tokio::io::stdin();
        let reader = BufReader::new(stdin);
        self.read_loop(reader, handler).await
    }

    async fn read_loop<R>(
        &self,
        mut reader: R,
        handler: Box<dyn MessageHandler + Send + Sync>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Starting stdio message processing loop");
        loop {
            if self.is_shutdown_requested().await {
                info!("Shutdown requested, stopping message processing");
                break;
            }

            match Self::read_message(&mut reader).await {
                Ok(ReadOutcome::Message(message)) => match handler.handle_message(message).await {
                    Ok(Some(response)) => {
                        if let Err(e) = self.write_message(&response).await {
                            error!("Failed to send response: {}", e);
                        }
                    }
                    Ok(None) => debug!("No response generated for message"),
                    Err(e) => error!("Handler error: {}", e),
                },
                Ok(ReadOutcome::BlankLine) => continue,
                Ok(ReadOutcome::Eof) => {
                    info!("Client closed stdin, stopping message processing");
                    break;
                }
                Err(e) => {
                    warn!("Error reading message: {}", e);
                    continue;
                }
            }
        }

        info!("Message processing loop ended");
        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Transport for StdioTransport {
    async fn start(&self, handler: Box<dyn MessageHandler + Send + Sync>) -> Result<()> {
        info!("Starting stdio transport for MCP communication");
        *self.shutdown_signal.lock().await = false;
        self.process_messages(handler).await
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down stdio transport");
        self.request_shutdown().await;
        if let Ok(mut writer) = self.writer.try_lock() {
            if let Err(e) = writer.flush().await {
                warn!("Failed to flush output during shutdown: {}", e);
            }
        }
        Ok(())
    }
}
