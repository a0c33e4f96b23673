//! Transports: newline-delimited JSON-RPC on stdio, and streamable HTTP

pub mod http;
pub mod stdio;

use clap::ValueEnum;

/// Transport selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// JSON-RPC over HTTP POST at /mcp
    StreamableHttp,
}
