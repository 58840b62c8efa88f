//! Query facade.
//!
//! Turns a [`QueryRequest`] into a typed [`QueryOutput`]: validates the
//! request, acquires the source text, parses it and dispatches to the
//! scope-chain or invocation resolver.  [`Response`] wraps the outcome in
//! the `{"success": ..., "result": ...}` envelope written by the CLI.

use std::io::Read;
use std::path::PathBuf;

use serde::Serialize;

use crate::errors::QueryError;
use crate::invocation::{Invocation, ScanOptions, resolve_invocation};
use crate::parser::parse_php;
use crate::scope_chain::{ScopeChain, resolve_scope_chain};
use crate::util::{byte_offset_from_char_offset, line_of_offset};

pub const MISSING_SOURCE: &str = "Either a --file must be supplied or --stdin must be passed!";
pub const MISSING_OFFSET: &str = "An --offset must be supplied into the source code!";
pub const MISSING_MODE: &str = "A query mode must be supplied!";
pub const NO_INVOCATION: &str = "No invocation found!";

// ─── Request ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    ScopeChain,
    Invocation,
}

/// Where the source text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    Text(String),
    File(PathBuf),
    /// Read all of standard input.  Blocks until EOF.
    Stdin,
}

impl SourceInput {
    pub fn read(&self) -> Result<String, QueryError> {
        match self {
            SourceInput::Text(text) => Ok(text.clone()),
            SourceInput::File(path) => std::fs::read_to_string(path).map_err(|e| {
                QueryError::Input(format!("Could not read {}: {e}", path.display()))
            }),
            SourceInput::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|e| QueryError::Input(format!("Could not read stdin: {e}")))?;
                Ok(text)
            }
        }
    }
}

/// A query as received from a caller.  Required fields are optional here
/// so that their absence can be reported as an input error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub mode: Option<QueryMode>,
    pub source: Option<SourceInput>,
    pub offset: Option<u32>,
    /// Render a scope chain as a dot-joined selector string.
    pub as_selector: bool,
    /// `offset` counts characters rather than bytes.
    pub char_offset: bool,
}

// ─── Output ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutput {
    ScopeChain(ScopeChain),
    Selector(String),
    Invocation(Invocation),
    /// The offset is not inside any call.
    NoInvocation,
}

impl QueryOutput {
    pub fn is_success(&self) -> bool {
        !matches!(self, QueryOutput::NoInvocation)
    }
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Stateless query runner.  Every call parses its own source, so results
/// depend only on the arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
    scan: ScanOptions,
}

impl QueryEngine {
    pub fn new(scan: ScanOptions) -> Self {
        Self { scan }
    }

    /// Validate `request`, read its source and run it.
    pub fn run(&self, request: &QueryRequest) -> Result<QueryOutput, QueryError> {
        let mode = request
            .mode
            .ok_or_else(|| QueryError::Input(MISSING_MODE.to_string()))?;
        let source = request
            .source
            .as_ref()
            .ok_or_else(|| QueryError::Input(MISSING_SOURCE.to_string()))?;
        let offset = request
            .offset
            .ok_or_else(|| QueryError::Input(MISSING_OFFSET.to_string()))?;

        let text = source.read()?;
        let offset = if request.char_offset {
            byte_offset_from_char_offset(&text, offset)
        } else {
            offset
        };

        tracing::debug!(
            ?mode,
            offset,
            line = line_of_offset(&text, offset),
            bytes = text.len(),
            "running query"
        );

        match mode {
            QueryMode::ScopeChain => Ok(self.scope_chain(&text, offset, request.as_selector)),
            QueryMode::Invocation => self.invocation(&text, offset),
        }
    }

    /// Scope chain at byte `offset`, optionally rendered as a selector.
    pub fn scope_chain(&self, source: &str, offset: u32, as_selector: bool) -> QueryOutput {
        let tree = parse_php(source);
        let chain = resolve_scope_chain(tree.roots(), offset);
        tracing::debug!(depth = chain.len(), "resolved scope chain");

        if as_selector {
            QueryOutput::Selector(chain.selector())
        } else {
            QueryOutput::ScopeChain(chain)
        }
    }

    /// Innermost call enclosing byte `offset`.
    pub fn invocation(&self, source: &str, offset: u32) -> Result<QueryOutput, QueryError> {
        let tree = parse_php(source);
        let found = resolve_invocation(tree.roots(), source, offset, self.scan)?;

        Ok(match found {
            Some(invocation) => {
                tracing::debug!(
                    name = invocation.name.as_deref().unwrap_or("<dynamic>"),
                    argument_index = invocation.argument_index,
                    "resolved invocation"
                );
                QueryOutput::Invocation(invocation)
            }
            None => QueryOutput::NoInvocation,
        })
    }
}

// ─── Response envelope ──────────────────────────────────────────────────────

/// Invocation as written on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationPayload {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub call_stack: Vec<String>,
    pub argument_index: usize,
    #[serde(rename = "parameterListStartPos")]
    pub parameter_list_start: u32,
}

impl From<Invocation> for InvocationPayload {
    fn from(invocation: Invocation) -> Self {
        Self {
            name: invocation.name,
            kind: invocation.kind.wire_type(),
            call_stack: invocation.call_stack,
            argument_index: invocation.argument_index,
            parameter_list_start: invocation.parameter_list_start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseResult {
    ScopeChain(ScopeChain),
    Selector(String),
    Invocation(InvocationPayload),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub success: bool,
    pub result: ResponseResult,
}

impl Response {
    pub fn from_outcome(outcome: Result<QueryOutput, QueryError>) -> Self {
        match outcome {
            Ok(output) => {
                let success = output.is_success();
                let result = match output {
                    QueryOutput::ScopeChain(chain) => ResponseResult::ScopeChain(chain),
                    QueryOutput::Selector(selector) => ResponseResult::Selector(selector),
                    QueryOutput::Invocation(invocation) => {
                        ResponseResult::Invocation(invocation.into())
                    }
                    QueryOutput::NoInvocation => ResponseResult::Message(NO_INVOCATION.to_string()),
                };
                Self { success, result }
            }
            Err(err) => Self {
                success: false,
                result: ResponseResult::Message(err.to_string()),
            },
        }
    }

    /// The envelope as one line of JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
