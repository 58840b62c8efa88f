//! Invocation resolution for call tips.
//!
//! Given a cursor offset, find the innermost function or method call whose
//! span contains it and describe that call:
//!
//! - the **call stack**, the receiver chain read left to right
//!   (`$a->b->c()` gives `["$a", "b", "c()"]`);
//! - the **argument index** the cursor is positioned at;
//! - the **parameter list start**, the byte offset right after the callee
//!   name, which is where the editor anchors its signature popup.
//!
//! A dynamic member such as `$obj->{$name}()` has no name span to anchor
//! on.  In that case the source text is scanned from the end of the
//! receiver, over the access operator, to the end of the member text.
//! The scan is strict: anything other than whitespace (and, when enabled,
//! comments) means the text and the tree disagree, which is reported as a
//! [`ConsistencyError`].

use serde::Serialize;

use crate::errors::ConsistencyError;
use crate::syntax::{AccessOperator, FunctionCall, Member, MethodCall, Node, NodeKind};
use crate::walk::{Descend, Pruning, walk};

/// Whether the call is a plain function call or a method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationKind {
    Function,
    Method,
}

impl InvocationKind {
    /// The value of the `type` field in responses.  Functions and methods
    /// share the `"function"` type; the distinction is kept on the typed
    /// result only.
    pub fn wire_type(&self) -> &'static str {
        "function"
    }
}

/// Description of the call enclosing a cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The callee identifier, or `None` for dynamic callees
    /// (`$fn()`, `$obj->$method()`, `$obj->{$expr}()`).
    pub name: Option<String>,
    pub kind: InvocationKind,
    pub call_stack: Vec<String>,
    pub argument_index: usize,
    pub parameter_list_start: u32,
}

/// Options for the raw-text member scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Also skip `/* */`, `//` and `#` comments between the receiver and
    /// the member.  Off by default: only whitespace is accepted.
    pub skip_comments: bool,
}

/// Find the innermost call enclosing `offset` and describe it.
///
/// Returns `Ok(None)` when the offset is not inside any call.
pub fn resolve_invocation(
    roots: &[Node],
    source: &str,
    offset: u32,
    options: ScanOptions,
) -> Result<Option<Invocation>, ConsistencyError> {
    let Some(call) = find_innermost_call(roots, offset) else {
        return Ok(None);
    };

    let invocation = match &call.kind {
        NodeKind::FunctionCall(function) => describe_function_call(function, source, offset),
        NodeKind::MethodCall(method) => describe_method_call(call, method, source, offset, options)?,
        _ => return Ok(None),
    };

    Ok(Some(invocation))
}

/// The last call visited whose span contains `offset`.
///
/// Pre-order visits an outer call before the calls nested in it, and
/// disjoint subtrees are never entered, so the last candidate recorded
/// is the innermost one.
fn find_innermost_call(roots: &[Node], offset: u32) -> Option<&Node> {
    let mut candidate = None;

    walk(roots, |node| {
        if Pruning::Disjoint.skips(node.span, offset) {
            return Descend::Skip;
        }
        if node.kind.is_call() {
            candidate = Some(node);
        }
        Descend::Children
    });

    candidate
}

fn describe_function_call(call: &FunctionCall, source: &str, offset: u32) -> Invocation {
    let name = match &call.callee.kind {
        NodeKind::Identifier { name } => Some(name.clone()),
        _ => None,
    };

    Invocation {
        name,
        kind: InvocationKind::Function,
        call_stack: vec![terminal_text(&call.callee, source)],
        argument_index: argument_index(&call.arguments, offset),
        parameter_list_start: call.callee.span.end,
    }
}

fn describe_method_call(
    node: &Node,
    call: &MethodCall,
    source: &str,
    offset: u32,
    options: ScanOptions,
) -> Result<Invocation, ConsistencyError> {
    let parameter_list_start = match &call.member {
        Member::Identifier { span, .. } => span.end,
        Member::Variable(variable) => variable.span.end,
        Member::Expression { text, .. } => scan_member_end(
            source,
            call.receiver.span.end,
            call.operator,
            text,
            options,
        )?,
    };

    Ok(Invocation {
        name: call.member.identifier().map(str::to_string),
        kind: InvocationKind::Method,
        call_stack: call_stack(node, source),
        argument_index: argument_index(&call.arguments, offset),
        parameter_list_start,
    })
}

/// Walk from the call outwards through its receivers, then reverse so the
/// stack reads as written in source.
pub fn call_stack(call: &Node, source: &str) -> Vec<String> {
    let mut stack = Vec::new();
    let mut current = Some(call);

    while let Some(node) = current {
        current = match &node.kind {
            NodeKind::MethodCall(method) => {
                stack.push(format!("{}()", method.member.text()));
                Some(method.receiver.as_ref())
            }
            NodeKind::PropertyAccess(access) => {
                stack.push(access.member.text());
                Some(access.receiver.as_ref())
            }
            NodeKind::StaticPropertyAccess(access) => {
                stack.push(access.property.clone());
                None
            }
            _ => {
                stack.push(terminal_text(node, source));
                None
            }
        };
    }

    stack.reverse();
    stack
}

/// Textual form of the expression a receiver chain starts from.
fn terminal_text(node: &Node, source: &str) -> String {
    match &node.kind {
        NodeKind::Variable { name } => format!("${name}"),
        NodeKind::Identifier { name } => name.clone(),
        NodeKind::FunctionCall(call) => format!("{}()", terminal_text(&call.callee, source)),
        _ => node
            .span
            .text(source)
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| node.kind.label().to_string()),
    }
}

/// Number of arguments the cursor has moved past.
///
/// An argument counts as passed once the offset is beyond its last byte
/// plus one.  One-character arguments have `start == last`, so the cursor
/// has to be strictly past the following character.  A cursor sitting
/// right after an argument's last byte (typically on the comma) therefore
/// still reports that argument's index.
pub fn argument_index(arguments: &[Node], offset: u32) -> usize {
    arguments
        .iter()
        .filter(|argument| offset > argument.span.last() + 1)
        .count()
}

/// Locate the end of a dynamic member by scanning the source from the end
/// of the receiver.
///
/// Expects optional whitespace, the operator characters in order, more
/// optional whitespace, and then exactly `member`.  Returns the offset
/// right after the member text.
pub fn scan_member_end(
    source: &str,
    from: u32,
    operator: AccessOperator,
    member: &str,
    options: ScanOptions,
) -> Result<u32, ConsistencyError> {
    let bytes = source.as_bytes();
    let expected = operator.as_str().as_bytes();
    let mut matched = 0usize;
    let mut i = from as usize;

    loop {
        let Some(&byte) = bytes.get(i) else {
            return Err(ConsistencyError::UnexpectedEnd {
                offset: i as u32,
                member: member.to_string(),
            });
        };

        if matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
            i += 1;
            continue;
        }

        if options.skip_comments
            && let Some(next) = skip_comment(bytes, i)
        {
            i = next;
            continue;
        }

        if matched < expected.len() && byte == expected[matched] {
            matched += 1;
            i += 1;
            continue;
        }

        if let Some(position) = expected.iter().position(|&c| c == byte) {
            return Err(if position < matched {
                ConsistencyError::RepeatedOperator {
                    found: byte as char,
                    offset: i as u32,
                }
            } else {
                ConsistencyError::MisplacedOperator {
                    found: byte as char,
                    offset: i as u32,
                    operator,
                }
            });
        }

        if matched < expected.len() {
            return Err(ConsistencyError::UnexpectedToken {
                found: source
                    .get(i..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or(byte as char),
                offset: i as u32,
            });
        }

        if !bytes[i..].starts_with(member.as_bytes()) {
            return Err(ConsistencyError::NameMismatch {
                expected: member.to_string(),
                offset: i as u32,
            });
        }

        return Ok((i + member.len()) as u32);
    }
}

/// If a comment starts at `i`, the offset right after it.
fn skip_comment(bytes: &[u8], i: usize) -> Option<usize> {
    let rest = &bytes[i..];
    if rest.starts_with(b"/*") {
        let close = memchr::memmem::find(&rest[2..], b"*/")?;
        return Some(i + 2 + close + 2);
    }
    if rest.starts_with(b"//") || (rest.first() == Some(&b'#') && rest.get(1) != Some(&b'[')) {
        let line_end = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
        return Some(i + line_end);
    }
    None
}
