/// PHP parsing and lowering into the engine's syntax tree.
///
/// Source text is parsed with the mago_syntax parser into an arena-backed
/// AST, which is immediately lowered into the owned [`Node`] tree from
/// [`crate::syntax`].  The arena is dropped before returning, so callers
/// never see mago types.
///
/// Sub-modules:
/// - [`statements`]: statements, class-like members and parameters
/// - [`expressions`]: expressions, call arguments and member selectors
mod expressions;
mod statements;

use std::panic;

use bumpalo::Bump;
use mago_syntax::parser::parse_file_content;

use crate::syntax::Node;

/// The lowered syntax tree of one source text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Top-level nodes in source order.
    pub fn roots(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parse `source` and lower it into a [`SyntaxTree`].
///
/// The parser recovers from most syntax errors: an unclosed call followed
/// by more code still lowers to a call node, and `$obj->` with no member
/// lowers to a member with an empty name.  A statement cut off by the end
/// of the file is dropped entirely, so `foo($a, ` at EOF yields no call.
/// If the parser panics the error is logged and an empty tree is
/// returned.
pub fn parse_php(source: &str) -> SyntaxTree {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| lower_program(source)));

    match result {
        Ok(nodes) => SyntaxTree::new(nodes),
        Err(_) => {
            tracing::error!(
                bytes = source.len(),
                "PHP parser panicked; continuing with an empty syntax tree"
            );
            SyntaxTree::default()
        }
    }
}

fn lower_program(source: &str) -> Vec<Node> {
    let arena = Bump::new();
    let file_id = mago_database::file::FileId::new("input.php");
    let program = parse_file_content(&arena, file_id, source);

    let mut nodes = Vec::new();
    statements::lower_statements(program.statements.iter(), source, &mut nodes);
    nodes
}
