//! Scope chain resolution.
//!
//! Produces the ordered list of constructs enclosing a byte offset,
//! outermost first.  Class-likes, function-likes, control-flow statements
//! and every expression are *scope-defining*: they start a new nesting
//! level and join the chain when their span contains the offset.  Plain
//! statements are only remembered as members of the current level and
//! are reported after the chain when no deeper scope-defining node
//! follows them, which identifies "between statements" positions.
//!
//! The chain can also be rendered as a CSS-selector-like string
//! (`ClassDeclaration.MethodDeclaration.MethodCall`) for cheap context
//! matching on the editor side.

use serde::Serialize;

use crate::syntax::{Node, NodeCategory};
use crate::walk::{Descend, Pruning, walk};

/// One entry of a scope chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeChainItem {
    pub kind: String,
}

impl ScopeChainItem {
    fn for_node(node: &Node) -> Self {
        Self {
            kind: node.kind.label().to_string(),
        }
    }
}

/// The enclosing scopes at an offset, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScopeChain {
    items: Vec<ScopeChainItem>,
}

impl ScopeChain {
    pub fn items(&self) -> &[ScopeChainItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The labels joined with `.`.
    pub fn selector(&self) -> String {
        self.items
            .iter()
            .map(|item| item.kind.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Accumulator threaded through a single scope-chain walk.
#[derive(Default)]
struct ChainBuilder {
    chain: Vec<ScopeChainItem>,
    /// Plain statements seen since the last scope boundary.
    members: Vec<ScopeChainItem>,
}

impl ChainBuilder {
    fn visit(&mut self, node: &Node, offset: u32) -> Descend {
        if Pruning::StartsAtOrAfter.skips(node.span, offset) {
            return Descend::Skip;
        }

        if node.kind.category() == NodeCategory::Glue {
            return Descend::Children;
        }

        if node.kind.is_scope_defining() {
            self.members.clear();
            if node.span.contains(offset) {
                self.chain.push(ScopeChainItem::for_node(node));
            }
        } else {
            self.members.push(ScopeChainItem::for_node(node));
        }

        Descend::Children
    }

    fn finish(mut self) -> ScopeChain {
        self.chain.append(&mut self.members);
        ScopeChain { items: self.chain }
    }
}

/// Resolve the scope chain at `offset` in the given tree.
pub fn resolve_scope_chain(roots: &[Node], offset: u32) -> ScopeChain {
    let mut builder = ChainBuilder::default();
    walk(roots, |node| builder.visit(node, offset));
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::*;

    fn node(kind: NodeKind, start: u32, end: u32, children: Vec<Node>) -> Node {
        Node::new(kind, Span::new(start, end)).with_children(children)
    }

    fn leaf(kind: NodeKind, start: u32, end: u32) -> Node {
        Node::new(kind, Span::new(start, end))
    }

    fn labels(chain: &ScopeChain) -> Vec<&str> {
        chain.items().iter().map(|i| i.kind.as_str()).collect()
    }

    /// class A {                    0..100
    ///     function b() {           10..90
    ///         if ($x) {            20..80
    ///             echo 1;          30..37
    ///             <cursor 50>
    ///         }
    ///     }
    /// }
    fn nested() -> Vec<Node> {
        vec![node(
            NodeKind::ClassLike(ClassLikeKind::Class),
            0,
            100,
            vec![node(
                NodeKind::FunctionLike(FunctionLikeKind::Method),
                10,
                90,
                vec![node(
                    NodeKind::ControlFlow(ControlFlowKind::If),
                    20,
                    80,
                    vec![
                        leaf(NodeKind::Variable { name: "x".into() }, 24, 26),
                        node(
                            NodeKind::Statement(StatementKind::Echo),
                            30,
                            37,
                            vec![leaf(NodeKind::Expression(ExpressionKind::Literal), 35, 36)],
                        ),
                    ],
                )],
            )],
        )]
    }

    #[test]
    fn chain_is_outermost_first() {
        let chain = resolve_scope_chain(&nested(), 50);
        assert_eq!(
            labels(&chain),
            vec!["ClassDeclaration", "MethodDeclaration", "If"]
        );
        assert_eq!(chain.selector(), "ClassDeclaration.MethodDeclaration.If");
    }

    #[test]
    fn trailing_statement_without_later_expression_is_reported() {
        // Replace the echo's literal child so nothing resets the members.
        let mut roots = nested();
        let method = &mut roots[0].children[0];
        let if_node = &mut method.children[0];
        if_node.children[1].children.clear();

        let chain = resolve_scope_chain(&roots, 50);
        assert_eq!(
            labels(&chain),
            vec!["ClassDeclaration", "MethodDeclaration", "If", "Echo"]
        );
    }

    #[test]
    fn expression_after_statement_resets_members() {
        // The echo's literal child is an expression and clears the echo.
        let chain = resolve_scope_chain(&nested(), 50);
        assert!(!labels(&chain).contains(&"Echo"));
    }

    #[test]
    fn offset_before_first_node_is_empty() {
        let roots = vec![node(
            NodeKind::ClassLike(ClassLikeKind::Class),
            6,
            20,
            vec![],
        )];
        for offset in 0..=6 {
            assert!(resolve_scope_chain(&roots, offset).is_empty());
        }
        assert!(resolve_scope_chain(&[], 3).is_empty());
    }

    #[test]
    fn node_starting_at_offset_is_excluded() {
        let chain = resolve_scope_chain(&nested(), 20);
        assert_eq!(labels(&chain), vec!["ClassDeclaration", "MethodDeclaration"]);
    }

    #[test]
    fn glue_nodes_are_transparent() {
        let roots = vec![node(
            NodeKind::FunctionCall(FunctionCall {
                callee: Box::new(leaf(NodeKind::Identifier { name: "foo".into() }, 0, 3)),
                arguments: vec![node(
                    NodeKind::Glue(GlueKind::Argument),
                    4,
                    12,
                    vec![node(
                        NodeKind::FunctionLike(FunctionLikeKind::Closure),
                        4,
                        12,
                        vec![],
                    )],
                )],
            }),
            0,
            13,
            vec![],
        )];

        let chain = resolve_scope_chain(&roots, 8);
        assert_eq!(labels(&chain), vec!["FunctionCall", "Closure"]);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let roots = nested();
        assert_eq!(resolve_scope_chain(&roots, 50), resolve_scope_chain(&roots, 50));
    }

    #[test]
    fn chain_serializes_as_list_of_kinds() {
        let chain = resolve_scope_chain(&nested(), 50);
        let json = serde_json::to_string(&chain).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"ClassDeclaration"},{"kind":"MethodDeclaration"},{"kind":"If"}]"#
        );
    }
}
