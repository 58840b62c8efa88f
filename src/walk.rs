//! Position-pruned, pre-order traversal of the syntax tree.
//!
//! Nodes are visited parent before children, siblings in source order.
//! Before a node's children are visited the caller's decision function
//! runs for the node itself and may exclude the whole subtree.  Because
//! siblings appear in source order, nothing visited after a node that
//! starts past the cursor can enclose the cursor, so pruning on span is
//! all a position query needs.

use crate::syntax::{Node, Span};

/// What to do with the children of the node just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Children,
    Skip,
}

/// Built-in span tests for excluding subtrees relative to an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pruning {
    /// Skip nodes that begin strictly after the offset.
    StartsAfter,
    /// Skip nodes that begin at or after the offset.
    StartsAtOrAfter,
    /// Skip nodes whose span does not contain the offset.
    Disjoint,
}

impl Pruning {
    pub fn skips(self, span: Span, offset: u32) -> bool {
        match self {
            Pruning::StartsAfter => span.start > offset,
            Pruning::StartsAtOrAfter => span.start >= offset,
            Pruning::Disjoint => !span.contains(offset),
        }
    }

    pub fn decide(self, span: Span, offset: u32) -> Descend {
        if self.skips(span, offset) {
            Descend::Skip
        } else {
            Descend::Children
        }
    }
}

/// Walk `roots` depth-first in pre-order, calling `visit` on every node
/// that is reached.
///
/// The walk uses an explicit stack, so deeply nested sources cannot
/// overflow the call stack.
pub fn walk<'t, F>(roots: &'t [Node], mut visit: F)
where
    F: FnMut(&'t Node) -> Descend,
{
    let mut stack: Vec<&'t Node> = roots.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if visit(node) == Descend::Skip {
            continue;
        }
        stack.extend(node.children().into_iter().rev());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{ExpressionKind, NodeKind, StatementKind};

    fn stmt(start: u32, end: u32, children: Vec<Node>) -> Node {
        Node::new(NodeKind::Statement(StatementKind::Other), Span::new(start, end))
            .with_children(children)
    }

    fn expr(start: u32, end: u32) -> Node {
        Node::new(NodeKind::Expression(ExpressionKind::Literal), Span::new(start, end))
    }

    fn tree() -> Vec<Node> {
        vec![
            stmt(0, 10, vec![expr(1, 3), expr(4, 9)]),
            stmt(11, 20, vec![expr(12, 14)]),
        ]
    }

    #[test]
    fn visits_in_pre_order() {
        let roots = tree();
        let mut seen = Vec::new();
        walk(&roots, |node| {
            seen.push(node.span.start);
            Descend::Children
        });
        assert_eq!(seen, vec![0, 1, 4, 11, 12]);
    }

    #[test]
    fn skipped_nodes_hide_their_children() {
        let roots = tree();
        let mut seen = Vec::new();
        walk(&roots, |node| {
            seen.push(node.span.start);
            Pruning::Disjoint.decide(node.span, 5)
        });
        // The second statement is visited but its child is not.
        assert_eq!(seen, vec![0, 1, 4, 11]);
    }

    #[test]
    fn pruning_policies_differ_at_the_start_boundary() {
        let span = Span::new(5, 8);
        assert!(!Pruning::StartsAfter.skips(span, 5));
        assert!(Pruning::StartsAtOrAfter.skips(span, 5));
        assert!(!Pruning::Disjoint.skips(span, 5));
        assert!(Pruning::StartsAfter.skips(span, 4));
        assert!(Pruning::Disjoint.skips(span, 4));
        assert!(Pruning::Disjoint.skips(span, 8));
        assert!(!Pruning::StartsAfter.skips(span, 8));
    }

    #[test]
    fn empty_tree_visits_nothing() {
        let mut visited = 0;
        walk(&[], |_| {
            visited += 1;
            Descend::Children
        });
        assert_eq!(visited, 0);
    }
}
