/// Lowering of statements, class-like members and parameters.
///
/// Brace-delimited bodies and nested blocks are flattened into the owning
/// node's children, so a method's statements are direct children of the
/// method node.  Else-if, else, catch, finally and switch cases keep a
/// clause node of their own.
use mago_span::HasSpan;
use mago_syntax::ast::*;

use super::expressions::lower_expression;
use crate::syntax::{
    ClassLikeKind, ControlFlowKind, FunctionLikeKind, GlueKind, Node, NodeKind, Span,
    StatementKind,
};

fn span_of(node: &impl HasSpan) -> Span {
    node.span().into()
}

/// Lower a sequence of statements, appending the produced nodes to `out`.
pub(super) fn lower_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    source: &str,
    out: &mut Vec<Node>,
) {
    for statement in statements {
        lower_statement(statement, source, out);
    }
}

fn statement_node(kind: StatementKind, span: Span, children: Vec<Node>) -> Node {
    Node::new(NodeKind::Statement(kind), span).with_children(children)
}

fn control_flow_node(kind: ControlFlowKind, span: Span, children: Vec<Node>) -> Node {
    Node::new(NodeKind::ControlFlow(kind), span).with_children(children)
}

/// Lower one statement.  Blocks push their statements directly; tags and
/// empty statements push nothing.
pub(super) fn lower_statement<'a>(statement: &'a Statement<'a>, source: &str, out: &mut Vec<Node>) {
    let span = span_of(statement);

    match statement {
        Statement::OpeningTag(_) | Statement::ClosingTag(_) | Statement::Noop(_) => {}
        Statement::Block(block) => lower_statements(block.statements.iter(), source, out),
        Statement::Namespace(namespace) => {
            let mut children = Vec::new();
            lower_statements(namespace.statements().iter(), source, &mut children);
            out.push(statement_node(StatementKind::Namespace, span, children));
        }
        Statement::Class(class) => {
            out.push(class_like(ClassLikeKind::Class, span, class.members.iter(), source));
        }
        Statement::Interface(iface) => {
            out.push(class_like(ClassLikeKind::Interface, span, iface.members.iter(), source));
        }
        Statement::Trait(trait_def) => {
            out.push(class_like(ClassLikeKind::Trait, span, trait_def.members.iter(), source));
        }
        Statement::Enum(enum_def) => {
            out.push(class_like(ClassLikeKind::Enum, span, enum_def.members.iter(), source));
        }
        Statement::Function(func) => {
            let mut children = lower_parameters(&func.parameter_list, source);
            lower_statements(func.body.statements.iter(), source, &mut children);
            out.push(
                Node::new(NodeKind::FunctionLike(FunctionLikeKind::Function), span)
                    .with_children(children),
            );
        }
        Statement::If(if_stmt) => out.push(lower_if(if_stmt, span, source)),
        Statement::Try(try_stmt) => {
            let mut children = Vec::new();
            lower_statements(try_stmt.block.statements.iter(), source, &mut children);
            for catch in try_stmt.catch_clauses.iter() {
                let mut body = Vec::new();
                lower_statements(catch.block.statements.iter(), source, &mut body);
                children.push(statement_node(StatementKind::Catch, span_of(catch), body));
            }
            if let Some(finally) = &try_stmt.finally_clause {
                let mut body = Vec::new();
                lower_statements(finally.block.statements.iter(), source, &mut body);
                children.push(statement_node(StatementKind::Finally, span_of(finally), body));
            }
            out.push(control_flow_node(ControlFlowKind::Try, span, children));
        }
        Statement::While(while_stmt) => {
            let mut children = vec![lower_expression(while_stmt.condition, source)];
            match &while_stmt.body {
                WhileBody::Statement(inner) => lower_statement(inner, source, &mut children),
                WhileBody::ColonDelimited(body) => {
                    lower_statements(body.statements.iter(), source, &mut children)
                }
            }
            out.push(control_flow_node(ControlFlowKind::While, span, children));
        }
        Statement::DoWhile(dw) => {
            let mut children = Vec::new();
            lower_statement(dw.statement, source, &mut children);
            children.push(lower_expression(dw.condition, source));
            out.push(control_flow_node(ControlFlowKind::DoWhile, span, children));
        }
        Statement::For(for_stmt) => {
            let mut children: Vec<Node> = for_stmt
                .initializations
                .iter()
                .chain(for_stmt.conditions.iter())
                .chain(for_stmt.increments.iter())
                .map(|expr| lower_expression(expr, source))
                .collect();
            match &for_stmt.body {
                ForBody::Statement(inner) => lower_statement(inner, source, &mut children),
                ForBody::ColonDelimited(body) => {
                    lower_statements(body.statements.iter(), source, &mut children)
                }
            }
            out.push(control_flow_node(ControlFlowKind::For, span, children));
        }
        Statement::Foreach(foreach) => {
            let mut children = vec![lower_expression(foreach.expression, source)];
            if let Some(key) = foreach.target.key() {
                children.push(lower_expression(key, source));
            }
            children.push(lower_expression(foreach.target.value(), source));
            for inner in foreach.body.statements() {
                lower_statement(inner, source, &mut children);
            }
            out.push(control_flow_node(ControlFlowKind::Foreach, span, children));
        }
        Statement::Switch(switch) => {
            let mut children = vec![lower_expression(switch.expression, source)];
            let cases = match &switch.body {
                SwitchBody::BraceDelimited(body) => body.cases.iter(),
                SwitchBody::ColonDelimited(body) => body.cases.iter(),
            };
            for case in cases {
                let mut body = Vec::new();
                if let SwitchCase::Expression(expression_case) = case {
                    body.push(lower_expression(expression_case.expression, source));
                }
                lower_statements(case.statements().iter(), source, &mut body);
                children.push(statement_node(StatementKind::Case, span_of(case), body));
            }
            out.push(control_flow_node(ControlFlowKind::Switch, span, children));
        }
        Statement::Expression(expr_stmt) => out.push(statement_node(
            StatementKind::ExpressionStatement,
            span,
            vec![lower_expression(expr_stmt.expression, source)],
        )),
        Statement::Return(ret) => {
            let children = ret
                .value
                .map(|value| vec![lower_expression(value, source)])
                .unwrap_or_default();
            out.push(statement_node(StatementKind::Return, span, children));
        }
        Statement::Echo(echo) => {
            let children = echo
                .values
                .iter()
                .map(|value| lower_expression(value, source))
                .collect();
            out.push(statement_node(StatementKind::Echo, span, children));
        }
        // `<?= ... ?>`
        Statement::EchoTag(echo) => {
            let children = echo
                .values
                .iter()
                .map(|value| lower_expression(value, source))
                .collect();
            out.push(statement_node(StatementKind::Echo, span, children));
        }
        Statement::Unset(unset) => {
            let children = unset
                .values
                .iter()
                .map(|value| lower_expression(value, source))
                .collect();
            out.push(statement_node(StatementKind::Unset, span, children));
        }
        Statement::Declare(declare) => {
            let mut children: Vec<Node> = declare
                .items
                .iter()
                .map(|item| lower_expression(item.value, source))
                .collect();
            match &declare.body {
                DeclareBody::Statement(inner) => lower_statement(inner, source, &mut children),
                DeclareBody::ColonDelimited(body) => {
                    lower_statements(body.statements.iter(), source, &mut children)
                }
            }
            out.push(statement_node(StatementKind::Declare, span, children));
        }
        Statement::Static(static_stmt) => {
            let children = static_stmt
                .items
                .iter()
                .filter_map(|item| item.value())
                .map(|value| lower_expression(value, source))
                .collect();
            out.push(statement_node(StatementKind::Static, span, children));
        }
        Statement::Global(global) => {
            let children = global
                .variables
                .iter()
                .map(|variable| super::expressions::lower_variable(variable, source))
                .collect();
            out.push(statement_node(StatementKind::Global, span, children));
        }
        Statement::Use(_) => out.push(statement_node(StatementKind::Use, span, vec![])),
        Statement::Constant(_) => out.push(statement_node(StatementKind::Constant, span, vec![])),
        Statement::Break(_) => out.push(statement_node(StatementKind::Break, span, vec![])),
        Statement::Continue(_) => out.push(statement_node(StatementKind::Continue, span, vec![])),
        _ => out.push(statement_node(StatementKind::Other, span, vec![])),
    }
}

fn lower_if<'a>(if_stmt: &'a If<'a>, span: Span, source: &str) -> Node {
    let mut children = vec![lower_expression(if_stmt.condition, source)];

    match &if_stmt.body {
        IfBody::Statement(body) => {
            lower_statement(body.statement, source, &mut children);
            for else_if in body.else_if_clauses.iter() {
                let mut clause = vec![lower_expression(else_if.condition, source)];
                lower_statement(else_if.statement, source, &mut clause);
                children.push(statement_node(StatementKind::ElseIf, span_of(else_if), clause));
            }
            if let Some(else_clause) = &body.else_clause {
                let mut clause = Vec::new();
                lower_statement(else_clause.statement, source, &mut clause);
                children.push(statement_node(StatementKind::Else, span_of(else_clause), clause));
            }
        }
        IfBody::ColonDelimited(body) => {
            lower_statements(body.statements.iter(), source, &mut children);
            for else_if in body.else_if_clauses.iter() {
                let mut clause = vec![lower_expression(else_if.condition, source)];
                lower_statements(else_if.statements.iter(), source, &mut clause);
                children.push(statement_node(StatementKind::ElseIf, span_of(else_if), clause));
            }
            if let Some(else_clause) = &body.else_clause {
                let mut clause = Vec::new();
                lower_statements(else_clause.statements.iter(), source, &mut clause);
                children.push(statement_node(StatementKind::Else, span_of(else_clause), clause));
            }
        }
    }

    control_flow_node(ControlFlowKind::If, span, children)
}

// ─── Class-likes ────────────────────────────────────────────────────────────

/// Build a class-like node from its members.  Shared by named declarations
/// and anonymous classes.
pub(super) fn class_like<'a>(
    kind: ClassLikeKind,
    span: Span,
    members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
    source: &str,
) -> Node {
    let children = members.map(|member| lower_member(member, source)).collect();
    Node::new(NodeKind::ClassLike(kind), span).with_children(children)
}

fn lower_member<'a>(member: &'a ClassLikeMember<'a>, source: &str) -> Node {
    let span = span_of(member);
    match member {
        ClassLikeMember::Method(method) => {
            let mut children = lower_parameters(&method.parameter_list, source);
            if let MethodBody::Concrete(block) = &method.body {
                lower_statements(block.statements.iter(), source, &mut children);
            }
            Node::new(NodeKind::FunctionLike(FunctionLikeKind::Method), span)
                .with_children(children)
        }
        ClassLikeMember::Property(_) => statement_node(StatementKind::Property, span, vec![]),
        ClassLikeMember::Constant(_) => statement_node(StatementKind::ClassConstant, span, vec![]),
        ClassLikeMember::TraitUse(_) => statement_node(StatementKind::TraitUse, span, vec![]),
        ClassLikeMember::EnumCase(_) => statement_node(StatementKind::EnumCase, span, vec![]),
    }
}

// ─── Parameters ─────────────────────────────────────────────────────────────

/// One glue node per parameter, holding the default value expression if
/// there is one.
pub(super) fn lower_parameters(list: &FunctionLikeParameterList<'_>, source: &str) -> Vec<Node> {
    list.parameters
        .iter()
        .map(|param| {
            let children = param
                .default_value
                .as_ref()
                .map(|default| vec![lower_expression(&default.value, source)])
                .unwrap_or_default();
            Node::new(NodeKind::Glue(GlueKind::Parameter), span_of(param)).with_children(children)
        })
        .collect()
}
