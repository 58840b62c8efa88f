/// Lowering of expressions.
///
/// Calls and member accesses become structured payloads so the resolvers
/// can read receivers, member names and arguments without re-inspecting
/// source text.  Everything else becomes a generic expression node whose
/// children are its sub-expressions in source order.
use mago_span::HasSpan;
use mago_syntax::ast::*;

use super::statements::{class_like, lower_parameters, lower_statements};
use crate::syntax::{
    AccessOperator, ClassLikeKind, ExpressionKind, FunctionCall, FunctionLikeKind, GlueKind,
    Member, MethodCall, Node, NodeKind, PropertyAccess, Span, StaticPropertyAccess,
};

fn expression_node(kind: ExpressionKind, span: Span, children: Vec<Node>) -> Node {
    Node::new(NodeKind::Expression(kind), span).with_children(children)
}

pub(super) fn lower_expression<'a>(expr: &'a Expression<'a>, source: &str) -> Node {
    let span: Span = expr.span().into();
    let lower = |inner: &Expression<'_>| lower_expression(inner, source);

    match expr {
        Expression::Call(call) => lower_call(call, span, source),
        Expression::Access(access) => lower_access(access, span, source),
        Expression::Variable(variable) => lower_variable(variable, source),
        Expression::Identifier(ident) => Node::new(
            NodeKind::Identifier {
                name: ident.value().to_string(),
            },
            span,
        ),
        Expression::Assignment(a) => {
            expression_node(ExpressionKind::Assignment, span, vec![lower(a.lhs), lower(a.rhs)])
        }
        Expression::Binary(bin) => {
            expression_node(ExpressionKind::Binary, span, vec![lower(bin.lhs), lower(bin.rhs)])
        }
        Expression::UnaryPrefix(u) => {
            expression_node(ExpressionKind::UnaryPrefix, span, vec![lower(u.operand)])
        }
        Expression::UnaryPostfix(u) => {
            expression_node(ExpressionKind::UnaryPostfix, span, vec![lower(u.operand)])
        }
        Expression::Parenthesized(p) => {
            expression_node(ExpressionKind::Parenthesized, span, vec![lower(p.expression)])
        }
        Expression::Conditional(cond) => {
            let mut children = vec![lower(cond.condition)];
            children.extend(cond.then.map(lower));
            children.push(lower(cond.r#else));
            expression_node(ExpressionKind::Conditional, span, children)
        }
        Expression::Array(arr) => expression_node(
            ExpressionKind::Array,
            span,
            lower_array_elements(arr.elements.iter(), source),
        ),
        Expression::LegacyArray(arr) => expression_node(
            ExpressionKind::Array,
            span,
            lower_array_elements(arr.elements.iter(), source),
        ),
        Expression::List(list) => expression_node(
            ExpressionKind::List,
            span,
            lower_array_elements(list.elements.iter(), source),
        ),
        Expression::ArrayAccess(array_access) => expression_node(
            ExpressionKind::ArrayAccess,
            span,
            vec![lower(array_access.array), lower(array_access.index)],
        ),
        Expression::Match(m) => {
            let mut children = vec![lower(m.expression)];
            for arm in m.arms.iter() {
                let mut arm_children = Vec::new();
                if let MatchArm::Expression(expr_arm) = arm {
                    arm_children.extend(
                        expr_arm
                            .conditions
                            .iter()
                            .map(|condition| lower_expression(condition, source)),
                    );
                }
                arm_children.push(lower(arm.expression()));
                children.push(
                    Node::new(NodeKind::Glue(GlueKind::MatchArm), arm.span().into())
                        .with_children(arm_children),
                );
            }
            expression_node(ExpressionKind::Match, span, children)
        }
        Expression::Instantiation(inst) => {
            let mut children = vec![lower(inst.class)];
            if let Some(ref args) = inst.argument_list {
                children.extend(lower_arguments(args.arguments.iter(), source));
            }
            expression_node(ExpressionKind::Instantiation, span, children)
        }
        Expression::AnonymousClass(anon) => {
            let mut node = class_like(
                ClassLikeKind::AnonymousClass,
                span,
                anon.members.iter(),
                source,
            );
            if let Some(ref args) = anon.argument_list {
                let mut children = lower_arguments(args.arguments.iter(), source);
                children.append(&mut node.children);
                node.children = children;
            }
            node
        }
        Expression::Closure(closure) => {
            let mut children = lower_parameters(&closure.parameter_list, source);
            lower_statements(closure.body.statements.iter(), source, &mut children);
            Node::new(NodeKind::FunctionLike(FunctionLikeKind::Closure), span)
                .with_children(children)
        }
        Expression::ArrowFunction(arrow) => {
            let mut children = lower_parameters(&arrow.parameter_list, source);
            children.push(lower(arrow.expression));
            Node::new(NodeKind::FunctionLike(FunctionLikeKind::ArrowFunction), span)
                .with_children(children)
        }
        Expression::Yield(y) => {
            let children = match y {
                Yield::Value(yv) => yv.value.map(lower).into_iter().collect(),
                Yield::Pair(yp) => vec![lower(yp.key), lower(yp.value)],
                Yield::From(yf) => vec![lower(yf.iterator)],
            };
            expression_node(ExpressionKind::Yield, span, children)
        }
        Expression::Throw(t) => expression_node(ExpressionKind::Throw, span, vec![lower(t.exception)]),
        Expression::Clone(c) => expression_node(ExpressionKind::Clone, span, vec![lower(c.object)]),
        Expression::Pipe(p) => {
            expression_node(ExpressionKind::Pipe, span, vec![lower(p.input), lower(p.callable)])
        }
        Expression::Construct(construct) => lower_construct(construct, span, source),
        Expression::CompositeString(string) => {
            let parts = match string {
                CompositeString::ShellExecute(s) => s.parts.iter(),
                CompositeString::Interpolated(s) => s.parts.iter(),
                CompositeString::Document(s) => s.parts.iter(),
            };
            let children = parts
                .filter_map(|part| match part {
                    StringPart::Literal(_) => None,
                    StringPart::Expression(inner) => Some(lower_expression(inner, source)),
                    StringPart::BracedExpression(braced) => {
                        Some(lower_expression(braced.expression, source))
                    }
                })
                .collect();
            let kind = match string {
                CompositeString::ShellExecute(_) => ExpressionKind::ShellExecute,
                _ => ExpressionKind::InterpolatedString,
            };
            expression_node(kind, span, children)
        }
        // `$a[] = ...` has no index; keep the array operand.
        Expression::ArrayAppend(append) => {
            expression_node(ExpressionKind::ArrayAccess, span, vec![lower(append.array)])
        }
        Expression::PartialApplication(partial) => lower_partial_application(partial, span, source),
        Expression::Literal(_) => expression_node(ExpressionKind::Literal, span, vec![]),
        Expression::Self_(_) => expression_node(ExpressionKind::SelfReference, span, vec![]),
        Expression::Static(_) => expression_node(ExpressionKind::StaticReference, span, vec![]),
        Expression::Parent(_) => expression_node(ExpressionKind::ParentReference, span, vec![]),
        _ => expression_node(ExpressionKind::Other, span, vec![]),
    }
}

fn lower_array_elements<'a>(
    elements: impl Iterator<Item = &'a ArrayElement<'a>>,
    source: &str,
) -> Vec<Node> {
    let mut children = Vec::new();
    for element in elements {
        match element {
            ArrayElement::KeyValue(kv) => {
                children.push(lower_expression(kv.key, source));
                children.push(lower_expression(kv.value, source));
            }
            ArrayElement::Value(v) => children.push(lower_expression(v.value, source)),
            ArrayElement::Variadic(v) => children.push(lower_expression(v.value, source)),
            ArrayElement::Missing(_) => {}
        }
    }
    children
}

/// `isset`, `empty`, `eval`, `include`/`require`, `print` and `exit`/`die`.
/// Their operands are lowered like call arguments would be, but the
/// constructs themselves are not invocations.
fn lower_construct<'a>(construct: &'a Construct<'a>, span: Span, source: &str) -> Node {
    let single = |kind, value: &'a Expression<'a>| {
        expression_node(kind, span, vec![lower_expression(value, source)])
    };

    match construct {
        Construct::Isset(isset) => expression_node(
            ExpressionKind::Isset,
            span,
            isset
                .values
                .iter()
                .map(|value| lower_expression(value, source))
                .collect(),
        ),
        Construct::Empty(c) => single(ExpressionKind::Empty, c.value),
        Construct::Eval(c) => single(ExpressionKind::Eval, c.value),
        Construct::Include(c) => single(ExpressionKind::Include, c.value),
        Construct::IncludeOnce(c) => single(ExpressionKind::Include, c.value),
        Construct::Require(c) => single(ExpressionKind::Include, c.value),
        Construct::RequireOnce(c) => single(ExpressionKind::Include, c.value),
        Construct::Print(c) => single(ExpressionKind::Print, c.value),
        Construct::Exit(ExitConstruct { arguments, .. })
        | Construct::Die(DieConstruct { arguments, .. }) => {
            let children = arguments
                .as_ref()
                .map(|args| lower_arguments(args.arguments.iter(), source))
                .unwrap_or_default();
            expression_node(ExpressionKind::Exit, span, children)
        }
    }
}

// ─── Calls and member access ────────────────────────────────────────────────

fn lower_call<'a>(call: &'a Call<'a>, span: Span, source: &str) -> Node {
    let kind = match call {
        Call::Function(fc) => NodeKind::FunctionCall(FunctionCall {
            callee: Box::new(lower_expression(fc.function, source)),
            arguments: lower_arguments(fc.argument_list.arguments.iter(), source),
        }),
        Call::Method(mc) => NodeKind::MethodCall(MethodCall {
            receiver: Box::new(lower_expression(mc.object, source)),
            operator: AccessOperator::Arrow,
            member: lower_selector(&mc.method, source),
            arguments: lower_arguments(mc.argument_list.arguments.iter(), source),
        }),
        Call::NullSafeMethod(mc) => NodeKind::MethodCall(MethodCall {
            receiver: Box::new(lower_expression(mc.object, source)),
            operator: AccessOperator::NullSafeArrow,
            member: lower_selector(&mc.method, source),
            arguments: lower_arguments(mc.argument_list.arguments.iter(), source),
        }),
        Call::StaticMethod(sc) => NodeKind::MethodCall(MethodCall {
            receiver: Box::new(lower_expression(sc.class, source)),
            operator: AccessOperator::DoubleColon,
            member: lower_selector(&sc.method, source),
            arguments: lower_arguments(sc.argument_list.arguments.iter(), source),
        }),
    };
    Node::new(kind, span)
}

/// First-class callables and partial applications (`foo(...)`,
/// `$obj->bar(?, 2)`) are calls whose placeholders lower to empty
/// arguments.
fn lower_partial_application<'a>(
    partial: &'a PartialApplication<'a>,
    span: Span,
    source: &str,
) -> Node {
    let kind = match partial {
        PartialApplication::Function(fp) => NodeKind::FunctionCall(FunctionCall {
            callee: Box::new(lower_expression(fp.function, source)),
            arguments: lower_partial_arguments(&fp.argument_list, source),
        }),
        PartialApplication::Method(mp) => NodeKind::MethodCall(MethodCall {
            receiver: Box::new(lower_expression(mp.object, source)),
            operator: AccessOperator::Arrow,
            member: lower_selector(&mp.method, source),
            arguments: lower_partial_arguments(&mp.argument_list, source),
        }),
        PartialApplication::StaticMethod(sp) => NodeKind::MethodCall(MethodCall {
            receiver: Box::new(lower_expression(sp.class, source)),
            operator: AccessOperator::DoubleColon,
            member: lower_selector(&sp.method, source),
            arguments: lower_partial_arguments(&sp.argument_list, source),
        }),
    };
    Node::new(kind, span)
}

fn lower_access<'a>(access: &'a Access<'a>, span: Span, source: &str) -> Node {
    match access {
        Access::Property(pa) => Node::new(
            NodeKind::PropertyAccess(PropertyAccess {
                receiver: Box::new(lower_expression(pa.object, source)),
                operator: AccessOperator::Arrow,
                member: lower_selector(&pa.property, source),
            }),
            span,
        ),
        Access::NullSafeProperty(pa) => Node::new(
            NodeKind::PropertyAccess(PropertyAccess {
                receiver: Box::new(lower_expression(pa.object, source)),
                operator: AccessOperator::NullSafeArrow,
                member: lower_selector(&pa.property, source),
            }),
            span,
        ),
        Access::StaticProperty(pa) => {
            let property = match lower_variable(&pa.property, source).kind {
                NodeKind::Variable { name } => name,
                _ => String::new(),
            };
            Node::new(
                NodeKind::StaticPropertyAccess(StaticPropertyAccess {
                    class: Box::new(lower_expression(pa.class, source)),
                    property,
                }),
                span,
            )
        }
        Access::ClassConstant(pa) => expression_node(
            ExpressionKind::ClassConstantAccess,
            span,
            vec![lower_expression(pa.class, source)],
        ),
    }
}

fn lower_selector<'a>(selector: &'a ClassLikeMemberSelector<'a>, source: &str) -> Member {
    match selector {
        ClassLikeMemberSelector::Identifier(ident) => Member::Identifier {
            name: ident.value.to_string(),
            span: ident.span().into(),
        },
        ClassLikeMemberSelector::Variable(variable) => {
            Member::Variable(Box::new(lower_variable(variable, source)))
        }
        ClassLikeMemberSelector::Expression(sel) => {
            let span: Span = sel.span().into();
            Member::Expression {
                text: span.text(source).unwrap_or_default().to_string(),
                expression: Box::new(lower_expression(sel.expression, source)),
            }
        }
        // `$obj->` with nothing typed yet: an unnamed member at the point
        // where the name would start.
        ClassLikeMemberSelector::Missing(missing) => Member::Identifier {
            name: String::new(),
            span: (*missing).into(),
        },
    }
}

/// Lower a variable.  Direct variables keep their name; `$$name` and
/// `${expr}` forms are named after their source text.
pub(super) fn lower_variable<'a>(variable: &'a Variable<'a>, source: &str) -> Node {
    let span: Span = variable.span().into();
    let name = match variable {
        Variable::Direct(dv) => dv.name.to_string(),
        _ => span.text(source).unwrap_or_default().to_string(),
    };
    Node::new(
        NodeKind::Variable {
            name: name.strip_prefix('$').unwrap_or(&name).to_string(),
        },
        span,
    )
}

fn lower_arguments<'a>(
    arguments: impl Iterator<Item = &'a Argument<'a>>,
    source: &str,
) -> Vec<Node> {
    arguments
        .map(|arg| {
            let value = match arg {
                Argument::Positional(pos) => pos.value,
                Argument::Named(named) => named.value,
            };
            Node::new(NodeKind::Glue(GlueKind::Argument), arg.span().into())
                .with_children(vec![lower_expression(value, source)])
        })
        .collect()
}

fn lower_partial_arguments(list: &PartialArgumentList<'_>, source: &str) -> Vec<Node> {
    list.arguments
        .iter()
        .map(|arg| {
            let children = match arg {
                PartialArgument::Positional(pos) => vec![lower_expression(pos.value, source)],
                PartialArgument::Named(named) => vec![lower_expression(named.value, source)],
                PartialArgument::NamedPlaceholder(_)
                | PartialArgument::Placeholder(_)
                | PartialArgument::VariadicPlaceholder(_) => Vec::new(),
            };
            Node::new(NodeKind::Glue(GlueKind::Argument), arg.span().into()).with_children(children)
        })
        .collect()
}
