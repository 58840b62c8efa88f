//! Owned syntax tree consumed by the query engine.
//!
//! The parser adapter ([`crate::parser`]) lowers the mago AST into this
//! closed set of node kinds so the resolvers can work with a single
//! `match` per node instead of walking the parser's arena types directly.
//! All data is owned, so a tree does not depend on the parser's arena
//! lifetime and can be built by hand in tests.
//!
//! Spans are half-open byte ranges (`[start, end)`).  The engine's
//! containment test is inclusive of the last byte, see [`Span::contains`].

use std::fmt;

// ─── Span ───────────────────────────────────────────────────────────────────

/// A half-open `[start, end)` byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// The inclusive offset of the last byte covered by this span.
    ///
    /// For a one-character node `last() == start`.  Empty spans report
    /// their start.
    pub fn last(&self) -> u32 {
        self.end.saturating_sub(1).max(self.start)
    }

    /// Whether `offset` lies within `start ..= last()`.
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset <= self.last()
    }

    /// The source text covered by this span, if it is in bounds and on
    /// character boundaries.
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start as usize..self.end as usize)
    }
}

impl From<mago_span::Span> for Span {
    fn from(span: mago_span::Span) -> Self {
        Self::new(span.start.offset, span.end.offset)
    }
}

// ─── Classification ─────────────────────────────────────────────────────────

/// Coarse grouping of node kinds used by the scope-chain resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Statement,
    Expression,
    /// Structural nodes such as arguments, parameters and bare names.
    /// They are walked through but never classified.
    Glue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
    Enum,
    AnonymousClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionLikeKind {
    Function,
    Method,
    Closure,
    ArrowFunction,
}

/// Control-flow statements that open a new nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlowKind {
    If,
    Try,
    While,
    DoWhile,
    For,
    Foreach,
    Switch,
}

/// Statements that do not open a nesting level of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Namespace,
    Use,
    ExpressionStatement,
    Return,
    Echo,
    Global,
    Static,
    Unset,
    Declare,
    Break,
    Continue,
    Constant,
    Property,
    ClassConstant,
    TraitUse,
    EnumCase,
    ElseIf,
    Else,
    Catch,
    Finally,
    Case,
    Other,
}

/// Expressions that carry no structured payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    Assignment,
    Binary,
    UnaryPrefix,
    UnaryPostfix,
    Parenthesized,
    Conditional,
    Array,
    List,
    ArrayAccess,
    Match,
    Instantiation,
    Literal,
    Yield,
    Throw,
    Clone,
    Pipe,
    ClassConstantAccess,
    SelfReference,
    StaticReference,
    ParentReference,
    Isset,
    Empty,
    Eval,
    Include,
    Print,
    Exit,
    InterpolatedString,
    ShellExecute,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlueKind {
    Argument,
    Parameter,
    MatchArm,
}

/// The member access operator between a receiver and its member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOperator {
    /// `->`
    Arrow,
    /// `?->`
    NullSafeArrow,
    /// `::`
    DoubleColon,
}

impl AccessOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOperator::Arrow => "->",
            AccessOperator::NullSafeArrow => "?->",
            AccessOperator::DoubleColon => "::",
        }
    }
}

impl fmt::Display for AccessOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Structured payloads ────────────────────────────────────────────────────

/// The member named after an access operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// `$obj->name`
    Identifier { name: String, span: Span },
    /// `$obj->$name`
    Variable(Box<Node>),
    /// `$obj->{expr}`.  `text` is the raw selector including the braces.
    /// There is no name span to anchor on, so locating the end of the
    /// member requires scanning the source.
    Expression { text: String, expression: Box<Node> },
}

impl Member {
    /// The member as written in source, e.g. `name`, `$name`, `{$name}`.
    pub fn text(&self) -> String {
        match self {
            Member::Identifier { name, .. } => name.clone(),
            Member::Variable(node) => match &node.kind {
                NodeKind::Variable { name } => format!("${name}"),
                _ => node.kind.label().to_string(),
            },
            Member::Expression { text, .. } => text.clone(),
        }
    }

    /// The plain identifier, when the member is not dynamic and has been
    /// typed.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Member::Identifier { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    fn child(&self) -> Option<&Node> {
        match self {
            Member::Identifier { .. } => None,
            Member::Variable(node) => Some(node.as_ref()),
            Member::Expression { expression, .. } => Some(expression.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: Box<Node>,
    pub arguments: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub receiver: Box<Node>,
    pub operator: AccessOperator,
    pub member: Member,
    pub arguments: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccess {
    pub receiver: Box<Node>,
    pub operator: AccessOperator,
    pub member: Member,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticPropertyAccess {
    pub class: Box<Node>,
    /// The property name without its `$` sigil.
    pub property: String,
}

// ─── Node ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    ClassLike(ClassLikeKind),
    FunctionLike(FunctionLikeKind),
    ControlFlow(ControlFlowKind),
    Statement(StatementKind),
    FunctionCall(FunctionCall),
    MethodCall(MethodCall),
    PropertyAccess(PropertyAccess),
    StaticPropertyAccess(StaticPropertyAccess),
    /// A variable; `name` excludes the leading `$`.
    Variable { name: String },
    /// A bare name: function names, constants, class references.  Names
    /// are glue, so they never appear in a scope chain.
    Identifier { name: String },
    Expression(ExpressionKind),
    Glue(GlueKind),
}

impl NodeKind {
    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::ClassLike(ClassLikeKind::AnonymousClass) => NodeCategory::Expression,
            NodeKind::FunctionLike(FunctionLikeKind::Closure | FunctionLikeKind::ArrowFunction) => {
                NodeCategory::Expression
            }
            NodeKind::ClassLike(_)
            | NodeKind::FunctionLike(_)
            | NodeKind::ControlFlow(_)
            | NodeKind::Statement(_) => NodeCategory::Statement,
            NodeKind::FunctionCall(_)
            | NodeKind::MethodCall(_)
            | NodeKind::PropertyAccess(_)
            | NodeKind::StaticPropertyAccess(_)
            | NodeKind::Variable { .. }
            | NodeKind::Expression(_) => NodeCategory::Expression,
            // Names are part of the construct that uses them.
            NodeKind::Identifier { .. } | NodeKind::Glue(_) => NodeCategory::Glue,
        }
    }

    /// Whether this kind opens a new nesting level for the scope chain:
    /// class-likes, function-likes, control flow and every expression.
    pub fn is_scope_defining(&self) -> bool {
        match self {
            NodeKind::ClassLike(_) | NodeKind::FunctionLike(_) | NodeKind::ControlFlow(_) => true,
            NodeKind::Statement(_) | NodeKind::Glue(_) => false,
            _ => self.category() == NodeCategory::Expression,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, NodeKind::FunctionCall(_) | NodeKind::MethodCall(_))
    }

    /// Stable label reported in scope chains and selectors.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::ClassLike(kind) => match kind {
                ClassLikeKind::Class => "ClassDeclaration",
                ClassLikeKind::Interface => "InterfaceDeclaration",
                ClassLikeKind::Trait => "TraitDeclaration",
                ClassLikeKind::Enum => "EnumDeclaration",
                ClassLikeKind::AnonymousClass => "AnonymousClass",
            },
            NodeKind::FunctionLike(kind) => match kind {
                FunctionLikeKind::Function => "FunctionDeclaration",
                FunctionLikeKind::Method => "MethodDeclaration",
                FunctionLikeKind::Closure => "Closure",
                FunctionLikeKind::ArrowFunction => "ArrowFunction",
            },
            NodeKind::ControlFlow(kind) => match kind {
                ControlFlowKind::If => "If",
                ControlFlowKind::Try => "Try",
                ControlFlowKind::While => "While",
                ControlFlowKind::DoWhile => "DoWhile",
                ControlFlowKind::For => "For",
                ControlFlowKind::Foreach => "Foreach",
                ControlFlowKind::Switch => "Switch",
            },
            NodeKind::Statement(kind) => match kind {
                StatementKind::Namespace => "Namespace",
                StatementKind::Use => "Use",
                StatementKind::ExpressionStatement => "ExpressionStatement",
                StatementKind::Return => "Return",
                StatementKind::Echo => "Echo",
                StatementKind::Global => "Global",
                StatementKind::Static => "Static",
                StatementKind::Unset => "Unset",
                StatementKind::Declare => "Declare",
                StatementKind::Break => "Break",
                StatementKind::Continue => "Continue",
                StatementKind::Constant => "Constant",
                StatementKind::Property => "Property",
                StatementKind::ClassConstant => "ClassConstant",
                StatementKind::TraitUse => "TraitUse",
                StatementKind::EnumCase => "EnumCase",
                StatementKind::ElseIf => "ElseIf",
                StatementKind::Else => "Else",
                StatementKind::Catch => "Catch",
                StatementKind::Finally => "Finally",
                StatementKind::Case => "Case",
                StatementKind::Other => "Statement",
            },
            NodeKind::FunctionCall(_) => "FunctionCall",
            NodeKind::MethodCall(call) => match call.operator {
                AccessOperator::Arrow => "MethodCall",
                AccessOperator::NullSafeArrow => "NullSafeMethodCall",
                AccessOperator::DoubleColon => "StaticMethodCall",
            },
            NodeKind::PropertyAccess(access) => match access.operator {
                AccessOperator::NullSafeArrow => "NullSafePropertyAccess",
                _ => "PropertyAccess",
            },
            NodeKind::StaticPropertyAccess(_) => "StaticPropertyAccess",
            NodeKind::Variable { .. } => "Variable",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Expression(kind) => match kind {
                ExpressionKind::Assignment => "Assignment",
                ExpressionKind::Binary => "Binary",
                ExpressionKind::UnaryPrefix => "UnaryPrefix",
                ExpressionKind::UnaryPostfix => "UnaryPostfix",
                ExpressionKind::Parenthesized => "Parenthesized",
                ExpressionKind::Conditional => "Conditional",
                ExpressionKind::Array => "Array",
                ExpressionKind::List => "List",
                ExpressionKind::ArrayAccess => "ArrayAccess",
                ExpressionKind::Match => "Match",
                ExpressionKind::Instantiation => "Instantiation",
                ExpressionKind::Literal => "Literal",
                ExpressionKind::Yield => "Yield",
                ExpressionKind::Throw => "Throw",
                ExpressionKind::Clone => "Clone",
                ExpressionKind::Pipe => "Pipe",
                ExpressionKind::ClassConstantAccess => "ClassConstantAccess",
                ExpressionKind::SelfReference => "Self",
                ExpressionKind::StaticReference => "Static",
                ExpressionKind::ParentReference => "Parent",
                ExpressionKind::Isset => "Isset",
                ExpressionKind::Empty => "Empty",
                ExpressionKind::Eval => "Eval",
                ExpressionKind::Include => "Include",
                ExpressionKind::Print => "Print",
                ExpressionKind::Exit => "Exit",
                ExpressionKind::InterpolatedString => "InterpolatedString",
                ExpressionKind::ShellExecute => "ShellExec",
                ExpressionKind::Other => "Expression",
            },
            NodeKind::Glue(kind) => match kind {
                GlueKind::Argument => "Argument",
                GlueKind::Parameter => "Parameter",
                GlueKind::MatchArm => "MatchArm",
            },
        }
    }
}

/// A node of the lowered syntax tree.
///
/// Kinds with a structured payload (calls, accesses) keep their children
/// inside the payload; every other kind stores them in `children`.  Use
/// [`Node::children`] to iterate both uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// All children in source order.
    pub fn children(&self) -> Vec<&Node> {
        let mut out: Vec<&Node> = Vec::new();
        match &self.kind {
            NodeKind::FunctionCall(call) => {
                out.push(call.callee.as_ref());
                out.extend(call.arguments.iter());
            }
            NodeKind::MethodCall(call) => {
                out.push(call.receiver.as_ref());
                out.extend(call.member.child());
                out.extend(call.arguments.iter());
            }
            NodeKind::PropertyAccess(access) => {
                out.push(access.receiver.as_ref());
                out.extend(access.member.child());
            }
            NodeKind::StaticPropertyAccess(access) => out.push(access.class.as_ref()),
            _ => {}
        }
        out.extend(self.children.iter());
        out
    }
}
