//! Immutable AST node definitions for SMEIL programs.
//!
//! Nodes are produced by an external parser and handed to the core as a
//! [`Module`]. They are immutable after construction; the only "mutation"
//! the core performs is recording derived facts (resolved types, implicit
//! casts) in side tables keyed by [`AstIndex`], never by rewriting a node in
//! place. Expressions and statements are deep-cloneable so that function
//! bodies can be cloned per invocation site.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Identity of an expression or statement node, used to key the
/// `assigned_types` and usage side-tables that the semantic passes populate.
/// Distinct from a scope or instance location: it names a *syntax* node, not
/// an elaborated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstIndex(pub usize);

/// Hands out fresh, unique [`AstIndex`] values while a tree is being built.
/// The real parser owns one of these for the lifetime of a parse; tests and
/// the demo CLI own one per constructed program.
#[derive(Debug, Default)]
pub struct AstIndexer(AtomicUsize);

impl AstIndexer {
    pub fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    /// An indexer whose first handed-out value is `base`, so its range
    /// cannot collide with indices already handed out by another indexer
    /// (used to reindex a function body cloned into a new invocation site).
    pub fn with_base(base: usize) -> Self {
        Self(AtomicUsize::new(base))
    }

    pub fn next(&self) -> AstIndex {
        AstIndex(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// Top-level parse unit: the imports, declarations and entities of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub token: Token,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub token: Token,
    pub path: Vec<Token>,
}

/// A process or network template. Entities are not instances themselves;
/// they are instantiated (possibly many times) by [`Declaration::Instance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Process(ProcessEntity),
    Network(NetworkEntity),
}

impl Entity {
    pub fn name(&self) -> &Token {
        match self {
            Entity::Process(p) => &p.name,
            Entity::Network(n) => &n.name,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Entity::Process(p) => &p.parameters,
            Entity::Network(n) => &n.parameters,
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        match self {
            Entity::Process(p) => &p.declarations,
            Entity::Network(n) => &n.declarations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEntity {
    pub token: Token,
    pub clocked: bool,
    pub name: Token,
    pub parameters: Vec<Parameter>,
    pub declarations: Vec<Declaration>,
    pub statements: Vec<StatementNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkEntity {
    pub token: Token,
    pub name: Token,
    pub parameters: Vec<Parameter>,
    pub declarations: Vec<Declaration>,
}

/// Parameter direction. `Const` formals bind a value that is neither a
/// signal input nor output (e.g. a constant or compile-time literal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub token: Token,
    pub name: Token,
    pub direction: Direction,
    /// `inverse` flips the in/out interpretation of the bound bus's signals
    /// for dependency analysis (§4.H).
    pub inverse: bool,
    pub type_name: Option<TypeName>,
}

/// A reference to a type: an intrinsic spelling, a typedef'd name, or
/// (for `iN`/`uN`) a parametrized width, plus an optional trailing array
/// index used when the parameter or declaration is array-typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    pub token: Token,
    pub name: Token,
}

/// A dotted, possibly array-indexed name: `bus.signal`, `arr[i].field`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct DottedName {
    pub token: Token,
    pub segments: Vec<NameSegment>,
}

impl DottedName {
    pub fn simple(token: Token) -> Self {
        Self {
            token: token.clone(),
            segments: vec![NameSegment { name: token, index: None }],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameSegment {
    pub name: Token,
    pub index: Option<Box<ExpressionNode>>,
}

// ---------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Variable(VariableDecl),
    Constant(ConstantDecl),
    Bus(BusDecl),
    Enum(EnumDecl),
    Function(FunctionDecl),
    Instance(InstanceDecl),
    Generator(GeneratorDecl),
    TypeDef(TypeDefDecl),
    Connect(ConnectDecl),
}

impl Declaration {
    pub fn token(&self) -> &Token {
        match self {
            Declaration::Variable(d) => &d.token,
            Declaration::Constant(d) => &d.token,
            Declaration::Bus(d) => &d.token,
            Declaration::Enum(d) => &d.token,
            Declaration::Function(d) => &d.token,
            Declaration::Instance(d) => &d.token,
            Declaration::Generator(d) => &d.token,
            Declaration::TypeDef(d) => &d.token,
            Declaration::Connect(d) => &d.token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub token: Token,
    pub name: Token,
    pub type_name: Option<TypeName>,
    pub initializer: Option<ExpressionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDecl {
    pub token: Token,
    pub name: Token,
    pub type_name: Option<TypeName>,
    pub initializer: ExpressionNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusSignal {
    pub token: Token,
    pub name: Token,
    pub type_name: TypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusDecl {
    pub token: Token,
    pub name: Token,
    /// Either an explicit signal list or a reference to a named bus shape;
    /// exactly one is populated at parse time. If `typename` is set,
    /// elaboration fills `signals` in from the resolved shape (§3 Lifecycles b).
    pub signals: Vec<BusSignal>,
    pub typename: Option<TypeName>,
    pub exposed: bool,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumField {
    pub token: Token,
    pub name: Token,
    /// Explicit literal value, if the source supplied one (non-negative).
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub token: Token,
    pub name: Token,
    pub fields: Vec<EnumField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub token: Token,
    pub name: Token,
    pub parameters: Vec<Parameter>,
    pub declarations: Vec<Declaration>,
    pub statements: Vec<StatementNode>,
    pub return_type: Option<TypeName>,
}

/// One actual argument bound to a formal, by position (`name: None`) or name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapEntry {
    pub token: Token,
    pub name: Option<Token>,
    pub value: ExpressionNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDecl {
    pub token: Token,
    pub name: Token,
    pub source: Token,
    pub parameter_map: Vec<ParameterMapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorDecl {
    pub token: Token,
    pub name: Token,
    pub from: ExpressionNode,
    pub to: ExpressionNode,
    pub inner: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefDecl {
    pub token: Token,
    pub name: Token,
    pub target: TypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectEntry {
    pub token: Token,
    pub from: DottedName,
    pub to: DottedName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectDecl {
    pub token: Token,
    pub entries: Vec<ConnectEntry>,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StatementNode {
    pub id: AstIndex,
    pub token: Token,
    pub kind: Statement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(AssignmentStatement),
    If(IfStatement),
    For(ForStatement),
    Switch(SwitchStatement),
    Call(CallStatement),
    Trace(TraceStatement),
    Assert(AssertStatement),
    Break,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    pub target: DottedName,
    pub value: ExpressionNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: ExpressionNode,
    pub then_body: Vec<StatementNode>,
    pub elifs: Vec<(ExpressionNode, Vec<StatementNode>)>,
    pub else_body: Option<Vec<StatementNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub variable: Token,
    pub from: ExpressionNode,
    pub to: ExpressionNode,
    pub body: Vec<StatementNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub token: Token,
    pub value: Option<ExpressionNode>,
    pub body: Vec<StatementNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub expression: ExpressionNode,
    /// At least one case; a case with `value: None` is the default arm.
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
    pub name: DottedName,
    pub arguments: Vec<ExpressionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceStatement {
    pub format: Token,
    pub arguments: Vec<ExpressionNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStatement {
    pub condition: ExpressionNode,
    pub message: Option<Token>,
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    pub id: AstIndex,
    pub token: Token,
    pub kind: Box<Expression>,
}

impl ExpressionNode {
    pub fn new(id: AstIndex, token: Token, kind: Expression) -> Self {
        Self { id, token, kind: Box::new(kind) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// The special `U` (undefined) literal.
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Neg,
    Pos,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Eq,
    Ne,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOperator {
    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOperator::Shl | BinaryOperator::Shr)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOperator::Eq | BinaryOperator::Ne)
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::Gt | BinaryOperator::Ge)
    }

    pub fn is_numeric_only(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod
        ) || self.is_comparison()
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOperator::BitAnd | BinaryOperator::BitOr | BinaryOperator::BitXor)
    }

    /// Whether the expression's resulting type is the unified operand type
    /// (arithmetic/bitwise), as opposed to always `Bool`.
    pub fn result_is_operand_type(self) -> bool {
        (self.is_numeric_only() && !self.is_comparison()) || self.is_bitwise()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: ExpressionNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub operator: BinaryOperator,
    pub left: ExpressionNode,
    pub right: ExpressionNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub target_type: TypeName,
    pub source: ExpressionNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(LiteralValue),
    Name(DottedName),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Paren(ExpressionNode),
    Cast(CastExpr),
}

// ---------------------------------------------------------------------
// Generic traversal (component A contract: children + pre/post order)
// ---------------------------------------------------------------------

/// A borrowed reference to any traversable AST node, used by generic
/// visitors (reserved-name scanning, constant-initializer closures, and the
/// type pass's "collect every reachable expression" step).
#[derive(Debug, Clone, Copy)]
pub enum AstRef<'a> {
    Statement(&'a StatementNode),
    Expression(&'a ExpressionNode),
}

impl<'a> AstRef<'a> {
    pub fn token(&self) -> &'a Token {
        match self {
            AstRef::Statement(s) => &s.token,
            AstRef::Expression(e) => &e.token,
        }
    }

    /// Immediate children, in source order.
    pub fn children(&self) -> Vec<AstRef<'a>> {
        match self {
            AstRef::Statement(s) => match &s.kind {
                Statement::Assignment(a) => vec![AstRef::Expression(&a.value)],
                Statement::If(i) => {
                    let mut out = vec![AstRef::Expression(&i.condition)];
                    out.extend(i.then_body.iter().map(AstRef::Statement));
                    for (cond, body) in &i.elifs {
                        out.push(AstRef::Expression(cond));
                        out.extend(body.iter().map(AstRef::Statement));
                    }
                    if let Some(body) = &i.else_body {
                        out.extend(body.iter().map(AstRef::Statement));
                    }
                    out
                }
                Statement::For(f) => {
                    let mut out = vec![AstRef::Expression(&f.from), AstRef::Expression(&f.to)];
                    out.extend(f.body.iter().map(AstRef::Statement));
                    out
                }
                Statement::Switch(sw) => {
                    let mut out = vec![AstRef::Expression(&sw.expression)];
                    for case in &sw.cases {
                        if let Some(value) = &case.value {
                            out.push(AstRef::Expression(value));
                        }
                        out.extend(case.body.iter().map(AstRef::Statement));
                    }
                    out
                }
                Statement::Call(c) => c.arguments.iter().map(AstRef::Expression).collect(),
                Statement::Trace(t) => t.arguments.iter().map(AstRef::Expression).collect(),
                Statement::Assert(a) => vec![AstRef::Expression(&a.condition)],
                Statement::Break => vec![],
            },
            AstRef::Expression(e) => match e.kind.as_ref() {
                Expression::Literal(_) => vec![],
                Expression::Name(name) => name
                    .segments
                    .iter()
                    .filter_map(|segment| segment.index.as_deref())
                    .map(AstRef::Expression)
                    .collect(),
                Expression::Unary(u) => vec![AstRef::Expression(&u.operand)],
                Expression::Binary(b) => vec![AstRef::Expression(&b.left), AstRef::Expression(&b.right)],
                Expression::Paren(inner) => vec![AstRef::Expression(inner)],
                Expression::Cast(c) => vec![AstRef::Expression(&c.source)],
            },
        }
    }
}

/// Depth-first pre-order traversal starting at (and including) `root`.
pub fn preorder<'a>(root: AstRef<'a>) -> Vec<AstRef<'a>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.push(node);
        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }
    out
}

/// Depth-first post-order traversal starting at (and including) `root`.
pub fn postorder<'a>(root: AstRef<'a>) -> Vec<AstRef<'a>> {
    let mut out = preorder(root);
    out.reverse();
    out
}

/// All expressions reachable from a statement list, in source order.
pub fn expressions_in(statements: &[StatementNode]) -> Vec<&ExpressionNode> {
    let mut out = Vec::new();
    for statement in statements {
        for node in preorder(AstRef::Statement(statement)) {
            if let AstRef::Expression(expr) = node {
                out.push(expr);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------
// Reindexing (used to clone a function body per invocation site, §3)
// ---------------------------------------------------------------------

/// Deep-clones `statements`, handing every statement and expression a fresh
/// [`AstIndex`] from `indexer`. Used when a function body is inlined at a
/// call site so implicit-cast bookkeeping for one invocation never leaks
/// into another invocation of the same function.
pub fn reindex_statements(indexer: &AstIndexer, statements: &[StatementNode]) -> Vec<StatementNode> {
    statements.iter().map(|s| reindex_statement(indexer, s)).collect()
}

fn reindex_statement(indexer: &AstIndexer, statement: &StatementNode) -> StatementNode {
    let kind = match &statement.kind {
        Statement::Assignment(a) => Statement::Assignment(AssignmentStatement {
            target: a.target.clone(),
            value: reindex_expression(indexer, &a.value),
        }),
        Statement::If(i) => Statement::If(IfStatement {
            condition: reindex_expression(indexer, &i.condition),
            then_body: reindex_statements(indexer, &i.then_body),
            elifs: i
                .elifs
                .iter()
                .map(|(cond, body)| (reindex_expression(indexer, cond), reindex_statements(indexer, body)))
                .collect(),
            else_body: i.else_body.as_ref().map(|body| reindex_statements(indexer, body)),
        }),
        Statement::For(f) => Statement::For(ForStatement {
            variable: f.variable.clone(),
            from: reindex_expression(indexer, &f.from),
            to: reindex_expression(indexer, &f.to),
            body: reindex_statements(indexer, &f.body),
        }),
        Statement::Switch(sw) => Statement::Switch(SwitchStatement {
            expression: reindex_expression(indexer, &sw.expression),
            cases: sw
                .cases
                .iter()
                .map(|case| SwitchCase {
                    token: case.token.clone(),
                    value: case.value.as_ref().map(|v| reindex_expression(indexer, v)),
                    body: reindex_statements(indexer, &case.body),
                })
                .collect(),
        }),
        Statement::Call(c) => Statement::Call(CallStatement {
            name: c.name.clone(),
            arguments: c.arguments.iter().map(|a| reindex_expression(indexer, a)).collect(),
        }),
        Statement::Trace(t) => Statement::Trace(TraceStatement {
            format: t.format.clone(),
            arguments: t.arguments.iter().map(|a| reindex_expression(indexer, a)).collect(),
        }),
        Statement::Assert(a) => Statement::Assert(AssertStatement {
            condition: reindex_expression(indexer, &a.condition),
            message: a.message.clone(),
        }),
        Statement::Break => Statement::Break,
    };
    StatementNode { id: indexer.next(), token: statement.token.clone(), kind }
}

fn reindex_expression(indexer: &AstIndexer, expr: &ExpressionNode) -> ExpressionNode {
    let kind = match expr.kind.as_ref() {
        Expression::Literal(l) => Expression::Literal(l.clone()),
        Expression::Name(n) => Expression::Name(DottedName {
            token: n.token.clone(),
            segments: n
                .segments
                .iter()
                .map(|segment| NameSegment {
                    name: segment.name.clone(),
                    index: segment.index.as_ref().map(|i| Box::new(reindex_expression(indexer, i))),
                })
                .collect(),
        }),
        Expression::Unary(u) => Expression::Unary(UnaryExpr { operator: u.operator, operand: reindex_expression(indexer, &u.operand) }),
        Expression::Binary(b) => {
            Expression::Binary(BinaryExpr { operator: b.operator, left: reindex_expression(indexer, &b.left), right: reindex_expression(indexer, &b.right) })
        }
        Expression::Paren(inner) => Expression::Paren(reindex_expression(indexer, inner)),
        Expression::Cast(c) => Expression::Cast(CastExpr { target_type: c.target_type.clone(), source: reindex_expression(indexer, &c.source) }),
    };
    ExpressionNode::new(indexer.next(), expr.token.clone(), kind)
}
