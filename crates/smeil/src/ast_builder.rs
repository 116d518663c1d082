//! Programmatic [`ast::Module`] construction.
//!
//! The real parser is an external collaborator this crate does not
//! implement. Tests and the demo command line still need *some* way to
//! produce a `Module`, so this builder assigns each token a synthetic
//! location (an incrementing line, column zero) in the order its method is
//! called. It never parses text.

use std::sync::Arc;

use crate::{
    ast::{
        AssignmentStatement, AstIndexer, BinaryExpr, BinaryOperator, BusDecl, BusSignal, CallStatement, ConnectDecl,
        ConnectEntry, Declaration, Direction, DottedName, Entity, Expression, ExpressionNode, IfStatement, LiteralValue,
        Module, NameSegment, NetworkEntity, Parameter, ParameterMapEntry, ProcessEntity, Statement, StatementNode,
        TypeName,
    },
    file::SourceFile,
    token::Token,
};

pub struct AstBuilder {
    file: Arc<SourceFile>,
    indexer: AstIndexer,
    line: usize,
}

impl AstBuilder {
    pub fn new(path: Vec<String>, code: impl Into<String>) -> Self {
        Self { file: Arc::new(SourceFile::new(path, code.into())), indexer: AstIndexer::new(), line: 1 }
    }

    /// A fresh token at the next synthetic source line; `text` need not
    /// appear anywhere in the builder's source text.
    pub fn token(&mut self, text: &str) -> Token {
        let line = self.line;
        self.line += 1;
        Token::new(text.to_string(), line, 0, 0, self.file.clone())
    }

    pub fn dotted(&mut self, text: &str) -> DottedName {
        let mut segments = Vec::new();
        for part in text.split('.') {
            segments.push(NameSegment { name: self.token(part), index: None });
        }
        DottedName { token: self.token(text), segments }
    }

    pub fn type_name(&mut self, text: &str) -> TypeName {
        TypeName { token: self.token(text), name: self.token(text) }
    }

    pub fn parameter(&mut self, name: &str, direction: Direction, type_name: Option<&str>) -> Parameter {
        self.parameter_with_inverse(name, direction, type_name, false)
    }

    /// Like [`Self::parameter`], but with an explicit `inverse` flag — flips
    /// which side of the connection this formal treats as the producer.
    pub fn parameter_with_inverse(&mut self, name: &str, direction: Direction, type_name: Option<&str>, inverse: bool) -> Parameter {
        Parameter {
            token: self.token(name),
            name: self.token(name),
            direction,
            inverse,
            type_name: type_name.map(|t| self.type_name(t)),
        }
    }

    pub fn constant(&mut self, name: &str, type_name: Option<&str>, initializer: ExpressionNode) -> Declaration {
        Declaration::Constant(crate::ast::ConstantDecl {
            token: self.token(name),
            name: self.token(name),
            type_name: type_name.map(|t| self.type_name(t)),
            initializer,
        })
    }

    pub fn variable(&mut self, name: &str, type_name: Option<&str>, initializer: Option<ExpressionNode>) -> Declaration {
        Declaration::Variable(crate::ast::VariableDecl {
            token: self.token(name),
            name: self.token(name),
            type_name: type_name.map(|t| self.type_name(t)),
            initializer,
        })
    }

    pub fn bus_signal(&mut self, name: &str, type_name: &str) -> BusSignal {
        BusSignal { token: self.token(name), name: self.token(name), type_name: self.type_name(type_name) }
    }

    pub fn bus(&mut self, name: &str, signals: Vec<BusSignal>, exposed: bool) -> BusDecl {
        BusDecl { token: self.token(name), name: self.token(name), signals, typename: None, exposed, unique: false }
    }

    /// A bus declared by reference to an already-declared bus's shape,
    /// e.g. `bus inbus: tdata;`.
    pub fn bus_typed(&mut self, name: &str, shape_name: &str, exposed: bool) -> BusDecl {
        BusDecl {
            token: self.token(name),
            name: self.token(name),
            signals: Vec::new(),
            typename: Some(self.type_name(shape_name)),
            exposed,
            unique: false,
        }
    }

    pub fn int(&mut self, value: i64) -> ExpressionNode {
        ExpressionNode::new(self.indexer.next(), self.token(&value.to_string()), Expression::Literal(LiteralValue::Int(value)))
    }

    pub fn name_expr(&mut self, text: &str) -> ExpressionNode {
        let dotted = self.dotted(text);
        ExpressionNode::new(self.indexer.next(), dotted.token.clone(), Expression::Name(dotted))
    }

    pub fn binary(&mut self, operator: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
        let token = self.token("<binary>");
        ExpressionNode::new(self.indexer.next(), token, Expression::Binary(BinaryExpr { operator, left, right }))
    }

    pub fn assign(&mut self, target: &str, value: ExpressionNode) -> StatementNode {
        let target = self.dotted(target);
        StatementNode {
            id: self.indexer.next(),
            token: target.token.clone(),
            kind: Statement::Assignment(AssignmentStatement { target, value }),
        }
    }

    pub fn if_stmt(&mut self, condition: ExpressionNode, then_body: Vec<StatementNode>) -> StatementNode {
        let token = self.token("if");
        StatementNode {
            id: self.indexer.next(),
            token,
            kind: Statement::If(IfStatement { condition, then_body, elifs: Vec::new(), else_body: None }),
        }
    }

    pub fn call(&mut self, name: &str, arguments: Vec<ExpressionNode>) -> StatementNode {
        let name = self.dotted(name);
        StatementNode { id: self.indexer.next(), token: name.token.clone(), kind: Statement::Call(CallStatement { name, arguments }) }
    }

    pub fn process(
        &mut self,
        name: &str,
        clocked: bool,
        parameters: Vec<Parameter>,
        declarations: Vec<Declaration>,
        statements: Vec<StatementNode>,
    ) -> ProcessEntity {
        ProcessEntity { token: self.token(name), clocked, name: self.token(name), parameters, declarations, statements }
    }

    pub fn network(&mut self, name: &str, parameters: Vec<Parameter>, declarations: Vec<Declaration>) -> NetworkEntity {
        NetworkEntity { token: self.token(name), name: self.token(name), parameters, declarations }
    }

    pub fn positional_arg(&mut self, value: ExpressionNode) -> ParameterMapEntry {
        ParameterMapEntry { token: value.token.clone(), name: None, value }
    }

    pub fn named_arg(&mut self, name: &str, value: ExpressionNode) -> ParameterMapEntry {
        ParameterMapEntry { token: value.token.clone(), name: Some(self.token(name)), value }
    }

    pub fn instance(&mut self, name: &str, source: &str, parameter_map: Vec<ParameterMapEntry>) -> Declaration {
        Declaration::Instance(crate::ast::InstanceDecl {
            token: self.token(name),
            name: self.token(name),
            source: self.token(source),
            parameter_map,
        })
    }

    pub fn connect(&mut self, from: &str, to: &str) -> Declaration {
        let entry = ConnectEntry { token: self.token("connect"), from: self.dotted(from), to: self.dotted(to) };
        Declaration::Connect(ConnectDecl { token: entry.token.clone(), entries: vec![entry] })
    }

    pub fn module(&mut self, declarations: Vec<Declaration>, entities: Vec<Entity>) -> Module {
        Module { token: self.token("<module>"), imports: Vec::new(), declarations, entities }
    }
}
