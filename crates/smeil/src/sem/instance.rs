//! Elaborated instance graph: the concrete nodes produced by expanding
//! declarations (component D's data model).

use std::collections::HashMap;

use crate::{
    ast::{AstIndex, Direction, ParameterMapEntry, StatementNode},
    sem::types::DataType,
    token::Token,
};

/// Index into [`crate::sem::context::Context::instances`]. A non-owning back
/// reference: instances never own their parents or siblings by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceLocation(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessTag {
    Normal,
    Identity,
    Connect,
    TypeCast,
}

#[derive(Debug, Clone)]
pub struct ModuleInstance {
    pub token: Token,
    pub declarations: Vec<InstanceLocation>,
    pub top_network: Option<InstanceLocation>,
}

#[derive(Debug, Clone)]
pub struct ParameterInstance {
    pub token: Token,
    pub name: Token,
    pub direction: Direction,
    pub inverse: bool,
    /// Explicit type annotation, resolved at elaboration time if the
    /// parameter carried one; `None` means "use the bound argument's type".
    pub declared_type: Option<DataType>,
}

/// A bound (formal, actual) pair, created during parameter wiring (F).
#[derive(Debug, Clone)]
pub struct MappedParameterInstance {
    pub token: Token,
    pub formal: InstanceLocation,
    pub actual: InstanceLocation,
    pub ty: DataType,
}

#[derive(Debug, Clone)]
pub struct NetworkInstance {
    pub token: Token,
    pub name: String,
    pub parameters: Vec<InstanceLocation>,
    pub argument_map: Vec<ParameterMapEntry>,
    pub mapped_parameters: Vec<InstanceLocation>,
    pub declarations: Vec<InstanceLocation>,
    pub scope: crate::sem::scope::ScopeLocation,
}

#[derive(Debug, Clone)]
pub struct ProcessInstance {
    pub token: Token,
    pub name: String,
    pub tag: ProcessTag,
    pub clocked: bool,
    pub parameters: Vec<InstanceLocation>,
    pub argument_map: Vec<ParameterMapEntry>,
    pub mapped_parameters: Vec<InstanceLocation>,
    pub declarations: Vec<InstanceLocation>,
    pub statements: Vec<StatementNode>,
    pub scope: crate::sem::scope::ScopeLocation,
    /// Read/write usage of every signal-or-variable this process touches,
    /// populated by the type pass (component G).
    pub usage: HashMap<InstanceLocation, Usage>,
}

#[derive(Debug, Clone)]
pub struct FunctionInvocationInstance {
    pub token: Token,
    pub name: String,
    pub parameters: Vec<InstanceLocation>,
    pub argument_map: Vec<ParameterMapEntry>,
    pub mapped_parameters: Vec<InstanceLocation>,
    pub declarations: Vec<InstanceLocation>,
    /// Deep-cloned from the function definition so that implicit casts
    /// recorded per invocation never leak back to the shared definition.
    pub statements: Vec<StatementNode>,
    pub scope: crate::sem::scope::ScopeLocation,
}

#[derive(Debug, Clone)]
pub struct BusInstance {
    pub token: Token,
    pub name: String,
    pub signals: Vec<InstanceLocation>,
    pub exposed: bool,
    pub unique: bool,
    /// The process that writes this bus's signals, once the dependency
    /// pass has run. A bus may have signals written by different
    /// processes; this tracks the owning process for locally declared
    /// busses used bidirectionally.
    pub writer: Option<InstanceLocation>,
}

#[derive(Debug, Clone)]
pub struct SignalInstance {
    pub token: Token,
    pub name: String,
    pub bus: InstanceLocation,
    pub ty: DataType,
}

#[derive(Debug, Clone)]
pub struct VariableInstance {
    pub token: Token,
    pub name: String,
    pub ty: Option<DataType>,
    pub initializer: Option<crate::ast::ExpressionNode>,
}

#[derive(Debug, Clone)]
pub struct ConstantInstance {
    pub token: Token,
    pub name: String,
    pub ty: Option<DataType>,
    pub initializer: crate::ast::ExpressionNode,
    /// The scope the constant was declared in, so its initializer resolves
    /// sibling names (another local constant, a loop variable) rather than
    /// only module-level ones.
    pub scope: crate::sem::scope::ScopeLocation,
}

#[derive(Debug, Clone)]
pub struct EnumTypeInstance {
    pub token: Token,
    pub name: String,
    pub fields: Vec<InstanceLocation>,
}

#[derive(Debug, Clone)]
pub struct EnumFieldInstance {
    pub token: Token,
    pub name: String,
    pub parent: InstanceLocation,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct LiteralInstance {
    pub token: Token,
    pub value: crate::ast::LiteralValue,
    pub ty: DataType,
}

#[derive(Debug, Clone)]
pub struct ForLoopInstance {
    pub token: Token,
    pub counter: InstanceLocation,
    pub from: i64,
    pub to: i64,
}

/// Bookkeeping for one `connect` entry: the two endpoints and the
/// synthesized process that wires them.
#[derive(Debug, Clone)]
pub struct ConnectionInstance {
    pub token: Token,
    pub from: InstanceLocation,
    pub to: InstanceLocation,
    pub process: InstanceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumIs)]
pub enum Usage {
    Read,
    Write,
    Both,
}

impl Usage {
    pub fn merge(self, other: Usage) -> Usage {
        if self == other {
            self
        } else {
            Usage::Both
        }
    }
}

#[derive(Debug, Clone)]
pub enum Instance {
    Module(ModuleInstance),
    Network(NetworkInstance),
    Process(ProcessInstance),
    FunctionInvocation(FunctionInvocationInstance),
    Bus(BusInstance),
    Signal(SignalInstance),
    Variable(VariableInstance),
    ConstantReference(ConstantInstance),
    EnumType(EnumTypeInstance),
    EnumField(EnumFieldInstance),
    Literal(LiteralInstance),
    ForLoop(ForLoopInstance),
    Connection(ConnectionInstance),
    Parameter(ParameterInstance),
    MappedParameter(MappedParameterInstance),
}

impl Instance {
    pub fn token(&self) -> &Token {
        match self {
            Instance::Module(i) => &i.token,
            Instance::Network(i) => &i.token,
            Instance::Process(i) => &i.token,
            Instance::FunctionInvocation(i) => &i.token,
            Instance::Bus(i) => &i.token,
            Instance::Signal(i) => &i.token,
            Instance::Variable(i) => &i.token,
            Instance::ConstantReference(i) => &i.token,
            Instance::EnumType(i) => &i.token,
            Instance::EnumField(i) => &i.token,
            Instance::Literal(i) => &i.token,
            Instance::ForLoop(i) => &i.token,
            Instance::Connection(i) => &i.token,
            Instance::Parameter(i) => &i.token,
            Instance::MappedParameter(i) => &i.token,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Instance::Network(i) => Some(&i.name),
            Instance::Process(i) => Some(&i.name),
            Instance::FunctionInvocation(i) => Some(&i.name),
            Instance::Bus(i) => Some(&i.name),
            Instance::Signal(i) => Some(&i.name),
            Instance::Variable(i) => Some(&i.name),
            Instance::ConstantReference(i) => Some(&i.name),
            Instance::EnumType(i) => Some(&i.name),
            Instance::EnumField(i) => Some(&i.name),
            _ => None,
        }
    }

    pub fn as_process(&self) -> Option<&ProcessInstance> {
        match self {
            Instance::Process(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_process_mut(&mut self) -> Option<&mut ProcessInstance> {
        match self {
            Instance::Process(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_bus(&self) -> Option<&BusInstance> {
        match self {
            Instance::Bus(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bus_mut(&mut self) -> Option<&mut BusInstance> {
        match self {
            Instance::Bus(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<&SignalInstance> {
        match self {
            Instance::Signal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum_type(&self) -> Option<&EnumTypeInstance> {
        match self {
            Instance::EnumType(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&ConstantInstance> {
        match self {
            Instance::ConstantReference(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableInstance> {
        match self {
            Instance::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mapped_parameter(&self) -> Option<&MappedParameterInstance> {
        match self {
            Instance::MappedParameter(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterInstance> {
        match self {
            Instance::Parameter(p) => Some(p),
            _ => None,
        }
    }
}

/// Instances that bind actual arguments to formal parameters: processes,
/// networks, and function invocations.
pub trait ParameterizedInstance {
    fn formals(&self) -> &[InstanceLocation];
    fn argument_map(&self) -> &[ParameterMapEntry];
    fn scope(&self) -> crate::sem::scope::ScopeLocation;
    fn set_mapped_parameters(&mut self, mapped: Vec<InstanceLocation>);
}

impl ParameterizedInstance for ProcessInstance {
    fn formals(&self) -> &[InstanceLocation] {
        &self.parameters
    }

    fn argument_map(&self) -> &[ParameterMapEntry] {
        &self.argument_map
    }

    fn scope(&self) -> crate::sem::scope::ScopeLocation {
        self.scope
    }

    fn set_mapped_parameters(&mut self, mapped: Vec<InstanceLocation>) {
        self.mapped_parameters = mapped;
    }
}

impl ParameterizedInstance for NetworkInstance {
    fn formals(&self) -> &[InstanceLocation] {
        &self.parameters
    }

    fn argument_map(&self) -> &[ParameterMapEntry] {
        &self.argument_map
    }

    fn scope(&self) -> crate::sem::scope::ScopeLocation {
        self.scope
    }

    fn set_mapped_parameters(&mut self, mapped: Vec<InstanceLocation>) {
        self.mapped_parameters = mapped;
    }
}

impl ParameterizedInstance for FunctionInvocationInstance {
    fn formals(&self) -> &[InstanceLocation] {
        &self.parameters
    }

    fn argument_map(&self) -> &[ParameterMapEntry] {
        &self.argument_map
    }

    fn scope(&self) -> crate::sem::scope::ScopeLocation {
        self.scope
    }

    fn set_mapped_parameters(&mut self, mapped: Vec<InstanceLocation>) {
        self.mapped_parameters = mapped;
    }
}
