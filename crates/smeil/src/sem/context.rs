//! The arena that owns every instance and scope produced while elaborating
//! one program, plus the side-tables the later passes populate.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    ast::{AstIndex, AstIndexer, Entity, FunctionDecl},
    sem::{
        error::SemError,
        instance::{Instance, InstanceLocation, Usage},
        scope::{Scope, ScopeLocation},
        types::DataType,
    },
};

/// Reindexed [`AstIndex`] values for cloned function bodies start here, far
/// past anything a parser-owned [`AstIndexer`] would hand out for one file.
const CLONE_INDEX_BASE: usize = 1 << 32;

/// An expression's natural type, plus the implicit-cast target recorded by
/// the type pass, if any. Keyed by [`AstIndex`] rather than mutating the AST
/// node itself (§9: AST mutation is replaced by a side table; see DESIGN.md).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCell {
    pub ty: DataType,
    pub implicit_cast_to: Option<DataType>,
}

/// Recursion ceiling for instance elaboration (Open Question: "guard
/// against infinite recursion" with no fixed depth named in source).
pub const MAX_INSTANCE_DEPTH: usize = 64;

#[derive(Debug, Default)]
pub struct Context {
    pub instances: Vec<Instance>,
    pub scopes: Vec<Scope>,
    pub module_scope: ScopeLocation,
    /// Process/network templates available for instantiation, by name.
    pub entities: IndexMap<String, Entity>,
    /// Function definitions, by name; bodies are cloned (with [`Context::clone_indexer`]
    /// issuing fresh indices) into a fresh [`crate::sem::instance::FunctionInvocationInstance`]
    /// per call site.
    pub functions: IndexMap<String, FunctionDecl>,
    pub assigned_types: HashMap<AstIndex, TypeCell>,
    /// Usage of a signal-or-variable within an owning process.
    pub usage: HashMap<(InstanceLocation, InstanceLocation), Usage>,
    pub recursion_stack: Vec<String>,
    pub clone_indexer: AstIndexer,
}

impl Context {
    pub fn new() -> Self {
        let mut ctx = Self {
            instances: Vec::new(),
            scopes: Vec::new(),
            module_scope: ScopeLocation::UNDEFINED,
            entities: IndexMap::new(),
            functions: IndexMap::new(),
            assigned_types: HashMap::new(),
            usage: HashMap::new(),
            recursion_stack: Vec::new(),
            clone_indexer: AstIndexer::with_base(CLONE_INDEX_BASE),
        };
        ctx.module_scope = ctx.create_scope(None);
        ctx
    }

    pub fn add_instance(&mut self, instance: Instance) -> InstanceLocation {
        let location = InstanceLocation(self.instances.len());
        self.instances.push(instance);
        location
    }

    pub fn get(&self, location: InstanceLocation) -> &Instance {
        &self.instances[location.0]
    }

    pub fn get_mut(&mut self, location: InstanceLocation) -> &mut Instance {
        &mut self.instances[location.0]
    }

    pub fn create_scope(&mut self, parent: Option<ScopeLocation>) -> ScopeLocation {
        let location = ScopeLocation(self.scopes.len());
        self.scopes.push(Scope::new(location, parent));
        location
    }

    pub fn scope(&self, location: ScopeLocation) -> &Scope {
        &self.scopes[location.0]
    }

    pub fn scope_mut(&mut self, location: ScopeLocation) -> &mut Scope {
        &mut self.scopes[location.0]
    }

    pub fn record_type(&mut self, id: AstIndex, ty: DataType) {
        self.assigned_types.insert(id, TypeCell { ty, implicit_cast_to: None });
    }

    pub fn record_implicit_cast(&mut self, id: AstIndex, target: DataType) {
        if let Some(cell) = self.assigned_types.get_mut(&id) {
            cell.implicit_cast_to = Some(target);
        }
    }

    pub fn type_of(&self, id: AstIndex) -> Option<&DataType> {
        self.assigned_types.get(&id).map(|cell| &cell.ty)
    }

    pub fn record_usage(&mut self, owner: InstanceLocation, target: InstanceLocation, usage: Usage) {
        self.usage
            .entry((owner, target))
            .and_modify(|existing| *existing = existing.merge(usage))
            .or_insert(usage);
    }

    /// Pushes `name` onto the recursion guard, failing if the configured
    /// ceiling would be exceeded.
    pub fn enter_recursion(&mut self, name: &str, token: &crate::token::Token) -> Result<(), SemError> {
        if self.recursion_stack.len() >= MAX_INSTANCE_DEPTH {
            return Err(SemError::RecursionLimitExceeded { name: name.to_string(), at: token.clone() });
        }
        self.recursion_stack.push(name.to_string());
        Ok(())
    }

    pub fn exit_recursion(&mut self) {
        self.recursion_stack.pop();
    }
}
