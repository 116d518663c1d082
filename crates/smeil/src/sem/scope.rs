//! Chained lexical scopes with separate symbol and typedef namespaces
//! (component B).

use crate::{keywords, map::{Located, OrderedMap}, sem::error::SemError, sem::instance::InstanceLocation, token::Token};

/// Index into [`crate::sem::context::Context::scopes`]. Parents are
/// referenced by location, never owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeLocation(pub usize);

impl ScopeLocation {
    pub const UNDEFINED: ScopeLocation = ScopeLocation(usize::MAX);
}

/// A named type binding: an enum declaration, a bus shape, or an alias to
/// another typedef'd name (resolved lazily, with cycle detection).
#[derive(Debug, Clone)]
pub enum Typedef {
    Enum(InstanceLocation),
    Bus(crate::sem::types::BusShape),
    Alias(Token),
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub token: Token,
    pub instance: InstanceLocation,
}

impl Located for SymbolEntry {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(Debug, Clone)]
pub struct TypedefEntry {
    pub token: Token,
    pub typedef: Typedef,
}

impl Located for TypedefEntry {
    fn token(&self) -> &Token {
        &self.token
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub location: ScopeLocation,
    pub parent: Option<ScopeLocation>,
    symbols: OrderedMap<String, SymbolEntry>,
    typedefs: OrderedMap<String, TypedefEntry>,
}

impl Scope {
    pub fn new(location: ScopeLocation, parent: Option<ScopeLocation>) -> Self {
        Self {
            location,
            parent,
            symbols: OrderedMap::new(),
            typedefs: OrderedMap::new(),
        }
    }

    /// Binds `name` to `instance` in this scope's local symbol map.
    /// Fails with [`SemError::DuplicateSymbol`] if `name` is already locally
    /// bound; shadowing an ancestor's binding is fine. The sentinel `_` is
    /// never added (I3).
    pub fn try_add_symbol(&mut self, name: &str, instance: InstanceLocation, token: Token) -> Result<(), SemError> {
        if name == "_" {
            return Ok(());
        }
        self.symbols.try_insert(name.to_string(), SymbolEntry { token, instance })
    }

    pub fn try_add_typedef(&mut self, name: &str, typedef: Typedef, token: Token) -> Result<(), SemError> {
        self.typedefs.try_insert(name.to_string(), TypedefEntry { token, typedef })
    }

    /// Overwrites `name`'s local binding without the duplicate check, used
    /// once by parameter wiring (F) to repoint a formal parameter's name at
    /// its [`crate::sem::instance::MappedParameterInstance`] once the actual
    /// argument is known.
    pub fn rebind_symbol(&mut self, name: &str, instance: InstanceLocation, token: Token) {
        self.symbols.insert(name.to_string(), SymbolEntry { token, instance });
    }

    pub fn local_symbol(&self, name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(name)
    }

    pub fn local_typedef(&self, name: &str) -> Option<&TypedefEntry> {
        self.typedefs.get(name)
    }

    pub fn local_symbol_names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }
}

/// Walks `scope`'s parent chain looking for `name`'s local binding. The
/// first match wins (I1).
pub fn find_symbol_in_chain<'a>(
    scopes: &'a [Scope],
    mut scope: ScopeLocation,
    name: &str,
) -> Option<&'a SymbolEntry> {
    loop {
        let current = &scopes[scope.0];
        if let Some(entry) = current.local_symbol(name) {
            return Some(entry);
        }
        match current.parent {
            Some(parent) => scope = parent,
            None => return None,
        }
    }
}

pub fn find_typedef_in_chain<'a>(
    scopes: &'a [Scope],
    mut scope: ScopeLocation,
    name: &str,
) -> Option<&'a TypedefEntry> {
    loop {
        let current = &scopes[scope.0];
        if let Some(entry) = current.local_typedef(name) {
            return Some(entry);
        }
        match current.parent {
            Some(parent) => scope = parent,
            None => return None,
        }
    }
}

/// Suggests a case-insensitive near-miss among every name visible from
/// `scope`, for "unknown name" diagnostics.
pub fn suggest_symbol(scopes: &[Scope], mut scope: ScopeLocation, name: &str) -> Option<String> {
    loop {
        let current = &scopes[scope.0];
        if let Some(found) = keywords::suggest(name, current.local_symbol_names()) {
            return Some(found.to_string());
        }
        match current.parent {
            Some(parent) => scope = parent,
            None => return None,
        }
    }
}
