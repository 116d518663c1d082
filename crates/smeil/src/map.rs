//! Ordered, duplicate-checking map used for scope symbol and typedef tables.
//!
//! Wraps [`IndexMap`] so that iteration follows insertion (hence source
//! declaration) order, per the determinism requirement on scopes, parameter
//! lists, signal lists and enum fields.

use std::hash::Hash;

use indexmap::{Equivalent, IndexMap};

use crate::{sem::error::SemError, token::Token};

/// Values stored in an [`OrderedMap`] must be able to report where they were declared.
pub trait Located {
    fn token(&self) -> &Token;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<K: Hash + Eq, V: Located> {
    map: IndexMap<K, V>,
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Hash + Eq,
    V: Located,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Hash + Eq,
    V: Located,
{
    pub fn new() -> Self {
        Self { map: IndexMap::new() }
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Inserts a key-value pair, failing with [`SemError::DuplicateSymbol`] if
    /// `key` is already locally bound.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), SemError>
    where
        K: Clone + std::fmt::Display,
    {
        if let Some(existing) = self.map.get(&key) {
            return Err(SemError::duplicate_symbol(key.to_string(), value.token().clone(), existing.token().clone()));
        }
        self.map.insert(key, value);
        Ok(())
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.map.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
