//! Opaque transaction records with canonical hashing.
//!
//! A transaction is a flat record of string keys to JSON values. The chain
//! never interprets the fields; it only commits to them. Identity comes
//! from the canonical byte form: the backing map keeps keys sorted, so two
//! logically equal records serialize to the same bytes and hash alike no
//! matter the insertion order.

use crate::hash::{hash, Hash};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A flat record of string keys to JSON values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(Map<String, Value>);

impl Transaction {
    /// An empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// A simple transfer record with `from`, `to`, and `amt` fields.
    pub fn transfer(from: &str, to: &str, amt: u64) -> Self {
        Self::new().with("from", from).with("to", to).with("amt", amt)
    }

    /// Builder-style field insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical byte form: compact JSON with keys in sorted order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.0).expect("serialization should not fail")
    }

    /// Hash of the canonical byte form.
    pub fn hash(&self) -> Hash {
        hash(&self.canonical_bytes())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
