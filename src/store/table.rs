//! Variable store implementation
//!
//! HashMap-based store with a RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{Result, SmallError};
use crate::protocol::{validate_name, MAX_VALUE_LEN};

/// Server-owned variable storage
///
/// Every lookup and upsert takes the lock for just that operation, so no
/// caller ever holds it across I/O or a subprocess.
#[derive(Debug, Default)]
pub struct VariableStore {
    vars: RwLock<HashMap<String, Vec<u8>>>,
}

impl VariableStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value
    ///
    /// Out-of-bounds input is rejected and leaves the store untouched.
    pub fn set(&self, name: &str, value: &[u8]) -> Result<()> {
        validate_name(name)?;
        if value.len() > MAX_VALUE_LEN {
            return Err(SmallError::FieldTooLong {
                field: "value",
                len: value.len(),
                max: MAX_VALUE_LEN,
            });
        }

        self.vars.write().insert(name.to_string(), value.to_vec());
        Ok(())
    }

    /// Get a copy of the value stored under `name`
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.vars.read().get(name).cloned()
    }

    /// Check whether `name` has a value
    pub fn contains(&self, name: &str) -> bool {
        self.vars.read().contains_key(name)
    }

    /// Number of stored variables
    pub fn len(&self) -> usize {
        self.vars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.read().is_empty()
    }
}
