use std::collections::BTreeMap;

use serde_json::Value;

/// Outcome of registering a component schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    /// Same name, same content: nothing to do.
    Identical,
    /// Same name, different content: the first registration is kept.
    Conflict,
}

/// Component schemas in their serialized JSON form, keyed by component name.
#[derive(Debug, Default, Clone)]
pub struct ComponentsRegistry {
    pub schemas: BTreeMap<String, Value>,
}

impl ComponentsRegistry {
    pub fn register_schema(&mut self, name: impl Into<String>, schema: Value) -> Registration {
        let name = name.into();
        match self.schemas.get(&name) {
            None => {
                self.schemas.insert(name, schema);
                Registration::Inserted
            }
            Some(existing) if *existing == schema => Registration::Identical,
            Some(_) => Registration::Conflict,
        }
    }
}
