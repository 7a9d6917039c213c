//! Entity schema descriptors: table naming and property-to-column mapping.
//!
//! A schema is built once per entity type at registration time and passed
//! explicitly wherever needed. The translators consult its name map so a
//! filter string never references a column the remote schema does not
//! expose.

use std::collections::HashMap;

/// Descriptor for one entity type: the backing table name and the mapping
/// from logical property names to wire column names.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    table: String,
    name_map: HashMap<String, String>,
}

impl EntitySchema {
    /// Build a schema for a type name, deriving the table name by
    /// pluralizing it (`Order` -> `Orders`, `Company` -> `Companies`).
    pub fn for_type(type_name: &str) -> Self {
        Self {
            table: pluralize(type_name),
            name_map: HashMap::new(),
        }
    }

    /// Build a schema with an explicit table name, bypassing pluralization.
    pub fn with_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name_map: HashMap::new(),
        }
    }

    /// Map a logical property name to a different wire column name.
    pub fn map_property(mut self, logical: impl Into<String>, wire: impl Into<String>) -> Self {
        self.name_map.insert(logical.into(), wire.into());
        self
    }

    /// The backing table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Resolve a logical property name to its wire column name. Unmapped
    /// names pass through unchanged.
    pub fn wire_name<'a>(&'a self, logical: &'a str) -> &'a str {
        self.name_map.get(logical).map_or(logical, String::as_str)
    }
}

/// Pluralize a type name: trailing `y` becomes `ies`, otherwise an `s` is
/// appended unless one is already present.
fn pluralize(name: &str) -> String {
    let mut plural = name.to_string();
    if plural.ends_with('y') || plural.ends_with('Y') {
        plural.pop();
        plural.push_str("ies");
    }
    if !plural.ends_with('s') && !plural.ends_with('S') {
        plural.push('s');
    }
    plural
}
