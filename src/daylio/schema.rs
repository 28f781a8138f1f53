//! Column schema registry
//!
//! `table_info.json` maps each table name to its ordered column declarations:
//!
//! ```json
//! {
//!   "dayEntries": [
//!     {"name": "id", "type": "integer", "role": "id"},
//!     {"name": "datetime", "type": "timestamp", "role": "timestamp"}
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::table::ColumnSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, Vec<ColumnSchema>>,
}

impl SchemaRegistry {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading column schema registry");
        let registry = Self::from_json(&std::fs::read_to_string(path)?)?;
        debug!(tables = registry.tables.len(), "schema registry loaded");
        Ok(registry)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let registry: Self = serde_json::from_str(text)?;
        for (table, columns) in &registry.tables {
            let mut seen = std::collections::HashSet::new();
            for col in columns {
                if !seen.insert(col.name.as_str()) {
                    return Err(Error::mismatch(
                        format!("unique column names in '{}'", table),
                        format!("duplicate column '{}'", col.name),
                    ));
                }
            }
        }
        Ok(registry)
    }

    /// Columns declared for `table`, in persistence order
    pub fn columns(&self, table: &str) -> Result<&[ColumnSchema]> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownTable(table.to_string()))
    }
}
