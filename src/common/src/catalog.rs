use crate::config::EngineConfig;
use crate::database::Database;
use crate::table::Table;
use crate::{MinibaseError, TableSchema};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// One registered alias.
#[derive(Debug, Clone)]
struct CatalogEntry {
    relation: String,
    schema: Arc<TableSchema>,
}

/// Per-evaluation registry of table aliases.
///
/// Every alias maps to exactly one relation of the database and one
/// immutable schema of `alias.column` labels. A catalog starts empty for
/// each evaluation and is only read once planning is done.
pub struct Catalog<'a> {
    db: &'a Database,
    entries: HashMap<String, CatalogEntry>,
    /// Aliases in registration order.
    aliases: Vec<String>,
    /// `alias.column` label to its slot in the alias's schema.
    slots: HashMap<String, usize>,
}

impl<'a> Catalog<'a> {
    /// Creates an empty catalog over a loaded database.
    pub fn new(db: &'a Database) -> Self {
        Catalog {
            db,
            entries: HashMap::new(),
            aliases: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Registers an alias for a relation with one column name per declared type.
    ///
    /// # Arguments
    ///
    /// * `alias` - Alias to register.
    /// * `relation` - Relation the alias reads from.
    /// * `columns` - Column names, positionally aligned with the declared types.
    pub fn register(
        &mut self,
        alias: &str,
        relation: &str,
        columns: Vec<String>,
    ) -> Result<Arc<TableSchema>, MinibaseError> {
        let table = self.db.get_table(relation).ok_or_else(|| {
            MinibaseError::ConfigurationError(format!("No declared types for relation {}", relation))
        })?;
        if columns.len() != table.arity() {
            return Err(MinibaseError::ValidationError(format!(
                "{} has {} columns but {} is used with {}",
                relation,
                table.arity(),
                alias,
                columns.len()
            )));
        }
        if self.entries.contains_key(alias) {
            return Err(MinibaseError::ValidationError(format!(
                "Alias {} already registered",
                alias
            )));
        }
        let schema = Arc::new(TableSchema::from_vecs(
            alias,
            columns.iter().map(|c| c.as_str()).collect(),
            table.dtypes.clone(),
        ));
        for (i, attr) in schema.attributes().enumerate() {
            self.slots.insert(attr.name().to_string(), i);
        }
        debug!("Registered {} as {} with columns {:?}", alias, relation, columns);
        self.entries.insert(
            alias.to_string(),
            CatalogEntry {
                relation: relation.to_string(),
                schema: Arc::clone(&schema),
            },
        );
        self.aliases.push(alias.to_string());
        Ok(schema)
    }

    fn entry(&self, alias: &str) -> Result<&CatalogEntry, MinibaseError> {
        self.entries
            .get(alias)
            .ok_or_else(|| MinibaseError::ResolutionError(format!("Unknown alias {}", alias)))
    }

    /// Schema of a registered alias.
    pub fn schema_for(&self, alias: &str) -> Result<Arc<TableSchema>, MinibaseError> {
        Ok(Arc::clone(&self.entry(alias)?.schema))
    }

    /// Slot of an `alias.column` label within its alias's schema.
    pub fn slot_of(&self, label: &str) -> Result<usize, MinibaseError> {
        self.slots
            .get(label)
            .copied()
            .ok_or_else(|| MinibaseError::ResolutionError(format!("Unknown label {}", label)))
    }

    /// Relation a registered alias reads from.
    pub fn relation_of(&self, alias: &str) -> Result<&str, MinibaseError> {
        Ok(&self.entry(alias)?.relation)
    }

    /// Table a registered alias reads from.
    pub fn table_for(&self, alias: &str) -> Result<&'a Table, MinibaseError> {
        let relation = self.relation_of(alias)?;
        self.db.get_table(relation).ok_or_else(|| {
            MinibaseError::ResolutionError(format!("Unknown relation {}", relation))
        })
    }

    /// Data file of a relation.
    pub fn path_for(&self, relation: &str) -> Result<&'a Path, MinibaseError> {
        self.db
            .get_table(relation)
            .map(|t| t.path.as_path())
            .ok_or_else(|| MinibaseError::ResolutionError(format!("Unknown relation {}", relation)))
    }

    /// Registered aliases in registration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn config(&self) -> &'a EngineConfig {
        &self.db.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use crate::DataType;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_register_and_lookup() -> Result<(), MinibaseError> {
        let test_db = TestDb::new("R int string\n", &[("R", "")])?;
        let db = test_db.load()?;
        let mut catalog = Catalog::new(&db);
        catalog.register("R0", "R", cols(&["x", "y"]))?;
        catalog.register("R1", "R", cols(&["y", "z"]))?;

        let schema = catalog.schema_for("R1")?;
        let labels: Vec<&str> = schema.attributes().map(|a| a.name()).collect();
        assert_eq!(vec!["R1.y", "R1.z"], labels);
        assert_eq!(DataType::String, *schema.attributes().nth(1).map(|a| a.dtype()).unwrap());
        assert_eq!(1, catalog.slot_of("R0.y")?);
        assert_eq!(0, catalog.slot_of("R1.y")?);
        assert_eq!("R", catalog.relation_of("R1")?);
        assert_eq!(test_db.dir().join("files").join("R.csv"), catalog.path_for("R")?);
        assert_eq!(vec!["R0", "R1"], catalog.aliases().to_vec());
        Ok(())
    }

    #[test]
    fn test_register_errors() -> Result<(), MinibaseError> {
        let test_db = TestDb::new("R int int\n", &[])?;
        let db = test_db.load()?;
        let mut catalog = Catalog::new(&db);
        assert!(matches!(
            catalog.register("S0", "S", cols(&["x"])),
            Err(MinibaseError::ConfigurationError(_))
        ));
        assert!(matches!(
            catalog.register("R0", "R", cols(&["x"])),
            Err(MinibaseError::ValidationError(_))
        ));
        catalog.register("R0", "R", cols(&["x", "y"]))?;
        assert!(matches!(
            catalog.register("R0", "R", cols(&["x", "y"])),
            Err(MinibaseError::ValidationError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_lookup_before_register() -> Result<(), MinibaseError> {
        let test_db = TestDb::new("R int\n", &[])?;
        let db = test_db.load()?;
        let catalog = Catalog::new(&db);
        assert!(matches!(
            catalog.schema_for("R0"),
            Err(MinibaseError::ResolutionError(_))
        ));
        assert!(matches!(
            catalog.slot_of("R0.x"),
            Err(MinibaseError::ResolutionError(_))
        ));
        assert!(matches!(
            catalog.path_for("Nope"),
            Err(MinibaseError::ResolutionError(_))
        ));
        Ok(())
    }
}
