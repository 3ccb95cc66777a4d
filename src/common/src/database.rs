use crate::config::EngineConfig;
use crate::table::*;
use crate::{DataType, MinibaseError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The relations of one database directory. Read-only once loaded.
#[derive(Clone, Debug)]
pub struct Database {
    /// Directory the database was loaded from.
    pub dir: PathBuf,
    /// Relations by name.
    tables: HashMap<String, Table>,
    /// Engine settings the database was loaded with.
    pub config: EngineConfig,
}

impl Database {
    /// Loads the schema file of a database directory.
    ///
    /// Each non-blank line declares one relation: its name followed by
    /// whitespace-separated column types.
    ///
    /// # Arguments
    ///
    /// * `dir` - Database directory.
    /// * `config` - Names of the schema file and the data files.
    pub fn load(dir: &Path, config: &EngineConfig) -> Result<Self, MinibaseError> {
        let schema_path = dir.join(&config.schema_file);
        let contents = fs::read_to_string(&schema_path).map_err(|e| {
            MinibaseError::ConfigurationError(format!("{}: {}", schema_path.display(), e))
        })?;
        let mut db = Database {
            dir: dir.to_path_buf(),
            tables: HashMap::new(),
            config: config.clone(),
        };
        for (lineno, line) in contents.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            let name = match tokens.next() {
                Some(name) => name,
                None => continue,
            };
            let dtypes = tokens
                .map(|t| {
                    DataType::from_name(t).ok_or_else(|| {
                        MinibaseError::ConfigurationError(format!(
                            "line {}: unknown column type {:?} for {}",
                            lineno + 1,
                            t,
                            name
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if dtypes.is_empty() {
                return Err(MinibaseError::ConfigurationError(format!(
                    "line {}: relation {} declares no columns",
                    lineno + 1,
                    name
                )));
            }
            if db.tables.contains_key(name) {
                return Err(MinibaseError::ConfigurationError(format!(
                    "line {}: relation {} declared twice",
                    lineno + 1,
                    name
                )));
            }
            let path = db.data_path(name);
            debug!("Declared {} {:?} at {:?}", name, dtypes, path);
            db.tables.insert(name.to_string(), Table::new(name, dtypes, &path));
        }
        info!("Loaded {} relations from {:?}", db.tables.len(), schema_path);
        Ok(db)
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(&self.config.data_dir)
            .join(format!("{}.{}", name, self.config.data_extension))
    }

    /// Gets a relation by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Names of all declared relations, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    #[test]
    fn test_load() -> Result<(), MinibaseError> {
        let test_db = TestDb::new("R int string\n\nS int\n", &[("R", "1, 'a'\n"), ("S", "4\n")])?;
        let db = test_db.load()?;
        assert_eq!(vec!["R", "S"], db.table_names());
        let r = db.get_table("R").ok_or_else(|| MinibaseError::ResolutionError("R".into()))?;
        assert_eq!(vec![DataType::Int, DataType::String], r.dtypes);
        assert_eq!(test_db.dir().join("files").join("R.csv"), r.path);
        Ok(())
    }

    #[test]
    fn test_unknown_type() -> Result<(), MinibaseError> {
        let test_db = TestDb::new("R int float\n", &[])?;
        assert!(matches!(
            test_db.load(),
            Err(MinibaseError::ConfigurationError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_relation_without_columns() -> Result<(), MinibaseError> {
        let test_db = TestDb::new("R\n", &[])?;
        assert!(matches!(
            test_db.load(),
            Err(MinibaseError::ConfigurationError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_duplicate_relation() -> Result<(), MinibaseError> {
        let test_db = TestDb::new("R int\nR string\n", &[])?;
        assert!(matches!(
            test_db.load(),
            Err(MinibaseError::ConfigurationError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = gen_random_dir();
        assert!(matches!(
            Database::load(&dir, &EngineConfig::default()),
            Err(MinibaseError::ConfigurationError(_))
        ));
    }
}
