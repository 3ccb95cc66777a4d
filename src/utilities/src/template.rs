use rand::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::catalog::Catalog;
use common::config::EngineConfig;
use common::database::Database;
use common::parser::parse_query;
use common::testutil::gen_random_dir;
use common::{DataType, Field, MinibaseError, Query, TableSchema, Tuple};
use queryexe::query::{Executor, QueryPlanner};

/// A throwaway database directory plus the queries to run against it.
pub struct Template {
    dir: PathBuf,
    schema: Vec<String>,
    queries: Vec<Query>,
    db: Option<Database>,
}

impl Template {
    pub fn new() -> Result<Template, MinibaseError> {
        let dir = gen_random_dir();
        fs::create_dir_all(dir.join("files"))?;
        Ok(Template {
            dir,
            schema: Vec::new(),
            queries: Vec::new(),
            db: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn show_configuration(&self) {
        println!("dir: {:?}", &self.dir);
        println!("schema: {:?}", &self.schema);
        for q in self.queries.iter() {
            println!("query: {}", q);
        }
    }

    fn create_import_file(&self, name: &str, tuples: &[Tuple]) -> Result<(), MinibaseError> {
        let mut res = String::new();
        for tup in tuples.iter() {
            let vals: Vec<String> = tup.field_vals().map(|f| f.to_string()).collect();
            res.push_str(&vals.join(", "));
            res.push('\n');
        }
        fs::write(self.dir.join("files").join(format!("{}.csv", name)), res)?;
        Ok(())
    }

    /// Fills relation `name` with `rows` random int tuples drawn from `0..max`.
    pub fn generate_random_table(
        &mut self,
        name: &str,
        columns: usize,
        rows: usize,
        max: i64,
    ) -> Result<Vec<Tuple>, MinibaseError> {
        let mut rng = rand::thread_rng();
        let names: Vec<String> = (0..columns).map(|i| format!("c{}", i)).collect();
        let schema = Arc::new(TableSchema::from_vecs(
            name,
            names.iter().map(|n| n.as_str()).collect(),
            vec![DataType::Int; columns],
        ));

        let mut tuples: Vec<Tuple> = Vec::new();
        for _ in 0..rows {
            let mut fields: Vec<Field> = Vec::new();
            for _ in 0..columns {
                fields.push(Field::IntField(rng.gen_range(0, max)));
            }
            tuples.push(Tuple::new(fields, Arc::clone(&schema)));
        }
        self.push_table(name, columns, &tuples)?;

        Ok(tuples)
    }

    pub fn push_table(&mut self, name: &str, columns: usize, tuples: &[Tuple]) -> Result<(), MinibaseError> {
        self.create_import_file(name, tuples)?;
        self.schema
            .push(format!("{} {}", name, vec!["int"; columns].join(" ")));
        self.db = None;
        Ok(())
    }

    pub fn add_query(&mut self, text: &str) -> Result<(), MinibaseError> {
        self.queries.push(parse_query(text)?);
        Ok(())
    }

    /// Writes the schema file and loads the database.
    pub fn run_setup(&mut self) -> Result<(), MinibaseError> {
        fs::write(self.dir.join("schema.txt"), self.schema.join("\n"))?;
        self.db = Some(Database::load(&self.dir, &EngineConfig::default())?);
        debug!("Template database ready in {:?}", self.dir);
        Ok(())
    }

    /// Evaluates every query, returning the total number of result tuples.
    pub fn run_queries(&self) -> Result<usize, MinibaseError> {
        let db = self.db.as_ref().ok_or_else(|| {
            MinibaseError::ExecutionError(String::from("Template setup has not run"))
        })?;
        let mut total = 0;
        for query in self.queries.iter() {
            let mut catalog = Catalog::new(db);
            let plan = QueryPlanner::from_query(query, &mut catalog)?;
            let mut executor = Executor::new_ref();
            executor.configure_query(plan);
            total += executor.execute()?.len();
        }
        Ok(total)
    }

    pub fn run_cleanup(&mut self) -> Result<(), MinibaseError> {
        self.db = None;
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl Drop for Template {
    fn drop(&mut self) {
        if let Err(e) = self.run_cleanup() {
            warn!("Failed to remove {:?}: {}", self.dir, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_join() -> Result<(), MinibaseError> {
        let mut t = Template::new()?;
        let a = t.generate_random_table("A", 2, 20, 5)?;
        t.generate_random_table("B", 2, 20, 5)?;
        assert_eq!(20, a.len());
        t.add_query("Q(x, y) :- A(x, y)")?;
        t.add_query("Q(x) :- A(x, y), B(y, z), x < 0")?;
        t.run_setup()?;
        assert_eq!(20, t.run_queries()?);
        let dir = t.dir().to_path_buf();
        drop(t);
        assert!(!dir.exists());
        Ok(())
    }

    #[test]
    fn test_queries_need_setup() -> Result<(), MinibaseError> {
        let mut t = Template::new()?;
        t.generate_random_table("A", 1, 3, 10)?;
        t.add_query("Q(x) :- A(x)")?;
        assert!(t.run_queries().is_err());
        Ok(())
    }
}
