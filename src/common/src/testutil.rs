use crate::config::EngineConfig;
use crate::database::Database;
use crate::{DataType, Field, MinibaseError, TableSchema, Tuple};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Converts an int vector to a Tuple.
///
/// # Argument
///
/// * `data` - Data to put into tuple.
pub fn int_vec_to_tuple(data: Vec<i64>) -> Tuple {
    let schema = Arc::new(get_int_table_schema(data.len()));
    let tuple_data = data.into_iter().map(Field::IntField).collect();
    Tuple::new(tuple_data, schema)
}

/// Creates a Vec of tuples containing IntFields given a 2D Vec of i64 's
pub fn create_tuple_list(tuple_data: Vec<Vec<i64>>) -> Vec<Tuple> {
    tuple_data.into_iter().map(int_vec_to_tuple).collect()
}

/// Creates a new table schema for a table with width number of IntFields,
/// labelled `T.c0`, `T.c1`, ...
pub fn get_int_table_schema(width: usize) -> TableSchema {
    let names: Vec<String> = (0..width).map(|i| format!("c{}", i)).collect();
    TableSchema::from_vecs(
        "T",
        names.iter().map(|n| n.as_str()).collect(),
        vec![DataType::Int; width],
    )
}

pub fn gen_rand_string(n: usize) -> String {
    thread_rng().sample_iter(Alphanumeric).take(n).map(char::from).collect()
}

pub fn gen_random_dir() -> PathBuf {
    init();
    let mut dir = env::temp_dir();
    dir.push(String::from("minibase"));
    let rand_string = gen_rand_string(10);
    dir.push(rand_string);
    dir
}

/// Bag comparison of two tuple lists, ignoring order.
pub fn compare_unordered_tuples(a: &[Tuple], mut b: Vec<Tuple>) -> bool {
    // Quick check
    if a.len() != b.len() {
        return false;
    }
    for x in a {
        match b.iter().position(|y| y == x) {
            None => return false,
            Some(idx) => {
                b.swap_remove(idx);
            }
        }
    }
    b.is_empty()
}

/// A database directory in a random temp location, removed on drop.
pub struct TestDb {
    dir: PathBuf,
}

impl TestDb {
    /// Writes `schema.txt` and one `files/<name>.csv` per relation.
    ///
    /// # Arguments
    ///
    /// * `schema` - Contents of the schema file.
    /// * `files` - Relation names with the contents of their data files.
    pub fn new(schema: &str, files: &[(&str, &str)]) -> Result<Self, MinibaseError> {
        let dir = gen_random_dir();
        fs::create_dir_all(dir.join("files"))?;
        fs::write(dir.join("schema.txt"), schema)?;
        let db = TestDb { dir };
        for (name, contents) in files {
            db.write_relation(name, contents)?;
        }
        Ok(db)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrites the data file of a relation.
    pub fn write_relation(&self, name: &str, contents: &str) -> Result<(), MinibaseError> {
        fs::write(self.dir.join("files").join(format!("{}.csv", name)), contents)?;
        Ok(())
    }

    pub fn load(&self) -> Result<Database, MinibaseError> {
        self.load_with(&EngineConfig::default())
    }

    pub fn load_with(&self, config: &EngineConfig) -> Result<Database, MinibaseError> {
        Database::load(&self.dir, config)
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}
