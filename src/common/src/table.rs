use crate::{DataType, Field, MinibaseError};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::path::{Path, PathBuf};

/// A relation declared in the schema file.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Relation name.
    pub name: String,
    /// Declared column types, in column order.
    pub dtypes: Vec<DataType>,
    /// Location of the relation's data file.
    pub path: PathBuf,
}

impl Table {
    /// Creates a new table.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the relation.
    /// * `dtypes` - Declared column types.
    /// * `path` - Data file of the relation.
    pub fn new(name: &str, dtypes: Vec<DataType>, path: &Path) -> Self {
        Table {
            name: name.to_string(),
            dtypes,
            path: path.to_path_buf(),
        }
    }

    pub fn arity(&self) -> usize {
        self.dtypes.len()
    }

    /// Opens a fresh csv reader positioned at the first record.
    pub fn open_reader(&self) -> Result<Reader<File>, MinibaseError> {
        debug!("Opening {:?} for relation {}", self.path, self.name);
        let file = File::open(&self.path).map_err(|e| {
            MinibaseError::IOError(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file))
    }

    /// Coerces one csv record to this relation's declared types.
    ///
    /// # Arguments
    ///
    /// * `record` - Raw record read from the data file.
    pub fn parse_record(&self, record: &StringRecord) -> Result<Vec<Field>, MinibaseError> {
        if record.len() != self.arity() {
            return Err(MinibaseError::DataFormatError(format!(
                "{}: expected {} fields, found {} in {:?}",
                self.name,
                self.arity(),
                record.len(),
                record
            )));
        }
        record
            .iter()
            .zip(self.dtypes.iter())
            .map(|(raw, dtype)| Field::parse(raw, *dtype))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            "R",
            vec![DataType::Int, DataType::String],
            Path::new("R.csv"),
        )
    }

    #[test]
    fn test_parse_record() -> Result<(), MinibaseError> {
        let record = StringRecord::from(vec!["5", "'abc'"]);
        assert_eq!(
            vec![Field::IntField(5), Field::StringField(String::from("abc"))],
            table().parse_record(&record)?
        );
        Ok(())
    }

    #[test]
    fn test_parse_record_wrong_arity() {
        let record = StringRecord::from(vec!["5"]);
        assert!(matches!(
            table().parse_record(&record),
            Err(MinibaseError::DataFormatError(_))
        ));
    }

    #[test]
    fn test_parse_record_bad_int() {
        let record = StringRecord::from(vec!["five", "'abc'"]);
        assert!(matches!(
            table().parse_record(&record),
            Err(MinibaseError::DataFormatError(_))
        ));
    }
}
