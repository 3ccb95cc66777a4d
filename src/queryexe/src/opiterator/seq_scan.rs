use super::{not_open, OpIterator};
use common::catalog::Catalog;
use common::config::MalformedRowPolicy;
use common::table::Table;
use common::{MinibaseError, TableSchema, Tuple};
use csv::{Reader, StringRecord};
use std::fs::File;
use std::sync::Arc;

/// Sequential scan operator
pub struct SeqScan {
    /// Relation the alias reads from.
    table: Table,
    /// Alias the rows are labelled with.
    alias: String,
    schema: Arc<TableSchema>,
    on_malformed_row: MalformedRowPolicy,
    /// Open data file, or None when closed.
    reader: Option<Reader<File>>,
    record: StringRecord,
}

impl SeqScan {
    /// Constructor for the sequential scan operator.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog holding the alias.
    /// * `alias` - Registered alias to scan.
    pub fn new(catalog: &Catalog, alias: &str) -> Result<Self, MinibaseError> {
        Ok(Self {
            table: catalog.table_for(alias)?.clone(),
            alias: alias.to_string(),
            schema: catalog.schema_for(alias)?,
            on_malformed_row: catalog.config().on_malformed_row,
            reader: None,
            record: StringRecord::new(),
        })
    }
}

impl OpIterator for SeqScan {
    fn open(&mut self) -> Result<(), MinibaseError> {
        self.reader = Some(self.table.open_reader()?);
        Ok(())
    }

    /// Reads one row. A malformed row is skipped or returned as an error
    /// depending on the configured policy.
    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        let reader = self.reader.as_mut().ok_or_else(|| not_open("SeqScan"))?;
        loop {
            let parsed = match reader.read_record(&mut self.record) {
                Ok(false) => return Ok(None),
                Ok(true) => self.table.parse_record(&self.record),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => Err(e.into()),
            };
            match parsed {
                Ok(fields) => return Ok(Some(Tuple::new(fields, Arc::clone(&self.schema)))),
                Err(e) => match self.on_malformed_row {
                    MalformedRowPolicy::Skip => {
                        warn!("{}: skipping malformed row: {}", self.alias, e);
                    }
                    MalformedRowPolicy::Fail => return Err(e),
                },
            }
        }
    }

    fn close(&mut self) -> Result<(), MinibaseError> {
        self.reader = None;
        Ok(())
    }

    /// Drops the current file handle and reopens the file at its first row.
    fn rewind(&mut self) -> Result<(), MinibaseError> {
        if self.reader.is_none() {
            return Err(not_open("SeqScan"));
        }
        self.close()?;
        self.open()
    }

    fn get_schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }
}
