pub use self::aggregate::SumAggregate;
pub use self::distinct::Distinct;
pub use self::filter::Filter;
pub use self::join::Join;
pub use self::predicate::{Operand, Predicate};
pub use self::project::ProjectIterator;
pub use self::seq_scan::SeqScan;
use common::{MinibaseError, TableSchema, Tuple};
use std::sync::Arc;

mod aggregate;
mod distinct;
mod filter;
mod join;
mod predicate;
mod project;
mod seq_scan;

/// Trait for an iterator over a stream of tuples.
pub trait OpIterator {
    /// Opens the iterator. This must be called before any of the other methods.
    fn open(&mut self) -> Result<(), MinibaseError>;

    /// Advances the iterator and returns the next tuple from the operator.
    ///
    /// Returns None when iteration is finished.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the iterator is not open.
    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError>;

    /// Closes the iterator.
    fn close(&mut self) -> Result<(), MinibaseError>;

    /// Returns the iterator to the start.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the iterator is not open.
    fn rewind(&mut self) -> Result<(), MinibaseError>;

    /// Returns the schema associated with this OpIterator.
    fn get_schema(&self) -> &Arc<TableSchema>;
}

pub(crate) fn not_open(op: &str) -> MinibaseError {
    MinibaseError::ExecutionError(format!("{} is not open", op))
}

/// Iterator over a vector of already materialized tuples.
pub struct TupleIterator {
    /// Tuples to iterate over.
    tuples: Vec<Tuple>,
    /// Schema of the output.
    schema: Arc<TableSchema>,
    /// Current tuple in iteration.
    index: Option<usize>,
}

impl TupleIterator {
    /// Create a new tuple iterator over a set of results.
    ///
    /// # Arguments
    ///
    /// * `tuples` - Tuples to iterate over.
    /// * `schema` - Schema of the output results.
    pub fn new(tuples: Vec<Tuple>, schema: Arc<TableSchema>) -> Self {
        Self {
            index: None,
            tuples,
            schema,
        }
    }
}

impl OpIterator for TupleIterator {
    fn open(&mut self) -> Result<(), MinibaseError> {
        self.index = Some(0);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        let i = self.index.ok_or_else(|| not_open("TupleIterator"))?;
        let tuple = self.tuples.get(i).cloned();
        self.index = Some(i + 1);
        Ok(tuple)
    }

    fn close(&mut self) -> Result<(), MinibaseError> {
        self.index = None;
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), MinibaseError> {
        self.close()?;
        self.open()
    }

    fn get_schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }
}

/// Pulls every remaining tuple of an open iterator.
pub fn drain(op: &mut dyn OpIterator) -> Result<Vec<Tuple>, MinibaseError> {
    let mut tuples = Vec::new();
    while let Some(t) = op.next()? {
        tuples.push(t);
    }
    Ok(tuples)
}

#[cfg(test)]
mod test {
    use super::*;
    use common::testutil::*;

    pub fn int_tuple_iterator(rows: Vec<Vec<i64>>, width: usize) -> TupleIterator {
        let schema = Arc::new(get_int_table_schema(width));
        let tuples = create_tuple_list(rows);
        TupleIterator::new(tuples, schema)
    }

    #[test]
    fn test_open() -> Result<(), MinibaseError> {
        let mut ti = int_tuple_iterator(vec![vec![1, 2], vec![3, 4]], 2);
        assert!(ti.next().is_err());
        ti.open()?;
        assert_eq!(Some(int_vec_to_tuple(vec![1, 2])), ti.next()?);
        Ok(())
    }

    #[test]
    fn test_next() -> Result<(), MinibaseError> {
        let mut ti = int_tuple_iterator(vec![vec![1, 2], vec![3, 4]], 2);
        ti.open()?;
        assert_eq!(2, drain(&mut ti)?.len());
        assert_eq!(None, ti.next()?);
        Ok(())
    }

    #[test]
    fn test_rewind() -> Result<(), MinibaseError> {
        let mut ti = int_tuple_iterator(vec![vec![1, 2], vec![3, 4]], 2);
        ti.open()?;
        let first = drain(&mut ti)?;
        ti.rewind()?;
        assert_eq!(first, drain(&mut ti)?);
        Ok(())
    }

    #[test]
    fn test_close() -> Result<(), MinibaseError> {
        let mut ti = int_tuple_iterator(vec![vec![1]], 1);
        ti.open()?;
        ti.close()?;
        assert!(matches!(ti.next(), Err(MinibaseError::ExecutionError(_))));
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use self::test::int_tuple_iterator;
