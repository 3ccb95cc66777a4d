use super::{OpIterator, Predicate};
use common::{MinibaseError, TableSchema, Tuple};
use std::sync::Arc;

/// Filter oracle.
pub struct Filter {
    /// Conjunction every emitted tuple satisfies.
    predicates: Vec<Predicate>,
    /// Schema of the child.
    schema: Arc<TableSchema>,
    /// Boxed child operator.
    child: Box<dyn OpIterator>,
}

impl Filter {
    /// Filter constructor.
    ///
    /// # Arguments
    ///
    /// * `predicates` - Resolved against the child's schema.
    /// * `child` - Child OpIterator passing data into the operator.
    pub fn new(predicates: Vec<Predicate>, child: Box<dyn OpIterator>) -> Self {
        Self {
            predicates,
            schema: Arc::clone(child.get_schema()),
            child,
        }
    }
}

impl OpIterator for Filter {
    fn open(&mut self) -> Result<(), MinibaseError> {
        self.child.open()
    }

    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        while let Some(t) = self.child.next()? {
            if self.predicates.iter().all(|p| p.eval(&t, None)) {
                return Ok(Some(t));
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<(), MinibaseError> {
        self.child.close()
    }

    fn rewind(&mut self) -> Result<(), MinibaseError> {
        self.child.rewind()
    }

    fn get_schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }
}
