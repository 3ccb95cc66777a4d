use super::OpIterator;
use common::{Attribute, MinibaseError, TableSchema, Tuple};
use std::sync::Arc;

/// Projection operator.
///
/// Keeps the child's values at the given slots, in the given order.
/// Repeated slots are allowed.
pub struct ProjectIterator {
    /// Slots of the child's tuples to keep.
    indices: Vec<usize>,
    schema: Arc<TableSchema>,
    child: Box<dyn OpIterator>,
}

impl ProjectIterator {
    /// Constructor for the projection operator.
    ///
    /// # Arguments
    ///
    /// * `indices` - Slots of the child's schema to output.
    /// * `child` - Child OpIterator.
    pub fn new(indices: Vec<usize>, child: Box<dyn OpIterator>) -> Result<Self, MinibaseError> {
        let child_schema = child.get_schema();
        let attrs = indices
            .iter()
            .map(|i| {
                child_schema.get_attribute(*i).cloned().ok_or_else(|| {
                    MinibaseError::ResolutionError(format!("No slot {} to project", i))
                })
            })
            .collect::<Result<Vec<Attribute>, _>>()?;
        Ok(Self {
            indices,
            schema: Arc::new(TableSchema::new(attrs)),
            child,
        })
    }

    /// Projects onto columns named by variable, resolved against every
    /// alias of the child's join group.
    pub fn from_columns(columns: &[String], child: Box<dyn OpIterator>) -> Result<Self, MinibaseError> {
        let indices = columns
            .iter()
            .map(|c| {
                child.get_schema().get_column_index(c).copied().ok_or_else(|| {
                    MinibaseError::ResolutionError(format!("Cannot project unbound variable {}", c))
                })
            })
            .collect::<Result<Vec<usize>, _>>()?;
        Self::new(indices, child)
    }
}

impl OpIterator for ProjectIterator {
    fn open(&mut self) -> Result<(), MinibaseError> {
        self.child.open()
    }

    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        match self.child.next()? {
            Some(t) => {
                let fields = self
                    .indices
                    .iter()
                    .map(|i| {
                        t.get_field(*i).cloned().ok_or_else(|| {
                            MinibaseError::ExecutionError(format!("Tuple {} has no slot {}", t, i))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(Tuple::new(fields, Arc::clone(&self.schema))))
            }
            None => Ok(None),
        }
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
