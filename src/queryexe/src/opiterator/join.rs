use super::{not_open, OpIterator, Predicate};
use common::{MinibaseError, TableSchema, Tuple};
use std::sync::Arc;

/// Nested loop join implementation.
///
/// For every left tuple the right child is scanned to exhaustion and then
/// rewound. Output tuples are the left values followed by the right values.
pub struct Join {
    /// Join conditions, including the common-column equalities.
    predicates: Vec<Predicate>,
    /// Left and right schemas merged into one join group.
    schema: Arc<TableSchema>,
    /// Boxed left child.
    left_child: Box<dyn OpIterator>,
    /// Boxed right child.
    right_child: Box<dyn OpIterator>,
    /// Left tuple the right child is currently matched against.
    current: Option<Tuple>,
    open: bool,
}

impl Join {
    /// Join constructor. Creates a new node for a nested-loop join.
    ///
    /// # Arguments
    ///
    /// * `predicates` - Resolved against the left and right schemas.
    /// * `left_child` - Left child of join operator.
    /// * `right_child` - Left child of join operator.
    pub fn new(
        predicates: Vec<Predicate>,
        left_child: Box<dyn OpIterator>,
        right_child: Box<dyn OpIterator>,
    ) -> Self {
        let schema = Arc::new(left_child.get_schema().merge(right_child.get_schema()));
        Self {
            predicates,
            schema,
            left_child,
            right_child,
            current: None,
            open: false,
        }
    }
}

impl OpIterator for Join {
    fn open(&mut self) -> Result<(), MinibaseError> {
        self.left_child.open()?;
        self.right_child.open()?;
        self.current = None;
        self.open = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        if !self.open {
            return Err(not_open("Join"));
        }
        loop {
            if self.current.is_none() {
                match self.left_child.next()? {
                    Some(t) => self.current = Some(t),
                    None => return Ok(None),
                }
            }
            let left = match &self.current {
                Some(t) => t,
                None => return Ok(None),
            };
            match self.right_child.next()? {
                Some(right) => {
                    if self.predicates.iter().all(|p| p.eval(left, Some(&right))) {
                        return Ok(Some(left.merge(&right, Arc::clone(&self.schema))));
                    }
                }
                None => {
                    self.right_child.rewind()?;
                    self.current = None;
                }
            }
        }
    }

    fn close(&mut self) -> Result<(), MinibaseError> {
        self.left_child.close()?;
        self.right_child.close()?;
        self.current = None;
        self.open = false;
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), MinibaseError> {
        if !self.open {
            return Err(not_open("Join"));
        }
        self.left_child.rewind()?;
        self.right_child.rewind()?;
        self.current = None;
        Ok(())
    }

    fn get_schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }
}
