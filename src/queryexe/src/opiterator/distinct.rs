use super::{drain, not_open, OpIterator};
use common::{MinibaseError, TableSchema, Tuple};
use std::collections::HashSet;
use std::sync::Arc;

/// Keeps the first occurrence of every tuple, in input order.
pub fn distinct_tuples(tuples: Vec<Tuple>) -> Vec<Tuple> {
    let mut seen = HashSet::new();
    tuples
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Duplicate elimination over the fully materialized output of its child.
pub struct Distinct {
    schema: Arc<TableSchema>,
    child: Box<dyn OpIterator>,
    /// Distinct tuples, filled on open.
    tuples: Vec<Tuple>,
    /// Next tuple to emit, or None when closed.
    index: Option<usize>,
}

impl Distinct {
    pub fn new(child: Box<dyn OpIterator>) -> Self {
        Self {
            schema: Arc::clone(child.get_schema()),
            child,
            tuples: Vec::new(),
            index: None,
        }
    }
}

impl OpIterator for Distinct {
    /// Drains the child and keeps first occurrences.
    fn open(&mut self) -> Result<(), MinibaseError> {
        self.child.open()?;
        let all = drain(self.child.as_mut())?;
        let total = all.len();
        self.tuples = distinct_tuples(all);
        debug!("Distinct kept {} of {} tuples", self.tuples.len(), total);
        self.index = Some(0);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        let i = self.index.ok_or_else(|| not_open("Distinct"))?;
        let tuple = self.tuples.get(i).cloned();
        if tuple.is_some() {
            self.index = Some(i + 1);
        }
        Ok(tuple)
    }

    fn close(&mut self) -> Result<(), MinibaseError> {
        self.tuples.clear();
        self.index = None;
        self.child.close()
    }

    /// Replays the materialized tuples without pulling the child again.
    fn rewind(&mut self) -> Result<(), MinibaseError> {
        if self.index.is_none() {
            return Err(not_open("Distinct"));
        }
        self.index = Some(0);
        Ok(())
    }

    fn get_schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::opiterator::{int_tuple_iterator, TupleIterator};
    use common::testutil::*;

    #[test]
    fn test_first_occurrence_order() -> Result<(), MinibaseError> {
        let child = int_tuple_iterator(vec![vec![2], vec![1], vec![2], vec![3], vec![1]], 1);
        let mut distinct = Distinct::new(Box::new(child));
        distinct.open()?;
        assert_eq!(create_tuple_list(vec![vec![2], vec![1], vec![3]]), drain(&mut distinct)?);
        distinct.rewind()?;
        assert_eq!(Some(int_vec_to_tuple(vec![2])), distinct.next()?);
        Ok(())
    }

    #[test]
    fn test_idempotent() -> Result<(), MinibaseError> {
        let rows = vec![vec![1, 1], vec![1, 2], vec![1, 1], vec![2, 1], vec![1, 2]];
        let input = create_tuple_list(rows.clone());
        let mut once = Distinct::new(Box::new(int_tuple_iterator(rows, 2)));
        once.open()?;
        let first = drain(&mut once)?;
        assert!(first.len() <= input.len());

        let schema = Arc::clone(once.get_schema());
        let mut twice = Distinct::new(Box::new(TupleIterator::new(first.clone(), schema)));
        twice.open()?;
        assert_eq!(first, drain(&mut twice)?);
        Ok(())
    }

    #[test]
    fn test_lengths_differ() {
        let tuples = vec![int_vec_to_tuple(vec![1]), int_vec_to_tuple(vec![1, 1])];
        assert_eq!(2, distinct_tuples(tuples).len());
    }

    #[test]
    fn test_next_before_open() {
        let mut distinct = Distinct::new(Box::new(int_tuple_iterator(vec![vec![1]], 1)));
        assert!(distinct.next().is_err());
    }
}
