use super::{drain, not_open, OpIterator, Operand};
use common::{Attribute, DataType, Field, MinibaseError, TableSchema, Tuple};
use std::collections::HashMap;
use std::sync::Arc;

/// Sum of products, grouped by a list of slots.
///
/// Groups are emitted in the order their first tuple arrived. Every input
/// tuple contributes the product of its product operands to its group.
pub struct SumAggregate {
    group_by: Vec<usize>,
    /// Integer slots or integer literals multiplied per tuple.
    products: Vec<Operand>,
    schema: Arc<TableSchema>,
    child: Box<dyn OpIterator>,
    /// Aggregated rows, filled on open.
    results: Vec<Tuple>,
    index: Option<usize>,
}

impl SumAggregate {
    /// Aggregate constructor.
    ///
    /// # Arguments
    ///
    /// * `group_by` - Slots of the child's schema to group by.
    /// * `products` - Int slots of the child or int literals.
    /// * `sum_attr` - Attribute naming the sum column.
    /// * `child` - Child OpIterator.
    pub fn new(
        group_by: Vec<usize>,
        products: Vec<Operand>,
        sum_attr: Attribute,
        child: Box<dyn OpIterator>,
    ) -> Result<Self, MinibaseError> {
        let child_schema = child.get_schema();
        for operand in products.iter() {
            let ok = match operand {
                Operand::Left(i) => child_schema
                    .get_attribute(*i)
                    .map_or(false, |a| *a.dtype() == DataType::Int),
                Operand::Literal(f) => f.dtype() == DataType::Int,
                Operand::Right(_) => false,
            };
            if !ok {
                return Err(MinibaseError::ValidationError(format!(
                    "SUM can only multiply int columns and int constants, got {:?}",
                    operand
                )));
            }
        }
        let mut attrs = group_by
            .iter()
            .map(|i| {
                child_schema.get_attribute(*i).cloned().ok_or_else(|| {
                    MinibaseError::ResolutionError(format!("No slot {} to group by", i))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        attrs.push(sum_attr);
        Ok(Self {
            group_by,
            products,
            schema: Arc::new(TableSchema::new(attrs)),
            child,
            results: Vec::new(),
            index: None,
        })
    }

    fn product(&self, t: &Tuple) -> Result<i64, MinibaseError> {
        let mut acc: i64 = 1;
        for operand in self.products.iter() {
            let value = match operand {
                Operand::Left(i) => t.get_field(*i),
                Operand::Literal(f) => Some(f),
                Operand::Right(_) => None,
            };
            match value {
                Some(Field::IntField(v)) => {
                    acc = acc.checked_mul(*v).ok_or_else(overflow)?;
                }
                other => {
                    return Err(MinibaseError::ExecutionError(format!(
                        "Expected an int to sum, found {:?}",
                        other
                    )))
                }
            }
        }
        Ok(acc)
    }
}

fn overflow() -> MinibaseError {
    MinibaseError::ExecutionError(String::from("SUM overflowed"))
}

impl OpIterator for SumAggregate {
    fn open(&mut self) -> Result<(), MinibaseError> {
        self.child.open()?;
        let input = drain(self.child.as_mut())?;
        let mut groups: HashMap<Vec<Field>, usize> = HashMap::new();
        let mut rows: Vec<(Vec<Field>, i64)> = Vec::new();
        for t in input.iter() {
            let key: Vec<Field> = self
                .group_by
                .iter()
                .filter_map(|i| t.get_field(*i).cloned())
                .collect();
            let value = self.product(t)?;
            let slot = *groups.entry(key.clone()).or_insert_with(|| {
                rows.push((key, 0));
                rows.len() - 1
            });
            rows[slot].1 = rows[slot].1.checked_add(value).ok_or_else(overflow)?;
        }
        debug!("Aggregated {} tuples into {} groups", input.len(), rows.len());
        self.results = rows
            .into_iter()
            .map(|(mut key, sum)| {
                key.push(Field::IntField(sum));
                Tuple::new(key, Arc::clone(&self.schema))
            })
            .collect();
        self.index = Some(0);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>, MinibaseError> {
        let i = self.index.ok_or_else(|| not_open("SumAggregate"))?;
        let tuple = self.results.get(i).cloned();
        if tuple.is_some() {
            self.index = Some(i + 1);
        }
        Ok(tuple)
    }

    fn close(&mut self) -> Result<(), MinibaseError> {
        self.results.clear();
        self.index = None;
        self.child.close()
    }

    fn rewind(&mut self) -> Result<(), MinibaseError> {
        if self.index.is_none() {
            return Err(not_open("SumAggregate"));
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

    fn sum_attr() -> Attribute {
        Attribute::new("Q", "SUM", DataType::Int)
    }

    #[test]
    fn test_grouped_sum_of_products() -> Result<(), MinibaseError> {
        let child = int_tuple_iterator(
            vec![vec![2, 3, 4], vec![1, 1, 1], vec![2, 5, 1], vec![1, 2, 2]],
            3,
        );
        let mut agg = SumAggregate::new(
            vec![0],
            vec![Operand::Left(1), Operand::Left(2)],
            sum_attr(),
            Box::new(child),
        )?;
        agg.open()?;
        assert_eq!(create_tuple_list(vec![vec![2, 17], vec![1, 5]]), drain(&mut agg)?);
        let labels: Vec<&str> = agg.get_schema().attributes().map(|a| a.name()).collect();
        assert_eq!(vec!["T.c0", "Q.SUM"], labels);
        Ok(())
    }

    #[test]
    fn test_bag_semantics_and_constants() -> Result<(), MinibaseError> {
        let child = int_tuple_iterator(vec![vec![1], vec![1], vec![4]], 1);
        let mut agg = SumAggregate::new(
            Vec::new(),
            vec![Operand::Left(0), Operand::Literal(Field::IntField(10))],
            sum_attr(),
            Box::new(child),
        )?;
        agg.open()?;
        assert_eq!(Some(int_vec_to_tuple(vec![60])), agg.next()?);
        assert_eq!(None, agg.next()?);
        Ok(())
    }

    #[test]
    fn test_empty_input() -> Result<(), MinibaseError> {
        let child = int_tuple_iterator(Vec::new(), 1);
        let mut agg = SumAggregate::new(Vec::new(), vec![Operand::Left(0)], sum_attr(), Box::new(child))?;
        agg.open()?;
        assert_eq!(None, agg.next()?);
        Ok(())
    }

    #[test]
    fn test_string_column_rejected() {
        let schema = Arc::new(TableSchema::from_vecs("R0", vec!["s"], vec![DataType::String]));
        let child = TupleIterator::new(Vec::new(), schema);
        let res = SumAggregate::new(Vec::new(), vec![Operand::Left(0)], sum_attr(), Box::new(child));
        assert!(matches!(res, Err(MinibaseError::ValidationError(_))));
    }
}
