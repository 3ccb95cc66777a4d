use crate::opiterator::*;
use common::catalog::Catalog;
use common::{
    Atom, Attribute, ComparisonAtom, ComparisonOp, DataType, MinibaseError, Query, TableSchema,
    Term,
};
use std::collections::HashMap;

/// Translates a conjunctive query into a left-deep tree of OpIterators.
///
/// Every relational atom gets its own alias, registered in the catalog.
/// Comparisons are split into per-alias selections and join predicates;
/// the joins follow body order.
pub struct QueryPlanner<'q> {
    query: &'q Query,
    /// Aliases in body order.
    aliases: Vec<String>,
    /// Aliases binding each query variable, in body order.
    bindings: HashMap<String, Vec<String>>,
    /// Distinct query variables in first-seen order.
    all_variables: Vec<String>,
    selections: HashMap<String, Vec<ComparisonAtom>>,
    joins: HashMap<String, Vec<ComparisonAtom>>,
}

impl<'q> QueryPlanner<'q> {
    fn new(query: &'q Query) -> Self {
        Self {
            query,
            aliases: Vec::new(),
            bindings: HashMap::new(),
            all_variables: Vec::new(),
            selections: HashMap::new(),
            joins: HashMap::new(),
        }
    }

    /// Registers the query's aliases in `catalog` and builds the operator tree.
    ///
    /// # Arguments
    ///
    /// * `query` - Query to plan.
    /// * `catalog` - Fresh catalog for this evaluation.
    pub fn from_query(
        query: &Query,
        catalog: &mut Catalog,
    ) -> Result<Box<dyn OpIterator>, MinibaseError> {
        let mut planner = QueryPlanner::new(query);
        planner.validate()?;
        planner.register_aliases(catalog)?;
        for atom in query.comparison_atoms() {
            planner.place_comparison(atom)?;
        }
        let root = planner.build_joins(catalog)?;
        let root = planner.build_head(root)?;
        info!(
            "Planned {} over {} aliases",
            query.head.name,
            planner.aliases.len()
        );
        Ok(root)
    }

    fn validate(&self) -> Result<(), MinibaseError> {
        if self.query.relational_atoms().next().is_none() {
            return Err(MinibaseError::ValidationError(format!(
                "{} has no relational atoms",
                self.query
            )));
        }
        let sum_in_body = self.query.body.iter().any(|atom| match atom {
            Atom::Relational(r) => r.terms.iter().any(|t| matches!(t, Term::SumAggregate(_))),
            Atom::Comparison(c) => {
                matches!(c.term1, Term::SumAggregate(_)) || matches!(c.term2, Term::SumAggregate(_))
            }
        });
        if sum_in_body {
            return Err(MinibaseError::ValidationError(String::from(
                "SUM may only appear in the head",
            )));
        }
        Ok(())
    }

    /// Assigns `<relation><n>` aliases and registers their columns.
    ///
    /// A constant, or a variable already bound earlier in the same atom,
    /// becomes the synthetic column `$<alias>_<i>` with an equality
    /// selection tying it to the term.
    fn register_aliases(&mut self, catalog: &mut Catalog) -> Result<(), MinibaseError> {
        let query = self.query;
        for (n, atom) in query.relational_atoms().enumerate() {
            let alias = format!("{}{}", atom.name, n);
            let mut columns: Vec<String> = Vec::new();
            for (i, term) in atom.terms.iter().enumerate() {
                match term {
                    Term::Variable(v) if !columns.contains(v) => {
                        columns.push(v.clone());
                        if !self.all_variables.contains(v) {
                            self.all_variables.push(v.clone());
                        }
                        self.bindings
                            .entry(v.clone())
                            .or_insert_with(Vec::new)
                            .push(alias.clone());
                    }
                    _ => {
                        let synthetic = format!("${}_{}", alias, i);
                        let cond = ComparisonAtom::new(
                            Term::Variable(synthetic.clone()),
                            ComparisonOp::Equals,
                            term.clone(),
                        );
                        columns.push(synthetic);
                        self.selections
                            .entry(alias.clone())
                            .or_insert_with(Vec::new)
                            .push(cond);
                    }
                }
            }
            catalog.register(&alias, &atom.name, columns)?;
            self.aliases.push(alias);
        }
        debug!("Aliases {:?}, variables {:?}", self.aliases, self.all_variables);
        Ok(())
    }

    fn aliases_binding(&self, var: &str) -> Result<&[String], MinibaseError> {
        self.bindings.get(var).map(|a| a.as_slice()).ok_or_else(|| {
            MinibaseError::ResolutionError(format!("Variable {} is not bound by any relational atom", var))
        })
    }

    /// Decides whether a comparison filters single aliases or joins them.
    fn place_comparison(&mut self, atom: &ComparisonAtom) -> Result<(), MinibaseError> {
        let targets: Vec<String>;
        let is_join: bool;
        match (atom.term1.as_variable(), atom.term2.as_variable()) {
            (None, None) => {
                targets = self.aliases.iter().take(1).cloned().collect();
                is_join = false;
            }
            (Some(v), None) | (None, Some(v)) => {
                targets = self.aliases_binding(v)?.to_vec();
                is_join = false;
            }
            (Some(a), Some(b)) => {
                let bind_a = self.aliases_binding(a)?;
                let bind_b = self.aliases_binding(b)?;
                let both: Vec<String> = bind_a.iter().filter(|x| bind_b.contains(*x)).cloned().collect();
                if !both.is_empty() {
                    targets = both;
                    is_join = false;
                } else {
                    targets = self
                        .aliases
                        .iter()
                        .filter(|x| bind_a.contains(*x) || bind_b.contains(*x))
                        .cloned()
                        .collect();
                    is_join = true;
                }
            }
        }
        debug!(
            "{} is a {} condition on {:?}",
            atom,
            if is_join { "join" } else { "selection" },
            targets
        );
        let map = if is_join {
            &mut self.joins
        } else {
            &mut self.selections
        };
        for alias in targets {
            map.entry(alias).or_insert_with(Vec::new).push(atom.clone());
        }
        Ok(())
    }

    /// Scan of one alias, filtered by its selections if it has any.
    fn scan_and_select(
        &self,
        catalog: &Catalog,
        alias: &str,
    ) -> Result<Box<dyn OpIterator>, MinibaseError> {
        let scan: Box<dyn OpIterator> = Box::new(SeqScan::new(catalog, alias)?);
        match self.selections.get(alias) {
            Some(conds) if !conds.is_empty() => {
                let predicates = conds
                    .iter()
                    .map(|c| Predicate::for_selection(c, alias, scan.get_schema()))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(Filter::new(predicates, scan)))
            }
            _ => Ok(scan),
        }
    }

    /// Left-deep joins in body order.
    fn build_joins(&self, catalog: &Catalog) -> Result<Box<dyn OpIterator>, MinibaseError> {
        let empty = Vec::new();
        let first = &self.aliases[0];
        let mut root = self.scan_and_select(catalog, first)?;
        let mut running: Vec<ComparisonAtom> = self.joins.get(first).unwrap_or(&empty).clone();
        // Conditions already turned into join predicates.
        let mut consumed: Vec<ComparisonAtom> = Vec::new();

        for alias in self.aliases.iter().skip(1) {
            let right = self.scan_and_select(catalog, alias)?;
            let table_conds = self.joins.get(alias).unwrap_or(&empty);
            let left_schema = root.get_schema();
            let right_schema = right.get_schema();

            let necessary: Vec<ComparisonAtom> = running
                .iter()
                .filter(|c| table_conds.contains(*c))
                .filter(|c| resolvable(c, left_schema, right_schema))
                .cloned()
                .collect();
            let mut predicates = necessary
                .iter()
                .map(|c| Predicate::for_join(c, left_schema, right_schema))
                .collect::<Result<Vec<_>, _>>()?;

            let mut common: Vec<&str> = Vec::new();
            for attr in right_schema.attributes() {
                let column = attr.column();
                if left_schema.contains_column(column) && !common.contains(&column) {
                    common.push(column);
                }
            }
            for column in common.iter() {
                predicates.push(Predicate::common_column(column, left_schema, right_schema)?);
            }
            debug!(
                "Joining {} on {:?} with common columns {:?}",
                alias,
                necessary.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
                common
            );

            running.retain(|c| !necessary.contains(c));
            consumed.extend(necessary);
            for c in table_conds.iter() {
                if !consumed.contains(c) && !running.contains(c) {
                    running.push(c.clone());
                }
            }
            root = Box::new(Join::new(predicates, root, right));
        }

        if let Some(c) = running.first() {
            return Err(MinibaseError::ResolutionError(format!(
                "Join condition {} could not be placed",
                c
            )));
        }
        Ok(root)
    }

    /// Aggregation, or projection plus duplicate elimination, as the head needs.
    fn build_head(&self, root: Box<dyn OpIterator>) -> Result<Box<dyn OpIterator>, MinibaseError> {
        let head = &self.query.head;
        if let Some(agg) = &head.agg {
            let schema = root.get_schema();
            let group_by = head
                .variables
                .iter()
                .map(|v| column_slot(v, schema))
                .collect::<Result<Vec<_>, _>>()?;
            let products = agg
                .product_terms
                .iter()
                .map(|t| match t {
                    Term::Variable(v) => column_slot(v, schema).map(Operand::Left),
                    Term::IntegerConstant(i) => Ok(Operand::Literal(common::Field::IntField(*i))),
                    other => Err(MinibaseError::ValidationError(format!(
                        "Cannot multiply {} in a SUM",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let sum_attr = Attribute::new(&head.name, "SUM", DataType::Int);
            return Ok(Box::new(SumAggregate::new(group_by, products, sum_attr, root)?));
        }
        if head.variables == self.all_variables {
            let exact = root
                .get_schema()
                .attributes()
                .map(|a| a.column())
                .eq(head.variables.iter().map(|v| v.as_str()));
            if exact {
                debug!("Head lists every column in order, skipping projection");
                return Ok(root);
            }
            // Only columns equal to a head variable or a constant are dropped,
            // so no duplicates can appear.
            debug!("Dropping join and constant columns without duplicate elimination");
            return Ok(Box::new(ProjectIterator::from_columns(&head.variables, root)?));
        }
        let project = ProjectIterator::from_columns(&head.variables, root)?;
        Ok(Box::new(Distinct::new(Box::new(project))))
    }
}

fn column_slot(var: &str, schema: &TableSchema) -> Result<usize, MinibaseError> {
    schema.get_column_index(var).copied().ok_or_else(|| {
        MinibaseError::ResolutionError(format!("Head variable {} is not bound in the body", var))
    })
}

/// True when every variable of the comparison is a column of either side.
fn resolvable(atom: &ComparisonAtom, left: &TableSchema, right: &TableSchema) -> bool {
    atom.variables()
        .all(|v| left.contains_column(v) || right.contains_column(v))
}
