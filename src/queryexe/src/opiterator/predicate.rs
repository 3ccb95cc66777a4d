use common::{ComparisonAtom, ComparisonOp, Field, MinibaseError, TableSchema, Term, Tuple};

/// Where one side of a predicate takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Slot of the left (or only) input tuple.
    Left(usize),
    /// Slot of the right input tuple of a join.
    Right(usize),
    Literal(Field),
}

impl Operand {
    fn resolve<'t>(&'t self, left: &'t Tuple, right: Option<&'t Tuple>) -> Option<&'t Field> {
        match self {
            Operand::Left(i) => left.get_field(*i),
            Operand::Right(i) => right.and_then(|t| t.get_field(*i)),
            Operand::Literal(f) => Some(f),
        }
    }
}

/// `left op right` with both operands resolved to slots or literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub left: Operand,
    pub op: ComparisonOp,
    pub right: Operand,
}

impl Predicate {
    pub fn new(left: Operand, op: ComparisonOp, right: Operand) -> Self {
        Self { left, op, right }
    }

    /// Resolves a comparison whose variables are columns of `alias`.
    ///
    /// # Arguments
    ///
    /// * `atom` - Comparison to resolve.
    /// * `alias` - Alias qualifying every variable of the comparison.
    /// * `schema` - Schema of the filtered stream.
    pub fn for_selection(
        atom: &ComparisonAtom,
        alias: &str,
        schema: &TableSchema,
    ) -> Result<Self, MinibaseError> {
        let resolve = |term: &Term| -> Result<Operand, MinibaseError> {
            match term {
                Term::Variable(v) => {
                    let label = format!("{}.{}", alias, v);
                    schema
                        .get_field_index(&label)
                        .map(|i| Operand::Left(*i))
                        .ok_or_else(|| {
                            MinibaseError::ResolutionError(format!("No column {} for {}", label, atom))
                        })
                }
                _ => literal(term),
            }
        };
        Ok(Self::new(resolve(&atom.term1)?, atom.op, resolve(&atom.term2)?))
    }

    /// Resolves a comparison across the two sides of a join. Each variable
    /// is looked up by column name in the left join group first, then in
    /// the right one.
    pub fn for_join(
        atom: &ComparisonAtom,
        left: &TableSchema,
        right: &TableSchema,
    ) -> Result<Self, MinibaseError> {
        let resolve = |term: &Term| -> Result<Operand, MinibaseError> {
            match term {
                Term::Variable(v) => {
                    if let Some(i) = left.get_column_index(v) {
                        Ok(Operand::Left(*i))
                    } else if let Some(i) = right.get_column_index(v) {
                        Ok(Operand::Right(*i))
                    } else {
                        Err(MinibaseError::ResolutionError(format!(
                            "Variable {} of {} is not bound by either side of the join",
                            v, atom
                        )))
                    }
                }
                _ => literal(term),
            }
        };
        Ok(Self::new(resolve(&atom.term1)?, atom.op, resolve(&atom.term2)?))
    }

    /// Equality between the first columns named `column` on each side.
    pub fn common_column(
        column: &str,
        left: &TableSchema,
        right: &TableSchema,
    ) -> Result<Self, MinibaseError> {
        let missing = || {
            MinibaseError::ResolutionError(format!("Column {} is not on both sides of the join", column))
        };
        let l = left.get_column_index(column).ok_or_else(missing)?;
        let r = right.get_column_index(column).ok_or_else(missing)?;
        Ok(Self::new(Operand::Left(*l), ComparisonOp::Equals, Operand::Right(*r)))
    }

    /// Evaluates the predicate. Unresolvable operands and operands of
    /// different dtypes yield false.
    pub fn eval(&self, left: &Tuple, right: Option<&Tuple>) -> bool {
        match (self.left.resolve(left, right), self.right.resolve(left, right)) {
            (Some(l), Some(r)) => self.op.compare_fields(l, r),
            _ => false,
        }
    }
}

fn literal(term: &Term) -> Result<Operand, MinibaseError> {
    term.to_field().map(Operand::Literal).ok_or_else(|| {
        MinibaseError::ValidationError(format!("{} cannot be used in a comparison", term))
    })
}
