use super::Term;
use crate::Field;
use std::fmt;

/// Comparison operators usable in a comparison atom.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equals,
    NotEq,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
}

impl ComparisonOp {
    /// Do predicate comparison.
    ///
    /// # Arguments
    ///
    /// * `left_field` - Left field of the predicate.
    /// * `right_field` - Right field of the predicate.
    pub fn compare<T: Ord>(&self, left_field: &T, right_field: &T) -> bool {
        match self {
            ComparisonOp::Equals => left_field == right_field,
            ComparisonOp::GreaterThan => left_field > right_field,
            ComparisonOp::LessThan => left_field < right_field,
            ComparisonOp::LessThanOrEq => left_field <= right_field,
            ComparisonOp::GreaterThanOrEq => left_field >= right_field,
            ComparisonOp::NotEq => left_field != right_field,
        }
    }

    /// Compares two values of the same dtype. Values of different dtypes
    /// never satisfy any operator.
    pub fn compare_fields(&self, left: &Field, right: &Field) -> bool {
        match (left, right) {
            (Field::IntField(l), Field::IntField(r)) => self.compare(l, r),
            (Field::StringField(l), Field::StringField(r)) => self.compare(l, r),
            _ => false,
        }
    }

    /// Parses the textual operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(ComparisonOp::Equals),
            "!=" => Some(ComparisonOp::NotEq),
            ">" => Some(ComparisonOp::GreaterThan),
            ">=" => Some(ComparisonOp::GreaterThanOrEq),
            "<" => Some(ComparisonOp::LessThan),
            "<=" => Some(ComparisonOp::LessThanOrEq),
            _ => None,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            ComparisonOp::Equals => "=",
            ComparisonOp::NotEq => "!=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEq => ">=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEq => "<=",
        };
        write!(f, "{}", op_str)
    }
}

/// `name(t1, ..., tn)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationalAtom {
    pub name: String,
    pub terms: Vec<Term>,
}

impl RelationalAtom {
    pub fn new(name: &str, terms: Vec<Term>) -> Self {
        Self {
            name: name.to_string(),
            terms,
        }
    }

    /// Variables of the atom in positional order, repeats included.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(|t| t.as_variable())
    }
}

impl fmt::Display for RelationalAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        write!(f, "{}({})", self.name, terms.join(", "))
    }
}

/// `term1 op term2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonAtom {
    pub term1: Term,
    pub term2: Term,
    pub op: ComparisonOp,
}

impl ComparisonAtom {
    pub fn new(term1: Term, op: ComparisonOp, term2: Term) -> Self {
        Self { term1, term2, op }
    }

    /// Variables referenced by either operand.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.term1
            .as_variable()
            .into_iter()
            .chain(self.term2.as_variable())
    }
}

impl fmt::Display for ComparisonAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.term1, self.op, self.term2)
    }
}

/// A body atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Atom {
    Relational(RelationalAtom),
    Comparison(ComparisonAtom),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Relational(a) => write!(f, "{}", a),
            Atom::Comparison(a) => write!(f, "{}", a),
        }
    }
}
