use crate::Field;
use std::fmt;

/// A term of a conjunctive query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Term {
    Variable(String),
    IntegerConstant(i64),
    StringConstant(String),
    /// Only ever used as a head decoration.
    SumAggregate(SumAggregate),
}

impl Term {
    /// Creates a variable term.
    pub fn var(name: &str) -> Self {
        Term::Variable(name.to_string())
    }

    /// Creates a string constant term.
    pub fn string(value: &str) -> Self {
        Term::StringConstant(value.to_string())
    }

    /// Returns the variable name, if the term is a variable.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Converts a constant term into the field value it denotes.
    pub fn to_field(&self) -> Option<Field> {
        match self {
            Term::IntegerConstant(i) => Some(Field::IntField(*i)),
            Term::StringConstant(s) => Some(Field::StringField(s.clone())),
            _ => None,
        }
    }
}

impl PartialEq for Term {
    /// Structural equality, except that a sum aggregate equals anything.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::SumAggregate(_), _) | (_, Term::SumAggregate(_)) => true,
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::IntegerConstant(a), Term::IntegerConstant(b)) => a == b,
            (Term::StringConstant(a), Term::StringConstant(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "{}", name),
            Term::IntegerConstant(i) => write!(f, "{}", i),
            Term::StringConstant(s) => write!(f, "'{}'", s),
            Term::SumAggregate(agg) => write!(f, "{}", agg),
        }
    }
}

/// `SUM(t1 * t2 * ...)` over the product of its terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumAggregate {
    pub product_terms: Vec<Term>,
}

impl SumAggregate {
    pub fn new(product_terms: Vec<Term>) -> Self {
        Self { product_terms }
    }

    /// Variables referenced by the product terms.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.product_terms.iter().filter_map(|t| t.as_variable())
    }
}

impl fmt::Display for SumAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.product_terms.iter().map(|t| t.to_string()).collect();
        write!(f, "SUM({})", terms.join(" * "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Term::var("x"), Term::var("x"));
        assert_ne!(Term::var("x"), Term::var("y"));
        assert_ne!(Term::IntegerConstant(1), Term::string("1"));
        assert_ne!(Term::var("a"), Term::string("a"));
    }

    #[test]
    fn test_sum_aggregate_equals_anything() {
        let agg = Term::SumAggregate(SumAggregate::new(vec![Term::var("x")]));
        assert_eq!(agg, Term::IntegerConstant(7));
        assert_eq!(Term::var("q"), agg);
    }

    #[test]
    fn test_display() {
        assert_eq!("'abc'", Term::string("abc").to_string());
        assert_eq!("-4", Term::IntegerConstant(-4).to_string());
        let agg = SumAggregate::new(vec![Term::var("x"), Term::IntegerConstant(2)]);
        assert_eq!("SUM(x * 2)", agg.to_string());
    }
}
