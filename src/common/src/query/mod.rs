pub use atom::*;
pub use term::*;

mod atom;
mod term;

use std::fmt;

/// Output schema of a query: a name, its variables and an optional sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub name: String,
    pub variables: Vec<String>,
    pub agg: Option<SumAggregate>,
}

impl Head {
    pub fn new(name: &str, variables: Vec<&str>, agg: Option<SumAggregate>) -> Self {
        Self {
            name: name.to_string(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            agg,
        }
    }

    /// Head variables followed by the variables of the sum, if any.
    pub fn all_variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = self.variables.iter().map(|v| v.as_str()).collect();
        if let Some(agg) = &self.agg {
            vars.extend(agg.variables());
        }
        vars
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms: Vec<String> = self.variables.clone();
        if let Some(agg) = &self.agg {
            terms.push(agg.to_string());
        }
        write!(f, "{}({})", self.name, terms.join(", "))
    }
}

/// A conjunctive query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub head: Head,
    pub body: Vec<Atom>,
}

impl Query {
    pub fn new(head: Head, body: Vec<Atom>) -> Self {
        Self { head, body }
    }

    /// Relational atoms of the body in body order.
    pub fn relational_atoms(&self) -> impl Iterator<Item = &RelationalAtom> {
        self.body.iter().filter_map(|a| match a {
            Atom::Relational(r) => Some(r),
            _ => None,
        })
    }

    /// Comparison atoms of the body in body order.
    pub fn comparison_atoms(&self) -> impl Iterator<Item = &ComparisonAtom> {
        self.body.iter().filter_map(|a| match a {
            Atom::Comparison(c) => Some(c),
            _ => None,
        })
    }

    /// Distinct variables of the relational atoms, in first-seen order.
    pub fn body_variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::new();
        for v in self.relational_atoms().flat_map(|a| a.variables()) {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        vars
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms: Vec<String> = self.body.iter().map(|a| a.to_string()).collect();
        write!(f, "{} :- {}", self.head, atoms.join(", "))
    }
}
