#[macro_use]
extern crate log;

mod homomorphism;

pub use homomorphism::find_homomorphism;

use common::parser::parse_query_file;
use common::{Atom, MinibaseError, Query, RelationalAtom, Term};
use std::fs;
use std::path::Path;

/// Removes redundant relational atoms from the body of `query`.
///
/// Exact duplicates go first. After that every pass looks for one atom whose
/// removal keeps the head covered and still admits a homomorphism from the
/// current body into the smaller one; the first such atom is dropped and the
/// pass restarts. Atoms are tried from the end of the body, so among
/// equivalent candidates the earlier atoms survive.
pub fn minimize(query: &Query) -> Result<Query, MinibaseError> {
    let mut body = relational_body(query)?;
    let before = body.len();
    remove_duplicates(&mut body);
    if body.len() < before {
        debug!("Removed {} duplicate atoms", before - body.len());
    }

    let head_vars = query.head.all_variables();
    while let Some(i) = find_redundant(&body, &head_vars) {
        debug!("{} is redundant", body[i]);
        body.remove(i);
    }

    Ok(Query::new(
        query.head.clone(),
        body.into_iter().map(Atom::Relational).collect(),
    ))
}

/// Minimizes the query in `input` and writes it to `output` as a single line.
pub fn minimize_file(input: &Path, output: &Path) -> Result<Query, MinibaseError> {
    let query = parse_query_file(input)?;
    info!("Minimizing {}", query);
    let minimized = minimize(&query)?;
    fs::write(output, format!("{}\n", minimized))?;
    info!("Wrote {} to {:?}", minimized, output);
    Ok(minimized)
}

fn relational_body(query: &Query) -> Result<Vec<RelationalAtom>, MinibaseError> {
    query
        .body
        .iter()
        .map(|atom| match atom {
            Atom::Relational(a) if a.terms.iter().all(|t| !matches!(t, Term::SumAggregate(_))) => {
                Ok(a.clone())
            }
            other => Err(MinibaseError::ValidationError(format!(
                "Only relational atoms can be minimized, got {}",
                other
            ))),
        })
        .collect()
}

fn remove_duplicates(body: &mut Vec<RelationalAtom>) {
    let mut kept: Vec<RelationalAtom> = Vec::with_capacity(body.len());
    for atom in body.drain(..) {
        if !kept.contains(&atom) {
            kept.push(atom);
        }
    }
    *body = kept;
}

/// Index of an atom that can be dropped from `body`, if any.
fn find_redundant(body: &[RelationalAtom], head_vars: &[&str]) -> Option<usize> {
    (0..body.len()).rev().find(|i| {
        let mut candidate = body.to_vec();
        candidate.remove(*i);
        let covered = head_vars
            .iter()
            .all(|v| candidate.iter().any(|a| a.variables().any(|w| w == *v)));
        covered && find_homomorphism(body, &candidate, head_vars).is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::parser::parse_query;
    use common::testutil::*;

    fn minimized(text: &str) -> Result<String, MinibaseError> {
        Ok(minimize(&parse_query(text)?)?.to_string())
    }

    #[test]
    fn test_duplicate_atoms() -> Result<(), MinibaseError> {
        init();
        assert_eq!("Q(x) :- R(x, y)", minimized("Q(x):-R(x,y),R(x,y)")?);
        Ok(())
    }

    #[test]
    fn test_redundant_atom() -> Result<(), MinibaseError> {
        assert_eq!("Q(x) :- R(x, y)", minimized("Q(x):-R(x,y),R(x,z)")?);
        Ok(())
    }

    #[test]
    fn test_head_variable_keeps_atom() -> Result<(), MinibaseError> {
        let text = "Q(y, z) :- R(x, y), R(x, z)";
        assert_eq!("Q(y, z) :- R(x, y), R(x, z)", minimized(text)?);
        Ok(())
    }

    #[test]
    fn test_head_variables_map_to_themselves() -> Result<(), MinibaseError> {
        // Mapping y to x would fold R(y, x) onto R(x, x), but Q(x, y) must keep y.
        let text = "Q(x, y) :- R(x, y), R(y, x), R(x, x)";
        assert_eq!("Q(x, y) :- R(x, y), R(y, x), R(x, x)", minimized(text)?);
        Ok(())
    }

    #[test]
    fn test_already_minimal() -> Result<(), MinibaseError> {
        let text = "Q(a) :- E(a, b), E(b, c)";
        assert_eq!("Q(a) :- E(a, b), E(b, c)", minimized(text)?);
        Ok(())
    }

    #[test]
    fn test_constants() -> Result<(), MinibaseError> {
        assert_eq!(
            "Q(x) :- R(x, 4), S(z, 'a')",
            minimized("Q(x) :- R(x, y), R(x, 4), S(z, 'a'), S(w, 'a')")?
        );
        assert_eq!(
            "Q(x) :- R(x, 'a'), R(x, 'b')",
            minimized("Q(x) :- R(x, 'a'), R(x, 'b')")?
        );
        Ok(())
    }

    #[test]
    fn test_longer_chain() -> Result<(), MinibaseError> {
        let text = "Q() :- R(u, v), R(v, w), R(a, b), R(b, c), R(c, d)";
        let q = minimize(&parse_query(text)?)?;
        assert_eq!(3, q.body.len());
        Ok(())
    }

    #[test]
    fn test_sum_variables_are_covered() -> Result<(), MinibaseError> {
        let text = "Q(x, SUM(z)) :- R(x, y), R(x, z)";
        assert_eq!("Q(x, SUM(z)) :- R(x, z)", minimized(text)?);
        Ok(())
    }

    #[test]
    fn test_soundness_and_idempotence() -> Result<(), MinibaseError> {
        let queries = [
            "Q(x) :- R(x, y), S(y, z), S(y, w), R(x, 3)",
            "Q(a, b) :- T(a, b, c), T(a, b, d), T(a, e, c), U(a)",
            "Q() :- R(x, x), R(y, z), R(z, y)",
            "Q(x, SUM(x * 2)) :- P(x, 'k'), P(x, y), P(x, y)",
        ];
        for text in queries.iter() {
            let original = parse_query(text)?;
            let once = minimize(&original)?;
            for atom in once.body.iter() {
                assert!(original.body.contains(atom), "{} not in {}", atom, original);
            }
            let body_vars = once.body_variables();
            for v in original.head.all_variables() {
                assert!(body_vars.contains(&v), "{} lost in {}", v, once);
            }
            assert_eq!(once, minimize(&once)?);
        }
        Ok(())
    }

    #[test]
    fn test_comparison_rejected() -> Result<(), MinibaseError> {
        let query = parse_query("Q(x) :- R(x, y), x > 3")?;
        assert!(matches!(minimize(&query), Err(MinibaseError::ValidationError(_))));
        Ok(())
    }

    #[test]
    fn test_minimize_file() -> Result<(), MinibaseError> {
        let dir = gen_random_dir();
        fs::create_dir_all(&dir)?;
        let input = dir.join("query.txt");
        let output = dir.join("out.txt");
        fs::write(&input, "Q(x) :- R(x, y), R(x, z), S(x)\n")?;
        let res = minimize_file(&input, &output);
        let written = fs::read_to_string(&output);
        fs::remove_dir_all(&dir)?;
        assert_eq!("Q(x) :- R(x, y), S(x)", res?.to_string());
        assert_eq!("Q(x) :- R(x, y), S(x)\n", written?);
        Ok(())
    }

    #[test]
    fn test_minimize_missing_file() {
        let dir = gen_random_dir();
        let res = minimize_file(&dir.join("missing.txt"), &dir.join("out.txt"));
        assert!(matches!(res, Err(MinibaseError::IOError(_))));
    }
}
