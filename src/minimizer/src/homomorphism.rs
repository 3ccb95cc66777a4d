use common::{RelationalAtom, Term};
use std::collections::HashMap;

/// Searches for a homomorphism from `source` into `target`.
///
/// Variables of `source` are assigned, one at a time, to terms that occur in
/// `target`; variables listed in `pinned` always map to themselves. An atom
/// is checked as soon as its last variable is assigned, so a partial
/// assignment is abandoned the moment one of its atoms falls outside
/// `target`. The search keeps an explicit stack of candidate positions
/// instead of recursing.
///
/// Returns the mapping of every unpinned variable, or None.
pub fn find_homomorphism(
    source: &[RelationalAtom],
    target: &[RelationalAtom],
    pinned: &[&str],
) -> Option<HashMap<String, Term>> {
    let mut vars: Vec<&str> = Vec::new();
    for v in source.iter().flat_map(|a| a.variables()) {
        if !pinned.contains(&v) && !vars.contains(&v) {
            vars.push(v);
        }
    }
    let position: HashMap<&str, usize> = vars.iter().enumerate().map(|(i, v)| (*v, i)).collect();

    let mut candidates: Vec<&Term> = Vec::new();
    for t in target.iter().flat_map(|a| a.terms.iter()) {
        if !candidates.contains(&t) {
            candidates.push(t);
        }
    }

    // Atoms grouped by the level at which they become fully bound.
    let mut ready_at: Vec<Vec<&RelationalAtom>> = vec![Vec::new(); vars.len()];
    let mut ground: Vec<&RelationalAtom> = Vec::new();
    for atom in source {
        match atom.variables().filter_map(|v| position.get(v)).max() {
            Some(level) => ready_at[*level].push(atom),
            None => ground.push(atom),
        }
    }

    let mut assignment: Vec<Option<&Term>> = vec![None; vars.len()];
    let maps_into_target = |atom: &RelationalAtom, assignment: &[Option<&Term>]| -> bool {
        let image = RelationalAtom {
            name: atom.name.clone(),
            terms: atom
                .terms
                .iter()
                .map(|t| match t.as_variable().and_then(|v| position.get(v)) {
                    Some(i) => assignment[*i].cloned().unwrap_or_else(|| t.clone()),
                    None => t.clone(),
                })
                .collect(),
        };
        target.contains(&image)
    };

    if !ground.iter().all(|a| maps_into_target(*a, &assignment[..])) {
        return None;
    }
    if vars.is_empty() {
        return Some(HashMap::new());
    }

    // next[level] is the index of the next candidate to try at that level.
    let mut next = vec![0usize; vars.len()];
    let mut level = 0;
    loop {
        if next[level] == candidates.len() {
            next[level] = 0;
            assignment[level] = None;
            if level == 0 {
                return None;
            }
            level -= 1;
            continue;
        }
        assignment[level] = Some(candidates[next[level]]);
        next[level] += 1;
        if ready_at[level].iter().all(|a| maps_into_target(*a, &assignment[..])) {
            if level + 1 == vars.len() {
                return Some(
                    vars.iter()
                        .zip(assignment.iter())
                        .filter_map(|(v, t)| t.map(|t| (v.to_string(), t.clone())))
                        .collect(),
                );
            }
            level += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(name: &str, terms: Vec<Term>) -> RelationalAtom {
        RelationalAtom::new(name, terms)
    }

    fn v(name: &str) -> Term {
        Term::var(name)
    }

    #[test]
    fn test_identity_always_exists() {
        let body = vec![
            atom("R", vec![v("x"), v("y")]),
            atom("S", vec![v("y"), Term::IntegerConstant(4)]),
        ];
        assert!(find_homomorphism(&body, &body, &[]).is_some());
    }

    #[test]
    fn test_fold_onto_smaller_body() {
        let body = vec![atom("R", vec![v("x"), v("y")]), atom("R", vec![v("x"), v("z")])];
        let target = vec![atom("R", vec![v("x"), v("y")])];
        let mapping = find_homomorphism(&body, &target, &["x"]);
        let mapping = mapping.expect("R(x, z) folds onto R(x, y)");
        assert_eq!(Some(&v("y")), mapping.get("z"));
        assert_eq!(Some(&v("y")), mapping.get("y"));
        assert!(!mapping.contains_key("x"));
    }

    #[test]
    fn test_pinned_variables_block_folding() {
        // Without pinning, x could map to y and y to y.
        let body = vec![atom("R", vec![v("x"), v("y")]), atom("R", vec![v("y"), v("y")])];
        let target = vec![atom("R", vec![v("y"), v("y")])];
        assert!(find_homomorphism(&body, &target, &[]).is_some());
        assert!(find_homomorphism(&body, &target, &["x"]).is_none());
    }

    #[test]
    fn test_constants_must_match() {
        let body = vec![
            atom("R", vec![v("x"), Term::string("a")]),
            atom("R", vec![v("x"), Term::string("b")]),
        ];
        let target = vec![atom("R", vec![v("x"), Term::string("a")])];
        assert!(find_homomorphism(&body, &target, &[]).is_none());
    }

    #[test]
    fn test_variable_may_map_to_constant() {
        let body = vec![atom("R", vec![v("x"), v("y")]), atom("R", vec![v("x"), Term::IntegerConstant(1)])];
        let target = vec![atom("R", vec![v("x"), Term::IntegerConstant(1)])];
        let mapping = find_homomorphism(&body, &target, &["x"]);
        assert_eq!(
            Some(&Term::IntegerConstant(1)),
            mapping.as_ref().and_then(|m| m.get("y"))
        );
    }

    #[test]
    fn test_chain_does_not_fold_into_edge() {
        let body = vec![
            atom("E", vec![v("a"), v("b")]),
            atom("E", vec![v("b"), v("c")]),
        ];
        let target = vec![atom("E", vec![v("b"), v("c")])];
        assert!(find_homomorphism(&body, &target, &[]).is_none());
    }
}
