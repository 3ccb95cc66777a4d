use std::fs;
use std::path::Path;

use pest::Parser as _;
use pest_derive::Parser;

use crate::query::*;
use crate::MinibaseError;

#[derive(Parser)]
#[grammar = "query.pest"]
struct QueryParser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;
type Pairs<'a> = pest::iterators::Pairs<'a, Rule>;

/// Parses `Head :- atom, atom, ...` into a query.
pub fn parse_query(text: &str) -> Result<Query, MinibaseError> {
    let mut pairs = QueryParser::parse(Rule::query, text.trim())
        .map_err(|e| MinibaseError::ParseError(e.to_string()))?;
    let mut inner = expect_next_rule(&mut pairs, Rule::query)?.into_inner();
    let head = convert_head(expect_next_rule(&mut inner, Rule::head)?)?;
    let body = expect_next_rule(&mut inner, Rule::body)?
        .into_inner()
        .map(convert_atom)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Query::new(head, body))
}

/// Reads and parses the query held in a file.
pub fn parse_query_file(path: &Path) -> Result<Query, MinibaseError> {
    let text = fs::read_to_string(path)?;
    debug!("Parsing query from {:?}", path);
    parse_query(&text)
}

fn unexpected(rule: Rule) -> MinibaseError {
    MinibaseError::ParseError(format!("Unexpected {:?}", rule))
}

fn expect_next_rule<'a>(pairs: &mut Pairs<'a>, rule: Rule) -> Result<Pair<'a>, MinibaseError> {
    match pairs.next() {
        Some(pair) if pair.as_rule() == rule => Ok(pair),
        Some(pair) => Err(unexpected(pair.as_rule())),
        None => Err(MinibaseError::ParseError(format!("Missing {:?}", rule))),
    }
}

fn convert_head(pair: Pair) -> Result<Head, MinibaseError> {
    let mut pairs = pair.into_inner();
    let name = expect_next_rule(&mut pairs, Rule::name)?.as_str().to_string();
    let mut variables = Vec::new();
    let mut agg = None;
    for pair in pairs {
        match pair.as_rule() {
            Rule::variable => variables.push(pair.as_str().to_string()),
            Rule::sum => {
                let terms = pair
                    .into_inner()
                    .map(convert_term)
                    .collect::<Result<Vec<_>, _>>()?;
                agg = Some(SumAggregate::new(terms));
            }
            rule => return Err(unexpected(rule)),
        }
    }
    Ok(Head {
        name,
        variables,
        agg,
    })
}

fn convert_atom(pair: Pair) -> Result<Atom, MinibaseError> {
    match pair.as_rule() {
        Rule::relational_atom => {
            let mut pairs = pair.into_inner();
            let name = expect_next_rule(&mut pairs, Rule::name)?.as_str().to_string();
            let terms = pairs.map(convert_term).collect::<Result<Vec<_>, _>>()?;
            Ok(Atom::Relational(RelationalAtom { name, terms }))
        }
        Rule::comparison_atom => {
            let mut pairs = pair.into_inner();
            let term1 = convert_term(pairs.next().ok_or_else(|| unexpected(Rule::comparison_atom))?)?;
            let op_pair = expect_next_rule(&mut pairs, Rule::comparison_op)?;
            let op = ComparisonOp::from_symbol(op_pair.as_str())
                .ok_or_else(|| unexpected(Rule::comparison_op))?;
            let term2 = convert_term(pairs.next().ok_or_else(|| unexpected(Rule::comparison_atom))?)?;
            Ok(Atom::Comparison(ComparisonAtom::new(term1, op, term2)))
        }
        rule => Err(unexpected(rule)),
    }
}

fn convert_term(pair: Pair) -> Result<Term, MinibaseError> {
    match pair.as_rule() {
        Rule::variable => Ok(Term::Variable(pair.as_str().to_string())),
        Rule::integer => pair
            .as_str()
            .parse::<i64>()
            .map(Term::IntegerConstant)
            .map_err(|e| MinibaseError::ParseError(format!("{}: {}", pair.as_str(), e))),
        Rule::string => {
            let inner = expect_next_rule(&mut pair.into_inner(), Rule::string_inner)?;
            Ok(Term::StringConstant(inner.as_str().to_string()))
        }
        rule => Err(unexpected(rule)),
    }
}
