pub use executor::Executor;
pub use planner::QueryPlanner;
mod executor;
mod planner;

use common::catalog::Catalog;
use common::database::Database;
use common::parser::parse_query_file;
use common::MinibaseError;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Evaluates the query in `input` against `db` and writes the result
/// tuples to `output`, one per line. Returns the number of tuples written.
///
/// A fresh catalog is built for every call.
pub fn evaluate_file(db: &Database, input: &Path, output: &Path) -> Result<usize, MinibaseError> {
    let query = parse_query_file(input)?;
    info!("Evaluating {}", query);
    let mut catalog = Catalog::new(db);
    let plan = QueryPlanner::from_query(&query, &mut catalog)?;
    let mut executor = Executor::new_ref();
    executor.configure_query(plan);
    let mut out = BufWriter::new(File::create(output)?);
    let count = executor.write_results(&mut out)?;
    info!("Wrote {} tuples to {:?}", count, output);
    Ok(count)
}
