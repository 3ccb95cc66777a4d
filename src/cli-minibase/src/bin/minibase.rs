extern crate clap;
use clap::{App, Arg};
use common::config::EngineConfig;
use common::database::Database;
use common::MinibaseError;
use env_logger::Env;
use log::{error, info};
use std::path::Path;
use std::process;

fn run(db_dir: &Path, input: &Path, output: &Path, config: Option<&str>) -> Result<usize, MinibaseError> {
    let config = match config {
        Some(path) => EngineConfig::from_file(Path::new(path))?,
        None => EngineConfig::default(),
    };
    info!("Starting evaluation with config: {:?}", config);
    let db = Database::load(db_dir, &config)?;
    queryexe::query::evaluate_file(&db, input, output)
}

fn main() {
    // Configure log environment
    env_logger::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("minibase")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Evaluates a conjunctive query against a database directory")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Sets a custom engine config file")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("DATABASE_DIR")
                .help("Directory holding schema.txt and the relation files")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("INPUT_FILE")
                .help("File holding the query")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("OUTPUT_FILE")
                .help("File the result tuples are written to")
                .required(true)
                .index(3),
        )
        .get_matches();

    // Required arguments are checked by clap before we get here.
    let db_dir = Path::new(matches.value_of("DATABASE_DIR").unwrap_or_default());
    let input = Path::new(matches.value_of("INPUT_FILE").unwrap_or_default());
    let output = Path::new(matches.value_of("OUTPUT_FILE").unwrap_or_default());

    match run(db_dir, input, output, matches.value_of("config")) {
        Ok(count) => info!("Done, {} tuples.", count),
        Err(e) => {
            error!("Evaluation failed: {}", e);
            process::exit(1);
        }
    }
}
