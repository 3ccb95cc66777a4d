extern crate clap;
use clap::{App, Arg};
use env_logger::Env;
use log::{error, info};
use std::path::Path;
use std::process;

fn main() {
    // Configure log environment
    env_logger::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("cqminimizer")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Removes redundant body atoms from a conjunctive query")
        .arg(
            Arg::with_name("INPUT_FILE")
                .help("File holding the query")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("OUTPUT_FILE")
                .help("File the minimized query is written to")
                .required(true)
                .index(2),
        )
        .get_matches();

    let input = Path::new(matches.value_of("INPUT_FILE").unwrap_or_default());
    let output = Path::new(matches.value_of("OUTPUT_FILE").unwrap_or_default());

    match minimizer::minimize_file(input, output) {
        Ok(query) => info!("Minimized to {}", query),
        Err(e) => {
            error!("Minimization failed: {}", e);
            process::exit(1);
        }
    }
}
