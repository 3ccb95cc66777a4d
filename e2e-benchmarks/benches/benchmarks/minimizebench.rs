use criterion::{black_box, criterion_group, Criterion};

use common::parser::parse_query;
use common::Query;

fn parsed(text: &str) -> Query {
    match parse_query(text) {
        Ok(q) => q,
        Err(e) => panic!("Bad benchmark query {}: {}", text, e),
    }
}

/// A path of `n` edges plus `n` dangling edges that all fold into it.
fn path_query(n: usize) -> Query {
    let mut atoms: Vec<String> = (0..n).map(|i| format!("E(v{}, v{})", i, i + 1)).collect();
    atoms.extend((0..n).map(|i| format!("E(v{}, d{})", i, i)));
    parsed(&format!("Q(v0) :- {}", atoms.join(", ")))
}

fn bench_minimize_duplicates(c: &mut Criterion) {
    let q = parsed("Q(x) :- R(x, y), R(x, y), R(x, y), S(y, z), S(y, z)");
    c.bench_function("minimize_duplicates", |b| {
        b.iter(|| black_box(minimizer::minimize(&q).is_ok()))
    });
}

fn bench_minimize_path(c: &mut Criterion) {
    let q = path_query(4);
    c.bench_function("minimize_path_4", |b| {
        b.iter(|| black_box(minimizer::minimize(&q).is_ok()))
    });
}

criterion_group! {
    name = minimizebench;
    config = Criterion::default().sample_size(10);
    targets =
    bench_minimize_duplicates,
    bench_minimize_path,
}
