use criterion::{criterion_group, Criterion};

use crate::benchmarks::benchtemplate::BenchTemplate;
use utilities::template::Template;

fn join_template(left_rows: usize, right_rows: usize, query: &str) -> Template {
    let built = Template::new().and_then(|mut bt| {
        bt.generate_random_table("A", 2, left_rows, 100)?;
        bt.generate_random_table("B", 2, right_rows, 100)?;
        bt.add_query(query)?;
        Ok(bt)
    });
    match built {
        Ok(bt) => bt,
        Err(e) => panic!("Could not build join template: {}", e),
    }
}

fn bench_join_tiny(c: &mut Criterion) {
    let mut bt = join_template(10, 10, "Q(x, y, z) :- A(x, y), B(x, z)");
    bt.show_configuration();
    bt.bench_queries(c, "join_tiny");
}

fn bench_join_small(c: &mut Criterion) {
    let mut bt = join_template(200, 200, "Q(x, y, z) :- A(x, y), B(x, z)");
    bt.bench_queries(c, "join_small");
}

fn bench_join_right(c: &mut Criterion) {
    let mut bt = join_template(20, 500, "Q(x, y, z) :- A(x, y), B(x, z)");
    bt.bench_queries(c, "join_right");
}

fn bench_join_left(c: &mut Criterion) {
    let mut bt = join_template(500, 20, "Q(x, y, z) :- A(x, y), B(x, z)");
    bt.bench_queries(c, "join_left");
}

fn bench_join_filtered(c: &mut Criterion) {
    let mut bt = join_template(500, 500, "Q(x, w) :- A(x, y), B(z, w), y = z, x < 50");
    bt.bench_queries(c, "join_filtered");
}

criterion_group! {
    name = joinbench;
    config = Criterion::default().sample_size(10);
    targets =
    bench_join_tiny,
    bench_join_small,
    bench_join_right,
    bench_join_left,
    bench_join_filtered,
}
