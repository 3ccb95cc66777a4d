use utilities::template::Template;

use criterion::{black_box, Criterion};

pub trait BenchTemplate {
    fn bench_queries(&mut self, c: &mut Criterion, name: &str);
}

impl BenchTemplate for Template {
    fn bench_queries(&mut self, c: &mut Criterion, name: &str) {
        if let Err(e) = self.run_setup() {
            panic!("Setup for {} failed: {}", name, e);
        }
        c.bench_function(name, |b| {
            b.iter(|| black_box(self.run_queries().map_err(|e| e.to_string())))
        });
        if let Err(e) = self.run_cleanup() {
            panic!("Cleanup for {} failed: {}", name, e);
        }
    }
}
