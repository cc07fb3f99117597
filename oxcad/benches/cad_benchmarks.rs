//! Criterion benchmarks for OxCAD
//!
//! These benchmarks can be run with:
//! ```bash
//! cargo bench -p oxcad
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oxcad::{Cad, CadSettings, CheckRequest, Constraint, Polynomial, RealAlgebraicPoint};

fn p(coeffs: &[(i64, &[(u32, u32)])]) -> Polynomial {
    Polynomial::from_coeffs_int(coeffs)
}

/// x^2 + y^2 - r
fn circle(r: i64) -> Polynomial {
    p(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-r, &[])])
}

/// Benchmark satisfiable and unsatisfiable checks on a growing set of disks
fn bench_disks(c: &mut Criterion) {
    let mut group = c.benchmark_group("disks");

    for count in [1i64, 2, 3].iter() {
        group.bench_with_input(BenchmarkId::new("sat", count), count, |b, &count| {
            b.iter(|| {
                let constraints: Vec<Constraint> =
                    (1..=count).map(|r| Constraint::less(circle(r))).collect();
                let mut cad = Cad::new(CadSettings::default());
                black_box(cad.find_model(&constraints))
            });
        });

        group.bench_with_input(BenchmarkId::new("unsat", count), count, |b, &count| {
            b.iter(|| {
                let mut constraints: Vec<Constraint> =
                    (1..=count).map(|r| Constraint::leq(circle(r))).collect();
                // x = 2 lies outside every disk
                constraints.push(Constraint::eq(p(&[(1, &[(0, 1)]), (-2, &[])])));
                let mut cad = Cad::new(CadSettings::base());
                black_box(cad.find_model(&constraints))
            });
        });
    }

    group.finish();
}

/// Benchmark complete projection of a parabola against a circle
fn bench_projection(c: &mut Criterion) {
    c.bench_function("projection_circle_parabola", |b| {
        b.iter(|| {
            let mut cad = Cad::new(CadSettings::base());
            // y - x^2
            let parabola = p(&[(1, &[(1, 1)]), (-1, &[(0, 2)])]);
            cad.schedule(&[circle(2), parabola], &[0, 1]);
            black_box(cad.complete_elimination())
        });
    });
}

/// Benchmark a re-check that is answered by the trace
fn bench_warm_restart(c: &mut Criterion) {
    let constraints = [
        Constraint::less(circle(4)),
        Constraint::greater(p(&[(1, &[(0, 1), (1, 1)]), (-1, &[])])),
    ];
    let mut cad = Cad::new(CadSettings::default());
    let mut point = RealAlgebraicPoint::empty();
    let _ = cad.check(&constraints, &mut point, CheckRequest::new());

    c.bench_function("warm_restart_recheck", |b| {
        b.iter(|| black_box(cad.check(&constraints, &mut point, CheckRequest::new())));
    });
}

criterion_group!(benches, bench_disks, bench_projection, bench_warm_restart);

criterion_main!(benches);
