use convex_polyhedra::row::{Con, Gen, Topology};
use convex_polyhedra::{linexpr::LinExpr, num::Z, poly::Poly};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ======================================================================
// UTIL

/// A `d`-dimensional hypercube `[0, 1]^d`, built from `2*d` half-space
/// constraints so `minimize` has real conversion work to do.
fn hypercube(d: usize, topology: Topology) -> Poly {
    let mut p = Poly::new_universe_with(d, topology);
    for i in 0..d {
        p.add_con(Con::nonstrict(LinExpr::unit(i), Z::from(0)));
        let mut e = LinExpr::zero_dim(d);
        e.set(i, Z::from(-1));
        p.add_con(Con::nonstrict(e, Z::from(1)));
    }
    p
}

/// A `d`-dimensional cross-polytope (`sum |x_i| <= 1`), built from its
/// `2^d` vertices, so `minimize` starts from generators instead.
fn cross_polytope(d: usize) -> Poly {
    let mut p = Poly::new_empty_with(d, Topology::Closed);
    for mask in 0..(1u32 << d) {
        let mut e = LinExpr::zero_dim(d);
        for i in 0..d {
            let coeff = if mask & (1 << i) != 0 { -1 } else { 1 };
            e.set(i, Z::from(coeff));
        }
        p.add_gen(Gen::point(e, Z::from(1)));
    }
    p
}

// ======================================================================
// BENCHMARKS - MAIN

fn benchmarks_main(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimize");
    for d in [2usize, 4, 6, 8] {
        group.bench_with_input(BenchmarkId::new("hypercube_cons_to_gens", d), &d, |b, &d| {
            b.iter(|| {
                let mut p = hypercube(d, Topology::Closed);
                black_box(p.gens());
            });
        });
        group.bench_with_input(BenchmarkId::new("cross_polytope_gens_to_cons", d), &d, |b, &d| {
            b.iter(|| {
                let mut p = cross_polytope(d);
                black_box(p.cons());
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("widening");
    for d in [2usize, 4, 6] {
        group.bench_with_input(BenchmarkId::new("h79_growing_hypercube", d), &d, |b, &d| {
            b.iter(|| {
                // `x` is the wider iterate ([0, 2]^d), `y` the narrower one
                // it must contain ([0, 1]^d); widening should drop the
                // upper-bound constraints `y` no longer satisfies.
                let mut x = Poly::new_universe_with(d, Topology::Closed);
                for i in 0..d {
                    x.add_con(Con::nonstrict(LinExpr::unit(i), Z::from(0)));
                    let mut e = LinExpr::zero_dim(d);
                    e.set(i, Z::from(-1));
                    x.add_con(Con::nonstrict(e, Z::from(2)));
                }
                let mut y = hypercube(d, Topology::Closed);
                x.widening_assign(&mut y, None);
                black_box(x.cons());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmarks_main);
criterion_main!(benches);
