use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quadtree_index::{LineSegment, LinearQuadtree, Point, Quadtree, QuadtreeConfig, Rectangle};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const EXTENT: i64 = 3900 * 2;

fn get_rand() -> impl rand::Rng {
    SmallRng::seed_from_u64(0xdeadbeef)
}

fn bounds() -> Rectangle<i64> {
    Rectangle::new(0, 0, EXTENT, EXTENT)
}

fn rand_box(rng: &mut impl Rng, max_size: i64) -> Rectangle<i64> {
    Rectangle::new(
        rng.gen_range(0, EXTENT - max_size),
        rng.gen_range(0, EXTENT - max_size),
        rng.gen_range(1, max_size),
        rng.gen_range(1, max_size),
    )
}

fn rand_point(rng: &mut impl Rng) -> Point<i64> {
    Point::new(rng.gen_range(0, EXTENT), rng.gen_range(0, EXTENT))
}

fn make_quadtree(rng: &mut impl Rng, size: usize) -> Quadtree<Rectangle<i64>> {
    let mut tree = Quadtree::with_config(bounds(), QuadtreeConfig::default());
    tree.extend((0..size).map(|_| rand_box(rng, 64)));
    tree
}

fn make_linear(rng: &mut impl Rng, size: usize) -> LinearQuadtree<Rectangle<i64>> {
    let mut tree = LinearQuadtree::new(bounds(), 7);
    tree.extend((0..size).map(|_| rand_box(rng, 64)));
    tree
}

fn make_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_tree");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::new("Quadtree", size), &size, |b, &size| {
            let mut rng = get_rand();
            b.iter(|| make_quadtree(&mut rng, size));
        });
        group.bench_with_input(
            BenchmarkId::new("LinearQuadtree", size),
            &size,
            |b, &size| {
                let mut rng = get_rand();
                b.iter(|| make_linear(&mut rng, size));
            },
        );
    }
    group.finish();
}

fn rebuild_linear(c: &mut Criterion) {
    let mut group = c.benchmark_group("LinearQuadtree rebuild");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = get_rand();
            let mut tree = LinearQuadtree::new(bounds(), 7);

            b.iter(|| {
                tree.clear();
                tree.extend((0..size).map(|_| rand_box(&mut rng, 64)));
            });
        });
    }
    group.finish();
}

fn random_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_insert");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::new("Quadtree", size), &size, |b, &size| {
            let mut rng = get_rand();
            let mut tree = make_quadtree(&mut rng, size);

            b.iter(|| tree.insert(rand_box(&mut rng, 64)));
        });
        group.bench_with_input(
            BenchmarkId::new("LinearQuadtree", size),
            &size,
            |b, &size| {
                let mut rng = get_rand();
                let mut tree = make_linear(&mut rng, size);

                b.iter(|| tree.insert(rand_box(&mut rng, 64)).unwrap());
            },
        );
    }
    group.finish();
}

fn bounding_box_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounding_box_query");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::new("Quadtree", size), &size, |b, &size| {
            let mut rng = get_rand();
            let tree = make_quadtree(&mut rng, size);

            let mut res = Vec::new();
            b.iter(|| {
                res.clear();
                tree.retrieve(&rand_box(&mut rng, 512), &mut res);
                black_box(&res);
            });
        });
        group.bench_with_input(
            BenchmarkId::new("LinearQuadtree", size),
            &size,
            |b, &size| {
                let mut rng = get_rand();
                let tree = make_linear(&mut rng, size);

                let mut res = Vec::new();
                b.iter(|| {
                    res.clear();
                    tree.retrieve(&rand_box(&mut rng, 512), &mut res);
                    black_box(&res);
                });
            },
        );
    }
    group.finish();
}

fn point_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_query");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::new("Quadtree", size), &size, |b, &size| {
            let mut rng = get_rand();
            let tree = make_quadtree(&mut rng, size);

            b.iter(|| {
                let mut count = 0;
                tree.for_each_match(&rand_point(&mut rng), |_| count += 1);
                count
            });
        });
        group.bench_with_input(
            BenchmarkId::new("LinearQuadtree", size),
            &size,
            |b, &size| {
                let mut rng = get_rand();
                let tree = make_linear(&mut rng, size);

                b.iter(|| {
                    let mut count = 0;
                    tree.for_each_match(&rand_point(&mut rng), |_| count += 1);
                    count
                });
            },
        );
    }
    group.finish();
}

fn line_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_query");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::new("Quadtree", size), &size, |b, &size| {
            let mut rng = get_rand();
            let tree = make_quadtree(&mut rng, size);

            b.iter(|| {
                let line = LineSegment::new(rand_point(&mut rng), rand_point(&mut rng));
                let mut count = 0;
                tree.line_intersect(&line, |_| count += 1);
                count
            });
        });
        group.bench_with_input(
            BenchmarkId::new("Quadtree iterative", size),
            &size,
            |b, &size| {
                let mut rng = get_rand();
                let tree = make_quadtree(&mut rng, size);

                b.iter(|| {
                    let line = LineSegment::new(rand_point(&mut rng), rand_point(&mut rng));
                    let mut count = 0;
                    tree.line_intersect_iterative(&line, |_| count += 1);
                    count
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("LinearQuadtree", size),
            &size,
            |b, &size| {
                let mut rng = get_rand();
                let tree = make_linear(&mut rng, size);

                b.iter(|| {
                    let line = LineSegment::new(rand_point(&mut rng), rand_point(&mut rng));
                    let mut count = 0;
                    tree.line_intersect(&line, |_| count += 1);
                    count
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    quadtree_benches,
    make_tree,
    rebuild_linear,
    random_insert,
    bounding_box_query,
    point_query,
    line_query,
);

criterion_main!(quadtree_benches);
