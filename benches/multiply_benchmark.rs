use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fem_sparse::SparseMatrixBuilder;

fn banded(order: usize, half_band: usize) -> SparseMatrixBuilder {
    let width = 2 * half_band + 1;
    let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(order, order * width);
    for i in 0..order {
        let lo = i.saturating_sub(half_band);
        let hi = (i + half_band + 1).min(order);
        for j in lo..hi {
            let value = if i == j { width as f64 } else { -1.0 };
            matrix.set(i, j, value).unwrap();
        }
    }
    matrix.finalize().unwrap();
    matrix
}

fn bench_matvec(c: &mut Criterion) {
    let mut group = c.benchmark_group("matvec");

    for order in [1_000usize, 10_000, 100_000] {
        let mut matrix = banded(order, 3);
        let x = vec![1.0; order];
        let mut y = vec![0.0; order];
        group.throughput(Throughput::Elements(matrix.nnz() as u64));

        group.bench_with_input(BenchmarkId::new("banded_7", order), &order, |b, _| {
            b.iter(|| {
                matrix.multiply_into(black_box(&x), &mut y).unwrap();
                black_box(y[order / 2])
            });
        });
    }

    group.finish();
}

fn bench_matmat(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmat");
    group.sample_size(10);

    for order in [32usize, 64] {
        let mut a = banded(order, 1);
        let mut b = banded(order, 1);

        group.bench_with_input(BenchmarkId::new("tridiagonal_squared", order), &order, |bench, &order| {
            bench.iter(|| {
                let mut product: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(order, 5 * order);
                a.multiply_matrix(&mut b, &mut product).unwrap();
                black_box(product.nnz())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_matvec, bench_matmat);
criterion_main!(benches);
