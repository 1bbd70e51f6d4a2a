use fem_sparse::assembly::assemble_element;
use fem_sparse::{BuilderConfig, DiagnosticLevel, SparseError, SparseMatrixBuilder};

/// Stiffness of a 1D linear element of length `h`.
fn element_stiffness(h: f64) -> [f64; 4] {
    let k = 1.0 / h;
    [k, -k, -k, k]
}

fn poisson_1d(elements: usize) -> SparseMatrixBuilder {
    let nodes = elements + 1;
    let config = BuilderConfig::new(nodes, 3 * nodes - 2);
    let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::from_config(&config);
    let local = element_stiffness(1.0);
    for e in 0..elements {
        assemble_element(&mut matrix, &[e, e + 1], &local).unwrap();
    }
    matrix
}

#[test]
fn stiffness_matrix_is_tridiagonal() {
    let mut matrix = poisson_1d(5);
    assert_eq!(matrix.nnz(), 16);

    let rows = matrix.compressed_rows().unwrap();
    assert_eq!(rows.row(0).collect::<Vec<_>>(), vec![(0, 1.0), (1, -1.0)]);
    assert_eq!(
        rows.row(3).collect::<Vec<_>>(),
        vec![(2, -1.0), (3, 2.0), (4, -1.0)]
    );
    assert_eq!(rows.row(5).collect::<Vec<_>>(), vec![(4, -1.0), (5, 1.0)]);
}

#[test]
fn stiffness_annihilates_constants() {
    let mut matrix = poisson_1d(8);
    let ones = vec![1.0; 9];
    assert!(matrix.multiply(&ones).unwrap().iter().all(|&v| v == 0.0));

    // A linear field only sees the boundary.
    let ramp: Vec<f64> = (0..9).map(f64::from).collect();
    let flux = matrix.multiply(&ramp).unwrap();
    assert_eq!(flux[0], -1.0);
    assert_eq!(flux[8], 1.0);
    assert!(flux[1..8].iter().all(|&v| v == 0.0));
}

#[test]
fn squared_operator_matches_dense_product() {
    let mut a = poisson_1d(3);
    let mut b = poisson_1d(3);
    let mut product: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(4, 16);
    a.multiply_matrix(&mut b, &mut product).unwrap();

    let dense = [
        [1.0, -1.0, 0.0, 0.0],
        [-1.0, 2.0, -1.0, 0.0],
        [0.0, -1.0, 2.0, -1.0],
        [0.0, 0.0, -1.0, 1.0],
    ];
    for i in 0..4 {
        for j in 0..4 {
            let expected: f64 = (0..4).map(|k| dense[i][k] * dense[k][j]).sum();
            assert_eq!(product.get(i, j).unwrap(), expected, "({i}, {j})");
        }
    }
}

#[test]
fn undersized_reservation_fails_loudly() {
    let config = BuilderConfig::new(4, 5).with_diagnostics(DiagnosticLevel::Errors);
    let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::from_config(&config);
    let local = element_stiffness(0.5);

    let mut result = Ok(());
    for e in 0..3 {
        result = assemble_element(&mut matrix, &[e, e + 1], &local);
        if result.is_err() {
            break;
        }
    }

    match result {
        Err(SparseError::CapacityExceeded { reserved_non_zeros: 5, stats, .. }) => {
            assert_eq!(stats.new_entries, 5);
        }
        other => panic!("expected capacity error, got {other:?}"),
    }
    assert_eq!(matrix.nnz(), 5);
}
