use fem_sparse::{SparseError, SparseMatrixBuilder};
use proptest::prelude::*;

const ORDER: usize = 6;

#[derive(Debug, Clone)]
enum Operation {
    Set(usize, usize, i8),
    Add(usize, usize, i8),
    Get(usize, usize),
    Finalize,
    Unfinalize,
}

fn operation() -> impl Strategy<Value = Operation> {
    let idx = 0..ORDER;
    prop_oneof![
        (idx.clone(), idx.clone(), any::<i8>()).prop_map(|(r, c, v)| Operation::Set(r, c, v)),
        (idx.clone(), idx.clone(), any::<i8>()).prop_map(|(r, c, v)| Operation::Add(r, c, v)),
        (idx.clone(), idx).prop_map(|(r, c)| Operation::Get(r, c)),
        Just(Operation::Finalize),
        Just(Operation::Unfinalize),
    ]
}

proptest! {
    #[test]
    fn test_builder_matches_dense_model(ops in proptest::collection::vec(operation(), 1..120)) {
        // Small integers keep every sum exact in f64.
        let mut dense = [[0.0f64; ORDER]; ORDER];
        let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(ORDER, ORDER * ORDER);

        for op in ops {
            match op {
                Operation::Set(r, c, v) => {
                    matrix.set(r, c, f64::from(v)).unwrap();
                    dense[r][c] = f64::from(v);
                }
                Operation::Add(r, c, v) => {
                    matrix.add(r, c, f64::from(v)).unwrap();
                    dense[r][c] += f64::from(v);
                }
                Operation::Get(r, c) => {
                    prop_assert_eq!(matrix.get(r, c).unwrap(), dense[r][c]);
                }
                // Explicit transitions may be rejected depending on phase;
                // the model is unaffected either way.
                Operation::Finalize => {
                    let _ = matrix.finalize();
                }
                Operation::Unfinalize => {
                    let _ = matrix.unfinalize();
                }
            }
        }

        for r in 0..ORDER {
            for c in 0..ORDER {
                prop_assert_eq!(matrix.get(r, c).unwrap(), dense[r][c], "mismatch at ({}, {})", r, c);
            }
        }
    }

    #[test]
    fn test_finalized_rows_sorted_and_unique(
        entries in proptest::collection::vec((0..ORDER, 0..ORDER, 1i8..=100), 0..60)
    ) {
        let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(ORDER, ORDER * ORDER);
        matrix.initialize().unwrap();
        for (r, c, v) in entries {
            matrix.add(r, c, f64::from(v)).unwrap();
        }

        let rows = matrix.compressed_rows().unwrap();
        for r in 0..ORDER {
            let cols: Vec<usize> = rows.row(r).map(|(c, _)| c).collect();
            prop_assert!(cols.windows(2).all(|w| w[0] < w[1]), "row {} not strictly sorted: {:?}", r, cols);
        }
    }

    #[test]
    fn test_multiply_matches_dense_model(
        entries in proptest::collection::vec((0..ORDER, 0..ORDER, any::<i8>()), 0..40),
        vector in proptest::collection::vec(-8i8..8, ORDER)
    ) {
        let mut dense = [[0.0f64; ORDER]; ORDER];
        let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(ORDER, ORDER * ORDER);
        for (r, c, v) in entries {
            matrix.set(r, c, f64::from(v)).unwrap();
            dense[r][c] = f64::from(v);
        }
        let x: Vec<f64> = vector.into_iter().map(f64::from).collect();

        let y = matrix.multiply(&x).unwrap();
        for r in 0..ORDER {
            let expected: f64 = (0..ORDER).map(|c| dense[r][c] * x[c]).sum();
            prop_assert_eq!(y[r], expected);
        }
    }

    #[test]
    fn test_small_reservation_never_drops_entries(
        entries in proptest::collection::vec((0..ORDER, 0..ORDER), 1..40),
        capacity in 1usize..8
    ) {
        let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(ORDER, capacity);
        let mut accepted = Vec::new();
        let mut overflowed = false;

        for (r, c) in entries {
            match matrix.set(r, c, 1.0) {
                Ok(()) => accepted.push((r, c)),
                Err(SparseError::CapacityExceeded { reserved_non_zeros, .. }) => {
                    prop_assert_eq!(reserved_non_zeros, capacity);
                    overflowed = true;
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        prop_assert!(matrix.nnz() <= capacity);
        if overflowed {
            prop_assert_eq!(matrix.nnz(), capacity);
        }
        for (r, c) in accepted {
            prop_assert_eq!(matrix.get(r, c).unwrap(), 1.0);
        }
    }
}
