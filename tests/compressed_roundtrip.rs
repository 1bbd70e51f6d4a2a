use fem_sparse::{CompressedForm, SparseMatrixBuilder, StorageState};

fn sample() -> SparseMatrixBuilder {
    // [ 4 -1  0  0]
    // [-1  4 -1  0]
    // [ 0 -1  4 -1]
    // [ 0  0 -1  4]
    let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(4, 12);
    for i in 0..4 {
        matrix.set(i, i, 4.0).unwrap();
        if i + 1 < 4 {
            matrix.add(i, i + 1, -1.0).unwrap();
            matrix.add(i + 1, i, -1.0).unwrap();
        }
    }
    matrix
}

#[test]
fn finalize_read_back_and_adopt() {
    let mut original = sample();
    original.finalize().unwrap();

    let row_offsets = original.row_offsets().unwrap().to_vec();
    let column_indices = original.column_indices().unwrap().to_vec();
    let values = original.values().unwrap().to_vec();
    assert_eq!(row_offsets, vec![1, 3, 6, 9, 11]);

    let mut adopted: SparseMatrixBuilder = SparseMatrixBuilder::new();
    adopted
        .set_compressed_form(CompressedForm { row_offsets, column_indices, values })
        .unwrap();

    assert_eq!(adopted.state(), StorageState::Finalized);
    assert_eq!(adopted.nnz(), 10);
    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(adopted.get(i, j).unwrap(), original.get(i, j).unwrap());
        }
    }
}

#[test]
fn compressed_form_survives_json() {
    let form = sample().into_compressed_form().unwrap();
    let text = serde_json::to_string(&form).unwrap();
    let decoded: CompressedForm<f64> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, form);

    let mut adopted: SparseMatrixBuilder = SparseMatrixBuilder::new();
    adopted.set_compressed_form(decoded).unwrap();
    assert_eq!(
        adopted.multiply(&[1.0, 1.0, 1.0, 1.0]).unwrap(),
        vec![3.0, 2.0, 2.0, 3.0]
    );
}

#[test]
fn adopted_matrix_accepts_further_assembly() {
    let form = sample().into_compressed_form().unwrap();
    let mut adopted: SparseMatrixBuilder = SparseMatrixBuilder::new();
    adopted.set_compressed_form(form).unwrap();

    adopted.add(0, 3, 2.0).unwrap();
    adopted.add(0, 0, 1.0).unwrap();
    assert_eq!(adopted.state(), StorageState::Building);
    assert_eq!(adopted.get(0, 3).unwrap(), 2.0);
    assert_eq!(adopted.get(0, 0).unwrap(), 5.0);
    assert_eq!(adopted.nnz(), 11);
}
