use std::path::Path;

use anyhow::{Context, Result, ensure};
use ndarray::Array2;

/// Reads the unit-to-unit distance matrix from a CSV file.
///
/// The file carries one header row and one id column; the remaining
/// fields of row i are the integer milli-unit distances d[i][0..n].
/// Rows are taken in file order as node order.
pub fn read_distance_matrix(path: &Path, num_nodes: usize) -> Result<Array2<i64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("[io::distance] Failed to open distance file: {}", path.display()))?;

    let mut dist = Array2::<i64>::zeros((num_nodes, num_nodes));
    let mut rows = 0usize;
    for (i, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("[io::distance] Read error in {} at row {}", path.display(), i + 1))?;
        ensure!(i < num_nodes,
            "[io::distance] Distance file has more than {} data rows", num_nodes);
        ensure!(record.len() == num_nodes + 1,
            "[io::distance] Row {} has {} fields, expected id plus {} distances",
            i + 1, record.len(), num_nodes);

        for (j, field) in record.iter().skip(1).enumerate() {
            let value = field.parse::<i64>()
                .with_context(|| format!("[io::distance] Bad distance '{}' at row {}, column {}", field, i + 1, j + 2))?;
            ensure!(value >= 0, "[io::distance] Negative distance at row {}, column {}", i + 1, j + 2);
            dist[[i, j]] = value;
        }
        rows += 1;
    }
    ensure!(rows == num_nodes,
        "[io::distance] Distance file has {} data rows, expected {}", rows, num_nodes);

    Ok(dist)
}
