use std::{fs::File, io::{BufRead, BufReader}, path::Path};

use anyhow::{Context, Result, bail, ensure};

/// Reads the whitespace-separated node population file.
///
/// The first line is a total-population header and is skipped; each
/// following line is `<node> <population>` with 0-based node ids.
pub fn read_population(path: &Path, num_nodes: usize) -> Result<Vec<i64>> {
    let file = File::open(path)
        .with_context(|| format!("[io::population] Failed to open population file: {}", path.display()))?;

    let mut population = vec![-1i64; num_nodes];
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line
            .with_context(|| format!("[io::population] Read error in {} at line {}", path.display(), lineno + 1))?;
        if lineno == 0 || line.trim().is_empty() { continue } // header carries the total

        let mut fields = line.split_whitespace();
        let node = fields.next().and_then(|s| s.parse::<usize>().ok());
        let pop = fields.next().and_then(|s| s.parse::<i64>().ok());
        let (node, pop) = match (node, pop) {
            (Some(node), Some(pop)) => (node, pop),
            _ => bail!("[io::population] Malformed line {} in {}", lineno + 1, path.display()),
        };
        ensure!(node < num_nodes, "[io::population] Node {} out of range at line {}", node, lineno + 1);
        ensure!(pop > 0, "[io::population] Population of node {} must be positive", node);
        ensure!(population[node] < 0, "[io::population] Duplicate entry for node {} at line {}", node, lineno + 1);
        population[node] = pop;
    }

    if let Some(missing) = population.iter().position(|&p| p < 0) {
        bail!("[io::population] No population given for node {}", missing);
    }
    Ok(population)
}
