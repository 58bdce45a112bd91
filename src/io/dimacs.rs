use std::{fs::File, io::{BufRead, BufReader}, path::Path};

use anyhow::{Context, Result, bail, ensure};

use crate::graph::Graph;

/// Reads a DIMACS-format graph: `c` comment lines, one `p edge <n> <m>`
/// problem line, then `m` lines `e <u> <v>` with 1-based endpoints.
pub fn read_dimacs(path: &Path) -> Result<Graph> {
    let file = File::open(path)
        .with_context(|| format!("[io::dimacs] Failed to open graph file: {}", path.display()))?;

    let mut num_nodes: Option<usize> = None;
    let mut num_edges = 0usize;
    let mut list: Vec<(u32, u32)> = Vec::new();

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line
            .with_context(|| format!("[io::dimacs] Read error in {} at line {}", path.display(), lineno + 1))?;
        let mut fields = line.split_whitespace();
        match fields.next() {
            None | Some("c") => continue,
            Some("p") => {
                ensure!(num_nodes.is_none(), "[io::dimacs] Duplicate problem line at line {}", lineno + 1);
                ensure!(fields.next() == Some("edge"),
                    "[io::dimacs] Expected 'p edge <n> <m>' at line {}", lineno + 1);
                let n = fields.next().and_then(|s| s.parse::<usize>().ok());
                let m = fields.next().and_then(|s| s.parse::<usize>().ok());
                match (n, m) {
                    (Some(n), Some(m)) => { num_nodes = Some(n); num_edges = m; }
                    _ => bail!("[io::dimacs] Malformed problem line at line {}", lineno + 1),
                }
            }
            Some("e") => {
                let n = num_nodes
                    .with_context(|| format!("[io::dimacs] Edge before problem line at line {}", lineno + 1))?;
                let u = fields.next().and_then(|s| s.parse::<u32>().ok());
                let v = fields.next().and_then(|s| s.parse::<u32>().ok());
                let (u, v) = match (u, v) {
                    (Some(u), Some(v)) => (u, v),
                    _ => bail!("[io::dimacs] Malformed edge line at line {}", lineno + 1),
                };
                ensure!(u >= 1 && v >= 1 && (u as usize) <= n && (v as usize) <= n,
                    "[io::dimacs] Edge ({u}, {v}) out of range 1..={n} at line {}", lineno + 1);
                list.push((u - 1, v - 1));
            }
            Some(other) => bail!("[io::dimacs] Unknown line type '{}' at line {}", other, lineno + 1),
        }
    }

    let n = num_nodes.context("[io::dimacs] Missing 'p edge' problem line")?;
    ensure!(list.len() == num_edges,
        "[io::dimacs] Problem line declares {} edges, found {}", num_edges, list.len());

    Ok(Graph::from_edge_list(n, &list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("districtor-dimacs-{}-{:?}.col", std::process::id(), std::thread::current().id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_a_path_graph() {
        let path = write_temp("c three-node path\np edge 3 2\ne 1 2\ne 2 3\n");
        let graph = read_dimacs(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.degree(1), 2);
        assert!(graph.is_connected());
    }

    #[test]
    fn rejects_edge_count_mismatch() {
        let path = write_temp("p edge 3 2\ne 1 2\n");
        let result = read_dimacs(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_endpoint() {
        let path = write_temp("p edge 2 1\ne 1 5\n");
        let result = read_dimacs(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_dimacs(Path::new("/nonexistent/graph.col")).is_err());
    }
}
