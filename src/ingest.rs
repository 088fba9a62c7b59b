//! Edge-list ingestion: UTF-8 text, `\n`-terminated lines, at least two
//! tab-separated decimal-integer fields per line (source, target);
//! additional fields are ignored. Blank lines and comments are not
//! supported by this format.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::graph::Graph;

pub fn load_graph(path: &Path) -> Result<Graph> {
    let text = fs::read_to_string(path).map_err(|source| EngineError::InputIo {
        path: path.display().to_string(),
        source,
    })?;

    let mut graph = Graph::new();
    for (line_no, line) in text.lines().enumerate() {
        let (src, dst) = parse_line(line).ok_or_else(|| EngineError::InputMalformed {
            line_no: line_no + 1,
            text: line.to_string(),
        })?;
        graph.add_edge(src, dst);
    }
    Ok(graph)
}

fn parse_line(line: &str) -> Option<(u32, u32)> {
    let mut fields = line.split('\t');
    let src = fields.next()?.parse().ok()?;
    let dst = fields.next()?.parse().ok()?;
    Some((src, dst))
}

/// Writes `edges` in canonical form — sorted `(u, v)` pairs with `u < v`.
pub fn write_canonical(edges: &[(u32, u32)]) -> String {
    let mut normalized: Vec<(u32, u32)> = edges
        .iter()
        .map(|&(u, v)| if u < v { (u, v) } else { (v, u) })
        .collect();
    normalized.sort_unstable();
    normalized.dedup();

    let mut out = String::new();
    for (u, v) in normalized {
        out.push_str(&format!("{u}\t{v}\n"));
    }
    out
}
