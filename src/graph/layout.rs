//! Force-directed node placement for graph images.
//!
//! Fruchterman–Reingold: every pair of nodes repels with `k² / d`, every
//! edge attracts with `w · d² / k`, and displacement per step is capped by
//! a temperature that cools linearly to zero.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rand::Rng;

use super::MentionGraph;

/// Steps the simulation runs.
pub const DEFAULT_ITERATIONS: usize = 50;

/// Optimal distance between nodes.
pub const DEFAULT_SPACING: f64 = 0.5;

/// Positions in `[-1, 1]²`, one per laid-out node.
pub type Positions = HashMap<NodeIndex, (f64, f64)>;

/// Lay out `nodes` (a subset of `graph`), considering only edges between them.
///
/// Initial positions are drawn from `rng`, so layouts differ between runs
/// unless a seeded rng is passed.
pub fn spring_layout<R: Rng>(
    graph: &MentionGraph,
    nodes: &[NodeIndex],
    spacing: f64,
    iterations: usize,
    rng: &mut R,
) -> Positions {
    let n = nodes.len();
    match n {
        0 => return Positions::new(),
        1 => return Positions::from([(nodes[0], (0.0, 0.0))]),
        _ => {}
    }

    let slot: HashMap<NodeIndex, usize> = nodes.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();
    let g = graph.graph();
    let edges: Vec<(usize, usize, f64)> = g
        .edge_references()
        .filter_map(|e| {
            let s = *slot.get(&e.source())?;
            let t = *slot.get(&e.target())?;
            Some((s, t, *e.weight() as f64))
        })
        .collect();

    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect();

    let mut temperature = 0.1;
    let cooling = temperature / (iterations as f64 + 1.0);
    let k2 = spacing * spacing;

    for _ in 0..iterations {
        let mut disp = vec![(0.0f64, 0.0f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                let d2 = (dx * dx + dy * dy).max(1e-4);
                let f = k2 / d2;
                disp[i].0 += dx * f;
                disp[i].1 += dy * f;
                disp[j].0 -= dx * f;
                disp[j].1 -= dy * f;
            }
        }

        for &(s, t, w) in &edges {
            let (dx, dy) = (pos[s].0 - pos[t].0, pos[s].1 - pos[t].1);
            let d = (dx * dx + dy * dy).sqrt().max(1e-2);
            let f = w * d / spacing;
            disp[s].0 -= dx * f;
            disp[s].1 -= dy * f;
            disp[t].0 += dx * f;
            disp[t].1 += dy * f;
        }

        for (p, (dx, dy)) in pos.iter_mut().zip(disp) {
            let len = (dx * dx + dy * dy).sqrt().max(1e-2);
            let step = len.min(temperature) / len;
            p.0 += dx * step;
            p.1 += dy * step;
        }
        temperature -= cooling;
    }

    rescale(&mut pos);
    nodes.iter().copied().zip(pos).collect()
}

/// Center on the origin and scale so the widest coordinate is 1.
fn rescale(pos: &mut [(f64, f64)]) {
    let n = pos.len() as f64;
    let (cx, cy) = pos
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.0 / n, y + p.1 / n));
    let mut extent: f64 = 0.0;
    for p in pos.iter_mut() {
        p.0 -= cx;
        p.1 -= cy;
        extent = extent.max(p.0.abs()).max(p.1.abs());
    }
    if extent > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= extent;
            p.1 /= extent;
        }
    }
}
