//! Graph export: GraphML / DOT files and SVG images.
//!
//! GraphML mirrors the layout networkx writes (a single `weight` edge key of
//! type `long`), so exported graphs open directly in Gephi, yEd, or networkx.
//! DOT output goes through `petgraph::dot`.

use std::fmt::Write as _;
use std::path::Path;

use petgraph::dot::Dot;
use petgraph::visit::EdgeRef;
use rand::Rng;

use crate::error::{ExportError, ExportResult};

use super::MentionGraph;
use super::analytics::weakly_connected_components;
use super::layout::{self, Positions};

/// Interchange format for [`write_graph`], picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    GraphMl,
    Dot,
}

impl GraphFormat {
    /// `.dot` and `.gv` select DOT; anything else is GraphML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("dot") | Some("gv") => GraphFormat::Dot,
            _ => GraphFormat::GraphMl,
        }
    }
}

impl std::fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphFormat::GraphMl => write!(f, "GraphML"),
            GraphFormat::Dot => write!(f, "DOT"),
        }
    }
}

/// Serialize `graph` to `path`, creating parent directories.
pub fn write_graph(graph: &MentionGraph, path: &Path) -> ExportResult<GraphFormat> {
    let format = GraphFormat::from_path(path);
    let content = match format {
        GraphFormat::GraphMl => to_graphml(graph),
        GraphFormat::Dot => to_dot(graph),
    };
    write_file(path, &content)?;
    tracing::debug!(path = %path.display(), %format, "wrote graph");
    Ok(format)
}

/// GraphML document for `graph`. Node ids are the handles.
pub fn to_graphml(graph: &MentionGraph) -> String {
    let g = graph.graph();
    let mut out = String::new();
    out.push_str("<?xml version='1.0' encoding='utf-8'?>\n");
    out.push_str(
        "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"http://graphml.graphdrawing.org/xmlns \
         http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd\">\n",
    );
    out.push_str("  <key id=\"d0\" for=\"edge\" attr.name=\"weight\" attr.type=\"long\" />\n");
    out.push_str("  <graph edgedefault=\"directed\">\n");
    for handle in graph.handles() {
        let _ = writeln!(out, "    <node id=\"{}\" />", xml_escape(handle));
    }
    for edge in g.edge_references() {
        let _ = writeln!(
            out,
            "    <edge source=\"{}\" target=\"{}\">\n      <data key=\"d0\">{}</data>\n    </edge>",
            xml_escape(&g[edge.source()]),
            xml_escape(&g[edge.target()]),
            edge.weight()
        );
    }
    out.push_str("  </graph>\n</graphml>\n");
    out
}

/// Graphviz DOT document for `graph`, with a `weight` attribute per edge.
pub fn to_dot(graph: &MentionGraph) -> String {
    let g = graph.graph();
    let dot = Dot::with_attr_getters(
        g,
        &[],
        &|_, edge| format!("weight = {}", edge.weight()),
        &|_, _| String::new(),
    );
    format!("{dot}")
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;
const MARGIN: f64 = 40.0;
const NODE_RADIUS: f64 = 5.0;
const NODE_COLOR: &str = "#1f78b4";
const LABEL_SIZE: u32 = 8;

/// Stroke width for an edge of the given weight.
pub fn edge_width(weight: u64) -> f64 {
    (weight as f64 * 0.2).max(0.5)
}

/// Render `graph` to an SVG file at `path`.
///
/// Only `.svg` destinations are supported.
pub fn render_image(graph: &MentionGraph, path: &Path) -> ExportResult<()> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if !is_svg {
        return Err(ExportError::UnsupportedImageFormat {
            path: path.display().to_string(),
        });
    }
    let svg = render_svg(graph, &mut rand::thread_rng());
    write_file(path, &svg)
}

/// SVG drawing of the largest weakly connected component of `graph`.
///
/// An empty graph draws an "Empty graph" placeholder.
pub fn render_svg<R: Rng>(graph: &MentionGraph, rng: &mut R) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\">"
    );
    let _ = writeln!(out, "  <rect width=\"100%\" height=\"100%\" fill=\"white\" />");

    if graph.is_empty() {
        let _ = writeln!(
            out,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" \
             font-size=\"12\">Empty graph</text>",
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        out.push_str("</svg>\n");
        return out;
    }

    let g = graph.graph();
    let members = weakly_connected_components(graph)
        .into_iter()
        .next()
        .unwrap_or_else(|| g.node_indices().collect());
    let positions = layout::spring_layout(
        graph,
        &members,
        layout::DEFAULT_SPACING,
        layout::DEFAULT_ITERATIONS,
        rng,
    );

    out.push_str(
        "  <defs>\n    <marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" \
         markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\">\n      \
         <path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"black\" />\n    </marker>\n  </defs>\n",
    );

    for edge in g.edge_references() {
        let (Some(&from), Some(&to)) = (
            positions.get(&edge.source()),
            positions.get(&edge.target()),
        ) else {
            continue;
        };
        let (x1, y1) = to_canvas(from);
        let (x2, y2) = to_canvas(to);
        let _ = writeln!(
            out,
            "  <line x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\" stroke=\"black\" \
             stroke-opacity=\"0.7\" stroke-width=\"{:.2}\" marker-end=\"url(#arrow)\" />",
            edge_width(*edge.weight())
        );
    }

    draw_nodes(&mut out, graph, &members, &positions);
    out.push_str("</svg>\n");
    out
}

fn draw_nodes(
    out: &mut String,
    graph: &MentionGraph,
    members: &[petgraph::graph::NodeIndex],
    positions: &Positions,
) {
    let g = graph.graph();
    for idx in members {
        let Some(&p) = positions.get(idx) else {
            continue;
        };
        let (x, y) = to_canvas(p);
        let _ = writeln!(
            out,
            "  <circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"{NODE_RADIUS}\" fill=\"{NODE_COLOR}\" />"
        );
        let _ = writeln!(
            out,
            "  <text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" dominant-baseline=\"middle\" \
             font-family=\"sans-serif\" font-size=\"{LABEL_SIZE}\">{}</text>",
            xml_escape(&g[*idx])
        );
    }
}

/// Map a layout coordinate in `[-1, 1]²` to canvas pixels.
fn to_canvas((x, y): (f64, f64)) -> (f64, f64) {
    let half_w = WIDTH / 2.0 - MARGIN;
    let half_h = HEIGHT / 2.0 - MARGIN;
    (WIDTH / 2.0 + x * half_w, HEIGHT / 2.0 - y * half_h)
}

fn write_file(path: &Path, content: &str) -> ExportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Write {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| ExportError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    fn sample() -> MentionGraph {
        let mut g = MentionGraph::new();
        g.add_mention("a", "b");
        g.add_mention("a", "b");
        g.add_mention("b", "a");
        g.add_mention("x", "y");
        g
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(GraphFormat::from_path(Path::new("n.graphml")), GraphFormat::GraphMl);
        assert_eq!(GraphFormat::from_path(Path::new("n.DOT")), GraphFormat::Dot);
        assert_eq!(GraphFormat::from_path(Path::new("n.gv")), GraphFormat::Dot);
        assert_eq!(GraphFormat::from_path(Path::new("noext")), GraphFormat::GraphMl);
    }

    #[test]
    fn graphml_has_nodes_and_weighted_edges() {
        let xml = to_graphml(&sample());
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("attr.name=\"weight\" attr.type=\"long\""));
        assert!(xml.contains("<graph edgedefault=\"directed\">"));
        for node in ["a", "b", "x", "y"] {
            assert!(xml.contains(&format!("<node id=\"{node}\" />")));
        }
        assert!(xml.contains(
            "<edge source=\"a\" target=\"b\">\n      <data key=\"d0\">2</data>"
        ));
        assert!(xml.contains(
            "<edge source=\"b\" target=\"a\">\n      <data key=\"d0\">1</data>"
        ));
        assert_eq!(xml.matches("<edge ").count(), 3);
        assert!(xml.trim_end().ends_with("</graphml>"));
    }

    #[test]
    fn graphml_escapes_ids() {
        assert_eq!(xml_escape("a&b<\"c\">"), "a&amp;b&lt;&quot;c&quot;&gt;");
    }

    #[test]
    fn dot_carries_weights() {
        let dot = to_dot(&sample());
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("weight = 2"));
        assert!(dot.contains("weight = 1"));
        assert!(dot.contains("label = \"a\""));
    }

    #[test]
    fn write_graph_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outputs/network.graphml");
        let format = write_graph(&sample(), &path).unwrap();
        assert_eq!(format, GraphFormat::GraphMl);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<graphml"));
    }

    #[test]
    fn svg_draws_largest_component_only() {
        let svg = render_svg(&sample(), &mut StdRng::seed_from_u64(11));
        assert!(svg.contains(">a</text>"));
        assert!(svg.contains(">b</text>"));
        assert!(!svg.contains(">x</text>"));
        assert_eq!(svg.matches("<line ").count(), 2);
        assert!(svg.contains("stroke-width=\"0.50\""));
    }

    #[test]
    fn svg_empty_graph_placeholder() {
        let svg = render_svg(&MentionGraph::new(), &mut StdRng::seed_from_u64(0));
        assert!(svg.contains("Empty graph"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn edge_width_floor() {
        assert_eq!(edge_width(1), 0.5);
        assert_eq!(edge_width(2), 0.5);
        assert!((edge_width(10) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn render_image_rejects_png() {
        let dir = TempDir::new().unwrap();
        let err = render_image(&sample(), &dir.path().join("g.png")).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedImageFormat { .. }));
    }

    #[test]
    fn render_image_writes_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img/g.svg");
        render_image(&sample(), &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().starts_with("<svg"));
    }
}
