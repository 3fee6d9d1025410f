//! Standalone SVG rendering with a deterministic circular layout.

use std::f64::consts::PI;
use std::fmt::Write;

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

use super::PairSummary;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;
const MARGIN: f64 = 90.0;
const NODE_RADIUS: f64 = 26.0;
const NODE_FILL: &str = "#ffa500";
const EDGE_STROKE: &str = "#555555";

/// Render the graph as an SVG document.
///
/// Nodes sit on a circle in insertion order, starting at twelve o'clock.
/// Edges are straight lines labelled at their midpoint.
pub fn render_svg(g: &UnGraph<String, PairSummary>, title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    );
    let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        out,
        r#"<text x="{}" y="36" text-anchor="middle" font-size="22">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    );

    if g.node_count() == 0 {
        let _ = writeln!(
            out,
            r##"<text x="{}" y="{}" text-anchor="middle" font-size="18" fill="#888888">empty graph</text>"##,
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        out.push_str("</svg>\n");
        return out;
    }

    let positions = circle_layout(g.node_count());

    for edge in g.edge_references() {
        let (x1, y1) = positions[edge.source().index()];
        let (x2, y2) = positions[edge.target().index()];
        let width = 1.0 + (edge.weight().count as f64).ln_1p();
        let _ = writeln!(
            out,
            r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="{EDGE_STROKE}" stroke-width="{width:.2}"/>"#
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="{EDGE_STROKE}">{}</text>"#,
            (x1 + x2) / 2.0,
            (y1 + y2) / 2.0 - 4.0,
            escape(&edge.weight().to_string())
        );
    }

    for idx in g.node_indices() {
        let (x, y) = positions[idx.index()];
        let _ = writeln!(
            out,
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="{NODE_RADIUS}" fill="{NODE_FILL}" fill-opacity="0.9"/>"#
        );
        let _ = writeln!(
            out,
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="13" font-weight="bold">{}</text>"#,
            y + 4.0,
            escape(&g[idx])
        );
    }

    out.push_str("</svg>\n");
    out
}

/// Node centres on a circle filling the canvas.
fn circle_layout(n: usize) -> Vec<(f64, f64)> {
    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0 + 20.0;
    if n == 1 {
        return vec![(cx, cy)];
    }
    let radius = (HEIGHT / 2.0 - MARGIN).min(WIDTH / 2.0 - MARGIN);
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64 - PI / 2.0;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

/// Escape text for XML content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> UnGraph<String, PairSummary> {
        let mut g = UnGraph::new_undirected();
        let a = g.add_node("Tom & Jerry".to_string());
        let b = g.add_node("<House>".to_string());
        g.add_edge(
            a,
            b,
            PairSummary {
                count: 3,
                relationships: vec!["chased".into()],
                latest_time: "1940".into(),
            },
        );
        g
    }

    #[test]
    fn escapes_labels() {
        let svg = render_svg(&two_nodes(), "Cats \"and\" mice");
        assert!(svg.contains("Tom &amp; Jerry"));
        assert!(svg.contains("&lt;House&gt;"));
        assert!(svg.contains("Cats &quot;and&quot; mice"));
        assert!(svg.contains("3x 1940: chased"));
    }

    #[test]
    fn one_circle_per_node_one_line_per_edge() {
        let svg = render_svg(&two_nodes(), "t");
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<line").count(), 1);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn layout_is_deterministic_and_on_canvas() {
        let a = circle_layout(7);
        assert_eq!(a, circle_layout(7));
        for (x, y) in a {
            assert!((0.0..=WIDTH).contains(&x));
            assert!((0.0..=HEIGHT).contains(&y));
        }
        assert_eq!(circle_layout(1), vec![(WIDTH / 2.0, HEIGHT / 2.0 + 20.0)]);
    }

    #[test]
    fn empty_graph_placeholder() {
        let svg = render_svg(&UnGraph::new_undirected(), "R Graph");
        assert!(svg.contains("empty graph"));
        assert!(!svg.contains("<circle"));
    }
}
