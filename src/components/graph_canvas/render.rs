use std::f64::consts::PI;

use super::selection::SelectionState;
use super::style::{EdgeStyle, NodeStyle, SELECTED_BORDER, SELECTED_FILL, StyleTable};
use super::surface::{Surface, TextBaseline, TextStyle};
use super::types::{VisualEdge, VisualGraph, VisualNode};
use super::viewport::ViewTransform;

const SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.2)";
const SHADOW_SPREAD: f64 = 2.0;
const ICON_FONT: &str = "12px FontAwesome";
const ICON_COLOR: &str = "white";
const NODE_LABEL_FONT: &str = "bold 12px Inter, sans-serif";
const NODE_LABEL_COLOR: &str = "#1F2937";
const NODE_LABEL_GAP: f64 = 8.0;
const EMPHASIS_BORDER: &str = "#4B5563";
const PLAIN_BORDER: &str = "#9CA3AF";

const ARROW_SIZE: f64 = 8.0;
const ARROW_HALF_ANGLE: f64 = PI / 8.0;
const ARROW_INSET: f64 = 5.0;
const EDGE_LABEL_FONT: &str = "11px Inter, sans-serif";
const EDGE_LABEL_COLOR: &str = "#4B5563";
const EDGE_LABEL_BACKGROUND: &str = "rgba(255, 255, 255, 0.8)";
const EDGE_LABEL_HEIGHT: f64 = 16.0;
const EDGE_LABEL_PADDING: f64 = 10.0;

pub const DEFAULT_EDGE_HIT_THRESHOLD: f64 = 5.0;

/// Highest-precedence visual state of a node for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeState {
	Selected,
	Hovered,
	Highlighted,
	Dragged,
	Plain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeState {
	Selected,
	Hovered,
	Highlighted,
	Plain,
}

impl NodeState {
	fn fill(self, style: &NodeStyle) -> &'static str {
		match self {
			NodeState::Selected => SELECTED_FILL,
			NodeState::Hovered => style.hover_fill,
			NodeState::Highlighted => style.highlight_fill,
			NodeState::Dragged => style.drag_fill,
			NodeState::Plain => style.fill,
		}
	}

	fn border(self) -> (f64, &'static str) {
		match self {
			NodeState::Selected => (3.0, SELECTED_BORDER),
			NodeState::Hovered | NodeState::Highlighted => (2.0, EMPHASIS_BORDER),
			NodeState::Dragged | NodeState::Plain => (1.0, PLAIN_BORDER),
		}
	}
}

impl EdgeState {
	fn stroke(self, style: &EdgeStyle) -> (f64, &'static str) {
		match self {
			EdgeState::Selected => (3.0, SELECTED_FILL),
			EdgeState::Hovered => (style.line_width.max(2.0), style.hover_stroke),
			EdgeState::Highlighted => (style.line_width.max(2.0), style.highlight_stroke),
			EdgeState::Plain => (style.line_width, style.stroke),
		}
	}

	fn arrow_fill(self, style: &EdgeStyle) -> &'static str {
		match self {
			EdgeState::Selected => SELECTED_FILL,
			EdgeState::Hovered | EdgeState::Highlighted => style.hover_stroke,
			EdgeState::Plain => style.stroke,
		}
	}
}

/// Draws the working set and answers hit tests against the same geometry.
#[derive(Clone, Debug)]
pub struct Renderer {
	pub styles: StyleTable,
	/// Maximum graph-space distance from a segment that still hits an edge.
	pub edge_hit_threshold: f64,
}

impl Default for Renderer {
	fn default() -> Self {
		Self::new(StyleTable::default(), DEFAULT_EDGE_HIT_THRESHOLD)
	}
}

impl Renderer {
	pub fn new(styles: StyleTable, edge_hit_threshold: f64) -> Self {
		Self {
			styles,
			edge_hit_threshold,
		}
	}

	/// Full redraw: edges first so node bodies cover their endpoints.
	pub fn render(
		&self,
		surface: &mut impl Surface,
		graph: &VisualGraph,
		transform: &ViewTransform,
		selection: &SelectionState,
		dragged: Option<&str>,
	) {
		surface.clear();
		surface.push_transform(transform.translate_x, transform.translate_y, transform.scale);
		for edge in graph.edges() {
			if let Some((source, target)) = graph.endpoints(edge) {
				self.draw_edge(surface, edge, source, target, selection);
			}
		}
		for node in graph.nodes() {
			self.draw_node(surface, node, selection, dragged);
		}
		surface.pop_transform();
	}

	fn draw_node(
		&self,
		surface: &mut impl Surface,
		node: &VisualNode,
		selection: &SelectionState,
		dragged: Option<&str>,
	) {
		let style = self.styles.node_style(&node.node_type);
		let state = if selection.is_node_selected(&node.id) {
			NodeState::Selected
		} else if selection.is_node_hovered(&node.id) {
			NodeState::Hovered
		} else if selection.is_node_highlighted(&node.id) {
			NodeState::Highlighted
		} else if dragged == Some(node.id.as_str()) {
			NodeState::Dragged
		} else {
			NodeState::Plain
		};
		let (x, y, r) = (node.x, node.y, node.radius);

		surface.fill_circle(x, y, r + SHADOW_SPREAD, SHADOW_COLOR);
		surface.fill_circle(x, y, r, state.fill(style));
		let (border_width, border_color) = state.border();
		surface.stroke_circle(x, y, r, border_width, border_color);

		surface.fill_text(
			style.icon,
			x,
			y,
			&TextStyle {
				font: ICON_FONT,
				color: ICON_COLOR,
				baseline: TextBaseline::Middle,
			},
		);
		surface.fill_text(
			&node.label,
			x,
			y + r + NODE_LABEL_GAP,
			&TextStyle {
				font: NODE_LABEL_FONT,
				color: NODE_LABEL_COLOR,
				baseline: TextBaseline::Top,
			},
		);
	}

	fn draw_edge(
		&self,
		surface: &mut impl Surface,
		edge: &VisualEdge,
		source: &VisualNode,
		target: &VisualNode,
		selection: &SelectionState,
	) {
		let style = self.styles.edge_style(&edge.label);
		let state = if selection.is_edge_selected(&edge.id) {
			EdgeState::Selected
		} else if selection.is_edge_hovered(&edge.id) {
			EdgeState::Hovered
		} else if selection.is_edge_highlighted(&edge.id) {
			EdgeState::Highlighted
		} else {
			EdgeState::Plain
		};

		let angle = (target.y - source.y).atan2(target.x - source.x);
		let (cos, sin) = (angle.cos(), angle.sin());
		let start = (source.x + cos * source.radius, source.y + sin * source.radius);
		let end = (target.x - cos * target.radius, target.y - sin * target.radius);

		let (width, color) = state.stroke(style);
		surface.stroke_line(start, end, width, color, style.line_style.dash_pattern());

		let tip = (end.0 - cos * ARROW_INSET, end.1 - sin * ARROW_INSET);
		let barb = |offset: f64| {
			(
				tip.0 - ARROW_SIZE * (angle + offset).cos(),
				tip.1 - ARROW_SIZE * (angle + offset).sin(),
			)
		};
		surface.fill_polygon(
			&[tip, barb(-ARROW_HALF_ANGLE), barb(ARROW_HALF_ANGLE)],
			state.arrow_fill(style),
		);

		if edge.label.is_empty() {
			return;
		}
		let (mid_x, mid_y) = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
		let box_width = surface.measure_text(&edge.label, EDGE_LABEL_FONT) + EDGE_LABEL_PADDING;
		surface.fill_rect(
			mid_x - box_width / 2.0,
			mid_y - EDGE_LABEL_HEIGHT / 2.0,
			box_width,
			EDGE_LABEL_HEIGHT,
			EDGE_LABEL_BACKGROUND,
		);
		surface.fill_text(
			&edge.label,
			mid_x,
			mid_y,
			&TextStyle {
				font: EDGE_LABEL_FONT,
				color: EDGE_LABEL_COLOR,
				baseline: TextBaseline::Middle,
			},
		);
	}

	/// Topmost node containing the screen point, scanning in reverse draw order.
	pub fn hit_test_node<'g>(
		&self,
		graph: &'g VisualGraph,
		transform: &ViewTransform,
		x: f64,
		y: f64,
	) -> Option<&'g VisualNode> {
		let (gx, gy) = transform.screen_to_graph(x, y);
		graph
			.nodes()
			.iter()
			.rev()
			.find(|node| (node.x - gx).hypot(node.y - gy) <= node.radius)
	}

	/// Last edge whose segment passes within the hit threshold of the screen point.
	pub fn hit_test_edge<'g>(
		&self,
		graph: &'g VisualGraph,
		transform: &ViewTransform,
		x: f64,
		y: f64,
	) -> Option<&'g VisualEdge> {
		let (gx, gy) = transform.screen_to_graph(x, y);
		graph.edges().iter().rev().find(|edge| {
			let Some((source, target)) = graph.endpoints(edge) else {
				return false;
			};
			let (dx, dy) = (target.x - source.x, target.y - source.y);
			let length_sq = dx * dx + dy * dy;
			if length_sq == 0.0 {
				return false;
			}
			let t = (((gx - source.x) * dx + (gy - source.y) * dy) / length_sq).clamp(0.0, 1.0);
			let (px, py) = (source.x + t * dx, source.y + t * dy);
			(gx - px).hypot(gy - py) <= self.edge_hit_threshold
		})
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::components::graph_canvas::selection::Focus;
	use crate::components::graph_canvas::types::{GraphLink, GraphNode};

	#[derive(Clone, Debug, PartialEq)]
	pub(crate) enum Op {
		Clear,
		Push(f64, f64, f64),
		Pop,
		FillCircle { x: f64, y: f64, r: f64, color: String },
		StrokeCircle { r: f64, width: f64, color: String },
		Line { from: (f64, f64), to: (f64, f64), width: f64, color: String, dashed: bool },
		Polygon { points: Vec<(f64, f64)>, color: String },
		Rect { x: f64, y: f64, w: f64, h: f64 },
		Text { text: String, x: f64, y: f64, font: String },
	}

	/// Records draw calls; every glyph measures 6 units wide.
	#[derive(Default)]
	pub(crate) struct RecordingSurface {
		pub(crate) ops: Vec<Op>,
	}

	impl Surface for RecordingSurface {
		fn clear(&mut self) {
			self.ops.push(Op::Clear);
		}

		fn push_transform(&mut self, tx: f64, ty: f64, k: f64) {
			self.ops.push(Op::Push(tx, ty, k));
		}

		fn pop_transform(&mut self) {
			self.ops.push(Op::Pop);
		}

		fn fill_circle(&mut self, x: f64, y: f64, r: f64, color: &str) {
			self.ops.push(Op::FillCircle { x, y, r, color: color.into() });
		}

		fn stroke_circle(&mut self, _x: f64, _y: f64, r: f64, width: f64, color: &str) {
			self.ops.push(Op::StrokeCircle { r, width, color: color.into() });
		}

		fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: &str, dash: &[f64]) {
			self.ops.push(Op::Line {
				from,
				to,
				width,
				color: color.into(),
				dashed: !dash.is_empty(),
			});
		}

		fn fill_polygon(&mut self, points: &[(f64, f64)], color: &str) {
			self.ops.push(Op::Polygon {
				points: points.to_vec(),
				color: color.into(),
			});
		}

		fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, _color: &str) {
			self.ops.push(Op::Rect { x, y, w, h });
		}

		fn measure_text(&mut self, text: &str, _font: &str) -> f64 {
			text.chars().count() as f64 * 6.0
		}

		fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle<'_>) {
			self.ops.push(Op::Text {
				text: text.into(),
				x,
				y,
				font: style.font.into(),
			});
		}
	}

	fn graph() -> VisualGraph {
		let node = |id: &str, kind: &str, x: f64, y: f64| VisualNode::new(&GraphNode::new(id, kind, id.to_uppercase()), x, y, 20.0);
		VisualGraph::new(
			vec![node("a", "person", 0.0, 0.0), node("b", "wallet", 100.0, 0.0)],
			vec![VisualEdge::from(&GraphLink::new("e", "a", "b", "owns"))],
		)
	}

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	#[test]
	fn draws_edges_before_nodes_inside_transform() {
		let mut surface = RecordingSurface::default();
		let transform = ViewTransform { translate_x: 5.0, translate_y: 6.0, scale: 2.0 };
		Renderer::default().render(&mut surface, &graph(), &transform, &SelectionState::default(), None);

		assert_eq!(surface.ops.first(), Some(&Op::Clear));
		assert_eq!(surface.ops[1], Op::Push(5.0, 6.0, 2.0));
		assert_eq!(surface.ops.last(), Some(&Op::Pop));
		let line = surface.ops.iter().position(|op| matches!(op, Op::Line { .. })).unwrap();
		let first_node = surface.ops.iter().position(|op| matches!(op, Op::FillCircle { .. })).unwrap();
		assert!(line < first_node);
		assert!(surface.ops.contains(&Op::Text {
			text: "B".into(),
			x: 100.0,
			y: 28.0,
			font: NODE_LABEL_FONT.into(),
		}));
	}

	#[test]
	fn edge_is_trimmed_to_node_boundaries() {
		let mut surface = RecordingSurface::default();
		Renderer::default().render(&mut surface, &graph(), &ViewTransform::default(), &SelectionState::default(), None);

		let Some(Op::Line { from, to, width, color, dashed }) = surface.ops.iter().find(|op| matches!(op, Op::Line { .. })) else {
			panic!("no edge drawn");
		};
		assert!(close(*from, (20.0, 0.0)));
		assert!(close(*to, (80.0, 0.0)));
		assert_eq!((*width, color.as_str(), *dashed), (2.0, "#3B82F6", false));

		let Some(Op::Polygon { points, .. }) = surface.ops.iter().find(|op| matches!(op, Op::Polygon { .. })) else {
			panic!("no arrow drawn");
		};
		assert!(close(points[0], (75.0, 0.0)));

		assert!(surface.ops.contains(&Op::Rect { x: 50.0 - 17.0, y: -8.0, w: 34.0, h: 16.0 }));
	}

	#[test]
	fn node_state_precedence() {
		let renderer = Renderer::default();
		let graph = graph();
		let fill_of = |selection: &SelectionState, dragged: Option<&str>| {
			let mut surface = RecordingSurface::default();
			renderer.render(&mut surface, &graph, &ViewTransform::default(), selection, dragged);
			surface
				.ops
				.iter()
				.find_map(|op| match op {
					Op::FillCircle { x, r, color, .. } if *x == 0.0 && *r == 20.0 => Some(color.clone()),
					_ => None,
				})
				.unwrap()
		};
		let person = *renderer.styles.node_style("person");

		let mut selection = SelectionState::default();
		assert_eq!(fill_of(&selection, Some("a")), person.drag_fill);
		selection.highlight_nodes(["a"]);
		assert_eq!(fill_of(&selection, Some("a")), person.highlight_fill);
		selection.set_hover(Focus::Node("a".into()));
		assert_eq!(fill_of(&selection, Some("a")), person.hover_fill);
		selection.select_node(Some("a"));
		assert_eq!(fill_of(&selection, Some("a")), SELECTED_FILL);
	}

	#[test]
	fn dangling_edges_are_not_drawn() {
		let mut graph = graph();
		graph.set_edges(vec![VisualEdge::from(&GraphLink::new("x", "a", "ghost", "owns"))]);
		let mut surface = RecordingSurface::default();
		Renderer::default().render(&mut surface, &graph, &ViewTransform::default(), &SelectionState::default(), None);
		assert!(!surface.ops.iter().any(|op| matches!(op, Op::Line { .. } | Op::Polygon { .. })));
	}

	#[test]
	fn node_hit_test_prefers_topmost_and_is_repeatable() {
		let renderer = Renderer::default();
		let node = |id: &str, x: f64| VisualNode::new(&GraphNode::new(id, "ip", id), x, 0.0, 20.0);
		let graph = VisualGraph::new(vec![node("under", 0.0), node("over", 10.0)], Vec::new());
		let transform = ViewTransform::default();

		let hit = renderer.hit_test_node(&graph, &transform, 5.0, 0.0).map(|n| n.id.clone());
		assert_eq!(hit.as_deref(), Some("over"));
		let again = renderer.hit_test_node(&graph, &transform, 5.0, 0.0).map(|n| n.id.clone());
		assert_eq!(hit, again);
		assert!(renderer.hit_test_node(&graph, &transform, 0.0, 40.0).is_none());
	}

	#[test]
	fn node_center_always_hits() {
		let renderer = Renderer::default();
		let transform = ViewTransform { translate_x: -40.0, translate_y: 17.0, scale: 0.5 };
		for radius in [1.0, 3.5, 20.0, 64.0] {
			let node = VisualNode::new(&GraphNode::new("n", "ip", ""), 123.0, -45.0, radius);
			let graph = VisualGraph::new(vec![node], Vec::new());
			let (sx, sy) = transform.graph_to_screen(123.0, -45.0);
			assert!(renderer.hit_test_node(&graph, &transform, sx, sy).is_some());
		}
	}

	#[test]
	fn edge_hit_test_uses_clamped_segment_distance() {
		let renderer = Renderer::new(StyleTable::default(), 5.0);
		let graph = graph();
		let transform = ViewTransform::default();
		assert_eq!(renderer.hit_test_edge(&graph, &transform, 50.0, 4.0).map(|e| e.id.as_str()), Some("e"));
		assert!(renderer.hit_test_edge(&graph, &transform, 50.0, 6.0).is_none());
		// beyond the target end, t clamps to 1
		assert!(renderer.hit_test_edge(&graph, &transform, 104.0, 0.0).is_some());
		assert!(renderer.hit_test_edge(&graph, &transform, 110.0, 0.0).is_none());
	}

	#[test]
	fn zero_length_edges_never_hit() {
		let renderer = Renderer::new(StyleTable::default(), 5.0);
		let node = |id: &str| VisualNode::new(&GraphNode::new(id, "ip", ""), 10.0, 10.0, 20.0);
		let graph = VisualGraph::new(
			vec![node("a"), node("b")],
			vec![VisualEdge::from(&GraphLink::new("e", "a", "b", ""))],
		);
		assert!(renderer.hit_test_edge(&graph, &ViewTransform::default(), 10.0, 10.0).is_none());
	}
}
