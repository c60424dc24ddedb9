//! Colour tables keyed by node type and edge label.
//!
//! Lookup: exact key first, then the longest key the label contains
//! (ties keep table order), then the default entry.

/// Fill used for the selected node or edge regardless of its style entry.
pub const SELECTED_FILL: &str = "#3B82F6";
pub const SELECTED_BORDER: &str = "#1D4ED8";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeStyle {
	/// Icon-font glyph drawn at the node centre.
	pub icon: &'static str,
	pub fill: &'static str,
	pub hover_fill: &'static str,
	pub highlight_fill: &'static str,
	pub drag_fill: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
	Solid,
	Dashed,
}

impl LineStyle {
	pub fn dash_pattern(self) -> &'static [f64] {
		match self {
			LineStyle::Solid => &[],
			LineStyle::Dashed => &[6.0, 4.0],
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke: &'static str,
	pub hover_stroke: &'static str,
	pub highlight_stroke: &'static str,
	pub line_style: LineStyle,
	pub line_width: f64,
}

const DEFAULT_NODE: NodeStyle = NodeStyle {
	icon: "\u{f111}",
	fill: "#9CA3AF",
	hover_fill: "#D1D5DB",
	highlight_fill: "#E5E7EB",
	drag_fill: "#6B7280",
};

const DEFAULT_EDGE: EdgeStyle = EdgeStyle {
	stroke: "#9CA3AF",
	hover_stroke: "#4B5563",
	highlight_stroke: "#374151",
	line_style: LineStyle::Solid,
	line_width: 1.0,
};

const fn node(
	icon: &'static str,
	fill: &'static str,
	hover_fill: &'static str,
	highlight_fill: &'static str,
	drag_fill: &'static str,
) -> NodeStyle {
	NodeStyle {
		icon,
		fill,
		hover_fill,
		highlight_fill,
		drag_fill,
	}
}

const fn edge(
	stroke: &'static str,
	hover_stroke: &'static str,
	highlight_stroke: &'static str,
	line_style: LineStyle,
	line_width: f64,
) -> EdgeStyle {
	EdgeStyle {
		stroke,
		hover_stroke,
		highlight_stroke,
		line_style,
		line_width,
	}
}

const NODE_TYPES: &[(&str, NodeStyle)] = &[
	("person", node("\u{f007}", "#3B82F6", "#60A5FA", "#93C5FD", "#2563EB")),
	("organization", node("\u{f1ad}", "#10B981", "#34D399", "#6EE7B7", "#059669")),
	("wallet", node("\u{f555}", "#F59E0B", "#FBBF24", "#FCD34D", "#D97706")),
	("ip", node("\u{f6ff}", "#EF4444", "#F87171", "#FCA5A5", "#DC2626")),
	("location", node("\u{f3c5}", "#8B5CF6", "#A78BFA", "#C4B5FD", "#7C3AED")),
	("transaction", node("\u{f155}", "#EC4899", "#F472B6", "#F9A8D4", "#DB2777")),
	("social", node("\u{f099}", "#0EA5E9", "#38BDF8", "#7DD3FC", "#0284C7")),
	("domain", node("\u{f0ac}", "#14B8A6", "#2DD4BF", "#5EEAD4", "#0D9488")),
	("website", node("\u{f0c1}", "#6366F1", "#818CF8", "#A5B4FC", "#4F46E5")),
];

const EDGE_LABELS: &[(&str, EdgeStyle)] = &[
	("owns", edge("#3B82F6", "#2563EB", "#1D4ED8", LineStyle::Solid, 2.0)),
	("knows", edge("#10B981", "#059669", "#047857", LineStyle::Solid, 1.0)),
	("sent to", edge("#F59E0B", "#D97706", "#B45309", LineStyle::Solid, 1.0)),
	("received from", edge("#F59E0B", "#D97706", "#B45309", LineStyle::Dashed, 1.0)),
	("controls", edge("#EF4444", "#DC2626", "#B91C1C", LineStyle::Solid, 2.0)),
	("accessed from", edge("#8B5CF6", "#7C3AED", "#6D28D9", LineStyle::Solid, 1.0)),
	("hosts", edge("#EC4899", "#DB2777", "#BE185D", LineStyle::Solid, 1.0)),
	("communicated with", edge("#0EA5E9", "#0284C7", "#0369A1", LineStyle::Solid, 1.0)),
];

#[derive(Clone, Debug, PartialEq)]
pub struct StyleTable {
	pub nodes: Vec<(&'static str, NodeStyle)>,
	pub edges: Vec<(&'static str, EdgeStyle)>,
	pub default_node: NodeStyle,
	pub default_edge: EdgeStyle,
}

impl Default for StyleTable {
	fn default() -> Self {
		Self {
			nodes: NODE_TYPES.to_vec(),
			edges: EDGE_LABELS.to_vec(),
			default_node: DEFAULT_NODE,
			default_edge: DEFAULT_EDGE,
		}
	}
}

impl StyleTable {
	pub fn node_style(&self, node_type: &str) -> &NodeStyle {
		resolve(&self.nodes, node_type).unwrap_or(&self.default_node)
	}

	pub fn edge_style(&self, label: &str) -> &EdgeStyle {
		resolve(&self.edges, label).unwrap_or(&self.default_edge)
	}
}

fn resolve<'a, T>(entries: &'a [(&'static str, T)], key: &str) -> Option<&'a T> {
	if key.is_empty() {
		return None;
	}
	if let Some((_, style)) = entries.iter().find(|(name, _)| *name == key) {
		return Some(style);
	}
	entries
		.iter()
		.filter(|(name, _)| !name.is_empty() && key.contains(name))
		.fold(None::<&(&str, T)>, |best, entry| match best {
			Some(current) if current.0.len() >= entry.0.len() => Some(current),
			_ => Some(entry),
		})
		.map(|(_, style)| style)
}
