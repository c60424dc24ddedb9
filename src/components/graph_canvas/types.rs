use std::collections::HashMap;

/// An entity as supplied by the external graph model.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	/// Entity type tag (`person`, `wallet`, ...), used only for styling.
	pub node_type: String,
	pub label: String,
}

/// A relationship as supplied by the external graph model.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub id: String,
	pub source: String,
	pub target: String,
	pub label: String,
}

/// Snapshot of the external model handed to `refresh`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, node_type: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			node_type: node_type.into(),
			label: label.into(),
		}
	}
}

impl GraphLink {
	pub fn new(
		id: impl Into<String>,
		source: impl Into<String>,
		target: impl Into<String>,
		label: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			label: label.into(),
		}
	}
}

/// Position/velocity-bearing projection of a [`GraphNode`].
#[derive(Clone, Debug, PartialEq)]
pub struct VisualNode {
	pub id: String,
	pub node_type: String,
	pub label: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned nodes are skipped by force integration.
	pub fixed: bool,
	pub mass: f64,
	pub radius: f64,
}

impl VisualNode {
	/// Fresh node at rest with default physics state.
	pub fn new(source: &GraphNode, x: f64, y: f64, radius: f64) -> Self {
		Self {
			id: source.id.clone(),
			node_type: source.node_type.clone(),
			label: source.label.clone(),
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fixed: false,
			mass: 1.0,
			radius,
		}
	}

	pub fn speed(&self) -> f64 {
		self.vx.hypot(self.vy)
	}

	pub fn kinetic_energy(&self) -> f64 {
		0.5 * self.mass * (self.vx * self.vx + self.vy * self.vy)
	}
}

/// Edge endpoints are ids, resolved against the node set on every use.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub label: String,
}

impl From<&GraphLink> for VisualEdge {
	fn from(link: &GraphLink) -> Self {
		Self {
			id: link.id.clone(),
			source: link.source.clone(),
			target: link.target.clone(),
			label: link.label.clone(),
		}
	}
}

/// Working set shared by layout, rendering and hit testing.
///
/// Nodes keep snapshot order (later nodes draw on top); `node_index` and
/// `edge_index` give O(1) lookup by id.
#[derive(Clone, Debug, Default)]
pub struct VisualGraph {
	nodes: Vec<VisualNode>,
	edges: Vec<VisualEdge>,
	node_index: HashMap<String, usize>,
	edge_index: HashMap<String, usize>,
}

impl VisualGraph {
	pub fn new(nodes: Vec<VisualNode>, edges: Vec<VisualEdge>) -> Self {
		let mut graph = Self::default();
		graph.set_nodes(nodes);
		graph.set_edges(edges);
		graph
	}

	pub fn set_nodes(&mut self, nodes: Vec<VisualNode>) {
		self.node_index = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		self.nodes = nodes;
	}

	pub fn set_edges(&mut self, edges: Vec<VisualEdge>) {
		self.edge_index = edges
			.iter()
			.enumerate()
			.map(|(i, edge)| (edge.id.clone(), i))
			.collect();
		self.edges = edges;
	}

	pub fn nodes(&self) -> &[VisualNode] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [VisualNode] {
		&mut self.nodes
	}

	pub fn edges(&self) -> &[VisualEdge] {
		&self.edges
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.node_index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&VisualNode> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut VisualNode> {
		let i = self.index_of(id)?;
		self.nodes.get_mut(i)
	}

	pub fn edge(&self, id: &str) -> Option<&VisualEdge> {
		self.edge_index.get(id).map(|&i| &self.edges[i])
	}

	/// Resolves both endpoints; `None` when either id is missing.
	pub fn endpoints(&self, edge: &VisualEdge) -> Option<(&VisualNode, &VisualNode)> {
		Some((self.node(&edge.source)?, self.node(&edge.target)?))
	}

	/// Index pairs of every edge whose endpoints both resolve.
	pub fn resolved_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.edges.iter().filter_map(|edge| {
			Some((self.index_of(&edge.source)?, self.index_of(&edge.target)?))
		})
	}

	pub fn dangling_edge_count(&self) -> usize {
		self.edges.len() - self.resolved_edges().count()
	}

	/// Incident edge ids of `id` and the nodes on their other end, with `id` itself first.
	pub fn connections(&self, id: &str) -> Option<(Vec<String>, Vec<String>)> {
		self.node(id)?;
		let mut node_ids = vec![id.to_owned()];
		let mut edge_ids = Vec::new();
		for edge in &self.edges {
			let other = if edge.source == id {
				&edge.target
			} else if edge.target == id {
				&edge.source
			} else {
				continue;
			};
			if self.node(other).is_none() {
				continue;
			}
			edge_ids.push(edge.id.clone());
			if !node_ids.iter().any(|known| known == other) {
				node_ids.push(other.clone());
			}
		}
		Some((node_ids, edge_ids))
	}
}
