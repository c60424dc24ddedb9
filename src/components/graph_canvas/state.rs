use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::events::GraphEvent;
use super::interaction::{CursorStyle, InteractionContext, InteractionController, InteractionMode};
use super::layout::{LayoutEngine, LayoutParams};
use super::render::{DEFAULT_EDGE_HIT_THRESHOLD, Renderer};
use super::selection::{Focus, SelectionState};
use super::style::StyleTable;
use super::surface::Surface;
use super::types::{GraphData, VisualEdge, VisualGraph, VisualNode};
use super::viewport::ViewTransform;

pub const NODE_RADIUS: f64 = 20.0;
const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 600.0;

#[derive(Clone, Debug)]
pub struct EngineConfig {
	pub node_radius: f64,
	pub edge_hit_threshold: f64,
	pub layout: LayoutParams,
	/// Seeds placement of new nodes and the layout jitter.
	pub seed: u64,
	pub styles: StyleTable,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			node_radius: NODE_RADIUS,
			edge_hit_threshold: DEFAULT_EDGE_HIT_THRESHOLD,
			layout: LayoutParams::default(),
			seed: 0,
			styles: StyleTable::default(),
		}
	}
}

/// Owns the working set, view, selection and input state of one canvas.
///
/// Notifications produced by any call are queued and handed out by
/// [`GraphEngine::take_events`].
pub struct GraphEngine {
	layout: LayoutEngine,
	renderer: Renderer,
	transform: ViewTransform,
	selection: SelectionState,
	controller: InteractionController,
	placement: SmallRng,
	node_radius: f64,
	width: f64,
	height: f64,
	outbox: Vec<GraphEvent>,
}

impl Default for GraphEngine {
	fn default() -> Self {
		Self::new(EngineConfig::default())
	}
}

impl GraphEngine {
	pub fn new(config: EngineConfig) -> Self {
		Self {
			layout: LayoutEngine::new(config.layout, config.seed),
			renderer: Renderer::new(config.styles, config.edge_hit_threshold),
			transform: ViewTransform::default(),
			selection: SelectionState::default(),
			controller: InteractionController::default(),
			placement: SmallRng::seed_from_u64(config.seed.rotate_left(32) ^ 0x9e37_79b9),
			node_radius: config.node_radius,
			width: DEFAULT_WIDTH,
			height: DEFAULT_HEIGHT,
			outbox: Vec::new(),
		}
	}

	pub fn graph(&self) -> &VisualGraph {
		self.layout.graph()
	}

	pub fn transform(&self) -> &ViewTransform {
		&self.transform
	}

	pub fn selection(&self) -> &SelectionState {
		&self.selection
	}

	pub fn mode(&self) -> &InteractionMode {
		self.controller.mode()
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Rebuilds the working set from `data`, keeping physics state for ids seen before.
	pub fn refresh(&mut self, data: &GraphData) {
		let previous = self.layout.graph();
		let mut nodes: Vec<VisualNode> = Vec::with_capacity(data.nodes.len());
		let mut seen = std::collections::HashSet::with_capacity(data.nodes.len());
		for source in &data.nodes {
			if !seen.insert(source.id.as_str()) {
				log::debug!("duplicate node id {} ignored", source.id);
				continue;
			}
			let node = match previous.node(&source.id) {
				Some(existing) => VisualNode {
					node_type: source.node_type.clone(),
					label: source.label.clone(),
					..existing.clone()
				},
				None => {
					let x = self.placement.r#gen::<f64>() * self.width;
					let y = self.placement.r#gen::<f64>() * self.height;
					VisualNode::new(source, x, y, self.node_radius)
				}
			};
			nodes.push(node);
		}

		let mut seen = std::collections::HashSet::with_capacity(data.links.len());
		let edges: Vec<VisualEdge> = data
			.links
			.iter()
			.filter(|link| seen.insert(link.id.as_str()))
			.map(VisualEdge::from)
			.collect();

		self.layout.initialize(nodes, edges);
		let graph = self.layout.graph();
		log::info!("graph refreshed: {} nodes, {} edges", graph.nodes().len(), graph.edges().len());
		let dangling = graph.dangling_edge_count();
		if dangling > 0 {
			log::warn!("{dangling} edge(s) reference missing nodes and are skipped");
		}

		let selection_gone = match self.selection.selected() {
			Focus::Node(id) => graph.node(id).is_none(),
			Focus::Edge(id) => graph.edge(id).is_none(),
			Focus::None => false,
		};
		if selection_gone {
			self.outbox.push(self.selection.clear_selection());
		}
		let hover_gone = match self.selection.hovered() {
			Focus::Node(id) => graph.node(id).is_none(),
			Focus::Edge(id) => graph.edge(id).is_none(),
			Focus::None => false,
		};
		if hover_gone {
			self.selection.set_hover(Focus::None);
		}
		self.controller.cancel_drag_of(|id| graph.node(id).is_none());
	}

	/// One simulation step; `false` when the layout is empty or asleep.
	pub fn tick(&mut self) -> bool {
		self.layout.step()
	}

	pub fn render(&self, surface: &mut impl Surface) {
		self.renderer.render(
			surface,
			self.layout.graph(),
			&self.transform,
			&self.selection,
			self.controller.dragged_node_id(),
		);
	}

	/// Unknown ids clear the selection.
	pub fn select_node(&mut self, id: Option<&str>) {
		let id = id.filter(|id| self.layout.graph().node(id).is_some());
		log::debug!("select node {id:?}");
		self.outbox.push(self.selection.select_node(id));
	}

	pub fn select_edge(&mut self, id: Option<&str>) {
		let id = id.filter(|id| self.layout.graph().edge(id).is_some());
		log::debug!("select edge {id:?}");
		self.outbox.push(self.selection.select_edge(id));
	}

	pub fn selected_node_id(&self) -> Option<&str> {
		self.selection.selected_node_id()
	}

	pub fn selected_edge_id(&self) -> Option<&str> {
		self.selection.selected_edge_id()
	}

	pub fn highlight_nodes<I, S>(&mut self, ids: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.selection.highlight_nodes(ids);
	}

	pub fn highlight_edges<I, S>(&mut self, ids: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.selection.highlight_edges(ids);
	}

	pub fn clear_highlights(&mut self) {
		self.selection.clear_highlights();
	}

	pub fn highlight_generation(&self) -> u64 {
		self.selection.highlight_generation()
	}

	pub fn clear_highlights_from(&mut self, generation: u64) -> bool {
		self.selection.clear_highlights_from(generation)
	}

	/// Moves the view so the node sits at the canvas centre; scale is unchanged.
	pub fn center_on_node(&mut self, id: &str) -> bool {
		let Some(node) = self.layout.graph().node(id) else {
			return false;
		};
		let (x, y) = (node.x, node.y);
		self.transform.center_on(x, y, self.width, self.height);
		true
	}

	/// Node ids (the node first) and incident edge ids around `id`.
	pub fn connections(&self, id: &str) -> Option<(Vec<String>, Vec<String>)> {
		self.layout.graph().connections(id)
	}

	pub fn set_parameter(&mut self, name: &str, value: f64) {
		self.layout.set_parameter(name, value);
	}

	pub fn parameter(&self, name: &str) -> Option<f64> {
		self.layout.parameter(name)
	}

	/// Non-finite or non-positive sizes are ignored.
	pub fn resize(&mut self, width: f64, height: f64) {
		if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
			return;
		}
		self.width = width;
		self.height = height;
	}

	pub fn take_events(&mut self) -> Vec<GraphEvent> {
		std::mem::take(&mut self.outbox)
	}

	fn interact<R>(
		&mut self,
		f: impl FnOnce(&mut InteractionController, &mut InteractionContext<'_>) -> R,
	) -> R {
		let mut ctx = InteractionContext {
			layout: &mut self.layout,
			renderer: &self.renderer,
			transform: &mut self.transform,
			selection: &mut self.selection,
			events: &mut self.outbox,
		};
		f(&mut self.controller, &mut ctx)
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.interact(|controller, ctx| controller.pointer_down(ctx, x, y));
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<CursorStyle> {
		self.interact(|controller, ctx| controller.pointer_move(ctx, x, y))
	}

	pub fn pointer_up(&mut self) {
		self.interact(|controller, ctx| controller.pointer_up(ctx));
	}

	pub fn pointer_leave(&mut self) {
		self.interact(|controller, ctx| controller.pointer_leave(ctx));
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		self.interact(|controller, ctx| controller.wheel(ctx, x, y, delta_y));
	}

	pub fn context(&mut self, x: f64, y: f64, client_x: f64, client_y: f64) {
		self.interact(|controller, ctx| controller.context(ctx, x, y, client_x, client_y));
	}
}
