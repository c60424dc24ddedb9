//! Pointer and wheel input turned into drag, pan, selection and context actions.
//!
//! ```text
//! Idle --down on node--> DraggingNode --up/leave--> Idle
//! Idle --down on empty--> Panning --up/leave--> Idle
//! Idle --down on edge--> Idle
//! ```

use super::events::GraphEvent;
use super::layout::LayoutEngine;
use super::render::Renderer;
use super::selection::{Focus, SelectionState};
use super::viewport::ViewTransform;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
	#[default]
	Idle,
	Panning,
	DraggingNode { node_id: String },
}

/// Cursor affordance to apply to the canvas after a pointer move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorStyle {
	Default,
	Pointer,
}

impl CursorStyle {
	pub fn as_css(self) -> &'static str {
		match self {
			CursorStyle::Default => "default",
			CursorStyle::Pointer => "pointer",
		}
	}
}

/// Everything a handler may read or mutate, borrowed from the engine for one call.
pub struct InteractionContext<'a> {
	pub layout: &'a mut LayoutEngine,
	pub renderer: &'a Renderer,
	pub transform: &'a mut ViewTransform,
	pub selection: &'a mut SelectionState,
	pub events: &'a mut Vec<GraphEvent>,
}

impl InteractionContext<'_> {
	/// Node first, then edge, as the user sees them.
	fn hit_test(&self, x: f64, y: f64) -> Focus {
		let graph = self.layout.graph();
		if let Some(node) = self.renderer.hit_test_node(graph, &*self.transform, x, y) {
			return Focus::Node(node.id.clone());
		}
		if let Some(edge) = self.renderer.hit_test_edge(graph, &*self.transform, x, y) {
			return Focus::Edge(edge.id.clone());
		}
		Focus::None
	}
}

#[derive(Debug, Default)]
pub struct InteractionController {
	mode: InteractionMode,
	last_pointer: (f64, f64),
}

impl InteractionController {
	pub fn mode(&self) -> &InteractionMode {
		&self.mode
	}

	pub fn dragged_node_id(&self) -> Option<&str> {
		match &self.mode {
			InteractionMode::DraggingNode { node_id } => Some(node_id),
			_ => None,
		}
	}

	fn transition(&mut self, mode: InteractionMode) {
		if self.mode != mode {
			log::debug!("interaction {:?} -> {:?}", self.mode, mode);
			self.mode = mode;
		}
	}

	pub fn pointer_down(&mut self, ctx: &mut InteractionContext<'_>, x: f64, y: f64) {
		if !x.is_finite() || !y.is_finite() {
			return;
		}
		if self.mode != InteractionMode::Idle {
			self.release(ctx);
		}
		self.last_pointer = (x, y);

		match ctx.hit_test(x, y) {
			Focus::Node(node_id) => {
				ctx.layout.pin(&node_id, true);
				ctx.events.push(ctx.selection.select_node(Some(&node_id)));
				self.transition(InteractionMode::DraggingNode { node_id });
			}
			Focus::Edge(edge_id) => {
				ctx.events.push(ctx.selection.select_edge(Some(&edge_id)));
			}
			Focus::None => {
				ctx.events.push(ctx.selection.clear_selection());
				self.transition(InteractionMode::Panning);
			}
		}
	}

	/// Returns the cursor to show when hover was re-evaluated.
	pub fn pointer_move(&mut self, ctx: &mut InteractionContext<'_>, x: f64, y: f64) -> Option<CursorStyle> {
		if !x.is_finite() || !y.is_finite() {
			return None;
		}
		let (last_x, last_y) = std::mem::replace(&mut self.last_pointer, (x, y));

		match &self.mode {
			InteractionMode::DraggingNode { node_id } => {
				let (gx, gy) = ctx.transform.screen_to_graph(x, y);
				ctx.layout.set_position(node_id, gx, gy);
				None
			}
			InteractionMode::Panning => {
				ctx.transform.pan(x - last_x, y - last_y);
				None
			}
			InteractionMode::Idle => {
				let hovered = ctx.hit_test(x, y);
				let cursor = match hovered {
					Focus::None => CursorStyle::Default,
					_ => CursorStyle::Pointer,
				};
				ctx.selection.set_hover(hovered);
				Some(cursor)
			}
		}
	}

	pub fn pointer_up(&mut self, ctx: &mut InteractionContext<'_>) {
		self.release(ctx);
	}

	/// Ends any gesture and drops hover, since the pointer is no longer over the canvas.
	pub fn pointer_leave(&mut self, ctx: &mut InteractionContext<'_>) {
		self.release(ctx);
		ctx.selection.set_hover(Focus::None);
	}

	fn release(&mut self, ctx: &mut InteractionContext<'_>) {
		if let InteractionMode::DraggingNode { node_id } = &self.mode {
			ctx.layout.pin(node_id, false);
		}
		self.transition(InteractionMode::Idle);
	}

	/// Zooms one notch around the pointer whatever the current mode.
	pub fn wheel(&mut self, ctx: &mut InteractionContext<'_>, x: f64, y: f64, delta_y: f64) {
		if delta_y.is_nan() || !x.is_finite() || !y.is_finite() {
			return;
		}
		ctx.transform.apply_zoom(x, y, delta_y < 0.0);
	}

	/// Secondary action at canvas point `(x, y)`; the request carries client coordinates.
	pub fn context(&mut self, ctx: &mut InteractionContext<'_>, x: f64, y: f64, client_x: f64, client_y: f64) {
		if !x.is_finite() || !y.is_finite() {
			return;
		}
		match ctx.hit_test(x, y) {
			Focus::Node(node_id) => {
				ctx.events.push(ctx.selection.select_node(Some(&node_id)));
				ctx.events.push(GraphEvent::NodeContextRequested {
					node_id,
					x: client_x,
					y: client_y,
				});
			}
			Focus::Edge(edge_id) => {
				ctx.events.push(ctx.selection.select_edge(Some(&edge_id)));
				ctx.events.push(GraphEvent::EdgeContextRequested {
					edge_id,
					x: client_x,
					y: client_y,
				});
			}
			Focus::None => {}
		}
	}

	/// Returns to Idle without touching the layout, used when the dragged node vanished.
	pub fn cancel_drag_of(&mut self, removed: impl Fn(&str) -> bool) {
		if self.dragged_node_id().is_some_and(removed) {
			self.transition(InteractionMode::Idle);
		}
	}
}
