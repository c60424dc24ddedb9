use std::cell::RefCell;
use std::rc::Rc;

use super::events::{EventListeners, GraphEvent, Subscription};
use super::interaction::CursorStyle;
use super::state::{EngineConfig, GraphEngine};
use super::surface::Surface;
use super::types::GraphData;

/// Shared handle to one engine instance.
///
/// Every call runs against the engine, then delivers the notifications it
/// produced to this instance's listeners after the engine borrow is released,
/// so listeners may call back into the handle.
#[derive(Clone)]
pub struct GraphHandle {
	engine: Rc<RefCell<GraphEngine>>,
	listeners: EventListeners,
}

impl Default for GraphHandle {
	fn default() -> Self {
		Self::new(EngineConfig::default())
	}
}

impl GraphHandle {
	pub fn new(config: EngineConfig) -> Self {
		Self {
			engine: Rc::new(RefCell::new(GraphEngine::new(config))),
			listeners: EventListeners::default(),
		}
	}

	pub fn subscribe(&self, listener: impl Fn(&GraphEvent) + 'static) -> Subscription {
		self.listeners.subscribe(listener)
	}

	/// Listens for as long as the handle lives.
	pub fn on_event(&self, listener: impl Fn(&GraphEvent) + 'static) {
		self.listeners.listen(listener);
	}

	fn with<R>(&self, f: impl FnOnce(&mut GraphEngine) -> R) -> R {
		let (result, events) = {
			let mut engine = self.engine.borrow_mut();
			let result = f(&mut *engine);
			(result, engine.take_events())
		};
		self.listeners.dispatch(&events);
		result
	}

	/// Read-only access; never produces notifications.
	pub fn inspect<R>(&self, f: impl FnOnce(&GraphEngine) -> R) -> R {
		f(&*self.engine.borrow())
	}

	pub fn refresh(&self, data: &GraphData) {
		self.with(|engine| engine.refresh(data));
	}

	/// Advances the layout one step and redraws.
	pub fn frame(&self, surface: &mut impl Surface) {
		self.with(|engine| {
			engine.tick();
			engine.render(surface);
		});
	}

	pub fn select_node(&self, id: Option<&str>) {
		self.with(|engine| engine.select_node(id));
	}

	pub fn select_edge(&self, id: Option<&str>) {
		self.with(|engine| engine.select_edge(id));
	}

	pub fn selected_node_id(&self) -> Option<String> {
		self.inspect(|engine| engine.selected_node_id().map(str::to_owned))
	}

	pub fn selected_edge_id(&self) -> Option<String> {
		self.inspect(|engine| engine.selected_edge_id().map(str::to_owned))
	}

	pub fn highlight_nodes<I, S>(&self, ids: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.with(|engine| engine.highlight_nodes(ids));
	}

	pub fn highlight_edges<I, S>(&self, ids: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.with(|engine| engine.highlight_edges(ids));
	}

	pub fn clear_highlights(&self) {
		self.with(GraphEngine::clear_highlights);
	}

	/// Token for [`GraphHandle::clear_highlights_from`].
	pub fn highlight_generation(&self) -> u64 {
		self.inspect(GraphEngine::highlight_generation)
	}

	/// Clears highlights only if nothing re-highlighted since `generation` was read.
	pub fn clear_highlights_from(&self, generation: u64) -> bool {
		self.with(|engine| engine.clear_highlights_from(generation))
	}

	pub fn center_on_node(&self, id: &str) -> bool {
		self.with(|engine| engine.center_on_node(id))
	}

	pub fn connections(&self, id: &str) -> Option<(Vec<String>, Vec<String>)> {
		self.inspect(|engine| engine.connections(id))
	}

	pub fn set_parameter(&self, name: &str, value: f64) {
		self.with(|engine| engine.set_parameter(name, value));
	}

	pub fn parameter(&self, name: &str) -> Option<f64> {
		self.inspect(|engine| engine.parameter(name))
	}

	pub fn resize(&self, width: f64, height: f64) {
		self.with(|engine| engine.resize(width, height));
	}

	pub fn pointer_down(&self, x: f64, y: f64) {
		self.with(|engine| engine.pointer_down(x, y));
	}

	pub fn pointer_move(&self, x: f64, y: f64) -> Option<CursorStyle> {
		self.with(|engine| engine.pointer_move(x, y))
	}

	pub fn pointer_up(&self) {
		self.with(GraphEngine::pointer_up);
	}

	pub fn pointer_leave(&self) {
		self.with(GraphEngine::pointer_leave);
	}

	pub fn wheel(&self, x: f64, y: f64, delta_y: f64) {
		self.with(|engine| engine.wheel(x, y, delta_y));
	}

	pub fn context(&self, x: f64, y: f64, client_x: f64, client_y: f64) {
		self.with(|engine| engine.context(x, y, client_x, client_y));
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::graph_canvas::render::tests::RecordingSurface;
	use crate::components::graph_canvas::types::{GraphLink, GraphNode};

	fn sample() -> GraphData {
		GraphData {
			nodes: vec![GraphNode::new("a", "person", "A"), GraphNode::new("b", "wallet", "B")],
			links: vec![GraphLink::new("e", "a", "b", "owns")],
		}
	}

	fn recorder(handle: &GraphHandle) -> Rc<RefCell<Vec<GraphEvent>>> {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		handle.on_event(move |event| sink.borrow_mut().push(event.clone()));
		seen
	}

	#[test]
	fn listeners_receive_notifications_per_instance() {
		let (first, second) = (GraphHandle::default(), GraphHandle::default());
		first.refresh(&sample());
		second.refresh(&sample());
		let (seen_first, seen_second) = (recorder(&first), recorder(&second));

		first.select_node(Some("a"));
		assert_eq!(*seen_first.borrow(), vec![GraphEvent::NodeSelected { node_id: "a".into() }]);
		assert!(seen_second.borrow().is_empty());
		assert_eq!(first.selected_node_id().as_deref(), Some("a"));
		assert_eq!(second.selected_node_id(), None);
	}

	#[test]
	fn listener_may_call_back_into_handle() {
		let handle = GraphHandle::default();
		handle.refresh(&sample());
		let inner = handle.clone();
		handle.on_event(move |event| {
			if let GraphEvent::NodeContextRequested { node_id, .. } = event {
				if let Some((nodes, edges)) = inner.connections(node_id) {
					inner.highlight_nodes(nodes);
					inner.highlight_edges(edges);
				}
			}
		});

		let (x, y) = handle.inspect(|engine| {
			let node = engine.graph().node("a").unwrap();
			engine.transform().graph_to_screen(node.x, node.y)
		});
		handle.context(x, y, 10.0, 20.0);
		assert!(handle.inspect(|engine| engine.selection().is_node_highlighted("b")));
		assert!(handle.inspect(|engine| engine.selection().is_edge_highlighted("e")));
	}

	#[test]
	fn dropped_subscription_stops_delivery() {
		let handle = GraphHandle::default();
		handle.refresh(&sample());
		let count = Rc::new(RefCell::new(0));
		let counter = Rc::clone(&count);
		let subscription = handle.subscribe(move |_| *counter.borrow_mut() += 1);
		handle.select_edge(Some("e"));
		drop(subscription);
		handle.select_edge(None);
		assert_eq!(*count.borrow(), 1);
	}

	#[test]
	fn delayed_clear_spares_later_highlights() {
		let handle = GraphHandle::default();
		handle.refresh(&sample());
		handle.highlight_edges(["e"]);
		let flashed = handle.highlight_generation();
		handle.highlight_nodes(["b"]);

		assert!(!handle.clear_highlights_from(flashed));
		assert!(handle.inspect(|engine| engine.selection().is_node_highlighted("b")));

		let current = handle.highlight_generation();
		assert!(handle.clear_highlights_from(current));
		assert!(!handle.inspect(|engine| engine.selection().is_edge_highlighted("e")));
	}

	#[test]
	fn frame_steps_and_draws() {
		let handle = GraphHandle::default();
		handle.refresh(&sample());
		let before = handle.inspect(|engine| engine.graph().node("a").cloned().unwrap());
		let mut surface = RecordingSurface::default();
		handle.frame(&mut surface);
		assert!(!surface.ops.is_empty());
		let after = handle.inspect(|engine| engine.graph().node("a").cloned().unwrap());
		assert_ne!((before.x, before.y), (after.x, after.y));
	}
}
