use std::collections::HashSet;

use super::events::GraphEvent;

/// Single-item focus; node and edge selection are exclusive by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
	#[default]
	None,
	Node(String),
	Edge(String),
}

impl Focus {
	pub fn node_id(&self) -> Option<&str> {
		match self {
			Focus::Node(id) => Some(id),
			_ => None,
		}
	}

	pub fn edge_id(&self) -> Option<&str> {
		match self {
			Focus::Edge(id) => Some(id),
			_ => None,
		}
	}
}

/// Selected/hovered/highlighted ids read by the renderer.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
	selected: Focus,
	hovered: Focus,
	highlighted_nodes: HashSet<String>,
	highlighted_edges: HashSet<String>,
	/// Bumped on every highlight change.
	highlight_generation: u64,
}

impl SelectionState {
	pub fn selected(&self) -> &Focus {
		&self.selected
	}

	pub fn hovered(&self) -> &Focus {
		&self.hovered
	}

	pub fn selected_node_id(&self) -> Option<&str> {
		self.selected.node_id()
	}

	pub fn selected_edge_id(&self) -> Option<&str> {
		self.selected.edge_id()
	}

	/// Selects `id` (a known node) or clears the selection.
	pub fn select_node(&mut self, id: Option<&str>) -> GraphEvent {
		match id {
			Some(id) => {
				self.selected = Focus::Node(id.to_owned());
				GraphEvent::NodeSelected {
					node_id: id.to_owned(),
				}
			}
			None => self.clear_selection(),
		}
	}

	pub fn select_edge(&mut self, id: Option<&str>) -> GraphEvent {
		match id {
			Some(id) => {
				self.selected = Focus::Edge(id.to_owned());
				GraphEvent::EdgeSelected {
					edge_id: id.to_owned(),
				}
			}
			None => self.clear_selection(),
		}
	}

	pub fn clear_selection(&mut self) -> GraphEvent {
		self.selected = Focus::None;
		GraphEvent::SelectionCleared
	}

	/// Returns `true` when the hover target changed.
	pub fn set_hover(&mut self, hovered: Focus) -> bool {
		if self.hovered == hovered {
			return false;
		}
		self.hovered = hovered;
		true
	}

	pub fn highlight_nodes<I, S>(&mut self, ids: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.highlighted_nodes = ids.into_iter().map(Into::into).collect();
		self.highlight_generation += 1;
	}

	pub fn highlight_edges<I, S>(&mut self, ids: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.highlighted_edges = ids.into_iter().map(Into::into).collect();
		self.highlight_generation += 1;
	}

	pub fn clear_highlights(&mut self) {
		self.highlighted_nodes.clear();
		self.highlighted_edges.clear();
		self.highlight_generation += 1;
	}

	pub fn highlight_generation(&self) -> u64 {
		self.highlight_generation
	}

	/// Clears highlights unless they changed after `generation` was read.
	pub fn clear_highlights_from(&mut self, generation: u64) -> bool {
		if generation != self.highlight_generation {
			return false;
		}
		self.clear_highlights();
		true
	}

	pub fn is_node_selected(&self, id: &str) -> bool {
		self.selected.node_id() == Some(id)
	}

	pub fn is_edge_selected(&self, id: &str) -> bool {
		self.selected.edge_id() == Some(id)
	}

	pub fn is_node_hovered(&self, id: &str) -> bool {
		self.hovered.node_id() == Some(id)
	}

	pub fn is_edge_hovered(&self, id: &str) -> bool {
		self.hovered.edge_id() == Some(id)
	}

	pub fn is_node_highlighted(&self, id: &str) -> bool {
		self.highlighted_nodes.contains(id)
	}

	pub fn is_edge_highlighted(&self, id: &str) -> bool {
		self.highlighted_edges.contains(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_and_edge_selection_are_exclusive() {
		let mut state = SelectionState::default();
		state.select_edge(Some("e1"));
		assert_eq!(
			state.select_node(Some("n1")),
			GraphEvent::NodeSelected { node_id: "n1".into() }
		);
		assert_eq!(state.selected_node_id(), Some("n1"));
		assert_eq!(state.selected_edge_id(), None);

		assert_eq!(
			state.select_edge(Some("e2")),
			GraphEvent::EdgeSelected { edge_id: "e2".into() }
		);
		assert_eq!(state.selected_node_id(), None);
		assert_eq!(state.selected_edge_id(), Some("e2"));
	}

	#[test]
	fn selecting_none_clears_both() {
		let mut state = SelectionState::default();
		state.select_node(Some("n1"));
		assert_eq!(state.select_edge(None), GraphEvent::SelectionCleared);
		assert_eq!(state.selected(), &Focus::None);
	}

	#[test]
	fn stale_clear_keeps_newer_highlights() {
		let mut state = SelectionState::default();
		state.highlight_nodes(["a"]);
		let first = state.highlight_generation();
		state.highlight_nodes(["b"]);

		assert!(!state.clear_highlights_from(first));
		assert!(state.is_node_highlighted("b"));

		let second = state.highlight_generation();
		assert!(state.clear_highlights_from(second));
		assert!(!state.is_node_highlighted("b"));
	}

	#[test]
	fn highlights_survive_selection_changes() {
		let mut state = SelectionState::default();
		state.highlight_nodes(["a", "b"]);
		state.highlight_edges(vec![String::from("e1")]);
		state.select_node(Some("a"));
		state.clear_selection();
		assert!(state.is_node_highlighted("b"));
		assert!(state.is_edge_highlighted("e1"));

		state.highlight_nodes(["c"]);
		assert!(!state.is_node_highlighted("a"));
		state.clear_highlights();
		assert!(!state.is_node_highlighted("c"));
		assert!(!state.is_edge_highlighted("e1"));
	}

	#[test]
	fn hover_reports_changes_only() {
		let mut state = SelectionState::default();
		assert!(state.set_hover(Focus::Node("a".into())));
		assert!(!state.set_hover(Focus::Node("a".into())));
		assert!(state.is_node_hovered("a"));
		assert!(state.set_hover(Focus::Edge("e".into())));
		assert!(!state.is_node_hovered("a"));
		assert!(state.is_edge_hovered("e"));
	}
}
