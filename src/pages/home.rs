use std::time::Duration;

use leptos::prelude::*;

use crate::components::graph_canvas::{
	EngineConfig, GraphCanvas, GraphData, GraphEvent, GraphHandle, GraphLink, GraphNode, Parameter,
};

/// How long "highlight" actions from the context menu stay visible.
const HIGHLIGHT_DURATION: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
enum MenuTarget {
	Node(String),
	Edge(String),
}

/// Open context menu, anchored at client coordinates.
#[derive(Clone, Debug, PartialEq)]
struct ContextMenu {
	target: MenuTarget,
	x: f64,
	y: f64,
}

/// A small investigation to start from.
fn sample_investigation() -> GraphData {
	GraphData {
		nodes: vec![
			GraphNode::new("p1", "person", "John Doe"),
			GraphNode::new("o1", "organization", "Acme Corp"),
			GraphNode::new("w1", "wallet", "0x1234...5678"),
			GraphNode::new("ip1", "ip", "192.168.1.1"),
		],
		links: vec![
			GraphLink::new("l1", "p1", "o1", "owns"),
			GraphLink::new("l2", "o1", "w1", "controls"),
			GraphLink::new("l3", "p1", "ip1", "accessed from"),
		],
	}
}

/// Ids of nodes whose label contains `query`, ignoring case.
fn matching_nodes(data: &GraphData, query: &str) -> Vec<String> {
	let query = query.trim().to_lowercase();
	if query.is_empty() {
		return Vec::new();
	}
	data.nodes
		.iter()
		.filter(|node| node.label.to_lowercase().contains(&query))
		.map(|node| node.id.clone())
		.collect()
}

/// Status line text for selection notifications.
fn describe(event: &GraphEvent, data: &GraphData) -> Option<String> {
	match event {
		GraphEvent::NodeSelected { node_id } => {
			let node = data.nodes.iter().find(|node| &node.id == node_id)?;
			Some(format!("Selected {} ({})", node.label, node.node_type))
		}
		GraphEvent::EdgeSelected { edge_id } => {
			let link = data.links.iter().find(|link| &link.id == edge_id)?;
			let label = |id: &str| {
				data.nodes
					.iter()
					.find(|node| node.id == id)
					.map_or_else(|| id.to_owned(), |node| node.label.clone())
			};
			Some(format!("{} {} {}", label(&link.source), link.label, label(&link.target)))
		}
		GraphEvent::SelectionCleared => Some("Nothing selected".to_owned()),
		GraphEvent::NodeContextRequested { .. } | GraphEvent::EdgeContextRequested { .. } => None,
	}
}

/// Highlights the given ids, then clears them after a delay unless something
/// else was highlighted meanwhile.
fn flash(handle: &GraphHandle, nodes: Vec<String>, edges: Vec<String>) {
	handle.highlight_nodes(nodes);
	handle.highlight_edges(edges);
	let generation = handle.highlight_generation();
	let handle = handle.clone();
	set_timeout(
		move || {
			handle.clear_highlights_from(generation);
		},
		HIGHLIGHT_DURATION,
	);
}

/// Investigation page: the canvas plus search, context menu and layout controls.
#[component]
pub fn Home() -> impl IntoView {
	let data = RwSignal::new(sample_investigation());
	let handle = GraphHandle::new(EngineConfig {
		seed: js_sys::Date::now() as u64,
		..EngineConfig::default()
	});
	let (status, set_status) = signal(String::from("Right-click an entity for actions."));
	let (menu, set_menu) = signal(None::<ContextMenu>);

	handle.on_event(move |event| {
		match event {
			GraphEvent::NodeContextRequested { node_id, x, y } => set_menu.set(Some(ContextMenu {
				target: MenuTarget::Node(node_id.clone()),
				x: *x,
				y: *y,
			})),
			GraphEvent::EdgeContextRequested { edge_id, x, y } => set_menu.set(Some(ContextMenu {
				target: MenuTarget::Edge(edge_id.clone()),
				x: *x,
				y: *y,
			})),
			_ => set_menu.set(None),
		}
		if let Some(text) = data.with_untracked(|snapshot| describe(event, snapshot)) {
			set_status.set(text);
		}
	});

	let handle_search = handle.clone();
	let on_search = move |ev: web_sys::Event| {
		let query = event_target_value(&ev);
		if query.trim().is_empty() {
			handle_search.clear_highlights();
			set_status.set("Search cleared".to_owned());
			return;
		}
		let ids = data.with_untracked(|snapshot| matching_nodes(snapshot, &query));
		set_status.set(format!("{} match(es) for \"{}\"", ids.len(), query.trim()));
		handle_search.highlight_nodes(ids);
	};

	let on_add = move |_: web_sys::MouseEvent| {
		data.update(|snapshot| {
			let n = snapshot.nodes.len() + 1;
			let id = format!("w{n}");
			snapshot.links.push(GraphLink::new(format!("l{}", snapshot.links.len() + 1), "o1", id.clone(), "sent to"));
			snapshot.nodes.push(GraphNode::new(id, "wallet", format!("Wallet #{n}")));
		});
	};

	let parameters = Parameter::ALL
		.into_iter()
		.map(|parameter| {
			let name = parameter.name();
			let value = handle.parameter(name).unwrap_or_default();
			let handle = handle.clone();
			let on_change = move |ev: web_sys::Event| match event_target_value(&ev).parse::<f64>() {
				Ok(value) => handle.set_parameter(name, value),
				Err(err) => log::warn!("invalid value for {name}: {err}"),
			};
			view! {
				<label class="parameter">
					<span>{name}</span>
					<input type="number" step="any" value=value.to_string() on:change=on_change />
				</label>
			}
		})
		.collect_view();

	let menu_handle = StoredValue::new_local(handle.clone());
	let context_menu = move || {
		let ContextMenu { target, x, y } = menu.get()?;
		let style = format!("left: {x}px; top: {y}px;");
		let menu_view = match target {
			MenuTarget::Node(id) => {
				let center_id = id.clone();
				view! {
					<ul class="context-menu" style=style>
						<li on:click=move |_| {
							menu_handle.with_value(|h| {
								if let Some((nodes, edges)) = h.connections(&id) {
									flash(h, nodes, edges);
								}
							});
							set_menu.set(None);
						}>"Highlight connections"</li>
						<li on:click=move |_| {
							menu_handle.with_value(|h| h.center_on_node(&center_id));
							set_menu.set(None);
						}>"Center on entity"</li>
					</ul>
				}
				.into_any()
			}
			MenuTarget::Edge(id) => view! {
				<ul class="context-menu" style=style>
					<li on:click=move |_| {
						menu_handle.with_value(|h| flash(h, Vec::new(), vec![id.clone()]));
						set_menu.set(None);
					}>"Highlight relationship"</li>
				</ul>
			}
			.into_any(),
		};
		Some(menu_view)
	};

	view! {
		<div class="fullscreen-graph">
			<GraphCanvas data=data handle=handle fullscreen=true />
			<div class="graph-overlay">
				<h1>"Investigation Graph"</h1>
				<p class="subtitle">
					"Drag entities to reposition. Scroll to zoom. Drag background to pan."
				</p>
				<input type="search" placeholder="Search entities" on:input=on_search />
				<button on:click=on_add>"Add wallet"</button>
				<details class="parameters">
					<summary>"Layout"</summary>
					{parameters}
				</details>
				<p class="status">{status}</p>
			</div>
			{context_menu}
		</div>
	}
}
