//! Interactive investigation graph canvas: force layout, pan/zoom, selection
//! and highlighting, rendered to an HTML canvas with Leptos.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod pages;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

pub use crate::components::graph_canvas::{
	CursorStyle, EdgeStyle, EngineConfig, Focus, GraphCanvas, GraphData, GraphEngine, GraphEvent,
	GraphHandle, GraphLink, GraphNode, InteractionMode, LayoutParams, LineStyle, NodeStyle,
	Parameter, SelectionState, StyleTable, Subscription, Surface, TextBaseline, TextStyle,
	UnknownParameter, ViewTransform, VisualEdge, VisualGraph, VisualNode,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the investigation page and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Intel Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
