use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::handle::GraphHandle;
use super::surface::CanvasSurface;
use super::types::GraphData;

const FALLBACK_WIDTH: f64 = 800.0;
const FALLBACK_HEIGHT: f64 = 600.0;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn js_f64(value: Result<JsValue, JsValue>, fallback: f64) -> f64 {
	value.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
}

/// Fullscreen follows the window; otherwise explicit props win, then the parent's size.
fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		return (
			js_f64(window.inner_width(), FALLBACK_WIDTH),
			js_f64(window.inner_height(), FALLBACK_HEIGHT),
		);
	}
	let parent = canvas.parent_element();
	let parent_dim = |read: fn(&web_sys::Element) -> i32, fallback: f64| {
		parent
			.as_ref()
			.map(|p| read(p) as f64)
			.filter(|v| *v > 0.0)
			.unwrap_or(fallback)
	};
	(
		width.unwrap_or_else(|| parent_dim(web_sys::Element::client_width, FALLBACK_WIDTH)),
		height.unwrap_or_else(|| parent_dim(web_sys::Element::client_height, FALLBACK_HEIGHT)),
	)
}

/// Canvas-relative pointer position.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive canvas view over a [`GraphHandle`].
///
/// `data` is re-applied through `refresh` whenever it changes. The animation
/// loop steps the layout and redraws each frame until the component unmounts.
#[component]
pub fn GraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	handle: GraphHandle,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let (mounted, set_mounted) = signal(false);
	let attached = Arc::new(AtomicBool::new(true));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));

	let (handle_init, animate_init, resize_cb_init, attached_init) =
		(handle.clone(), animate.clone(), resize_cb.clone(), attached.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			log::error!("graph canvas mounted without a window");
			return;
		};

		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Ok(Some(context)) = canvas.get_context("2d") else {
			log::error!("2d canvas context unavailable");
			return;
		};
		let Ok(ctx) = context.dyn_into::<CanvasRenderingContext2d>() else {
			log::error!("canvas context is not a CanvasRenderingContext2d");
			return;
		};
		handle_init.resize(w, h);
		log::info!("graph canvas mounted at {w}x{h}");
		set_mounted.set(true);

		let (handle_resize, canvas_resize, attached_resize) =
			(handle_init.clone(), canvas.clone(), attached_init.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			if !attached_resize.load(Ordering::Relaxed) {
				return;
			}
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = canvas_size(&win, &canvas_resize, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			handle_resize.resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			if let Err(err) = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref()) {
				log::warn!("resize listener not attached: {err:?}");
			}
		}

		let (handle_anim, animate_inner, attached_anim) =
			(handle_init.clone(), animate_init.clone(), attached_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !attached_anim.load(Ordering::Relaxed) {
				log::debug!("graph canvas detached, stopping animation loop");
				return;
			}
			let mut surface = CanvasSurface::new(&ctx, canvas.width() as f64, canvas.height() as f64);
			handle_anim.frame(&mut surface);
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let handle_data = handle.clone();
	Effect::new(move |_| {
		if !mounted.get() {
			return;
		}
		data.with(|snapshot| handle_data.refresh(snapshot));
	});

	let resize_cleanup = StoredValue::new_local(resize_cb);
	on_cleanup(move || {
		attached.store(false, Ordering::Relaxed);
		resize_cleanup.try_with_value(|resize_cb| {
			let (Some(cb), Some(window)) = (resize_cb.borrow_mut().take(), web_sys::window()) else {
				return;
			};
			if let Err(err) = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref()) {
				log::warn!("resize listener not removed: {err:?}");
			}
		});
	});

	let handle_md = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			handle_md.pointer_down(x, y);
		}
	};

	let handle_mm = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let Some(cursor) = handle_mm.pointer_move(x, y) else {
			return;
		};
		if let Some(canvas) = canvas_ref.get_untracked() {
			let canvas: HtmlCanvasElement = canvas.into();
			let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor.as_css());
		}
	};

	let handle_mu = handle.clone();
	let on_mouseup = move |_: MouseEvent| handle_mu.pointer_up();

	let handle_ml = handle.clone();
	let on_mouseleave = move |_: MouseEvent| handle_ml.pointer_leave();

	let handle_wh = handle.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			handle_wh.wheel(x, y, ev.delta_y());
		}
	};

	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			handle.context(x, y, ev.client_x() as f64, ev.client_y() as f64);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:contextmenu=on_contextmenu
			style="display: block; cursor: default;"
		/>
	}
}
