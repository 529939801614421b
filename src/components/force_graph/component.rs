use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::error::CanvasError;
use super::render;
use super::simulation::LayoutConfig;
use super::state::ForceGraphState;
use super::types::GraphData;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;
type SharedCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] config: Option<LayoutConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let (cursor, set_cursor) = signal("default");
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: SharedCallback = Rc::new(RefCell::new(None));
	let resize_cb: SharedCallback = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let size = Size {
			fullscreen,
			width,
			height,
		};
		let result = mount(
			&canvas,
			size,
			data.get_untracked(),
			config.unwrap_or_default(),
			&state_init,
			&animate_init,
			&resize_cb_init,
		);
		if let Err(err) = result {
			error!("force graph setup failed: {err}");
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let over_node = match *state_mm.borrow_mut() {
			Some(ref mut s) => {
				s.pointer_move(x, y);
				s.is_dragging() || s.hovered.is_some()
			}
			None => false,
		};
		set_cursor.set(if over_node { "pointer" } else { "default" });
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
		set_cursor.set("default");
	};

	let state_ck = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_ck.borrow_mut() {
			match s.click(x, y) {
				Ok(outcome) => debug!("click at ({x}, {y}): {outcome:?}"),
				Err(err) => error!("layout rebuild failed: {err}"),
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			style="display: block;"
			style:cursor=move || cursor.get()
		/>
	}
}

#[derive(Clone, Copy)]
struct Size {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

/// Sizes the canvas, builds the graph state and starts the frame loop.
fn mount(
	canvas: &HtmlCanvasElement,
	size: Size,
	data: GraphData,
	config: LayoutConfig,
	state: &SharedState,
	animate: &SharedCallback,
	resize_cb: &SharedCallback,
) -> Result<(), CanvasError> {
	let window = global_window()?;
	let (w, h) = if size.fullscreen {
		window_size(&window)?
	} else {
		(
			size.width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			size.height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	};
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);

	let ctx = context_2d(canvas)?;
	*state.borrow_mut() = Some(ForceGraphState::new(data, w, h, config)?);
	debug!("force graph mounted at {w}x{h}");

	if size.fullscreen {
		let (state_resize, canvas_resize) = (state.clone(), canvas.clone());
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = match global_window().and_then(|win| window_size(&win)) {
				Ok(size) => size,
				Err(err) => {
					error!("resize skipped: {err}");
					return;
				}
			};
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb.borrow() {
			window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())?;
		}
	}

	let (state_anim, animate_inner) = (state.clone(), animate.clone());
	*animate.borrow_mut() = Some(Closure::new(move || {
		if let Some(ref mut s) = *state_anim.borrow_mut() {
			s.frame();
			render::render(s, &ctx);
		}
		if let Some(ref cb) = *animate_inner.borrow() {
			if let Some(win) = web_sys::window() {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}
	}));
	if let Some(ref cb) = *animate.borrow() {
		window.request_animation_frame(cb.as_ref().unchecked_ref())?;
	}
	Ok(())
}

fn global_window() -> Result<Window, CanvasError> {
	web_sys::window().ok_or(CanvasError::NoWindow)
}

fn window_size(window: &Window) -> Result<(f64, f64), CanvasError> {
	let w = window.inner_width()?.as_f64().unwrap_or(800.0);
	let h = window.inner_height()?.as_f64().unwrap_or(600.0);
	Ok((w, h))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, CanvasError> {
	canvas
		.get_context("2d")?
		.ok_or(CanvasError::NoContext)?
		.dyn_into()
		.map_err(|_| CanvasError::NoContext)
}

fn canvas_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
