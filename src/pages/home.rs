use leptos::prelude::*;

use crate::components::force_graph::{ForceGraphCanvas, GraphData, LayoutConfig};

/// Fullscreen playground seeded with the starting triangle.
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(GraphData::seed);
	let layout = LayoutConfig::default();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas data=graph_data fullscreen=true config=layout />
				<div class="graph-overlay">
					<h1>"Force-Directed Graph"</h1>
					<p class="subtitle">
						"Drag nodes to move them. Click a node to highlight it. Click empty space to add a node."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
