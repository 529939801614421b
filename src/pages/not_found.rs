use leptos::prelude::*;

/// 404 page for any unmatched route.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<h1>"Page not found"</h1>
		<p>
			<a href="/">"Back to the graph"</a>
		</p>
	}
}
