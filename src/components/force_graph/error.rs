use thiserror::Error;

use super::types::NodeId;

/// Failure mutating the graph store or building its layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
	#[error("link references unknown node {0}")]
	MissingNode(NodeId),
	#[error("no node ids left to assign")]
	IdsExhausted,
}

/// Failure setting the canvas up in the browser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
	#[error("no global window")]
	NoWindow,
	#[error("canvas has no 2d context")]
	NoContext,
	#[error("javascript error: {0}")]
	Js(String),
	#[error(transparent)]
	Layout(#[from] LayoutError),
}

impl From<wasm_bindgen::JsValue> for CanvasError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		CanvasError::Js(format!("{value:?}"))
	}
}
