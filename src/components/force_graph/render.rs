use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS};

const LINK_STROKE: &str = "#999";
const LINK_WIDTH: f64 = 2.0;
const LABEL_FONT: &str = "10px Helvetica";
const LABEL_FILL: &str = "#000";
// Baseline drop that centers the 10px label vertically.
const LABEL_DY: f64 = 4.0;

/// Repaints the whole graph at the nodes' current positions.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_STROKE);
	ctx.set_line_width(LINK_WIDTH);
	ctx.begin_path();
	for link in &state.graph.links {
		let (Some(source), Some(target)) = (
			state.graph.node(link.source),
			state.graph.node(link.target),
		) else {
			continue;
		};
		ctx.move_to(source.x, source.y);
		ctx.line_to(target.x, target.y);
	}
	ctx.stroke();
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(LABEL_FONT);
	ctx.set_text_align("center");

	for node in &state.graph.nodes {
		ctx.save();
		let _ = ctx.translate(node.x, node.y);

		ctx.begin_path();
		let _ = ctx.arc(0.0, 0.0, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.fill().css());
		ctx.fill();

		ctx.set_fill_style_str(LABEL_FILL);
		let _ = ctx.fill_text(&node.id.to_string(), 0.0, LABEL_DY);
		ctx.restore();
	}
}
