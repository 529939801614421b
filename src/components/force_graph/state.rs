use std::collections::HashSet;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::LayoutError;
use super::simulation::{LayoutConfig, Simulation};
use super::types::{GraphData, GraphLink, GraphNode, HIGHLIGHT_NODE_COLOR, NodeId};

pub const NODE_RADIUS: f64 = 20.0;
pub const HIT_RADIUS: f64 = NODE_RADIUS;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interaction {
	#[default]
	Idle,
	Dragging { node: NodeId, moved: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
	Added(NodeId),
	Recolored(NodeId),
	/// The click closed a drag that moved its node.
	Suppressed,
}

/// Everything the canvas handlers share: the graph store, its layout and
/// the pointer state machine.
pub struct ForceGraphState {
	pub graph: GraphData,
	pub simulation: Simulation,
	pub interaction: Interaction,
	pub hovered: Option<NodeId>,
	pub width: f64,
	pub height: f64,
	config: LayoutConfig,
	suppress_click: bool,
	rng: StdRng,
}

impl ForceGraphState {
	pub fn new(
		data: GraphData,
		width: f64,
		height: f64,
		config: LayoutConfig,
	) -> Result<Self, LayoutError> {
		Self::with_rng(data, width, height, config, StdRng::from_entropy())
	}

	pub fn with_rng(
		mut graph: GraphData,
		width: f64,
		height: f64,
		config: LayoutConfig,
		rng: StdRng,
	) -> Result<Self, LayoutError> {
		let simulation = Simulation::new(&mut graph, config, (width / 2.0, height / 2.0))?;
		Ok(Self {
			graph,
			simulation,
			interaction: Interaction::Idle,
			hovered: None,
			width,
			height,
			config,
			suppress_click: false,
			rng,
		})
	}

	/// First node in insertion order whose circle contains the point.
	pub fn node_at(&self, x: f64, y: f64) -> Option<NodeId> {
		self.graph
			.nodes
			.iter()
			.find(|node| node.distance_to(x, y) <= HIT_RADIUS)
			.map(|node| node.id)
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self.interaction, Interaction::Dragging { .. })
	}

	/// Starts a drag when the pointer lands on a node. Returns whether it did.
	pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
		self.suppress_click = false;
		if self.is_dragging() {
			return false;
		}
		let Some(id) = self.node_at(x, y) else {
			return false;
		};

		self.simulation
			.set_alpha_target(self.config.drag_alpha_target);
		self.simulation.restart();
		if let Some(node) = self.graph.node_mut(id) {
			node.fx = Some(node.x);
			node.fy = Some(node.y);
		}
		self.interaction = Interaction::Dragging {
			node: id,
			moved: false,
		};
		debug!("drag started on node {id}");
		true
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		match self.interaction {
			Interaction::Dragging { node, .. } => {
				if let Some(n) = self.graph.node_mut(node) {
					n.fx = Some(x);
					n.fy = Some(y);
				}
				self.interaction = Interaction::Dragging { node, moved: true };
			}
			Interaction::Idle => self.hovered = self.node_at(x, y),
		}
	}

	pub fn pointer_up(&mut self) {
		if let Some(moved) = self.end_drag() {
			// The browser follows mouseup with a click on the same spot.
			self.suppress_click = moved;
		}
	}

	/// Ends any drag without arming click suppression, since no click follows.
	pub fn pointer_leave(&mut self) {
		self.end_drag();
		self.hovered = None;
	}

	fn end_drag(&mut self) -> Option<bool> {
		let Interaction::Dragging { node, moved } = self.interaction else {
			return None;
		};
		self.simulation.set_alpha_target(0.0);
		if let Some(n) = self.graph.node_mut(node) {
			n.fx = None;
			n.fy = None;
		}
		self.interaction = Interaction::Idle;
		debug!("drag ended on node {node}");
		Some(moved)
	}

	/// Recolors the clicked node or spawns a new one, then rebuilds the layout.
	pub fn click(&mut self, x: f64, y: f64) -> Result<ClickOutcome, LayoutError> {
		if std::mem::take(&mut self.suppress_click) {
			return Ok(ClickOutcome::Suppressed);
		}
		self.simulation.stop();

		let outcome = match self.node_at(x, y) {
			Some(id) => {
				if let Some(node) = self.graph.node_mut(id) {
					node.color = Some(HIGHLIGHT_NODE_COLOR);
				}
				info!("Clicked on node: {id}");
				ClickOutcome::Recolored(id)
			}
			None => ClickOutcome::Added(self.add_random_node(x, y)?),
		};

		self.rebuild()?;
		Ok(outcome)
	}

	/// Appends a node at `(x, y)` linked to a random subset of the nodes
	/// that existed before it. At most one link per target, never to itself.
	pub fn add_random_node(&mut self, x: f64, y: f64) -> Result<NodeId, LayoutError> {
		let existing = self.graph.nodes.len();
		let id = self.graph.next_node_id().ok_or(LayoutError::IdsExhausted)?;
		self.graph.push_node(GraphNode::at(id, x, y));

		let links_to_create = if existing > 0 {
			self.rng.gen_range(0..existing)
		} else {
			0
		};
		let mut linked = HashSet::new();
		for _ in 0..links_to_create {
			let target = self.graph.nodes[self.rng.gen_range(0..existing)].id;
			if target != id && linked.insert(target) {
				self.graph.push_link(GraphLink::new(id, target));
			}
		}

		info!(
			"Added node {id} at ({x:.1}, {y:.1}) with {} links",
			linked.len()
		);
		Ok(id)
	}

	/// Throws the layout away and builds a fresh one over the current graph.
	pub fn rebuild(&mut self) -> Result<(), LayoutError> {
		self.simulation = Simulation::new(
			&mut self.graph,
			self.config,
			(self.width / 2.0, self.height / 2.0),
		)?;
		Ok(())
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.set_center(width / 2.0, height / 2.0);
	}

	/// One animation frame worth of layout. Returns whether anything moved.
	pub fn frame(&mut self) -> bool {
		self.simulation.step(&mut self.graph)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::NodeColor;

	fn spread_triangle() -> GraphData {
		let mut data = GraphData::default();
		data.push_node(GraphNode::at(1, 100.0, 100.0));
		data.push_node(GraphNode::at(2, 300.0, 100.0));
		data.push_node(GraphNode::at(3, 200.0, 300.0));
		data.push_link(GraphLink::new(1, 2));
		data.push_link(GraphLink::new(2, 3));
		data.push_link(GraphLink::new(3, 1));
		data
	}

	fn state_with(data: GraphData, seed: u64) -> ForceGraphState {
		ForceGraphState::with_rng(
			data,
			800.0,
			600.0,
			LayoutConfig::default(),
			StdRng::seed_from_u64(seed),
		)
		.unwrap()
	}

	fn positions(state: &ForceGraphState) -> Vec<(f64, f64)> {
		state.graph.nodes.iter().map(|n| (n.x, n.y)).collect()
	}

	#[test]
	fn hit_test_on_empty_graph_misses() {
		let state = state_with(GraphData::default(), 1);
		assert_eq!(state.node_at(0.0, 0.0), None);
	}

	#[test]
	fn hit_test_takes_first_match_not_nearest() {
		let mut data = GraphData::default();
		data.push_node(GraphNode::at(1, 0.0, 0.0));
		data.push_node(GraphNode::at(2, 10.0, 0.0));
		let state = state_with(data, 1);
		assert_eq!(state.node_at(10.0, 0.0), Some(1));
		assert_eq!(state.node_at(25.0, 0.0), Some(2));
	}

	#[test]
	fn hit_radius_boundary_is_inclusive() {
		let state = state_with(spread_triangle(), 1);
		assert_eq!(state.node_at(120.0, 100.0), Some(1));
		assert_eq!(state.node_at(100.0, 80.0), Some(1));
		assert_eq!(state.node_at(120.001, 100.0), None);
		assert_eq!(state.node_at(200.0, 200.0), None);
	}

	#[test]
	fn click_on_empty_graph_adds_an_unlinked_node() {
		let mut state = state_with(GraphData::default(), 1);
		assert_eq!(state.click(5.0, 5.0).unwrap(), ClickOutcome::Added(1));
		assert_eq!(state.graph.nodes.len(), 1);
		assert!(state.graph.links.is_empty());
		assert!(state.simulation.is_running());
	}

	#[test]
	fn background_clicks_respect_link_invariants() {
		for seed in 0..100 {
			let mut state = state_with(GraphData::seed(), seed);
			for step in 0..12 {
				let (nodes, links) = (state.graph.nodes.len(), state.graph.links.len());
				let (x, y) = (2_000.0 + 100.0 * step as f64, 2_000.0);
				let ClickOutcome::Added(id) = state.click(x, y).unwrap() else {
					panic!("expected a new node");
				};
				assert_eq!(state.graph.nodes.len(), nodes + 1);

				let added = &state.graph.links[links..];
				assert!(added.len() < nodes.max(1));
				let mut targets = HashSet::new();
				for link in added {
					assert_eq!(link.source, id);
					assert_ne!(link.target, id);
					assert!(targets.insert(link.target), "duplicate target");
					assert!(state.graph.node(link.target).is_some());
				}
			}
		}
	}

	#[test]
	fn new_node_lands_where_clicked_with_fresh_id() {
		let mut state = state_with(GraphData::seed(), 7);
		assert_eq!(state.click(640.0, 480.0).unwrap(), ClickOutcome::Added(4));
		let node = state.graph.node(4).unwrap();
		assert_eq!((node.x, node.y), (640.0, 480.0));
		assert_eq!(state.click(900.0, 900.0).unwrap(), ClickOutcome::Added(5));
	}

	#[test]
	fn background_click_fails_cleanly_when_ids_run_out() {
		let mut data = spread_triangle();
		data.push_node(GraphNode::at(NodeId::MAX, 600.0, 500.0));
		let mut state = state_with(data, 3);
		assert_eq!(state.click(20.0, 580.0), Err(LayoutError::IdsExhausted));
		assert_eq!(state.graph.nodes.len(), 4);
		assert_eq!(state.graph.links.len(), 3);

		assert_eq!(state.click(600.0, 500.0), Ok(ClickOutcome::Recolored(NodeId::MAX)));
	}

	#[test]
	fn clicking_a_node_recolors_it_only() {
		let mut state = state_with(spread_triangle(), 3);
		let outcome = state.click(300.0, 100.0).unwrap();
		assert_eq!(outcome, ClickOutcome::Recolored(2));
		assert_eq!(state.graph.node(2).unwrap().color, Some(NodeColor::DarkSeaGreen));
		assert_eq!(state.graph.node(1).unwrap().color, None);
		assert_eq!(state.graph.nodes.len(), 3);
		assert_eq!(state.graph.links.len(), 3);
	}

	#[test]
	fn click_restarts_a_fresh_layout() {
		let mut state = state_with(spread_triangle(), 3);
		while state.frame() {}
		assert!(!state.simulation.is_running());
		state.click(300.0, 100.0).unwrap();
		assert!(state.simulation.is_running());
		assert_eq!(state.simulation.alpha(), 1.0);
	}

	#[test]
	fn dragged_node_tracks_pointer_exactly() {
		let mut state = state_with(spread_triangle(), 3);
		assert!(state.pointer_down(200.0, 300.0));
		assert_eq!(
			state.interaction,
			Interaction::Dragging {
				node: 3,
				moved: false
			}
		);
		assert_eq!(state.simulation.alpha_target(), 0.3);
		assert!(state.simulation.is_running());

		for (x, y) in [(250.0, 320.5), (410.25, 90.0), (-15.0, 700.0)] {
			state.pointer_move(x, y);
			state.frame();
			let node = state.graph.node(3).unwrap();
			assert_eq!((node.x, node.y), (x, y));
		}

		state.pointer_up();
		let node = state.graph.node(3).unwrap();
		assert_eq!((node.fx, node.fy), (None, None));
		assert_eq!(state.interaction, Interaction::Idle);
		assert_eq!(state.simulation.alpha_target(), 0.0);

		let before = (node.x, node.y);
		state.frame();
		let node = state.graph.node(3).unwrap();
		assert_ne!((node.x, node.y), before);
	}

	#[test]
	fn drag_restarts_a_settled_layout() {
		let mut state = state_with(spread_triangle(), 3);
		while state.frame() {}
		let node = state.graph.node(1).unwrap();
		let (x, y) = (node.x, node.y);
		assert!(state.pointer_down(x, y));
		assert!(state.simulation.is_running());
		let alpha = state.simulation.alpha();
		state.frame();
		assert!(state.simulation.alpha() > alpha);
	}

	#[test]
	fn pointer_down_on_background_stays_idle() {
		let mut state = state_with(spread_triangle(), 3);
		assert!(!state.pointer_down(600.0, 500.0));
		assert_eq!(state.interaction, Interaction::Idle);
		state.pointer_up();
		assert_eq!(state.simulation.alpha_target(), 0.0);
	}

	#[test]
	fn click_closing_a_moved_drag_is_swallowed() {
		let mut state = state_with(spread_triangle(), 3);
		state.pointer_down(100.0, 100.0);
		state.pointer_move(500.0, 500.0);
		state.pointer_up();
		assert_eq!(state.click(500.0, 500.0).unwrap(), ClickOutcome::Suppressed);
		assert_eq!(state.graph.nodes.len(), 3);
		assert_eq!(state.graph.node(1).unwrap().color, None);

		state.pointer_down(700.0, 20.0);
		state.pointer_up();
		assert!(matches!(state.click(700.0, 20.0).unwrap(), ClickOutcome::Added(4)));
	}

	#[test]
	fn click_without_drag_movement_recolors() {
		let mut state = state_with(spread_triangle(), 3);
		state.pointer_down(100.0, 100.0);
		state.pointer_up();
		assert_eq!(state.click(100.0, 100.0).unwrap(), ClickOutcome::Recolored(1));
	}

	#[test]
	fn leaving_the_canvas_releases_the_drag() {
		let mut state = state_with(spread_triangle(), 3);
		state.pointer_down(100.0, 100.0);
		state.pointer_move(150.0, 150.0);
		state.pointer_leave();
		assert!(!state.is_dragging());
		assert_eq!(state.graph.node(1).unwrap().fx, None);
		assert!(matches!(state.click(700.0, 20.0).unwrap(), ClickOutcome::Added(_)));
	}

	#[test]
	fn hover_follows_idle_pointer() {
		let mut state = state_with(spread_triangle(), 3);
		state.pointer_move(305.0, 95.0);
		assert_eq!(state.hovered, Some(2));
		state.pointer_move(0.0, 0.0);
		assert_eq!(state.hovered, None);
	}

	#[test]
	fn repeated_resize_leaves_positions_alone() {
		let mut state = state_with(GraphData::seed(), 3);
		for _ in 0..30 {
			state.frame();
		}
		let before = positions(&state);
		state.resize(1024.0, 768.0);
		state.resize(1024.0, 768.0);
		assert_eq!(positions(&state), before);
		assert_eq!(state.simulation.center(), (512.0, 384.0));
		assert_eq!((state.width, state.height), (1024.0, 768.0));
	}

	#[test]
	fn rebuild_after_resize_uses_the_new_center() {
		let mut state = state_with(GraphData::seed(), 3);
		state.resize(1000.0, 200.0);
		state.click(5_000.0, 5_000.0).unwrap();
		assert_eq!(state.simulation.center(), (500.0, 100.0));
	}
}
