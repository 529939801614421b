//! Velocity Verlet force layout: link springs, many-body charge and a
//! centering translation, cooled by a decaying `alpha`.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::LayoutError;
use super::types::{GraphData, GraphNode};

const INITIAL_RADIUS: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Spring rest length for every link.
	pub link_distance: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	pub distance_min: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
	/// Alpha target held while a node is being dragged.
	pub drag_alpha_target: f64,
	pub seed: u64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 100.0,
			charge_strength: -100.0,
			distance_min: 1.0,
			alpha_min,
			// Cools from 1 to alpha_min in ~300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			seed: 0x2545_f491,
		}
	}
}

#[derive(Clone, Copy, Debug)]
struct LinkSpring {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

pub struct Simulation {
	config: LayoutConfig,
	alpha: f64,
	alpha_target: f64,
	center: (f64, f64),
	springs: Vec<LinkSpring>,
	running: bool,
	rng: StdRng,
}

impl Simulation {
	/// Builds a running layout over `data`, placing any unplaced nodes.
	pub fn new(
		data: &mut GraphData,
		config: LayoutConfig,
		center: (f64, f64),
	) -> Result<Self, LayoutError> {
		place_nodes(&mut data.nodes);

		let index: HashMap<_, _> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id, i))
			.collect();
		let mut degree = vec![0usize; data.nodes.len()];
		let mut ends = Vec::with_capacity(data.links.len());
		for link in &data.links {
			let source = *index
				.get(&link.source)
				.ok_or(LayoutError::MissingNode(link.source))?;
			let target = *index
				.get(&link.target)
				.ok_or(LayoutError::MissingNode(link.target))?;
			degree[source] += 1;
			degree[target] += 1;
			ends.push((source, target));
		}
		let springs = ends
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				LinkSpring {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		debug!(
			"layout built: {} nodes, {} links",
			data.nodes.len(),
			data.links.len()
		);

		Ok(Self {
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			center,
			springs,
			running: true,
			rng: StdRng::seed_from_u64(config.seed),
		})
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Resumes stepping without touching alpha.
	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Advances one tick if running, then stops once alpha has cooled.
	/// Returns whether a tick happened.
	pub fn step(&mut self, data: &mut GraphData) -> bool {
		if !self.running {
			return false;
		}
		self.tick(data);
		if self.alpha < self.config.alpha_min {
			self.running = false;
			debug!("layout settled");
		}
		true
	}

	pub fn tick(&mut self, data: &mut GraphData) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let nodes = &mut data.nodes;
		self.apply_springs(nodes);
		self.apply_charge(nodes);
		self.apply_center(nodes);

		let keep = 1.0 - self.config.velocity_decay;
		for node in nodes.iter_mut() {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	fn apply_springs(&mut self, nodes: &mut [GraphNode]) {
		let (alpha, distance) = (self.alpha, self.config.link_distance);
		for spring in &self.springs {
			let (s, t) = (&nodes[spring.source], &nodes[spring.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = jiggle(&mut self.rng);
			}
			if dy == 0.0 {
				dy = jiggle(&mut self.rng);
			}
			let len = dx.hypot(dy);
			let k = (len - distance) / len * alpha * spring.strength;
			let (dx, dy) = (dx * k, dy * k);

			let target = &mut nodes[spring.target];
			target.vx -= dx * spring.bias;
			target.vy -= dy * spring.bias;
			let source = &mut nodes[spring.source];
			source.vx += dx * (1.0 - spring.bias);
			source.vy += dy * (1.0 - spring.bias);
		}
	}

	fn apply_charge(&mut self, nodes: &mut [GraphNode]) {
		let strength = self.config.charge_strength * self.alpha;
		let min2 = self.config.distance_min * self.config.distance_min;
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let mut dx = nodes[j].x - nodes[i].x;
				let mut dy = nodes[j].y - nodes[i].y;
				if dx == 0.0 {
					dx = jiggle(&mut self.rng);
				}
				if dy == 0.0 {
					dy = jiggle(&mut self.rng);
				}
				let mut l = dx * dx + dy * dy;
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength / l;
				nodes[i].vx += dx * w;
				nodes[i].vy += dy * w;
				nodes[j].vx -= dx * w;
				nodes[j].vy -= dy * w;
			}
		}
	}

	fn apply_center(&self, nodes: &mut [GraphNode]) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (shift_x, shift_y) = (sx / n - self.center.0, sy / n - self.center.1);
		for node in nodes.iter_mut() {
			node.x -= shift_x;
			node.y -= shift_y;
		}
	}
}

fn jiggle(rng: &mut StdRng) -> f64 {
	rng.gen_range(-0.5..0.5) * 1e-6
}

/// Pinned nodes start at their pin; others without a position go on a
/// phyllotaxis spiral around the origin.
fn place_nodes(nodes: &mut [GraphNode]) {
	let initial_angle = PI * (3.0 - 5f64.sqrt());
	for (i, node) in nodes.iter_mut().enumerate() {
		if let Some(fx) = node.fx {
			node.x = fx;
		}
		if let Some(fy) = node.fy {
			node.y = fy;
		}
		if !node.is_placed() {
			let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * initial_angle;
			node.x = radius * angle.cos();
			node.y = radius * angle.sin();
		}
		if !node.vx.is_finite() || !node.vy.is_finite() {
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}
}
