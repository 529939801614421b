pub type NodeId = u32;

/// Fill colors a node can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeColor {
	CadetBlue,
	DarkSeaGreen,
}

impl NodeColor {
	pub fn css(self) -> &'static str {
		match self {
			NodeColor::CadetBlue => "#5F9EA0",
			NodeColor::DarkSeaGreen => "#8FBC8F",
		}
	}
}

pub const DEFAULT_NODE_COLOR: NodeColor = NodeColor::CadetBlue;
pub const HIGHLIGHT_NODE_COLOR: NodeColor = NodeColor::DarkSeaGreen;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned position while dragged; overrides the simulated `x`.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	pub color: Option<NodeColor>,
}

impl GraphNode {
	/// A node the layout has not positioned yet.
	pub fn unplaced(id: NodeId) -> Self {
		Self::at(id, f64::NAN, f64::NAN)
	}

	pub fn at(id: NodeId, x: f64, y: f64) -> Self {
		Self {
			id,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			color: None,
		}
	}

	pub fn is_placed(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	pub fn fill(&self) -> NodeColor {
		self.color.unwrap_or(DEFAULT_NODE_COLOR)
	}

	pub fn distance_to(&self, x: f64, y: f64) -> f64 {
		(self.x - x).hypot(self.y - y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphLink {
	pub source: NodeId,
	pub target: NodeId,
}

impl GraphLink {
	pub fn new(source: NodeId, target: NodeId) -> Self {
		Self { source, target }
	}
}

/// Append-only node and link lists shared by the layout and the controller.
#[derive(Clone, Debug)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
	/// `None` once `NodeId::MAX` has been handed out.
	next_id: Option<NodeId>,
}

impl Default for GraphData {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			next_id: Some(1),
		}
	}
}

impl GraphData {
	/// Three nodes joined in a closed triangle.
	pub fn seed() -> Self {
		let mut data = Self::default();
		for id in 1..=3 {
			data.push_node(GraphNode::unplaced(id));
		}
		data.push_link(GraphLink::new(1, 2));
		data.push_link(GraphLink::new(2, 3));
		data.push_link(GraphLink::new(3, 1));
		data
	}

	/// Hands out the next id, or `None` when the id space is used up.
	/// Ids are never reused.
	pub fn next_node_id(&mut self) -> Option<NodeId> {
		let id = self.next_id?;
		self.next_id = id.checked_add(1);
		Some(id)
	}

	pub fn push_node(&mut self, node: GraphNode) {
		if self.next_id.is_some_and(|next| node.id >= next) {
			self.next_id = node.id.checked_add(1);
		}
		self.nodes.push(node);
	}

	pub fn push_link(&mut self, link: GraphLink) {
		self.links.push(link);
	}

	pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}
}
