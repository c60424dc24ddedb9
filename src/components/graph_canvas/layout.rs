//! Iterative force simulation over the visual node set.
//!
//! Each step costs O(N²) for repulsion and O(E) for springs, which is fine
//! for a few hundred nodes; there is no spatial partitioning.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::types::{VisualEdge, VisualGraph, VisualNode};

/// Added to every pair distance so coincident nodes never divide by zero.
const DISTANCE_FLOOR: f64 = 0.1;
/// Below this speed a node receives a tiny random kick.
const STASIS_EPSILON: f64 = 0.01;
const JITTER_AMPLITUDE: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
	pub repulsion: f64,
	pub spring_length: f64,
	pub spring_strength: f64,
	pub damping: f64,
	pub center_gravity: f64,
	pub max_velocity: f64,
	pub friction: f64,
	/// Mean kinetic energy per node under which a step counts as quiet.
	pub sleep_energy: f64,
	/// Consecutive quiet steps before the simulation sleeps.
	pub sleep_frames: u32,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			repulsion: 1000.0,
			spring_length: 200.0,
			spring_strength: 0.02,
			damping: 0.95,
			center_gravity: 0.0001,
			max_velocity: 30.0,
			friction: 0.9,
			sleep_energy: 0.005,
			sleep_frames: 60,
		}
	}
}

/// Named simulation constants reachable through `set_parameter`/`parameter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parameter {
	Repulsion,
	SpringLength,
	SpringStrength,
	Damping,
	CenterGravity,
	MaxVelocity,
	Friction,
}

impl Parameter {
	pub const ALL: [Parameter; 7] = [
		Parameter::Repulsion,
		Parameter::SpringLength,
		Parameter::SpringStrength,
		Parameter::Damping,
		Parameter::CenterGravity,
		Parameter::MaxVelocity,
		Parameter::Friction,
	];

	pub fn name(self) -> &'static str {
		match self {
			Parameter::Repulsion => "repulsion",
			Parameter::SpringLength => "springLength",
			Parameter::SpringStrength => "springStrength",
			Parameter::Damping => "damping",
			Parameter::CenterGravity => "centerGravity",
			Parameter::MaxVelocity => "maxVelocity",
			Parameter::Friction => "friction",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownParameter(pub String);

impl fmt::Display for UnknownParameter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown layout parameter `{}`", self.0)
	}
}

impl std::error::Error for UnknownParameter {}

impl FromStr for Parameter {
	type Err = UnknownParameter;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Parameter::ALL
			.into_iter()
			.find(|p| p.name() == name)
			.ok_or_else(|| UnknownParameter(name.to_owned()))
	}
}

impl LayoutParams {
	pub fn get(&self, parameter: Parameter) -> f64 {
		match parameter {
			Parameter::Repulsion => self.repulsion,
			Parameter::SpringLength => self.spring_length,
			Parameter::SpringStrength => self.spring_strength,
			Parameter::Damping => self.damping,
			Parameter::CenterGravity => self.center_gravity,
			Parameter::MaxVelocity => self.max_velocity,
			Parameter::Friction => self.friction,
		}
	}

	pub fn set(&mut self, parameter: Parameter, value: f64) {
		let slot = match parameter {
			Parameter::Repulsion => &mut self.repulsion,
			Parameter::SpringLength => &mut self.spring_length,
			Parameter::SpringStrength => &mut self.spring_strength,
			Parameter::Damping => &mut self.damping,
			Parameter::CenterGravity => &mut self.center_gravity,
			Parameter::MaxVelocity => &mut self.max_velocity,
			Parameter::Friction => &mut self.friction,
		};
		*slot = value;
	}
}

pub struct LayoutEngine {
	graph: VisualGraph,
	params: LayoutParams,
	rng: SmallRng,
	forces: Vec<(f64, f64)>,
	quiet_steps: u32,
	sleeping: bool,
}

impl LayoutEngine {
	pub fn new(params: LayoutParams, seed: u64) -> Self {
		Self {
			graph: VisualGraph::default(),
			params,
			rng: SmallRng::seed_from_u64(seed),
			forces: Vec::new(),
			quiet_steps: 0,
			sleeping: false,
		}
	}

	/// Replaces both working sets in one go.
	pub fn initialize(&mut self, nodes: Vec<VisualNode>, edges: Vec<VisualEdge>) {
		self.set_nodes(nodes);
		self.set_edges(edges);
	}

	pub fn set_nodes(&mut self, nodes: Vec<VisualNode>) {
		self.graph.set_nodes(nodes);
		self.wake();
	}

	pub fn set_edges(&mut self, edges: Vec<VisualEdge>) {
		self.graph.set_edges(edges);
		self.wake();
	}

	pub fn graph(&self) -> &VisualGraph {
		&self.graph
	}

	pub fn is_sleeping(&self) -> bool {
		self.sleeping
	}

	/// Sets `fixed`; pinning also zeroes velocity. Returns `false` for unknown ids.
	pub fn pin(&mut self, id: &str, fixed: bool) -> bool {
		let Some(node) = self.graph.node_mut(id) else {
			return false;
		};
		node.fixed = fixed;
		if fixed {
			node.vx = 0.0;
			node.vy = 0.0;
		}
		self.wake();
		true
	}

	/// Moves a node directly and zeroes its velocity.
	pub fn set_position(&mut self, id: &str, x: f64, y: f64) -> bool {
		if !x.is_finite() || !y.is_finite() {
			return false;
		}
		let Some(node) = self.graph.node_mut(id) else {
			return false;
		};
		node.x = x;
		node.y = y;
		node.vx = 0.0;
		node.vy = 0.0;
		self.wake();
		true
	}

	/// Unknown names and non-finite values are ignored.
	pub fn set_parameter(&mut self, name: &str, value: f64) {
		match name.parse::<Parameter>() {
			Ok(parameter) if value.is_finite() => {
				log::debug!("layout parameter {} = {}", parameter.name(), value);
				self.params.set(parameter, value);
				self.wake();
			}
			Ok(parameter) => log::debug!("ignoring non-finite value for {}", parameter.name()),
			Err(err) => log::debug!("{err}"),
		}
	}

	pub fn parameter(&self, name: &str) -> Option<f64> {
		name.parse::<Parameter>().ok().map(|p| self.params.get(p))
	}

	pub fn kinetic_energy(&self) -> f64 {
		self.graph.nodes().iter().map(VisualNode::kinetic_energy).sum()
	}

	fn wake(&mut self) {
		if self.sleeping {
			log::debug!("layout woke up");
		}
		self.sleeping = false;
		self.quiet_steps = 0;
	}

	/// Advances the simulation by one tick. Returns `false` when nothing moved
	/// because the graph is empty or the layout is asleep.
	pub fn step(&mut self) -> bool {
		let n = self.graph.nodes().len();
		if n == 0 || self.is_sleeping() {
			return false;
		}

		self.accumulate_forces();
		self.integrate();

		let mean_energy = self.kinetic_energy() / n as f64;
		if mean_energy < self.params.sleep_energy {
			self.quiet_steps += 1;
			if self.quiet_steps >= self.params.sleep_frames {
				log::debug!("layout asleep (mean energy {mean_energy:.6})");
				self.sleeping = true;
			}
		} else {
			self.quiet_steps = 0;
		}
		true
	}

	fn accumulate_forces(&mut self) {
		let p = self.params;
		let nodes = self.graph.nodes();
		let n = nodes.len();

		self.forces.clear();
		self.forces.resize(n, (0.0, 0.0));
		let forces = &mut self.forces;

		for i in 0..n {
			for j in (i + 1)..n {
				let (dx, dy) = (nodes[i].x - nodes[j].x, nodes[i].y - nodes[j].y);
				let distance = dx.hypot(dy) + DISTANCE_FLOOR;
				let force = p.repulsion / (distance * distance);
				let (fx, fy) = (dx / distance * force, dy / distance * force);
				forces[i].0 += fx;
				forces[i].1 += fy;
				forces[j].0 -= fx;
				forces[j].1 -= fy;
			}
		}

		for (a, b) in self.graph.resolved_edges() {
			if a == b {
				continue;
			}
			let (dx, dy) = (nodes[a].x - nodes[b].x, nodes[a].y - nodes[b].y);
			let distance = dx.hypot(dy) + DISTANCE_FLOOR;
			let force = p.spring_strength * (distance - p.spring_length);
			let (fx, fy) = (dx / distance * force, dy / distance * force);
			forces[a].0 -= fx;
			forces[a].1 -= fy;
			forces[b].0 += fx;
			forces[b].1 += fy;
		}

		let (cx, cy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (cx, cy) = (cx / n as f64, cy / n as f64);
		for (node, force) in nodes.iter().zip(forces.iter_mut()) {
			let (dx, dy) = (node.x - cx, node.y - cy);
			let distance = dx.hypot(dy) + DISTANCE_FLOOR;
			force.0 -= dx / distance * p.center_gravity;
			force.1 -= dy / distance * p.center_gravity;
		}
	}

	fn integrate(&mut self) {
		let p = self.params;
		let decay = p.damping * p.friction;
		let jitter = JITTER_AMPLITUDE.min(p.max_velocity * std::f64::consts::FRAC_1_SQRT_2);
		let forces = &self.forces;
		let rng = &mut self.rng;

		for (node, &(fx, fy)) in self.graph.nodes_mut().iter_mut().zip(forces.iter()) {
			if node.fixed {
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}

			node.vx = (node.vx + fx) * decay;
			node.vy = (node.vy + fy) * decay;

			let speed = node.speed();
			if !speed.is_finite() {
				node.vx = 0.0;
				node.vy = 0.0;
			} else if speed > p.max_velocity {
				node.vx = node.vx / speed * p.max_velocity;
				node.vy = node.vy / speed * p.max_velocity;
			}

			if node.speed() < STASIS_EPSILON {
				node.vx = (rng.r#gen::<f64>() - 0.5) * 2.0 * jitter;
				node.vy = (rng.r#gen::<f64>() - 0.5) * 2.0 * jitter;
			}

			node.x += node.vx;
			node.y += node.vy;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_canvas::types::{GraphLink, GraphNode};

	fn node_at(id: &str, x: f64, y: f64) -> VisualNode {
		VisualNode::new(&GraphNode::new(id, "person", id), x, y, 20.0)
	}

	fn link(id: &str, source: &str, target: &str, label: &str) -> VisualEdge {
		VisualEdge::from(&GraphLink::new(id, source, target, label))
	}

	fn distance(engine: &LayoutEngine, a: &str, b: &str) -> f64 {
		let graph = engine.graph();
		let (a, b) = (graph.node(a).unwrap(), graph.node(b).unwrap());
		(a.x - b.x).hypot(a.y - b.y)
	}

	#[test]
	fn empty_graph_step_is_a_no_op() {
		let mut engine = LayoutEngine::new(LayoutParams::default(), 1);
		assert!(!engine.step());
	}

	#[test]
	fn linked_pair_settles_near_spring_length() {
		let mut engine = LayoutEngine::new(LayoutParams::default(), 7);
		engine.initialize(
			vec![node_at("a", 100.0, 100.0), node_at("b", 420.0, 160.0)],
			vec![link("e", "a", "b", "owns")],
		);
		for _ in 0..500 {
			engine.step();
		}
		let d = distance(&engine, "a", "b");
		assert!((d - 200.0).abs() < 5.0, "distance {d}");
	}

	#[test]
	fn pinned_node_does_not_move() {
		let mut engine = LayoutEngine::new(LayoutParams::default(), 3);
		engine.initialize(
			vec![node_at("a", 10.0, 10.0), node_at("b", 12.0, 11.0), node_at("c", 300.0, 40.0)],
			vec![link("e1", "a", "b", "knows"), link("e2", "a", "c", "knows")],
		);
		assert!(engine.pin("a", true));
		let before = engine.graph().node("a").cloned().unwrap();
		for _ in 0..200 {
			engine.step();
		}
		let after = engine.graph().node("a").unwrap();
		assert_eq!(after.x.to_bits(), before.x.to_bits());
		assert_eq!(after.y.to_bits(), before.y.to_bits());
		assert_eq!((after.vx, after.vy), (0.0, 0.0));
	}

	#[test]
	fn set_position_overrides_and_stops_node() {
		let mut engine = LayoutEngine::new(LayoutParams::default(), 5);
		engine.initialize(vec![node_at("a", 50.0, 50.0), node_at("b", 60.0, 50.0)], Vec::new());
		engine.step();
		assert!(engine.set_position("a", 120.0, 80.0));
		let a = engine.graph().node("a").unwrap();
		assert_eq!((a.x, a.y, a.vx, a.vy), (120.0, 80.0, 0.0, 0.0));
		assert!(!engine.set_position("missing", 1.0, 1.0));
		assert!(!engine.set_position("a", f64::NAN, 1.0));
	}

	#[test]
	fn dangling_edges_exert_no_force() {
		let mut engine = LayoutEngine::new(LayoutParams::default(), 9);
		engine.initialize(vec![node_at("a", 0.0, 0.0)], vec![link("e", "a", "ghost", "owns")]);
		engine.step();
		let a = engine.graph().node("a").unwrap();
		assert!(a.speed() < STASIS_EPSILON * 2.0);
	}

	#[test]
	fn parameters_by_name() {
		let mut engine = LayoutEngine::new(LayoutParams::default(), 1);
		assert_eq!(engine.parameter("springLength"), Some(200.0));
		engine.set_parameter("springLength", 120.0);
		assert_eq!(engine.parameter("springLength"), Some(120.0));

		engine.set_parameter("gravityWell", 3.0);
		assert_eq!(engine.parameter("gravityWell"), None);
		engine.set_parameter("damping", f64::INFINITY);
		assert_eq!(engine.parameter("damping"), Some(0.95));

		for parameter in Parameter::ALL {
			assert_eq!(parameter.name().parse::<Parameter>(), Ok(parameter));
		}
		assert!("Repulsion".parse::<Parameter>().is_err());
	}

	#[test]
	fn converged_layout_sleeps_and_wakes_on_pin() {
		let params = LayoutParams {
			sleep_frames: 5,
			..LayoutParams::default()
		};
		let mut engine = LayoutEngine::new(params, 11);
		engine.initialize(vec![node_at("a", 0.0, 0.0)], Vec::new());
		for _ in 0..5 {
			assert!(engine.step());
		}
		assert!(engine.is_sleeping());
		let frozen = engine.graph().node("a").cloned().unwrap();
		assert!(!engine.step());
		assert_eq!(engine.graph().node("a"), Some(&frozen));

		engine.pin("a", false);
		assert!(!engine.is_sleeping());
		assert!(engine.step());
	}

	fn settled_single_node() -> LayoutEngine {
		let params = LayoutParams {
			sleep_frames: 3,
			..LayoutParams::default()
		};
		let mut engine = LayoutEngine::new(params, 5);
		engine.initialize(vec![node_at("a", 10.0, 10.0)], Vec::new());
		while engine.step() {}
		assert!(engine.is_sleeping());
		engine
	}

	#[test]
	fn initialize_wakes_settled_layout() {
		let mut engine = settled_single_node();
		engine.initialize(vec![node_at("a", 10.0, 10.0), node_at("b", 50.0, 50.0)], Vec::new());
		assert!(!engine.is_sleeping());
		assert!(engine.step());
	}

	#[test]
	fn set_position_wakes_settled_layout() {
		let mut engine = settled_single_node();
		assert!(engine.set_position("a", 40.0, 40.0));
		assert!(!engine.is_sleeping());
		assert!(engine.step());
	}

	#[test]
	fn set_parameter_wakes_settled_layout() {
		let mut engine = settled_single_node();
		engine.set_parameter("bogus", 1.0);
		assert!(engine.is_sleeping());
		engine.set_parameter("damping", f64::NAN);
		assert!(engine.is_sleeping());

		engine.set_parameter("damping", 0.9);
		assert!(!engine.is_sleeping());
		assert!(engine.step());
	}
}
