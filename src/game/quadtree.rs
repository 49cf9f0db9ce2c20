//! Barnes-Hut quadtree for approximate N-body gravity
//!
//! Nodes live in a single `Vec` and refer to their children by index. The
//! four children of a node are allocated together, so a node only stores the
//! index of its first child (NW, NE, SW, SE follow in order).
//!
//! The tree is never updated incrementally: [`QuadTree::build`] clears the
//! arena (keeping its allocation) and reinserts every sample. The integrator
//! rebuilds it before each kick so forces are evaluated at current positions.
//!
//! Distances are measured with the minimum image convention, so clusters on
//! the far side of a wrapped edge attract through that edge.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::bounds::WorldBounds;
use crate::game::constants::tree::{INITIAL_CAPACITY, MAX_DEPTH};
use crate::util::vec2::Vec2;

/// Index into the node arena
pub type NodeId = usize;

/// The root is always the first node
pub const ROOT: NodeId = 0;

/// Position and mass of one gravity body, copied out of the entity vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySample {
    pub position: Vec2,
    pub mass: f32,
}

impl GravitySample {
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self { position, mass }
    }
}

/// Constants of the softened gravity law and the opening criterion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityParams {
    /// Gravitational constant
    pub g: f32,
    /// Opening angle; smaller is more accurate
    pub theta: f32,
    /// Softening length
    pub eps: f32,
}

/// A square region of the tree
#[derive(Debug, Clone)]
pub struct Node {
    pub center: Vec2,
    pub half_size: f32,
    pub center_of_mass: Vec2,
    pub total_mass: f32,
    first_child: Option<NodeId>,
    body: Option<GravitySample>,
    /// Leaf at the depth limit holding more than one body
    aggregated: bool,
    depth: u32,
}

impl Node {
    fn new(center: Vec2, half_size: f32, depth: u32) -> Self {
        Self {
            center,
            half_size,
            center_of_mass: Vec2::ZERO,
            total_mass: 0.0,
            first_child: None,
            body: None,
            aggregated: false,
            depth,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }

    /// The body stored in a leaf, if any
    pub fn body(&self) -> Option<&GravitySample> {
        self.body.as_ref()
    }

    /// Child ids in NW, NE, SW, SE order
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.first_child.map(|c| [c, c + 1, c + 2, c + 3])
    }

    /// Bit 0 set for east (`x >= cx`), bit 1 set for south (`y >= cy`)
    #[inline]
    fn quadrant(&self, pos: Vec2) -> usize {
        let mut quad = 0;
        if pos.x >= self.center.x {
            quad |= 1;
        }
        if pos.y >= self.center.y {
            quad |= 2;
        }
        quad
    }

    /// Fold one more body into the mass-weighted aggregate
    #[inline]
    fn absorb(&mut self, sample: &GravitySample) {
        let total = self.total_mass + sample.mass;
        if total > 0.0 {
            self.center_of_mass =
                (self.center_of_mass * self.total_mass + sample.position * sample.mass) / total;
        }
        self.total_mass = total;
    }

    #[inline]
    fn store(&mut self, sample: GravitySample) {
        self.center_of_mass = sample.position;
        self.total_mass = sample.mass;
        self.body = Some(sample);
    }
}

/// Barnes-Hut tree over the whole (square-covered) world
#[derive(Debug, Clone)]
pub struct QuadTree {
    bounds: WorldBounds,
    nodes: Vec<Node>,
}

impl QuadTree {
    pub fn new(bounds: WorldBounds) -> Self {
        let mut tree = Self {
            bounds,
            nodes: Vec::with_capacity(INITIAL_CAPACITY),
        };
        tree.reset_root();
        tree
    }

    fn reset_root(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new(
            self.bounds.center(),
            self.bounds.root_half_size(),
            0,
        ));
    }

    /// Discard the current tree and insert every sample from scratch
    pub fn build(&mut self, samples: &[GravitySample]) {
        self.reset_root();
        for sample in samples {
            self.insert(*sample);
        }
    }

    /// Insert one body, subdividing occupied leaves on the way down
    pub fn insert(&mut self, sample: GravitySample) {
        let mut id = ROOT;
        loop {
            if let Some(first) = self.nodes[id].first_child {
                let node = &mut self.nodes[id];
                node.absorb(&sample);
                id = first + node.quadrant(sample.position);
                continue;
            }

            let node = &mut self.nodes[id];
            match node.body {
                None => {
                    node.store(sample);
                    return;
                }
                Some(_) if node.depth >= MAX_DEPTH => {
                    node.absorb(&sample);
                    node.aggregated = true;
                    return;
                }
                Some(existing) => {
                    // Split the leaf, park the resident body in its quadrant, then
                    // revisit this node as an internal one to place the newcomer.
                    node.body = None;
                    let first = self.subdivide(id);
                    let quad = self.nodes[id].quadrant(existing.position);
                    self.nodes[first + quad].store(existing);
                }
            }
        }
    }

    fn subdivide(&mut self, id: NodeId) -> NodeId {
        let (center, half, depth) = {
            let node = &self.nodes[id];
            (node.center, node.half_size * 0.5, node.depth + 1)
        };
        let first = self.nodes.len();
        self.nodes.push(Node::new(Vec2::new(center.x - half, center.y - half), half, depth)); // NW
        self.nodes.push(Node::new(Vec2::new(center.x + half, center.y - half), half, depth)); // NE
        self.nodes.push(Node::new(Vec2::new(center.x - half, center.y + half), half, depth)); // SW
        self.nodes.push(Node::new(Vec2::new(center.x + half, center.y + half), half, depth)); // SE
        self.nodes[id].first_child = Some(first);
        first
    }

    /// Approximate gravitational acceleration at `pos` for a body of `mass`.
    ///
    /// A leaf whose body has exactly this position and mass is treated as the
    /// query body itself and skipped. Two distinct bodies sharing both would
    /// also skip each other; that case is accepted.
    pub fn acceleration(&self, pos: Vec2, mass: f32, params: &GravityParams) -> Vec2 {
        let mut acc = Vec2::ZERO;
        let mut stack: SmallVec<[NodeId; 64]> = SmallVec::new();
        stack.push(ROOT);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.total_mass == 0.0 {
                continue;
            }

            let dr = self.bounds.minimum_image(node.center_of_mass - pos);
            let r2 = dr.length_sq();

            match node.first_child {
                None => {
                    if !node.aggregated {
                        if let Some(body) = &node.body {
                            if body.position == pos && body.mass == mass {
                                continue;
                            }
                        }
                    }
                    acc += softened_gravity(dr, r2, node.total_mass, params);
                }
                Some(first) => {
                    let r = r2.sqrt();
                    let size = node.half_size * 2.0;
                    if r > 0.0 && size / r < params.theta {
                        acc += softened_gravity(dr, r2, node.total_mass, params);
                    } else {
                        // Reverse push so children are visited NW, NE, SW, SE
                        stack.extend((0..4).rev().map(|q| first + q));
                    }
                }
            }
        }

        acc
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check that every internal node's mass and center of mass match its
    /// children's within a relative tolerance
    pub fn check_mass_invariant(&self, tolerance: f32) -> bool {
        self.nodes.iter().all(|node| {
            let Some(children) = node.children() else {
                return true;
            };
            let mut mass = 0.0f32;
            let mut moment = Vec2::ZERO;
            for child in children {
                let c = &self.nodes[child];
                mass += c.total_mass;
                moment += c.center_of_mass * c.total_mass;
            }
            let scale = node.total_mass.abs().max(1.0);
            if (mass - node.total_mass).abs() > tolerance * scale {
                return false;
            }
            if mass > 0.0 {
                let com = moment / mass;
                let extent = self.bounds.width.max(self.bounds.height);
                if !com.approx_eq(node.center_of_mass, tolerance * extent) {
                    return false;
                }
            }
            true
        })
    }
}

/// `G M dr / (|dr|^2 + eps^2)^1.5`, zero when the denominator vanishes
#[inline]
pub fn softened_gravity(dr: Vec2, r2: f32, mass: f32, params: &GravityParams) -> Vec2 {
    let denom = (r2 + params.eps * params.eps).powf(1.5);
    if denom <= 0.0 {
        return Vec2::ZERO;
    }
    dr * (params.g * mass / denom)
}

/// Exact O(N^2) reference sum with the same self-exclusion rule as the tree
pub fn direct_acceleration(
    samples: &[GravitySample],
    pos: Vec2,
    mass: f32,
    params: &GravityParams,
    bounds: &WorldBounds,
) -> Vec2 {
    let mut acc = Vec2::ZERO;
    for other in samples {
        if other.mass == 0.0 || (other.position == pos && other.mass == mass) {
            continue;
        }
        let dr = bounds.minimum_image(other.position - pos);
        acc += softened_gravity(dr, dr.length_sq(), other.mass, params);
    }
    acc
}
