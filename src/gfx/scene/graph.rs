//! Scene graph
//!
//! A flat arena of nodes with a local pose and an optional parent. Parents are
//! always inserted before their children, so one forward pass over the arena is
//! enough to recompute every global pose.
//!
//! The graph is plain data (no GPU handles) so the haptic thread can own a clone
//! of it and recompute transforms at its own rate.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Zero};

/// Rigid transform: rotation followed by translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub rotation: Matrix3<f64>,
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Matrix3::identity(),
        }
    }

    pub fn from_position(position: Vector3<f64>) -> Self {
        Self {
            position,
            rotation: Matrix3::identity(),
        }
    }

    /// Pose of a child expressed in this pose's frame, lifted into the parent frame
    pub fn then(&self, child: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * child.position,
            rotation: self.rotation * child.rotation,
        }
    }

    pub fn transform_point(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.position + self.rotation * point
    }

    pub fn transform_vector(&self, vector: Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Maps a point from the parent frame into this pose's local frame
    pub fn inverse_transform_point(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * (point - self.position)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        let r = self.rotation;
        let p = self.position;
        Matrix4::new(
            r.x.x as f32, r.x.y as f32, r.x.z as f32, 0.0,
            r.y.x as f32, r.y.y as f32, r.y.z as f32, 0.0,
            r.z.x as f32, r.z.y as f32, r.z.z as f32, 0.0,
            p.x as f32, p.y as f32, p.z as f32, 1.0,
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub local: Pose,
    pub enabled: bool,
    parent: Option<NodeId>,
    global: Pose,
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node under `parent` (or the world when `None`)
    ///
    /// # Panics
    /// Panics if `parent` does not belong to this graph.
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>, local: Pose) -> NodeId {
        if let Some(NodeId(p)) = parent {
            assert!(p < self.nodes.len(), "parent node {p} does not exist");
        }

        let global = match parent {
            Some(p) => self.nodes[p.0].global.then(&local),
            None => local,
        };

        self.nodes.push(SceneNode {
            name: name.to_string(),
            local,
            enabled: true,
            parent,
            global,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn set_local_position(&mut self, id: NodeId, position: Vector3<f64>) {
        self.nodes[id.0].local.position = position;
    }

    /// Global pose as of the last [`compute_global_positions`](Self::compute_global_positions)
    pub fn global(&self, id: NodeId) -> Pose {
        self.nodes[id.0].global
    }

    /// Global pose of the frame `id` is attached to
    pub fn parent_global(&self, id: NodeId) -> Pose {
        self.parent(id)
            .map(|p| self.global(p))
            .unwrap_or_else(Pose::identity)
    }

    pub fn compute_global_positions(&mut self) {
        for i in 0..self.nodes.len() {
            let global = match self.nodes[i].parent {
                Some(NodeId(p)) => self.nodes[p].global.then(&self.nodes[i].local),
                None => self.nodes[i].local,
            };
            self.nodes[i].global = global;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Matrix3};

    fn close(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).x.abs() < 1e-9 && (a - b).y.abs() < 1e-9 && (a - b).z.abs() < 1e-9
    }

    #[test]
    fn test_global_positions_follow_parents() {
        let mut graph = SceneGraph::new();
        let base = graph.add_node(
            "base",
            None,
            Pose {
                position: Vector3::new(1.0, 0.0, 0.0),
                rotation: Matrix3::from_angle_z(Deg(90.0)),
            },
        );
        let child = graph.add_node("child", Some(base), Pose::from_position(Vector3::unit_x()));

        assert!(close(graph.global(child).position, Vector3::new(1.0, 1.0, 0.0)));

        graph.set_local_position(base, Vector3::new(0.0, 0.0, 2.0));
        // unchanged until recomputed
        assert!(close(graph.global(child).position, Vector3::new(1.0, 1.0, 0.0)));
        graph.compute_global_positions();
        assert!(close(graph.global(child).position, Vector3::new(0.0, 1.0, 2.0)));
        assert_eq!(graph.find("child"), Some(child));
        assert_eq!(graph.parent_global(child), graph.global(base));
    }

    #[test]
    fn test_inverse_transform_round_trip() {
        let pose = Pose {
            position: Vector3::new(0.0, 0.0, -0.3),
            rotation: Matrix3::from_angle_x(Deg(30.0)),
        };
        let world = Vector3::new(0.1, -0.2, 0.4);
        let local = pose.inverse_transform_point(world);
        assert!(close(pose.transform_point(local), world));
    }

    #[test]
    fn test_matrix_places_translation_in_last_column() {
        let m = Pose::from_position(Vector3::new(1.0, 2.0, 3.0)).to_matrix();
        assert_eq!(m.w.x, 1.0);
        assert_eq!(m.w.y, 2.0);
        assert_eq!(m.w.z, 3.0);
    }
}
