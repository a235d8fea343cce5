//! # Scene Management Module
//!
//! The scene graph (nodes with local poses, global poses recomputed on demand),
//! GPU meshes and the demo world assembled from them.
//!
//! The graph is plain data so the haptic thread can own its own copy:
//!
//! ```rust
//! use bumpview::gfx::resources::SpotLight;
//! use bumpview::gfx::scene::{build_scene_graph, place_light};
//!
//! let (mut graph, nodes) = build_scene_graph();
//! place_light(&mut graph, &nodes, &SpotLight::default());
//! let haptic_copy = graph.clone();
//! assert!((haptic_copy.global(nodes.plane).position.z + 0.3).abs() < 1e-12);
//! ```

pub mod graph;
pub mod mesh;
pub mod scene;
pub mod vertex;

pub use graph::{NodeId, Pose, SceneGraph};
pub use mesh::{DrawMesh, Mesh};
pub use scene::{build_scene_graph, place_light, DemoScene, RenderObject, SceneNodes};
pub use vertex::Vertex3D;
