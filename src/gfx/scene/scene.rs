//! The demo world: scene graph layout and the GPU objects drawn from it

use cgmath::Vector3;

use super::{
    graph::{NodeId, Pose, SceneGraph},
    mesh::{DrawMesh, Mesh},
};
use crate::gfx::{
    geometry::{generate_plane, generate_sphere},
    rendering::pipeline_manager::PipelineManager,
    resources::{
        global_bindings::{GlobalLayouts, ObjectBinding, ObjectUniform, SpotLight},
        material::Material,
    },
};
use crate::state::ShaderUniforms;

pub const SURFACE_PIPELINE: &str = "Surface";
pub const PHONG_PIPELINE: &str = "Phong";

pub const PLANE_SIZE: f64 = 0.9;
pub const PLANE_POSITION: Vector3<f64> = Vector3::new(0.0, 0.0, -0.3);
pub const PLANE_SHININESS: f32 = 80.0;
pub const MARKER_RADIUS: f64 = 0.02;

/// Node ids of the demo's scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneNodes {
    pub world: NodeId,
    pub light: NodeId,
    pub plane: NodeId,
    /// Parent frame of the haptic tool; the marker node follows the device position
    pub tool: NodeId,
    pub marker: NodeId,
}

/// Builds the world: light, plane and tool frames hang directly below the root
///
/// The light node starts at the origin until [`place_light`] configures it.
pub fn build_scene_graph() -> (SceneGraph, SceneNodes) {
    let mut graph = SceneGraph::new();
    let world = graph.add_node("world", None, Pose::identity());
    let light = graph.add_node("light", Some(world), Pose::identity());
    let plane = graph.add_node("plane", Some(world), Pose::from_position(PLANE_POSITION));
    let tool = graph.add_node("tool", Some(world), Pose::identity());
    let marker = graph.add_node("marker", Some(world), Pose::identity());
    graph.compute_global_positions();

    (
        graph,
        SceneNodes {
            world,
            light,
            plane,
            tool,
            marker,
        },
    )
}

/// Moves the light node to the spot light's position
pub fn place_light(graph: &mut SceneGraph, nodes: &SceneNodes, light: &SpotLight) {
    graph.set_local_position(nodes.light, light.position);
    graph.compute_global_positions();
}

pub struct RenderObject {
    pub name: String,
    pub node: NodeId,
    pub mesh: Mesh,
    pub material: Material,
    pub pipeline: &'static str,
    pub color: [f32; 4],
    pub shininess: f32,
    pub visible: bool,
    binding: ObjectBinding,
}

impl RenderObject {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        layouts: &GlobalLayouts,
        name: &str,
        node: NodeId,
        mesh: Mesh,
        material: Material,
        pipeline: &'static str,
        color: [f32; 4],
        shininess: f32,
    ) -> Self {
        let binding = ObjectBinding::new(
            device,
            &layouts.object,
            &ObjectUniform::new(crate::gfx::camera::camera_utils::identity_array(), color, shininess),
            &format!("{name} Object Bind Group"),
        );
        Self {
            name: name.to_string(),
            node,
            mesh,
            material,
            pipeline,
            color,
            shininess,
            visible: true,
            binding,
        }
    }
}

pub struct DemoScene {
    pub graph: SceneGraph,
    pub nodes: SceneNodes,
    pub light: SpotLight,
    pub objects: Vec<RenderObject>,
}

impl DemoScene {
    /// Creates the plane and marker objects on top of an existing scene graph
    pub fn new(
        device: &wgpu::Device,
        layouts: &GlobalLayouts,
        graph: SceneGraph,
        nodes: SceneNodes,
        light: SpotLight,
        plane_material: Material,
        marker_material: Material,
    ) -> Self {
        let plane_mesh = Mesh::from_geometry(
            device,
            "Plane",
            &generate_plane(PLANE_SIZE as f32, PLANE_SIZE as f32),
        );
        let marker_mesh =
            Mesh::from_geometry(device, "Marker", &generate_sphere(MARKER_RADIUS as f32, 36, 36));

        let objects = vec![
            RenderObject::new(
                device,
                layouts,
                "Plane",
                nodes.plane,
                plane_mesh,
                plane_material,
                SURFACE_PIPELINE,
                [1.0, 1.0, 1.0, 1.0],
                PLANE_SHININESS,
            ),
            RenderObject::new(
                device,
                layouts,
                "Marker",
                nodes.marker,
                marker_mesh,
                marker_material,
                PHONG_PIPELINE,
                [1.0, 1.0, 1.0, 1.0],
                PLANE_SHININESS,
            ),
        ];

        Self {
            graph,
            nodes,
            light,
            objects,
        }
    }

    /// Moves the sphere marker to the device's global position
    pub fn set_marker_position(&mut self, position: [f64; 3]) {
        self.graph
            .set_local_position(self.nodes.marker, Vector3::from(position));
    }

    /// Light with its position taken from the light node
    pub fn light_global(&self) -> SpotLight {
        self.light
            .with_position(self.graph.global(self.nodes.light).position)
    }

    /// Recomputes global poses and uploads per-object uniforms
    pub fn update(&mut self, queue: &wgpu::Queue, uniforms: &ShaderUniforms) {
        self.graph.compute_global_positions();

        for object in self.objects.iter_mut() {
            let model = self.graph.global(object.node).to_matrix();
            let mut content = ObjectUniform::new(model.into(), object.color, object.shininess);
            if object.pipeline == SURFACE_PIPELINE {
                content = content.with_height(
                    uniforms.height_scale as f32,
                    uniforms.height_correction as f32,
                );
            }
            object.binding.update(queue, content);
        }
    }

    /// Draws every visible object; group 0 must already be bound
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, pipelines: &PipelineManager) {
        for object in self.objects.iter().filter(|o| o.visible) {
            let Some(pipeline) = pipelines.pipeline(object.pipeline) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, object.binding.bind_group(), &[]);
            render_pass.set_bind_group(2, object.material.bind_group(), &[]);
            render_pass.draw_mesh(&object.mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_graph_layout() {
        let (mut graph, nodes) = build_scene_graph();
        place_light(&mut graph, &nodes, &SpotLight::default());
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.parent(nodes.plane), Some(nodes.world));
        assert_eq!(graph.find("marker"), Some(nodes.marker));

        let plane = graph.global(nodes.plane).position;
        assert!((plane.z + 0.3).abs() < 1e-12);
        let light = graph.global(nodes.light).position;
        assert_eq!(light, Vector3::new(3.5, 2.0, 8.0));
    }

    #[test]
    fn test_tool_parent_is_world_origin() {
        let (graph, nodes) = build_scene_graph();
        let parent = graph.parent_global(nodes.tool);
        assert_eq!(parent.position, Vector3::new(0.0, 0.0, 0.0));
    }
}
