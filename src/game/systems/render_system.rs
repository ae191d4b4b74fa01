use glam::Mat4;
use glow::HasContext;

use crate::engine::components::mesh::Mesh;
use crate::engine::config::LightConfig;
use crate::engine::debug::DebugRenderer;
use crate::game::scene::Scene;

/// GL state the draw step reads but never mutates.
pub struct RenderTargets<'a> {
    pub lit_shader: glow::Program,
    pub meshes: &'a [Mesh],
    pub floor: Option<&'a Mesh>,
    pub debug: &'a DebugRenderer,
    pub light: &'a LightConfig,
    pub clear_color: [f32; 4],
}

#[derive(Debug)]
pub struct RenderSystem;

impl RenderSystem {
    pub fn update(gl: &glow::Context, targets: &RenderTargets<'_>, scene: &Scene, width: u32, height: u32) {
        let [r, g, b, a] = targets.clear_color;
        unsafe {
            gl.viewport(0, 0, width as i32, height as i32);
            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let view = scene.camera.view_matrix();
        let projection = scene.camera.projection_matrix(width, height);
        Self::setup_frame_uniforms(gl, targets, scene, &view, &projection);

        if let Some(floor) = targets.floor {
            Self::draw_mesh(gl, targets.lit_shader, floor, &Mat4::IDENTITY);
        }

        // Composition step: one world matrix per joint, then its mesh.
        let placement = scene.armature.placement();
        let worlds = scene.armature.world_transforms();
        for (joint, world) in scene.armature.joints().iter().zip(worlds) {
            let Some(mesh) = targets.meshes.get(joint.mesh) else {
                continue;
            };
            Self::draw_mesh(gl, targets.lit_shader, mesh, &(placement * world));
        }

        if scene.show_pivots {
            let view_proj = projection * view;
            targets.debug.render_pivots(gl, &scene.armature.pivot_positions(), &view_proj);
        }

        unsafe {
            gl.bind_vertex_array(None);
        }
    }

    fn setup_frame_uniforms(
        gl: &glow::Context,
        targets: &RenderTargets<'_>,
        scene: &Scene,
        view: &Mat4,
        projection: &Mat4
    ) {
        let shader = targets.lit_shader;
        let light = targets.light;
        unsafe {
            gl.use_program(Some(shader));

            if let Some(loc) = gl.get_uniform_location(shader, "view") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), false, &view.to_cols_array());
            }
            if let Some(loc) = gl.get_uniform_location(shader, "projection") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), false, &projection.to_cols_array());
            }
            if let Some(loc) = gl.get_uniform_location(shader, "light_position") {
                gl.uniform_3_f32_slice(Some(&loc), &light.position.to_array());
            }
            if let Some(loc) = gl.get_uniform_location(shader, "light_color") {
                gl.uniform_3_f32_slice(Some(&loc), &light.color.to_array());
            }
            if let Some(loc) = gl.get_uniform_location(shader, "view_position") {
                gl.uniform_3_f32_slice(Some(&loc), &scene.camera.position.to_array());
            }
            if let Some(loc) = gl.get_uniform_location(shader, "ambient_strength") {
                gl.uniform_1_f32(Some(&loc), light.ambient_strength);
            }
            if let Some(loc) = gl.get_uniform_location(shader, "specular_strength") {
                gl.uniform_1_f32(Some(&loc), light.specular_strength);
            }
            if let Some(loc) = gl.get_uniform_location(shader, "shininess") {
                gl.uniform_1_f32(Some(&loc), light.shininess);
            }
        }
    }

    fn draw_mesh(gl: &glow::Context, shader: glow::Program, mesh: &Mesh, world_txfm: &Mat4) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(shader, "world_txfm") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), false, &world_txfm.to_cols_array());
            }
        }
        mesh.draw(gl, shader);
    }
}
