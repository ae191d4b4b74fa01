use glam::{ Mat4, Vec3 };
use glow::HasContext;

use crate::engine::error::{ EngineError, EngineResult };
use crate::engine::utils::math::scale_translate;

const GIZMO_COLOR: [f32; 3] = [1.0, 0.1, 0.1];
const GIZMO_RADIUS: f32 = 0.12;

// Unit octahedron drawn as three great circles.
const OCTAHEDRON_VERTICES: [f32; 18] = [
    1.0, 0.0, 0.0,  -1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,   0.0, -1.0, 0.0,
    0.0, 0.0, 1.0,   0.0, 0.0, -1.0,
];

const OCTAHEDRON_LINES: [u16; 24] = [
    0, 2, 2, 1, 1, 3, 3, 0, // XY plane
    0, 4, 4, 1, 1, 5, 5, 0, // XZ plane
    2, 4, 4, 3, 3, 5, 5, 2, // YZ plane
];

/// Wireframe markers at joint pivots.
pub struct DebugRenderer {
    shader: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
}

impl DebugRenderer {
    pub fn new(gl: &glow::Context, shader: glow::Program) -> EngineResult<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(EngineError::Gl)?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer().map_err(EngineError::Gl)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(OCTAHEDRON_VERTICES.as_slice()),
                glow::STATIC_DRAW
            );

            let ebo = gl.create_buffer().map_err(EngineError::Gl)?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(OCTAHEDRON_LINES.as_slice()),
                glow::STATIC_DRAW
            );

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 12, 0);
            gl.bind_vertex_array(None);

            Ok(Self { shader, vao, vbo, ebo })
        }
    }

    /// Draws one marker per pivot, on top of the scene.
    pub fn render_pivots(&self, gl: &glow::Context, pivots: &[Vec3], view_proj: &Mat4) {
        unsafe {
            gl.disable(glow::DEPTH_TEST);
            gl.use_program(Some(self.shader));

            if let Some(loc) = gl.get_uniform_location(self.shader, "viewport_txfm") {
                gl.uniform_matrix_4_f32_slice(Some(&loc), false, &view_proj.to_cols_array());
            }
            if let Some(loc) = gl.get_uniform_location(self.shader, "color") {
                gl.uniform_3_f32_slice(Some(&loc), &GIZMO_COLOR);
            }

            gl.bind_vertex_array(Some(self.vao));
            let world_loc = gl.get_uniform_location(self.shader, "world_txfm");
            for &pivot in pivots {
                let model = scale_translate(GIZMO_RADIUS, pivot);
                gl.uniform_matrix_4_f32_slice(world_loc.as_ref(), false, &model.to_cols_array());
                gl.draw_elements(glow::LINES, OCTAHEDRON_LINES.len() as i32, glow::UNSIGNED_SHORT, 0);
            }

            gl.bind_vertex_array(None);
            gl.enable(glow::DEPTH_TEST);
        }
    }

    pub fn cleanup(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_vertex_array(self.vao);
            gl.delete_program(self.shader);
        }
    }
}
