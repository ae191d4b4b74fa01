use bytemuck::{ Pod, Zeroable };
use glam::Vec3;
use glow::HasContext;

use crate::engine::components::material::Material;
use crate::engine::error::{ EngineError, EngineResult };

/// Interleaved vertex layout: location 0 position, 1 normal, 2 uv.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

const VERTEX_STRIDE: i32 = std::mem::size_of::<Vertex>() as i32;

/// CPU-side triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Horizontal square at `height`, facing +Y.
    pub fn quad(half_extent: f32, height: f32) -> Self {
        let corners = [
            ([-half_extent, height, half_extent], [0.0, 0.0]),
            ([half_extent, height, half_extent], [1.0, 0.0]),
            ([half_extent, height, -half_extent], [1.0, 1.0]),
            ([-half_extent, height, -half_extent], [0.0, 1.0]),
        ];
        let vertices = corners
            .iter()
            .map(|&(position, uv)| Vertex {
                position,
                normal: [0.0, 1.0, 0.0],
                uv,
            })
            .collect();
        Self {
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// Area-weighted smooth normals, for models that ship without them.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for triangle in self.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let (Some(va), Some(vb), Some(vc)) = (
                self.vertices.get(a),
                self.vertices.get(b),
                self.vertices.get(c),
            ) else {
                continue;
            };
            let pa = Vec3::from(va.position);
            let face = (Vec3::from(vb.position) - pa).cross(Vec3::from(vc.position) - pa);
            for index in [a, b, c] {
                normals[index] += face;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.normalize_or(Vec3::Y).to_array();
        }
    }

    pub fn indices_in_range(&self) -> bool {
        let count = self.vertices.len();
        self.indices.iter().all(|&i| (i as usize) < count)
    }
}

/// One uploaded primitive: vertex array, its buffers and its material.
#[derive(Debug)]
pub struct MeshPart {
    pub vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    pub index_count: usize,
    pub material: Material,
}

impl MeshPart {
    pub fn upload(gl: &glow::Context, data: &MeshData, material: Material) -> EngineResult<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(EngineError::Gl)?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer().map_err(EngineError::Gl)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data.vertices.as_slice()),
                glow::STATIC_DRAW
            );

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, VERTEX_STRIDE, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, VERTEX_STRIDE, 12);
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, VERTEX_STRIDE, 24);

            let ebo = gl.create_buffer().map_err(EngineError::Gl)?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(data.indices.as_slice()),
                glow::STATIC_DRAW
            );

            gl.bind_vertex_array(None);

            Ok(Self {
                vao,
                vbo,
                ebo,
                index_count: data.indices.len(),
                material,
            })
        }
    }

    pub fn draw(&self, gl: &glow::Context, shader_program: glow::Program) {
        self.material.bind(gl, shader_program);
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, self.index_count as i32, glow::UNSIGNED_INT, 0);
        }
    }

    pub fn cleanup(&self, gl: &glow::Context) {
        self.material.cleanup(gl);
        unsafe {
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_vertex_array(self.vao);
        }
    }
}

/// All primitives of one model mesh; drawn with a single world matrix.
#[derive(Debug, Default)]
pub struct Mesh {
    pub parts: Vec<MeshPart>,
}

impl Mesh {
    pub fn draw(&self, gl: &glow::Context, shader_program: glow::Program) {
        for part in &self.parts {
            part.draw(gl, shader_program);
        }
    }

    pub fn cleanup(&self, gl: &glow::Context) {
        for part in &self.parts {
            part.cleanup(gl);
        }
    }
}
