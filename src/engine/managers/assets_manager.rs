//! Startup asset loading: shader sources, shader programs and the glTF model.
//!
//! Loading is split in two. `load_model_data` reads and decodes everything on
//! the CPU; `upload_model` turns that into GL objects.

use std::path::Path;

use glow::HasContext;

use crate::engine::components::material::{ Material, TextureData };
use crate::engine::components::mesh::{ Mesh, MeshData, MeshPart, Vertex };
use crate::engine::error::{ EngineError, EngineResult };

pub fn read_shader_source(path: &Path) -> EngineResult<String> {
    std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))
}

fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

/// Compiles one stage. With `strict == false` a compile failure is logged
/// and the shader object is returned anyway.
fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
    program_name: &str,
    strict: bool
) -> EngineResult<glow::Shader> {
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(EngineError::Gl)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let error = EngineError::ShaderCompile {
                program: program_name.to_string(),
                stage: stage_name(shader_type),
                log: gl.get_shader_info_log(shader),
            };
            if strict {
                gl.delete_shader(shader);
                return Err(error);
            }
            log::error!("{error}");
        }
        Ok(shader)
    }
}

/// Reads, compiles and links a vertex/fragment pair. Missing files are
/// always fatal; compile and link failures follow `strict`.
pub fn create_shader_program(
    gl: &glow::Context,
    vertex_path: &Path,
    fragment_path: &Path,
    program_name: &str,
    strict: bool
) -> EngineResult<glow::Program> {
    let vertex_source = read_shader_source(vertex_path)?;
    let fragment_source = read_shader_source(fragment_path)?;

    unsafe {
        let vs = compile_shader(gl, glow::VERTEX_SHADER, &vertex_source, program_name, strict)?;
        let fs = match compile_shader(gl, glow::FRAGMENT_SHADER, &fragment_source, program_name, strict) {
            Ok(fs) => fs,
            Err(e) => {
                gl.delete_shader(vs);
                return Err(e);
            }
        };

        let program = gl.create_program().map_err(EngineError::Gl)?;
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        if !gl.get_program_link_status(program) {
            let error = EngineError::ProgramLink {
                program: program_name.to_string(),
                log: gl.get_program_info_log(program),
            };
            if strict {
                gl.delete_program(program);
                return Err(error);
            }
            log::error!("{error}");
        }

        log::info!("Created {program_name} shader program");
        Ok(program)
    }
}

/// One triangle primitive with its material inputs.
#[derive(Debug, Clone)]
pub struct PrimitiveData {
    pub mesh: MeshData,
    pub base_color: [f32; 4],
    pub texture: Option<TextureData>,
}

/// Every mesh of a glTF document, indexed like the document's meshes.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<Vec<PrimitiveData>>,
}

pub fn load_model_data(path: &Path) -> EngineResult<ModelData> {
    log::info!("Loading model {}", path.display());
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let buffers = gltf::import_buffers(&document, Some(base), blob)?;

    let mut meshes = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("Skipping non-triangle primitive in mesh {}", mesh.index());
                continue;
            }
            primitives.push(extract_primitive(&primitive, &buffers, base, mesh.index())?);
        }
        log::debug!(
            "Mesh {} ({}): {} primitives",
            mesh.index(),
            mesh.name().unwrap_or("unnamed"),
            primitives.len()
        );
        meshes.push(primitives);
    }

    Ok(ModelData { meshes })
}

fn extract_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    base: &Path,
    mesh_index: usize
) -> EngineResult<PrimitiveData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| EngineError::InvalidModel(format!("mesh {mesh_index} has no positions")))?
        .collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
    let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|tc| tc.into_f32().collect());
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or([0.0, 0.0, 0.0]),
            uv: uvs
                .as_ref()
                .and_then(|uv| uv.get(i).copied())
                .unwrap_or([0.0, 0.0]),
        })
        .collect();

    let mut mesh = MeshData { vertices, indices };
    if !mesh.indices_in_range() {
        return Err(EngineError::InvalidModel(format!("mesh {mesh_index} has out-of-range indices")));
    }
    if normals.is_none() {
        mesh.compute_normals();
    }

    let pbr = primitive.material().pbr_metallic_roughness();
    let texture = match pbr.base_color_texture() {
        Some(info) => load_texture(&info.texture(), buffers, base)?,
        None => None,
    };

    Ok(PrimitiveData {
        mesh,
        base_color: pbr.base_color_factor(),
        texture,
    })
}

fn load_texture(
    texture: &gltf::Texture,
    buffers: &[gltf::buffer::Data],
    base: &Path
) -> EngineResult<Option<TextureData>> {
    let image = match texture.source().source() {
        gltf::image::Source::View { view, .. } => {
            let Some(buffer) = buffers.get(view.buffer().index()) else {
                log::warn!("Texture {} points at a missing buffer", texture.index());
                return Ok(None);
            };
            let start = view.offset();
            let end = start + view.length();
            let Some(bytes) = buffer.0.get(start..end) else {
                log::warn!("Texture {} buffer view is out of range", texture.index());
                return Ok(None);
            };
            image::load_from_memory(bytes)?
        }
        gltf::image::Source::Uri { uri, .. } => {
            if uri.starts_with("data:") {
                log::warn!("Embedded data-URI textures are not supported; texture {} skipped", texture.index());
                return Ok(None);
            }
            image::open(base.join(uri))?
        }
    };

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Some(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
    }))
}

pub fn upload_model(gl: &glow::Context, model: &ModelData) -> EngineResult<Vec<Mesh>> {
    let mut meshes = Vec::with_capacity(model.meshes.len());
    for primitives in &model.meshes {
        let mut parts = Vec::with_capacity(primitives.len());
        for primitive in primitives {
            let material = match &primitive.texture {
                Some(texture) =>
                    Material::with_texture(gl, primitive.base_color, texture).map_err(EngineError::Gl)?,
                None => Material::new(primitive.base_color),
            };
            parts.push(MeshPart::upload(gl, &primitive.mesh, material)?);
        }
        meshes.push(Mesh { parts });
    }
    log::info!("Uploaded {} meshes", meshes.len());
    Ok(meshes)
}

pub fn load_model(gl: &glow::Context, path: &Path) -> EngineResult<Vec<Mesh>> {
    upload_model(gl, &load_model_data(path)?)
}

pub fn floor_mesh(gl: &glow::Context, half_extent: f32, height: f32, color: [f32; 4]) -> EngineResult<Mesh> {
    let part = MeshPart::upload(gl, &MeshData::quad(half_extent, height), Material::new(color))?;
    Ok(Mesh { parts: vec![part] })
}
