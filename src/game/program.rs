use glow::HasContext;

use crate::engine::components::mesh::Mesh;
use crate::engine::config::{ LightConfig, SceneConfig };
use crate::engine::debug::DebugRenderer;
use crate::engine::error::{ EngineError, EngineResult };
use crate::engine::managers::assets_manager::{ create_shader_program, floor_mesh, load_model };
use crate::engine::systems::keyboard_input_system::KeyboardInputSystem;
use crate::game::scene::Scene;
use crate::game::systems::render_system::{ RenderSystem, RenderTargets };

/// GL resources plus the scene they draw.
pub struct Program {
    gl: glow::Context,
    lit_shader: glow::Program,
    meshes: Vec<Mesh>,
    floor: Option<Mesh>,
    debug: DebugRenderer,
    light: LightConfig,
    clear_color: [f32; 4],
    pub scene: Scene,
}

impl Program {
    pub fn new(gl: glow::Context, config: &SceneConfig) -> EngineResult<Self> {
        let scene = Scene::new(config)?;
        let assets = &config.assets;

        let lit_shader = create_shader_program(
            &gl,
            &assets.vertex_shader,
            &assets.fragment_shader,
            "lit",
            config.strict_shaders
        )?;
        let gizmo_shader = create_shader_program(
            &gl,
            &assets.gizmo_vertex_shader,
            &assets.gizmo_fragment_shader,
            "gizmo",
            config.strict_shaders
        ).inspect_err(|_| unsafe { gl.delete_program(lit_shader) })?;

        let (meshes, floor, debug) = Self::load_resources(&gl, config, &scene, gizmo_shader).inspect_err(|_| unsafe {
            gl.delete_program(lit_shader);
            gl.delete_program(gizmo_shader);
        })?;

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
        }

        log::info!(
            "Program initialized: {} meshes, {} joints",
            meshes.len(),
            scene.armature.len()
        );

        Ok(Self {
            gl,
            lit_shader,
            meshes,
            floor,
            debug,
            light: config.light.clone(),
            clear_color: config.clear_color,
            scene,
        })
    }

    /// Meshes, floor and gizmo renderer. On failure everything uploaded so
    /// far is released; the shader programs stay with the caller.
    fn load_resources(
        gl: &glow::Context,
        config: &SceneConfig,
        scene: &Scene,
        gizmo_shader: glow::Program
    ) -> EngineResult<(Vec<Mesh>, Option<Mesh>, DebugRenderer)> {
        let meshes = load_model(gl, &config.assets.model)?;
        let release_meshes = |meshes: &[Mesh]| meshes.iter().for_each(|mesh| mesh.cleanup(gl));

        if let Some(joint) = scene.armature.joints().iter().find(|j| j.mesh >= meshes.len()) {
            release_meshes(&meshes);
            return Err(EngineError::MissingMesh(joint.mesh));
        }

        let floor = match &config.floor {
            Some(floor) =>
                Some(
                    floor_mesh(gl, floor.half_extent, floor.height, floor.color).inspect_err(|_|
                        release_meshes(&meshes)
                    )?
                ),
            None => None,
        };

        let debug = DebugRenderer::new(gl, gizmo_shader).inspect_err(|_| {
            release_meshes(&meshes);
            if let Some(floor) = &floor {
                floor.cleanup(gl);
            }
        })?;

        Ok((meshes, floor, debug))
    }

    /// Input step for one frame.
    pub fn update(&mut self, input: &KeyboardInputSystem, frame_time: f32) {
        if let Err(e) = self.scene.update(input, frame_time) {
            log::error!("Scene update failed: {e}");
        }
    }

    pub fn render(&self, width: u32, height: u32) {
        let targets = RenderTargets {
            lit_shader: self.lit_shader,
            meshes: &self.meshes,
            floor: self.floor.as_ref(),
            debug: &self.debug,
            light: &self.light,
            clear_color: self.clear_color,
        };
        RenderSystem::update(&self.gl, &targets, &self.scene, width, height);
    }

    pub fn cleanup(&self) {
        for mesh in self.meshes.iter().chain(self.floor.iter()) {
            mesh.cleanup(&self.gl);
        }
        self.debug.cleanup(&self.gl);
        unsafe {
            self.gl.delete_program(self.lit_shader);
        }
        log::info!("GPU resources released");
    }
}
