//! Scene configuration, read once at startup from `assets/scene.json`.
//!
//! Every struct is `#[serde(default)]`, so a config file only needs the
//! fields it changes. When the file is absent the defaults below describe a
//! four-joint robot arm.

use std::path::{ Path, PathBuf };

use glam::Vec3;
use serde::{ Deserialize, Serialize };
use winit::keyboard::KeyCode;

use crate::engine::components::armature::{ Armature, Joint };
use crate::engine::components::transform::{ JointTransform, RotationLimit };
use crate::engine::error::{ EngineError, EngineResult };
use crate::engine::systems::keyboard_input_system::RESERVED_KEYS;
use crate::engine::utils::math::Axis;

pub const DEFAULT_CONFIG_PATH: &str = "assets/scene.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub assets: AssetPaths,
    pub clear_color: [f32; 4],
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub floor: Option<FloorConfig>,
    /// Hinge speed in degrees per second while a joint key is held.
    pub joint_speed: f32,
    pub joints: Vec<JointConfig>,
    /// Compile/link failures abort startup when set; otherwise they are
    /// logged and the program is used as-is.
    pub strict_shaders: bool,
    pub show_pivots: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetPaths::default(),
            clear_color: [0.5, 0.5, 1.0, 1.0],
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            floor: Some(FloorConfig::default()),
            joint_speed: 60.0,
            joints: default_joints(),
            strict_shaders: true,
            show_pivots: false,
        }
    }
}

impl SceneConfig {
    /// Loads the config at `path`, falling back to defaults when the file
    /// does not exist. Any other read or parse failure is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loaded scene config from {}", path.display());
                Self::from_json(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No scene config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(EngineError::io(path, e)),
        }
    }

    pub fn from_json(text: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn build_armature(&self) -> EngineResult<Armature> {
        for joint in &self.joints {
            let keys = [joint.increase_key, joint.decrease_key];
            if let Some(key) = keys.into_iter().flatten().find(|key| RESERVED_KEYS.contains(key)) {
                return Err(EngineError::ReservedKey { joint: joint.name.clone(), key });
            }
        }

        let joints = self.joints
            .iter()
            .enumerate()
            .map(|(index, joint)| joint.to_joint(index))
            .collect();
        Ok(Armature::new(joints)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Armature viewer".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub gizmo_vertex_shader: PathBuf,
    pub gizmo_fragment_shader: PathBuf,
    pub model: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            vertex_shader: PathBuf::from("assets/shaders/lit.vert"),
            fragment_shader: PathBuf::from("assets/shaders/lit.frag"),
            gizmo_vertex_shader: PathBuf::from("assets/shaders/gizmo.vert"),
            gizmo_fragment_shader: PathBuf::from("assets/shaders/gizmo.frag"),
            model: PathBuf::from("assets/models/arm.gltf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Degrees; -90 looks down -Z.
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees per pixel of pointer motion.
    pub sensitivity: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, 6.0),
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: Vec3,
    pub color: Vec3,
    pub ambient_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(3.0, 5.0, 4.0),
            color: Vec3::ONE,
            ambient_strength: 0.2,
            specular_strength: 0.5,
            shininess: 32.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub half_extent: f32,
    pub height: f32,
    pub color: [f32; 4],
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            half_extent: 5.0,
            height: 0.0,
            color: [1.0, 0.5, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointConfig {
    pub name: String,
    pub parent: Option<usize>,
    /// `None` keeps the joint fixed.
    pub axis: Option<Axis>,
    pub pivot: Vec3,
    pub position: Vec3,
    pub scale: Vec3,
    /// Initial hinge angle in degrees.
    pub angle: f32,
    pub limit: RotationLimit,
    /// Mesh index in the model; defaults to the joint's own index.
    pub mesh: Option<usize>,
    pub increase_key: Option<KeyCode>,
    pub decrease_key: Option<KeyCode>,
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            axis: None,
            pivot: Vec3::ZERO,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            angle: 0.0,
            limit: RotationLimit::default(),
            mesh: None,
            increase_key: None,
            decrease_key: None,
        }
    }
}

impl JointConfig {
    fn hinge(
        name: &str,
        parent: usize,
        axis: Axis,
        pivot: Vec3,
        limit: RotationLimit,
        keys: (KeyCode, KeyCode)
    ) -> Self {
        Self {
            name: name.to_string(),
            parent: Some(parent),
            axis: Some(axis),
            pivot,
            limit,
            increase_key: Some(keys.0),
            decrease_key: Some(keys.1),
            ..Self::default()
        }
    }

    pub fn to_joint(&self, index: usize) -> Joint {
        Joint {
            name: self.name.clone(),
            parent: self.parent,
            axis: self.axis,
            transform: JointTransform {
                position: self.position,
                rotation: Vec3::new(0.0, 0.0, self.angle),
                scale: self.scale,
                pivot: self.pivot,
                rotation_limit: self.limit,
            },
            mesh: self.mesh.unwrap_or(index),
        }
    }
}

fn default_joints() -> Vec<JointConfig> {
    vec![
        JointConfig {
            name: "base".to_string(),
            ..JointConfig::default()
        },
        JointConfig::hinge(
            "turntable",
            0,
            Axis::Y,
            Vec3::new(0.0, 0.5, 0.0),
            RotationLimit::new(-90.0, 90.0),
            (KeyCode::Digit1, KeyCode::Digit2)
        ),
        JointConfig::hinge(
            "shoulder",
            1,
            Axis::X,
            Vec3::new(0.0, 1.5, 0.0),
            RotationLimit::new(-45.0, 80.0),
            (KeyCode::Digit3, KeyCode::Digit4)
        ),
        JointConfig::hinge(
            "elbow",
            2,
            Axis::X,
            Vec3::new(0.0, 2.7, 0.0),
            RotationLimit::new(-90.0, 90.0),
            (KeyCode::Digit5, KeyCode::Digit6)
        )
    ]
}
