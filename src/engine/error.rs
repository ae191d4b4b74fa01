use std::path::PathBuf;

use winit::keyboard::KeyCode;

use crate::engine::systems::pose_system::PoseError;

/// Every failure the viewer can report.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scene config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to load glTF model: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Failed to decode texture: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Model has no mesh at index {0}")]
    MissingMesh(usize),

    #[error("Window or GL context error: {0}")]
    Window(String),

    #[error("GL object creation failed: {0}")]
    Gl(String),

    #[error("Failed to compile {program} {stage} shader: {log}")]
    ShaderCompile {
        program: String,
        stage: &'static str,
        log: String,
    },

    #[error("Failed to link {program} shader program: {log}")]
    ProgramLink { program: String, log: String },

    #[error("Joint {joint} is bound to {key:?}, which the viewer reserves")]
    ReservedKey { joint: String, key: KeyCode },

    #[error(transparent)]
    Pose(#[from] PoseError),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
