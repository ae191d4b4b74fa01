//! OpenGL viewer for an articulated, hinge-jointed model with a free-look camera.

pub mod engine;
pub mod game;
