pub mod components;
pub mod config;
pub mod debug;
pub mod error;
pub mod managers;
pub mod systems;
pub mod utils;

pub use error::{ EngineError, EngineResult };
