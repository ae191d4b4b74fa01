pub mod program;
pub mod scene;
pub mod systems;
