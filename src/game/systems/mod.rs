pub mod render_system;
