pub mod assets_manager;
