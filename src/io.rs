pub mod config;
pub mod image;
pub mod importer;
pub mod obj_loader;
pub mod scene_file;
