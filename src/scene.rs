pub mod bindings;
pub mod camera;
pub mod context;
pub mod graph;
pub mod light;
pub mod material;
pub mod mesh;
pub mod texture;
