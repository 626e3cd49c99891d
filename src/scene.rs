pub mod camera;
pub mod light;
pub mod mesh;
pub mod showcase;
