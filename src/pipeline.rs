pub mod presenter;
pub mod render_loop;
pub mod renderer;
pub mod shading;
