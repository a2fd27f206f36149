// Engine module: simulation core (steering, camera rig) plus the scene
// plumbing around it (components, systems, meshes, input, overlay).

pub mod camera;
pub mod components;
pub mod debug_overlay;
pub mod input;
pub mod mesh;
pub mod scroll;
pub mod steering;
pub mod subdivide;
pub mod systems;

// Re-export commonly used items
pub use components::*;
