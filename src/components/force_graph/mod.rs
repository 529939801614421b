mod component;
mod error;
mod render;
mod simulation;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use simulation::LayoutConfig;
pub use types::GraphData;
