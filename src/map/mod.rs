mod canvas;
mod projection;
mod renderer;

pub use canvas::BrailleCanvas;
pub use projection::Viewport;
pub use renderer::{MapLayers, MapRenderer};
