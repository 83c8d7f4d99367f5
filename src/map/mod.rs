mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use projection::Viewport;
pub use renderer::{render_layers, LayerSet, MapLayers, OverlayGroup};
pub use spatial::FeatureIndex;
