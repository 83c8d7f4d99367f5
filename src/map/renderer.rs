use crate::braille::BrailleCanvas;
use crate::features::{ClassifiedFeature, FeatureCategory, LineString, StyleSpec};
use crate::map::geometry::{clip_segment, draw_circle, draw_dashed_line, draw_line, draw_thick_line};
use crate::map::projection::Viewport;

/// Named, independently toggleable collection of rendered features
pub struct OverlayGroup {
    pub name: &'static str,
    pub visible: bool,
    features: Vec<ClassifiedFeature>,
}

impl OverlayGroup {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            visible: true,
            features: Vec::new(),
        }
    }

    pub fn add(&mut self, feature: ClassifiedFeature) {
        self.features.push(feature);
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn features(&self) -> &[ClassifiedFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// The overlay groups of one map view plus the non-toggleable base features.
/// Groups are registered empty at construction, before any data arrives,
/// so the layer control is stable regardless of load outcome.
pub struct LayerSet {
    pub boundaries: OverlayGroup,
    pub schools: OverlayGroup,
    /// Unclassified features: rendered with the default style directly on
    /// the base map, never toggleable
    base: Vec<ClassifiedFeature>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self {
            boundaries: OverlayGroup::new("Batas Kecamatan"),
            schools: OverlayGroup::new("Lokasi SDN"),
            base: Vec::new(),
        }
    }

    /// Route a classified feature into the group matching its category
    pub fn route(&mut self, feature: ClassifiedFeature) {
        match feature.category {
            FeatureCategory::SubDistrictBoundary => self.boundaries.add(feature),
            FeatureCategory::SchoolLocation => self.schools.add(feature),
            FeatureCategory::Unclassified => self.base.push(feature),
        }
    }

    /// Features that carry a popup, in routing order (used for hit-testing)
    pub fn popup_features(&self) -> impl Iterator<Item = &ClassifiedFeature> {
        self.boundaries
            .features()
            .iter()
            .chain(self.schools.features().iter())
            .filter(|f| f.popup.is_some())
    }

    pub fn total(&self) -> usize {
        self.boundaries.len() + self.schools.len() + self.base.len()
    }
}

impl Default for LayerSet {
    fn default() -> Self {
        Self::new()
    }
}

/// One braille canvas per independently colored layer, back to front
pub struct MapLayers {
    pub graticule: BrailleCanvas,
    pub base: BrailleCanvas,
    pub boundaries: BrailleCanvas,
    pub schools: BrailleCanvas,
}

/// Render the layer set into per-layer canvases for the given viewport
pub fn render_layers(layers: &LayerSet, viewport: &Viewport) -> MapLayers {
    let char_w = viewport.width.div_ceil(2);
    let char_h = viewport.height.div_ceil(4);

    let mut out = MapLayers {
        graticule: BrailleCanvas::new(char_w, char_h),
        base: BrailleCanvas::new(char_w, char_h),
        boundaries: BrailleCanvas::new(char_w, char_h),
        schools: BrailleCanvas::new(char_w, char_h),
    };

    draw_graticule(&mut out.graticule, viewport);

    for feature in &layers.base {
        draw_feature(&mut out.base, feature, viewport);
    }
    if layers.boundaries.visible {
        for feature in layers.boundaries.features() {
            draw_feature(&mut out.boundaries, feature, viewport);
        }
    }
    if layers.schools.visible {
        for feature in layers.schools.features() {
            draw_feature(&mut out.schools, feature, viewport);
        }
    }

    out
}

fn draw_feature(canvas: &mut BrailleCanvas, feature: &ClassifiedFeature, viewport: &Viewport) {
    for line in &feature.shape.lines {
        draw_linestring(canvas, line, &feature.style, viewport);
    }
    for &(lon, lat) in &feature.shape.points {
        let (px, py) = viewport.project(lon, lat);
        if viewport.is_visible(px, py) {
            let radius = (feature.style.weight as i32 / 2).max(1);
            draw_circle(canvas, px, py, radius);
        }
    }
}

/// Draw a linestring with viewport culling, honoring the style's dash
/// pattern and stroke weight
fn draw_linestring(
    canvas: &mut BrailleCanvas,
    line: &LineString,
    style: &StyleSpec,
    viewport: &Viewport,
) {
    if line.len() < 2 {
        return;
    }

    // A horizontal span near the full world width is an antimeridian wrap,
    // not a real segment
    let wrap_limit = viewport.world_pixel_width() / 2.0;
    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let wraps = ((px - prev_x).abs() as f64) > wrap_limit;
            let clipped = if wraps {
                None
            } else {
                clip_segment(
                    prev_x,
                    prev_y,
                    px,
                    py,
                    viewport.width as i32,
                    viewport.height as i32,
                )
            };
            if let Some(((ax, ay), (bx, by))) = clipped {
                match style.dash {
                    Some(dash) => draw_dashed_line(canvas, ax, ay, bx, by, dash),
                    None if style.weight >= 4 => draw_thick_line(canvas, ax, ay, bx, by),
                    None => draw_line(canvas, ax, ay, bx, by),
                }
            }
        }

        prev = Some((px, py));
    }
}

/// Draw graticule lines as the base reference grid (the terminal stand-in
/// for the raster tile layer)
fn draw_graticule(canvas: &mut BrailleCanvas, viewport: &Viewport) {
    let (min_lon, min_lat, max_lon, max_lat) = viewport.bounds();
    let span = (max_lon - min_lon).max(max_lat - min_lat);
    let step = graticule_step(span);

    let mut lon = (min_lon / step).floor() * step;
    while lon <= max_lon {
        let (px, _) = viewport.project(lon, min_lat);
        for py in 0..viewport.height as i32 {
            canvas.set_pixel_signed(px, py);
        }
        lon += step;
    }

    let mut lat = (min_lat / step).floor() * step;
    while lat <= max_lat {
        let (_, py) = viewport.project(min_lon, lat);
        for px in 0..viewport.width as i32 {
            canvas.set_pixel_signed(px, py);
        }
        lat += step;
    }
}

/// Pick a 1/2/5-decade step that yields a handful of grid lines
fn graticule_step(span: f64) -> f64 {
    let target = span / 5.0;
    let decade = 10f64.powf(target.log10().floor());
    for mult in [1.0, 2.0, 5.0] {
        if decade * mult >= target {
            return decade * mult;
        }
    }
    decade * 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfig, Projection};
    use crate::features::{classify_collection, FeatureCategory};
    use geojson::FeatureCollection;

    fn sample_collection() -> FeatureCollection {
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature",
                 "properties": {"BatasKecamatan": "Kecamatan Citamiang"},
                 "geometry": {"type": "Polygon", "coordinates":
                    [[[106.90, -6.92], [106.94, -6.92], [106.94, -6.89], [106.90, -6.92]]]}},
                {"type": "Feature",
                 "properties": {"SDN": "SDN Cikole 1"},
                 "geometry": {"type": "Point", "coordinates": [106.92, -6.90]}},
                {"type": "Feature",
                 "properties": {"SDN": "SDN Cikole 2"},
                 "geometry": {"type": "Point", "coordinates": [106.93, -6.91]}},
                {"type": "Feature",
                 "properties": {"name": "jalan"},
                 "geometry": {"type": "LineString", "coordinates":
                    [[106.91, -6.90], [106.93, -6.90]]}}
            ]
        }"#
        .parse()
        .unwrap()
    }

    fn routed_layers() -> LayerSet {
        let mut layers = LayerSet::new();
        for feature in classify_collection(&sample_collection(), Projection::WebMercator) {
            layers.route(feature);
        }
        layers
    }

    #[test]
    fn test_router_group_counts() {
        let layers = routed_layers();
        // 1 boundary, 2 schools, 1 unclassified on the base map
        assert_eq!(layers.boundaries.len(), 1);
        assert_eq!(layers.schools.len(), 2);
        assert_eq!(layers.total(), 4);
    }

    #[test]
    fn test_unclassified_not_in_any_group() {
        let layers = routed_layers();
        for feature in layers
            .boundaries
            .features()
            .iter()
            .chain(layers.schools.features())
        {
            assert_ne!(feature.category, FeatureCategory::Unclassified);
        }
    }

    #[test]
    fn test_popup_features_exclude_base() {
        let layers = routed_layers();
        // Base (unclassified) features never carry popups
        assert_eq!(layers.popup_features().count(), 3);
    }

    #[test]
    fn test_toggle_hides_group() {
        let mut layers = routed_layers();
        let viewport = Viewport::from_config(&MapConfig::standard(), 640, 480);

        let rendered = render_layers(&layers, &viewport);
        assert!(!rendered.schools.is_empty());

        layers.schools.toggle();
        let rendered = render_layers(&layers, &viewport);
        assert!(rendered.schools.is_empty());
        // Boundaries unaffected by the school toggle
        assert!(!rendered.boundaries.is_empty());
    }

    #[test]
    fn test_boundary_rendered_at_default_zoom() {
        // Sub-district polygon with an edge through the view center whose
        // endpoints both project hundreds of pixels off screen: only the
        // clipped mid-segment span is visible, so endpoint culling would
        // drop it entirely
        let collection: FeatureCollection = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"BatasKecamatan": "Kecamatan Citamiang"},
                "geometry": {"type": "Polygon", "coordinates": [[
                    [106.91000, -6.91500],
                    [106.93200, -6.90000],
                    [106.91500, -6.89500],
                    [106.91000, -6.91500]
                ]]}
            }]
        }"#
        .parse()
        .unwrap();

        let mut layers = LayerSet::new();
        for feature in classify_collection(&collection, Projection::WebMercator) {
            layers.route(feature);
        }

        // 80x24 terminal -> 156x84 braille pixels, startup configuration
        let viewport = Viewport::from_config(&MapConfig::standard(), 156, 84);
        let rendered = render_layers(&layers, &viewport);
        assert!(!rendered.boundaries.is_empty());
    }

    #[test]
    fn test_graticule_rendered_on_empty_map() {
        let layers = LayerSet::new();
        for config in [MapConfig::standard(), MapConfig::geographic()] {
            let viewport = Viewport::from_config(&config, 156, 84);
            let rendered = render_layers(&layers, &viewport);
            assert!(!rendered.graticule.is_empty());
        }
    }

    #[test]
    fn test_groups_registered_empty_before_data() {
        let layers = LayerSet::new();
        assert!(layers.boundaries.is_empty());
        assert!(layers.schools.is_empty());
        assert_eq!(layers.boundaries.name, "Batas Kecamatan");
        assert_eq!(layers.schools.name, "Lokasi SDN");
        assert!(layers.boundaries.visible && layers.schools.visible);
    }

    #[test]
    fn test_graticule_step_sane() {
        assert_eq!(graticule_step(1.0), 0.2);
        assert_eq!(graticule_step(0.05), 0.01);
        assert!(graticule_step(350.0) <= 100.0);
    }
}
