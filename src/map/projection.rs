use std::f64::consts::PI;

use crate::config::{MapConfig, Projection};

/// Leaflet-style tile size: world width in pixels at zoom 0
const TILE_SIZE: f64 = 256.0;

/// Viewport representing the visible map area, zoom level and projection
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (scale doubles per level)
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub projection: Projection,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    /// Construct the initial viewport for a map view
    pub fn from_config(config: &MapConfig, width: usize, height: usize) -> Self {
        Self {
            center_lon: config.center_lon,
            center_lat: config.center_lat,
            zoom: config.zoom,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            projection: config.projection,
            width,
            height,
        }
    }

    /// Pixels per normalized world unit at the current zoom
    fn scale(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    /// Forward projection to normalized world coordinates in [0, 1]
    fn to_world(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon + 180.0) / 360.0;
        let y = match self.projection {
            Projection::WebMercator => {
                let lat_rad = lat.clamp(-85.05, 85.05).to_radians();
                (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
            }
            Projection::Geographic => (90.0 - lat) / 180.0,
        };
        (x, y)
    }

    /// Inverse of `to_world`
    fn from_world(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = x * 360.0 - 180.0;
        let lat = match self.projection {
            Projection::WebMercator => (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees(),
            Projection::Geographic => 90.0 - y * 180.0,
        };
        (lon, lat)
    }

    /// Project a geographic coordinate (lon, lat) to canvas pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (x, y) = self.to_world(lon, lat);
        let (cx, cy) = self.to_world(self.center_lon, self.center_lat);
        let scale = self.scale();

        let px = ((x - cx) * scale + self.width as f64 / 2.0).round() as i32;
        let py = ((y - cy) * scale + self.height as f64 / 2.0).round() as i32;
        (px, py)
    }

    /// Unproject canvas pixel coordinates back to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let (cx, cy) = self.to_world(self.center_lon, self.center_lat);
        let scale = self.scale();

        let x = (px as f64 - self.width as f64 / 2.0) / scale + cx;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + cy;
        self.from_world(x, y)
    }

    /// Pan the viewport by a pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let (lon, lat) = self.unproject(
            self.width as i32 / 2 + dx,
            self.height as i32 / 2 + dy,
        );

        self.center_lon = lon;
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        self.center_lat = lat.clamp(-85.0, 85.0);
    }

    /// Zoom in one level (clamped to the configured maximum)
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).min(self.max_zoom);
    }

    /// Zoom out one level (clamped to the configured minimum)
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).max(self.min_zoom);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -1.0);
    }

    /// Change zoom while keeping the point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);

        // Pan so the anchor point projects back to the same pixel
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Check if a projected point is visible in the viewport (with margin)
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10
            && px < self.width as i32 + 10
            && py >= -10
            && py < self.height as i32 + 10
    }

    /// Geographic bounds of the visible area: (min_lon, min_lat, max_lon, max_lat)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (lon_a, lat_a) = self.unproject(0, 0);
        let (lon_b, lat_b) = self.unproject(self.width as i32, self.height as i32);
        (
            lon_a.min(lon_b),
            lat_a.min(lat_b),
            lon_a.max(lon_b),
            lat_a.max(lat_b),
        )
    }

    /// Width of the full world in canvas pixels at the current zoom
    pub fn world_pixel_width(&self) -> f64 {
        self.scale()
    }

    /// Ground distance in meters covered by one canvas pixel at the center
    pub fn meters_per_pixel(&self) -> f64 {
        const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;
        let base = EARTH_CIRCUMFERENCE_M / self.scale();
        match self.projection {
            // Mercator pixel scale shrinks with latitude
            Projection::WebMercator => base * self.center_lat.to_radians().cos(),
            Projection::Geographic => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mercator_viewport() -> Viewport {
        Viewport::from_config(&MapConfig::standard(), 200, 100)
    }

    fn geographic_viewport() -> Viewport {
        Viewport::from_config(&MapConfig::geographic(), 200, 100)
    }

    #[test]
    fn test_project_center() {
        for vp in [mercator_viewport(), geographic_viewport()] {
            let (x, y) = vp.project(vp.center_lon, vp.center_lat);
            assert_eq!(x, 100);
            assert_eq!(y, 50);
        }
    }

    #[test]
    fn test_unproject_inverts_project() {
        for vp in [mercator_viewport(), geographic_viewport()] {
            let (px, py) = vp.project(106.93, -6.9);
            let (lon, lat) = vp.unproject(px, py);
            // Integer pixels lose sub-pixel precision; allow two pixels worth
            let tolerance = 2.0 * 360.0 / (256.0 * vp.zoom.exp2());
            assert!((lon - 106.93).abs() < tolerance);
            assert!((lat + 6.9).abs() < tolerance);
        }
    }

    #[test]
    fn test_pan_moves_center() {
        let mut vp = mercator_viewport();
        let lon_before = vp.center_lon;
        vp.pan(10, 0);
        assert!(vp.center_lon > lon_before);
    }

    #[test]
    fn test_zoom_clamped_to_config_bounds() {
        let mut vp = mercator_viewport();
        for _ in 0..20 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom, vp.max_zoom);
        for _ in 0..40 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom, vp.min_zoom);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut vp = geographic_viewport();
        vp.zoom = 10.0; // leave room below max_zoom
        let (lon, lat) = vp.unproject(30, 20);
        vp.zoom_in_at(30, 20);
        let (px, py) = vp.project(lon, lat);
        assert!((px - 30).abs() <= 1);
        assert!((py - 20).abs() <= 1);
    }

    #[test]
    fn test_bounds_contain_center() {
        for vp in [mercator_viewport(), geographic_viewport()] {
            let (min_lon, min_lat, max_lon, max_lat) = vp.bounds();
            assert!(min_lon < vp.center_lon && vp.center_lon < max_lon);
            assert!(min_lat < vp.center_lat && vp.center_lat < max_lat);
        }
    }

    #[test]
    fn test_geographic_is_linear_in_latitude() {
        let vp = geographic_viewport();
        let scale = 256.0 * vp.zoom.exp2();
        let (_, py) = vp.project(vp.center_lon, vp.center_lat + 0.01);
        let expected = (vp.height as f64 / 2.0 - 0.01 / 180.0 * scale).round() as i32;
        assert_eq!(py, expected);
    }
}
