/// Projection used by a map view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Projection {
    /// Web Mercator (the default web-map projection)
    WebMercator,
    /// EPSG:4326 equirectangular (geographic coordinate system)
    Geographic,
}

impl Projection {
    /// Short label shown in UI chrome
    pub fn label(&self) -> &'static str {
        match self {
            Projection::WebMercator => "Web Mercator",
            Projection::Geographic => "EPSG:4326",
        }
    }
}

/// Immutable configuration for one map view, constructed once at startup.
#[derive(Clone)]
pub struct MapConfig {
    /// View title shown on the map border
    pub title: &'static str,
    /// Center longitude in degrees
    pub center_lon: f64,
    /// Center latitude in degrees
    pub center_lat: f64,
    /// Initial zoom level (Leaflet-style: scale doubles per level)
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Raster tile source template ({s} subdomain, {z}/{x}/{y} tile address)
    pub tile_url: &'static str,
    /// Attribution line shown in the status bar
    pub attribution: &'static str,
    pub projection: Projection,
}

// Both views center on the same sub-district (Sukabumi).
const CENTER_LON: f64 = 106.92025;
const CENTER_LAT: f64 = -6.90767;

const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

impl MapConfig {
    /// Standard web-projection view
    pub fn standard() -> Self {
        Self {
            title: "Peta Sekolah",
            center_lon: CENTER_LON,
            center_lat: CENTER_LAT,
            zoom: 15.0,
            min_zoom: 10.0,
            max_zoom: 18.0,
            tile_url: OSM_TILE_URL,
            attribution: "© OpenStreetMap contributors",
            projection: Projection::WebMercator,
        }
    }

    /// Geographic-projection view (EPSG:4326)
    pub fn geographic() -> Self {
        Self {
            title: "Peta Sekolah (EPSG:4326)",
            center_lon: CENTER_LON,
            center_lat: CENTER_LAT,
            zoom: 12.0,
            min_zoom: 8.0,
            max_zoom: 16.0,
            tile_url: OSM_TILE_URL,
            attribution: "© OpenStreetMap contributors | EPSG:4326",
            projection: Projection::Geographic,
        }
    }
}
