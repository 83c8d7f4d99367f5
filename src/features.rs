//! Feature classification. A feature's category is decided by which known
//! property key is present and non-empty, checked in fixed priority order
//! (`BatasKecamatan` before `SDN`, first match wins). The category then
//! selects a constant per-view style and a popup payload.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use ratatui::style::Color;

use crate::config::Projection;

/// Property key for sub-district boundary features
pub const BOUNDARY_KEY: &str = "BatasKecamatan";
/// Property key for school location features
pub const SCHOOL_KEY: &str = "SDN";

/// Category of a GeoJSON feature, derived from its property keys
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FeatureCategory {
    SubDistrictBoundary,
    SchoolLocation,
    Unclassified,
}

/// Constant rendering style for a feature category
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StyleSpec {
    pub color: Color,
    /// Stroke weight; 4 and up renders thick lines
    pub weight: u16,
    pub opacity: f64,
    pub fill_opacity: f64,
    /// Dash pattern in pixels (on, off), solid if absent
    pub dash: Option<(u8, u8)>,
}

/// Style table for the standard web-projection view
const STANDARD_STYLES: [StyleSpec; 3] = [
    // SubDistrictBoundary
    StyleSpec {
        color: Color::Rgb(0xff, 0x78, 0x00),
        weight: 4,
        opacity: 0.8,
        fill_opacity: 0.1,
        dash: None,
    },
    // SchoolLocation
    StyleSpec {
        color: Color::Rgb(0x00, 0x66, 0xcc),
        weight: 3,
        opacity: 0.9,
        fill_opacity: 0.2,
        dash: None,
    },
    // Unclassified
    StyleSpec {
        color: Color::Rgb(0x66, 0x66, 0x66),
        weight: 2,
        opacity: 0.7,
        fill_opacity: 0.0,
        dash: None,
    },
];

/// Style table for the geographic (EPSG:4326) view
const GEOGRAPHIC_STYLES: [StyleSpec; 3] = [
    StyleSpec {
        color: Color::Rgb(0xe6, 0x7e, 0x22),
        weight: 3,
        opacity: 0.8,
        fill_opacity: 0.15,
        dash: Some((5, 5)),
    },
    StyleSpec {
        color: Color::Rgb(0x29, 0x80, 0xb9),
        weight: 4,
        opacity: 0.9,
        fill_opacity: 0.25,
        dash: None,
    },
    StyleSpec {
        color: Color::Rgb(0x7f, 0x8c, 0x8d),
        weight: 2,
        opacity: 0.7,
        fill_opacity: 0.0,
        dash: None,
    },
];

/// Look up the constant style for a category in the given projection mode
pub fn style_for(category: FeatureCategory, projection: Projection) -> StyleSpec {
    let table = match projection {
        Projection::WebMercator => &STANDARD_STYLES,
        Projection::Geographic => &GEOGRAPHIC_STYLES,
    };
    match category {
        FeatureCategory::SubDistrictBoundary => table[0],
        FeatureCategory::SchoolLocation => table[1],
        FeatureCategory::Unclassified => table[2],
    }
}

/// Informational popup bound to a classified feature
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Popup {
    pub heading: String,
    pub body: String,
    pub footnote: Option<String>,
}

/// Render a property value to a label if it is non-empty in the JS sense
/// (non-empty string, non-zero number, `true`)
fn truthy_label(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        JsonValue::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Classify a feature from its properties. Returns the category and, for
/// classified features, the label taken from the matched property.
pub fn classify(properties: Option<&JsonObject>) -> (FeatureCategory, Option<String>) {
    let Some(props) = properties else {
        return (FeatureCategory::Unclassified, None);
    };

    // Fixed priority order: boundary key wins when both are present
    if let Some(label) = props.get(BOUNDARY_KEY).and_then(truthy_label) {
        return (FeatureCategory::SubDistrictBoundary, Some(label));
    }
    if let Some(label) = props.get(SCHOOL_KEY).and_then(truthy_label) {
        return (FeatureCategory::SchoolLocation, Some(label));
    }
    (FeatureCategory::Unclassified, None)
}

/// Build the popup payload for a classified feature. Unclassified features
/// carry no popup.
pub fn popup_for(
    category: FeatureCategory,
    label: &str,
    projection: Projection,
) -> Option<Popup> {
    let heading = match category {
        FeatureCategory::SubDistrictBoundary => "Batas Kecamatan",
        FeatureCategory::SchoolLocation => "Sekolah Dasar",
        FeatureCategory::Unclassified => return None,
    };
    let footnote = match projection {
        Projection::WebMercator => None,
        Projection::Geographic => Some("Proyeksi: EPSG:4326".to_string()),
    };
    Some(Popup {
        heading: heading.to_string(),
        body: label.to_string(),
        footnote,
    })
}

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Renderable shape extracted from a feature's geometry
#[derive(Clone, Debug, Default)]
pub struct FeatureShape {
    pub points: Vec<(f64, f64)>,
    pub lines: Vec<LineString>,
}

impl FeatureShape {
    fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty()
    }

    /// Bounding box as (min_lon, min_lat, max_lon, max_lat)
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        let mut bbox = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        let coords = self
            .points
            .iter()
            .chain(self.lines.iter().flatten());
        for &(lon, lat) in coords {
            bbox.0 = bbox.0.min(lon);
            bbox.1 = bbox.1.min(lat);
            bbox.2 = bbox.2.max(lon);
            bbox.3 = bbox.3.max(lat);
        }
        bbox
    }
}

fn collect_shape(geometry: &Geometry, shape: &mut FeatureShape) {
    match &geometry.value {
        Value::Point(c) => {
            if c.len() >= 2 {
                shape.points.push((c[0], c[1]));
            }
        }
        Value::MultiPoint(coords) => {
            for c in coords {
                if c.len() >= 2 {
                    shape.points.push((c[0], c[1]));
                }
            }
        }
        Value::LineString(coords) => {
            shape.lines.push(coords.iter().map(|c| (c[0], c[1])).collect());
        }
        Value::MultiLineString(lines) => {
            for coords in lines {
                shape.lines.push(coords.iter().map(|c| (c[0], c[1])).collect());
            }
        }
        Value::Polygon(rings) => {
            for ring in rings {
                shape.lines.push(ring.iter().map(|c| (c[0], c[1])).collect());
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    shape.lines.push(ring.iter().map(|c| (c[0], c[1])).collect());
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_shape(g, shape);
            }
        }
    }
}

/// A feature after classification: shape, style and popup, ready for routing
#[derive(Clone, Debug)]
pub struct ClassifiedFeature {
    pub category: FeatureCategory,
    pub style: StyleSpec,
    pub popup: Option<Popup>,
    pub shape: FeatureShape,
}

impl ClassifiedFeature {
    fn from_feature(feature: &Feature, projection: Projection) -> Option<Self> {
        // Geometry-less features are never rendered
        let mut shape = FeatureShape::default();
        collect_shape(feature.geometry.as_ref()?, &mut shape);
        if shape.is_empty() {
            return None;
        }

        let (category, label) = classify(feature.properties.as_ref());
        let popup = label
            .as_deref()
            .and_then(|l| popup_for(category, l, projection));

        Some(Self {
            category,
            style: style_for(category, projection),
            popup,
            shape,
        })
    }
}

/// Classify every feature of a parsed collection. Pure and stateless;
/// runs only after the whole document parsed successfully.
pub fn classify_collection(
    collection: &FeatureCollection,
    projection: Projection,
) -> Vec<ClassifiedFeature> {
    collection
        .features
        .iter()
        .filter_map(|f| ClassifiedFeature::from_feature(f, projection))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, JsonValue)]) -> JsonObject {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_boundary_key_classifies_as_boundary() {
        let p = props(&[(BOUNDARY_KEY, json!("Kecamatan Citamiang"))]);
        let (category, label) = classify(Some(&p));
        assert_eq!(category, FeatureCategory::SubDistrictBoundary);
        assert_eq!(label.as_deref(), Some("Kecamatan Citamiang"));
    }

    #[test]
    fn test_school_key_classifies_as_school() {
        let p = props(&[(SCHOOL_KEY, json!("SDN Menteng 01"))]);
        let (category, label) = classify(Some(&p));
        assert_eq!(category, FeatureCategory::SchoolLocation);
        assert_eq!(label.as_deref(), Some("SDN Menteng 01"));
    }

    #[test]
    fn test_boundary_takes_priority_over_school() {
        // First-match-wins: school semantics silently dropped
        let p = props(&[
            (SCHOOL_KEY, json!("SDN Menteng 01")),
            (BOUNDARY_KEY, json!("Kecamatan Citamiang")),
        ]);
        let (category, label) = classify(Some(&p));
        assert_eq!(category, FeatureCategory::SubDistrictBoundary);
        assert_eq!(label.as_deref(), Some("Kecamatan Citamiang"));
    }

    #[test]
    fn test_empty_values_are_unclassified() {
        let p = props(&[(BOUNDARY_KEY, json!("")), (SCHOOL_KEY, json!(""))]);
        assert_eq!(classify(Some(&p)).0, FeatureCategory::Unclassified);

        let p = props(&[(SCHOOL_KEY, json!(0))]);
        assert_eq!(classify(Some(&p)).0, FeatureCategory::Unclassified);

        let p = props(&[(SCHOOL_KEY, JsonValue::Null)]);
        assert_eq!(classify(Some(&p)).0, FeatureCategory::Unclassified);

        assert_eq!(classify(None).0, FeatureCategory::Unclassified);
    }

    #[test]
    fn test_empty_boundary_falls_through_to_school() {
        let p = props(&[
            (BOUNDARY_KEY, json!("")),
            (SCHOOL_KEY, json!("SDN Cikole 2")),
        ]);
        let (category, label) = classify(Some(&p));
        assert_eq!(category, FeatureCategory::SchoolLocation);
        assert_eq!(label.as_deref(), Some("SDN Cikole 2"));
    }

    #[test]
    fn test_unrelated_properties_ignored() {
        let p = props(&[("name", json!("whatever")), ("osm_id", json!(42))]);
        assert_eq!(classify(Some(&p)).0, FeatureCategory::Unclassified);
    }

    #[test]
    fn test_styles_constant_per_category() {
        let a = style_for(FeatureCategory::SchoolLocation, Projection::WebMercator);
        let b = style_for(FeatureCategory::SchoolLocation, Projection::WebMercator);
        assert_eq!(a, b);
        // The two views style the same category differently
        let g = style_for(FeatureCategory::SchoolLocation, Projection::Geographic);
        assert_ne!(a.color, g.color);
        // Geographic boundaries are dashed
        let gb = style_for(FeatureCategory::SubDistrictBoundary, Projection::Geographic);
        assert_eq!(gb.dash, Some((5, 5)));
    }

    #[test]
    fn test_popup_content() {
        let popup = popup_for(
            FeatureCategory::SchoolLocation,
            "SDN Menteng 01",
            Projection::WebMercator,
        )
        .unwrap();
        assert_eq!(popup.heading, "Sekolah Dasar");
        assert_eq!(popup.body, "SDN Menteng 01");
        assert!(popup.footnote.is_none());

        let popup = popup_for(
            FeatureCategory::SubDistrictBoundary,
            "Kecamatan Citamiang",
            Projection::Geographic,
        )
        .unwrap();
        assert_eq!(popup.heading, "Batas Kecamatan");
        assert_eq!(popup.footnote.as_deref(), Some("Proyeksi: EPSG:4326"));

        assert!(popup_for(FeatureCategory::Unclassified, "x", Projection::WebMercator).is_none());
    }

    #[test]
    fn test_classify_collection_scenario() {
        let input = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"SDN": "SDN Menteng 01"},
                "geometry": {"type": "Point", "coordinates": [106.92, -6.9]}
            }]
        }"#;
        let collection: FeatureCollection = input.parse().unwrap();
        let classified = classify_collection(&collection, Projection::WebMercator);

        assert_eq!(classified.len(), 1);
        let feature = &classified[0];
        assert_eq!(feature.category, FeatureCategory::SchoolLocation);
        assert_eq!(
            feature.style,
            style_for(FeatureCategory::SchoolLocation, Projection::WebMercator)
        );
        assert!(feature.popup.as_ref().unwrap().body.contains("SDN Menteng 01"));
        assert_eq!(feature.shape.points, vec![(106.92, -6.9)]);
    }

    #[test]
    fn test_geometry_less_feature_skipped() {
        let input = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"SDN": "SDN Tanpa Lokasi"},
                "geometry": null
            }]
        }"#;
        let collection: FeatureCollection = input.parse().unwrap();
        assert!(classify_collection(&collection, Projection::WebMercator).is_empty());
    }

    #[test]
    fn test_polygon_shape_and_bbox() {
        let geometry = Geometry::new(Value::Polygon(vec![vec![
            vec![106.90, -6.92],
            vec![106.94, -6.92],
            vec![106.94, -6.89],
            vec![106.90, -6.89],
            vec![106.90, -6.92],
        ]]));
        let mut shape = FeatureShape::default();
        collect_shape(&geometry, &mut shape);
        assert_eq!(shape.lines.len(), 1);
        assert_eq!(shape.bbox(), (106.90, -6.92, 106.94, -6.89));
    }
}
