use std::collections::HashMap;

/// Spatial index over feature bounding boxes, used for popup hit-testing.
/// Conservative approximation: each feature is indexed into every cell its
/// bbox overlaps, so queries can return false positives but never miss a
/// feature. Candidates are narrowed by exact bbox checks at query time.
pub struct FeatureIndex {
    cells: HashMap<(i32, i32), Vec<usize>>,
    bboxes: Vec<(f64, f64, f64, f64)>,
    cell_size: f64,
}

impl FeatureIndex {
    /// Build from feature bounding boxes (min_lon, min_lat, max_lon, max_lat)
    pub fn build(bboxes: Vec<(f64, f64, f64, f64)>, cell_size: f64) -> Self {
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (idx, &(min_lon, min_lat, max_lon, max_lat)) in bboxes.iter().enumerate() {
            let min_cell = to_cell(min_lon, min_lat, cell_size);
            let max_cell = to_cell(max_lon, max_lat, cell_size);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        Self {
            cells,
            bboxes,
            cell_size,
        }
    }

    /// Indices of features whose bbox, expanded by `tolerance` degrees,
    /// contains the point. Ordered by bbox area, smallest first, so point
    /// markers win over enclosing boundary polygons.
    pub fn query_point(&self, lon: f64, lat: f64, tolerance: f64) -> Vec<usize> {
        let cell = to_cell(lon, lat, self.cell_size);

        let mut hits: Vec<usize> = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(indices) = self.cells.get(&(cell.0 + dx, cell.1 + dy)) {
                    for &idx in indices {
                        let (min_lon, min_lat, max_lon, max_lat) = self.bboxes[idx];
                        let inside = lon >= min_lon - tolerance
                            && lon <= max_lon + tolerance
                            && lat >= min_lat - tolerance
                            && lat <= max_lat + tolerance;
                        if inside && !hits.contains(&idx) {
                            hits.push(idx);
                        }
                    }
                }
            }
        }

        hits.sort_by(|&a, &b| {
            let area = |i: usize| {
                let (min_lon, min_lat, max_lon, max_lat) = self.bboxes[i];
                (max_lon - min_lon) * (max_lat - min_lat)
            };
            area(a).total_cmp(&area(b))
        });
        hits
    }

    pub fn len(&self) -> usize {
        self.bboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bboxes.is_empty()
    }
}

#[inline(always)]
fn to_cell(lon: f64, lat: f64, cell_size: f64) -> (i32, i32) {
    ((lon / cell_size).floor() as i32, (lat / cell_size).floor() as i32)
}
