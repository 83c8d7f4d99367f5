use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

use anyhow::Result;
use geojson::FeatureCollection;

use crate::config::MapConfig;
use crate::data;
use crate::features::{classify_collection, FeatureCategory, Popup};
use crate::map::{FeatureIndex, LayerSet, Viewport};
use crate::notice::NoticeBoard;

/// Localized message for a failed data load
pub const LOAD_ERROR_MESSAGE: &str = "Gagal memuat data peta. Silakan muat ulang aplikasi.";

/// Data pipeline state of one view, surfaced in the status bar. Separate
/// from view readiness: the view is interactive from construction on,
/// before (and regardless of whether) data arrives.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DataState {
    Idle,
    Loading,
    Ready { features: usize },
    Failed,
}

/// One map pipeline: viewport, overlay groups, load state and popup.
/// The standard and geographic views are two instances of this struct
/// with different configs; there is no per-view code path.
pub struct MapView {
    pub config: MapConfig,
    pub viewport: Viewport,
    pub layers: LayerSet,
    pub data: DataState,
    pub popup: Option<Popup>,
    rx: Option<Receiver<Result<FeatureCollection>>>,
    index: Option<FeatureIndex>,
    popup_targets: Vec<(FeatureCategory, Popup)>,
}

impl MapView {
    /// Construct a ready view: viewport bound, overlay groups registered
    /// empty so the layer control is stable before any data arrives.
    pub fn new(config: MapConfig, width: usize, height: usize) -> Self {
        let viewport = Viewport::from_config(&config, width, height);
        Self {
            config,
            viewport,
            layers: LayerSet::new(),
            data: DataState::Idle,
            popup: None,
            rx: None,
            index: None,
            popup_targets: Vec::new(),
        }
    }

    /// Kick off the single asynchronous data load for this view
    pub fn start_load(&mut self, path: PathBuf) {
        self.data = DataState::Loading;
        self.rx = Some(data::spawn_load(path));
    }

    /// Pick up the load result if it has arrived. Terminal per pipeline:
    /// exactly one outcome, no retry.
    pub fn poll_data(&mut self, notices: &mut NoticeBoard) {
        let Some(rx) = &self.rx else { return };

        match rx.try_recv() {
            Ok(Ok(collection)) => {
                self.rx = None;
                self.apply_collection(&collection);
            }
            Ok(Err(_)) | Err(TryRecvError::Disconnected) => {
                self.rx = None;
                self.data = DataState::Failed;
                notices.post(LOAD_ERROR_MESSAGE);
            }
            Err(TryRecvError::Empty) => {}
        }
    }

    /// Classify the whole parsed document and route every feature into its
    /// overlay group, then build the popup hit-test index.
    fn apply_collection(&mut self, collection: &FeatureCollection) {
        let classified = classify_collection(collection, self.config.projection);
        let count = classified.len();
        for feature in classified {
            self.layers.route(feature);
        }

        let mut bboxes = Vec::new();
        self.popup_targets.clear();
        for feature in self.layers.popup_features() {
            if let Some(popup) = &feature.popup {
                bboxes.push(feature.shape.bbox());
                self.popup_targets.push((feature.category, popup.clone()));
            }
        }
        self.index = Some(FeatureIndex::build(bboxes, 0.05));
        self.data = DataState::Ready { features: count };
    }

    /// Open the popup of the feature under the given canvas pixel, if any.
    /// Features in a hidden overlay group are not clickable.
    pub fn open_popup_at(&mut self, px: i32, py: i32) {
        let Some(index) = &self.index else { return };

        let (lon, lat) = self.viewport.unproject(px, py);
        // Tolerance of ~4 canvas pixels, expressed in degrees
        let (lon2, _) = self.viewport.unproject(px + 4, py);
        let tolerance = (lon2 - lon).abs();

        for idx in index.query_point(lon, lat, tolerance) {
            let (category, popup) = &self.popup_targets[idx];
            let visible = match category {
                FeatureCategory::SubDistrictBoundary => self.layers.boundaries.visible,
                FeatureCategory::SchoolLocation => self.layers.schools.visible,
                FeatureCategory::Unclassified => false,
            };
            if visible {
                self.popup = Some(popup.clone());
                return;
            }
        }
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }
}

/// Application state: the two view pipelines plus shared UI chrome
pub struct App {
    pub views: [MapView; 2],
    pub active: usize,
    pub notices: NoticeBoard,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
}

impl App {
    pub fn new(width: usize, height: usize) -> Self {
        let (pw, ph) = canvas_pixels(width, height);
        Self {
            views: [
                MapView::new(MapConfig::standard(), pw, ph),
                MapView::new(MapConfig::geographic(), pw, ph),
            ],
            active: 0,
            notices: NoticeBoard::new(),
            should_quit: false,
            last_mouse: None,
        }
    }

    /// Start each view's independent load of the shared document
    pub fn start_loads(&mut self, path: &std::path::Path) {
        for view in &mut self.views {
            view.start_load(path.to_path_buf());
        }
    }

    /// Per-tick bookkeeping: pick up load results, expire notices
    pub fn tick(&mut self) {
        for view in &mut self.views {
            view.poll_data(&mut self.notices);
        }
        self.notices.prune();
    }

    pub fn active_view(&self) -> &MapView {
        &self.views[self.active]
    }

    pub fn active_view_mut(&mut self) -> &mut MapView {
        &mut self.views[self.active]
    }

    /// Switch between the standard and geographic views
    pub fn switch_view(&mut self) {
        self.active = 1 - self.active;
        self.last_mouse = None;
    }

    /// Update viewport sizes when the terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pw, ph) = canvas_pixels(width, height);
        for view in &mut self.views {
            view.viewport.width = pw;
            view.viewport.height = ph;
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.active_view_mut().viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.active_view_mut().viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.active_view_mut().viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.active_view_mut().viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.active_view_mut().viewport.zoom_out_at(px, py);
    }

    /// Left click: hit-test for a feature popup
    pub fn click(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.active_view_mut().open_popup_at(px, py);
    }

    /// Handle mouse drag panning
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when the mouse button is released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Status bar: current zoom level
    pub fn zoom_level(&self) -> String {
        format!("z{:.0}", self.active_view().viewport.zoom)
    }

    /// Status bar: current center coordinates
    pub fn center_coords(&self) -> String {
        let vp = &self.active_view().viewport;
        format!(
            "{:.4}°{}, {:.4}°{}",
            vp.center_lat.abs(),
            if vp.center_lat >= 0.0 { "N" } else { "S" },
            vp.center_lon.abs(),
            if vp.center_lon >= 0.0 { "E" } else { "W" },
        )
    }
}

/// Canvas pixel size for a terminal size: braille gives 2x4 resolution per
/// character, minus the map border (2 cells) and the status bar (1 row)
fn canvas_pixels(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to braille pixel coordinates, accounting for the border
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}
