use crate::data::{CleanReport, Dataset};
use crate::map::{MapRenderer, Viewport};
use crate::report::{self, RenderModel, Selection};

/// Application state: the immutable dataset, the current selection, and
/// the render model derived from them. Every interaction that changes the
/// selection rebuilds the whole model.
pub struct App {
    pub dataset: Dataset,
    pub clean_report: CleanReport,
    pub base_map: MapRenderer,
    pub selection: Selection,
    pub model: RenderModel,
    pub viewport: Viewport,
    /// First visible row of the raw-data table.
    pub table_scroll: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        dataset: Dataset,
        clean_report: CleanReport,
        base_map: MapRenderer,
        width: usize,
        height: usize,
    ) -> Self {
        let model = report::recompute(&dataset, &clean_report, &Selection::default());
        let selection = Selection {
            country: model.map.country.clone(),
            year: model.map.year,
            show_table: false,
        };
        let (px_width, px_height) = map_panel_pixels(width, height);
        let viewport = Viewport::fit(&marker_positions(&model), px_width, px_height);

        Self {
            dataset,
            clean_report,
            base_map,
            selection,
            model,
            viewport,
            table_scroll: 0,
            should_quit: false,
        }
    }

    /// Recompute the render model for the current selection and keep the
    /// selector cursors on whatever it resolved to.
    fn rebuild(&mut self) {
        self.model = report::recompute(&self.dataset, &self.clean_report, &self.selection);
        self.selection.country = self.model.map.country.clone();
        self.selection.year = self.model.map.year;
    }

    /// Step the country selector by `delta`, wrapping at either end.
    pub fn step_country(&mut self, delta: i32) {
        let next = step(&self.model.map.countries, self.selection.country.as_ref(), delta).cloned();
        if let Some(country) = next {
            self.selection.country = Some(country);
            self.rebuild();
            self.refit();
        }
    }

    /// Step the year selector by `delta`, wrapping at either end.
    pub fn step_year(&mut self, delta: i32) {
        let next = step(&self.model.map.years, self.selection.year.as_ref(), delta).copied();
        if let Some(year) = next {
            self.selection.year = Some(year);
            self.rebuild();
            self.refit();
        }
    }

    /// Show or hide the raw-data table.
    pub fn toggle_table(&mut self) {
        self.selection.show_table = !self.selection.show_table;
        self.table_scroll = 0;
        self.rebuild();
    }

    /// Scroll the raw-data table by `delta` rows, clamped to its extent.
    pub fn scroll_table(&mut self, delta: i32) {
        let rows = self.model.table.as_ref().map_or(0, |t| t.rows.len());
        let next = self.table_scroll as i64 + i64::from(delta);
        self.table_scroll = next.clamp(0, rows.saturating_sub(1) as i64) as usize;
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    /// Zoom in
    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    /// Zoom out
    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Refit the map view to the currently filtered events.
    pub fn refit(&mut self) {
        self.viewport = Viewport::fit(
            &marker_positions(&self.model),
            self.viewport.width,
            self.viewport.height,
        );
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (px_width, px_height) = map_panel_pixels(width, height);
        self.viewport.width = px_width;
        self.viewport.height = px_height;
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }
}

fn marker_positions(model: &RenderModel) -> Vec<(f64, f64)> {
    model.map.points.iter().map(|p| (p.lon, p.lat)).collect()
}

/// The option `delta` steps away from `current`, wrapping at either end.
fn step<'a, T: PartialEq>(options: &'a [T], current: Option<&T>, delta: i32) -> Option<&'a T> {
    if options.is_empty() {
        return None;
    }
    let len = options.len() as i32;
    let at = current
        .and_then(|value| options.iter().position(|option| option == value))
        .unwrap_or(0) as i32;
    options.get((at + delta).rem_euclid(len) as usize)
}

/// Rough braille pixel size of the map panel for a terminal size. The UI
/// gives the map about half the width and the bottom rows; it overrides
/// the viewport with the exact panel rect at draw time.
fn map_panel_pixels(width: usize, height: usize) -> (usize, usize) {
    let inner_width = (width / 2).saturating_sub(2);
    let inner_height = height.min(14).saturating_sub(2);
    (inner_width * 2, inner_height * 4)
}
