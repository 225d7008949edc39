use std::f64::consts::PI;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 100.0;
/// Refits stop well short of max zoom so a lone event keeps some
/// coastline context around it.
const MAX_FIT_ZOOM: f64 = 24.0;
/// Fraction of the canvas a fitted extent may fill.
const FIT_FILL: f64 = 0.8;

/// Viewport representing the visible map area and zoom level
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in); 1.0 spans the full 360
    /// degrees of longitude across the canvas width
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Default view over the East Asia Pacific region
    pub fn region(width: usize, height: usize) -> Self {
        Self::new(120.0, 10.0, 3.0, width, height)
    }

    /// Center and zoom so every point is visible with some margin around
    /// the extent. Falls back to the region default when there are no
    /// points.
    pub fn fit(points: &[(f64, f64)], width: usize, height: usize) -> Self {
        let Some(&(first_lon, first_lat)) = points.first() else {
            return Self::region(width, height);
        };

        let mut min_lon = first_lon;
        let mut max_lon = first_lon;
        let mut min_lat = first_lat;
        let mut max_lat = first_lat;
        for &(lon, lat) in points {
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
            min_lat = min_lat.min(lat.clamp(-85.0, 85.0));
            max_lat = max_lat.max(lat.clamp(-85.0, 85.0));
        }

        // Mercator y grows southward, so the north edge is the smaller y.
        let span_x = (max_lon - min_lon) / 360.0;
        let span_y = mercator_y(min_lat) - mercator_y(max_lat);

        let zoom_x = if span_x > 0.0 {
            FIT_FILL / span_x
        } else {
            f64::INFINITY
        };
        let zoom_y = if span_y > 0.0 {
            FIT_FILL * height as f64 / (span_y * width as f64)
        } else {
            f64::INFINITY
        };
        let zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_FIT_ZOOM);

        Self::new(
            (min_lon + max_lon) / 2.0,
            (min_lat + max_lat) / 2.0,
            zoom,
            width,
            height,
        )
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        // Wrap longitude
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        // Clamp latitude
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        // Web Mercator projection
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);

        // Apply zoom and center offset
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);
        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;

        (px, py)
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

/// Normalized Web Mercator y for a latitude in degrees: 0.0 at the north
/// clip, 0.5 at the equator, 1.0 at the south clip.
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_zoom_stays_clamped() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        for _ in 0..50 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom, MIN_ZOOM);
        for _ in 0..50 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_fit_centers_between_the_points() {
        let vp = Viewport::fit(&[(100.0, 0.0), (140.0, 20.0)], 200, 100);
        assert!((vp.center_lon - 120.0).abs() < 1e-9);
        assert!((vp.center_lat - 10.0).abs() < 1e-9);

        // Both corners of the extent land on the canvas with margin.
        for (lon, lat) in [(100.0, 0.0), (140.0, 20.0)] {
            let (px, py) = vp.project(lon, lat);
            assert!(px >= 0 && px < 200, "px = {px}");
            assert!(py >= 0 && py < 100, "py = {py}");
        }
    }

    #[test]
    fn test_fit_of_single_point_caps_zoom() {
        let vp = Viewport::fit(&[(120.0, 10.0)], 200, 100);
        assert_eq!(vp.zoom, MAX_FIT_ZOOM);
        assert_eq!(vp.project(120.0, 10.0), (100, 50));
    }

    #[test]
    fn test_fit_of_no_points_is_the_region_default() {
        let vp = Viewport::fit(&[], 200, 100);
        assert_eq!(vp, Viewport::region(200, 100));
    }
}
