use crate::aggregate::GeoPoint;
use crate::map::canvas::BrailleCanvas;
use crate::map::projection::Viewport;
use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Natural Earth coastline files tried in order; the first one that
/// parses wins.
const COASTLINE_FILES: [&str; 2] = ["ne_110m_coastline.json", "ne_50m_coastline.json"];

/// One rendered frame of the map, one canvas per color layer.
pub struct MapLayers {
    pub coastlines: BrailleCanvas,
    pub events: BrailleCanvas,
}

/// Renders base coastline geometry plus the current event markers.
pub struct MapRenderer {
    coastlines: Vec<LineString>,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines: Vec::new(),
        }
    }

    /// Load coastline GeoJSON from `data_dir`, falling back to a builtin
    /// regional outline when no file is usable.
    pub fn load(data_dir: &Path) -> Self {
        let mut renderer = Self::new();

        for filename in COASTLINE_FILES {
            let path = data_dir.join(filename);
            if !path.exists() {
                continue;
            }
            match load_coastlines(&path) {
                Ok(lines) => {
                    renderer.coastlines = lines;
                    break;
                }
                Err(e) => eprintln!("warning: failed to load {filename}: {e}"),
            }
        }

        if !renderer.has_data() {
            renderer.coastlines = region_outline();
        }
        renderer
    }

    /// Check if any coastline data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines.is_empty()
    }

    /// Render one frame at the given character-cell size.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        events: &[GeoPoint],
    ) -> MapLayers {
        let mut coastlines = BrailleCanvas::new(width, height);
        for line in &self.coastlines {
            draw_linestring(&mut coastlines, line, viewport);
        }

        let mut markers = BrailleCanvas::new(width, height);
        for event in events {
            let (px, py) = viewport.project(event.lon, event.lat);
            if viewport.is_visible(px, py) {
                markers.fill_circle(px, py, marker_radius(event.fatalities));
            }
        }

        MapLayers {
            coastlines,
            events: markers,
        }
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a linestring with viewport culling. Segments spanning more than
/// the canvas width are dropped, which also suppresses antimeridian wrap
/// artifacts.
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                canvas.line(prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

/// Marker radius grows one pixel per decade of fatalities, capped so a
/// single heavy event cannot flood a small canvas.
fn marker_radius(fatalities: i64) -> i32 {
    let mut radius = 1;
    let mut left = fatalities;
    while left >= 10 && radius < 5 {
        radius += 1;
        left /= 10;
    }
    radius
}

fn load_coastlines(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();
    collect_lines(&geojson, &mut lines);
    Ok(lines)
}

/// Walk a GeoJSON document and collect every line feature.
fn collect_lines(geojson: &GeoJson, lines: &mut Vec<LineString>) {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    collect_geometry(geometry, lines);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(ref geometry) = feature.geometry {
                collect_geometry(geometry, lines);
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry(geometry, lines),
    }
}

fn collect_geometry(geometry: &Geometry, lines: &mut Vec<LineString>) {
    match &geometry.value {
        Value::LineString(coords) => lines.push(to_line(coords)),
        Value::MultiLineString(parts) => {
            for coords in parts {
                lines.push(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                lines.push(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    lines.push(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry(g, lines);
            }
        }
        _ => {}
    }
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords.iter().map(|c| (c[0], c[1])).collect()
}

/// Simplified East Asia Pacific outlines, used when no coastline file is
/// available.
fn region_outline() -> Vec<LineString> {
    vec![
        // Mainland coast, Bay of Bengal up to the Sea of Okhotsk
        vec![
            (88.0, 22.0), (92.0, 22.0), (95.0, 16.0), (100.0, 14.0),
            (105.0, 10.0), (110.0, 20.0), (115.0, 22.0), (120.0, 22.0),
            (122.0, 25.0), (125.0, 30.0), (130.0, 35.0), (135.0, 35.0),
            (140.0, 40.0), (145.0, 45.0), (145.0, 50.0), (140.0, 55.0),
        ],
        // Malay peninsula
        vec![
            (98.5, 10.0), (100.0, 8.0), (102.0, 4.0), (104.0, 1.5),
        ],
        // Sumatra
        vec![
            (95.5, 5.5), (98.0, 2.0), (100.0, 0.0), (104.0, -3.0),
            (106.0, -6.0), (102.0, -4.5), (98.0, -1.0), (95.5, 5.5),
        ],
        // Java
        vec![
            (105.5, -6.0), (110.0, -6.5), (114.0, -7.5), (116.0, -8.5),
            (112.0, -8.3), (107.0, -7.5), (105.5, -6.0),
        ],
        // Borneo
        vec![
            (109.0, 1.5), (110.5, -1.0), (114.0, -3.5), (117.0, -3.5),
            (119.0, 1.0), (117.5, 4.5), (115.0, 5.5), (111.0, 2.5),
            (109.0, 1.5),
        ],
        // Sulawesi
        vec![
            (119.0, -5.5), (120.5, -2.0), (123.5, 0.5), (125.0, 1.5),
            (122.0, 0.5), (121.0, -2.5), (122.5, -4.0), (120.5, -5.5),
            (119.0, -5.5),
        ],
        // Luzon
        vec![
            (120.0, 18.5), (122.0, 18.0), (124.0, 13.0), (121.0, 13.5),
            (120.0, 16.0), (120.0, 18.5),
        ],
        // Mindanao
        vec![
            (122.0, 8.0), (124.0, 9.0), (126.5, 7.0), (125.5, 5.5),
            (122.5, 6.5), (122.0, 8.0),
        ],
        // New Guinea
        vec![
            (131.0, -1.0), (135.0, -3.0), (140.0, -8.0), (147.0, -10.0),
            (150.0, -10.5), (147.0, -6.0), (141.0, -2.5), (134.0, -0.5),
            (131.0, -1.0),
        ],
        // Japan
        vec![
            (130.0, 31.0), (132.0, 33.5), (135.0, 34.5), (137.0, 35.0),
            (140.0, 35.5), (141.0, 38.0), (140.5, 41.5), (143.0, 42.5),
            (145.0, 43.5), (142.0, 45.0), (140.0, 42.0),
        ],
        // Australia
        vec![
            (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
            (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
            (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
            (125.0, -32.0), (115.0, -35.0), (115.0, -25.0), (115.0, -20.0),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo_point(lon: f64, lat: f64, fatalities: i64) -> GeoPoint {
        GeoPoint {
            year: 2020,
            country: "Myanmar".to_string(),
            lat,
            lon,
            fatalities,
            event_type: "Battles".to_string(),
            actor1: "Actor A".to_string(),
        }
    }

    #[test]
    fn test_missing_data_dir_falls_back_to_builtin_outline() {
        let renderer = MapRenderer::load(Path::new("/no/such/dir"));
        assert!(renderer.has_data());
    }

    #[test]
    fn test_events_draw_markers() {
        let renderer = MapRenderer::new();
        let viewport = Viewport::new(120.0, 10.0, 4.0, 20, 20);
        let layers = renderer.render(10, 5, &viewport, &[geo_point(120.0, 10.0, 1)]);
        assert!(layers.coastlines.is_blank());
        assert!(!layers.events.is_blank());
    }

    #[test]
    fn test_offscreen_events_are_culled() {
        let renderer = MapRenderer::new();
        let viewport = Viewport::new(120.0, 10.0, 8.0, 20, 20);
        let layers = renderer.render(10, 5, &viewport, &[geo_point(-70.0, -30.0, 5)]);
        assert!(layers.events.is_blank());
    }

    #[test]
    fn test_antimeridian_jump_segments_are_dropped() {
        let mut renderer = MapRenderer::new();
        renderer.coastlines = vec![vec![(179.0, 0.0), (-179.0, 0.0)]];
        let viewport = Viewport::new(0.0, 0.0, 4.0, 20, 20);
        let layers = renderer.render(10, 5, &viewport, &[]);
        assert!(layers.coastlines.is_blank());
    }

    #[test]
    fn test_marker_radius_scales_by_decade() {
        assert_eq!(marker_radius(0), 1);
        assert_eq!(marker_radius(9), 1);
        assert_eq!(marker_radius(10), 2);
        assert_eq!(marker_radius(100), 3);
        assert_eq!(marker_radius(1_000_000), 5); // capped
    }
}
