//! Projection of geographic positions onto the drawing surface.

use crate::model::TrafficModel;
use serde::{Deserialize, Serialize};
use skymap_domain::{CanvasSize, CoordinateRange, FlightId, PixelPoint};

/// Smallest zoom factor a viewport accepts
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom factor a viewport accepts
pub const MAX_ZOOM: f64 = 2.0;

/// Map a longitude/latitude pair into canvas pixels.
///
/// Longitude grows to the right, latitude grows upwards (north is the top of
/// the canvas). An axis whose span is zero maps every point to ratio 0, so
/// `x = 0` and `y = height` on that axis.
#[must_use]
pub fn normalize(range: &CoordinateRange, canvas: CanvasSize, longitude: f64, latitude: f64) -> PixelPoint {
    let x = ratio(longitude - range.min_lon, range.lon_span()) * canvas.width;
    let y = canvas.height - ratio(latitude - range.min_lat, range.lat_span()) * canvas.height;
    PixelPoint::new(x, y)
}

fn ratio(offset: f64, span: f64) -> f64 {
    if span == 0.0 {
        return 0.0;
    }
    let r = offset / span;
    if r.is_finite() { r } else { 0.0 }
}

/// Pan and zoom applied on top of the normalized canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Canvas point shown at the top-left corner of the screen
    pub offset: PixelPoint,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(offset: PixelPoint, zoom: f64) -> Self {
        Self {
            offset,
            zoom: if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 },
        }
    }

    /// Canvas point to screen point.
    #[must_use]
    pub fn to_screen(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(
            (point.x - self.offset.x) * self.zoom,
            (point.y - self.offset.y) * self.zoom,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(PixelPoint::default(), 1.0)
    }
}

/// Screen placement of an airport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportMarker {
    pub code: String,
    pub point: PixelPoint,
}

/// Screen placement of a flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightMarker {
    pub id: FlightId,
    pub point: PixelPoint,
    pub heading: f64,
}

/// Everything a view needs to draw one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneLayout {
    pub airports: Vec<AirportMarker>,
    pub flights: Vec<FlightMarker>,
}

/// Project every airport and flight of a snapshot.
///
/// The coordinate range is the bounding box of the airport set, so flights
/// always land inside the canvas while flying between airports.
pub fn project_model(model: &TrafficModel, viewport: &Viewport) -> SceneLayout {
    let Some(range) = model.coordinate_range() else {
        return SceneLayout::default();
    };
    let canvas = model.canvas;
    let place = |lon: f64, lat: f64| viewport.to_screen(normalize(&range, canvas, lon, lat));

    SceneLayout {
        airports: model
            .airports
            .iter()
            .map(|a| AirportMarker {
                code: a.code.clone(),
                point: place(a.position.longitude, a.position.latitude),
            })
            .collect(),
        flights: model
            .flights
            .iter()
            .map(|f| FlightMarker {
                id: f.id.clone(),
                point: place(f.position.longitude, f.position.latitude),
                heading: f.heading,
            })
            .collect(),
    }
}
