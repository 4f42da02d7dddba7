//! Normalization of drawing-surface events into canonical shapes.
//!
//! The drawing surface reports a finished shape as a `layerType` tag plus
//! its native geometry handle. Capture turns recognized events into `Shape`
//! records, appends them to the stage, and hands the native layer back to
//! the map overlay so drawn geometry stays visible regardless of what later
//! happens to the batch.

use geometry::{Geometry, LatLng, Shape, ShapeKind};
use serde::{Deserialize, Serialize};

use crate::stage::ShapeStage;

/// The drawing surface's native geometry handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrawnLayer {
    /// Circle handle: center plus radius in meters.
    Circle { center: LatLng, radius: f64 },
    /// Vertex path handle, used for both polygons and polylines.
    Path { vertices: Vec<LatLng> },
    /// Point handle.
    Point { position: LatLng },
}

/// A draw-completion event as emitted by the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawEvent {
    pub layer_type: String,
    #[serde(flatten)]
    pub layer: DrawnLayer,
}

/// Capability exposed back to the map: keep a drawn layer rendered.
///
/// Styling is the map's concern; capture only forwards the handle.
pub trait OverlaySink {
    fn add_layer(&mut self, layer: &DrawnLayer);
}

/// Overlay sink that discards layers, for headless use.
#[derive(Debug, Default)]
pub struct NullOverlay;

impl OverlaySink for NullOverlay {
    fn add_layer(&mut self, _layer: &DrawnLayer) {}
}

/// Converts draw-completion events into staged shapes.
#[derive(Debug)]
pub struct GeometryCapture<O: OverlaySink> {
    overlay: O,
}

impl<O: OverlaySink> GeometryCapture<O> {
    pub fn new(overlay: O) -> Self {
        Self { overlay }
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// Handles one finished-drawing event.
    ///
    /// Recognized events append one unstamped shape to `stage` and reach the
    /// overlay; events with an unrecognized `layerType` are dropped without
    /// producing anything. Returns `true` if a shape was staged.
    ///
    /// Never blocks on mission-name availability: the name is stamped at
    /// submission time.
    pub fn on_draw_complete(&mut self, stage: &mut ShapeStage, event: DrawEvent) -> bool {
        let Some(geometry) = normalize(&event) else {
            return false;
        };
        self.overlay.add_layer(&event.layer);
        stage.append(Shape::staged(geometry));
        true
    }
}

fn normalize(event: &DrawEvent) -> Option<Geometry> {
    let kind = ShapeKind::from_layer_type(&event.layer_type)?;
    match (kind, &event.layer) {
        (ShapeKind::Polygon, DrawnLayer::Path { vertices }) => {
            Geometry::polygon(vertices.clone()).ok()
        }
        (ShapeKind::Polyline, DrawnLayer::Path { vertices }) => {
            Geometry::polyline(vertices.clone()).ok()
        }
        (ShapeKind::Circle, DrawnLayer::Circle { center, radius }) => {
            Geometry::circle(*center, *radius).ok()
        }
        (ShapeKind::Marker, DrawnLayer::Point { position }) => {
            Some(Geometry::marker(*position))
        }
        // Tag and native handle disagree; treat like an unrecognized event.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingOverlay {
        layers: Vec<DrawnLayer>,
    }

    impl OverlaySink for RecordingOverlay {
        fn add_layer(&mut self, layer: &DrawnLayer) {
            self.layers.push(layer.clone());
        }
    }

    fn path_event(layer_type: &str, n: usize) -> DrawEvent {
        DrawEvent {
            layer_type: layer_type.to_string(),
            layer: DrawnLayer::Path {
                vertices: (0..n).map(|i| LatLng::new(i as f64, 0.0)).collect(),
            },
        }
    }

    #[test]
    fn stages_recognized_kinds_in_order() {
        let mut stage = ShapeStage::new();
        let mut capture = GeometryCapture::new(RecordingOverlay::default());

        assert!(capture.on_draw_complete(&mut stage, path_event("polygon", 3)));
        assert!(capture.on_draw_complete(&mut stage, path_event("polyline", 2)));
        assert!(capture.on_draw_complete(
            &mut stage,
            DrawEvent {
                layer_type: "circle".to_string(),
                layer: DrawnLayer::Circle {
                    center: LatLng::new(1.0, 2.0),
                    radius: 100.0,
                },
            },
        ));
        assert!(capture.on_draw_complete(
            &mut stage,
            DrawEvent {
                layer_type: "marker".to_string(),
                layer: DrawnLayer::Point {
                    position: LatLng::new(3.0, 4.0),
                },
            },
        ));

        let kinds: Vec<_> = stage.shapes().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ShapeKind::Polygon,
                ShapeKind::Polyline,
                ShapeKind::Circle,
                ShapeKind::Marker,
            ]
        );
        assert!(stage.shapes().iter().all(|s| s.is_staged()));
        assert_eq!(capture.overlay().layers.len(), 4);
    }

    #[test]
    fn drops_unrecognized_layer_type_silently() {
        let mut stage = ShapeStage::new();
        let mut capture = GeometryCapture::new(RecordingOverlay::default());

        assert!(!capture.on_draw_complete(&mut stage, path_event("rectangle", 4)));
        assert!(stage.is_empty());
        assert!(capture.overlay().layers.is_empty());
    }

    #[test]
    fn drops_event_whose_handle_contradicts_its_tag() {
        let mut stage = ShapeStage::new();
        let mut capture = GeometryCapture::new(RecordingOverlay::default());

        let event = DrawEvent {
            layer_type: "circle".to_string(),
            layer: DrawnLayer::Point {
                position: LatLng::new(0.0, 0.0),
            },
        };
        assert!(!capture.on_draw_complete(&mut stage, event));
        assert!(stage.is_empty());
    }

    #[test]
    fn drops_degenerate_geometry() {
        let mut stage = ShapeStage::new();
        let mut capture = GeometryCapture::new(RecordingOverlay::default());

        assert!(!capture.on_draw_complete(&mut stage, path_event("polygon", 2)));
        assert!(stage.is_empty());
    }

    #[test]
    fn draw_event_deserializes_from_surface_json() {
        let event: DrawEvent = serde_json::from_value(serde_json::json!({
            "layerType": "circle",
            "center": [-7.77, 110.37],
            "radius": 150.0,
        }))
        .unwrap();
        assert_eq!(event.layer_type, "circle");
        assert!(matches!(event.layer, DrawnLayer::Circle { radius, .. } if radius == 150.0));
    }
}
