//! Canonical shape model for drawn map annotations.
//!
//! The wire format matches what the drawing frontend emits:
//! `{missionName, type, coordinates?|center?, radius?}` with a lowercase
//! `type` discriminator and only the fields that kind requires. Markers carry
//! a single flat `[lat, lng]` pair under `coordinates`; polygons and
//! polylines carry an array of pairs.

use serde::{Deserialize, Serialize};

use crate::latlng::LatLng;

/// Discriminator for the four geometry kinds the drawing surface produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Polygon,
    Polyline,
    Circle,
    Marker,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
            Self::Circle => "circle",
            Self::Marker => "marker",
        }
    }

    /// Maps a drawing-surface `layerType` tag to a kind.
    ///
    /// Returns `None` for tags this system does not recognize.
    pub fn from_layer_type(layer_type: &str) -> Option<Self> {
        match layer_type {
            "polygon" => Some(Self::Polygon),
            "polyline" => Some(Self::Polyline),
            "circle" => Some(Self::Circle),
            "marker" => Some(Self::Marker),
            _ => None,
        }
    }
}

/// Geometry invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    TooFewVertices {
        kind: ShapeKind,
        got: usize,
        min: usize,
    },
    NonPositiveRadius,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewVertices { kind, got, min } => {
                write!(f, "{} needs at least {min} vertices, got {got}", kind.as_str())
            }
            Self::NonPositiveRadius => write!(f, "circle radius must be positive"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// The closed sum of drawable geometry.
///
/// Kept as one enum rather than four record types so a staged sequence stays
/// homogeneous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    /// Ordered ring of vertices; first and last are not required to coincide.
    Polygon { coordinates: Vec<LatLng> },
    /// Ordered path of vertices.
    Polyline { coordinates: Vec<LatLng> },
    /// Center plus radius in meters.
    Circle { center: LatLng, radius: f64 },
    /// A single position.
    Marker { coordinates: LatLng },
}

impl Geometry {
    pub fn polygon(coordinates: Vec<LatLng>) -> Result<Self, GeometryError> {
        let g = Self::Polygon { coordinates };
        g.validate()?;
        Ok(g)
    }

    pub fn polyline(coordinates: Vec<LatLng>) -> Result<Self, GeometryError> {
        let g = Self::Polyline { coordinates };
        g.validate()?;
        Ok(g)
    }

    pub fn circle(center: LatLng, radius: f64) -> Result<Self, GeometryError> {
        let g = Self::Circle { center, radius };
        g.validate()?;
        Ok(g)
    }

    pub fn marker(position: LatLng) -> Self {
        Self::Marker {
            coordinates: position,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Polygon { .. } => ShapeKind::Polygon,
            Self::Polyline { .. } => ShapeKind::Polyline,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Marker { .. } => ShapeKind::Marker,
        }
    }

    /// Checks the per-kind invariants.
    ///
    /// Deserialized geometry is structurally sound but may still violate
    /// these, so the backend revalidates on ingest.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Self::Polygon { coordinates } if coordinates.len() < 3 => {
                Err(GeometryError::TooFewVertices {
                    kind: ShapeKind::Polygon,
                    got: coordinates.len(),
                    min: 3,
                })
            }
            Self::Polyline { coordinates } if coordinates.len() < 2 => {
                Err(GeometryError::TooFewVertices {
                    kind: ShapeKind::Polyline,
                    got: coordinates.len(),
                    min: 2,
                })
            }
            // Written as a negated comparison so NaN fails too.
            Self::Circle { radius, .. } if !(*radius > 0.0) => {
                Err(GeometryError::NonPositiveRadius)
            }
            _ => Ok(()),
        }
    }
}

/// One drawn annotation: geometry plus the mission it was committed under.
///
/// `mission_name` is `None` while the shape sits in the stage; the submission
/// service stamps it, never capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "missionName", default)]
    pub mission_name: Option<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Shape {
    pub fn staged(geometry: Geometry) -> Self {
        Self {
            mission_name: None,
            geometry,
        }
    }

    pub fn with_mission(mut self, name: impl Into<String>) -> Self {
        self.mission_name = Some(name.into());
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn is_staged(&self) -> bool {
        self.mission_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng)
    }

    #[test]
    fn polygon_wire_format() {
        let shape = Shape::staged(
            Geometry::polygon(vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)]).unwrap(),
        )
        .with_mission("Alpha");

        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(
            value,
            json!({
                "missionName": "Alpha",
                "type": "polygon",
                "coordinates": [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            })
        );
    }

    #[test]
    fn marker_carries_a_flat_pair() {
        let shape = Shape::staged(Geometry::marker(p(-7.77, 110.37)));
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(
            value,
            json!({
                "missionName": null,
                "type": "marker",
                "coordinates": [-7.77, 110.37],
            })
        );
    }

    #[test]
    fn circle_round_trips() {
        let shape = Shape::staged(Geometry::circle(p(1.0, 2.0), 250.0).unwrap())
            .with_mission("Bravo");
        let text = serde_json::to_string(&shape).unwrap();
        let back: Shape = serde_json::from_str(&text).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn deserializes_without_mission_name() {
        let shape: Shape =
            serde_json::from_value(json!({ "type": "marker", "coordinates": [1.0, 2.0] }))
                .unwrap();
        assert!(shape.is_staged());
        assert_eq!(shape.kind(), ShapeKind::Marker);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        assert!(matches!(
            Geometry::polygon(vec![p(0.0, 0.0), p(1.0, 1.0)]),
            Err(GeometryError::TooFewVertices { min: 3, got: 2, .. })
        ));
        assert!(matches!(
            Geometry::polyline(vec![p(0.0, 0.0)]),
            Err(GeometryError::TooFewVertices { min: 2, got: 1, .. })
        ));
        assert_eq!(
            Geometry::circle(p(0.0, 0.0), 0.0),
            Err(GeometryError::NonPositiveRadius)
        );
        assert_eq!(
            Geometry::circle(p(0.0, 0.0), -5.0),
            Err(GeometryError::NonPositiveRadius)
        );
        assert_eq!(
            Geometry::circle(p(0.0, 0.0), f64::NAN),
            Err(GeometryError::NonPositiveRadius)
        );
    }

    #[test]
    fn unknown_type_tag_fails_to_deserialize() {
        let result: Result<Shape, _> = serde_json::from_value(json!({
            "type": "rectangle",
            "coordinates": [[0.0, 0.0], [1.0, 1.0]],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn layer_type_mapping() {
        assert_eq!(ShapeKind::from_layer_type("polygon"), Some(ShapeKind::Polygon));
        assert_eq!(ShapeKind::from_layer_type("marker"), Some(ShapeKind::Marker));
        assert_eq!(ShapeKind::from_layer_type("rectangle"), None);
        assert_eq!(ShapeKind::from_layer_type(""), None);
    }
}
