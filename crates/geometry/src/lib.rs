pub mod latlng;
pub mod shape;

// Geometry crate: the canonical shape model and its wire format only.
pub use latlng::*;
pub use shape::*;
