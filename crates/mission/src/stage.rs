use geometry::Shape;

/// Ordered buffer of shapes drawn since the last submission attempt.
///
/// Append-only between submissions; shapes in the stage are always
/// unstamped (`mission_name == None`). Draining is a single synchronous
/// step, so draw events landing while a submission batch is in flight go
/// to the fresh stage and are never folded into that batch.
#[derive(Debug, Default)]
pub struct ShapeStage {
    shapes: Vec<Shape>,
}

impl ShapeStage {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    pub fn append(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Returns every staged shape in draw order and empties the stage.
    pub fn drain_all(&mut self) -> Vec<Shape> {
        std::mem::take(&mut self.shapes)
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}
