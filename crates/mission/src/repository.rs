//! Backend contract for persisted missions.
//!
//! A mission has no record of its own: the backend models it implicitly as
//! the set of shapes sharing a `missionName`. The staging subsystem only
//! ever sends shapes; it never reads them back into the stage.

use std::future::Future;
use std::pin::Pin;

use geometry::Shape;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type for repository operations.
#[derive(Debug)]
pub enum RepositoryError {
    /// The named mission has no persisted shapes. Kept distinct from
    /// generic persistence failure.
    NotFound { mission: String },
    /// The backend or the transport failed.
    Persistence {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// A response this client did not anticipate.
    Unexpected { message: String },
}

impl RepositoryError {
    pub fn not_found(mission: impl Into<String>) -> Self {
        Self::NotFound {
            mission: mission.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    pub fn persistence_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { mission } => write!(f, "mission {mission:?} not found"),
            Self::Persistence { message, .. } => write!(f, "{message}"),
            Self::Unexpected { message } => write!(f, "unexpected backend response: {message}"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => source.as_ref().map(|e| e.as_ref() as _),
            _ => None,
        }
    }
}

/// Persistence operations over missions and their shapes.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait MissionRepository: Send + Sync {
    /// Persists one stamped shape and returns the backend's echo.
    ///
    /// Not idempotent: repeating a call with identical content may create
    /// duplicate rows.
    fn create_shape(&self, shape: Shape) -> BoxFuture<'_, Result<Shape, RepositoryError>>;

    /// Every persisted shape across all missions, in persistence order.
    fn list_missions(&self) -> BoxFuture<'_, Result<Vec<Shape>, RepositoryError>>;

    /// Deletes all shapes stamped with `name`, returning the affected-row
    /// count. Zero matches surfaces as [`RepositoryError::NotFound`].
    fn delete_mission<'a>(&'a self, name: &'a str)
        -> BoxFuture<'a, Result<u64, RepositoryError>>;
}

/// Distinct mission names present in `shapes`, in first-seen order.
pub fn mission_names(shapes: &[Shape]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for shape in shapes {
        if let Some(name) = &shape.mission_name {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
    }
    names
}
