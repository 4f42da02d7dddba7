//! Mission submission: stamp every staged shape with a name and commit the
//! batch shape-by-shape.
//!
//! The persistence loop is deliberately sequential. A later retrieval by
//! mission name should reflect draw order for consumers that rely on
//! sequence (a waypoint path, for instance), so each shape's request is
//! awaited before the next is issued. The loop aborts on the first failure;
//! shapes committed before it stay persisted. There is no rollback, no
//! retry, and no timeout in this subsystem.

use geometry::Shape;
use tracing::{info, warn};

use crate::repository::{MissionRepository, RepositoryError};
use crate::stage::ShapeStage;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub mission_name: String,
    /// The stamped shapes that reached the backend, in draw order.
    pub shapes: Vec<Shape>,
}

impl SubmissionReceipt {
    pub fn count(&self) -> usize {
        self.shapes.len()
    }
}

/// Submission failures.
#[derive(Debug)]
pub enum SubmitError {
    /// Blank or whitespace-only mission name. The stage is left intact and
    /// no persistence call is made.
    InvalidName,
    /// The `index`-th shape (0-based, draw order) failed to persist. Shapes
    /// before it are durably stored; shapes after it were never sent. The
    /// stage is empty either way.
    Persistence {
        index: usize,
        source: RepositoryError,
    },
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "mission name must not be blank"),
            Self::Persistence { index, source } => {
                write!(f, "shape {index} failed to persist: {source}")
            }
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            Self::InvalidName => None,
        }
    }
}

/// Drives the per-shape persistence protocol for a batch of staged shapes.
///
/// Also keeps the operator-visible mission list, which gains the name of
/// every attempted (non-rejected) submission whether or not the whole batch
/// reached the backend.
#[derive(Debug)]
pub struct MissionSubmissionService<R> {
    repository: R,
    missions: Vec<String>,
}

impl<R: MissionRepository> MissionSubmissionService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            missions: Vec::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Mission names registered this session, in submission order.
    pub fn missions(&self) -> &[String] {
        &self.missions
    }

    /// Commits every currently staged shape under `name`.
    ///
    /// A name that trims to empty fails with [`SubmitError::InvalidName`]
    /// before anything else happens. Otherwise the stage is drained before
    /// the first await, so draw events arriving mid-submission accumulate in
    /// the fresh stage and are not part of this batch. An empty batch
    /// submits nothing and still succeeds.
    pub async fn submit(
        &mut self,
        stage: &mut ShapeStage,
        name: &str,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubmitError::InvalidName);
        }

        let staged = stage.drain_all();
        // Registered before the persistence loop: the mission list view
        // gains the name even when part of the batch fails to persist.
        self.missions.push(name.to_string());

        let mut submitted = Vec::with_capacity(staged.len());
        for (index, shape) in staged.into_iter().enumerate() {
            let stamped = shape.with_mission(name);
            match self.repository.create_shape(stamped.clone()).await {
                Ok(_echo) => submitted.push(stamped),
                Err(source) => {
                    warn!(
                        mission = name,
                        index,
                        committed = submitted.len(),
                        "submission aborted: {source}"
                    );
                    return Err(SubmitError::Persistence { index, source });
                }
            }
        }

        info!(mission = name, count = submitted.len(), "mission submitted");
        Ok(SubmissionReceipt {
            mission_name: name.to_string(),
            shapes: submitted,
        })
    }
}
