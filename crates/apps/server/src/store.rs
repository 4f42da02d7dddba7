//! File-backed shape store.
//!
//! Shapes live in one JSON document on disk; a mission is nothing more than
//! the set of rows sharing a `missionName`. Access is serialized through an
//! async mutex and saves go through a temp file plus rename so a crashed
//! write never leaves a torn store behind.

use std::path::PathBuf;

use geometry::Shape;
use tokio::sync::Mutex;

pub struct ShapeStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ShapeStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn load_unlocked(&self) -> Result<Vec<Shape>, String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => {
                let shapes: Vec<Shape> = serde_json::from_str(&s).map_err(|e| e.to_string())?;
                Ok(shapes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn save_unlocked(&self, shapes: &[Shape]) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(shapes).map_err(|e| e.to_string())?;
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| e.to_string())?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Appends one shape and returns it as stored.
    ///
    /// No dedup: identical submissions create duplicate rows.
    pub async fn insert(&self, shape: Shape) -> Result<Shape, String> {
        let _g = self.lock.lock().await;
        let mut shapes = self.load_unlocked().await?;
        shapes.push(shape.clone());
        self.save_unlocked(&shapes).await?;
        Ok(shape)
    }

    /// Every stored shape, in persistence order.
    pub async fn all(&self) -> Result<Vec<Shape>, String> {
        let _g = self.lock.lock().await;
        self.load_unlocked().await
    }

    /// Shapes stamped with `name`, in persistence order.
    pub async fn for_mission(&self, name: &str) -> Result<Vec<Shape>, String> {
        let _g = self.lock.lock().await;
        let shapes = self.load_unlocked().await?;
        Ok(shapes
            .into_iter()
            .filter(|s| s.mission_name.as_deref() == Some(name))
            .collect())
    }

    /// Removes every shape stamped with `name`, returning how many went.
    pub async fn delete_mission(&self, name: &str) -> Result<u64, String> {
        let _g = self.lock.lock().await;
        let mut shapes = self.load_unlocked().await?;
        let before = shapes.len();
        shapes.retain(|s| s.mission_name.as_deref() != Some(name));
        let removed = (before - shapes.len()) as u64;
        if removed > 0 {
            self.save_unlocked(&shapes).await?;
        }
        Ok(removed)
    }
}
