//! reqwest-backed client for the mission backend's `/api/shapes` routes.

use geometry::Shape;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::repository::{BoxFuture, MissionRepository, RepositoryError};

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    deleted: u64,
}

/// HTTP implementation of [`MissionRepository`].
#[derive(Debug, Clone)]
pub struct HttpMissionRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMissionRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    fn shapes_url(&self) -> String {
        format!("{}/api/shapes", self.base_url)
    }

    /// Builds the per-mission URL with the name as one encoded path segment,
    /// so names containing `/`, `#` or `?` cannot change the request target.
    fn mission_url(&self, name: &str) -> Result<reqwest::Url, RepositoryError> {
        let mut url = reqwest::Url::parse(&self.shapes_url())
            .map_err(|e| RepositoryError::unexpected(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| RepositoryError::unexpected("base url cannot carry paths"))?
            .push(name);
        Ok(url)
    }
}

impl MissionRepository for HttpMissionRepository {
    fn create_shape(&self, shape: Shape) -> BoxFuture<'_, Result<Shape, RepositoryError>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.shapes_url())
                .json(&shape)
                .send()
                .await
                .map_err(|e| {
                    RepositoryError::persistence_with_source("shape create request failed", e)
                })?;

            match resp.status() {
                StatusCode::CREATED => resp.json::<Shape>().await.map_err(|e| {
                    RepositoryError::unexpected(format!("invalid create response: {e}"))
                }),
                status if status.is_server_error() => Err(RepositoryError::persistence(
                    format!("backend failed to save shape: {status}"),
                )),
                status => Err(RepositoryError::unexpected(format!(
                    "create returned {status}"
                ))),
            }
        })
    }

    fn list_missions(&self) -> BoxFuture<'_, Result<Vec<Shape>, RepositoryError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.shapes_url())
                .send()
                .await
                .map_err(|e| {
                    RepositoryError::persistence_with_source("shape list request failed", e)
                })?;

            match resp.status() {
                StatusCode::OK => resp.json::<Vec<Shape>>().await.map_err(|e| {
                    RepositoryError::unexpected(format!("invalid list response: {e}"))
                }),
                status if status.is_server_error() => Err(RepositoryError::persistence(
                    format!("backend failed to list shapes: {status}"),
                )),
                status => Err(RepositoryError::unexpected(format!(
                    "list returned {status}"
                ))),
            }
        })
    }

    fn delete_mission<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Result<u64, RepositoryError>> {
        Box::pin(async move {
            let url = self.mission_url(name)?;
            let resp = self
                .client
                .delete(url)
                .send()
                .await
                .map_err(|e| {
                    RepositoryError::persistence_with_source("mission delete request failed", e)
                })?;

            match resp.status() {
                StatusCode::OK => resp
                    .json::<DeleteResponse>()
                    .await
                    .map(|r| r.deleted)
                    .map_err(|e| {
                        RepositoryError::unexpected(format!("invalid delete response: {e}"))
                    }),
                StatusCode::NOT_FOUND => Err(RepositoryError::not_found(name)),
                status if status.is_server_error() => Err(RepositoryError::persistence(
                    format!("backend failed to delete mission: {status}"),
                )),
                status => Err(RepositoryError::unexpected(format!(
                    "delete returned {status}"
                ))),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use geometry::{Geometry, LatLng, Shape};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::HttpMissionRepository;
    use crate::repository::{MissionRepository, RepositoryError};

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let repo = HttpMissionRepository::new("http://localhost:3000/");
        assert_eq!(repo.shapes_url(), "http://localhost:3000/api/shapes");
        assert_eq!(
            repo.mission_url("Alpha").unwrap().as_str(),
            "http://localhost:3000/api/shapes/Alpha"
        );
    }

    #[test]
    fn encodes_the_mission_name_as_one_path_segment() {
        let repo = HttpMissionRepository::new("http://localhost:3000");
        assert_eq!(
            repo.mission_url("Alpha/Bravo #2").unwrap().as_str(),
            "http://localhost:3000/api/shapes/Alpha%2FBravo%20%232"
        );
    }

    /// Serves exactly one connection with a canned response, then exits.
    async fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn stamped_marker() -> Shape {
        Shape::staged(Geometry::marker(LatLng::new(1.0, 2.0))).with_mission("Alpha")
    }

    #[tokio::test]
    async fn create_201_returns_the_echoed_shape() {
        let base = one_shot_server(
            "201 Created",
            r#"{"missionName":"Alpha","type":"marker","coordinates":[1.0,2.0]}"#,
        )
        .await;
        let repo = HttpMissionRepository::new(base);

        let echo = repo.create_shape(stamped_marker()).await.unwrap();
        assert_eq!(echo, stamped_marker());
    }

    #[tokio::test]
    async fn create_500_maps_to_persistence() {
        let base = one_shot_server("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let repo = HttpMissionRepository::new(base);

        let err = repo.create_shape(stamped_marker()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Persistence { .. }));
    }

    #[tokio::test]
    async fn delete_404_maps_to_not_found() {
        let base = one_shot_server("404 Not Found", r#"{"error":"Mission not found"}"#).await;
        let repo = HttpMissionRepository::new(base);

        let err = repo.delete_mission("Ghost").await.unwrap_err();
        match err {
            RepositoryError::NotFound { mission } => assert_eq!(mission, "Ghost"),
            other => panic!("expected not-found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_200_returns_the_affected_count() {
        let base = one_shot_server("200 OK", r#"{"deleted":2}"#).await;
        let repo = HttpMissionRepository::new(base);

        assert_eq!(repo.delete_mission("Alpha").await.unwrap(), 2);
    }
}
