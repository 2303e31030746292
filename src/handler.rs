use std::path::{Component, Path, PathBuf};

use crate::req::{Method, Request};
use crate::resp::{Body, Response, Status};

const NOT_FOUND: &str = "<!DOCTYPE html><html><body><h1>404 Not Found</h1></body></html>";
const NOT_ALLOWED: &str =
    "<!DOCTYPE html><html><body><h1>405 Method Not Allowed</h1></body></html>";

#[derive(Debug, Clone)]
pub struct StaticFileHandler {
    root: PathBuf,
}

impl StaticFileHandler {
    pub fn with_root(root: impl Into<PathBuf>) -> StaticFileHandler {
        StaticFileHandler { root: root.into() }
    }

    /// Maps a percent-encoded request path to a file under the root. Paths
    /// that climb out of the root resolve to nothing; directories resolve to
    /// their `index.html`.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(request_path).ok()?;
        let relative = Path::new(decoded.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }

        let mut path = self.root.join(relative);
        if path.is_dir() {
            path.push("index.html");
        }

        path.is_file().then_some(path)
    }

    pub async fn handle(&self, request: &Request) -> anyhow::Result<Response<Body>> {
        if request.method == Method::Other {
            return Ok(Response::from_html(Status::MethodNotAllowed, NOT_ALLOWED));
        }

        let Some(path) = self.resolve(&request.path) else {
            return Ok(Response::from_html(Status::NotFound, NOT_FOUND));
        };

        open(&path).await
    }
}

pub async fn open(path: &Path) -> anyhow::Result<Response<Body>> {
    let file = tokio::fs::File::open(path).await?;
    Response::from_file(path, file).await
}
