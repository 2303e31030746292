use std::io::Cursor;
use std::path::Path;
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
};

use maplit::hashmap;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::either::Either;

pub type Body = Either<Cursor<Vec<u8>>, File>;

#[derive(Debug)]
pub struct Response<S: AsyncRead + Unpin> {
    pub status: Status,
    pub headers: HashMap<String, String>,
    pub data: S,
}

impl<S: AsyncRead + Unpin> Response<S> {
    pub fn status_and_headers(&self) -> String {
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| format!("{}: {}\r\n", k, v))
            .collect::<Vec<_>>()
            .join("");

        format!("HTTP/1.1 {}\r\n{headers}\r\n", self.status)
    }

    /// Writes the status line and headers, then the body unless `head_only`.
    pub async fn write<O: AsyncWrite + Unpin>(
        mut self,
        stream: &mut O,
        head_only: bool,
    ) -> anyhow::Result<()> {
        stream
            .write_all(self.status_and_headers().as_bytes())
            .await?;

        if !head_only {
            tokio::io::copy(&mut self.data, stream).await?;
        }
        stream.flush().await?;

        Ok(())
    }
}

impl Response<Body> {
    pub fn from_html(status: Status, data: impl ToString) -> Self {
        let bytes = data.to_string().into_bytes();

        let headers = hashmap! {
            "Content-Type".to_string() => "text/html".to_string(),
            "Content-Length".to_string() => bytes.len().to_string(),
        };

        Self {
            status,
            headers,
            data: Either::Left(Cursor::new(bytes)),
        }
    }

    pub async fn from_file(path: &Path, file: File) -> anyhow::Result<Self> {
        let len = file.metadata().await?.len();
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let headers = hashmap! {
            "Content-Type".to_string() => mime.to_string(),
            "Content-Length".to_string() => len.to_string(),
        };

        Ok(Self {
            status: Status::Ok,
            headers,
            data: Either::Right(file),
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    Ok,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => write!(f, "200 OK"),
            Status::NotFound => write!(f, "404 Not Found"),
            Status::MethodNotAllowed => write!(f, "405 Method Not Allowed"),
            Status::InternalServerError => write!(f, "500 Internal Server Error"),
        }
    }
}
