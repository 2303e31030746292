use std::collections::HashMap;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl Request {
    pub fn wants_close(&self) -> bool {
        self.headers
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("connection") && v.eq_ignore_ascii_case("close"))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Head,
    Other,
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            _ => Method::Other,
        }
    }
}

/// Reads one request head. Returns `None` if the peer closed the
/// connection before sending anything.
pub async fn parse_request(
    mut stream: impl AsyncBufRead + Unpin,
) -> anyhow::Result<Option<Request>> {
    let mut line_buffer = String::new();
    if stream.read_line(&mut line_buffer).await? == 0 {
        return Ok(None);
    }

    let mut parts = line_buffer.split_whitespace();

    let method: Method = parts
        .next()
        .ok_or(anyhow::anyhow!("missing method"))?
        .into();

    let target = parts.next().ok_or(anyhow::anyhow!("missing path"))?;
    let path = match target.split_once('?') {
        Some((path, _query)) => path,
        None => target,
    }
    .to_string();

    let mut headers = HashMap::new();

    loop {
        line_buffer.clear();
        stream.read_line(&mut line_buffer).await?;

        if line_buffer.is_empty() || line_buffer == "\n" || line_buffer == "\r\n" {
            break;
        }

        let (key, value) = line_buffer
            .split_once(':')
            .ok_or(anyhow::anyhow!("malformed header: {}", line_buffer.trim_end()))?;

        headers.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(Some(Request {
        method,
        path,
        headers,
    }))
}
