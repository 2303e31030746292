use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use tokio::{
    io::{AsyncWrite, BufStream},
    net::{TcpListener, TcpStream},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::handler::StaticFileHandler;
use crate::req::{self, Method};
use crate::resp::{Body, Response, Status};

const INTERNAL_ERROR: &str =
    "<!DOCTYPE html><html><body><h1>500 Internal Server Error</h1></body></html>";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root: PathBuf,
    pub port: u16,
    pub workers: usize,
}

/// Serves `config.root` until `cancel_token` fires, with `config.workers`
/// accept loops sharing one listener.
pub async fn run(config: ServerConfig, cancel_token: CancellationToken) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    info!(
        root = %config.root.display(),
        workers = config.workers,
        "listening on: {}",
        listener.local_addr()?
    );

    let listener = Arc::new(listener);
    let handler = StaticFileHandler::with_root(config.root);

    let workers = (0..config.workers)
        .map(|id| {
            tokio::spawn(accept_loop(
                id,
                listener.clone(),
                handler.clone(),
                cancel_token.clone(),
            ))
        })
        .collect::<Vec<_>>();

    futures::future::join_all(workers).await;

    Ok(())
}

/// Accepts connections until cancelled, then waits for the open ones to
/// finish. Returns how many connections were still open at that point.
async fn accept_loop(
    id: usize,
    listener: Arc<TcpListener>,
    handler: StaticFileHandler,
    cancel_token: CancellationToken,
) -> usize {
    let mut tasks = JoinSet::new();

    loop {
        let cancel_token = cancel_token.clone();

        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!(worker = id, ?e, "failed to accept connection");
                        continue;
                    }
                };
                let handler = handler.clone();
                tasks.spawn(async move {
                    if let Err(e) = handle_client(cancel_token, stream, addr, &handler).await {
                        error!(?e, "failed to handle client");
                    }
                });
            },
            Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = finished {
                    error!(worker = id, ?e, "connection task failed");
                }
            },
            _ = cancel_token.cancelled() => {
                info!(worker = id, open = tasks.len(), "stop listening");
                break;
            }
        }
    }

    let open = tasks.len();
    while tasks.join_next().await.is_some() {}

    open
}

async fn handle_client(
    cancel_token: CancellationToken,
    stream: TcpStream,
    addr: SocketAddr,
    handler: &StaticFileHandler,
) -> anyhow::Result<()> {
    let mut stream = BufStream::new(stream);

    debug!(?addr, "new connection");

    loop {
        tokio::select! {
            req = req::parse_request(&mut stream) => {
                match req {
                    Ok(Some(req)) => {
                        info!(?addr, method = ?req.method, path = %req.path, "incoming request");
                        if handle_req(req, handler, &mut stream).await? {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!(?e, "failed to parse request");
                        break;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                debug!(?addr, "closing connection");
                break;
            }
        }
    }

    Ok(())
}

/// Answers one request. Returns whether the connection should be closed.
async fn handle_req<S: AsyncWrite + Unpin>(
    req: req::Request,
    handler: &StaticFileHandler,
    stream: &mut S,
) -> anyhow::Result<bool> {
    let failed = respond(
        handler.handle(&req).await,
        req.method == Method::Head,
        stream,
    )
    .await?;

    Ok(failed || req.wants_close())
}

/// Writes `resp`, or a 500 page if producing it failed. Returns whether
/// the 500 page was sent.
async fn respond<S: AsyncWrite + Unpin>(
    resp: anyhow::Result<Response<Body>>,
    head_only: bool,
    stream: &mut S,
) -> anyhow::Result<bool> {
    match resp {
        Ok(resp) => {
            resp.write(stream, head_only).await?;
            Ok(false)
        }
        Err(e) => {
            error!(?e, "failed to handle request");
            Response::from_html(Status::InternalServerError, INTERNAL_ERROR)
                .write(stream, head_only)
                .await?;
            Ok(true)
        }
    }
}
