use std::process::ExitCode;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use args::{Args, HELP};
use cursor::ArgsIterator;
use server::ServerConfig;

mod args;
mod cursor;
mod handler;
mod opt;
mod req;
mod resp;
mod server;

fn main() -> anyhow::Result<ExitCode> {
    // Initialize the default tracing subscriber.
    tracing_subscriber::fmt::init();

    let argv: Vec<String> = std::env::args().collect();
    let mut it = ArgsIterator::new(&argv);

    let args = match Args::parse(&mut it) {
        Ok(args) => args,
        Err(e) => {
            error!(token = it.current(), kind = e.kind_name(), "{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.help {
        print!("{HELP}");
        return Ok(ExitCode::SUCCESS);
    }

    let threads = positive(args.threads).context("thread count must be at least 1")?;
    let workers = positive(args.workers).context("worker count must be at least 1")?;

    let config = ServerConfig {
        root: args.path.into(),
        port: args.port,
        workers,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async move {
        let cancel_token = CancellationToken::new();

        tokio::spawn({
            let cancel_token = cancel_token.clone();
            async move {
                if let Ok(()) = signal::ctrl_c().await {
                    info!("received Ctrl-C, shutting down");
                    cancel_token.cancel();
                }
            }
        });

        server::run(config, cancel_token).await
    })?;

    Ok(ExitCode::SUCCESS)
}

fn positive(n: i32) -> Option<usize> {
    usize::try_from(n).ok().filter(|n| *n > 0)
}
