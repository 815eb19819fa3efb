//! # Image Queue Demo
//!
//! Downloads a list of URLs strictly one at a time through a
//! [`SequentialExecutor`], the way a UI would serialize fetches against a
//! rate-limited endpoint. Every download is registered up front and gets its
//! own awaitable handle; Ctrl-C fires one shared cancellation signal that
//! aborts the in-flight download and everything still queued.
//!
//! ```text
//! cargo run -p image-queue -- https://example.com/a.png https://example.com/b.png
//! ```

use clap::Parser;
use taskline::prelude::*;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "image-queue", about = "Sequential download demo for taskline")]
struct Args {
    /// URLs to fetch, in order
    #[arg(required = true)]
    urls: Vec<String>,
}

/// The work function: one download, parameterized per registration.
async fn fetch(url: String, _cancel: LinkedCancellation) -> Result<Vec<u8>, BoxError> {
    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let executor = SequentialExecutor::<Vec<u8>>::new();
    executor.execute()?;

    // One signal for the whole run, fired on interrupt.
    let cancel = CancellationSignal::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling the queue");
                cancel.cancel();
            }
        });
    }

    let mut downloads = Vec::new();
    for url in &args.urls {
        let handle = executor.register_with(fetch, url.clone(), Some(cancel.clone()))?;
        downloads.push((url.clone(), handle));
    }
    info!(queued = downloads.len(), "downloads registered");

    for (url, handle) in downloads {
        match handle.await {
            Ok(bytes) => info!(url = %url, bytes = bytes.len(), "downloaded"),
            Err(TaskError::Cancelled(source)) => info!(url = %url, %source, "cancelled"),
            Err(err) => error!(url = %url, %err, "download failed"),
        }
    }

    executor.shutdown();
    Ok(())
}
