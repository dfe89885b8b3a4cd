//! Download of the source clip, cached on disk between runs.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::bench::BenchResult;

const CHUNK_SIZE: usize = 1024 * 1024;

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn write_body(resp: reqwest::Response, path: &Path) -> BenchResult<u64> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = resp.bytes_stream();
    let mut total = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        total += chunk.len() as u64;
        writer.write_all(&chunk).await?;
    }
    writer.flush().await?;
    Ok(total)
}

/// Make sure `dest` exists, downloading `url` into it if needed.
/// Returns `true` when a download happened.
pub async fn ensure_source(url: &str, dest: &Path) -> BenchResult<bool> {
    if tokio::fs::try_exists(dest).await? {
        debug!(path = %dest.display(), "using cached video source");
        return Ok(false);
    }

    info!(%url, path = %dest.display(), "downloading video source");
    let resp = reqwest::get(url).await?.error_for_status()?;

    let part = partial_path(dest);
    let total = match write_body(resp, &part).await {
        Ok(total) => total,
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&part, dest).await?;
    info!(bytes = total, "video source downloaded");
    Ok(true)
}
