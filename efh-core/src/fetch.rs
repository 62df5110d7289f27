/// Fetching of remote source snapshots over HTTP
use crate::compression::decode_snapshot;
use crate::error::Result;
use reqwest::Client;

/// Downloads one source and decodes it to text.
///
/// Sources are fetched once per session; there are no retries.
pub async fn fetch_source(client: &Client, url: &str) -> Result<String> {
    log::info!("[EFH] fetch: GET {}", url);
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    log::info!("[EFH] fetch: received {} bytes from {}", bytes.len(), url);
    decode_snapshot(&bytes)
}
