//! Loading transcripts and demo manifests from files or URLs.

use ai_conversation::{DemoManifest, Source, Turn, transcript};
use tracing::debug;

use crate::error::{Error, Result};

/// Read the document at `source`.
pub(crate) async fn fetch(http: &reqwest::Client, source: &Source) -> Result<String> {
    debug!(%source, "Fetching document.");

    match source {
        Source::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Read {
                path: path.display().to_string(),
                source,
            }),
        Source::Url(url) => {
            let fetch = async {
                http.get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await
            };

            fetch.await.map_err(|source| Error::Fetch {
                url: url.clone(),
                source,
            })
        }
    }
}

/// Load a transcript.
pub(crate) async fn transcript(http: &reqwest::Client, source: &Source) -> Result<Vec<Turn>> {
    let json = fetch(http, source).await?;
    transcript::from_json(&json).map_err(Into::into)
}

pub(crate) async fn manifest(http: &reqwest::Client, source: &Source) -> Result<DemoManifest> {
    let json = fetch(http, source).await?;
    DemoManifest::from_json(&json).map_err(Into::into)
}

/// Load the transcript of the demo matching `query`.
pub(crate) async fn demo(
    http: &reqwest::Client,
    manifest_source: &Source,
    query: &str,
) -> Result<Vec<Turn>> {
    let manifest = manifest(http, manifest_source).await?;
    let demo = manifest.find(query)?;
    debug!(title = %demo.title, file = %demo.file, "Loading demo.");

    transcript(http, &demo.source(manifest_source)?).await
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
