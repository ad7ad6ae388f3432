use url::Url;

use crate::{FailureKind, StreamError};

/// `POST` target that starts a run and streams its events.
pub fn execute_url(base: &str) -> Result<Url, StreamError> {
    join(base, "execute")
}

/// Lazily fetched thumbnail for an item's source path.
pub fn thumbnail_url(base: &str, path: &str) -> Result<Url, StreamError> {
    let mut url = join(base, "image")?;
    url.query_pairs_mut().append_pair("path", path);
    Ok(url)
}

/// Download link for an archive announced by the backend.
pub fn archive_download_url(base: &str, filename: &str) -> Result<Url, StreamError> {
    let mut url = join(base, "download_zip")?;
    url.query_pairs_mut().append_pair("filename", filename);
    Ok(url)
}

fn join(base: &str, endpoint: &str) -> Result<Url, StreamError> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(endpoint))
        .map_err(|err| StreamError::new(FailureKind::InvalidUrl, format!("{base}: {err}")))
}
