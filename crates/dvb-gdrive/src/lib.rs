//! Google Drive fetch adapter.
//!
//! Resolves a sharing link to a local file: extract the file id from
//! whichever URL shape the user pasted, hit the `uc` download endpoint, and
//! walk through the large-file confirm form when Drive serves the
//! interstitial page instead of bytes.
//!
//! Remote-side failures (private file, deleted file, quota, network) all
//! collapse to `Ok(None)`; the workflow treats "no artifact produced" as the
//! single failure signal from this adapter.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, Client, Response};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use dvb_core::{ports::VideoFetcher, Error, Result};

const UC_ENDPOINT: &str = "https://drive.google.com/uc";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

static DOWNLOAD_COUNTER: AtomicUsize = AtomicUsize::new(1);

pub struct DriveFetcher {
    client: Client,
    download_dir: PathBuf,
}

impl DriveFetcher {
    pub fn new(download_dir: PathBuf) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::External(format!("http client: {e}")))?;
        Ok(Self {
            client,
            download_dir,
        })
    }

    /// Fresh path per call so concurrent conversations never share an
    /// artifact file.
    fn fresh_path(&self, name: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let n = DOWNLOAD_COUNTER.fetch_add(1, Ordering::SeqCst);
        self.download_dir.join(format!("{ts}_{n}_{name}"))
    }

    /// Get a byte-stream response for the file, following the confirm form
    /// when Drive answers with HTML instead of the file body.
    async fn resolve(&self, id: &str) -> Option<Response> {
        let resp = match self
            .client
            .get(UC_ENDPOINT)
            .query(&[("id", id), ("export", "download")])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("drive request failed for file {id}: {e}");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!("drive returned {} for file {id}", resp.status());
            return None;
        }
        if !is_html(&resp) {
            return Some(resp);
        }

        // Large files get an interstitial page with a hidden confirm form;
        // access-denied and quota pages have no such form.
        let page = match resp.text().await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("failed to read drive interstitial for file {id}: {e}");
                return None;
            }
        };
        let Some(form) = parse_confirm_form(&page) else {
            tracing::warn!("no download form for file {id}; file may be private or deleted");
            return None;
        };

        let resp = match self
            .client
            .get(&form.action)
            .query(&form.fields)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("drive confirm request failed for file {id}: {e}");
                return None;
            }
        };
        if !resp.status().is_success() || is_html(&resp) {
            tracing::warn!("drive confirm step did not yield a file body for file {id}");
            return None;
        }
        Some(resp)
    }
}

#[async_trait]
impl VideoFetcher for DriveFetcher {
    async fn fetch(&self, link: &str) -> Result<Option<PathBuf>> {
        let Some(id) = extract_file_id(link) else {
            tracing::warn!("could not extract a drive file id from link");
            return Ok(None);
        };

        let Some(mut resp) = self.resolve(&id).await else {
            return Ok(None);
        };

        let name = attachment_filename(resp.headers()).unwrap_or_else(|| format!("{id}.mp4"));
        let path = self.fresh_path(&name);
        let mut file = tokio::fs::File::create(&path).await?;

        // A truncated artifact is worse than none; every failure past this
        // point drops the partial file before reporting.
        match stream_body(&mut resp, &mut file).await {
            Ok(StreamOutcome::Done) => {}
            Ok(StreamOutcome::RemoteFailed(e)) => {
                tracing::warn!("download stream failed for file {id}: {e}");
                drop(file);
                discard_partial(&path).await;
                return Ok(None);
            }
            Err(e) => {
                drop(file);
                discard_partial(&path).await;
                return Err(e.into());
            }
        }

        tracing::info!("downloaded {} to {}", id, path.display());
        Ok(Some(path))
    }
}

#[derive(Debug)]
enum StreamOutcome {
    Done,
    RemoteFailed(reqwest::Error),
}

/// Copy the response body into `dst`. Remote failures come back as an
/// outcome so the caller can collapse them to "no artifact"; local write
/// failures are real I/O errors.
async fn stream_body<W>(resp: &mut Response, dst: &mut W) -> std::io::Result<StreamOutcome>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match resp.chunk().await {
            Ok(Some(bytes)) => dst.write_all(&bytes).await?,
            Ok(None) => break,
            Err(e) => return Ok(StreamOutcome::RemoteFailed(e)),
        }
    }
    dst.flush().await?;
    Ok(StreamOutcome::Done)
}

/// Best-effort removal of a partially written download.
async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("failed to remove partial download {}: {e}", path.display());
    }
}

/// Pull a Drive file id out of the link shapes users actually paste:
/// `/file/d/<id>/view`, `/open?id=<id>`, `/uc?export=download&id=<id>`.
pub fn extract_file_id(link: &str) -> Option<String> {
    for pat in [
        r"/file/d/([A-Za-z0-9_-]{10,})",
        r"[?&]id=([A-Za-z0-9_-]{10,})",
    ] {
        let re = Regex::new(pat).ok()?;
        if let Some(c) = re.captures(link) {
            return Some(c[1].to_string());
        }
    }
    None
}

struct ConfirmForm {
    action: String,
    fields: Vec<(String, String)>,
}

fn parse_confirm_form(page: &str) -> Option<ConfirmForm> {
    let action_re = Regex::new(r#"<form[^>]+action="([^"]+)""#).ok()?;
    let action = action_re.captures(page)?[1].to_string();

    let input_re = Regex::new(r#"<input type="hidden" name="([^"]+)" value="([^"]*)""#).ok()?;
    let fields: Vec<(String, String)> = input_re
        .captures_iter(page)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect();

    if !fields.iter().any(|(name, _)| name == "confirm") {
        return None;
    }
    Some(ConfirmForm { action, fields })
}

fn is_html(resp: &Response) -> bool {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false)
}

/// File name advertised by `Content-Disposition: attachment`, stripped of
/// any path components.
fn attachment_filename(headers: &header::HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_DISPOSITION)?.to_str().ok()?;
    let re = Regex::new(r#"filename="([^"]+)""#).ok()?;
    let name = re.captures(value)?[1].to_string();
    let name = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Writer that fails like a full disk on the first write.
    struct FailingWriter;

    impl AsyncWrite for FailingWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn body_response(body: &'static str) -> Response {
        http::Response::new(body).into()
    }

    #[tokio::test]
    async fn stream_body_copies_the_whole_response() {
        let mut resp = body_response("not really a video");
        let mut out: Vec<u8> = Vec::new();

        let outcome = stream_body(&mut resp, &mut out).await.unwrap();
        assert!(matches!(outcome, StreamOutcome::Done));
        assert_eq!(out, b"not really a video");
    }

    #[tokio::test]
    async fn local_write_failure_surfaces_as_an_io_error() {
        let mut resp = body_response("not really a video");

        let err = stream_body(&mut resp, &mut FailingWriter).await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn discard_partial_removes_the_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.mp4");
        std::fs::write(&path, b"half a video").unwrap();

        discard_partial(&path).await;
        assert!(!path.exists());

        // Nothing left behind; a second discard finds nothing and stays quiet.
        discard_partial(&path).await;
    }

    #[test]
    fn extracts_id_from_file_link() {
        assert_eq!(
            extract_file_id("https://drive.google.com/file/d/1a2B3c4D5e6F7g8H/view?usp=sharing"),
            Some("1a2B3c4D5e6F7g8H".to_string())
        );
    }

    #[test]
    fn extracts_id_from_open_and_uc_links() {
        assert_eq!(
            extract_file_id("https://drive.google.com/open?id=1a2B3c4D5e6F7g8H"),
            Some("1a2B3c4D5e6F7g8H".to_string())
        );
        assert_eq!(
            extract_file_id("https://drive.google.com/uc?export=download&id=1a2B3c4D5e6F7g8H"),
            Some("1a2B3c4D5e6F7g8H".to_string())
        );
    }

    #[test]
    fn rejects_links_without_an_id() {
        assert_eq!(extract_file_id("https://example.com/video.mp4"), None);
        assert_eq!(extract_file_id("https://drive.google.com/drive/my-drive"), None);
    }

    #[test]
    fn parses_confirm_form_from_interstitial() {
        let page = r#"<html><body>
            <form id="download-form" action="https://drive.usercontent.google.com/download" method="get">
              <input type="hidden" name="id" value="1a2B3c4D5e6F7g8H">
              <input type="hidden" name="export" value="download">
              <input type="hidden" name="confirm" value="t">
              <input type="hidden" name="uuid" value="abc-123">
            </form>
        </body></html>"#;

        let form = parse_confirm_form(page).unwrap();
        assert_eq!(form.action, "https://drive.usercontent.google.com/download");
        assert!(form
            .fields
            .contains(&("confirm".to_string(), "t".to_string())));
        assert!(form
            .fields
            .contains(&("uuid".to_string(), "abc-123".to_string())));
    }

    #[test]
    fn access_denied_page_has_no_form() {
        let page = "<html><body><p>You need access</p></body></html>";
        assert!(parse_confirm_form(page).is_none());
    }

    #[test]
    fn filename_comes_from_content_disposition() {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_DISPOSITION,
            header::HeaderValue::from_static(r#"attachment; filename="movie.mp4""#),
        );
        assert_eq!(attachment_filename(&headers), Some("movie.mp4".to_string()));
    }

    #[test]
    fn filename_is_stripped_to_its_base_name() {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_DISPOSITION,
            header::HeaderValue::from_static(r#"attachment; filename="../../etc/movie.mp4""#),
        );
        assert_eq!(attachment_filename(&headers), Some("movie.mp4".to_string()));

        assert_eq!(attachment_filename(&header::HeaderMap::new()), None);
    }
}
