//! User-facing message catalogue.
//!
//! Handlers, the workflow, and tests all share these, so a wording change
//! happens in exactly one place.

pub const GREETING: &str =
    "Hi! I can convert Google Drive video links into Telegram videos.\n\nSend /convertvd to start.";

pub const ASK_LINK: &str = "Please send your Google Drive video link 👇";

pub const HINT: &str = "Send /convertvd to convert a Google Drive video link.";

pub const INVALID_LINK: &str = "⚠️ This doesn't look like a valid Google Drive link. \
Please check the link and try /convertvd again.";

pub const DOWNLOADING: &str = "⏳ Downloading video...";

pub const UPLOADING: &str = "📤 Uploading to Telegram...";

pub const DONE: &str = "✅ Upload complete!";

pub const CANCELLED: &str = "Operation cancelled.";

pub const TOO_BIG: &str =
    "❌ Error: The video file is too large for me to upload to Telegram (max 2GB).";

pub const TIMED_OUT: &str = "❌ Error: The upload to Telegram timed out. \
This can happen with large files or network issues. Please try again.";

/// Synthetic failure text for an acquisition that produced no artifact.
pub const DOWNLOAD_FAILED: &str = "Download failed. File might be private or deleted.";

pub fn upload_error(detail: &str) -> String {
    format!("❌ An error occurred during upload: {detail}")
}

pub fn unexpected_error(detail: &str) -> String {
    format!("❌ An unexpected error occurred: {detail}")
}
