/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Platform-assigned reference to an uploaded video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRef(pub String);

/// Terminal status of a conversion attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionStatus {
    Done,
    Error,
}

impl ConversionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

/// One row of the conversion ledger, ready to insert.
///
/// `created_at` is not here: the storage engine stamps it at insert time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewConversionRecord {
    pub user_id: String,
    pub original_link: String,
    pub remote_file_reference: Option<String>,
    pub status: ConversionStatus,
}
