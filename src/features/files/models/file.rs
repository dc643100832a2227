use tokio::fs::File;

/// One file part received by the upload endpoint
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// How a single-file download is served
pub enum FileDownload {
    /// Object store URL the client is sent to
    Redirect(String),
    /// File on local disk, streamed in the response body
    Local {
        file: File,
        len: u64,
        original_name: String,
    },
}

/// Assembled collection archive, ready to stream
pub struct CollectionArchive {
    /// Sanitized collection name with `.zip`
    pub file_name: String,
    /// Finished archive, positioned at its start
    pub file: File,
    pub len: u64,
    pub entries: usize,
}
