//! Transfer layer for the runner
//!
//! Sequences multipart uploads: one session is created, parts are uploaded
//! (in order or with bounded concurrency), and the session is then either
//! completed with the ascending part list or aborted.

mod session;
mod uploader;

#[cfg(test)]
pub(crate) mod testing;

pub use session::UploadSession;
pub use uploader::{MultipartUploader, UploadSummary};
