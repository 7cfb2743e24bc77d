//! Client side of the upload: naming, submit state and the HTTP request.

pub mod client;
pub mod control;
mod filename;

pub use client::{Download, MergeClient, MergeResponse, Uploader};
pub use control::{SubmitControl, SubmitState};
pub use filename::{
    content_disposition, derive_output_filename, header_safe_filename, local_filename,
};
