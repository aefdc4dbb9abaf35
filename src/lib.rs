//! s3part - SigV4 signing and parallel multipart uploads for S3-compatible storage
//!
//! This library backs the `sign-url` and `s3-upload` binaries: AWS Signature
//! Version 4 for arbitrary REST requests, pre-signed URLs, and a multipart
//! upload orchestrator that transfers byte ranges of a local file in
//! parallel.

pub mod credentials;
pub mod error;
pub mod multipart;
pub mod response;
pub mod sigv4;
pub mod transport;
