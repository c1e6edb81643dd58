pub mod config;
pub mod form;
pub mod gallery;
pub mod page;
pub mod s3;
pub mod server;
pub mod tui;
pub mod types;
pub mod upload;

pub use config::Config;
pub use form::UploadForm;
pub use s3::{ObjectStore, S3Client};
pub use types::*;
