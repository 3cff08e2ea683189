pub mod upload_store;

pub use upload_store::{allowed_file, sanitize_filename, UploadError, UploadStore, UploadedImage};
