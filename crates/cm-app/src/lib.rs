//! Session layer for the capability matrix.
//!
//! Frontends talk to a [`MatrixSession`], which applies each change to the
//! in-memory [`cm_core::GridStore`] and mirrors it to persistence right away.
//! CSV export/import, file naming and image embedding live here too so every
//! frontend shares them.

pub mod config;
pub mod error;
pub mod export;
pub mod image;
pub mod session;

pub use config::MatrixConfig;
pub use error::{AppError, AppResult};
pub use export::{default_export_file_name, export_file_name};
pub use image::{image_data_uri, mime_for_path, read_image_data_uri};
pub use session::MatrixSession;
