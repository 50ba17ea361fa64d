//! Storage module for the on-disk mirror
//!
//! This module decides where each downloaded URL is written and owns the
//! file creation rules:
//! - One directory per host below the output directory
//! - Directories mirror the URL path, directory URLs become `index.html`
//! - HTML responses always end in `.html`
//! - Existing files are never overwritten

mod naming;
mod writer;

pub use naming::{host_dir, is_html_content_type, local_path, output_path};
pub use writer::{ensure_parent_dir, AssetWriter};
