//! URL handling module for Site-Mirror
//!
//! This module provides reference resolution, domain extraction, and the
//! reject filters applied to discovered links.

mod domain;
mod filter;
mod resolve;

// Re-export main functions
pub use domain::{denotes_directory, extract_domain, index_url, is_bare_root, INDEX_FILE};
pub use filter::{has_http_scheme, is_rejected_extension, is_rejected_path};
pub use resolve::{path_of, resolve_url, split_origin};
