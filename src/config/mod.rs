//! Configuration module for Site-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring into: {}", config.crawl.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    split_list, CrawlConfig, HttpConfig, MirrorConfig, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{expand_path, load_config, parse_config};
pub use validation::validate;
