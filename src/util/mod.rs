//! Utility functions shared by the API client and the terminal UI.
//!
//! - **URL validation**: base URL transport policy and website link checks
//! - **Text processing**: Unicode-aware width calculation, truncation and
//!   sanitizing of server-provided strings

mod text;
mod url_validator;

pub use text::{display_width, sanitize_line, truncate_to_width};
pub use url_validator::{validate_base_url, validate_web_link, UrlValidationError};
