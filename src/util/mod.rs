//! Utility functions for common operations.
//!
//! - **URL validation**: the server URL must not leak the session cookie
//!   over plain http
//! - **Text processing**: sanitizing item names for input and terminal output
//!
//! # Examples
//!
//! ```
//! use shoplist::util::{clean_item_name, strip_control_chars, validate_server_url};
//!
//! let url = validate_server_url("https://lists.example.com").unwrap();
//! assert_eq!(url.scheme(), "https");
//!
//! assert_eq!(clean_item_name("  oat   milk ").as_deref(), Some("oat milk"));
//! assert_eq!(strip_control_chars("\x1b[1mEggs\x1b[0m"), "Eggs");
//! ```

mod text;
mod url_validator;

pub use text::{clean_item_name, strip_control_chars, MAX_ITEM_NAME_CHARS};
pub use url_validator::{validate_server_url, UrlValidationError};
