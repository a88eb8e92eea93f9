//! Validation of CircleCI `circle.yml` files against a fixed schema.
//!
//! ```no_run
//! use circlecheck::{SchemaValidator, ValidationError};
//! use std::path::Path;
//!
//! match SchemaValidator::new().validate(Path::new("circle.yml")) {
//!     Ok(_) => println!("valid"),
//!     Err(ValidationError::UnrecognizedSection { keys, .. }) => {
//!         eprintln!("unknown keys: {}", keys.join(", "))
//!     }
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ErrorKind, ValidationError};
pub use loader::{Document, DocumentLoader, LoadError, YamlLoader};
pub use validation::{DocPath, FileReport, SchemaValidator, validate_file};
