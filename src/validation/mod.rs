mod path;
mod report;
mod span_finder;
mod validator;
mod walker;


pub use path::{DocPath, Segment};
pub use report::{ErrorSummary, FileReport, Inspection, LocatedError};
pub use span_finder::{SpanFinder, line_col};
pub use validator::{SchemaValidator, check_filename, validate_file};
pub use walker::{check_shape, is_truthy};
