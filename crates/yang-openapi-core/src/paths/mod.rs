//! Path composition: segment chains, rendering, tags and operations.

mod handler;
mod operations;
mod printer;
mod segment;
mod tags;

pub use handler::PathHandler;
pub use operations::{ModelRef, OperationFactory};
pub use printer::{printer_for, OdlPathPrinter, PathPrinter, PathTemplate, Rfc8040PathPrinter};
pub use segment::{KeyParam, PathSegment, SegmentKind, Segments};
pub use tags::{generators_for, SegmentTagGenerator, TagGenerator};
