//! prepr - Pretty representation builder
//!
//! prepr renders object graphs as reconstruction-style pseudo code: a
//! variable assignment, a constructor call with positional and keyword
//! arguments, and attribute assignments for post-construction state. Nested
//! objects recurse through the same machinery, reference cycles render as
//! variable labels instead of overflowing, and every token is colored
//! through a configurable palette.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod demo;
pub mod format;
pub mod repr;
pub mod settings;
pub mod style;
pub mod testutil;
pub mod value;

// Re-export commonly used types
pub use format::{format_value, CycleContext};
pub use repr::{Rendered, Repr};
pub use settings::{Settings, SettingsUpdate};
pub use style::{Palette, Style};
pub use value::{ObjectId, Represent, Value};
