//! Dialogue markup: strips inline `[TAG=arg]` instructions out of authored
//! text and records each one against the char offset in the display text
//! where it should fire.
//!
//! ```
//! use casefile_markup::{parse, EventKind};
//!
//! let parsed = parse("Hi[PAUSE=500]!").unwrap();
//! assert_eq!(parsed.text, "Hi!");
//! assert_eq!(parsed.events[0].offset, 2);
//! assert_eq!(parsed.events[0].kind, EventKind::Pause { ms: 500 });
//! ```

pub mod error;
pub mod event;
pub mod lexer;
pub mod parser;

pub use error::MarkupError;
pub use event::{ColorMarker, ColorMode, ColorOp, EventDescriptor, EventKind, ParsedText};
pub use parser::{parse, parse_with, ParseOptions};
