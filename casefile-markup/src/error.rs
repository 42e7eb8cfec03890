use thiserror::Error;

use crate::event::ColorMode;

/// Authoring defects found while parsing dialogue markup.
///
/// Positions are char indices into the raw (unstripped) input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    #[error("unterminated tag starting at {position}")]
    UnterminatedTag { position: usize },

    #[error("']' at {position} closes no tag")]
    StrayClose { position: usize },

    #[error("invalid escape sequence at {position}")]
    BadEscape { position: usize },

    #[error("unknown tag [{name}] at {position}")]
    UnknownTag { name: String, position: usize },

    #[error("tag [{tag}] at {position} requires an argument")]
    MissingArgument { tag: String, position: usize },

    #[error("tag [{tag}] at {position} takes no argument")]
    UnexpectedArgument { tag: String, position: usize },

    #[error("tag [{tag}] at {position} has a bad argument '{arg}'")]
    BadArgument { tag: String, arg: String, position: usize },

    #[error("colour mode closed at {position} was never opened or does not match")]
    UnbalancedColor { position: usize },

    #[error("colour mode {mode:?} opened at {position} is never closed")]
    UnclosedColor { mode: ColorMode, position: usize },
}
