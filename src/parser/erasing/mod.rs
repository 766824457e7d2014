// WHY: AsciiDoc and Re:VIEW markup is too context-sensitive to strip while streaming;
// both dialects first erase markup over a whole file of lines, then project what is left

mod line;
mod model;

pub use line::{EraseStyle, Line, ASCIIDOC_DELIMITERS, ESCAPED_CHARACTER};
pub use model::LineModel;
