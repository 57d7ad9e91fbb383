pub mod span;
pub mod style;

pub use span::{Span, SpanLine};
pub use style::{Color, Style};
