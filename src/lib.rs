pub mod core;
pub mod terminal;
pub mod ui;
pub mod widgets;

pub use crate::core::debounce::Debounce;
pub use crate::core::query::{self, PathFilter};
pub use crate::core::transform::{self, TypeChoice};
pub use crate::core::value::{TypeTag, Value};
pub use crate::core::value_path::{PathSegment, ValuePath};

pub use crate::widgets::config::{ActionKind, EditorConfig};
pub use crate::widgets::editor::{JsonEditor, Mode};
pub use crate::widgets::field::{FieldEdit, FieldOutcome, Row, ValueCell};
