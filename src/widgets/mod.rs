pub mod base;
pub mod config;
pub mod editor;
pub mod field;

pub use config::{ActionKind, EditorConfig};
pub use editor::{JsonEditor, Mode};
pub use field::{FieldEdit, FieldOutcome, JsonField, Row, ValueCell};
