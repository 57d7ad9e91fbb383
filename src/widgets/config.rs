use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::transform::ItemNamer;
use crate::core::value::{TypeTag, Value};
use crate::ui::span::Span;
use crate::ui::style::Color;

pub type ObjectSummary = dyn Fn(&IndexMap<String, Value>) -> String + Send + Sync;
pub type ListSummary = dyn Fn(&[Value]) -> String + Send + Sync;
pub type ChangeListener = dyn Fn(&Value) + Send + Sync;
pub type ActionRenderer = dyn Fn(ActionKind, bool) -> Span + Send + Sync;

/// The per-row action controls a host may render itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Delete,
    Duplicate,
}

/// Top-down editor configuration, immutable for a render pass.
///
/// The plain-data part loads from YAML or JSON; the formatter callbacks
/// are installed programmatically with the `with_*` builders.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub root_name: String,
    pub show_type: bool,
    /// Key names whose type and value are read-only and whose
    /// delete/duplicate controls are hidden.
    pub locked_keys: Vec<String>,
    /// Key names excluded from rendering at any depth.
    pub hidden_keys: Vec<String>,
    /// Path substrings excluded regardless of the query.
    pub hidden_paths: Vec<String>,
    pub new_key_default: String,
    pub new_value_default: String,
    pub type_colors: HashMap<TypeTag, Color>,
    pub type_backgrounds: HashMap<TypeTag, Color>,
    #[serde(skip)]
    pub name_for_item: Option<Arc<ItemNamer>>,
    #[serde(skip)]
    pub value_for_object: Option<Arc<ObjectSummary>>,
    #[serde(skip)]
    pub value_for_list: Option<Arc<ListSummary>>,
    #[serde(skip)]
    pub render_action: Option<Arc<ActionRenderer>>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            root_name: "Root".to_string(),
            show_type: true,
            locked_keys: Vec::new(),
            hidden_keys: Vec::new(),
            hidden_paths: Vec::new(),
            new_key_default: "newKey".to_string(),
            new_value_default: String::new(),
            type_colors: HashMap::new(),
            type_backgrounds: HashMap::new(),
            name_for_item: None,
            value_for_object: None,
            value_for_list: None,
            render_action: None,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    pub fn with_show_type(mut self, show_type: bool) -> Self {
        self.show_type = show_type;
        self
    }

    pub fn with_locked_keys(mut self, keys: Vec<String>) -> Self {
        self.locked_keys = keys;
        self
    }

    pub fn with_hidden_keys(mut self, keys: Vec<String>) -> Self {
        self.hidden_keys = keys;
        self
    }

    pub fn with_hidden_paths(mut self, paths: Vec<String>) -> Self {
        self.hidden_paths = paths;
        self
    }

    pub fn with_new_key_default(mut self, name: impl Into<String>) -> Self {
        self.new_key_default = name.into();
        self
    }

    pub fn with_new_value_default(mut self, value: impl Into<String>) -> Self {
        self.new_value_default = value.into();
        self
    }

    pub fn with_type_color(mut self, tag: TypeTag, color: Color) -> Self {
        self.type_colors.insert(tag, color);
        self
    }

    pub fn with_type_background(mut self, tag: TypeTag, color: Color) -> Self {
        self.type_backgrounds.insert(tag, color);
        self
    }

    pub fn with_name_for_item(
        mut self,
        namer: impl Fn(usize, Option<&str>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.name_for_item = Some(Arc::new(namer));
        self
    }

    pub fn with_value_for_object(
        mut self,
        summary: impl Fn(&IndexMap<String, Value>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.value_for_object = Some(Arc::new(summary));
        self
    }

    pub fn with_value_for_list(
        mut self,
        summary: impl Fn(&[Value]) -> String + Send + Sync + 'static,
    ) -> Self {
        self.value_for_list = Some(Arc::new(summary));
        self
    }

    pub fn with_render_action(
        mut self,
        renderer: impl Fn(ActionKind, bool) -> Span + Send + Sync + 'static,
    ) -> Self {
        self.render_action = Some(Arc::new(renderer));
        self
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.locked_keys.iter().any(|key| key == name)
    }

    pub fn is_hidden_key(&self, name: &str) -> bool {
        self.hidden_keys.iter().any(|key| key == name)
    }

    /// Display name for an array item: the configured formatter or the
    /// `item <index>` fallback.
    pub fn item_name(&self, index: usize, parent: Option<&str>) -> String {
        match &self.name_for_item {
            Some(namer) => namer(index, parent),
            None => format!("item {index}"),
        }
    }
}
