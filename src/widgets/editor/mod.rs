use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::debounce::Debounce;
use crate::core::query::PathFilter;
use crate::core::transform::{self, TypeChoice};
use crate::core::value::Value;
use crate::core::value_path::ValuePath;
use crate::widgets::base::WidgetBase;
use crate::widgets::config::{ChangeListener, EditorConfig};
use crate::widgets::field::{FieldContext, FieldEdit, FieldOutcome, JsonField, Row};

mod interaction;
mod render;

const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Interaction state of the editor: one mode at a time, keyed off the
/// active row.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    EditName { buffer: String },
    EditValue { buffer: String },
    SelectType { options: Vec<TypeChoice>, selected: usize },
    Query,
}

/// The tree assembly: owns the authoritative root value and configuration,
/// computes the visible-path set once per (value, query, hidden-path)
/// change, and renders the recursive field tree under a fixed header.
///
/// Every committed edit anywhere in the tree surfaces as one
/// `on_change(&Value)` call carrying the complete new root value.
pub struct JsonEditor {
    base: WidgetBase,
    config: EditorConfig,
    value: Value,
    root: JsonField,
    query: String,
    filter: PathFilter,
    debounce: Debounce,
    on_change: Option<Arc<ChangeListener>>,
    rows: Vec<Row>,
    active: usize,
    mode: Mode,
}

impl JsonEditor {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        let config = EditorConfig::default();
        let filter = PathFilter::all();
        let root = JsonField::new_root(
            &FieldContext {
                config: &config,
                filter: &filter,
            },
            config.root_name.clone(),
            value.clone(),
        );
        let mut editor = Self {
            base: WidgetBase::new(id, ""),
            config,
            value,
            root,
            query: String::new(),
            filter,
            debounce: Debounce::new(DEBOUNCE_DELAY),
            on_change: None,
            rows: Vec::new(),
            active: 0,
            mode: Mode::Normal,
        };
        editor.refresh();
        editor
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self.refresh();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.set_query(query);
        self
    }

    pub fn with_on_change(
        mut self,
        listener: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(listener));
        self
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_row(&self) -> Option<&Row> {
        self.rows.get(self.active)
    }

    /// Replace the root value wholesale, as when the host supplies a new
    /// document.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.refresh();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refresh();
    }

    /// Route an edit to the row at `path`. On a committed change the new
    /// root value is adopted and the notification is either scheduled on
    /// the debounce window or emitted immediately, per the edit's
    /// discipline.
    pub fn dispatch(&mut self, path: &str, edit: FieldEdit) -> FieldOutcome {
        let Ok(target) = ValuePath::parse(path) else {
            return FieldOutcome::Ignored;
        };
        let ctx = FieldContext {
            config: &self.config,
            filter: &self.filter,
        };
        let outcome = self.root.apply(&ctx, target.segments(), edit);
        match &outcome {
            FieldOutcome::Changed { value, debounce } => {
                self.value = value.clone();
                self.refresh();
                if *debounce {
                    self.debounce.schedule();
                } else {
                    self.debounce.cancel();
                    self.emit();
                }
            }
            FieldOutcome::Local => self.rebuild_rows(),
            FieldOutcome::Ignored => {}
        }
        outcome
    }

    /// One cooperative update cycle: advances deferred child enumeration
    /// and fires a due debounced notification. Returns whether anything
    /// happened and another paint is needed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        let advanced = self.root.advance_paint();
        if advanced {
            self.rebuild_rows();
        }
        let fired = self.debounce.fire_ready(now);
        if fired {
            self.emit();
        }
        advanced || fired
    }

    pub fn move_active(&mut self, delta: isize) -> bool {
        let len = self.rows.len();
        if len == 0 {
            return false;
        }
        let current = self.active as isize;
        let next = ((current + delta + len as isize) % len as isize) as usize;
        if next == self.active {
            return false;
        }
        self.active = next;
        true
    }

    fn refresh(&mut self) {
        self.filter = PathFilter::compute(&self.value, &self.query, &self.config.hidden_paths);
        let ctx = FieldContext {
            config: &self.config,
            filter: &self.filter,
        };
        // the field tree edits a working copy; `self.value` stays the
        // authoritative document
        let seed = transform::structural_copy(&self.value);
        self.root.sync(&ctx, self.config.root_name.clone(), seed);
        self.rebuild_rows();
    }

    fn rebuild_rows(&mut self) {
        let ctx = FieldContext {
            config: &self.config,
            filter: &self.filter,
        };
        let mut rows = Vec::new();
        self.root.collect_rows(&ctx, false, &mut rows);
        self.rows = rows;
        if self.active >= self.rows.len() {
            self.active = self.rows.len().saturating_sub(1);
        }
    }

    fn emit(&self) {
        if let Some(listener) = &self.on_change {
            listener(&self.value);
        }
    }

    fn active_path(&self) -> String {
        self.active_row()
            .map(|row| row.path.clone())
            .unwrap_or_default()
    }
}
