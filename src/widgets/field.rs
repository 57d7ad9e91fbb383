use crate::core::query::PathFilter;
use crate::core::transform::{self, CoerceContext, TypeChoice};
use crate::core::value::{TypeTag, Value};
use crate::core::value_path::{PathSegment, ValuePath};
use crate::widgets::config::EditorConfig;

/// Everything a field needs from above for one pass: the immutable
/// configuration and the computed visibility constraint.
pub struct FieldContext<'a> {
    pub config: &'a EditorConfig,
    pub filter: &'a PathFilter,
}

/// An edit addressed at one row of the tree.
#[derive(Debug, Clone)]
pub enum FieldEdit {
    /// Primitive input change, applied optimistically. `debounce` selects
    /// the escalation discipline: coalesced for text/number typing,
    /// immediate for discrete toggles.
    SetValue { value: Value, debounce: bool },
    SetType(TypeChoice),
    BeginRename,
    NameInput(String),
    CommitRename,
    CancelRename,
    Delete,
    Duplicate,
    /// Insert a fresh entry right after the addressed row, named and
    /// seeded from the configured defaults. Addressed at the root it
    /// appends to the root container instead.
    InsertAfter,
}

/// What an edit produced, bubbling back up the recursion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Nothing applied; no state touched.
    Ignored,
    /// Local row state changed without producing a new value (rename in
    /// progress, rename reverted).
    Local,
    /// A new subtree value; each ancestor replaces its slot on the way up,
    /// so at the root this carries the complete new root value.
    Changed { value: Value, debounce: bool },
}

enum RenameCommit {
    NotEditing,
    Reverted,
    Committed { from: String, to: String },
}

/// One row of the tree: local edit state seeded from the parent-supplied
/// value and resynchronized against it on every upstream change.
pub struct JsonField {
    name: String,
    pending_name: String,
    editing_name: bool,
    invalid_name: bool,
    value: Value,
    tag: TypeTag,
    path: ValuePath,
    depth: usize,
    is_root: bool,
    can_rename: bool,
    slot: Option<PathSegment>,
    first_paint_done: bool,
    children: Vec<JsonField>,
}

impl JsonField {
    pub fn new_root(ctx: &FieldContext<'_>, name: impl Into<String>, value: Value) -> Self {
        let mut field = Self {
            name: name.into(),
            pending_name: String::new(),
            editing_name: false,
            invalid_name: false,
            tag: value.type_tag(),
            value,
            path: ValuePath::root(),
            depth: 0,
            is_root: true,
            can_rename: false,
            slot: None,
            first_paint_done: false,
            children: Vec::new(),
        };
        field.sync_children(ctx);
        field
    }

    fn new_child(
        ctx: &FieldContext<'_>,
        slot: PathSegment,
        name: String,
        value: Value,
        path: ValuePath,
        depth: usize,
    ) -> Self {
        let can_rename = matches!(slot, PathSegment::Key(_));
        let mut field = Self {
            name,
            pending_name: String::new(),
            editing_name: false,
            invalid_name: false,
            tag: value.type_tag(),
            value,
            path,
            depth,
            is_root: false,
            can_rename,
            slot: Some(slot),
            first_paint_done: false,
            children: Vec::new(),
        };
        field.sync_children(ctx);
        field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_editing_name(&self) -> bool {
        self.editing_name
    }

    /// Resynchronize against the parent-supplied value; the parent's data
    /// is the source of truth, local edit state survives.
    pub fn sync(&mut self, ctx: &FieldContext<'_>, name: String, value: Value) {
        self.sync_at(ctx, name, value, self.path.clone(), self.depth);
    }

    fn sync_at(
        &mut self,
        ctx: &FieldContext<'_>,
        name: String,
        value: Value,
        path: ValuePath,
        depth: usize,
    ) {
        self.name = name;
        self.path = path;
        self.depth = depth;
        self.value = value;
        self.tag = self.value.type_tag();
        self.sync_children(ctx);
    }

    /// Rebuild child controllers from the current value. Hidden keys and
    /// filtered paths get no controller at all — the slot is skipped, not
    /// removed from the underlying structure. Surviving controllers are
    /// reused by slot so their transient state carries across syncs.
    fn sync_children(&mut self, ctx: &FieldContext<'_>) {
        let mut slots: Vec<(PathSegment, String, Value)> = Vec::new();
        match &self.value {
            Value::Object(map) => {
                for (key, child) in map {
                    if ctx.config.is_hidden_key(key) {
                        continue;
                    }
                    slots.push((PathSegment::Key(key.clone()), key.clone(), child.clone()));
                }
            }
            Value::List(list) => {
                for (index, child) in list.iter().enumerate() {
                    let name = ctx.config.item_name(index, Some(self.name.as_str()));
                    slots.push((PathSegment::Index(index), name, child.clone()));
                }
            }
            _ => {}
        }

        let mut old = std::mem::take(&mut self.children);
        let mut next = Vec::with_capacity(slots.len());
        for (slot, name, value) in slots {
            let path = match &slot {
                PathSegment::Key(key) => self.path.child_key(key.clone()),
                PathSegment::Index(index) => self.path.child_index(*index),
            };
            if !ctx.filter.allows(path.to_string().as_str()) {
                continue;
            }
            match old
                .iter()
                .position(|child| child.slot.as_ref() == Some(&slot))
            {
                Some(found) => {
                    let mut child = old.swap_remove(found);
                    child.sync_at(ctx, name, value, path, self.depth + 1);
                    next.push(child);
                }
                None => next.push(Self::new_child(ctx, slot, name, value, path, self.depth + 1)),
            }
        }
        self.children = next;
    }

    /// One update cycle: a freshly mounted node completes its first paint,
    /// so its children become reportable on the next pass. Returns whether
    /// any node advanced.
    pub fn advance_paint(&mut self) -> bool {
        if !self.first_paint_done {
            self.first_paint_done = true;
            return true;
        }
        let mut changed = false;
        for child in &mut self.children {
            changed |= child.advance_paint();
        }
        changed
    }

    /// Dispatch an edit to the row at `target` (relative to this node).
    /// Edits the parent applies on a child's behalf — rename validation
    /// and commit, delete, duplicate — are intercepted one level up, where
    /// the sibling container lives.
    pub fn apply(
        &mut self,
        ctx: &FieldContext<'_>,
        target: &[PathSegment],
        edit: FieldEdit,
    ) -> FieldOutcome {
        if target.is_empty() {
            return self.apply_here(ctx, edit);
        }
        if target.len() == 1 {
            match edit {
                FieldEdit::NameInput(_)
                | FieldEdit::CommitRename
                | FieldEdit::Delete
                | FieldEdit::Duplicate
                | FieldEdit::InsertAfter => {
                    return self.apply_to_child(ctx, &target[0], edit);
                }
                _ => {}
            }
        }
        let Some(position) = self.child_position(&target[0]) else {
            return FieldOutcome::Ignored;
        };
        match self.children[position].apply(ctx, &target[1..], edit) {
            FieldOutcome::Changed { value, debounce } => {
                let next = self.replace_slot(&target[0], value);
                self.adopt(ctx, next);
                FieldOutcome::Changed {
                    value: self.value.clone(),
                    debounce,
                }
            }
            other => other,
        }
    }

    fn apply_here(&mut self, ctx: &FieldContext<'_>, edit: FieldEdit) -> FieldOutcome {
        match edit {
            FieldEdit::SetValue { value, debounce } => {
                if !self.is_root && ctx.config.is_locked(self.name.as_str()) {
                    return FieldOutcome::Ignored;
                }
                self.adopt(ctx, value);
                FieldOutcome::Changed {
                    value: self.value.clone(),
                    debounce,
                }
            }
            FieldEdit::SetType(choice) => {
                if !self.is_root && ctx.config.is_locked(self.name.as_str()) {
                    return FieldOutcome::Ignored;
                }
                let coerce_ctx = CoerceContext {
                    name: Some(self.name.as_str()),
                    new_key_default: ctx.config.new_key_default.as_str(),
                    name_for_item: ctx.config.name_for_item.as_deref(),
                };
                let (next, tag) = transform::coerce(&self.value, self.tag, &choice, &coerce_ctx);
                self.adopt(ctx, next);
                self.tag = tag;
                FieldOutcome::Changed {
                    value: self.value.clone(),
                    debounce: false,
                }
            }
            FieldEdit::BeginRename => {
                if self.is_root
                    || !self.can_rename
                    || ctx.config.is_locked(self.name.as_str())
                {
                    return FieldOutcome::Ignored;
                }
                self.editing_name = true;
                self.invalid_name = false;
                self.pending_name = self.name.clone();
                FieldOutcome::Local
            }
            FieldEdit::CancelRename => {
                if !self.editing_name {
                    return FieldOutcome::Ignored;
                }
                self.editing_name = false;
                self.invalid_name = false;
                self.pending_name.clear();
                FieldOutcome::Local
            }
            FieldEdit::InsertAfter => {
                let next = match &self.value {
                    Value::Object(map) => {
                        let key =
                            transform::generate_key(ctx.config.new_key_default.as_str(), map);
                        let mut map = map.clone();
                        map.insert(key, Value::Text(ctx.config.new_value_default.clone()));
                        Value::Object(map)
                    }
                    Value::List(list) => {
                        let mut list = list.clone();
                        list.push(Value::Text(ctx.config.new_value_default.clone()));
                        Value::List(list)
                    }
                    _ => return FieldOutcome::Ignored,
                };
                self.adopt(ctx, next);
                FieldOutcome::Changed {
                    value: self.value.clone(),
                    debounce: false,
                }
            }
            // rename commit, delete and duplicate are applied by the
            // parent; the root has no parent and refuses them
            _ => FieldOutcome::Ignored,
        }
    }

    fn apply_to_child(
        &mut self,
        ctx: &FieldContext<'_>,
        slot: &PathSegment,
        edit: FieldEdit,
    ) -> FieldOutcome {
        match edit {
            FieldEdit::NameInput(text) => {
                let collides = match &self.value {
                    Value::Object(map) => map.contains_key(text.as_str()),
                    _ => false,
                };
                let Some(position) = self.child_position(slot) else {
                    return FieldOutcome::Ignored;
                };
                self.children[position].name_input(text, collides);
                FieldOutcome::Local
            }
            FieldEdit::CommitRename => {
                let Some(position) = self.child_position(slot) else {
                    return FieldOutcome::Ignored;
                };
                match self.children[position].take_rename() {
                    RenameCommit::NotEditing => FieldOutcome::Ignored,
                    RenameCommit::Reverted => FieldOutcome::Local,
                    RenameCommit::Committed { from, to } => {
                        let Value::Object(map) = &self.value else {
                            return FieldOutcome::Local;
                        };
                        let next = Value::Object(transform::rename_key(map, &from, &to));
                        // re-key the controller so the sync that follows
                        // finds it under its new slot
                        self.children[position].slot = Some(PathSegment::Key(to));
                        self.adopt(ctx, next);
                        FieldOutcome::Changed {
                            value: self.value.clone(),
                            debounce: false,
                        }
                    }
                }
            }
            FieldEdit::Delete => {
                // a container is never emptied through this control
                if self.value.child_count() <= 1 {
                    return FieldOutcome::Ignored;
                }
                let next = match (&self.value, slot) {
                    (Value::Object(map), PathSegment::Key(key)) => {
                        let mut map = map.clone();
                        if map.shift_remove(key.as_str()).is_none() {
                            return FieldOutcome::Ignored;
                        }
                        Value::Object(map)
                    }
                    (Value::List(list), PathSegment::Index(index)) if *index < list.len() => {
                        let mut list = list.clone();
                        list.remove(*index);
                        Value::List(list)
                    }
                    _ => return FieldOutcome::Ignored,
                };
                self.adopt(ctx, next);
                FieldOutcome::Changed {
                    value: self.value.clone(),
                    debounce: false,
                }
            }
            FieldEdit::Duplicate => {
                let next = match (&self.value, slot) {
                    (Value::Object(map), PathSegment::Key(key)) => {
                        let Some(source) = map.get(key.as_str()) else {
                            return FieldOutcome::Ignored;
                        };
                        let new_key = transform::generate_key(key, map);
                        Value::Object(transform::insert_key_value_after(
                            map,
                            key,
                            new_key,
                            source.clone(),
                        ))
                    }
                    (Value::List(list), PathSegment::Index(index)) if *index < list.len() => {
                        let mut out = list.clone();
                        out.insert(index + 1, list[*index].clone());
                        Value::List(out)
                    }
                    _ => return FieldOutcome::Ignored,
                };
                self.adopt(ctx, next);
                FieldOutcome::Changed {
                    value: self.value.clone(),
                    debounce: false,
                }
            }
            FieldEdit::InsertAfter => {
                let seed = Value::Text(ctx.config.new_value_default.clone());
                let next = match (&self.value, slot) {
                    (Value::Object(map), PathSegment::Key(key)) => {
                        let new_key =
                            transform::generate_key(ctx.config.new_key_default.as_str(), map);
                        Value::Object(transform::insert_key_value_after(map, key, new_key, seed))
                    }
                    (Value::List(list), PathSegment::Index(index)) if *index < list.len() => {
                        let mut out = list.clone();
                        out.insert(index + 1, seed);
                        Value::List(out)
                    }
                    _ => return FieldOutcome::Ignored,
                };
                self.adopt(ctx, next);
                FieldOutcome::Changed {
                    value: self.value.clone(),
                    debounce: false,
                }
            }
            _ => FieldOutcome::Ignored,
        }
    }

    fn name_input(&mut self, text: String, collides: bool) {
        if !self.editing_name {
            return;
        }
        self.invalid_name = text.is_empty() || (text != self.name && collides);
        self.pending_name = text;
    }

    fn take_rename(&mut self) -> RenameCommit {
        if !self.editing_name {
            return RenameCommit::NotEditing;
        }
        self.editing_name = false;
        if self.invalid_name {
            self.invalid_name = false;
            self.pending_name.clear();
            return RenameCommit::Reverted;
        }
        let to = std::mem::take(&mut self.pending_name);
        let from = std::mem::replace(&mut self.name, to.clone());
        RenameCommit::Committed { from, to }
    }

    fn adopt(&mut self, ctx: &FieldContext<'_>, next: Value) {
        self.value = next;
        self.tag = self.value.type_tag();
        self.sync_children(ctx);
    }

    fn child_position(&self, slot: &PathSegment) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.slot.as_ref() == Some(slot))
    }

    fn replace_slot(&self, slot: &PathSegment, value: Value) -> Value {
        match (&self.value, slot) {
            (Value::Object(map), PathSegment::Key(key)) => {
                let mut map = map.clone();
                map.insert(key.clone(), value);
                Value::Object(map)
            }
            (Value::List(list), PathSegment::Index(index)) => {
                Value::List(transform::replace_in_list(list, *index, value))
            }
            _ => value,
        }
    }

    /// Flatten the visible subtree into render rows. A node that has not
    /// completed its first paint reports zero children regardless of
    /// content.
    pub fn collect_rows(&self, ctx: &FieldContext<'_>, can_delete: bool, out: &mut Vec<Row>) {
        let locked = !self.is_root && ctx.config.is_locked(self.name.as_str());
        let name = if self.editing_name {
            self.pending_name.clone()
        } else {
            self.name.clone()
        };
        out.push(Row {
            path: self.path.to_string(),
            depth: self.depth,
            name,
            tag: self.tag,
            cell: self.value_cell(ctx),
            child_count: self.value.child_count(),
            is_root: self.is_root,
            locked,
            can_rename: self.can_rename && !locked,
            editing_name: self.editing_name,
            invalid_name: self.invalid_name,
            can_delete: can_delete && !self.is_root && !locked,
            can_duplicate: !self.is_root && !locked,
        });
        if !self.first_paint_done {
            return;
        }
        let child_can_delete = self.value.child_count() > 1;
        for child in &self.children {
            child.collect_rows(ctx, child_can_delete, out);
        }
    }

    fn value_cell(&self, ctx: &FieldContext<'_>) -> ValueCell {
        match &self.value {
            Value::Object(map) => ValueCell::Summary(match &ctx.config.value_for_object {
                Some(summary) => summary(map),
                None => format!("({} items)", map.len()),
            }),
            Value::List(list) => ValueCell::Summary(match &ctx.config.value_for_list {
                Some(summary) => summary(list),
                None => format!("({} items)", list.len()),
            }),
            Value::Text(text) => ValueCell::Text(text.clone()),
            Value::Number(number) => ValueCell::Number(*number),
            Value::Bool(flag) => ValueCell::Bool(*flag),
            Value::None => ValueCell::Null,
        }
    }
}

/// Flat render descriptor for one visible line of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub path: String,
    pub depth: usize,
    pub name: String,
    pub tag: TypeTag,
    pub cell: ValueCell,
    pub child_count: usize,
    pub is_root: bool,
    pub locked: bool,
    pub can_rename: bool,
    pub editing_name: bool,
    pub invalid_name: bool,
    pub can_delete: bool,
    pub can_duplicate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueCell {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Summary(String),
}

/// Selector options for a row: `Child` when a container has exactly one
/// entry, `Parse` for strings, then the six tags.
pub fn type_choices(row: &Row) -> Vec<TypeChoice> {
    let mut out = Vec::new();
    if matches!(row.tag, TypeTag::Array | TypeTag::Object) && row.child_count == 1 {
        out.push(TypeChoice::Child);
    }
    if row.tag == TypeTag::String {
        out.push(TypeChoice::Parse);
    }
    out.extend(TypeTag::ALL.map(TypeChoice::Tag));
    out
}
