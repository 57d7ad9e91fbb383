use super::{JsonEditor, Mode};
use crate::core::transform::TypeChoice;
use crate::core::value::{TypeTag, Value, display_number};
use crate::terminal::{KeyCode, KeyEvent, KeyModifiers};
use crate::widgets::field::{FieldEdit, FieldOutcome, ValueCell, type_choices};

impl JsonEditor {
    /// Route one key event through the current mode. Returns whether the
    /// event was consumed.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('f') {
            self.mode = Mode::Query;
            return true;
        }
        match self.mode {
            Mode::Normal => self.handle_normal(key),
            Mode::EditName { .. } => self.handle_edit_name(key),
            Mode::EditValue { .. } => self.handle_edit_value(key),
            Mode::SelectType { .. } => self.handle_select_type(key),
            Mode::Query => self.handle_query(key),
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) -> bool {
        if key.modifiers != KeyModifiers::NONE {
            return false;
        }
        match key.code {
            KeyCode::Up => self.move_active(-1),
            KeyCode::Down => self.move_active(1),
            KeyCode::Char('e') | KeyCode::Enter => self.start_edit_value(),
            KeyCode::Char('r') => self.start_rename(),
            KeyCode::Char('t') => self.start_select_type(),
            KeyCode::Char('d') => self.delete_active(),
            KeyCode::Char('a') => self.duplicate_active(),
            KeyCode::Char('i') => self.insert_after_active(),
            KeyCode::Char('/') => {
                self.mode = Mode::Query;
                true
            }
            _ => false,
        }
    }

    fn start_edit_value(&mut self) -> bool {
        let cell = match self.active_row() {
            Some(row) if !row.locked => row.cell.clone(),
            _ => return false,
        };
        match cell {
            ValueCell::Text(text) => {
                self.mode = Mode::EditValue { buffer: text };
                true
            }
            ValueCell::Number(number) => {
                self.mode = Mode::EditValue {
                    buffer: display_number(number),
                };
                true
            }
            ValueCell::Bool(flag) => {
                let path = self.active_path();
                self.dispatch(
                    path.as_str(),
                    FieldEdit::SetValue {
                        value: Value::Bool(!flag),
                        debounce: false,
                    },
                );
                true
            }
            ValueCell::Null | ValueCell::Summary(_) => false,
        }
    }

    fn start_rename(&mut self) -> bool {
        let Some(row) = self.active_row() else {
            return false;
        };
        if !row.can_rename {
            return false;
        }
        let buffer = row.name.clone();
        let path = self.active_path();
        if self.dispatch(path.as_str(), FieldEdit::BeginRename) == FieldOutcome::Local {
            self.mode = Mode::EditName { buffer };
            true
        } else {
            false
        }
    }

    fn start_select_type(&mut self) -> bool {
        if !self.config.show_type {
            return false;
        }
        let Some(row) = self.active_row() else {
            return false;
        };
        if row.locked {
            return false;
        }
        let options = type_choices(row);
        let selected = options
            .iter()
            .position(|choice| *choice == TypeChoice::Tag(row.tag))
            .unwrap_or(0);
        self.mode = Mode::SelectType { options, selected };
        true
    }

    fn delete_active(&mut self) -> bool {
        let Some(row) = self.active_row() else {
            return false;
        };
        if !row.can_delete {
            return false;
        }
        let path = self.active_path();
        matches!(
            self.dispatch(path.as_str(), FieldEdit::Delete),
            FieldOutcome::Changed { .. }
        )
    }

    fn duplicate_active(&mut self) -> bool {
        let Some(row) = self.active_row() else {
            return false;
        };
        if !row.can_duplicate {
            return false;
        }
        let path = self.active_path();
        matches!(
            self.dispatch(path.as_str(), FieldEdit::Duplicate),
            FieldOutcome::Changed { .. }
        )
    }

    fn insert_after_active(&mut self) -> bool {
        let Some(row) = self.active_row() else {
            return false;
        };
        // the root accepts inserts only into a container
        if row.is_root && !matches!(row.cell, ValueCell::Summary(_)) {
            return false;
        }
        if row.locked {
            return false;
        }
        let path = self.active_path();
        matches!(
            self.dispatch(path.as_str(), FieldEdit::InsertAfter),
            FieldOutcome::Changed { .. }
        )
    }

    fn handle_edit_name(&mut self, key: KeyEvent) -> bool {
        let path = self.active_path();
        match key.code {
            KeyCode::Enter => {
                self.dispatch(path.as_str(), FieldEdit::CommitRename);
                self.mode = Mode::Normal;
                true
            }
            KeyCode::Esc => {
                self.dispatch(path.as_str(), FieldEdit::CancelRename);
                self.mode = Mode::Normal;
                true
            }
            KeyCode::Backspace => {
                let Mode::EditName { buffer } = &mut self.mode else {
                    return true;
                };
                buffer.pop();
                let text = buffer.clone();
                self.dispatch(path.as_str(), FieldEdit::NameInput(text));
                true
            }
            KeyCode::Char(ch) if key.modifiers == KeyModifiers::NONE
                || key.modifiers == KeyModifiers::SHIFT =>
            {
                let Mode::EditName { buffer } = &mut self.mode else {
                    return true;
                };
                buffer.push(ch);
                let text = buffer.clone();
                self.dispatch(path.as_str(), FieldEdit::NameInput(text));
                true
            }
            _ => true,
        }
    }

    fn handle_edit_value(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = Mode::Normal;
                true
            }
            KeyCode::Backspace => {
                self.edit_value_buffer(|buffer| {
                    buffer.pop();
                });
                true
            }
            KeyCode::Char(ch) if key.modifiers == KeyModifiers::NONE
                || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.edit_value_buffer(|buffer| buffer.push(ch));
                true
            }
            _ => true,
        }
    }

    /// Apply a buffer edit and escalate it optimistically on the debounce
    /// window, typed per the active row's tag.
    fn edit_value_buffer(&mut self, change: impl FnOnce(&mut String)) {
        let tag = match self.active_row() {
            Some(row) => row.tag,
            None => return,
        };
        let path = self.active_path();
        let Mode::EditValue { buffer } = &mut self.mode else {
            return;
        };
        change(buffer);
        let value = match tag {
            // an emptied or half-typed number field reads as zero
            TypeTag::Number => Value::Number(buffer.trim().parse::<f64>().unwrap_or(0.0)),
            _ => Value::Text(buffer.clone()),
        };
        self.dispatch(
            path.as_str(),
            FieldEdit::SetValue {
                value,
                debounce: true,
            },
        );
    }

    fn handle_select_type(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                true
            }
            KeyCode::Up | KeyCode::Left => {
                if let Mode::SelectType { options, selected } = &mut self.mode {
                    *selected = (*selected + options.len() - 1) % options.len();
                }
                true
            }
            KeyCode::Down | KeyCode::Right => {
                if let Mode::SelectType { options, selected } = &mut self.mode {
                    *selected = (*selected + 1) % options.len();
                }
                true
            }
            KeyCode::Enter => {
                let choice = match &self.mode {
                    Mode::SelectType { options, selected } => options.get(*selected).copied(),
                    _ => None,
                };
                self.mode = Mode::Normal;
                if let Some(choice) = choice {
                    let path = self.active_path();
                    self.dispatch(path.as_str(), FieldEdit::SetType(choice));
                }
                true
            }
            _ => true,
        }
    }

    fn handle_query(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = Mode::Normal;
                true
            }
            KeyCode::Backspace => {
                let mut query = self.query.clone();
                query.pop();
                self.set_query(query);
                true
            }
            KeyCode::Char(ch) if key.modifiers == KeyModifiers::NONE
                || key.modifiers == KeyModifiers::SHIFT =>
            {
                let mut query = self.query.clone();
                query.push(ch);
                self.set_query(query);
                true
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use crate::terminal::{KeyCode, KeyEvent};

    fn editor() -> JsonEditor {
        let value = Value::from_json_text(r#"{"name":"James","ok":true}"#)
            .expect("sample json should parse");
        let mut editor = JsonEditor::new("editor", value);
        while editor.tick() {}
        editor
    }

    fn press(editor: &mut JsonEditor, code: KeyCode) {
        editor.on_key(KeyEvent::plain(code));
    }

    #[test]
    fn typing_a_rename_flows_through_the_name_buffer() {
        let mut editor = editor();
        press(&mut editor, KeyCode::Down); // .name
        press(&mut editor, KeyCode::Char('r'));
        assert!(matches!(editor.mode(), Mode::EditName { .. }));

        for _ in 0..4 {
            press(&mut editor, KeyCode::Backspace);
        }
        for ch in "key".chars() {
            press(&mut editor, KeyCode::Char(ch));
        }
        press(&mut editor, KeyCode::Enter);
        assert!(matches!(editor.mode(), Mode::Normal));
        assert_eq!(
            editor.value().to_json_text(),
            r#"{"key":"James","ok":true}"#
        );
    }

    #[test]
    fn boolean_rows_toggle_immediately() {
        let mut editor = editor();
        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Down); // .ok
        press(&mut editor, KeyCode::Enter);
        assert!(matches!(editor.mode(), Mode::Normal));
        assert_eq!(
            editor.value().to_json_text(),
            r#"{"name":"James","ok":false}"#
        );
    }

    #[test]
    fn query_mode_edits_the_filter() {
        let mut editor = editor();
        press(&mut editor, KeyCode::Char('/'));
        for ch in "ok".chars() {
            press(&mut editor, KeyCode::Char(ch));
        }
        assert_eq!(editor.query(), "ok");
        while editor.tick() {}
        assert!(!editor.rows().iter().any(|row| row.path == ".name"));
        press(&mut editor, KeyCode::Esc);
        assert!(matches!(editor.mode(), Mode::Normal));
    }

    #[test]
    fn select_type_commits_the_highlighted_choice() {
        let mut editor = editor();
        press(&mut editor, KeyCode::Down); // .name (string)
        press(&mut editor, KeyCode::Char('t'));
        let Mode::SelectType { options, selected } = editor.mode() else {
            panic!("expected type selector");
        };
        assert_eq!(options[*selected], TypeChoice::Tag(TypeTag::String));

        // move to "number" and commit
        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Enter);
        assert_eq!(
            editor.value().to_json_text(),
            r#"{"name":0,"ok":true}"#
        );
    }
}
