use unicode_width::UnicodeWidthStr;

use super::{JsonEditor, Mode};
use crate::core::value::display_number;
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::config::ActionKind;
use crate::widgets::field::{Row, ValueCell};

const TYPE_COLUMN: usize = 10;

impl JsonEditor {
    /// Render the table: optional filter line, fixed Key/Type/Value
    /// header, then one line per visible row.
    pub fn draw(&self) -> Vec<SpanLine> {
        let mut lines = Vec::new();
        let dim = Style::new().color(Color::DarkGrey);

        if matches!(self.mode, Mode::Query) || !self.query.is_empty() {
            let mut line = vec![Span::styled("Filter: ", dim)];
            line.push(Span::new(self.query.clone()));
            if matches!(self.mode, Mode::Query) {
                line.push(Span::styled("▏", Style::new().color(Color::Yellow)));
            }
            lines.push(line);
        }

        let key_width = self.key_column_width();
        let mut header = vec![Span::styled(pad("  Key", key_width), dim)];
        if self.config.show_type {
            header.push(Span::styled(pad("Type", TYPE_COLUMN), dim));
        }
        header.push(Span::styled("Value", dim));
        lines.push(header);

        for (index, row) in self.rows.iter().enumerate() {
            lines.push(self.draw_row(row, index == self.active, key_width));
        }

        lines.push(vec![Span::styled(
            "↑↓ move · e edit · r rename · t type · a duplicate · i insert · d delete · / filter",
            dim,
        )]);
        lines
    }

    fn draw_row(&self, row: &Row, active: bool, key_width: usize) -> SpanLine {
        let dim = Style::new().color(Color::DarkGrey);
        let mut line = Vec::new();

        line.push(if active {
            Span::styled("❯ ", Style::new().color(Color::Yellow))
        } else {
            Span::styled("  ", dim)
        });

        let mut used = 2usize;
        let indent = "  ".repeat(row.depth);
        used += indent.width();
        line.push(Span::styled(indent, dim));

        let name_style = if row.editing_name {
            if row.invalid_name {
                Style::new().color(Color::Red).bold()
            } else {
                Style::new().color(Color::Yellow).bold()
            }
        } else if row.locked {
            dim
        } else if active {
            Style::new().color(Color::Cyan).bold()
        } else {
            Style::default()
        };
        let name = if row.editing_name {
            format!("{}▏", row.name)
        } else {
            row.name.clone()
        };
        used += name.width();
        line.push(Span::styled(name, name_style));

        for span in self.action_spans(row) {
            used += span.text.width();
            line.push(span);
        }

        line.push(Span::new(" ".repeat(key_width.saturating_sub(used))));

        if self.config.show_type {
            line.push(self.draw_type_cell(row, active));
        }
        line.push(self.draw_value_cell(row, active));
        line
    }

    fn draw_type_cell(&self, row: &Row, active: bool) -> Span {
        if active {
            if let Mode::SelectType { options, selected } = &self.mode {
                let label = options
                    .get(*selected)
                    .map(|choice| choice.label())
                    .unwrap_or_default();
                return Span::styled(
                    pad(format!("◂{label}▸"), TYPE_COLUMN),
                    Style::new().color(Color::Yellow).bold(),
                );
            }
        }
        let style = if row.locked {
            Style::new().color(Color::DarkGrey)
        } else {
            Style::new().color(Color::Blue)
        };
        Span::styled(pad(row.tag.to_string(), TYPE_COLUMN), style)
    }

    fn draw_value_cell(&self, row: &Row, active: bool) -> Span {
        if active {
            if let Mode::EditValue { buffer } = &self.mode {
                return Span::styled(
                    format!("{buffer}▏"),
                    Style::new().color(Color::Yellow),
                );
            }
        }
        let mut style = Style::default();
        if let Some(color) = self.config.type_colors.get(&row.tag) {
            style = style.color(*color);
        }
        if let Some(color) = self.config.type_backgrounds.get(&row.tag) {
            style = style.background(*color);
        }
        let text = match &row.cell {
            ValueCell::Null => "null".to_string(),
            ValueCell::Bool(flag) => {
                if *flag {
                    "[x] true".to_string()
                } else {
                    "[ ] false".to_string()
                }
            }
            ValueCell::Number(number) => display_number(*number),
            ValueCell::Text(text) => text.clone(),
            ValueCell::Summary(summary) => summary.clone(),
        };
        if style == Style::default()
            && matches!(row.cell, ValueCell::Null | ValueCell::Summary(_))
        {
            style = Style::new().color(Color::DarkGrey);
        }
        Span::styled(text, style)
    }

    /// Delete/duplicate controls for a row, through the host's renderer
    /// when one is configured. Controls are hidden on the root and on
    /// locked rows; the delete control renders disabled rather than
    /// vanishing when the row is the container's last entry.
    fn action_spans(&self, row: &Row) -> Vec<Span> {
        if !row.can_duplicate {
            return Vec::new();
        }
        let render = |kind, disabled: bool| match &self.config.render_action {
            Some(renderer) => renderer(kind, disabled),
            None => {
                let glyph = match kind {
                    ActionKind::Delete => {
                        if disabled {
                            " ·"
                        } else {
                            " –"
                        }
                    }
                    ActionKind::Duplicate => " +",
                };
                Span::styled(glyph, Style::new().color(Color::DarkGrey))
            }
        };
        vec![
            render(ActionKind::Delete, !row.can_delete),
            render(ActionKind::Duplicate, false),
        ]
    }

    fn key_column_width(&self) -> usize {
        let widest = self
            .rows
            .iter()
            .map(|row| {
                let mut width = 2 + row.depth * 2 + row.name.width();
                if row.editing_name {
                    width += 1;
                }
                for span in self.action_spans(row) {
                    width += span.text.width();
                }
                width
            })
            .max()
            .unwrap_or(0);
        widest.max("  Key".width()) + 2
    }
}

fn pad(text: impl Into<String>, width: usize) -> String {
    let mut out = text.into();
    let used = out.width();
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::core::value::Value;
    use crate::widgets::editor::JsonEditor;

    #[test]
    fn draw_emits_header_rows_and_hint_line() {
        let value = Value::from_json_text(r#"{"a":1,"b":"x"}"#).expect("json");
        let mut editor = JsonEditor::new("editor", value);
        while editor.tick() {}

        let lines = editor.draw();
        let flat: Vec<String> = lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|span| span.text.as_str())
                    .collect::<String>()
            })
            .collect();
        assert!(flat[0].starts_with("  Key"));
        assert!(flat[0].contains("Type"));
        assert!(flat[0].contains("Value"));
        assert!(flat.iter().any(|line| line.contains("Root")));
        assert!(flat.iter().any(|line| line.contains("(2 items)")));
        assert!(flat.last().expect("hint line").contains("rename"));
    }

    #[test]
    fn custom_action_renderer_replaces_the_default_controls() {
        use crate::ui::span::Span;
        use crate::widgets::config::{ActionKind, EditorConfig};

        let config = EditorConfig::new().with_render_action(|kind, disabled| {
            Span::new(match (kind, disabled) {
                (ActionKind::Delete, false) => " [del]",
                (ActionKind::Delete, true) => " [---]",
                (ActionKind::Duplicate, _) => " [dup]",
            })
        });
        let value = Value::from_json_text(r#"{"a":1,"b":2}"#).expect("json");
        let mut editor = JsonEditor::new("editor", value).with_config(config);
        while editor.tick() {}

        let flat: Vec<String> = editor
            .draw()
            .iter()
            .map(|line| {
                line.iter()
                    .map(|span| span.text.as_str())
                    .collect::<String>()
            })
            .collect();
        assert!(flat.iter().any(|line| line.contains("[del]")));
        assert!(flat.iter().any(|line| line.contains("[dup]")));
    }

    #[test]
    fn filter_line_appears_with_an_active_query() {
        let value = Value::from_json_text(r#"{"a":1}"#).expect("json");
        let mut editor = JsonEditor::new("editor", value).with_query("a");
        while editor.tick() {}
        let lines = editor.draw();
        let first: String = lines[0].iter().map(|span| span.text.as_str()).collect();
        assert!(first.starts_with("Filter: a"));
    }
}
