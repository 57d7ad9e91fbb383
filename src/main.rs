use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jsonedit::terminal::{KeyCode, KeyModifiers, Terminal, TerminalEvent};
use jsonedit::ui::span::Span;
use jsonedit::ui::style::{Color, Style};
use jsonedit::{EditorConfig, JsonEditor, TypeTag, Value};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
    }
}

fn run() -> io::Result<()> {
    let mut terminal = Terminal::new();
    terminal.enter()?;
    let result = event_loop(&mut terminal);
    terminal.exit()?;
    result
}

fn sample_value() -> Value {
    Value::from_json_text(
        r#"{
            "name": "James",
            "gender": "male",
            "age": 26,
            "student": false,
            "friends": [
                {"name": "Minsu", "gender": "female", "age": 24, "student": true},
                {"name": "Mark", "gender": "male", "age": 32, "student": false}
            ]
        }"#,
    )
    .expect("demo document is valid json")
}

fn event_loop(terminal: &mut Terminal) -> io::Result<()> {
    let last_change: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
    let seen = last_change.clone();

    let config = EditorConfig::new()
        .with_root_name("Data")
        .with_locked_keys(vec!["gender".to_string()])
        .with_type_background(TypeTag::String, Color::Green)
        .with_type_background(TypeTag::Number, Color::Tomato)
        .with_type_background(TypeTag::Boolean, Color::Orange)
        .with_type_color(TypeTag::String, Color::White)
        .with_type_color(TypeTag::Number, Color::White)
        .with_name_for_item(|index, _| format!("entry {}", index + 1))
        .with_value_for_list(|list| format!("({} entries)", list.len()))
        .with_value_for_object(|map| format!("({} entries)", map.len()));

    let mut editor = JsonEditor::new("demo", sample_value())
        .with_config(config)
        .with_on_change(move |value| {
            if let Ok(mut slot) = seen.lock() {
                *slot = value.to_json_text();
            }
        });

    let mut render_requested = true;
    loop {
        if terminal.poll(Duration::from_millis(100))? {
            match terminal.read_event()? {
                Some(TerminalEvent::Key(key)) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('q')
                    {
                        break;
                    }
                    editor.on_key(key);
                    render_requested = true;
                }
                Some(TerminalEvent::Resize { .. }) => render_requested = true,
                None => {}
            }
        }

        if editor.tick() {
            render_requested = true;
        }

        if render_requested {
            let mut lines = editor.draw();
            lines.push(Vec::new());
            let emitted = last_change
                .lock()
                .map(|slot| slot.clone())
                .unwrap_or_default();
            if !emitted.is_empty() {
                lines.push(vec![
                    Span::styled("last change: ", Style::new().color(Color::DarkGrey)),
                    Span::new(emitted),
                ]);
            }
            lines.push(vec![Span::styled(
                "Ctrl+Q quit",
                Style::new().color(Color::DarkGrey),
            )]);
            terminal.draw(&lines)?;
            render_requested = false;
        }
    }
    Ok(())
}
