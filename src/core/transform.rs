use indexmap::IndexMap;

use crate::core::value::{TypeTag, Value, display_number};

/// Names an array item for display and for array→object key derivation.
/// Receives the item index and the parent row's name.
pub type ItemNamer = dyn Fn(usize, Option<&str>) -> String + Send + Sync;

/// Selector vocabulary: the six type tags plus the two pseudo-actions.
/// `Child` is offered only when a container has exactly one entry, `Parse`
/// only when the current tag is `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChoice {
    Tag(TypeTag),
    Child,
    Parse,
}

impl TypeChoice {
    pub fn label(&self) -> String {
        match self {
            Self::Tag(tag) => tag.to_string(),
            Self::Child => "child".to_string(),
            Self::Parse => "parse".to_string(),
        }
    }
}

/// One level structural copy preserving type; primitives pass through.
pub fn structural_copy(value: &Value) -> Value {
    match value {
        Value::List(list) => Value::List(list.clone()),
        Value::Object(map) => Value::Object(map.clone()),
        other => other.clone(),
    }
}

/// New sequence equal to `list` except `index`; the input is untouched.
pub fn replace_in_list(list: &[Value], index: usize, value: Value) -> Vec<Value> {
    let mut out = list.to_vec();
    if index < out.len() {
        out[index] = value;
    }
    out
}

/// Rebuild `map` with `old_key` renamed to `new_key` at its original
/// position; the order of unrelated keys is unchanged.
pub fn rename_key(map: &IndexMap<String, Value>, old_key: &str, new_key: &str) -> IndexMap<String, Value> {
    map.iter()
        .map(|(key, value)| {
            if key == old_key {
                (new_key.to_string(), value.clone())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

/// `base` when free, else `base1`, `base2`, … the first free integer
/// suffix.
pub fn generate_key(base: &str, map: &IndexMap<String, Value>) -> String {
    let mut key = base.to_string();
    let mut index = 1usize;
    while map.contains_key(&key) {
        key = format!("{base}{index}");
        index += 1;
    }
    key
}

pub fn insert_key_value_at(
    map: &IndexMap<String, Value>,
    index: usize,
    key: String,
    value: Value,
) -> IndexMap<String, Value> {
    let mut out = IndexMap::with_capacity(map.len() + 1);
    for (position, (existing_key, existing_value)) in map.iter().enumerate() {
        if position == index {
            out.insert(key.clone(), value.clone());
        }
        out.insert(existing_key.clone(), existing_value.clone());
    }
    if index >= map.len() {
        out.insert(key, value);
    }
    out
}

/// Insert `key: value` immediately after `ref_key`; at the end of the map
/// when `ref_key` is absent.
pub fn insert_key_value_after(
    map: &IndexMap<String, Value>,
    ref_key: &str,
    key: String,
    value: Value,
) -> IndexMap<String, Value> {
    let index = map
        .get_index_of(ref_key)
        .map(|idx| idx + 1)
        .unwrap_or(map.len());
    insert_key_value_at(map, index, key, value)
}

/// Normalize a formatter-produced label to an identifier-like camelCase
/// key; digit runs merge without a separator (`"entry 1"` → `"entry1"`).
pub fn camel_key(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut boundary = false;
    for ch in label.chars() {
        if !ch.is_alphanumeric() {
            boundary = !out.is_empty();
            continue;
        }
        if ch.is_ascii_digit() {
            out.push(ch);
            boundary = false;
        } else if out.is_empty() || !boundary {
            out.extend(ch.to_lowercase());
            boundary = false;
        } else {
            out.extend(ch.to_uppercase());
            boundary = false;
        }
    }
    out
}

/// Context a coercion runs in: the row's own name (used as the parent key
/// for item naming) and the configured defaults.
pub struct CoerceContext<'a> {
    pub name: Option<&'a str>,
    pub new_key_default: &'a str,
    pub name_for_item: Option<&'a ItemNamer>,
}

impl Default for CoerceContext<'_> {
    fn default() -> Self {
        Self {
            name: None,
            new_key_default: "newKey",
            name_for_item: None,
        }
    }
}

/// Deterministic coercion of `value` to the selected type choice.
///
/// Every arm is total: unparseable input reverts (`Parse`), not-a-number
/// normalizes to `0`, and the object arm falls back to wrapping the whole
/// value under the default key. Returns the new value and its tag.
pub fn coerce(
    value: &Value,
    current: TypeTag,
    choice: &TypeChoice,
    ctx: &CoerceContext<'_>,
) -> (Value, TypeTag) {
    let (next, tag) = match choice {
        TypeChoice::Tag(TypeTag::Number) => {
            (Value::Number(number_of(value)), TypeTag::Number)
        }
        TypeChoice::Tag(TypeTag::Boolean) => (Value::Bool(truthy(value)), TypeTag::Boolean),
        TypeChoice::Tag(TypeTag::Null) => (Value::None, TypeTag::Null),
        TypeChoice::Tag(TypeTag::String) => (Value::Text(text_of(value)), TypeTag::String),
        TypeChoice::Tag(TypeTag::Array) => (Value::List(list_of(value)), TypeTag::Array),
        TypeChoice::Tag(TypeTag::Object) => (object_of(value, ctx), TypeTag::Object),
        TypeChoice::Child => {
            let child = first_child(value);
            let tag = child.type_tag();
            (child, tag)
        }
        TypeChoice::Parse => match value {
            Value::Text(text) => match Value::from_json_text(text) {
                Ok(parsed) => {
                    let tag = parsed.type_tag();
                    (parsed, tag)
                }
                Err(_) => (value.clone(), current),
            },
            other => (other.clone(), current),
        },
    };

    match next {
        Value::Number(number) if number.is_nan() => (Value::Number(0.0), tag),
        next => (next, tag),
    }
}

fn number_of(value: &Value) -> f64 {
    match value {
        Value::None => 0.0,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(number) => *number,
        Value::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::List(_) | Value::Object(_) => f64::NAN,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::None => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => *number != 0.0 && !number.is_nan(),
        Value::Text(text) => !text.is_empty(),
        Value::List(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::None => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => display_number(*number),
        Value::Text(text) => text.clone(),
        container => container.to_json_text(),
    }
}

fn list_of(value: &Value) -> Vec<Value> {
    match value {
        Value::List(list) => list.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        scalar => vec![scalar.clone()],
    }
}

fn first_child(value: &Value) -> Value {
    match value {
        Value::List(list) => list.first().cloned().unwrap_or(Value::None),
        Value::Object(map) => map
            .values()
            .next()
            .cloned()
            .unwrap_or(Value::None),
        _ => Value::None,
    }
}

fn object_of(value: &Value, ctx: &CoerceContext<'_>) -> Value {
    if let Value::List(list) = value {
        let mut out = IndexMap::with_capacity(list.len());
        for (index, item) in list.iter().enumerate() {
            let key = match ctx.name_for_item {
                Some(namer) => camel_key(&namer(index, ctx.name)),
                None => format!("{}{}", ctx.new_key_default, index + 1),
            };
            out.insert(key, item.clone());
        }
        return Value::Object(out);
    }
    let mut out = IndexMap::with_capacity(1);
    out.insert(ctx.new_key_default.to_string(), value.clone());
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{TypeTag, Value};
    use indexmap::IndexMap;

    fn map_of(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn structural_copy_preserves_type_and_entries() {
        let map = map_of(&[("a", Value::Number(1.0))]);
        assert_eq!(
            structural_copy(&Value::Object(map.clone())),
            Value::Object(map)
        );
        assert_eq!(
            structural_copy(&Value::List(vec![Value::None])),
            Value::List(vec![Value::None])
        );
        assert_eq!(structural_copy(&Value::Number(2.0)), Value::Number(2.0));
    }

    #[test]
    fn replace_in_list_leaves_input_untouched() {
        let list = vec![Value::Number(1.0), Value::Number(2.0)];
        let out = replace_in_list(&list, 1, Value::Text("x".into()));
        assert_eq!(out[1], Value::Text("x".into()));
        assert_eq!(list[1], Value::Number(2.0));
    }

    #[test]
    fn rename_key_keeps_relative_position() {
        let map = map_of(&[
            ("a", Value::Number(1.0)),
            ("b", Value::Number(2.0)),
            ("c", Value::Number(3.0)),
        ]);
        let renamed = rename_key(&map, "b", "mid");
        let keys: Vec<&str> = renamed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "mid", "c"]);
        assert_eq!(renamed["mid"], Value::Number(2.0));
    }

    #[test]
    fn generate_key_picks_first_free_suffix() {
        let map = map_of(&[("item", Value::None), ("item1", Value::None)]);
        assert_eq!(generate_key("item", &map), "item2");
        assert_eq!(generate_key("fresh", &map), "fresh");
    }

    #[test]
    fn insert_after_lands_behind_the_reference_key() {
        let map = map_of(&[("a", Value::None), ("b", Value::None)]);
        let out = insert_key_value_after(&map, "a", "a1".into(), Value::Bool(true));
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "a1", "b"]);

        let appended = insert_key_value_after(&map, "missing", "z".into(), Value::None);
        let keys: Vec<&str> = appended.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "z"]);
    }

    #[test]
    fn camel_key_merges_digits_and_capitalizes_words() {
        assert_eq!(camel_key("entry 1"), "entry1");
        assert_eq!(camel_key("Entry Point"), "entryPoint");
        assert_eq!(camel_key("x--y_z"), "xYZ");
    }

    #[test]
    fn parse_round_trips_through_string() {
        let ctx = CoerceContext::default();
        let text = Value::Text(r#"{"a":1}"#.into());
        let (parsed, tag) = coerce(&text, TypeTag::String, &TypeChoice::Parse, &ctx);
        assert_eq!(tag, TypeTag::Object);
        let map = map_of(&[("a", Value::Number(1.0))]);
        assert_eq!(parsed, Value::Object(map));

        let (back, tag) = coerce(
            &parsed,
            TypeTag::Object,
            &TypeChoice::Tag(TypeTag::String),
            &ctx,
        );
        assert_eq!(tag, TypeTag::String);
        assert_eq!(back, Value::Text(r#"{"a":1}"#.into()));
    }

    #[test]
    fn parse_failure_reverts_value_and_tag() {
        let ctx = CoerceContext::default();
        let text = Value::Text("not json".into());
        let (value, tag) = coerce(&text, TypeTag::String, &TypeChoice::Parse, &ctx);
        assert_eq!(value, text);
        assert_eq!(tag, TypeTag::String);
    }

    #[test]
    fn number_coercion_normalizes_nan_to_zero() {
        let ctx = CoerceContext::default();
        let (value, tag) = coerce(
            &Value::Text("abc".into()),
            TypeTag::String,
            &TypeChoice::Tag(TypeTag::Number),
            &ctx,
        );
        assert_eq!(tag, TypeTag::Number);
        assert_eq!(value, Value::Number(0.0));

        let (value, _) = coerce(
            &Value::Text("2.5".into()),
            TypeTag::String,
            &TypeChoice::Tag(TypeTag::Number),
            &ctx,
        );
        assert_eq!(value, Value::Number(2.5));
    }

    #[test]
    fn boolean_coercion_follows_truthiness() {
        let ctx = CoerceContext::default();
        for (input, expected) in [
            (Value::None, false),
            (Value::Text(String::new()), false),
            (Value::Text("x".into()), true),
            (Value::Number(0.0), false),
            (Value::Number(3.0), true),
            (Value::Object(IndexMap::new()), true),
        ] {
            let (value, _) = coerce(
                &input,
                input.type_tag(),
                &TypeChoice::Tag(TypeTag::Boolean),
                &ctx,
            );
            assert_eq!(value, Value::Bool(expected), "input {input:?}");
        }
    }

    #[test]
    fn child_adopts_the_single_entry() {
        let ctx = CoerceContext::default();
        let map = map_of(&[("only", Value::Text("inner".into()))]);
        let (value, tag) = coerce(
            &Value::Object(map),
            TypeTag::Object,
            &TypeChoice::Child,
            &ctx,
        );
        assert_eq!(value, Value::Text("inner".into()));
        assert_eq!(tag, TypeTag::String);
    }

    #[test]
    fn array_coercion_wraps_scalars_and_unwraps_objects() {
        let ctx = CoerceContext::default();
        let (wrapped, _) = coerce(
            &Value::Number(7.0),
            TypeTag::Number,
            &TypeChoice::Tag(TypeTag::Array),
            &ctx,
        );
        assert_eq!(wrapped, Value::List(vec![Value::Number(7.0)]));

        let map = map_of(&[("a", Value::Number(1.0)), ("b", Value::Number(2.0))]);
        let (values, _) = coerce(
            &Value::Object(map),
            TypeTag::Object,
            &TypeChoice::Tag(TypeTag::Array),
            &ctx,
        );
        assert_eq!(
            values,
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)])
        );
    }

    #[test]
    fn object_coercion_derives_keys_per_item() {
        let namer = |index: usize, _parent: Option<&str>| format!("entry {}", index + 1);
        let ctx = CoerceContext {
            name: Some("friends"),
            new_key_default: "newKey",
            name_for_item: Some(&namer),
        };
        let list = Value::List(vec![Value::Number(1.0), Value::Number(2.0)]);
        let (value, _) = coerce(&list, TypeTag::Array, &TypeChoice::Tag(TypeTag::Object), &ctx);
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["entry1", "entry2"]);
    }

    #[test]
    fn object_coercion_without_namer_numbers_the_default_key() {
        let ctx = CoerceContext::default();
        let list = Value::List(vec![Value::None, Value::None]);
        let (value, _) = coerce(&list, TypeTag::Array, &TypeChoice::Tag(TypeTag::Object), &ctx);
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["newKey1", "newKey2"]);
    }

    #[test]
    fn object_coercion_fallback_wraps_under_default_key() {
        let ctx = CoerceContext::default();
        let (value, _) = coerce(
            &Value::Text("plain".into()),
            TypeTag::String,
            &TypeChoice::Tag(TypeTag::Object),
            &ctx,
        );
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        assert_eq!(map.get("newKey"), Some(&Value::Text("plain".into())));
    }
}
