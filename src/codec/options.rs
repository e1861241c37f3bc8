// ABOUTME: Option map coercion between typed values and wire scalars
// ABOUTME: Defaults are suppressed on write; absent keys keep defaults on read

use serde_json::{Map, Value};
use tracing::warn;

use super::{OptionEncoding, OptionsPlacement};
use crate::error::{RealityError, Result};
use crate::settings::{JobSettings, OptionSpec, OptionType, OptionValue};

pub(super) fn encode_options(settings: &JobSettings, encoding: OptionEncoding) -> Map<String, Value> {
    let mut encoded = Map::new();
    for (spec, value) in settings.options() {
        if value.is_default() {
            continue;
        }
        insert_path(&mut encoded, spec.name, encode_option(value, encoding));
    }
    encoded
}

pub(super) fn decode_options(
    settings: &mut JobSettings,
    container: &Map<String, Value>,
    placement: OptionsPlacement,
) -> Result<()> {
    let schema = settings.schema();

    for spec in schema.options {
        match lookup_path(container, spec.name) {
            None | Some(Value::Null) => continue,
            Some(raw) => {
                let value = decode_option(spec, raw)?;
                settings.set_option(spec.name, value)?;
            }
        }
    }

    for key in container.keys() {
        if placement == OptionsPlacement::Inline && (key == "inputs" || key == "outputs") {
            continue;
        }
        let known = schema.options.iter().any(|spec| {
            spec.name == key
                || spec
                    .name
                    .strip_prefix(key.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        });
        if !known {
            warn!(job_kind = %settings.kind(), option = %key, "Ignoring unrecognized option");
        }
    }

    Ok(())
}

fn encode_option(value: &OptionValue, encoding: OptionEncoding) -> Value {
    match (encoding, value) {
        (OptionEncoding::Strings, value) => Value::String(value.to_string()),
        (OptionEncoding::Native, OptionValue::Bool(b)) => Value::Bool(*b),
        (OptionEncoding::Native, OptionValue::Int(i)) => Value::from(*i),
        (OptionEncoding::Native, OptionValue::Float(x)) => Value::from(*x),
        (OptionEncoding::Native, OptionValue::Text(s)) => Value::String(s.clone()),
    }
}

/// Parses one wire value. Strings for non-text options are read as JSON
/// scalars, so `"10"` is 10 and `"true"` is true.
fn decode_option(spec: &OptionSpec, raw: &Value) -> Result<OptionValue> {
    let failure = || RealityError::OptionParseFailure {
        option: spec.name.to_string(),
        value: match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };

    let scalar = match raw {
        Value::String(s) if spec.ty != OptionType::Text => {
            serde_json::from_str::<Value>(s.trim()).map_err(|_| failure())?
        }
        other => other.clone(),
    };

    let value = match (spec.ty, scalar) {
        (OptionType::Bool, Value::Bool(b)) => Some(OptionValue::Bool(b)),
        (OptionType::Int, Value::Number(n)) => n.as_i64().map(OptionValue::Int),
        (OptionType::Float, Value::Number(n)) => n.as_f64().map(OptionValue::Float),
        (OptionType::Text, Value::String(s)) => Some(OptionValue::Text(s)),
        _ => None,
    };
    value.ok_or_else(failure)
}

fn lookup_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn insert_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = child {
                insert_path(inner, rest, value);
            }
        }
    }
}
