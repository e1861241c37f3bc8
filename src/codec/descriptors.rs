// ABOUTME: Encoding of slot bindings as `{tag, id}` descriptor arrays
// ABOUTME: Tag validation is left to JobSettings so errors name the job kind

use serde_json::{Map, Value};

use super::DescriptorKeys;
use crate::error::{RealityError, Result};

pub(super) fn encode_descriptors<'a>(
    bound: impl Iterator<Item = (&'static str, &'a str)>,
    keys: &DescriptorKeys,
) -> Vec<Value> {
    bound
        .map(|(name, id)| {
            let mut entry = Map::new();
            if let Some(tag_key) = keys.tag {
                entry.insert(tag_key.to_string(), Value::from(name));
            }
            entry.insert(keys.id.to_string(), Value::from(id));
            Value::Object(entry)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub(super) enum Role {
    /// Untagged input descriptors bind to the given slot.
    Input(Option<&'static str>),
    Output,
}

/// Reads `(tag, id)` pairs in wire order.
///
/// Bare strings are accepted for outputs only and bind the slot to its own
/// name, as does an output descriptor whose id the server has not assigned.
pub(super) fn decode_descriptors(
    entries: &[Value],
    keys: &DescriptorKeys,
    role: Role,
) -> Result<Vec<(String, String)>> {
    let is_output = matches!(role, Role::Output);
    let untagged_slot = match role {
        Role::Input(slot) => slot,
        Role::Output => None,
    };
    let mut bound = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry {
            Value::String(name) if is_output => bound.push((name.clone(), name.clone())),
            Value::Object(fields) => {
                let tag = read_tag(fields, keys, untagged_slot)?;
                let id = match fields.get(keys.id) {
                    Some(Value::String(id)) => id.clone(),
                    None | Some(Value::Null) if is_output => tag.clone(),
                    _ => {
                        return Err(RealityError::malformed(format!(
                            "descriptor '{}' has no string '{}'",
                            tag, keys.id
                        )));
                    }
                };
                bound.push((tag, id));
            }
            other => {
                return Err(RealityError::malformed(format!(
                    "unexpected slot descriptor {}",
                    other
                )));
            }
        }
    }

    Ok(bound)
}

fn read_tag(
    fields: &Map<String, Value>,
    keys: &DescriptorKeys,
    untagged_slot: Option<&'static str>,
) -> Result<String> {
    match keys.tag {
        Some(tag_key) => fields
            .get(tag_key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RealityError::malformed(format!("descriptor without '{}'", tag_key))),
        None => untagged_slot
            .map(str::to_string)
            .ok_or_else(|| RealityError::malformed("untagged descriptor in a schema without slots")),
    }
}
