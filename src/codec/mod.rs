// ABOUTME: Shared codec between typed JobSettings and the services' tagged JSON shapes
// ABOUTME: One implementation, parameterized by a per-service WireConvention

mod descriptors;
mod options;

use serde_json::{Map, Value};
use tracing::warn;

use descriptors::Role;

use crate::error::{RealityError, Result};
use crate::settings::{JobKind, JobSettings};

pub const SETTINGS_KEY: &str = "settings";
const INPUTS_KEY: &str = "inputs";
const OUTPUTS_KEY: &str = "outputs";

/// Key names of one `{tag, id}` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorKeys {
    /// `None` for untagged descriptors, which bind to the schema's first slot.
    pub tag: Option<&'static str>,
    pub id: &'static str,
}

/// Where a part of the settings lives inside the job object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Root,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsPlacement {
    /// A dedicated sub-object under this key.
    Object(&'static str),
    /// Options sit directly in the section, next to the slot arrays.
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionEncoding {
    /// Every value is a decimal string; booleans only ever as `"true"`.
    Strings,
    /// Booleans and numbers as JSON scalars.
    Native,
}

/// Shape of outputs in an encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputForm {
    /// Bare slot names: the caller declares intent, the server assigns ids.
    Names,
    Descriptors,
}

/// Codec configuration for one service generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireConvention {
    pub inputs: DescriptorKeys,
    pub outputs: DescriptorKeys,
    pub inputs_in: Section,
    pub outputs_in: Section,
    pub options_in: Section,
    pub options: OptionsPlacement,
    pub encoding: OptionEncoding,
}

/// Encodes the kind tag, slots and options into a job object fragment.
pub fn encode(
    settings: &JobSettings,
    convention: &WireConvention,
    form: OutputForm,
) -> Map<String, Value> {
    let mut root = Map::new();
    let mut nested = Map::new();
    root.insert("type".to_string(), Value::from(settings.kind().as_str()));

    let inputs = descriptors::encode_descriptors(settings.inputs(), &convention.inputs);
    section_mut(&mut root, &mut nested, convention.inputs_in)
        .insert(INPUTS_KEY.to_string(), Value::Array(inputs));

    let outputs = match form {
        OutputForm::Names => settings.outputs().map(|(name, _)| Value::from(name)).collect(),
        OutputForm::Descriptors => {
            descriptors::encode_descriptors(settings.outputs(), &convention.outputs)
        }
    };
    section_mut(&mut root, &mut nested, convention.outputs_in)
        .insert(OUTPUTS_KEY.to_string(), Value::Array(outputs));

    let encoded = options::encode_options(settings, convention.encoding);
    let target = section_mut(&mut root, &mut nested, convention.options_in);
    match convention.options {
        OptionsPlacement::Object(key) => {
            target.insert(key.to_string(), Value::Object(encoded));
        }
        OptionsPlacement::Inline => target.extend(encoded),
    }

    if !nested.is_empty() {
        root.insert(SETTINGS_KEY.to_string(), Value::Object(nested));
    }
    root
}

/// Decodes a job object of an already-resolved kind.
///
/// Unrecognized slot tags fail with `UnknownSlotKind`; absent sections and
/// absent option keys leave their defaults.
pub fn decode(
    kind: JobKind,
    object: &Map<String, Value>,
    convention: &WireConvention,
) -> Result<JobSettings> {
    let nested = match object.get(SETTINGS_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => return Err(RealityError::malformed("'settings' must be an object")),
    };
    let section = move |which: Section| match which {
        Section::Root => Some(object),
        Section::Settings => nested,
    };

    let mut settings = JobSettings::new(kind);

    let inputs = section(convention.inputs_in)
        .and_then(|m| array_at(m, INPUTS_KEY).transpose());
    if let Some(entries) = inputs {
        let untagged_slot = kind.schema().inputs.first().map(|slot| slot.name);
        let role = Role::Input(untagged_slot);
        for (tag, id) in descriptors::decode_descriptors(entries?, &convention.inputs, role)? {
            if id.is_empty() {
                continue;
            }
            let single = kind.schema().input(&tag).is_some_and(|slot| !slot.repeatable);
            if single && settings.input(&tag).is_some() {
                warn!(job_kind = %kind, slot = %tag, "Duplicate input descriptor replaces earlier id");
            }
            settings.set_input(&tag, id)?;
        }
    }

    let outputs = section(convention.outputs_in)
        .and_then(|m| array_at(m, OUTPUTS_KEY).transpose());
    if let Some(entries) = outputs {
        for (tag, id) in descriptors::decode_descriptors(entries?, &convention.outputs, Role::Output)? {
            if id.is_empty() {
                continue;
            }
            let single = kind.schema().output(&tag).is_some_and(|slot| !slot.repeatable);
            if single && settings.output(&tag).is_some() {
                warn!(job_kind = %kind, slot = %tag, "Duplicate output descriptor replaces earlier id");
            }
            settings.set_output(&tag, id)?;
        }
    }

    let container = match (convention.options, section(convention.options_in)) {
        (OptionsPlacement::Object(key), Some(map)) => match map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Object(options)) => Some(options),
            Some(_) => {
                return Err(RealityError::malformed(format!("'{}' must be an object", key)));
            }
        },
        (OptionsPlacement::Inline, inline) => inline,
        (_, None) => None,
    };
    if let Some(container) = container {
        options::decode_options(&mut settings, container, convention.options)?;
    }

    Ok(settings)
}

fn section_mut<'a>(
    root: &'a mut Map<String, Value>,
    nested: &'a mut Map<String, Value>,
    which: Section,
) -> &'a mut Map<String, Value> {
    match which {
        Section::Root => root,
        Section::Settings => nested,
    }
}

fn array_at<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) => Ok(Some(entries)),
        Some(_) => Err(RealityError::malformed(format!("'{}' must be an array", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Service;
    use serde_json::json;

    #[test]
    fn test_nested_convention_places_everything_under_settings() {
        let mut settings = JobSettings::new(JobKind::Segmentation3D);
        settings.set_input("pointClouds", "pc").unwrap();
        settings.request_output("segmentation3D").unwrap();
        settings.set_option("saveConfidence", true).unwrap();

        let wire = encode(&settings, Service::AnalysisV2.convention(), OutputForm::Names);
        assert_eq!(
            Value::Object(wire),
            json!({
                "type": "segmentation3D",
                "settings": {
                    "inputs": [{"name": "pointClouds", "realityDataId": "pc"}],
                    "outputs": ["segmentation3D"],
                    "options": {"saveConfidence": "true"}
                }
            })
        );
    }

    #[test]
    fn test_modeling_options_are_inline_and_native() {
        let mut settings = JobSettings::new(JobKind::Full);
        settings.set_input("realityData", "photos-1").unwrap();
        settings.set_input("realityData", "photos-2").unwrap();
        settings.request_output("3MX").unwrap();
        settings.set_option("meshQuality", "Medium").unwrap();
        settings.set_option("processingEngines", 4).unwrap();
        settings.set_option("cacheSettings.createCache", true).unwrap();

        let wire = encode(&settings, Service::Modeling.convention(), OutputForm::Names);
        assert_eq!(
            Value::Object(wire),
            json!({
                "type": "Full",
                "inputs": [{"id": "photos-1"}, {"id": "photos-2"}],
                "settings": {
                    "outputs": ["3MX"],
                    "meshQuality": "Medium",
                    "processingEngines": 4,
                    "cacheSettings": {"createCache": true}
                }
            })
        );
    }

    #[test]
    fn test_decode_modeling_record() {
        let record = json!({
            "type": "Full",
            "inputs": [{"id": "photos-1"}],
            "settings": {
                "outputs": [{"format": "3MX", "id": "mesh-id"}, {"format": "OPC"}],
                "meshQuality": "Extra",
                "processingEngines": 2,
                "cacheSettings": {"useCache": "cache-id"}
            }
        });
        let settings = decode(
            JobKind::Full,
            record.as_object().unwrap(),
            Service::Modeling.convention(),
        )
        .unwrap();

        assert_eq!(settings.input_ids("realityData"), ["photos-1".to_string()]);
        assert_eq!(settings.output("3MX"), Some("mesh-id"));
        assert_eq!(settings.output("OPC"), Some("OPC"));
        assert_eq!(settings.option("processingEngines").unwrap().as_int(), Some(2));
        assert_eq!(
            settings.option("cacheSettings.useCache").unwrap().as_str(),
            Some("cache-id")
        );
        assert_eq!(
            settings.option("cacheSettings.createCache").unwrap().as_bool(),
            Some(false)
        );
    }

    #[test]
    fn test_decode_rejects_malformed_sections() {
        let convention = Service::AnalysisV1.convention();
        let record = json!({"type": "objects2D", "inputs": "photos"});
        let err = decode(JobKind::Objects2D, record.as_object().unwrap(), convention).unwrap_err();
        assert!(matches!(err, RealityError::MalformedPayload(_)));

        let record = json!({"type": "objects2D", "options": ["useTiePoints"]});
        let err = decode(JobKind::Objects2D, record.as_object().unwrap(), convention).unwrap_err();
        assert!(matches!(err, RealityError::MalformedPayload(_)));
    }

    #[test]
    fn test_empty_ids_do_not_clear_repeatable_slots() {
        let record = json!({
            "type": "Conversion",
            "inputs": [{"type": "LAS", "id": "a"}, {"type": "LAS", "id": ""}, {"type": "LAS", "id": "b"}],
            "outputs": [{"type": "OPC", "id": ""}]
        });
        let settings = decode(
            JobKind::Conversion,
            record.as_object().unwrap(),
            Service::Conversion.convention(),
        )
        .unwrap();
        assert_eq!(settings.input_ids("LAS"), ["a".to_string(), "b".to_string()]);
        assert_eq!(settings.output("OPC"), None);
    }

    #[test]
    fn test_duplicate_single_slot_keeps_last_id() {
        let record = json!({
            "type": "objects2D",
            "inputs": [{"type": "photos", "id": "first"}, {"type": "photos", "id": "second"}],
            "outputs": [{"type": "objects2D", "id": "o1"}, {"type": "objects2D", "id": ""}]
        });
        let settings = decode(
            JobKind::Objects2D,
            record.as_object().unwrap(),
            Service::AnalysisV1.convention(),
        )
        .unwrap();
        assert_eq!(settings.input_ids("photos"), ["second".to_string()]);
        assert_eq!(settings.output("objects2D"), Some("o1"));
    }

    #[test]
    fn test_missing_sections_leave_defaults() {
        let record = json!({"type": "changeDetection"});
        let settings = decode(
            JobKind::ChangeDetection,
            record.as_object().unwrap(),
            Service::AnalysisV1.convention(),
        )
        .unwrap();
        assert_eq!(settings, JobSettings::new(JobKind::ChangeDetection));
    }
}
