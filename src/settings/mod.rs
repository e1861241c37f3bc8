// ABOUTME: JobSettings aggregate: a job kind plus its validated slots and typed options
// ABOUTME: Serialization delegates to the shared codec configured by the service

pub mod kinds;
pub mod schema;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::codec::{self, OutputForm};
use crate::error::{RealityError, Result};
use crate::service::Service;

pub use kinds::JobKind;
pub use schema::{JobSchema, OptionSpec, OptionType, OptionValue, SlotSpec};

/// Typed settings for one job.
///
/// Slot and option names are checked against the kind's schema on every
/// mutation, so an instance never holds a name the service would reject.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    kind: JobKind,
    inputs: BTreeMap<&'static str, Vec<String>>,
    outputs: BTreeMap<&'static str, Vec<String>>,
    options: Vec<OptionValue>,
}

impl JobSettings {
    pub fn new(kind: JobKind) -> Self {
        let options = kind
            .schema()
            .options
            .iter()
            .map(|spec| spec.ty.default_value())
            .collect();

        Self {
            kind,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            options,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn schema(&self) -> &'static JobSchema {
        self.kind.schema()
    }

    /// Binds an input slot. Repeatable slots append, others replace.
    /// An empty id unsets a single slot and is ignored by a repeatable one.
    pub fn set_input(&mut self, slot: &str, id: impl Into<String>) -> Result<&mut Self> {
        let spec = self
            .schema()
            .input(slot)
            .ok_or_else(|| self.unknown_slot(slot))?;
        bind(&mut self.inputs, spec, id.into());
        Ok(self)
    }

    pub fn set_output(&mut self, slot: &str, id: impl Into<String>) -> Result<&mut Self> {
        let spec = self
            .schema()
            .output(slot)
            .ok_or_else(|| self.unknown_slot(slot))?;
        bind(&mut self.outputs, spec, id.into());
        Ok(self)
    }

    /// Selects an output by name; the server assigns its id at creation.
    pub fn request_output(&mut self, slot: &str) -> Result<&mut Self> {
        self.set_output(slot, slot.to_string())
    }

    /// Unbinds every id of an input slot.
    pub fn clear_input(&mut self, slot: &str) -> Result<&mut Self> {
        let spec = self
            .schema()
            .input(slot)
            .ok_or_else(|| self.unknown_slot(slot))?;
        self.inputs.remove(spec.name);
        Ok(self)
    }

    /// First id bound to `slot`.
    pub fn input(&self, slot: &str) -> Option<&str> {
        self.inputs.get(slot).and_then(|ids| ids.first()).map(String::as_str)
    }

    pub fn input_ids(&self, slot: &str) -> &[String] {
        self.inputs.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn output(&self, slot: &str) -> Option<&str> {
        self.outputs.get(slot).and_then(|ids| ids.first()).map(String::as_str)
    }

    pub fn output_ids(&self, slot: &str) -> &[String] {
        self.outputs.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bound inputs in schema declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        bound_in_order(self.schema().inputs, &self.inputs)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        bound_in_order(self.schema().outputs, &self.outputs)
    }

    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<&mut Self> {
        let index = self
            .schema()
            .option_index(name)
            .ok_or_else(|| RealityError::UnknownOption {
                job_kind: self.kind.to_string(),
                option: name.to_string(),
            })?;
        let spec = &self.schema().options[index];
        let value = value
            .into()
            .coerce(spec.ty)
            .ok_or(RealityError::InvalidOptionType {
                option: spec.name.to_string(),
                expected: spec.ty.name(),
            })?;
        self.options[index] = value;
        Ok(self)
    }

    /// Current value of a declared option, its default if never set.
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.schema()
            .option_index(name)
            .map(|index| &self.options[index])
    }

    /// Options in declaration order, defaults included.
    pub fn options(&self) -> impl Iterator<Item = (&'static OptionSpec, &OptionValue)> + '_ {
        self.schema().options.iter().zip(self.options.iter())
    }

    /// Creation payload: outputs are sent as bare names.
    pub fn to_wire(&self, service: Service) -> Result<Map<String, Value>> {
        self.encode(service, OutputForm::Names)
    }

    /// Record form as the service returns it: outputs carry their ids.
    pub fn to_record(&self, service: Service) -> Result<Map<String, Value>> {
        self.encode(service, OutputForm::Descriptors)
    }

    /// Rebuilds settings from a creation payload or a job record.
    ///
    /// The `type` tag selects the kind and must belong to `service`.
    pub fn from_wire(service: Service, payload: &Value) -> Result<Self> {
        let object = payload
            .as_object()
            .ok_or_else(|| RealityError::malformed("job settings must be a JSON object"))?;
        let tag = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RealityError::malformed("missing job type"))?;
        let kind = service.parse_job_kind(tag)?;

        codec::decode(kind, object, service.convention())
    }

    fn encode(&self, service: Service, form: OutputForm) -> Result<Map<String, Value>> {
        if !service.supports(self.kind) {
            return Err(RealityError::UnknownJobKind(format!(
                "{} (not served by {})",
                self.kind, service
            )));
        }
        Ok(codec::encode(self, service.convention(), form))
    }

    pub(crate) fn unknown_slot(&self, tag: &str) -> RealityError {
        RealityError::UnknownSlotKind {
            job_kind: self.kind.to_string(),
            tag: tag.to_string(),
        }
    }
}

fn bind(slots: &mut BTreeMap<&'static str, Vec<String>>, spec: &'static SlotSpec, id: String) {
    if id.is_empty() {
        if !spec.repeatable {
            slots.remove(spec.name);
        }
        return;
    }
    let ids = slots.entry(spec.name).or_default();
    if !spec.repeatable {
        ids.clear();
    }
    ids.push(id);
}

fn bound_in_order<'a>(
    specs: &'static [SlotSpec],
    slots: &'a BTreeMap<&'static str, Vec<String>>,
) -> impl Iterator<Item = (&'static str, &'a str)> + 'a {
    specs.iter().flat_map(move |spec| {
        slots
            .get(spec.name)
            .into_iter()
            .flatten()
            .map(move |id| (spec.name, id.as_str()))
    })
}
