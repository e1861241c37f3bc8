// ABOUTME: Static schema tables describing each job kind's legal slots and options
// ABOUTME: Typed option values live here; wire string coercion stays in the codec

use std::fmt;

/// A declared input or output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: &'static str,
    /// Repeatable slots bind an ordered list of ids, one descriptor each.
    pub repeatable: bool,
}

impl SlotSpec {
    pub const fn single(name: &'static str) -> Self {
        Self {
            name,
            repeatable: false,
        }
    }

    pub const fn many(name: &'static str) -> Self {
        Self {
            name,
            repeatable: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Bool,
    Int,
    Float,
    Text,
}

impl OptionType {
    pub fn name(&self) -> &'static str {
        match self {
            OptionType::Bool => "boolean",
            OptionType::Int => "integer",
            OptionType::Float => "float",
            OptionType::Text => "string",
        }
    }

    pub fn default_value(&self) -> OptionValue {
        match self {
            OptionType::Bool => OptionValue::Bool(false),
            OptionType::Int => OptionValue::Int(0),
            OptionType::Float => OptionValue::Float(0.0),
            OptionType::Text => OptionValue::Text(String::new()),
        }
    }
}

/// A declared option. Dotted names address nested objects on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub ty: OptionType,
}

impl OptionSpec {
    pub const fn new(name: &'static str, ty: OptionType) -> Self {
        Self { name, ty }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionValue::Bool(_) => OptionType::Bool,
            OptionValue::Int(_) => OptionType::Int,
            OptionValue::Float(_) => OptionType::Float,
            OptionValue::Text(_) => OptionType::Text,
        }
    }

    /// `false`, `0`, `0.0` and `""` are never written to the wire.
    pub fn is_default(&self) -> bool {
        match self {
            OptionValue::Bool(b) => !b,
            OptionValue::Int(i) => *i == 0,
            OptionValue::Float(x) => *x == 0.0,
            OptionValue::Text(s) => s.is_empty(),
        }
    }

    /// Coerces into `ty`, widening integers to floats. `None` on mismatch
    /// and for NaN or infinite floats, which no wire encoding can carry.
    pub fn coerce(self, ty: OptionType) -> Option<OptionValue> {
        match (self, ty) {
            (OptionValue::Float(x), _) if !x.is_finite() => None,
            (OptionValue::Int(i), OptionType::Float) => Some(OptionValue::Float(i as f64)),
            (value, ty) if value.option_type() == ty => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(x) => Some(*x),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(x) => write!(f, "{}", x),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value as i64)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(value as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// The fixed bundle of slots and options one job kind accepts.
#[derive(Debug)]
pub struct JobSchema {
    pub inputs: &'static [SlotSpec],
    pub outputs: &'static [SlotSpec],
    pub options: &'static [OptionSpec],
}

impl JobSchema {
    pub fn input(&self, name: &str) -> Option<&'static SlotSpec> {
        self.inputs.iter().find(|slot| slot.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&'static SlotSpec> {
        self.outputs.iter().find(|slot| slot.name == name)
    }

    pub fn option_index(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|opt| opt.name == name)
    }
}
