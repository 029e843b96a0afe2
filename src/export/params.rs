//! Parameter records
//!
//! Fitted components describe themselves as a [`ParamMap`]. The map may hold
//! numbers, strings, arrays, nested maps, type references and opaque values;
//! [`serialize_params_dict`] turns any of it into plain JSON without failing.

use ndarray::{ArrayD, Axis};
use serde::Serialize;
use serde_json::{json, Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered parameter dictionary
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Value of a component that has no structured representation
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueParam {
    /// Textual form, always available
    pub repr: String,
    /// Structured form when the value could be serialized
    pub json: Option<Value>,
}

/// One parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// N-dimensional numeric array (centroids, support vectors, ...)
    Array(ArrayD<f64>),
    Seq(Vec<ParamValue>),
    /// Reference to a type, e.g. an element dtype
    TypeRef(&'static str),
    Map(ParamMap),
    Opaque(OpaqueParam),
}

impl ParamValue {
    /// Reference to the type `T`
    pub fn type_of<T: ?Sized>() -> Self {
        ParamValue::TypeRef(std::any::type_name::<T>())
    }

    pub fn from_array<D: ndarray::Dimension>(array: ndarray::Array<f64, D>) -> Self {
        ParamValue::Array(array.into_dyn())
    }

    /// Capture an arbitrary value, keeping its JSON form when it has one
    pub fn opaque<T: Serialize + fmt::Debug>(value: &T) -> Self {
        ParamValue::Opaque(OpaqueParam {
            repr: format!("{:?}", value),
            json: serde_json::to_value(value).ok(),
        })
    }

    /// Capture a value by its display text only
    pub fn display<T: fmt::Display>(value: &T) -> Self {
        ParamValue::Opaque(OpaqueParam {
            repr: value.to_string(),
            json: None,
        })
    }

    /// JSON form of this value
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Int(i) => json!(i),
            ParamValue::UInt(u) => json!(u),
            ParamValue::Float(f) => float_to_json(*f),
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::Array(array) => array_to_json(array),
            ParamValue::Seq(items) => Value::Array(items.iter().map(ParamValue::to_json).collect()),
            ParamValue::TypeRef(name) => Value::String(short_type_name(name).to_string()),
            ParamValue::Map(map) => serialize_params_dict(map),
            ParamValue::Opaque(opaque) => opaque
                .json
                .clone()
                .unwrap_or_else(|| Value::String(opaque.repr.clone())),
        }
    }
}

/// Convert a parameter dictionary into JSON-safe data.
///
/// Total over every [`ParamValue`]: arrays become nested lists, type
/// references become their name, non-finite floats become strings and
/// opaque values fall back to their textual form.
pub fn serialize_params_dict(params: &ParamMap) -> Value {
    let map: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    Value::Object(map)
}

fn float_to_json(f: f64) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}

fn array_to_json(array: &ArrayD<f64>) -> Value {
    if array.ndim() == 0 {
        return array.iter().next().map_or(Value::Null, |v| float_to_json(*v));
    }
    if array.ndim() == 1 {
        return Value::Array(array.iter().map(|v| float_to_json(*v)).collect());
    }
    Value::Array(
        array
            .axis_iter(Axis(0))
            .map(|sub| array_to_json(&sub.to_owned()))
            .collect(),
    )
}

// "f64" stays "f64", "alloc::string::String" becomes "String"
fn short_type_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::UInt(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::UInt(v as u64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::Null, Into::into)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl From<ParamMap> for ParamValue {
    fn from(v: ParamMap) -> Self {
        ParamValue::Map(v)
    }
}
