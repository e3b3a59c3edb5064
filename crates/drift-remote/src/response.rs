//! Interpretation of a layout service's answer.
//!
//! Three shapes are accepted, detected in this order:
//!
//! 1. an object carrying the configured wrapper key, whose value maps node ids to `{x, y}`;
//! 2. an array of `{id, x, y}` records;
//! 3. an object keyed directly by node id.
//!
//! Anything else is rejected before a single position is applied.

use drift_core::{Error, NodeId, Point, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    Wrapped(Map<String, Value>),
    Records(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl ResponseShape {
    pub fn detect(value: Value, positions_key: &str) -> Result<Self> {
        match value {
            Value::Object(mut map)
                if !positions_key.is_empty() && map.contains_key(positions_key) =>
            {
                match map.remove(positions_key) {
                    Some(Value::Object(inner)) => Ok(Self::Wrapped(inner)),
                    Some(other) => Err(Error::response_shape(format!(
                        "`{positions_key}` must map node ids to positions, got {}",
                        kind_of(&other)
                    ))),
                    None => Err(Error::response_shape(format!(
                        "`{positions_key}` vanished from the response"
                    ))),
                }
            }
            Value::Array(records) => Ok(Self::Records(records)),
            Value::Object(map) => Ok(Self::Keyed(map)),
            other => Err(Error::response_shape(format!(
                "expected an object or an array, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Wrapped(_) => "wrapped",
            Self::Records(_) => "records",
            Self::Keyed(_) => "keyed",
        }
    }

    /// Extracts the positions carried by the response.
    ///
    /// Records without a usable id or finite coordinates are dropped. Keyed entries must be
    /// objects; those without finite coordinates are dropped.
    pub fn into_positions(self) -> Result<BTreeMap<NodeId, Point>> {
        match self {
            Self::Wrapped(map) | Self::Keyed(map) => {
                let mut out = BTreeMap::new();
                for (id, entry) in map {
                    let Value::Object(fields) = &entry else {
                        return Err(Error::response_shape(format!(
                            "position for `{id}` must be an object, got {}",
                            kind_of(&entry)
                        )));
                    };
                    if let Some(p) = point_of(fields) {
                        out.insert(NodeId::new(id), p);
                    }
                }
                Ok(out)
            }
            Self::Records(records) => Ok(records
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|fields| Some((record_id(fields.get("id")?)?, point_of(fields)?)))
                .collect()),
        }
    }
}

fn point_of(fields: &Map<String, Value>) -> Option<Point> {
    let p = Point::new(fields.get("x")?.as_f64()?, fields.get("y")?.as_f64()?);
    p.is_finite().then_some(p)
}

fn record_id(value: &Value) -> Option<NodeId> {
    match value {
        Value::String(s) => Some(NodeId::new(s.clone())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(NodeId::new(n.to_string())),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
