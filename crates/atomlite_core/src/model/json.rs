use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Runtime type of a JSON value.
///
/// Integers and reals are distinct: a value written as an integer reads
/// back as `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Null,
    Bool,
    Integer,
    Real,
    Text,
    Object,
    Array,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(number) if number.is_f64() => Self::Real,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::Text,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl Display for JsonType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::JsonType;
    use serde_json::json;

    #[test]
    fn integers_and_reals_are_distinct() {
        assert_eq!(JsonType::of(&json!(12)), JsonType::Integer);
        assert_eq!(JsonType::of(&json!(-12)), JsonType::Integer);
        assert_eq!(JsonType::of(&json!(12.0)), JsonType::Real);
        let parsed: serde_json::Value = serde_json::from_str("12.0").unwrap();
        assert_eq!(JsonType::of(&parsed), JsonType::Real);
    }

    #[test]
    fn classifies_containers_and_scalars() {
        assert_eq!(JsonType::of(&json!(null)), JsonType::Null);
        assert_eq!(JsonType::of(&json!(true)), JsonType::Bool);
        assert_eq!(JsonType::of(&json!("x")), JsonType::Text);
        assert_eq!(JsonType::of(&json!({"a": 1})), JsonType::Object);
        assert_eq!(JsonType::of(&json!([1, 2])), JsonType::Array);
    }
}
