use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "byte")]
    Byte,
    #[serde(rename = "[]byte")]
    ByteArray,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "lib_function")]
    LibFunction,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::ByteArray => "[]byte",
            Self::Json => "json",
            Self::Object => "object",
            Self::Error => "error",
            Self::Null => "null",
            Self::LibFunction => "lib_function",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub index: usize,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub name: String,
}

/// Signature of a function the validator knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag: String,
    pub return_type: DataType,
    #[serde(default)]
    pub params: Vec<Param>,
    /// Variadic: neither argument count nor argument types are checked.
    #[serde(default)]
    pub uncertain_param: bool,
}

/// Abstract value used for type inference. Values are placeholders, never the
/// result of a real computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DataObj {
    #[serde(rename = "numeric")]
    Numeric { value: f64, offset: isize },
    #[serde(rename = "string")]
    String { value: String, offset: isize },
    #[serde(rename = "boolean")]
    Boolean { value: bool, offset: isize },
    #[serde(rename = "null")]
    Null { offset: isize },
    #[serde(rename = "error")]
    Error { message: String, offset: isize },
    #[serde(rename = "lib_function")]
    LibFunction { function: FunctionSpec, offset: isize },
    #[serde(rename = "json")]
    Json {
        value: serde_json::Value,
        offset: isize,
    },
    #[serde(rename = "[]byte")]
    ByteArray { value: Vec<u8>, offset: isize },
}

impl DataObj {
    pub fn error(message: impl Into<String>, offset: isize) -> Self {
        Self::Error {
            message: message.into(),
            offset,
        }
    }

    /// Canonical stand-in for "some value of this type", if the type has one.
    /// Only a literal `false` is falsy, so the boolean stand-in is `true`.
    pub fn placeholder(ty: DataType, offset: isize) -> Option<Self> {
        let obj = match ty {
            DataType::Numeric => Self::Numeric { value: 1.0, offset },
            DataType::String => Self::String {
                value: String::new(),
                offset,
            },
            DataType::Boolean => Self::Boolean {
                value: true,
                offset,
            },
            DataType::Json => Self::Json {
                value: serde_json::Value::Null,
                offset,
            },
            DataType::ByteArray => Self::ByteArray {
                value: vec![],
                offset,
            },
            _ => return None,
        };
        Some(obj)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::String { .. } => DataType::String,
            Self::Boolean { .. } => DataType::Boolean,
            Self::Null { .. } => DataType::Null,
            Self::Error { .. } => DataType::Error,
            Self::LibFunction { .. } => DataType::LibFunction,
            Self::Json { .. } => DataType::Json,
            Self::ByteArray { .. } => DataType::ByteArray,
        }
    }

    pub fn offset(&self) -> isize {
        match self {
            Self::Numeric { offset, .. }
            | Self::String { offset, .. }
            | Self::Boolean { offset, .. }
            | Self::Null { offset }
            | Self::Error { offset, .. }
            | Self::LibFunction { offset, .. }
            | Self::Json { offset, .. }
            | Self::ByteArray { offset, .. } => *offset,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for DataObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric { value, .. } => write!(f, "{value}"),
            Self::String { value, .. } => f.write_str(value),
            Self::Boolean { value, .. } => write!(f, "{value}"),
            Self::Null { .. } => f.write_str("null"),
            Self::Error { message, .. } => f.write_str(message),
            Self::LibFunction { function, .. } => write!(f, "{}()", function.name),
            Self::Json { value, .. } => write!(f, "{value}"),
            Self::ByteArray { value, .. } => write!(f, "{value:?}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{DataObj, DataType, FunctionSpec};

    #[test]
    fn placeholders() {
        assert_eq!(
            DataObj::placeholder(DataType::Numeric, 3),
            Some(DataObj::Numeric {
                value: 1.0,
                offset: 3
            })
        );
        assert_eq!(
            DataObj::placeholder(DataType::Json, 0).map(|o| o.data_type()),
            Some(DataType::Json)
        );
        assert_eq!(
            DataObj::placeholder(DataType::Boolean, 2),
            Some(DataObj::Boolean {
                value: true,
                offset: 2
            })
        );
        assert_eq!(DataObj::placeholder(DataType::Object, 0), None);
        assert_eq!(DataObj::placeholder(DataType::Error, 0), None);
    }

    #[test]
    fn function_spec_from_json() {
        let spec: FunctionSpec = serde_json::from_str(
            r#"{
                "name": "substr",
                "description": "slice of a string",
                "tag": "string",
                "returnType": "string",
                "params": [
                    { "index": 0, "type": "string", "name": "s" },
                    { "index": 1, "type": "numeric", "name": "start" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(spec.return_type, DataType::String);
        assert_eq!(spec.params[1].data_type, DataType::Numeric);
        assert!(!spec.uncertain_param);
    }

    #[test]
    fn byte_array_type_name() {
        let ty: DataType = serde_json::from_str(r#""[]byte""#).unwrap();
        assert_eq!(ty, DataType::ByteArray);
        assert_eq!(ty.to_string(), "[]byte");
    }
}
