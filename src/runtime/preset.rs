use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::value::{DataObj, DataType, FunctionSpec};

/// A known identifier and the type it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub desc: String,
}

impl Keyword {
    pub fn new(name: impl Into<String>, data_type: DataType, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            desc: desc.into(),
        }
    }

    /// The placeholder the keyword evaluates to. Keywords declared as errors never
    /// resolve.
    pub fn origin(&self, offset: isize) -> Option<DataObj> {
        match self.data_type {
            DataType::Error => None,
            ty => Some(DataObj::placeholder(ty, offset).unwrap_or(DataObj::Null { offset })),
        }
    }
}

/// Keywords and functions loaded from a JSON document.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub functions: HashMap<String, FunctionSpec>,
}

impl Catalog {
    pub fn from_json(src: &str) -> serde_json::Result<Self> {
        serde_json::from_str(src)
    }
}

/// Variables every device rule can refer to.
pub fn device_keywords() -> Vec<Keyword> {
    vec![
        Keyword::new(
            "IOT_DATA",
            DataType::Json,
            "Data reported by the device",
        ),
        Keyword::new(
            "IOT_DATA_TIME",
            DataType::Numeric,
            "Time the reported data was stored",
        ),
    ]
}

#[cfg(test)]
mod test {
    use super::{device_keywords, Catalog, Keyword};
    use crate::runtime::value::{DataObj, DataType};

    #[test]
    fn keyword_origin() {
        let kw = Keyword::new("speed", DataType::Numeric, "");
        assert_eq!(kw.origin(4).map(|o| o.data_type()), Some(DataType::Numeric));

        let kw = Keyword::new("blob", DataType::Object, "");
        assert_eq!(kw.origin(4), Some(DataObj::Null { offset: 4 }));

        let kw = Keyword::new("broken", DataType::Error, "");
        assert_eq!(kw.origin(4), None);
    }

    #[test]
    fn load_catalog() {
        let catalog = Catalog::from_json(
            r#"{
                "keywords": [ { "name": "temp", "type": "numeric", "desc": "temperature" } ],
                "functions": {
                    "concat": {
                        "name": "concat",
                        "returnType": "string",
                        "uncertainParam": true
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.keywords[0].name, "temp");
        assert!(catalog.functions["concat"].uncertain_param);
        assert!(catalog.functions["concat"].params.is_empty());
    }

    #[test]
    fn device_presets() {
        let names: Vec<_> = device_keywords().into_iter().map(|k| k.name).collect();
        assert_eq!(names, &["IOT_DATA", "IOT_DATA_TIME"]);
    }
}
