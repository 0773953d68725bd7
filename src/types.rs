//! Semantic parameter kinds and the value holders bound to each form row.

use std::fmt;

use serde_json::Value;

use crate::error::GuifyError;

/// Separator used when a list of paths is shown or edited as one line of text.
pub const PATH_LIST_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Bool,
    Float,
    Int,
    Str,
    FilePath,
    Files,
    Directory,
}

impl ParamKind {
    pub const ALL: [ParamKind; 7] = [
        ParamKind::Bool,
        ParamKind::Float,
        ParamKind::Int,
        ParamKind::Str,
        ParamKind::FilePath,
        ParamKind::Files,
        ParamKind::Directory,
    ];

    /// Resolves a type tag as written in a form definition.
    pub fn from_tag(tag: &str) -> Result<Self, GuifyError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ParamKind::Bool),
            "float" => Ok(ParamKind::Float),
            "int" | "integer" => Ok(ParamKind::Int),
            "str" | "string" => Ok(ParamKind::Str),
            "file" | "filepath" => Ok(ParamKind::FilePath),
            "files" => Ok(ParamKind::Files),
            "directory" | "dir" | "folder" => Ok(ParamKind::Directory),
            _ => Err(GuifyError::UnknownKind(tag.to_string())),
        }
    }

    /// The kind a default value implies when no kind was declared.
    pub fn infer(value: &ParamValue) -> Self {
        match value {
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Str(_) => ParamKind::Str,
            ParamValue::Paths(_) => ParamKind::Files,
        }
    }

    /// Value a holder starts with when the parameter has no default.
    pub fn empty_value(self) -> ParamValue {
        match self {
            ParamKind::Bool => ParamValue::Bool(false),
            ParamKind::Float => ParamValue::Float(0.0),
            ParamKind::Int => ParamValue::Int(0),
            ParamKind::Str | ParamKind::FilePath | ParamKind::Directory => {
                ParamValue::Str(String::new())
            }
            ParamKind::Files => ParamValue::Paths(Vec::new()),
        }
    }

    /// Brings `value` into this kind's shape, widening integers to floats.
    /// Returns `None` when the shapes are incompatible.
    pub fn coerce(self, value: ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (ParamKind::Bool, v @ ParamValue::Bool(_)) => Some(v),
            // Non-finite floats have no JSON form and could not be reloaded.
            (ParamKind::Float, ParamValue::Float(x)) if x.is_finite() => Some(ParamValue::Float(x)),
            (ParamKind::Float, ParamValue::Int(i)) => Some(ParamValue::Float(i as f64)),
            (ParamKind::Int, v @ ParamValue::Int(_)) => Some(v),
            (
                ParamKind::Str | ParamKind::FilePath | ParamKind::Directory,
                v @ ParamValue::Str(_),
            ) => Some(v),
            (ParamKind::Files, v @ ParamValue::Paths(_)) => Some(v),
            (ParamKind::Files, ParamValue::Str(s)) => Some(ParamValue::Paths(vec![s])),
            _ => None,
        }
    }

    /// Converts a configuration-document value for parameter `param`.
    pub fn value_from_json(self, param: &str, json: &Value) -> Result<ParamValue, GuifyError> {
        let mismatch = || GuifyError::TypeMismatch {
            param: param.to_string(),
            expected: self,
            found: json_type_name(json).to_string(),
        };
        let value = match (self, json) {
            (ParamKind::Bool, Value::Bool(b)) => ParamValue::Bool(*b),
            (ParamKind::Int, Value::Number(n)) => ParamValue::Int(n.as_i64().ok_or_else(mismatch)?),
            (ParamKind::Float, Value::Number(n)) => {
                ParamValue::Float(n.as_f64().ok_or_else(mismatch)?)
            }
            (ParamKind::Str | ParamKind::FilePath | ParamKind::Directory, Value::String(s)) => {
                ParamValue::Str(s.clone())
            }
            (ParamKind::Files, Value::String(s)) => ParamValue::Paths(vec![s.clone()]),
            (ParamKind::Files, Value::Array(items)) => {
                let paths = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(mismatch)?;
                ParamValue::Paths(paths)
            }
            _ => return Err(mismatch()),
        };
        Ok(value)
    }

    /// Parses what the user typed into a text entry.
    pub fn parse_text(self, param: &str, text: &str) -> Result<ParamValue, GuifyError> {
        let invalid = || GuifyError::InvalidText {
            param: param.to_string(),
            expected: self,
            text: text.to_string(),
        };
        match self {
            ParamKind::Bool => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(ParamValue::Bool(true)),
                "false" | "0" | "no" | "" => Ok(ParamValue::Bool(false)),
                _ => Err(invalid()),
            },
            ParamKind::Int => text
                .trim()
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| invalid()),
            ParamKind::Float => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(ParamValue::Float)
                .ok_or_else(invalid),
            ParamKind::Str | ParamKind::FilePath | ParamKind::Directory => {
                Ok(ParamValue::Str(text.to_string()))
            }
            ParamKind::Files => Ok(ParamValue::Paths(
                text.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Bool => "boolean",
            ParamKind::Float => "float",
            ParamKind::Int => "integer",
            ParamKind::Str => "string",
            ParamKind::FilePath => "file path",
            ParamKind::Files => "list of file paths",
            ParamKind::Directory => "directory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Float(f64),
    Int(i64),
    Str(String),
    Paths(Vec<String>),
}

impl ParamValue {
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Bool(b) => Value::Bool(*b),
            // Non-finite floats have no JSON form and become null.
            ParamValue::Float(x) => Value::from(*x),
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::Paths(paths) => {
                Value::Array(paths.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// Text shown in an entry field for this value.
    pub fn display_text(&self) -> String {
        match self {
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Float(x) => format!("{:?}", x),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Str(s) => s.clone(),
            ParamValue::Paths(paths) => paths.join(PATH_LIST_SEPARATOR),
        }
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Observable container for one parameter's current value.
///
/// Every successful `set` bumps the revision so a widget can tell that the
/// value was changed behind its back (config load, dialog selection) and
/// refresh whatever it displays.
#[derive(Debug, Clone)]
pub struct ValueHolder {
    name: String,
    kind: ParamKind,
    value: ParamValue,
    revision: u64,
}

impl ValueHolder {
    pub fn new(
        name: impl Into<String>,
        kind: ParamKind,
        initial: Option<ParamValue>,
    ) -> Result<Self, GuifyError> {
        let name = name.into();
        let value = match initial {
            Some(v) => coerce_for(&name, kind, v)?,
            None => kind.empty_value(),
        };
        Ok(Self {
            name,
            kind,
            value,
            revision: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn get(&self) -> &ParamValue {
        &self.value
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set(&mut self, value: ParamValue) -> Result<(), GuifyError> {
        self.value = coerce_for(&self.name, self.kind, value)?;
        self.revision += 1;
        Ok(())
    }

    pub fn set_json(&mut self, json: &Value) -> Result<(), GuifyError> {
        let value = self.kind.value_from_json(&self.name, json)?;
        self.set(value)
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), GuifyError> {
        let value = self.kind.parse_text(&self.name, text)?;
        self.set(value)
    }
}

fn coerce_for(name: &str, kind: ParamKind, value: ParamValue) -> Result<ParamValue, GuifyError> {
    let found = ParamKind::infer(&value).to_string();
    kind.coerce(value).ok_or_else(|| GuifyError::TypeMismatch {
        param: name.to_string(),
        expected: kind,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_kind_has_an_empty_value_of_its_own_shape() {
        for kind in ParamKind::ALL {
            let empty = kind.empty_value();
            assert_eq!(kind.coerce(empty.clone()), Some(empty));
        }
    }

    #[test]
    fn test_tags_and_aliases() {
        assert_eq!(ParamKind::from_tag("int").unwrap(), ParamKind::Int);
        assert_eq!(ParamKind::from_tag("Boolean").unwrap(), ParamKind::Bool);
        assert_eq!(ParamKind::from_tag("folder").unwrap(), ParamKind::Directory);
        assert_eq!(ParamKind::from_tag("filepath").unwrap(), ParamKind::FilePath);
        assert!(matches!(
            ParamKind::from_tag("complex"),
            Err(GuifyError::UnknownKind(tag)) if tag == "complex"
        ));
    }

    #[test]
    fn test_infer_from_default() {
        assert_eq!(ParamKind::infer(&ParamValue::Int(3)), ParamKind::Int);
        assert_eq!(ParamKind::infer(&ParamValue::Bool(false)), ParamKind::Bool);
        assert_eq!(
            ParamKind::infer(&ParamValue::Paths(vec!["a.png".into()])),
            ParamKind::Files
        );
    }

    #[test]
    fn test_holder_rejects_wrong_shape() {
        let mut holder = ValueHolder::new("count", ParamKind::Int, Some(ParamValue::Int(3))).unwrap();
        let err = holder.set(ParamValue::Str("seven".into())).unwrap_err();
        assert!(matches!(err, GuifyError::TypeMismatch { ref param, .. } if param == "count"));
        assert_eq!(holder.get(), &ParamValue::Int(3));
        assert_eq!(holder.revision(), 0);
    }

    #[test]
    fn test_holder_widens_int_to_float() {
        let holder = ValueHolder::new("scale", ParamKind::Float, Some(ParamValue::Int(2))).unwrap();
        assert_eq!(holder.get(), &ParamValue::Float(2.0));
    }

    #[test]
    fn test_holder_revision_tracks_changes() {
        let mut holder = ValueHolder::new("verbose", ParamKind::Bool, None).unwrap();
        assert_eq!(holder.get(), &ParamValue::Bool(false));
        holder.set(ParamValue::Bool(true)).unwrap();
        holder.set_json(&json!(false)).unwrap();
        assert_eq!(holder.revision(), 2);
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(
            ParamKind::Files.value_from_json("inputs", &json!(["a.tif", "b.tif"])).unwrap(),
            ParamValue::Paths(vec!["a.tif".into(), "b.tif".into()])
        );
        assert_eq!(
            ParamKind::Float.value_from_json("radius", &json!(5)).unwrap(),
            ParamValue::Float(5.0)
        );
        let err = ParamKind::Int.value_from_json("count", &json!(2.5)).unwrap_err();
        assert_eq!(err.to_string(), "parameter `count` expects integer, got float");
        assert!(ParamKind::Files.value_from_json("inputs", &json!([1, 2])).is_err());
        assert!(ParamKind::Bool.value_from_json("verbose", &json!(null)).is_err());
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(ParamKind::Int.parse_text("count", " 7 ").unwrap(), ParamValue::Int(7));
        assert_eq!(ParamKind::Float.parse_text("radius", "0.5").unwrap(), ParamValue::Float(0.5));
        assert!(matches!(
            ParamKind::Int.parse_text("count", "seven"),
            Err(GuifyError::InvalidText { .. })
        ));
        assert_eq!(
            ParamKind::Files.parse_text("inputs", "a.png; b.png;").unwrap(),
            ParamValue::Paths(vec!["a.png".into(), "b.png".into()])
        );
    }

    #[test]
    fn test_non_finite_floats_are_refused() {
        for text in ["inf", "-inf", "NaN", "infinity"] {
            assert!(
                matches!(ParamKind::Float.parse_text("scale", text), Err(GuifyError::InvalidText { .. })),
                "{} should not parse",
                text
            );
        }
        let mut holder = ValueHolder::new("scale", ParamKind::Float, Some(ParamValue::Float(0.5))).unwrap();
        assert!(matches!(
            holder.set(ParamValue::Float(f64::NAN)),
            Err(GuifyError::TypeMismatch { .. })
        ));
        assert_eq!(holder.get(), &ParamValue::Float(0.5));
    }

    #[test]
    fn test_display_text_survives_parse() {
        for value in [ParamValue::Float(1.0), ParamValue::Int(-4), ParamValue::Float(0.125)] {
            let kind = ParamKind::infer(&value);
            assert_eq!(kind.parse_text("x", &value.display_text()).unwrap(), value);
        }
    }
}
