//! TOML form definitions: a signature written down instead of compiled in.
//!
//! ```toml
//! function = "skeletonize"
//! title = "Skeleton analysis"
//! pipeline_context = true
//!
//! [[param]]
//! name = "threshold_radius"
//! default = 5e-8
//!
//! [[param]]
//! name = "scale_metadata"
//! kind = "file"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::GuifyError;
use crate::form::FormOptions;
use crate::params::{ParamSpec, Signature};
use crate::types::{ParamKind, ParamValue};

#[derive(Deserialize, Debug, Clone)]
pub struct FormDefinition {
    pub function: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub capitalize: bool,
    #[serde(default)]
    pub pipeline_context: bool,
    #[serde(default, rename = "param")]
    pub params: Vec<ParamDefinition>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParamDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub default: Option<toml::Value>,
}

impl FormDefinition {
    pub fn parse(text: &str) -> Result<Self, GuifyError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, GuifyError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// The form shown when no definition is given: `demo(count: int = 3,
    /// verbose: bool = false)`.
    pub fn demo() -> Self {
        Self {
            function: "demo".to_string(),
            title: None,
            capitalize: false,
            pipeline_context: false,
            params: vec![
                ParamDefinition {
                    name: "count".to_string(),
                    kind: Some("int".to_string()),
                    default: Some(toml::Value::Integer(3)),
                },
                ParamDefinition {
                    name: "verbose".to_string(),
                    kind: Some("bool".to_string()),
                    default: Some(toml::Value::Boolean(false)),
                },
            ],
        }
    }

    /// Converts kind tags and defaults. Unknown tags fail here, before any
    /// window exists.
    pub fn signature(&self) -> Result<Signature, GuifyError> {
        let mut sig = Signature::new(&self.function);
        for def in &self.params {
            let mut spec = ParamSpec::new(&def.name);
            if let Some(tag) = &def.kind {
                spec = spec.kind(ParamKind::from_tag(tag)?);
            }
            if let Some(default) = &def.default {
                spec = spec.default_value(value_from_toml(&def.name, default)?);
            }
            sig = sig.param(spec);
        }
        Ok(sig)
    }

    pub fn options(&self) -> FormOptions {
        FormOptions {
            title: self.title.clone(),
            capitalize: self.capitalize,
            pipeline_context: self.pipeline_context,
        }
    }
}

fn value_from_toml(param: &str, value: &toml::Value) -> Result<ParamValue, GuifyError> {
    let unsupported = || GuifyError::UnsupportedDefault {
        param: param.to_string(),
        found: value.type_str().to_string(),
    };
    match value {
        toml::Value::Boolean(b) => Ok(ParamValue::Bool(*b)),
        toml::Value::Integer(i) => Ok(ParamValue::Int(*i)),
        toml::Value::Float(x) => Ok(ParamValue::Float(*x)),
        toml::Value::String(s) => Ok(ParamValue::Str(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(ParamValue::Paths)
            .ok_or_else(unsupported),
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKELETON: &str = r#"
function = "skeletonize"
title = "Skeleton analysis"
capitalize = true
pipeline_context = true

[[param]]
name = "threshold_radius"
default = 5e-8

[[param]]
name = "smooth_method"
default = "Gaussian"

[[param]]
name = "scale_metadata"
kind = "file"

[[param]]
name = "crop_radius"
kind = "integer"
default = 0
"#;

    #[test]
    fn test_parse_definition() {
        let def = FormDefinition::parse(SKELETON).unwrap();
        assert_eq!(def.function, "skeletonize");
        let options = def.options();
        assert!(options.capitalize && options.pipeline_context);
        assert_eq!(options.title.as_deref(), Some("Skeleton analysis"));

        let params = def.signature().unwrap().resolve().unwrap();
        let kinds: Vec<_> = params.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [ParamKind::Float, ParamKind::Str, ParamKind::FilePath, ParamKind::Int]
        );
        assert_eq!(params[0].default, Some(ParamValue::Float(5e-8)));
    }

    #[test]
    fn test_unknown_kind_fails_fast() {
        let def = FormDefinition::parse(
            r#"
function = "f"
[[param]]
name = "z"
kind = "complex"
"#,
        )
        .unwrap();
        assert!(matches!(def.signature(), Err(GuifyError::UnknownKind(k)) if k == "complex"));
    }

    #[test]
    fn test_unsupported_default() {
        let def = FormDefinition::parse(
            r#"
function = "f"
[[param]]
name = "when"
default = { year = 2024 }
"#,
        )
        .unwrap();
        assert!(matches!(
            def.signature(),
            Err(GuifyError::UnsupportedDefault { param, .. }) if param == "when"
        ));
    }

    #[test]
    fn test_untyped_parameter_surfaces_at_resolve() {
        let def = FormDefinition::parse("function = \"f\"\n[[param]]\nname = \"x\"\n").unwrap();
        let err = def.signature().unwrap().resolve().unwrap_err();
        assert!(matches!(err, GuifyError::MissingType { .. }));
    }

    #[test]
    fn test_demo_matches_example() {
        let params = FormDefinition::demo().signature().unwrap().resolve().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].default, Some(ParamValue::Int(3)));
        assert_eq!(params[1].kind, ParamKind::Bool);
    }

    #[test]
    fn test_bad_toml_is_reported() {
        assert!(matches!(FormDefinition::parse("function = "), Err(GuifyError::Toml(_))));
    }
}
