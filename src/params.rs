//! Declarative parameter lists standing in for a function signature.

use std::collections::HashSet;

use crate::error::GuifyError;
use crate::types::{ParamKind, ParamValue};

/// One parameter as declared by the caller. Either `kind` or `default` must be
/// present for the parameter to be resolvable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: Option<ParamKind>,
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            default: None,
        }
    }

    pub fn kind(mut self, kind: ParamKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn default_value(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }
}

/// A resolved parameter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<ParamValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub function: String,
    pub params: Vec<ParamSpec>,
}

impl Signature {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Resolves every parameter in declaration order. An explicit kind wins,
    /// otherwise the default's type decides.
    pub fn resolve(&self) -> Result<Vec<Param>, GuifyError> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.params.len());
        for spec in &self.params {
            if !seen.insert(spec.name.to_lowercase()) {
                return Err(GuifyError::DuplicateParameter {
                    param: spec.name.clone(),
                    function: self.function.clone(),
                });
            }
            let kind = match (&spec.kind, &spec.default) {
                (Some(kind), _) => *kind,
                (None, Some(default)) => ParamKind::infer(default),
                (None, None) => {
                    return Err(GuifyError::MissingType {
                        param: spec.name.clone(),
                        function: self.function.clone(),
                    })
                }
            };
            resolved.push(Param {
                name: spec.name.clone(),
                kind,
                default: spec.default.clone(),
            });
        }
        Ok(resolved)
    }
}
