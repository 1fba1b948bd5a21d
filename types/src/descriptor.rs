//! Type descriptors: what a constructor accepts.
//!
//! A descriptor names a constructible type and, when the type declares a
//! constructor, its ordered parameter list. Positions are assigned at
//! construction time, so a descriptor's parameters always occupy `0..len`
//! in order and carry unique names.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One declared constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    position: usize,
    default: Option<Value>,
}

impl ParameterDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    /// Declared default. `None` for required parameters.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("type name must not be empty")]
    EmptyTypeName,
    #[error("empty parameter name at position {position} of type {type_name}")]
    EmptyParameterName { type_name: String, position: usize },
    #[error("duplicate parameter '{name}' on type {type_name}")]
    DuplicateParameter { type_name: String, name: String },
}

/// Constructor metadata for a single type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTypeDescriptor")]
pub struct TypeDescriptor {
    name: String,
    constructor: Option<Vec<ParameterDescriptor>>,
}

impl TypeDescriptor {
    /// A descriptor for a type that declares no constructor.
    ///
    /// Calling [`required`](Self::required) or [`optional`](Self::optional)
    /// turns it into one with a constructor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor: None,
        }
    }

    /// A descriptor whose constructor takes no parameters.
    #[must_use]
    pub fn nullary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor: Some(Vec::new()),
        }
    }

    /// Checked construction from `(name, default)` pairs in position order.
    pub fn with_parameters<I, S>(
        name: impl Into<String>,
        parameters: I,
    ) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = (S, Option<Value>)>,
        S: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DescriptorError::EmptyTypeName);
        }

        let mut params = Vec::new();
        for (position, (param, default)) in parameters.into_iter().enumerate() {
            let param = param.into();
            check_parameter(&name, &params, &param)?;
            params.push(ParameterDescriptor {
                name: param,
                position,
                default,
            });
        }

        Ok(Self {
            name,
            constructor: Some(params),
        })
    }

    /// Append a required parameter.
    ///
    /// # Panics
    /// If `name` is blank or already declared.
    #[must_use]
    pub fn required(self, name: impl Into<String>) -> Self {
        self.push_parameter(name.into(), None)
    }

    /// Append an optional parameter with its declared default.
    ///
    /// # Panics
    /// If `name` is blank or already declared.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.push_parameter(name.into(), Some(default.into()))
    }

    fn push_parameter(mut self, name: String, default: Option<Value>) -> Self {
        let params = self.constructor.get_or_insert_with(Vec::new);
        if let Err(err) = check_parameter(&self.name, params, &name) {
            panic!("{err}");
        }
        let position = params.len();
        params.push(ParameterDescriptor {
            name,
            position,
            default,
        });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Parameters in position order. Empty when there is no constructor.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        self.constructor.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters().iter().find(|p| p.name == name)
    }
}

/// Rules shared by every way of declaring a parameter.
fn check_parameter(
    type_name: &str,
    declared: &[ParameterDescriptor],
    name: &str,
) -> Result<(), DescriptorError> {
    if name.trim().is_empty() {
        return Err(DescriptorError::EmptyParameterName {
            type_name: type_name.to_string(),
            position: declared.len(),
        });
    }
    if declared.iter().any(|p| p.name == name) {
        return Err(DescriptorError::DuplicateParameter {
            type_name: type_name.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        let Some(params) = &self.constructor else {
            return Ok(());
        };
        f.write_str("(")?;
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &param.default {
                Some(default) => write!(f, "{}={default}", param.name)?,
                None => f.write_str(&param.name)?,
            }
        }
        f.write_str(")")
    }
}

// ── Deserialization ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameter {
    name: String,
    #[serde(default)]
    optional: bool,
    default: Option<Value>,
}

/// Wire form. An absent `parameters` key means "no constructor"; an empty
/// list means a nullary constructor.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTypeDescriptor {
    name: String,
    parameters: Option<Vec<RawParameter>>,
}

impl TryFrom<RawTypeDescriptor> for TypeDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawTypeDescriptor) -> Result<Self, Self::Error> {
        let Some(parameters) = raw.parameters else {
            if raw.name.trim().is_empty() {
                return Err(DescriptorError::EmptyTypeName);
            }
            return Ok(Self::new(raw.name));
        };
        let parameters = parameters.into_iter().map(|p| {
            // `optional = true` without a default means the default is null.
            let default = match (p.default, p.optional) {
                (Some(value), _) => Some(value),
                (None, true) => Some(Value::Null),
                (None, false) => None,
            };
            (p.name, default)
        });
        Self::with_parameters(raw.name, parameters)
    }
}
