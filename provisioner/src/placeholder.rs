//! Parsing and substitution of `${...}` placeholders.
//!
//! Three forms are recognised inside any JSON string of a template:
//! - `${<resource>.address}`: the runtime address of a resource
//! - `${<resource>.code_id}`: the code id a resource was instantiated from
//! - `${var:<key>}`: a run-level variable such as the deployer address
//!
//! A string that is exactly one `code_id` placeholder becomes a JSON number,
//! everything else is interpolated as text.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use serde_json::{Map, Value};

use crate::{
    errors::{ResolveError, TemplateError},
    registry::ResolvedRegistry,
};

/// Run-level values available to `${var:<key>}` placeholders
pub type Variables = BTreeMap<String, String>;

/// The prefix that marks a variable placeholder
const VAR_PREFIX: &str = "var:";

/// A reference to another resource's identity, or to a run variable
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `${<resource>.address}`
    Address(String),
    /// `${<resource>.code_id}`
    CodeId(String),
    /// `${var:<key>}`
    Var(String),
}

impl Placeholder {
    /// The resource this placeholder depends on, if any
    pub fn resource(&self) -> Option<&str> {
        match self {
            Placeholder::Address(name) | Placeholder::CodeId(name) => Some(name),
            Placeholder::Var(_) => None,
        }
    }

    fn parse(inner: &str) -> Result<Self, TemplateError> {
        if let Some(key) = inner.strip_prefix(VAR_PREFIX) {
            if key.is_empty() {
                return Err(TemplateError(format!("`${{{}}}` names no variable", inner)));
            }
            return Ok(Placeholder::Var(key.to_string()));
        }

        let (name, field) = inner
            .rsplit_once('.')
            .ok_or_else(|| TemplateError(format!("`${{{}}}` has no field", inner)))?;
        if name.is_empty() {
            return Err(TemplateError(format!("`${{{}}}` names no resource", inner)));
        }

        match field {
            "address" => Ok(Placeholder::Address(name.to_string())),
            "code_id" => Ok(Placeholder::CodeId(name.to_string())),
            other => Err(TemplateError(format!(
                "unknown field `{}` in `${{{}}}`",
                other, inner
            ))),
        }
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Address(name) => write!(f, "${{{}.address}}", name),
            Placeholder::CodeId(name) => write!(f, "${{{}.code_id}}", name),
            Placeholder::Var(key) => write!(f, "${{{}{}}}", VAR_PREFIX, key),
        }
    }
}

/// A piece of a template string
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    Slot(Placeholder),
}

fn segments(s: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut out = Vec::new();
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        if start > 0 {
            out.push(Segment::Literal(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| TemplateError(format!("unterminated `${{` in `{}`", s)))?;
        out.push(Segment::Slot(Placeholder::parse(&after[..end])?));
        rest = &after[end + 1..];
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    Ok(out)
}

/// All placeholders in a string, in order of appearance
pub fn placeholders_in_str(s: &str) -> Result<Vec<Placeholder>, TemplateError> {
    Ok(segments(s)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Slot(p) => Some(p),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// All placeholders in the string leaves of a JSON value, in document order
pub fn placeholders_in(value: &Value) -> Result<Vec<Placeholder>, TemplateError> {
    let mut found = Vec::new();
    collect(value, &mut found)?;
    Ok(found)
}

fn collect(value: &Value, found: &mut Vec<Placeholder>) -> Result<(), TemplateError> {
    match value {
        Value::String(s) => found.extend(placeholders_in_str(s)?),
        Value::Array(items) => {
            for item in items {
                collect(item, found)?;
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect(item, found)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

/// Fills placeholders from a registry and a set of variables
pub struct Resolver<'a> {
    /// Resources provisioned so far
    registry: &'a ResolvedRegistry,
    /// Run-level variables
    variables: &'a Variables,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given registry and variables
    pub fn new(registry: &'a ResolvedRegistry, variables: &'a Variables) -> Self {
        Self {
            registry,
            variables,
        }
    }

    fn lookup(&self, placeholder: &Placeholder) -> Result<String, ResolveError> {
        let value = match placeholder {
            Placeholder::Address(name) => self.registry.address(name).map(str::to_string),
            Placeholder::CodeId(name) => self.registry.code_id(name).map(|id| id.to_string()),
            Placeholder::Var(key) => self.variables.get(key).cloned(),
        };

        value.ok_or_else(|| ResolveError::Unresolved(placeholder.clone()))
    }

    /// Interpolate every placeholder of a string
    pub fn resolve_str(&self, s: &str) -> Result<String, ResolveError> {
        let mut out = String::with_capacity(s.len());
        for segment in segments(s)? {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(p) => out.push_str(&self.lookup(&p)?),
            }
        }
        Ok(out)
    }

    /// Substitute every placeholder in a JSON value
    pub fn resolve_value(&self, value: &Value) -> Result<Value, ResolveError> {
        match value {
            Value::String(s) => {
                let parsed = segments(s)?;
                if let [Segment::Slot(Placeholder::CodeId(name))] = parsed.as_slice() {
                    let code_id = self
                        .registry
                        .code_id(name)
                        .ok_or_else(|| ResolveError::Unresolved(Placeholder::CodeId(name.clone())))?;
                    return Ok(Value::from(code_id));
                }
                Ok(Value::String(self.resolve_str(s)?))
            }
            Value::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_value(item))
                    .collect::<Result<_, _>>()?,
            )),
            Value::Object(map) => Ok(Value::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.resolve_value(v)?)))
                    .collect::<Result<Map<_, _>, ResolveError>>()?,
            )),
            other => Ok(other.clone()),
        }
    }

    /// Resolve an operation target to an address.
    ///
    /// A target containing placeholders is interpolated; a bare name is
    /// looked up as a provisioned resource.
    pub fn resolve_target(&self, target: &str) -> Result<String, ResolveError> {
        if target.contains("${") {
            return self.resolve_str(target);
        }
        self.lookup(&Placeholder::Address(target.to_string()))
    }
}
