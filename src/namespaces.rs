//! Model identities and XSD namespace handling
//!
//! Models are addressed by a qualified name: the namespace path the model
//! class lives under plus its base class name. Type naming only ever uses the
//! base name, so two models with the same base name in different namespaces
//! map to the same complex type name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::XSD_NAMESPACE;

/// Prefix bound to the XSD namespace in generated documents
pub const XS_PREFIX: &str = "xs";

/// Separator used when rendering a qualified name
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Qualified model name: namespace segments plus the base class name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct QualifiedName {
    /// Enclosing namespace segments, outermost first
    pub namespace: Vec<String>,
    /// Base class name
    pub name: String,
}

impl QualifiedName {
    /// Create a new qualified name
    pub fn new<I, S>(namespace: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }

    /// Create a qualified name declared at the top level
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            namespace: Vec::new(),
            name: name.into(),
        }
    }

    /// Parse `Outer::Inner::Model` (or `Outer.Inner.Model`)
    pub fn parse(qualified: &str) -> Self {
        let normalized = qualified.trim().replace('.', NAMESPACE_SEPARATOR);
        let mut segments: Vec<String> = normalized
            .split(NAMESPACE_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let name = segments.pop().unwrap_or_default();
        Self {
            namespace: segments,
            name,
        }
    }

    /// Base class name without namespace segments
    pub fn base_name(&self) -> &str {
        &self.name
    }

    /// Whether the model is declared inside a namespace
    pub fn is_namespaced(&self) -> bool {
        !self.namespace.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{}{}", segment, NAMESPACE_SEPARATOR)?;
        }
        write!(f, "{}", self.name)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<QualifiedName> for String {
    fn from(q: QualifiedName) -> Self {
        q.to_string()
    }
}

/// Prefix a local XSD component name with the `xs` prefix
pub fn xs(local_name: &str) -> String {
    format!("{}:{}", XS_PREFIX, local_name)
}

/// The `xmlns:xs` declaration written on the schema root
pub fn xs_declaration() -> (String, &'static str) {
    (format!("xmlns:{}", XS_PREFIX), XSD_NAMESPACE)
}
