//! Customization tree and its builder
//!
//! A [`Sandbox`] collects the caller's overrides for one model: elements to
//! ignore, elements to force in (optionally with a nested shape that the
//! model itself does not describe) and per-element occurrence overrides.
//! [`Sandbox::build`] hands back an immutable [`Customization`].
//!
//! All names are dasherized on entry and must be valid NCNames afterwards,
//! so malformed input is rejected while the tree is built rather than when a
//! document is generated.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::Value;

use crate::error::CustomizationError;
use crate::names::{dasherize, is_valid_ncname};

type CustomizationResult<T> = std::result::Result<T, CustomizationError>;

/// Shape of a forced element
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "Value")]
pub enum ElementSpec {
    /// Leaf element, shape inferred (untyped when nothing is known)
    #[default]
    Leaf,
    /// Complex element with an unordered group of children
    Nested(IndexMap<String, ElementSpec>),
    /// Array element repeating the named children
    Sequence(Vec<String>),
}

impl ElementSpec {
    /// Leaf element
    pub fn leaf() -> Self {
        ElementSpec::Leaf
    }

    /// Nested mapping of child names to child shapes
    pub fn nested<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, ElementSpec)>,
        K: Into<String>,
    {
        ElementSpec::Nested(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Sequence of repeated child names
    pub fn sequence<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ElementSpec::Sequence(children.into_iter().map(Into::into).collect())
    }

    /// Parse a JSON shape: `null` is a leaf, an object a nested mapping and
    /// an array of strings a sequence
    pub fn from_json(value: &Value) -> CustomizationResult<Self> {
        match value {
            Value::Null => Ok(ElementSpec::Leaf),
            Value::Object(map) => map
                .iter()
                .map(|(name, child)| Ok((name.clone(), ElementSpec::from_json(child)?)))
                .collect::<CustomizationResult<IndexMap<_, _>>>()
                .map(ElementSpec::Nested),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        CustomizationError::new("Malformed sequence")
                            .with_reason(format!("expected an element name, found {}", item))
                    })
                })
                .collect::<CustomizationResult<Vec<_>>>()
                .map(ElementSpec::Sequence),
            other => Err(CustomizationError::new("Malformed element specification")
                .with_reason(format!("expected null, an object or an array, found {}", other))),
        }
    }

    /// Dasherize every name in the tree and validate it
    fn normalize(&self, path: &str) -> CustomizationResult<Self> {
        match self {
            ElementSpec::Leaf => Ok(ElementSpec::Leaf),
            ElementSpec::Nested(children) => {
                let mut normalized = IndexMap::with_capacity(children.len());
                for (name, child) in children {
                    let child_name = element_name(name)?;
                    let child_path = format!("{}/{}", path, child_name);
                    let child = child.normalize(&child_path)?;
                    if normalized.insert(child_name, child).is_some() {
                        return Err(CustomizationError::new("Duplicate nested element")
                            .with_element(child_path));
                    }
                }
                Ok(ElementSpec::Nested(normalized))
            }
            ElementSpec::Sequence(children) => {
                let mut seen = IndexSet::with_capacity(children.len());
                for name in children {
                    let child_name = element_name(name)?;
                    if !seen.insert(child_name.clone()) {
                        return Err(CustomizationError::new("Duplicate sequence child")
                            .with_element(format!("{}/{}", path, child_name)));
                    }
                }
                Ok(ElementSpec::Sequence(seen.into_iter().collect()))
            }
        }
    }
}

impl TryFrom<Value> for ElementSpec {
    type Error = CustomizationError;

    fn try_from(value: Value) -> CustomizationResult<Self> {
        ElementSpec::from_json(&value)
    }
}

fn element_name(name: &str) -> CustomizationResult<String> {
    let dasherized = dasherize(name);
    if is_valid_ncname(&dasherized) {
        Ok(dasherized)
    } else {
        Err(CustomizationError::new("Invalid element name")
            .with_element(name)
            .with_reason("not a valid XML NCName"))
    }
}

/// Immutable customization tree of one model
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "Value")]
pub struct Customization {
    ignored: IndexSet<String>,
    elements: IndexMap<String, ElementSpec>,
    required: IndexSet<String>,
    not_required: IndexSet<String>,
}

impl Customization {
    /// Start building a customization
    pub fn builder() -> Sandbox {
        Sandbox::new()
    }

    /// Check if an element is ignored
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(&dasherize(name))
    }

    /// Ignored element names
    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.ignored.iter().map(String::as_str)
    }

    /// Forced element of that name
    pub fn element(&self, name: &str) -> Option<&ElementSpec> {
        self.elements.get(&dasherize(name))
    }

    /// Forced elements in declaration order
    pub fn elements(&self) -> impl Iterator<Item = (&str, &ElementSpec)> {
        self.elements.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// `Some(true)` if forced required, `Some(false)` if forced optional
    pub fn occurrence_override(&self, name: &str) -> Option<bool> {
        let name = dasherize(name);
        if self.required.contains(&name) {
            Some(true)
        } else if self.not_required.contains(&name) {
            Some(false)
        } else {
            None
        }
    }

    /// Check if nothing is customized
    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty()
            && self.elements.is_empty()
            && self.required.is_empty()
            && self.not_required.is_empty()
    }

    /// Copy of the tree with extra synthetic elements; an element of the
    /// same name is replaced
    pub fn with_methods<'m, I>(&self, methods: I) -> CustomizationResult<Self>
    where
        I: IntoIterator<Item = (&'m String, &'m ElementSpec)>,
    {
        let mut merged = self.clone();
        for (name, spec) in methods {
            let element = element_name(name)?;
            let spec = spec.normalize(&element)?;
            merged.elements.insert(element, spec);
        }
        Ok(merged)
    }

    /// Parse a customization from JSON
    ///
    /// ```json
    /// {"ignore": ["secret"], "elements": {"tags": ["tag"]},
    ///  "required": ["title"], "not_required": ["body"]}
    /// ```
    pub fn from_json(value: &Value) -> CustomizationResult<Self> {
        let Value::Object(map) = value else {
            return Err(CustomizationError::new("Malformed customization")
                .with_reason(format!("expected an object, found {}", value)));
        };

        let mut sandbox = Sandbox::new();
        for (key, entry) in map {
            match key.as_str() {
                "ignore" => {
                    sandbox.ignore(string_list(key, entry)?)?;
                }
                "required" => {
                    sandbox.required(string_list(key, entry)?)?;
                }
                "not_required" => {
                    sandbox.not_required(string_list(key, entry)?)?;
                }
                "elements" => {
                    let Value::Object(elements) = entry else {
                        return Err(CustomizationError::new("Malformed customization")
                            .with_element(key.as_str())
                            .with_reason("expected an object of element specifications"));
                    };
                    for (name, spec) in elements {
                        sandbox.element_with(name, ElementSpec::from_json(spec)?)?;
                    }
                }
                other => {
                    return Err(CustomizationError::new("Unknown customization key")
                        .with_element(other))
                }
            }
        }
        Ok(sandbox.build())
    }
}

impl TryFrom<Value> for Customization {
    type Error = CustomizationError;

    fn try_from(value: Value) -> CustomizationResult<Self> {
        Customization::from_json(&value)
    }
}

fn string_list(key: &str, value: &Value) -> CustomizationResult<Vec<String>> {
    let malformed = || {
        CustomizationError::new("Malformed customization")
            .with_element(key)
            .with_reason("expected an array of names")
    };
    value
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(malformed))
        .collect()
}

/// Builder of a [`Customization`]
///
/// ```
/// use modelxsd::{ElementSpec, Sandbox};
///
/// let customization = Sandbox::new()
///     .ignore(["secret_token"])?
///     .element("foo")?
///     .element_with("bar", ElementSpec::sequence(["baz"]))?
///     .build();
///
/// assert!(customization.is_ignored("secret-token"));
/// # Ok::<(), modelxsd::CustomizationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    customization: Customization,
}

impl Sandbox {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip these attributes and associations entirely
    pub fn ignore<I, S>(&mut self, names: I) -> CustomizationResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = element_name(name.as_ref())?;
            self.customization.ignored.insert(name);
        }
        Ok(self)
    }

    /// Force in a leaf element
    pub fn element(&mut self, name: &str) -> CustomizationResult<&mut Self> {
        self.element_with(name, ElementSpec::Leaf)
    }

    /// Force in an element with an explicit shape
    ///
    /// Adding the same element twice with the same shape is a no-op; adding
    /// it with a different shape is an error.
    pub fn element_with(&mut self, name: &str, spec: ElementSpec) -> CustomizationResult<&mut Self> {
        let element = element_name(name)?;
        let spec = spec.normalize(&element)?;

        match self.customization.elements.get(&element) {
            Some(existing) if *existing != spec => {
                return Err(CustomizationError::new("Conflicting element specification")
                    .with_element(element)
                    .with_reason("already declared with a different shape"));
            }
            Some(_) => {}
            None => {
                self.customization.elements.insert(element, spec);
            }
        }
        Ok(self)
    }

    /// Force these elements to be required
    pub fn required<I, S>(&mut self, names: I) -> CustomizationResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = element_name(name.as_ref())?;
            if self.customization.not_required.contains(&name) {
                return Err(conflicting_occurrence(name));
            }
            self.customization.required.insert(name);
        }
        Ok(self)
    }

    /// Force these elements to be optional
    pub fn not_required<I, S>(&mut self, names: I) -> CustomizationResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = element_name(name.as_ref())?;
            if self.customization.required.contains(&name) {
                return Err(conflicting_occurrence(name));
            }
            self.customization.not_required.insert(name);
        }
        Ok(self)
    }

    /// The customization built so far
    pub fn build(&self) -> Customization {
        self.customization.clone()
    }
}

fn conflicting_occurrence(name: String) -> CustomizationError {
    CustomizationError::new("Conflicting occurrence override")
        .with_element(name)
        .with_reason("declared both required and not required")
}
