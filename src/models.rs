//! Model descriptors
//!
//! The structural metadata a reflection or ORM layer hands to the generator:
//! columns, validators keyed by attribute name, and associations to other
//! models. Descriptors are plain data; the generator only ever reads them.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::namespaces::QualifiedName;
use crate::types::ColumnType;

/// Well-known validator option names
pub mod options {
    /// Conditional marker: validator only runs when the condition holds
    pub const IF: &str = "if";
    /// Conditional marker: validator only runs unless the condition holds
    pub const UNLESS: &str = "unless";
    /// Blank values are accepted
    pub const ALLOW_BLANK: &str = "allow_blank";
    /// Minimum length
    pub const MINIMUM: &str = "minimum";
    /// Maximum length
    pub const MAXIMUM: &str = "maximum";
    /// Exact length
    pub const IS: &str = "is";
    /// Value set or range
    pub const IN: &str = "in";
    /// Alias of `in`
    pub const WITHIN: &str = "within";
    /// Regular expression of a format validator
    pub const WITH: &str = "with";
    /// Alias of `with`
    pub const FORMAT: &str = "format";
    /// Exclusive lower bound
    pub const GREATER_THAN: &str = "greater_than";
    /// Inclusive lower bound
    pub const GREATER_THAN_OR_EQUAL_TO: &str = "greater_than_or_equal_to";
    /// Exclusive upper bound
    pub const LESS_THAN: &str = "less_than";
    /// Inclusive upper bound
    pub const LESS_THAN_OR_EQUAL_TO: &str = "less_than_or_equal_to";
    /// Exact value
    pub const EQUAL_TO: &str = "equal_to";
    /// Only whole numbers are accepted
    pub const ONLY_INTEGER: &str = "only_integer";
    /// Additional columns of a uniqueness scope
    pub const SCOPE: &str = "scope";
}

/// A column of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Attribute name
    pub name: String,
    /// Semantic column type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether storage accepts NULL; informational only, presence is
    /// governed by validators
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Create a new nullable column
    pub fn new(name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
        }
    }

    /// Set storage nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Kind of a validator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidatorKind {
    /// Value must be present
    Presence,
    /// Length bounds
    Length,
    /// Regular expression format
    Format,
    /// Numeric bounds
    Numericality,
    /// Value must be one of an explicit set
    Inclusion,
    /// Value must be unique across the collection
    Uniqueness,
    /// Any other validator, identified by name
    Custom(String),
}

impl ValidatorKind {
    /// Get as string
    pub fn as_str(&self) -> &str {
        match self {
            ValidatorKind::Presence => "presence",
            ValidatorKind::Length => "length",
            ValidatorKind::Format => "format",
            ValidatorKind::Numericality => "numericality",
            ValidatorKind::Inclusion => "inclusion",
            ValidatorKind::Uniqueness => "uniqueness",
            ValidatorKind::Custom(name) => name,
        }
    }
}

impl From<&str> for ValidatorKind {
    fn from(s: &str) -> Self {
        match s {
            "presence" => ValidatorKind::Presence,
            "length" => ValidatorKind::Length,
            "format" | "pattern" => ValidatorKind::Format,
            "numericality" => ValidatorKind::Numericality,
            "inclusion" | "enumeration" => ValidatorKind::Inclusion,
            "uniqueness" => ValidatorKind::Uniqueness,
            other => ValidatorKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for ValidatorKind {
    fn from(s: String) -> Self {
        ValidatorKind::from(s.as_str())
    }
}

impl From<ValidatorKind> for String {
    fn from(kind: ValidatorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value of a validator option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// No value
    Null,
    /// Boolean flag
    Bool(bool),
    /// Whole number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Text: regular expressions, condition names, string values
    Text(String),
    /// Explicit list of values
    List(Vec<OptionValue>),
    /// Inclusive integer range
    Range {
        /// Lower bound
        from: i64,
        /// Upper bound
        to: i64,
    },
}

impl OptionValue {
    /// Whether the value is `true`
    pub fn is_true(&self) -> bool {
        matches!(self, OptionValue::Bool(true))
    }

    /// Whether the value is absent
    pub fn is_null(&self) -> bool {
        matches!(self, OptionValue::Null)
    }

    /// Get as a non-negative count
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            OptionValue::Integer(i) => usize::try_from(*i).ok(),
            OptionValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get as an exact decimal
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            OptionValue::Integer(i) => Some(Decimal::from(*i)),
            OptionValue::Float(f) => Decimal::try_from(*f).ok(),
            OptionValue::Text(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Get as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Null => Ok(()),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::Text(s) => write!(f, "{}", s),
            OptionValue::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            OptionValue::Range { from, to } => write!(f, "{}..{}", from, to),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Integer(i)
    }
}

impl From<i32> for OptionValue {
    fn from(i: i32) -> Self {
        OptionValue::Integer(i64::from(i))
    }
}

impl From<usize> for OptionValue {
    fn from(n: usize) -> Self {
        OptionValue::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        OptionValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<std::ops::RangeInclusive<i64>> for OptionValue {
    fn from(range: std::ops::RangeInclusive<i64>) -> Self {
        OptionValue::Range {
            from: *range.start(),
            to: *range.end(),
        }
    }
}

impl From<std::ops::RangeInclusive<i32>> for OptionValue {
    fn from(range: std::ops::RangeInclusive<i32>) -> Self {
        OptionValue::Range {
            from: i64::from(*range.start()),
            to: i64::from(*range.end()),
        }
    }
}

/// A validator declared on one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorDescriptor {
    /// Validated attribute; filled from the validators map key when omitted
    #[serde(default)]
    pub attribute: String,
    /// Validator kind
    pub kind: ValidatorKind,
    /// Validator options
    #[serde(default)]
    pub options: IndexMap<String, OptionValue>,
}

impl ValidatorDescriptor {
    /// Create a new validator without options
    pub fn new(attribute: impl Into<String>, kind: impl Into<ValidatorKind>) -> Self {
        Self {
            attribute: attribute.into(),
            kind: kind.into(),
            options: IndexMap::new(),
        }
    }

    /// Presence validator
    pub fn presence(attribute: impl Into<String>) -> Self {
        Self::new(attribute, ValidatorKind::Presence)
    }

    /// Length validator
    pub fn length(attribute: impl Into<String>) -> Self {
        Self::new(attribute, ValidatorKind::Length)
    }

    /// Format validator matching a regular expression
    pub fn format(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(attribute, ValidatorKind::Format).with_option(options::WITH, pattern.into())
    }

    /// Numericality validator
    pub fn numericality(attribute: impl Into<String>) -> Self {
        Self::new(attribute, ValidatorKind::Numericality)
    }

    /// Inclusion validator over an explicit value set
    pub fn inclusion(attribute: impl Into<String>, values: impl Into<OptionValue>) -> Self {
        Self::new(attribute, ValidatorKind::Inclusion).with_option(options::IN, values)
    }

    /// Uniqueness validator
    pub fn uniqueness(attribute: impl Into<String>) -> Self {
        Self::new(attribute, ValidatorKind::Uniqueness)
    }

    /// Set an option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Get an option value, treating explicit nulls as absent
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name).filter(|v| !v.is_null())
    }

    /// First present option among aliases
    pub fn option_any(&self, names: &[&str]) -> Option<&OptionValue> {
        names.iter().find_map(|name| self.option(name))
    }

    /// Whether the validator only runs under an `if`/`unless` condition
    pub fn is_conditional(&self) -> bool {
        self.option(options::IF).is_some() || self.option(options::UNLESS).is_some()
    }

    /// Whether blank values are explicitly tolerated
    pub fn allows_blank(&self) -> bool {
        self.option(options::ALLOW_BLANK).is_some_and(OptionValue::is_true)
    }
}

/// Association cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// To-one (`has_one`, `belongs_to`)
    One,
    /// To-many (`has_many`)
    Many,
}

/// An association to another model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDescriptor {
    /// Association name
    pub name: String,
    /// Identity of the associated model
    pub target: QualifiedName,
    /// Cardinality
    pub cardinality: Cardinality,
    /// Whether nested attributes are accepted for this association
    #[serde(default)]
    pub nested_attributes: bool,
}

impl AssociationDescriptor {
    /// To-one association
    pub fn one(name: impl Into<String>, target: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::One,
            nested_attributes: false,
        }
    }

    /// To-many association
    pub fn many(name: impl Into<String>, target: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::Many,
            nested_attributes: false,
        }
    }

    /// Accept nested attributes for this association
    pub fn nested(mut self) -> Self {
        self.nested_attributes = true;
        self
    }
}

/// Structural description of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Qualified model identity
    pub name: QualifiedName,
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    /// Validators keyed by attribute name, in declaration order
    #[serde(default)]
    pub validators: IndexMap<String, Vec<ValidatorDescriptor>>,
    /// Associations in declaration order
    #[serde(default)]
    pub associations: Vec<AssociationDescriptor>,
}

impl ModelDescriptor {
    /// Create an empty model
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            validators: IndexMap::new(),
            associations: Vec::new(),
        }
    }

    /// Add a column
    pub fn column(mut self, name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        self.columns.push(ColumnDescriptor::new(name, column_type));
        self
    }

    /// Add a validator, keyed by its attribute
    pub fn validates(mut self, validator: ValidatorDescriptor) -> Self {
        self.validators
            .entry(validator.attribute.clone())
            .or_default()
            .push(validator);
        self
    }

    /// Add an association
    pub fn association(mut self, association: AssociationDescriptor) -> Self {
        self.associations.push(association);
        self
    }

    /// Validators declared for an attribute
    pub fn validators_for(&self, attribute: &str) -> &[ValidatorDescriptor] {
        self.validators
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_flags() {
        let plain = ValidatorDescriptor::presence("name");
        assert!(!plain.is_conditional());
        assert!(!plain.allows_blank());

        let blank = ValidatorDescriptor::presence("name").with_option(options::ALLOW_BLANK, true);
        assert!(blank.allows_blank());

        let explicit_false =
            ValidatorDescriptor::presence("name").with_option(options::ALLOW_BLANK, false);
        assert!(!explicit_false.allows_blank());

        let conditional = ValidatorDescriptor::presence("name").with_option(options::IF, "published?");
        assert!(conditional.is_conditional());

        let null_condition =
            ValidatorDescriptor::presence("name").with_option(options::UNLESS, OptionValue::Null);
        assert!(!null_condition.is_conditional());
    }

    #[test]
    fn test_option_value_conversions() {
        assert_eq!(OptionValue::from(5).as_usize(), Some(5));
        assert_eq!(OptionValue::from(-1).as_usize(), None);
        assert_eq!(
            OptionValue::from("2.50").as_decimal().map(|d| d.normalize().to_string()),
            Some("2.5".to_string())
        );
        assert_eq!(OptionValue::from(vec!["a", "b"]).to_string(), "a b");
        assert_eq!(OptionValue::from(1..=3), OptionValue::Range { from: 1, to: 3 });
    }

    #[test]
    fn test_validator_kind_aliases() {
        assert_eq!(ValidatorKind::from("pattern"), ValidatorKind::Format);
        assert_eq!(ValidatorKind::from("enumeration"), ValidatorKind::Inclusion);
        assert_eq!(
            ValidatorKind::from("confirmation"),
            ValidatorKind::Custom("confirmation".to_string())
        );
    }

    #[test]
    fn test_model_builder() {
        let model = ModelDescriptor::new("Shop::Order")
            .column("total", "decimal")
            .validates(ValidatorDescriptor::presence("total"))
            .validates(ValidatorDescriptor::numericality("total"))
            .association(AssociationDescriptor::many("line_items", "Shop::LineItem").nested());

        assert_eq!(model.validators_for("total").len(), 2);
        assert!(model.validators_for("missing").is_empty());
        assert_eq!(model.find_column("total").map(|c| &c.column_type), Some(&ColumnType::Decimal));
        assert!(model.associations[0].nested_attributes);
    }

    #[test]
    fn test_model_from_json() {
        let json = r#"{
            "name": "Blog",
            "columns": [{"name": "title", "type": "string"}],
            "validators": {"title": [{"kind": "length", "options": {"maximum": 80, "in": {"from": 1, "to": 80}}}]},
            "associations": [{"name": "posts", "target": "Post", "cardinality": "many", "nested_attributes": true}]
        }"#;
        let model: ModelDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(model.name, QualifiedName::local("Blog"));
        let length = &model.validators_for("title")[0];
        assert_eq!(length.kind, ValidatorKind::Length);
        assert_eq!(length.option(options::MAXIMUM), Some(&OptionValue::Integer(80)));
        assert_eq!(
            length.option(options::IN),
            Some(&OptionValue::Range { from: 1, to: 80 })
        );
        assert_eq!(model.associations[0].cardinality, Cardinality::Many);
    }
}
