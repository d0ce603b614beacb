//! Column type mapping
//!
//! Static table mapping a model's semantic column type to the XSD base type
//! and to the named "wrapper" complex type used when a column needs facets.
//! Wrappers extend the base type with the optional `type` attribute that
//! serialized records carry on every scalar element.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::restrictions::facets::{
    XSD_ENUMERATION, XSD_FRACTION_DIGITS, XSD_LENGTH, XSD_MAX_EXCLUSIVE, XSD_MAX_INCLUSIVE,
    XSD_MAX_LENGTH, XSD_MIN_EXCLUSIVE, XSD_MIN_INCLUSIVE, XSD_MIN_LENGTH, XSD_PATTERN,
    XSD_TOTAL_DIGITS, XSD_WHITE_SPACE,
};

/// Semantic type of a column as reported by the model layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// Short string
    String,
    /// Long text
    Text,
    /// Whole number
    Integer,
    /// Floating point number
    Float,
    /// Exact decimal number
    Decimal,
    /// Boolean
    Boolean,
    /// Calendar date
    Date,
    /// Date and time
    DateTime,
    /// Time of day
    Time,
    /// Binary blob
    Binary,
    /// A type name without a mapping
    Other(String),
}

impl ColumnType {
    /// Get as string
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Binary => "binary",
            ColumnType::Other(name) => name,
        }
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        match s {
            "string" => ColumnType::String,
            "text" => ColumnType::Text,
            "integer" => ColumnType::Integer,
            "float" => ColumnType::Float,
            "decimal" => ColumnType::Decimal,
            "boolean" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::DateTime,
            "time" => ColumnType::Time,
            "binary" => ColumnType::Binary,
            other => ColumnType::Other(other.to_string()),
        }
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        ColumnType::from(s.as_str())
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Admitted Facets Sets
// =============================================================================

lazy_static::lazy_static! {
    /// Facets admitted for string types
    pub static ref STRING_FACETS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(XSD_LENGTH);
        s.insert(XSD_MIN_LENGTH);
        s.insert(XSD_MAX_LENGTH);
        s.insert(XSD_PATTERN);
        s.insert(XSD_ENUMERATION);
        s.insert(XSD_WHITE_SPACE);
        s
    };

    /// Facets admitted for boolean type
    pub static ref BOOLEAN_FACETS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(XSD_PATTERN);
        s.insert(XSD_WHITE_SPACE);
        s
    };

    /// Facets admitted for float and date/time types
    pub static ref ORDERED_FACETS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(XSD_PATTERN);
        s.insert(XSD_ENUMERATION);
        s.insert(XSD_WHITE_SPACE);
        s.insert(XSD_MIN_INCLUSIVE);
        s.insert(XSD_MAX_INCLUSIVE);
        s.insert(XSD_MIN_EXCLUSIVE);
        s.insert(XSD_MAX_EXCLUSIVE);
        s
    };

    /// Facets admitted for decimal and integer types
    pub static ref DECIMAL_FACETS: HashSet<&'static str> = {
        let mut s = (*ORDERED_FACETS).clone();
        s.insert(XSD_TOTAL_DIGITS);
        s.insert(XSD_FRACTION_DIGITS);
        s
    };
}

/// Mapping of one column type
#[derive(Debug, Clone)]
pub struct TypeMapping {
    /// Semantic column type name
    pub column_type: &'static str,
    /// XSD base type (`xs:integer`)
    pub xsd_type: &'static str,
    /// Name of the wrapper complex type (`Integer`)
    pub complex_type: &'static str,
    /// Facets admitted by the base type
    pub admitted_facets: &'static HashSet<&'static str>,
}

impl TypeMapping {
    /// Check if the base type admits a facet
    pub fn admits(&self, facet: &str) -> bool {
        self.admitted_facets.contains(facet)
    }
}

// =============================================================================
// Type Mapping Registry
// =============================================================================

lazy_static::lazy_static! {
    /// Registry of all mapped column types, in emission order
    pub static ref TYPE_MAPPINGS: Vec<TypeMapping> = vec![
        TypeMapping {
            column_type: "integer",
            xsd_type: "xs:integer",
            complex_type: "Integer",
            admitted_facets: &DECIMAL_FACETS,
        },
        TypeMapping {
            column_type: "float",
            xsd_type: "xs:float",
            complex_type: "Float",
            admitted_facets: &ORDERED_FACETS,
        },
        TypeMapping {
            column_type: "decimal",
            xsd_type: "xs:decimal",
            complex_type: "Decimal",
            admitted_facets: &DECIMAL_FACETS,
        },
        TypeMapping {
            column_type: "string",
            xsd_type: "xs:string",
            complex_type: "String",
            admitted_facets: &STRING_FACETS,
        },
        TypeMapping {
            column_type: "text",
            xsd_type: "xs:string",
            complex_type: "Text",
            admitted_facets: &STRING_FACETS,
        },
        TypeMapping {
            column_type: "datetime",
            xsd_type: "xs:dateTime",
            complex_type: "DateTime",
            admitted_facets: &ORDERED_FACETS,
        },
        TypeMapping {
            column_type: "date",
            xsd_type: "xs:date",
            complex_type: "Date",
            admitted_facets: &ORDERED_FACETS,
        },
        TypeMapping {
            column_type: "time",
            xsd_type: "xs:time",
            complex_type: "Time",
            admitted_facets: &ORDERED_FACETS,
        },
        TypeMapping {
            column_type: "boolean",
            xsd_type: "xs:boolean",
            complex_type: "Boolean",
            admitted_facets: &BOOLEAN_FACETS,
        },
        TypeMapping {
            column_type: "binary",
            xsd_type: "xs:base64Binary",
            complex_type: "Binary",
            admitted_facets: &STRING_FACETS,
        },
    ];
}

/// Get the mapping of a column type, `None` if the type is unmapped
pub fn map_type(column_type: &ColumnType) -> Option<&'static TypeMapping> {
    let name = column_type.as_str();
    TYPE_MAPPINGS.iter().find(|m| m.column_type == name)
}

/// Whether a name is taken by a wrapper complex type
pub fn is_wrapper_type(name: &str) -> bool {
    TYPE_MAPPINGS.iter().any(|m| m.complex_type == name)
}

/// Position of a wrapper type in the registry, used to order emitted wrappers
pub fn mapping_index(complex_type: &str) -> usize {
    TYPE_MAPPINGS
        .iter()
        .position(|m| m.complex_type == complex_type)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_named_type_is_mapped() {
        for name in [
            "string", "text", "integer", "float", "decimal", "boolean", "date", "datetime",
            "time", "binary",
        ] {
            let column_type = ColumnType::from(name);
            assert!(!matches!(column_type, ColumnType::Other(_)), "{}", name);
            assert!(map_type(&column_type).is_some(), "{} should be mapped", name);
        }
    }

    #[test]
    fn test_map_type() {
        let mapping = map_type(&ColumnType::DateTime).unwrap();
        assert_eq!(mapping.xsd_type, "xs:dateTime");
        assert_eq!(mapping.complex_type, "DateTime");

        let text = map_type(&ColumnType::Text).unwrap();
        assert_eq!(text.xsd_type, "xs:string");
        assert_eq!(text.complex_type, "Text");
    }

    #[test]
    fn test_unknown_type() {
        let uuid = ColumnType::from("uuid");
        assert_eq!(uuid, ColumnType::Other("uuid".to_string()));
        assert!(map_type(&uuid).is_none());
    }

    #[test]
    fn test_admitted_facets() {
        let integer = map_type(&ColumnType::Integer).unwrap();
        assert!(integer.admits(XSD_FRACTION_DIGITS));
        assert!(!integer.admits(XSD_MAX_LENGTH));

        let float = map_type(&ColumnType::Float).unwrap();
        assert!(!float.admits(XSD_FRACTION_DIGITS));
        assert!(float.admits(XSD_MIN_INCLUSIVE));

        let boolean = map_type(&ColumnType::Boolean).unwrap();
        assert!(!boolean.admits(XSD_ENUMERATION));
    }
}
