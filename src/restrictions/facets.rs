//! XSD constraining facets
//!
//! The facets a restriction strategy can write into a restriction node.

use std::fmt;

/// XSD length facet name
pub const XSD_LENGTH: &str = "length";
/// XSD minLength facet name
pub const XSD_MIN_LENGTH: &str = "minLength";
/// XSD maxLength facet name
pub const XSD_MAX_LENGTH: &str = "maxLength";
/// XSD pattern facet name
pub const XSD_PATTERN: &str = "pattern";
/// XSD enumeration facet name
pub const XSD_ENUMERATION: &str = "enumeration";
/// XSD whiteSpace facet name
pub const XSD_WHITE_SPACE: &str = "whiteSpace";
/// XSD minInclusive facet name
pub const XSD_MIN_INCLUSIVE: &str = "minInclusive";
/// XSD maxInclusive facet name
pub const XSD_MAX_INCLUSIVE: &str = "maxInclusive";
/// XSD minExclusive facet name
pub const XSD_MIN_EXCLUSIVE: &str = "minExclusive";
/// XSD maxExclusive facet name
pub const XSD_MAX_EXCLUSIVE: &str = "maxExclusive";
/// XSD totalDigits facet name
pub const XSD_TOTAL_DIGITS: &str = "totalDigits";
/// XSD fractionDigits facet name
pub const XSD_FRACTION_DIGITS: &str = "fractionDigits";

/// White space handling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Preserve all white space
    Preserve,
    /// Replace tabs and newlines with spaces
    Replace,
    /// Replace and collapse multiple spaces
    Collapse,
}

impl WhiteSpace {
    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            WhiteSpace::Preserve => "preserve",
            WhiteSpace::Replace => "replace",
            WhiteSpace::Collapse => "collapse",
        }
    }
}

/// A constraining facet inside an `xs:restriction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facet {
    /// Exact length
    Length(usize),
    /// Minimum length
    MinLength(usize),
    /// Maximum length
    MaxLength(usize),
    /// Regular expression in XSD syntax
    Pattern(String),
    /// One admitted value
    Enumeration(String),
    /// White space normalization
    WhiteSpace(WhiteSpace),
    /// Inclusive lower bound
    MinInclusive(String),
    /// Inclusive upper bound
    MaxInclusive(String),
    /// Exclusive lower bound
    MinExclusive(String),
    /// Exclusive upper bound
    MaxExclusive(String),
    /// Maximum number of digits
    TotalDigits(u32),
    /// Maximum number of fraction digits
    FractionDigits(u32),
}

impl Facet {
    /// XSD element name of the facet (without prefix)
    pub fn name(&self) -> &'static str {
        match self {
            Facet::Length(_) => XSD_LENGTH,
            Facet::MinLength(_) => XSD_MIN_LENGTH,
            Facet::MaxLength(_) => XSD_MAX_LENGTH,
            Facet::Pattern(_) => XSD_PATTERN,
            Facet::Enumeration(_) => XSD_ENUMERATION,
            Facet::WhiteSpace(_) => XSD_WHITE_SPACE,
            Facet::MinInclusive(_) => XSD_MIN_INCLUSIVE,
            Facet::MaxInclusive(_) => XSD_MAX_INCLUSIVE,
            Facet::MinExclusive(_) => XSD_MIN_EXCLUSIVE,
            Facet::MaxExclusive(_) => XSD_MAX_EXCLUSIVE,
            Facet::TotalDigits(_) => XSD_TOTAL_DIGITS,
            Facet::FractionDigits(_) => XSD_FRACTION_DIGITS,
        }
    }

    /// Value of the facet's `value` attribute
    pub fn value(&self) -> String {
        match self {
            Facet::Length(n) | Facet::MinLength(n) | Facet::MaxLength(n) => n.to_string(),
            Facet::TotalDigits(n) | Facet::FractionDigits(n) => n.to_string(),
            Facet::WhiteSpace(ws) => ws.as_str().to_string(),
            Facet::Pattern(v)
            | Facet::Enumeration(v)
            | Facet::MinInclusive(v)
            | Facet::MaxInclusive(v)
            | Facet::MinExclusive(v)
            | Facet::MaxExclusive(v) => v.clone(),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_names_and_values() {
        assert_eq!(Facet::MaxLength(10).name(), "maxLength");
        assert_eq!(Facet::MaxLength(10).value(), "10");
        assert_eq!(Facet::FractionDigits(0).to_string(), "fractionDigits=0");
        assert_eq!(Facet::WhiteSpace(WhiteSpace::Collapse).value(), "collapse");
        assert_eq!(Facet::Pattern("[a-z]+".into()).value(), "[a-z]+");
    }
}
