//! Element and type naming
//!
//! Derives the names used in generated documents from model and attribute
//! names: dasherized element names, pluralized collection names and
//! PascalCase complex type names. Also provides the NCName checks used to
//! reject customization names that could never appear in a document.

use heck::{ToKebabCase, ToUpperCamelCase};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::namespaces::QualifiedName;
use crate::types::is_wrapper_type;

/// Appended to a model type name that a wrapper type already uses
pub const MODEL_TYPE_SUFFIX: &str = "Model";

/// Appended to a collection type name that would equal its member type
pub const COLLECTION_TYPE_SUFFIX: &str = "Collection";

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\-\.0-9\u{B7}]*$")
        .unwrap()
});

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "metadata",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("zombie", "zombies"),
    ("ox", "oxen"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
];

// Checked in order; the first matching rule wins.
static PLURAL_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(quiz)$", "${1}zes"),
        (r"([ml])ouse$", "${1}ice"),
        (r"(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
        (r"(x|ch|ss|sh)$", "${1}es"),
        (r"([^aeiouy]|qu)y$", "${1}ies"),
        (r"(hive)$", "${1}s"),
        (r"(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
        (r"sis$", "ses"),
        (r"([ti])um$", "${1}a"),
        (r"(buffal|tomat)o$", "${1}oes"),
        (r"(bu)s$", "${1}ses"),
        (r"(alias|status)$", "${1}es"),
        (r"(octop|vir)us$", "${1}i"),
        (r"(ax|test)is$", "${1}es"),
        (r"s$", "s"),
        (r"$", "s"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Dasherize an attribute or model name: `some_float` -> `some-float`,
/// `SomeModel` -> `some-model`
pub fn dasherize(name: &str) -> String {
    name.to_kebab_case()
}

/// PascalCase type name for a model base name
pub fn type_name(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Pluralize the last word of a name, keeping the rest untouched.
///
/// Works on dasherized (`line-item`), underscored and PascalCase
/// (`LineItem`) names.
pub fn pluralize(name: &str) -> String {
    let split = last_word_start(name);
    let (head, word) = name.split_at(split);
    if word.is_empty() {
        return name.to_string();
    }

    let lower = word.to_lowercase();
    let plural = if UNCOUNTABLE.contains(&lower.as_str()) {
        lower.clone()
    } else if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        plural.to_string()
    } else {
        PLURAL_RULES
            .iter()
            .find(|(rule, _)| rule.is_match(&lower))
            .map(|(rule, replacement)| rule.replace(&lower, *replacement).into_owned())
            .unwrap_or_else(|| format!("{}s", lower))
    };

    format!("{}{}", head, match_case(word, &plural))
}

fn last_word_start(name: &str) -> usize {
    if let Some(pos) = name.rfind(['-', '_']) {
        return pos + 1;
    }
    name.char_indices()
        .filter(|(_, c)| c.is_uppercase())
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0)
}

fn match_case(original: &str, plural: &str) -> String {
    if original.len() > 1 && original.chars().all(|c| !c.is_alphabetic() || c.is_uppercase()) {
        return plural.to_uppercase();
    }
    let mut chars = plural.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(p)) if first.is_uppercase() => {
            p.to_uppercase().chain(chars).collect()
        }
        _ => plural.to_string(),
    }
}

/// Names derived for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    /// Element name for a single instance (`some-model`)
    pub element: String,
    /// Element name for the collection root (`some-models`)
    pub collection_element: String,
    /// Complex type name (`SomeModel`); namespace segments are dropped
    pub type_name: String,
    /// Complex type name of the collection (`SomeModels`)
    pub collection_type: String,
}

impl ModelNames {
    /// Resolve all names for a model
    ///
    /// A type name taken by a wrapper type gets the `Model` suffix, and a
    /// collection type that would repeat its member type (uncountable
    /// names such as `Sheep`) gets the `Collection` suffix.
    pub fn resolve(model: &QualifiedName) -> Self {
        let base = model.base_name();
        let element = dasherize(base);

        let mut type_name = type_name(base);
        if is_wrapper_type(&type_name) {
            type_name.push_str(MODEL_TYPE_SUFFIX);
        }
        let mut collection_type = pluralize(&type_name);
        if collection_type == type_name || is_wrapper_type(&collection_type) {
            collection_type = format!("{}{}", type_name, COLLECTION_TYPE_SUFFIX);
        }

        Self {
            collection_element: pluralize(&element),
            collection_type,
            element,
            type_name,
        }
    }
}
