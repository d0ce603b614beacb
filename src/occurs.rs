//! Occurrence calculation
//!
//! Decides `minOccurs`/`maxOccurs` for an element. Resolution order, first
//! match wins:
//!
//! 1. a `required`/`not_required` override of the customization tree
//! 2. the caller's "always optional" set
//! 3. the caller's "always required" set
//! 4. an unconditional presence validator that does not allow blanks
//! 5. optional
//!
//! Several presence validators on one attribute never conflict: any single
//! qualifying validator forces the element to be required.

use indexmap::IndexSet;

use crate::models::{Cardinality, ValidatorDescriptor, ValidatorKind};
use crate::names::dasherize;
use crate::sandbox::Customization;

/// Literal used for an unbounded `maxOccurs`
pub const UNBOUNDED: &str = "unbounded";

/// Occurrence bounds of an element (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Exactly once (1, 1)
    pub fn once() -> Self {
        Self::new(1, Some(1))
    }

    /// Optional (0, 1)
    pub fn optional() -> Self {
        Self::new(0, Some(1))
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self::new(0, None)
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self::new(1, None)
    }

    /// Check if the element must appear (minOccurs > 0)
    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    /// Check if the element can repeat
    pub fn is_multiple(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }

    /// `minOccurs` attribute value
    pub fn min_occurs(&self) -> String {
        self.min.to_string()
    }

    /// `maxOccurs` attribute value
    pub fn max_occurs(&self) -> String {
        match self.max {
            Some(max) => max.to_string(),
            None => UNBOUNDED.to_string(),
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::optional()
    }
}

/// Whether the validators contain a presence validator that forces the
/// attribute to be required
pub fn is_required_by_presence(validators: &[ValidatorDescriptor]) -> bool {
    validators.iter().any(|v| {
        v.kind == ValidatorKind::Presence && !v.allows_blank() && !v.is_conditional()
    })
}

/// Inputs of the occurrence calculation for one model
#[derive(Debug, Clone, Copy, Default)]
pub struct OccurrenceRules<'a> {
    customization: Option<&'a Customization>,
    optional: Option<&'a IndexSet<String>>,
    required: Option<&'a IndexSet<String>>,
}

impl<'a> OccurrenceRules<'a> {
    /// Rules driven by validators only
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the `required`/`not_required` overrides of a customization tree
    pub fn with_customization(mut self, customization: &'a Customization) -> Self {
        self.customization = Some(customization);
        self
    }

    /// Names that are always optional
    pub fn with_optional(mut self, names: &'a IndexSet<String>) -> Self {
        self.optional = Some(names);
        self
    }

    /// Names that are always required
    pub fn with_required(mut self, names: &'a IndexSet<String>) -> Self {
        self.required = Some(names);
        self
    }

    /// `minOccurs` of an element, 0 or 1
    pub fn min_occurs(&self, name: &str, validators: &[ValidatorDescriptor]) -> u32 {
        let element = dasherize(name);

        if let Some(required) = self
            .customization
            .and_then(|c| c.occurrence_override(&element))
        {
            return u32::from(required);
        }
        if contains(self.optional, &element) {
            return 0;
        }
        if contains(self.required, &element) {
            return 1;
        }
        u32::from(is_required_by_presence(validators))
    }

    /// Occurrence of an attribute (`Cardinality::One`) or a to-many
    /// association (`Cardinality::Many`, unbounded)
    pub fn occurrence_for(
        &self,
        name: &str,
        validators: &[ValidatorDescriptor],
        cardinality: Cardinality,
    ) -> Occurs {
        let min = self.min_occurs(name, validators);
        let occurs = match cardinality {
            Cardinality::One => Occurs::new(min, Some(1)),
            Cardinality::Many => Occurs::new(min, None),
        };
        tracing::trace!(name = name, min = occurs.min, max = ?occurs.max, "occurrence");
        occurs
    }
}

fn contains(names: Option<&IndexSet<String>>, element: &str) -> bool {
    names.is_some_and(|names| names.iter().any(|n| dasherize(n) == element))
}
