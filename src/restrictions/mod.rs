//! Restriction strategies
//!
//! Each strategy inspects the validators of one column and writes zero or
//! more facets into the column's restriction node. The built-in strategies
//! run in a fixed order (enumeration, length, numericality, pattern),
//! followed by the caller-supplied custom strategies in registration order,
//! so the facet order of a generated document is deterministic.
//!
//! Validators carrying an `if`/`unless` condition are skipped: a condition
//! cannot be evaluated statically, so it cannot constrain the schema.

pub mod custom;
pub mod enumeration;
pub mod facets;
pub mod length;
pub mod numericality;
pub mod pattern;

use std::sync::Arc;

use crate::models::{ColumnDescriptor, ValidatorDescriptor, ValidatorKind};
use crate::types::TypeMapping;

pub use custom::{from_fn, CustomRestrictions, FnRestriction};
pub use enumeration::EnumerationRestriction;
pub use facets::{Facet, WhiteSpace};
pub use length::LengthRestriction;
pub use numericality::NumericalityRestriction;
pub use pattern::PatternRestriction;

/// Restriction node of one scalar element
///
/// Facets can only be appended: a strategy never sees, removes or reorders
/// what another strategy wrote.
#[derive(Debug, Clone)]
pub struct Restriction {
    mapping: &'static TypeMapping,
    facets: Vec<Facet>,
}

impl Restriction {
    /// Create an empty restriction over a mapped column type
    pub fn new(mapping: &'static TypeMapping) -> Self {
        Self {
            mapping,
            facets: Vec::new(),
        }
    }

    /// Type mapping of the restricted column
    pub fn mapping(&self) -> &'static TypeMapping {
        self.mapping
    }

    /// Append a facet
    pub fn push(&mut self, facet: Facet) {
        tracing::trace!(facet = %facet, base = self.mapping.xsd_type, "facet");
        self.facets.push(facet);
    }

    /// Facets written so far
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Check if no facet was written
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Consume the node, keeping only facets the base type admits
    pub fn into_admitted_facets(self) -> Vec<Facet> {
        let mapping = self.mapping;
        self.facets
            .into_iter()
            .filter(|facet| {
                let admitted = mapping.admits(facet.name());
                if !admitted {
                    tracing::warn!(
                        facet = %facet,
                        base = mapping.xsd_type,
                        "dropping facet not admitted by base type"
                    );
                }
                admitted
            })
            .collect()
    }
}

/// A strategy deriving facets from validators
pub trait RestrictionStrategy: Send + Sync {
    /// Strategy name, used in diagnostics
    fn name(&self) -> &str;

    /// Write facets for `column` given all of its validators
    fn apply(
        &self,
        column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    );
}

/// Validators of one kind that carry no `if`/`unless` condition
pub fn unconditional<'a>(
    validators: &'a [ValidatorDescriptor],
    kind: &'a ValidatorKind,
) -> impl Iterator<Item = &'a ValidatorDescriptor> + 'a {
    validators
        .iter()
        .filter(move |v| &v.kind == kind && !v.is_conditional())
}

/// The ordered set of strategies applied to every column
#[derive(Clone, Default)]
pub struct RestrictionSet {
    custom: CustomRestrictions,
}

impl RestrictionSet {
    /// Built-in strategies only
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom strategy, run after the built-in ones
    pub fn register(&mut self, strategy: Arc<dyn RestrictionStrategy>) {
        self.custom.register(strategy);
    }

    /// Strategies in application order
    pub fn strategies(&self) -> Vec<&dyn RestrictionStrategy> {
        vec![
            &EnumerationRestriction as &dyn RestrictionStrategy,
            &LengthRestriction,
            &NumericalityRestriction,
            &PatternRestriction,
            &self.custom,
        ]
    }

    /// Run every strategy over a column
    pub fn apply(
        &self,
        column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    ) {
        for strategy in self.strategies() {
            strategy.apply(column, validators, restriction);
        }
    }
}

impl std::fmt::Debug for RestrictionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies().iter().map(|s| s.name()))
            .finish()
    }
}
