//! Caller-supplied restriction strategies
//!
//! The extension point of the restriction pipeline. Custom strategies run
//! after the built-in ones, in registration order, with the same contract:
//! they may append facets but never see the internals of other strategies.

use std::fmt;
use std::sync::Arc;

use crate::models::{ColumnDescriptor, ValidatorDescriptor};

use super::{Restriction, RestrictionStrategy};

/// Ordered list of custom strategies
#[derive(Clone, Default)]
pub struct CustomRestrictions {
    strategies: Vec<Arc<dyn RestrictionStrategy>>,
}

impl CustomRestrictions {
    /// Append a strategy
    pub fn register(&mut self, strategy: Arc<dyn RestrictionStrategy>) {
        tracing::debug!(strategy = strategy.name(), "registered custom restriction");
        self.strategies.push(strategy);
    }

    /// Number of registered strategies
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if no strategy is registered
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl RestrictionStrategy for CustomRestrictions {
    fn name(&self) -> &str {
        "custom"
    }

    fn apply(
        &self,
        column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    ) {
        for strategy in &self.strategies {
            strategy.apply(column, validators, restriction);
        }
    }
}

impl fmt::Debug for CustomRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

/// A strategy backed by a closure
pub struct FnRestriction<F> {
    name: String,
    apply: F,
}

impl<F> RestrictionStrategy for FnRestriction<F>
where
    F: Fn(&ColumnDescriptor, &[ValidatorDescriptor], &mut Restriction) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        &self,
        column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    ) {
        (self.apply)(column, validators, restriction)
    }
}

/// Wrap a closure as a named restriction strategy
pub fn from_fn<F>(name: impl Into<String>, apply: F) -> FnRestriction<F>
where
    F: Fn(&ColumnDescriptor, &[ValidatorDescriptor], &mut Restriction) + Send + Sync,
{
    FnRestriction {
        name: name.into(),
        apply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidatorKind;
    use crate::restrictions::{Facet, WhiteSpace};
    use crate::types::{map_type, ColumnType};

    fn squish() -> Arc<dyn RestrictionStrategy> {
        Arc::new(from_fn("squish", |_column, validators, restriction| {
            if validators
                .iter()
                .any(|v| v.kind == ValidatorKind::Custom("squish".into()))
            {
                restriction.push(Facet::WhiteSpace(WhiteSpace::Collapse));
            }
        }))
    }

    #[test]
    fn test_custom_strategies_run_in_registration_order() {
        let mut custom = CustomRestrictions::default();
        custom.register(squish());
        custom.register(Arc::new(from_fn("cap", |_, _, restriction| {
            restriction.push(Facet::MaxLength(255));
        })));
        assert_eq!(custom.len(), 2);
        assert_eq!(format!("{:?}", custom), r#"["squish", "cap"]"#);

        let column = ColumnDescriptor::new("title", ColumnType::String);
        let validators = vec![ValidatorDescriptor::new("title", "squish")];
        let mut restriction = Restriction::new(map_type(&column.column_type).unwrap());
        custom.apply(&column, &validators, &mut restriction);

        assert_eq!(
            restriction.facets(),
            &[Facet::WhiteSpace(WhiteSpace::Collapse), Facet::MaxLength(255)]
        );
    }

    #[test]
    fn test_empty_custom_set_is_a_no_op() {
        let custom = CustomRestrictions::default();
        assert!(custom.is_empty());

        let column = ColumnDescriptor::new("title", ColumnType::String);
        let mut restriction = Restriction::new(map_type(&column.column_type).unwrap());
        custom.apply(&column, &[], &mut restriction);
        assert!(restriction.is_empty());
    }
}
