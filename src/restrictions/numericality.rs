//! Numericality restriction

use rust_decimal::Decimal;

use crate::models::{options, ColumnDescriptor, OptionValue, ValidatorDescriptor, ValidatorKind};
use crate::types::ColumnType;

use super::{unconditional, Facet, Restriction, RestrictionStrategy};

/// Facets from numericality validators
///
/// Bounds become `min/maxInclusive` and `min/maxExclusive`. Integer columns,
/// and validators with `only_integer`, also get `fractionDigits=0`. Bounds
/// that are not numeric literals (e.g. a reference to another attribute)
/// are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericalityRestriction;

impl RestrictionStrategy for NumericalityRestriction {
    fn name(&self) -> &str {
        "numericality"
    }

    fn apply(
        &self,
        column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    ) {
        let mut whole_numbers = false;

        for validator in unconditional(validators, &ValidatorKind::Numericality) {
            whole_numbers |= column.column_type == ColumnType::Integer
                || validator
                    .option(options::ONLY_INTEGER)
                    .is_some_and(OptionValue::is_true);

            if let Some(value) = bound(validator, options::EQUAL_TO) {
                restriction.push(Facet::MinInclusive(value.clone()));
                restriction.push(Facet::MaxInclusive(value));
                continue;
            }

            if let Some(value) = bound(validator, options::GREATER_THAN_OR_EQUAL_TO) {
                restriction.push(Facet::MinInclusive(value));
            } else if let Some(value) = bound(validator, options::GREATER_THAN) {
                restriction.push(Facet::MinExclusive(value));
            }

            if let Some(value) = bound(validator, options::LESS_THAN_OR_EQUAL_TO) {
                restriction.push(Facet::MaxInclusive(value));
            } else if let Some(value) = bound(validator, options::LESS_THAN) {
                restriction.push(Facet::MaxExclusive(value));
            }
        }

        if whole_numbers {
            restriction.push(Facet::FractionDigits(0));
        }
    }
}

fn bound(validator: &ValidatorDescriptor, name: &str) -> Option<String> {
    validator
        .option(name)
        .and_then(OptionValue::as_decimal)
        .map(|d: Decimal| d.normalize().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::map_type;

    fn facets(column_type: ColumnType, validators: &[ValidatorDescriptor]) -> Vec<Facet> {
        let column = ColumnDescriptor::new("amount", column_type);
        let mut restriction = Restriction::new(map_type(&column.column_type).unwrap());
        NumericalityRestriction.apply(&column, validators, &mut restriction);
        restriction.facets().to_vec()
    }

    #[test]
    fn test_bounds() {
        let validator = ValidatorDescriptor::numericality("amount")
            .with_option(options::GREATER_THAN, 0)
            .with_option(options::LESS_THAN_OR_EQUAL_TO, 99.50);
        assert_eq!(
            facets(ColumnType::Decimal, &[validator]),
            vec![
                Facet::MinExclusive("0".into()),
                Facet::MaxInclusive("99.5".into()),
            ]
        );
    }

    #[test]
    fn test_integer_column_gets_fraction_digits() {
        let validator = ValidatorDescriptor::numericality("amount")
            .with_option(options::GREATER_THAN_OR_EQUAL_TO, 1);
        assert_eq!(
            facets(ColumnType::Integer, &[validator]),
            vec![Facet::MinInclusive("1".into()), Facet::FractionDigits(0)]
        );
    }

    #[test]
    fn test_only_integer_on_decimal() {
        let validator =
            ValidatorDescriptor::numericality("amount").with_option(options::ONLY_INTEGER, true);
        assert_eq!(
            facets(ColumnType::Decimal, &[validator]),
            vec![Facet::FractionDigits(0)]
        );
    }

    #[test]
    fn test_equal_to_and_symbolic_bounds() {
        let exact = ValidatorDescriptor::numericality("amount").with_option(options::EQUAL_TO, "42");
        let symbolic = ValidatorDescriptor::numericality("amount")
            .with_option(options::LESS_THAN, "maximum_amount");
        assert_eq!(
            facets(ColumnType::Float, &[exact, symbolic]),
            vec![
                Facet::MinInclusive("42".into()),
                Facet::MaxInclusive("42".into()),
            ]
        );
    }

    #[test]
    fn test_no_validator_no_facets() {
        assert!(facets(ColumnType::Integer, &[]).is_empty());
    }
}
