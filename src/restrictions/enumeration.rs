//! Enumeration restriction

use crate::models::{options, ColumnDescriptor, OptionValue, ValidatorDescriptor, ValidatorKind};

use super::{unconditional, Facet, Restriction, RestrictionStrategy};

/// Facets from inclusion validators
///
/// An explicit value list becomes one `enumeration` facet per value, in the
/// order supplied. An integer range becomes `minInclusive`/`maxInclusive`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumerationRestriction;

impl RestrictionStrategy for EnumerationRestriction {
    fn name(&self) -> &str {
        "enumeration"
    }

    fn apply(
        &self,
        _column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    ) {
        for validator in unconditional(validators, &ValidatorKind::Inclusion) {
            match validator.option_any(&[options::IN, options::WITHIN]) {
                Some(OptionValue::List(values)) => {
                    for value in values.iter().filter(|v| !v.is_null()) {
                        restriction.push(Facet::Enumeration(value.to_string()));
                    }
                }
                Some(OptionValue::Range { from, to }) => {
                    restriction.push(Facet::MinInclusive(from.to_string()));
                    restriction.push(Facet::MaxInclusive(to.to_string()));
                }
                Some(single) => restriction.push(Facet::Enumeration(single.to_string())),
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{map_type, ColumnType};

    fn facets(column_type: ColumnType, validator: ValidatorDescriptor) -> Vec<Facet> {
        let column = ColumnDescriptor::new("status", column_type);
        let mut restriction = Restriction::new(map_type(&column.column_type).unwrap());
        EnumerationRestriction.apply(&column, &[validator], &mut restriction);
        restriction.facets().to_vec()
    }

    #[test]
    fn test_values_keep_supplied_order() {
        let validator = ValidatorDescriptor::inclusion("status", vec!["open", "closed", "archived"]);
        assert_eq!(
            facets(ColumnType::String, validator),
            vec![
                Facet::Enumeration("open".into()),
                Facet::Enumeration("closed".into()),
                Facet::Enumeration("archived".into()),
            ]
        );
    }

    #[test]
    fn test_numeric_values_and_within_alias() {
        let validator = ValidatorDescriptor::new("status", ValidatorKind::Inclusion)
            .with_option(options::WITHIN, vec![1, 2, 3]);
        assert_eq!(
            facets(ColumnType::Integer, validator),
            vec![
                Facet::Enumeration("1".into()),
                Facet::Enumeration("2".into()),
                Facet::Enumeration("3".into()),
            ]
        );
    }

    #[test]
    fn test_range_becomes_inclusive_bounds() {
        let validator = ValidatorDescriptor::inclusion("status", 1..=5);
        assert_eq!(
            facets(ColumnType::Integer, validator),
            vec![
                Facet::MinInclusive("1".into()),
                Facet::MaxInclusive("5".into()),
            ]
        );
    }

    #[test]
    fn test_missing_value_set() {
        let validator = ValidatorDescriptor::new("status", ValidatorKind::Inclusion);
        assert!(facets(ColumnType::String, validator).is_empty());
    }
}
