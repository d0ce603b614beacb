//! Length restriction
//!
//! `minimum`/`maximum` become `minLength`/`maxLength`; `is` pins both to
//! the same value; an `in`/`within` range sets both bounds.

use crate::models::{options, ColumnDescriptor, OptionValue, ValidatorDescriptor, ValidatorKind};

use super::{unconditional, Facet, Restriction, RestrictionStrategy};

/// Facets from length validators
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthRestriction;

impl RestrictionStrategy for LengthRestriction {
    fn name(&self) -> &str {
        "length"
    }

    fn apply(
        &self,
        _column: &ColumnDescriptor,
        validators: &[ValidatorDescriptor],
        restriction: &mut Restriction,
    ) {
        for validator in unconditional(validators, &ValidatorKind::Length) {
            if let Some(exact) = validator.option(options::IS).and_then(OptionValue::as_usize) {
                restriction.push(Facet::MinLength(exact));
                restriction.push(Facet::MaxLength(exact));
                continue;
            }

            if let Some(OptionValue::Range { from, to }) =
                validator.option_any(&[options::IN, options::WITHIN])
            {
                if let (Ok(from), Ok(to)) = (usize::try_from(*from), usize::try_from(*to)) {
                    restriction.push(Facet::MinLength(from));
                    restriction.push(Facet::MaxLength(to));
                }
                continue;
            }

            if let Some(min) = validator.option(options::MINIMUM).and_then(OptionValue::as_usize) {
                restriction.push(Facet::MinLength(min));
            }
            if let Some(max) = validator.option(options::MAXIMUM).and_then(OptionValue::as_usize) {
                restriction.push(Facet::MaxLength(max));
            }
        }
    }
}
