//! Multi-column filter engine over the partner roster.
//!
//! A [`FilterState`] holds one selected-value set per filterable column. An
//! empty set leaves that column unconstrained. A record passes when, for every
//! constrained column, its value is one of the selected values (AND across
//! columns, OR within a column). Filtering is stable: surviving records keep
//! their original relative order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::normalize::normalize_str;
use crate::partner::{PartnerField, PartnerRecord};

/// Columns offered as filters, in display order.
pub const FILTER_COLUMNS: &[PartnerField] = &[
    PartnerField::Plate,
    PartnerField::Referral,
    PartnerField::HasTracker,
    PartnerField::State,
    PartnerField::City,
    PartnerField::VehicleType,
    PartnerField::Year,
    PartnerField::DriverName,
    PartnerField::Phone,
    PartnerField::HasTraining,
    PartnerField::RegistrationDate,
    PartnerField::Tag,
    PartnerField::CreatedByUser,
];

pub fn is_filterable(field: PartnerField) -> bool {
    FILTER_COLUMNS.contains(&field)
}

/// Per-column selected values for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    selections: BTreeMap<PartnerField, BTreeSet<String>>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    /// Every filterable column present, none constrained.
    pub fn new() -> Self {
        Self {
            selections: FILTER_COLUMNS
                .iter()
                .map(|field| (*field, BTreeSet::new()))
                .collect(),
        }
    }

    /// Replace the selection for `field`.
    ///
    /// Values are normalized and blanks dropped, so a selection can only ever
    /// name values that could appear in a stored record.
    pub fn set<I, S>(&mut self, field: PartnerField, values: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !is_filterable(field) {
            return Err(CoreError::Validation(format!(
                "Column '{}' cannot be filtered",
                field.label()
            )));
        }
        let selected = values
            .into_iter()
            .map(|v| normalize_str(v.as_ref()))
            .filter(|v| !v.is_empty())
            .collect();
        self.selections.insert(field, selected);
        Ok(())
    }

    /// Selected values for `field`, empty when unconstrained.
    pub fn selected(&self, field: PartnerField) -> Option<&BTreeSet<String>> {
        self.selections.get(&field)
    }

    pub fn clear(&mut self, field: PartnerField) {
        if let Some(values) = self.selections.get_mut(&field) {
            values.clear();
        }
    }

    pub fn clear_all(&mut self) {
        self.selections.values_mut().for_each(BTreeSet::clear);
    }

    /// Columns that currently constrain the result.
    pub fn active(&self) -> impl Iterator<Item = (PartnerField, &BTreeSet<String>)> {
        self.selections
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(field, values)| (*field, values))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }

    pub fn matches(&self, record: &PartnerRecord) -> bool {
        self.active()
            .all(|(field, values)| values.contains(&normalize_str(record.value(field))))
    }
}

/// Records satisfying every active constraint, in their original order.
pub fn filter<'a>(records: &'a [PartnerRecord], state: &FilterState) -> Vec<&'a PartnerRecord> {
    records.iter().filter(|r| state.matches(r)).collect()
}

/// Sorted distinct non-empty values present in `records` for `field`.
pub fn candidate_values(records: &[PartnerRecord], field: PartnerField) -> Vec<String> {
    records
        .iter()
        .map(|r| normalize_str(r.value(field)))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Candidate values for every filterable column.
pub fn candidate_options(records: &[PartnerRecord]) -> BTreeMap<PartnerField, Vec<String>> {
    FILTER_COLUMNS
        .iter()
        .map(|field| (*field, candidate_values(records, *field)))
        .collect()
}
