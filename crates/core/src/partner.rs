//! The partner roster record, its field catalogue, and record-shape validation.
//!
//! A raw submission (form body or spreadsheet row) is held as
//! [`RawPartnerFields`], an explicit map from canonical field to optional raw
//! value. It is turned into a [`PartnerRecord`] exactly once, at which point
//! every field is normalized and absent fields become empty strings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::normalize::{normalize, normalize_str};

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

pub const YES: &str = "SIM";
pub const NO: &str = "NAO";

/// Accepted values for the yes/no fields.
pub const YES_NO_VALUES: &[&str] = &[YES, NO];

/// Toll-tag providers offered by the entry form.
pub const TAG_VALUES: &[&str] = &["CONECT CAR", "SEM PARAR", "VELOE", "MOVE MAIS"];

// ---------------------------------------------------------------------------
// Field catalogue
// ---------------------------------------------------------------------------

/// A column of the partner roster.
///
/// Each field has three names: the API key (`vehicle_type`), the header label
/// used on screens and in spreadsheets (`TIPO DE VEICULO`), and the physical
/// column in the relational store (`tipo_veiculo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerField {
    Plate,
    Brand,
    Model,
    Year,
    VehicleType,
    DriverName,
    Phone,
    City,
    State,
    HasTracker,
    HasTraining,
    RegistrationDate,
    Referral,
    Tag,
    CreatedByUser,
}

impl PartnerField {
    /// All fields in table order.
    pub const ALL: [PartnerField; 15] = [
        Self::Plate,
        Self::Brand,
        Self::Model,
        Self::Year,
        Self::VehicleType,
        Self::DriverName,
        Self::Phone,
        Self::City,
        Self::State,
        Self::HasTracker,
        Self::HasTraining,
        Self::RegistrationDate,
        Self::Referral,
        Self::Tag,
        Self::CreatedByUser,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Plate => "plate",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Year => "year",
            Self::VehicleType => "vehicle_type",
            Self::DriverName => "driver_name",
            Self::Phone => "phone",
            Self::City => "city",
            Self::State => "state",
            Self::HasTracker => "has_tracker",
            Self::HasTraining => "has_training",
            Self::RegistrationDate => "registration_date",
            Self::Referral => "referral",
            Self::Tag => "tag",
            Self::CreatedByUser => "created_by_user",
        }
    }

    /// Header label, already in normalized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Plate => "PLACA",
            Self::Brand => "MARCA",
            Self::Model => "MODELO",
            Self::Year => "ANO",
            Self::VehicleType => "TIPO DE VEICULO",
            Self::DriverName => "MOTORISTA",
            Self::Phone => "TELEFONE",
            Self::City => "CIDADE",
            Self::State => "ESTADO",
            Self::HasTracker => "RASTREADOR",
            Self::HasTraining => "CURSO MOP",
            Self::RegistrationDate => "DATA DO CADASTRO",
            Self::Referral => "INDICACAO",
            Self::Tag => "TAGS",
            Self::CreatedByUser => "USUARIO",
        }
    }

    /// Physical column name in the `parceiros_jwm` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Plate => "placa",
            Self::Brand => "marca",
            Self::Model => "modelo",
            Self::Year => "ano",
            Self::VehicleType => "tipo_veiculo",
            Self::DriverName => "motorista",
            Self::Phone => "telefone",
            Self::City => "cidade",
            Self::State => "estado",
            Self::HasTracker => "rastreador",
            Self::HasTraining => "curso_mop",
            Self::RegistrationDate => "data_cadastro",
            Self::Referral => "indicacao",
            Self::Tag => "tags",
            Self::CreatedByUser => "usuario",
        }
    }

    /// Closed vocabulary for this field, if it has one.
    pub fn vocabulary(self) -> Option<&'static [&'static str]> {
        match self {
            Self::HasTracker | Self::HasTraining | Self::Referral => Some(YES_NO_VALUES),
            Self::Tag => Some(TAG_VALUES),
            _ => None,
        }
    }

    /// Resolve a field from any of its names, case- and accent-insensitively.
    ///
    /// Used for spreadsheet headers and for path parameters, so `"Placa"`,
    /// `"placa"`, `"PLATE"` and `"plate"` all resolve to [`PartnerField::Plate`].
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize_str(name);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|field| {
            field.label() == wanted
                || field.key().to_ascii_uppercase() == wanted
                || field.column().to_ascii_uppercase() == wanted
        })
    }
}

impl fmt::Display for PartnerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One normalized row of the partner roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerRecord {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: String,
    pub vehicle_type: String,
    pub driver_name: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub has_tracker: String,
    pub has_training: String,
    pub registration_date: String,
    pub referral: String,
    pub tag: String,
    pub created_by_user: String,
}

impl PartnerRecord {
    pub fn value(&self, field: PartnerField) -> &str {
        match field {
            PartnerField::Plate => &self.plate,
            PartnerField::Brand => &self.brand,
            PartnerField::Model => &self.model,
            PartnerField::Year => &self.year,
            PartnerField::VehicleType => &self.vehicle_type,
            PartnerField::DriverName => &self.driver_name,
            PartnerField::Phone => &self.phone,
            PartnerField::City => &self.city,
            PartnerField::State => &self.state,
            PartnerField::HasTracker => &self.has_tracker,
            PartnerField::HasTraining => &self.has_training,
            PartnerField::RegistrationDate => &self.registration_date,
            PartnerField::Referral => &self.referral,
            PartnerField::Tag => &self.tag,
            PartnerField::CreatedByUser => &self.created_by_user,
        }
    }

    fn slot(&mut self, field: PartnerField) -> &mut String {
        match field {
            PartnerField::Plate => &mut self.plate,
            PartnerField::Brand => &mut self.brand,
            PartnerField::Model => &mut self.model,
            PartnerField::Year => &mut self.year,
            PartnerField::VehicleType => &mut self.vehicle_type,
            PartnerField::DriverName => &mut self.driver_name,
            PartnerField::Phone => &mut self.phone,
            PartnerField::City => &mut self.city,
            PartnerField::State => &mut self.state,
            PartnerField::HasTracker => &mut self.has_tracker,
            PartnerField::HasTraining => &mut self.has_training,
            PartnerField::RegistrationDate => &mut self.registration_date,
            PartnerField::Referral => &mut self.referral,
            PartnerField::Tag => &mut self.tag,
            PartnerField::CreatedByUser => &mut self.created_by_user,
        }
    }

    /// Values in table order, as stored.
    pub fn values(&self) -> [&str; 15] {
        PartnerField::ALL.map(|field| self.value(field))
    }

    /// Build a record from values given in table order. Each value is
    /// normalized, so rows read back from a store are canonical even if the
    /// store was edited by hand.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Self {
        let mut record = Self::default();
        for (field, value) in PartnerField::ALL.into_iter().zip(values) {
            *record.slot(field) = normalize_str(value.as_ref());
        }
        record
    }

    /// Fill `CREATED_BY_USER` with `username` when the submission left it blank.
    pub fn with_default_user(mut self, username: &str) -> Self {
        if self.created_by_user.is_empty() {
            self.created_by_user = normalize_str(username);
        }
        self
    }

    /// Check every closed-vocabulary field. Empty values are accepted.
    pub fn vocabulary_issues(&self) -> Vec<FieldIssue> {
        PartnerField::ALL
            .into_iter()
            .filter_map(|field| {
                let allowed = field.vocabulary()?;
                let value = self.value(field);
                if value.is_empty() || allowed.contains(&value) {
                    None
                } else {
                    Some(FieldIssue {
                        field,
                        value: value.to_string(),
                        allowed,
                    })
                }
            })
            .collect()
    }

    /// Strict validation used by the manual entry path.
    pub fn validate(&self) -> Result<(), CoreError> {
        let issues = self.vocabulary_issues();
        if issues.is_empty() {
            return Ok(());
        }
        let message = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoreError::Validation(message))
    }
}

/// A field whose value falls outside its closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: PartnerField,
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} must be one of [{}], got '{}'",
            self.field.label(),
            self.allowed.join(", "),
            self.value
        )
    }
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Canonical field → raw, un-normalized value.
///
/// JSON bodies deserialize into this directly; unknown keys are rejected and
/// scalar values (numbers, booleans) are taken as their text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPartnerFields(BTreeMap<PartnerField, Option<String>>);

impl RawPartnerFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: PartnerField, value: Option<String>) {
        self.0.insert(field, value);
    }

    pub fn with(mut self, field: PartnerField, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    pub fn get(&self, field: PartnerField) -> Option<&str> {
        self.0.get(&field).and_then(|v| v.as_deref())
    }

    pub fn is_blank(&self) -> bool {
        self.0
            .values()
            .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }

    /// Normalize every field. Missing fields become empty strings.
    pub fn into_record(self) -> PartnerRecord {
        let mut record = PartnerRecord::default();
        for field in PartnerField::ALL {
            *record.slot(field) = normalize(self.get(field));
        }
        record
    }
}

impl FromIterator<(PartnerField, Option<String>)> for RawPartnerFields {
    fn from_iter<I: IntoIterator<Item = (PartnerField, Option<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for RawPartnerFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<PartnerField, serde_json::Value>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(field, value)| (field, json_text(value)))
            .collect())
    }
}

fn json_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Entry form draft
// ---------------------------------------------------------------------------

/// The manual-entry form as the user is filling it in.
///
/// Defaults mirror the form's initial state: text inputs empty, the yes/no
/// selectors on `SIM`, and the tag selector on the first provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerForm {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: String,
    pub vehicle_type: String,
    pub driver_name: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub has_tracker: String,
    pub has_training: String,
    pub registration_date: String,
    pub referral: String,
    pub tag: String,
    pub created_by_user: String,
}

impl Default for PartnerForm {
    fn default() -> Self {
        Self {
            plate: String::new(),
            brand: String::new(),
            model: String::new(),
            year: String::new(),
            vehicle_type: String::new(),
            driver_name: String::new(),
            phone: String::new(),
            city: String::new(),
            state: String::new(),
            has_tracker: YES.to_string(),
            has_training: YES.to_string(),
            registration_date: String::new(),
            referral: YES.to_string(),
            tag: TAG_VALUES[0].to_string(),
            created_by_user: String::new(),
        }
    }
}

impl PartnerForm {
    /// Restore the initial form state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_raw(&self) -> RawPartnerFields {
        let values = [
            &self.plate,
            &self.brand,
            &self.model,
            &self.year,
            &self.vehicle_type,
            &self.driver_name,
            &self.phone,
            &self.city,
            &self.state,
            &self.has_tracker,
            &self.has_training,
            &self.registration_date,
            &self.referral,
            &self.tag,
            &self.created_by_user,
        ];
        PartnerField::ALL
            .into_iter()
            .zip(values)
            .map(|(field, value)| (field, Some(value.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn field_names_resolve_case_and_accent_insensitively() {
        assert_eq!(PartnerField::from_name("Placa"), Some(PartnerField::Plate));
        assert_eq!(PartnerField::from_name("plate"), Some(PartnerField::Plate));
        assert_eq!(
            PartnerField::from_name("Tipo de Veículo"),
            Some(PartnerField::VehicleType)
        );
        assert_eq!(
            PartnerField::from_name("tipo_veiculo"),
            Some(PartnerField::VehicleType)
        );
        assert_eq!(
            PartnerField::from_name(" Indicação "),
            Some(PartnerField::Referral)
        );
        assert_eq!(PartnerField::from_name("Observações"), None);
        assert_eq!(PartnerField::from_name(""), None);
    }

    #[test]
    fn labels_are_normalized() {
        for field in PartnerField::ALL {
            assert_eq!(normalize_str(field.label()), field.label());
        }
    }

    #[test]
    fn missing_fields_become_empty() {
        let record = RawPartnerFields::new()
            .with(PartnerField::Plate, "abc-1234")
            .with(PartnerField::City, " São Paulo ")
            .into_record();

        assert_eq!(record.plate, "ABC-1234");
        assert_eq!(record.city, "SAO PAULO");
        assert_eq!(record.brand, "");
        assert_eq!(record.created_by_user, "");
    }

    #[test]
    fn json_scalars_are_taken_as_text() {
        let raw: RawPartnerFields = serde_json::from_str(
            r#"{"plate": "xyz-9999", "year": 2019, "phone": null}"#,
        )
        .unwrap();
        let record = raw.into_record();
        assert_eq!(record.plate, "XYZ-9999");
        assert_eq!(record.year, "2019");
        assert_eq!(record.phone, "");
    }

    #[test]
    fn unknown_json_keys_are_rejected() {
        let result = serde_json::from_str::<RawPartnerFields>(r#"{"colour": "red"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn vocabulary_accepts_empty_and_known_values() {
        let record = RawPartnerFields::new()
            .with(PartnerField::HasTracker, "sim")
            .with(PartnerField::Tag, "Sem Parar")
            .into_record();
        assert!(record.vocabulary_issues().is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn vocabulary_rejects_unknown_values() {
        let record = RawPartnerFields::new()
            .with(PartnerField::Referral, "talvez")
            .with(PartnerField::Tag, "pedagio")
            .into_record();

        let issues = record.vocabulary_issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, PartnerField::Referral);
        assert_eq!(issues[1].field, PartnerField::Tag);
        assert_matches!(record.validate(), Err(CoreError::Validation(msg)) if msg.contains("INDICACAO"));
    }

    #[test]
    fn default_user_only_fills_blank() {
        let blank = PartnerRecord::default().with_default_user("joão");
        assert_eq!(blank.created_by_user, "JOAO");

        let set = RawPartnerFields::new()
            .with(PartnerField::CreatedByUser, "maria")
            .into_record()
            .with_default_user("joão");
        assert_eq!(set.created_by_user, "MARIA");
    }

    #[test]
    fn values_round_trip_in_table_order() {
        let record = RawPartnerFields::new()
            .with(PartnerField::Plate, "AAA-0001")
            .with(PartnerField::CreatedByUser, "ana")
            .into_record();
        let values = record.values();
        assert_eq!(values[0], "AAA-0001");
        assert_eq!(values[14], "ANA");
        assert_eq!(PartnerRecord::from_values(&values[..]), record);
    }

    #[test]
    fn form_defaults_and_reset() {
        let mut form = PartnerForm::default();
        assert_eq!(form.has_training, "SIM");
        assert_eq!(form.referral, "SIM");
        assert_eq!(form.has_tracker, "SIM");
        assert_eq!(form.tag, "CONECT CAR");

        form.plate = "ABC-1234".into();
        form.tag = "VELOE".into();
        form.reset();
        assert_eq!(form, PartnerForm::default());
    }

    #[test]
    fn form_converts_to_valid_record() {
        let form = PartnerForm {
            plate: "abc-1234".into(),
            city: "Campinas".into(),
            ..PartnerForm::default()
        };
        let record = form.to_raw().into_record();
        assert_eq!(record.plate, "ABC-1234");
        assert_eq!(record.tag, "CONECT CAR");
        assert!(record.validate().is_ok());
    }
}
