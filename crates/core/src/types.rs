//! Record types for the financial instrument store
//!
//! This module defines the shapes exchanged with callers:
//! - FinancialInstrument: the canonical entity record
//! - AlternativeIdentifiers: typed identifier values keyed by scheme
//! - IdEntry: one (id, content hash) pair produced by bulk enumeration
//!
//! Optional strings follow one rule throughout: `None` and `Some("")` both
//! mean "unset". Accessors such as [`FinancialInstrument::label`] collapse the
//! two so callers never need to check for empty strings themselves.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::hash::content_hash;
use crate::labels::IdentifierScheme;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_set<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Alternative identifiers of an instrument, grouped by scheme
///
/// The primary (`uuids`) scheme is a set: many values may identify the same
/// instrument. The three external schemes hold at most one value each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeIdentifiers {
    /// Primary-scheme identifier values
    #[serde(default, deserialize_with = "null_as_empty_set")]
    pub uuids: BTreeSet<String>,
    /// FactSet identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factset_identifier: Option<String>,
    /// FIGI code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figi_code: Option<String>,
    /// WSOD identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsod_identifier: Option<String>,
}

impl AlternativeIdentifiers {
    /// Value of a single-valued scheme, if set and non-empty
    ///
    /// Always `None` for the primary scheme; use [`Self::primary`] instead.
    pub fn single(&self, scheme: IdentifierScheme) -> Option<&str> {
        match scheme {
            IdentifierScheme::Upp => None,
            IdentifierScheme::Factset => non_empty(&self.factset_identifier),
            IdentifierScheme::Figi => non_empty(&self.figi_code),
            IdentifierScheme::Wsod => non_empty(&self.wsod_identifier),
        }
    }

    /// Non-empty primary-scheme values in canonical order
    pub fn primary(&self) -> impl Iterator<Item = &str> {
        self.uuids.iter().map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Every non-empty identifier paired with its scheme, primary values first
    pub fn iter(&self) -> impl Iterator<Item = (IdentifierScheme, &str)> {
        let primary = self.primary().map(|v| (IdentifierScheme::Upp, v));
        let single = IdentifierScheme::ALL
            .into_iter()
            .filter(|s| s.is_single_valued())
            .filter_map(move |s| self.single(s).map(|v| (s, v)));
        primary.chain(single)
    }

    /// True when no scheme holds a non-empty value
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// The canonical financial instrument record
///
/// `uuid` is the primary key. `pref_label` and `issued_by` are optional; an
/// absent label never overwrites one already stored.
///
/// # Example
///
/// ```
/// use finstrument_core::FinancialInstrument;
///
/// let fi = FinancialInstrument::new("6562674e-dbfa-4cb0-85b2-41b0948b7cc2")
///     .with_label("Acme Corp Ordinary Shares")
///     .with_issuer("org-ext-1")
///     .with_primary_id("6562674e-dbfa-4cb0-85b2-41b0948b7cc2");
///
/// assert_eq!(fi.label(), Some("Acme Corp Ordinary Shares"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInstrument {
    /// Global identifier
    #[serde(default, deserialize_with = "null_as_empty")]
    pub uuid: String,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pref_label: Option<String>,
    /// Reference to the issuing organisation, either its uuid or one of its
    /// identifier values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
    /// Alternative identifiers
    #[serde(default)]
    pub alternative_identifiers: AlternativeIdentifiers,
}

impl FinancialInstrument {
    /// Create a record with only its uuid set
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.pref_label = Some(label.into());
        self
    }

    /// Set the issuer reference
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issued_by = Some(issuer.into());
        self
    }

    /// Add a primary-scheme identifier value
    pub fn with_primary_id(mut self, value: impl Into<String>) -> Self {
        self.alternative_identifiers.uuids.insert(value.into());
        self
    }

    /// Set the FactSet identifier
    pub fn with_factset(mut self, value: impl Into<String>) -> Self {
        self.alternative_identifiers.factset_identifier = Some(value.into());
        self
    }

    /// Set the FIGI code
    pub fn with_figi(mut self, value: impl Into<String>) -> Self {
        self.alternative_identifiers.figi_code = Some(value.into());
        self
    }

    /// Set the WSOD identifier
    pub fn with_wsod(mut self, value: impl Into<String>) -> Self {
        self.alternative_identifiers.wsod_identifier = Some(value.into());
        self
    }

    /// Display label, if set and non-empty
    pub fn label(&self) -> Option<&str> {
        non_empty(&self.pref_label)
    }

    /// Issuer reference, if set and non-empty
    pub fn issuer(&self) -> Option<&str> {
        non_empty(&self.issued_by)
    }

    /// Copy with every unset value in one form: empty strings become
    /// `None` and empty primary ids are dropped
    pub fn normalized(&self) -> Self {
        let ids = &self.alternative_identifiers;
        Self {
            uuid: self.uuid.clone(),
            pref_label: self.label().map(str::to_string),
            issued_by: self.issuer().map(str::to_string),
            alternative_identifiers: AlternativeIdentifiers {
                uuids: ids.primary().map(str::to_string).collect(),
                factset_identifier: ids.single(IdentifierScheme::Factset).map(str::to_string),
                figi_code: ids.single(IdentifierScheme::Figi).map(str::to_string),
                wsod_identifier: ids.single(IdentifierScheme::Wsod).map(str::to_string),
            },
        }
    }

    /// Digest of this record's canonical serialized form
    ///
    /// Records that differ only in how they spell "unset" hash equal.
    pub fn content_hash(&self) -> Result<String> {
        content_hash(&self.normalized())
    }
}

/// One entry of bulk identity enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdEntry {
    /// Instrument uuid
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    /// Content hash stored by the last write; empty if none was stored
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hash: String,
}

impl IdEntry {
    /// Create an entry
    pub fn new(id: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hash: hash.into(),
        }
    }
}
