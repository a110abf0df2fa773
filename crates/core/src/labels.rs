//! Graph vocabulary: classification labels, identifier schemes, relation types
//!
//! An instrument node is never an instance of a single type. It carries a set
//! of classification labels (`Thing`, `Concept`, `FinancialInstrument`,
//! `Equity`) that together form an implicit hierarchy. Deletion strips every
//! label except `Thing`, leaving a placeholder that can still be referenced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Property holding the global identifier of a `Thing`
pub const UUID_PROPERTY: &str = "uuid";
/// Property holding the value of an identifier node
pub const VALUE_PROPERTY: &str = "value";
/// Property holding the display label of a concept
pub const PREF_LABEL_PROPERTY: &str = "prefLabel";
/// Property holding the content hash of the last write
pub const HASH_PROPERTY: &str = "hash";

/// Label carried by every identifier node regardless of scheme
pub const IDENTIFIER_LABEL: &str = "Identifier";

/// Classification labels carried by an instrument node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    /// Anything with a uuid; survives deletion
    Thing,
    /// A concept in the knowledge graph
    Concept,
    /// A financial instrument
    FinancialInstrument,
    /// An equity instrument
    Equity,
}

impl Classification {
    /// The full classification set of a stored instrument
    pub const ALL: [Classification; 4] = [
        Classification::Thing,
        Classification::Concept,
        Classification::FinancialInstrument,
        Classification::Equity,
    ];

    /// Labels removed when an instrument is demoted to a placeholder
    pub const TYPED: [Classification; 3] = [
        Classification::Concept,
        Classification::FinancialInstrument,
        Classification::Equity,
    ];

    /// Store label for this classification
    pub const fn label(self) -> &'static str {
        match self {
            Classification::Thing => "Thing",
            Classification::Concept => "Concept",
            Classification::FinancialInstrument => "FinancialInstrument",
            Classification::Equity => "Equity",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheme an alternative identifier belongs to
///
/// `Upp` is the internal scheme and may map many values onto one entity.
/// The others are single-valued external schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdentifierScheme {
    /// Internal platform identifiers (many-to-one)
    Upp,
    /// FactSet entity identifier
    Factset,
    /// Financial Instrument Global Identifier
    Figi,
    /// WSOD identifier
    Wsod,
}

impl IdentifierScheme {
    /// Every scheme, primary first
    pub const ALL: [IdentifierScheme; 4] = [
        IdentifierScheme::Upp,
        IdentifierScheme::Factset,
        IdentifierScheme::Figi,
        IdentifierScheme::Wsod,
    ];

    /// Store label for identifier nodes of this scheme
    pub const fn label(self) -> &'static str {
        match self {
            IdentifierScheme::Upp => "UPPIdentifier",
            IdentifierScheme::Factset => "FactsetIdentifier",
            IdentifierScheme::Figi => "FIGIIdentifier",
            IdentifierScheme::Wsod => "WSODIdentifier",
        }
    }

    /// Field name inside the `alternativeIdentifiers` payload
    pub const fn field_name(self) -> &'static str {
        match self {
            IdentifierScheme::Upp => "uuids",
            IdentifierScheme::Factset => "factsetIdentifier",
            IdentifierScheme::Figi => "figiCode",
            IdentifierScheme::Wsod => "wsodIdentifier",
        }
    }

    /// Whether at most one value of this scheme may identify an entity
    pub const fn is_single_valued(self) -> bool {
        !matches!(self, IdentifierScheme::Upp)
    }
}

impl fmt::Display for IdentifierScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relationship types written by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// identifier -> target thing
    Identifies,
    /// instrument -> issuing organisation
    IssuedBy,
}

impl Relation {
    /// Store relationship type name
    pub const fn as_str(self) -> &'static str {
        match self {
            Relation::Identifies => "IDENTIFIES",
            Relation::IssuedBy => "ISSUED_BY",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
