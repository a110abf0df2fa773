//! Statement enum defining every graph operation the store issues.
//!
//! Statements are the "instruction set" handed to a [`BatchExecutor`]. Each
//! variant is:
//! - **Self-contained**: all parameters needed for execution are in the variant
//! - **Serializable**: can be shipped to a remote executor as JSON
//! - **Renderable**: [`Statement::cypher`] yields the parameterized Cypher a
//!   Neo4j-compatible executor submits
//!
//! Executors that understand the typed form (such as the in-process graph)
//! dispatch on the variant directly and never parse Cypher.
//!
//! [`BatchExecutor`]: crate::BatchExecutor

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use finstrument_core::{IdentifierScheme, UUID_PROPERTY};

/// A single parameterized graph statement.
///
/// # Statement Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Read | `ReadInstrument`, `CountInstruments`, `ListIdentities` | No side effects |
/// | Write | `DetachInstrument`, `UpsertInstrument`, `CreateIdentifier`, `LinkIssuer` | Upsert choreography |
/// | Delete | `ClearInstrument`, `RemoveIfUnused` | Demote then collect |
/// | Health | `Probe` | Connectivity check |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Statement {
    // ==================== Health ====================
    /// Touch the store without reading anything meaningful.
    /// Returns: zero or one row
    Probe,

    // ==================== Read ====================
    /// Fetch one instrument with its issuer and identifier bundle.
    /// Returns: zero or one row with columns `uuid`, `prefLabel`, `issuedBy`,
    /// `alternativeIdentifiers`
    ReadInstrument { uuid: String },

    /// Count nodes classified as financial instruments.
    /// Returns: one row with column `count`
    CountInstruments,

    /// One page of (id, hash) pairs in store order.
    /// Returns: up to `limit` rows with columns `id`, `hash`
    ListIdentities { skip: u64, limit: u64 },

    // ==================== Write ====================
    /// Delete the issuer relation and every identifier node pointing at `uuid`.
    DetachInstrument { uuid: String },

    /// Merge the thing node for `uuid`, replace its property bag with
    /// `props` and apply the full instrument classification. A stored
    /// `prefLabel` survives when `props` carries none.
    UpsertInstrument { uuid: String, props: Map<String, Value> },

    /// Create a fresh identifier node of `scheme` pointing at `uuid`.
    CreateIdentifier {
        uuid: String,
        scheme: IdentifierScheme,
        value: String,
    },

    /// Resolve `issuer` through existing identifiers (falling back to the raw
    /// value), find-or-create the organisation placeholder and its primary
    /// identifier, and link `uuid` to it.
    LinkIssuer { uuid: String, issuer: String },

    // ==================== Delete ====================
    /// Strip the instrument classification, delete its issuer relation and
    /// identifiers, and reset its property bag to just the uuid.
    /// Statistics of this statement drive the delete result.
    ClearInstrument { uuid: String },

    /// Delete the thing node for `uuid` if it has no relationships left.
    RemoveIfUnused { uuid: String },
}

/// Cypher text plus its parameter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CypherQuery {
    /// Statement text using `$name` parameters
    pub statement: String,
    /// Parameter values keyed by name
    pub parameters: Map<String, Value>,
}

impl CypherQuery {
    fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            parameters: Map::new(),
        }
    }

    fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}

const READ_INSTRUMENT: &str = "MATCH (fi:FinancialInstrument {uuid: $uuid})
OPTIONAL MATCH (fi)-[:ISSUED_BY]->(org:Thing)
OPTIONAL MATCH (upp:UPPIdentifier)-[:IDENTIFIES]->(fi)
OPTIONAL MATCH (factset:FactsetIdentifier)-[:IDENTIFIES]->(fi)
OPTIONAL MATCH (figi:FIGIIdentifier)-[:IDENTIFIES]->(fi)
OPTIONAL MATCH (wsod:WSODIdentifier)-[:IDENTIFIES]->(fi)
RETURN fi.uuid AS uuid,
    fi.prefLabel AS prefLabel,
    org.uuid AS issuedBy,
    {uuids: collect(DISTINCT upp.value),
    figiCode: figi.value,
    factsetIdentifier: factset.value,
    wsodIdentifier: wsod.value} AS alternativeIdentifiers";

const COUNT_INSTRUMENTS: &str = "MATCH (fi:FinancialInstrument) RETURN count(fi) AS count";

const LIST_IDENTITIES: &str =
    "MATCH (fi:FinancialInstrument) RETURN fi.uuid AS id, fi.hash AS hash SKIP $skip LIMIT $limit";

const DETACH_INSTRUMENT: &str = "MATCH (t:Thing {uuid: $uuid})
OPTIONAL MATCH (t)-[is:ISSUED_BY]->(:Thing)
OPTIONAL MATCH (i:Identifier)-[ir:IDENTIFIES]->(t)
DELETE ir, is, i";

const UPSERT_INSTRUMENT: &str = "MERGE (t:Thing {uuid: $uuid})
WITH t, t.prefLabel AS storedLabel
SET t = $props
SET t.prefLabel = coalesce($props.prefLabel, storedLabel)
SET t:Concept
SET t:FinancialInstrument
SET t:Equity";

const LINK_ISSUER: &str = "MERGE (fi:Thing {uuid: $uuid})
WITH fi
OPTIONAL MATCH (:Identifier {value: $issuer})-[:IDENTIFIES]->(known:Thing)
WITH fi, coalesce(head(collect(known.uuid)), $issuer) AS orgUuid
MERGE (o:Thing {uuid: orgUuid})
MERGE (orgUpp:Identifier:UPPIdentifier {value: orgUuid})
MERGE (orgUpp)-[:IDENTIFIES]->(o)
MERGE (fi)-[:ISSUED_BY]->(o)";

const CLEAR_INSTRUMENT: &str = "MATCH (t:Thing {uuid: $uuid})
OPTIONAL MATCH (t)-[is:ISSUED_BY]->(:Thing)
OPTIONAL MATCH (t)<-[ir:IDENTIFIES]-(i:Identifier)
REMOVE t:Concept:FinancialInstrument:Equity
DELETE is, ir, i
SET t = $props";

const REMOVE_IF_UNUSED: &str = "MATCH (t:Thing {uuid: $uuid})
OPTIONAL MATCH (t)-[a]-()
WITH t, count(a) AS relCount
WHERE relCount = 0
DELETE t";

impl Statement {
    /// Short name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Probe => "Probe",
            Statement::ReadInstrument { .. } => "ReadInstrument",
            Statement::CountInstruments => "CountInstruments",
            Statement::ListIdentities { .. } => "ListIdentities",
            Statement::DetachInstrument { .. } => "DetachInstrument",
            Statement::UpsertInstrument { .. } => "UpsertInstrument",
            Statement::CreateIdentifier { .. } => "CreateIdentifier",
            Statement::LinkIssuer { .. } => "LinkIssuer",
            Statement::ClearInstrument { .. } => "ClearInstrument",
            Statement::RemoveIfUnused { .. } => "RemoveIfUnused",
        }
    }

    /// True if the statement can change the store
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Statement::Probe
                | Statement::ReadInstrument { .. }
                | Statement::CountInstruments
                | Statement::ListIdentities { .. }
        )
    }

    /// Render as parameterized Cypher
    pub fn cypher(&self) -> CypherQuery {
        match self {
            Statement::Probe => CypherQuery::new("MATCH (n) RETURN id(n) LIMIT 1"),
            Statement::ReadInstrument { uuid } => {
                CypherQuery::new(READ_INSTRUMENT).param("uuid", uuid.as_str())
            }
            Statement::CountInstruments => CypherQuery::new(COUNT_INSTRUMENTS),
            Statement::ListIdentities { skip, limit } => CypherQuery::new(LIST_IDENTITIES)
                .param("skip", *skip)
                .param("limit", *limit),
            Statement::DetachInstrument { uuid } => {
                CypherQuery::new(DETACH_INSTRUMENT).param("uuid", uuid.as_str())
            }
            Statement::UpsertInstrument { uuid, props } => CypherQuery::new(UPSERT_INSTRUMENT)
                .param("uuid", uuid.as_str())
                .param("props", Value::Object(props.clone())),
            Statement::CreateIdentifier {
                uuid,
                scheme,
                value,
            } => CypherQuery::new(format!(
                "MERGE (t:Thing {{uuid: $uuid}})
CREATE (i:Identifier {{value: $value}})
MERGE (t)<-[:IDENTIFIES]-(i)
SET i:{}",
                scheme.label()
            ))
            .param("uuid", uuid.as_str())
            .param("value", value.as_str()),
            Statement::LinkIssuer { uuid, issuer } => CypherQuery::new(LINK_ISSUER)
                .param("uuid", uuid.as_str())
                .param("issuer", issuer.as_str()),
            Statement::ClearInstrument { uuid } => {
                let mut props = Map::new();
                props.insert(UUID_PROPERTY.to_string(), Value::from(uuid.as_str()));
                CypherQuery::new(CLEAR_INSTRUMENT)
                    .param("uuid", uuid.as_str())
                    .param("props", Value::Object(props))
            }
            Statement::RemoveIfUnused { uuid } => {
                CypherQuery::new(REMOVE_IF_UNUSED).param("uuid", uuid.as_str())
            }
        }
    }
}
