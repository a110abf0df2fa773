//! Statement handlers.
//!
//! One handler per [`Statement`] variant, each giving the statement the
//! semantics of its rendered Cypher against a [`Graph`]. Handlers that can
//! fail do all fallible work before their first mutation.

use serde_json::{json, Map, Value};

use finstrument_core::{
    Classification, IdentifierScheme, Relation, HASH_PROPERTY, IDENTIFIER_LABEL,
    PREF_LABEL_PROPERTY, UUID_PROPERTY, VALUE_PROPERTY,
};
use finstrument_executor::{Error, QueryStats, Result, Row, Statement, StatementResult};

use crate::graph::{Graph, NodeId, RelId};

const THING: &str = Classification::Thing.label();
const FINANCIAL_INSTRUMENT: &str = Classification::FinancialInstrument.label();

fn into_row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Apply a read-only statement
pub fn query(graph: &Graph, statement: &Statement) -> Result<StatementResult> {
    match statement {
        Statement::Probe => Ok(probe(graph)),
        Statement::ReadInstrument { uuid } => Ok(read_instrument(graph, uuid)),
        Statement::CountInstruments => Ok(count_instruments(graph)),
        Statement::ListIdentities { skip, limit } => Ok(list_identities(graph, *skip, *limit)),
        other => Err(Error::InvalidParameter {
            reason: format!("{} is not a read statement", other.name()),
        }),
    }
}

/// Apply any statement
pub fn apply(graph: &mut Graph, statement: &Statement) -> Result<StatementResult> {
    let mut stats = QueryStats::default();
    match statement {
        Statement::DetachInstrument { uuid } => detach_instrument(graph, uuid, &mut stats),
        Statement::UpsertInstrument { uuid, props } => {
            upsert_instrument(graph, uuid, props, &mut stats)?
        }
        Statement::CreateIdentifier {
            uuid,
            scheme,
            value,
        } => create_identifier(graph, uuid, *scheme, value, &mut stats)?,
        Statement::LinkIssuer { uuid, issuer } => link_issuer(graph, uuid, issuer, &mut stats)?,
        Statement::ClearInstrument { uuid } => clear_instrument(graph, uuid, &mut stats)?,
        Statement::RemoveIfUnused { uuid } => remove_if_unused(graph, uuid, &mut stats),
        read => return query(graph, read),
    }
    Ok(StatementResult::empty(stats))
}

// =============================================================================
// Reads
// =============================================================================

fn probe(graph: &Graph) -> StatementResult {
    let rows = graph
        .first_node()
        .map(|id| into_row(json!({ "id(n)": id.0 })))
        .into_iter()
        .collect();
    StatementResult {
        rows,
        stats: QueryStats::default(),
    }
}

fn first_identifier(graph: &Graph, target: NodeId, scheme: IdentifierScheme) -> Value {
    graph
        .incoming(target, Relation::Identifies)
        .into_iter()
        .filter_map(|(_, from)| graph.node(from))
        .filter(|n| n.has_label(scheme.label()))
        .find_map(|n| n.props().get(VALUE_PROPERTY).cloned())
        .unwrap_or(Value::Null)
}

fn read_instrument(graph: &Graph, uuid: &str) -> StatementResult {
    let rows = graph
        .find_nodes(FINANCIAL_INSTRUMENT, UUID_PROPERTY, uuid)
        .into_iter()
        .filter_map(|id| graph.node(id).map(|n| (id, n)))
        .map(|(id, fi)| {
            let issued_by = graph
                .outgoing(id, Relation::IssuedBy)
                .into_iter()
                .filter_map(|(_, to)| graph.node(to))
                .filter(|org| org.has_label(THING))
                .find_map(|org| org.props().get(UUID_PROPERTY).cloned())
                .unwrap_or(Value::Null);

            let mut uuids: Vec<Value> = Vec::new();
            for (_, from) in graph.incoming(id, Relation::Identifies) {
                let Some(upp) = graph.node(from) else { continue };
                if !upp.has_label(IdentifierScheme::Upp.label()) {
                    continue;
                }
                if let Some(value) = upp.props().get(VALUE_PROPERTY) {
                    if !uuids.contains(value) {
                        uuids.push(value.clone());
                    }
                }
            }

            into_row(json!({
                "uuid": fi.props().get(UUID_PROPERTY).cloned().unwrap_or(Value::Null),
                "prefLabel": fi.props().get(PREF_LABEL_PROPERTY).cloned().unwrap_or(Value::Null),
                "issuedBy": issued_by,
                "alternativeIdentifiers": {
                    "uuids": uuids,
                    "figiCode": first_identifier(graph, id, IdentifierScheme::Figi),
                    "factsetIdentifier": first_identifier(graph, id, IdentifierScheme::Factset),
                    "wsodIdentifier": first_identifier(graph, id, IdentifierScheme::Wsod),
                },
            }))
        })
        .collect();
    StatementResult {
        rows,
        stats: QueryStats::default(),
    }
}

fn count_instruments(graph: &Graph) -> StatementResult {
    StatementResult {
        rows: vec![into_row(json!({ "count": graph.label_count(FINANCIAL_INSTRUMENT) }))],
        stats: QueryStats::default(),
    }
}

fn list_identities(graph: &Graph, skip: u64, limit: u64) -> StatementResult {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let rows = graph
        .label_scan(FINANCIAL_INSTRUMENT)
        .skip(skip)
        .take(limit)
        .filter_map(|id| graph.node(id))
        .map(|fi| {
            into_row(json!({
                "id": fi.props().get(UUID_PROPERTY).cloned().unwrap_or(Value::Null),
                "hash": fi.props().get(HASH_PROPERTY).cloned().unwrap_or(Value::Null),
            }))
        })
        .collect();
    StatementResult {
        rows,
        stats: QueryStats::default(),
    }
}

// =============================================================================
// Writes
// =============================================================================

/// Identifier nodes pointing at `target`
fn identifiers_of(graph: &Graph, target: NodeId) -> Vec<(RelId, NodeId)> {
    graph
        .incoming(target, Relation::Identifies)
        .into_iter()
        .filter(|(_, from)| graph.node(*from).is_some_and(|n| n.has_label(IDENTIFIER_LABEL)))
        .collect()
}

/// Issuer relations from `source` to things
fn issuer_rels(graph: &Graph, source: NodeId) -> Vec<RelId> {
    graph
        .outgoing(source, Relation::IssuedBy)
        .into_iter()
        .filter(|(_, to)| graph.node(*to).is_some_and(|n| n.has_label(THING)))
        .map(|(rid, _)| rid)
        .collect()
}

/// Delete issuer relations and identifier nodes of `id`
fn strip_relations(graph: &mut Graph, id: NodeId, stats: &mut QueryStats) {
    for rid in issuer_rels(graph, id) {
        graph.delete_rel(rid, stats);
    }
    for (rid, identifier) in identifiers_of(graph, id) {
        graph.delete_rel(rid, stats);
        graph.detach_delete(identifier, stats);
    }
}

fn detach_instrument(graph: &mut Graph, uuid: &str, stats: &mut QueryStats) {
    for id in graph.find_nodes(THING, UUID_PROPERTY, uuid) {
        strip_relations(graph, id, stats);
    }
}

fn upsert_instrument(
    graph: &mut Graph,
    uuid: &str,
    props: &Map<String, Value>,
    stats: &mut QueryStats,
) -> Result<()> {
    let mut props = props.clone();
    let existing = graph.find_node(THING, UUID_PROPERTY, uuid);

    // An absent label keeps whatever label is already stored.
    if !props.contains_key(PREF_LABEL_PROPERTY) {
        if let Some(previous) = existing
            .and_then(|id| graph.node(id))
            .and_then(|n| n.props().get(PREF_LABEL_PROPERTY).cloned())
        {
            props.insert(PREF_LABEL_PROPERTY.to_string(), previous);
        }
    }

    let all_labels = Classification::ALL.map(Classification::label);
    graph.check_unique(existing, all_labels, &props)?;

    let id = match existing {
        Some(id) => id,
        None => graph.merge_node(THING, UUID_PROPERTY, uuid, stats)?,
    };
    graph.replace_props(id, props, stats)?;
    for label in Classification::TYPED {
        graph.add_label(id, label.label(), stats)?;
    }
    Ok(())
}

fn create_identifier(
    graph: &mut Graph,
    uuid: &str,
    scheme: IdentifierScheme,
    value: &str,
    stats: &mut QueryStats,
) -> Result<()> {
    let mut props = Map::new();
    props.insert(VALUE_PROPERTY.to_string(), Value::from(value));
    graph.check_unique(None, [IDENTIFIER_LABEL, scheme.label()], &props)?;

    let target = graph.merge_node(THING, UUID_PROPERTY, uuid, stats)?;
    let identifier = graph.create_node(&[IDENTIFIER_LABEL, scheme.label()], props, stats)?;
    graph.merge_rel(Relation::Identifies, identifier, target, stats)?;
    Ok(())
}

/// Canonical uuid for an issuer reference: the target of an identifier
/// with that value if one exists, otherwise the reference itself
fn resolve_issuer(graph: &Graph, issuer: &str) -> String {
    graph
        .find_nodes(IDENTIFIER_LABEL, VALUE_PROPERTY, issuer)
        .into_iter()
        .flat_map(|identifier| graph.outgoing(identifier, Relation::Identifies))
        .filter_map(|(_, target)| graph.node(target))
        .filter(|n| n.has_label(THING))
        .find_map(|n| n.str_prop(UUID_PROPERTY).map(str::to_string))
        .unwrap_or_else(|| issuer.to_string())
}

fn link_issuer(graph: &mut Graph, uuid: &str, issuer: &str, stats: &mut QueryStats) -> Result<()> {
    let org_uuid = resolve_issuer(graph, issuer);
    let upp = IdentifierScheme::Upp.label();

    let instrument = graph.merge_node(THING, UUID_PROPERTY, uuid, stats)?;
    let org = graph.merge_node(THING, UUID_PROPERTY, &org_uuid, stats)?;
    let org_identifier = match graph
        .find_nodes(upp, VALUE_PROPERTY, &org_uuid)
        .into_iter()
        .find(|id| graph.node(*id).is_some_and(|n| n.has_label(IDENTIFIER_LABEL)))
    {
        Some(id) => id,
        None => {
            let mut props = Map::new();
            props.insert(VALUE_PROPERTY.to_string(), Value::from(org_uuid.as_str()));
            graph.create_node(&[IDENTIFIER_LABEL, upp], props, stats)?
        }
    };
    graph.merge_rel(Relation::Identifies, org_identifier, org, stats)?;
    graph.merge_rel(Relation::IssuedBy, instrument, org, stats)?;
    Ok(())
}

// =============================================================================
// Deletes
// =============================================================================

fn clear_instrument(graph: &mut Graph, uuid: &str, stats: &mut QueryStats) -> Result<()> {
    for id in graph.find_nodes(THING, UUID_PROPERTY, uuid) {
        for label in Classification::TYPED {
            graph.remove_label(id, label.label(), stats);
        }
        strip_relations(graph, id, stats);
        let mut props = Map::new();
        props.insert(UUID_PROPERTY.to_string(), Value::from(uuid));
        graph.replace_props(id, props, stats)?;
    }
    Ok(())
}

fn remove_if_unused(graph: &mut Graph, uuid: &str, stats: &mut QueryStats) {
    for id in graph.find_nodes(THING, UUID_PROPERTY, uuid) {
        if graph.degree(id) == 0 {
            graph.detach_delete(id, stats);
        }
    }
}
