//! Per-entity call sites
//!
//! Every list operation shares the same shape: a `PagedResult` (or a
//! `PermissionDeniedError`) holding `pageInfo` and `edges`, where each edge
//! carries a cursor and a typed node that may be null for deleted objects.
//! Every single-object operation answers with a union classified through
//! [`ResultVariant`].

pub mod access_providers;
pub mod data_objects;
pub mod data_sources;
pub mod grant_categories;
pub mod groups;
pub mod identity_stores;
pub mod roles;
pub mod users;

use raito_core::{paginate, ListStream};
use raito_domain::{
    typename_of, Edge, EdgeOutcome, Page, PageInfo, RaitoError, Result, ResultVariant,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::GraphqlClient;

pub use access_providers::AccessProviderClient;
pub use data_objects::DataObjectClient;
pub use data_sources::DataSourceClient;
pub use grant_categories::GrantCategoryClient;
pub use groups::GroupClient;
pub use identity_stores::IdentityStoreClient;
pub use roles::{RoleAssignmentScope, RoleClient, RoleTarget};
pub use users::UserClient;

const PAGED_RESULT_TYPENAME: &str = "PagedResult";
const PERMISSION_DENIED_TYPENAME: &str = "PermissionDeniedError";

/// Filter and ordering passed through to list operations
///
/// Both values are forwarded untouched as the `filter` and `order`
/// variables of the list query; unset values are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub filter: Option<Value>,
    pub order: Option<Value>,
}

impl ListOptions {
    #[must_use]
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: Value) -> Self {
        self.order = Some(order);
        self
    }
}

/// Static description of one single-object operation
#[derive(Debug, Clone, Copy)]
pub(crate) struct Operation {
    pub name: &'static str,
    pub query: &'static str,
    /// Top-level field of `data` holding the union result
    pub field: &'static str,
    /// `__typename`s that carry the success payload
    pub success: &'static [&'static str],
    /// Object kind named in not-found errors
    pub object_type: &'static str,
}

/// Static description of one list operation
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListQuery {
    pub operation: &'static str,
    pub query: &'static str,
    /// Top-level field of `data` holding the paged result, or the parent
    /// object when `parent` is set
    pub field: &'static str,
    /// Set when the page hangs below a parent object looked up by `id`
    pub parent: Option<ParentObject>,
    /// `__typename` of the nodes that map to items
    pub node_typename: &'static str,
}

/// Parent union wrapping a nested paged result, e.g. `accessProvider { whoList }`
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParentObject {
    pub typenames: &'static [&'static str],
    /// Field of the parent holding the paged result
    pub field: &'static str,
    pub object_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagedResult {
    #[serde(default)]
    page_info: Option<PageInfo>,
    #[serde(default)]
    edges: Vec<Edge<Value>>,
}

#[derive(Deserialize)]
struct SuccessFlag {
    #[serde(default)]
    success: Option<bool>,
}

/// Stream every object of one list operation
///
/// `arguments` is an object of extra query variables; the paging variables
/// and the options are merged into it for every page.
pub(crate) fn list_stream<T>(
    graphql: &GraphqlClient,
    cancel: &CancellationToken,
    list: ListQuery,
    arguments: Value,
    page_size: usize,
    options: ListOptions,
) -> ListStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let graphql = graphql.clone();
    let parent_id = arguments.get("id").and_then(Value::as_str).unwrap_or_default().to_string();

    let load_page = move |cursor: Option<String>| {
        let graphql = graphql.clone();
        let parent_id = parent_id.clone();
        let variables = page_variables(&arguments, cursor, page_size, &options);

        async move {
            let result =
                graphql.execute_field(list.operation, list.query, &variables, list.field).await?;
            let paged = match list.parent {
                Some(parent) => nested_page(result, &list, parent, &parent_id)?,
                None => result,
            };
            parse_page(paged, list.operation)
        }
    };

    let to_item = move |edge: Edge<Value>| map_edge(edge, list.node_typename);

    paginate(cancel, load_page, to_item)
}

fn page_variables(
    arguments: &Value,
    cursor: Option<String>,
    page_size: usize,
    options: &ListOptions,
) -> Value {
    let mut variables = match arguments {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    variables.insert("after".into(), json!(cursor));
    variables.insert("limit".into(), json!(page_size));
    if let Some(filter) = &options.filter {
        variables.insert("filter".into(), filter.clone());
    }
    if let Some(order) = &options.order {
        variables.insert("order".into(), order.clone());
    }
    Value::Object(variables)
}

/// Classify the parent union and take the paged result it carries
fn nested_page(result: Value, list: &ListQuery, parent: ParentObject, id: &str) -> Result<Value> {
    let operation = Operation {
        name: list.operation,
        query: list.query,
        field: list.field,
        success: parent.typenames,
        object_type: parent.object_type,
    };
    let mut object: Value = classify(result, &operation, id)?;
    Ok(object.get_mut(parent.field).map(Value::take).unwrap_or(Value::Null))
}

fn parse_page(result: Value, operation: &str) -> Result<Page<Edge<Value>>> {
    match typename_of(&result) {
        Some(PAGED_RESULT_TYPENAME) => {
            let paged: PagedResult = serde_json::from_value(result).map_err(|e| {
                RaitoError::Client(format!("failed to decode page of {operation}: {e}"))
            })?;
            debug!(operation, edges = paged.edges.len(), "Decoded page");
            Ok(Page::new(paged.page_info, paged.edges))
        }
        Some(PERMISSION_DENIED_TYPENAME) => Err(RaitoError::PermissionDenied {
            operation: operation.to_string(),
            message: result.get("message").and_then(Value::as_str).unwrap_or_default().to_string(),
        }),
        other => Err(RaitoError::Client(format!(
            "unexpected result type: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

fn map_edge<T: DeserializeOwned>(edge: Edge<Value>, node_typename: &str) -> Result<EdgeOutcome<T>> {
    let Some(node) = edge.node.filter(|node| !node.is_null()) else {
        return Ok(EdgeOutcome::tombstone(edge.cursor));
    };

    match typename_of(&node) {
        Some(typename) if typename == node_typename => {
            let item = serde_json::from_value(node).map_err(|e| {
                RaitoError::Client(format!("failed to decode {node_typename} node: {e}"))
            })?;
            Ok(EdgeOutcome::item(edge.cursor, item))
        }
        other => Err(RaitoError::Client(format!(
            "unexpected node type: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

/// Run a single-object operation and classify its union result
pub(crate) async fn fetch_one<T: DeserializeOwned>(
    graphql: &GraphqlClient,
    operation: &Operation,
    variables: Value,
    id: &str,
) -> Result<T> {
    let result =
        graphql.execute_field(operation.name, operation.query, &variables, operation.field).await?;
    classify(result, operation, id)
}

/// Classify one union result; `null` means the object does not exist
pub(crate) fn classify<T: DeserializeOwned>(
    result: Value,
    operation: &Operation,
    id: &str,
) -> Result<T> {
    if result.is_null() {
        return Err(RaitoError::NotFound {
            object_type: operation.object_type.to_string(),
            id: id.to_string(),
            message: format!("no {} found", operation.object_type),
        });
    }

    ResultVariant::from_value(result, operation.success)?.into_result(
        operation.field,
        operation.object_type,
        id,
    )
}

/// Run a mutation answering with a success flag; `success: false` is a
/// client error
pub(crate) async fn mutate_flag(
    graphql: &GraphqlClient,
    operation: &Operation,
    variables: Value,
    id: &str,
) -> Result<()> {
    let outcome: SuccessFlag = fetch_one(graphql, operation, variables, id).await?;

    if outcome.success.unwrap_or(true) {
        Ok(())
    } else {
        Err(RaitoError::Client(format!("{} failed", operation.field)))
    }
}

/// Run a delete operation; a `success: false` answer is a client error
pub(crate) async fn delete_one(
    graphql: &GraphqlClient,
    operation: &Operation,
    id: &str,
) -> Result<()> {
    let deleted: SuccessFlag = fetch_one(graphql, operation, json!({ "id": id }), id).await?;

    if deleted.success.unwrap_or(true) {
        Ok(())
    } else {
        Err(RaitoError::Client(format!("unknown {} delete error", operation.object_type)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    #[test]
    fn paged_result_becomes_page() {
        let page = parse_page(
            json!({
                "__typename": "PagedResult",
                "pageInfo": { "hasNextPage": true, "endCursor": "c2" },
                "edges": [
                    { "cursor": "c1", "node": { "__typename": "Thing", "id": "a" } },
                    { "cursor": "c2", "node": null }
                ]
            }),
            "listThings",
        )
        .unwrap();

        assert!(page.has_next());
        assert_eq!(page.edges.len(), 2);
        assert!(page.edges[1].node.is_none());
    }

    #[test]
    fn permission_denied_page_is_typed_error() {
        let err = parse_page(
            json!({ "__typename": "PermissionDeniedError", "message": "not allowed" }),
            "listThings",
        )
        .unwrap_err();

        match err {
            RaitoError::PermissionDenied { operation, message } => {
                assert_eq!(operation, "listThings");
                assert_eq!(message, "not allowed");
            }
            other => panic!("expected permission denied, got {other:?}"),
        }
    }

    #[test]
    fn null_node_is_tombstone() {
        let outcome: EdgeOutcome<Thing> =
            map_edge(Edge { cursor: Some("c".into()), node: None }, "Thing").unwrap();
        assert_eq!(outcome, EdgeOutcome::tombstone(Some("c".into())));
    }

    #[test]
    fn unexpected_node_type_fails_mapping() {
        let edge = Edge { cursor: Some("c".into()), node: Some(json!({ "__typename": "Other" })) };
        let result: Result<EdgeOutcome<Thing>> = map_edge(edge, "Thing");
        assert!(matches!(result, Err(RaitoError::Client(ref msg)) if msg.contains("Other")));
    }

    const GET_THING: Operation = Operation {
        name: "GetThing",
        query: "query GetThing { thing { __typename } }",
        field: "thing",
        success: &["Thing"],
        object_type: "thing",
    };

    const THING_PARTS: ListQuery = ListQuery {
        operation: "ListThingParts",
        query: "query ListThingParts { thing { __typename } }",
        field: "thing",
        parent: Some(ParentObject { typenames: &["Thing"], field: "parts", object_type: "thing" }),
        node_typename: "Part",
    };

    #[test]
    fn null_result_is_not_found_for_descriptor_object() {
        let err = classify::<Thing>(Value::Null, &GET_THING, "t1").unwrap_err();
        match err {
            RaitoError::NotFound { object_type, id, .. } => {
                assert_eq!(object_type, "thing");
                assert_eq!(id, "t1");
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn permission_denied_names_descriptor_field() {
        let err = classify::<Thing>(
            json!({ "__typename": "PermissionDeniedError", "message": "no" }),
            &GET_THING,
            "t1",
        )
        .unwrap_err();
        assert!(matches!(err, RaitoError::PermissionDenied { ref operation, .. } if operation == "thing"));
    }

    #[test]
    fn nested_page_is_taken_from_parent() {
        let parent = THING_PARTS.parent.unwrap();
        let paged = nested_page(
            json!({ "__typename": "Thing", "id": "t1", "parts": { "__typename": "PagedResult", "edges": [] } }),
            &THING_PARTS,
            parent,
            "t1",
        )
        .unwrap();
        assert_eq!(paged["__typename"], "PagedResult");
    }

    #[test]
    fn missing_parent_is_not_found() {
        let parent = THING_PARTS.parent.unwrap();
        let err = nested_page(
            json!({ "__typename": "NotFoundError", "message": "gone" }),
            &THING_PARTS,
            parent,
            "t9",
        )
        .unwrap_err();
        assert!(matches!(err, RaitoError::NotFound { ref id, .. } if id == "t9"));
    }

    #[test]
    fn page_variables_merge_arguments_and_options() {
        let options = ListOptions::default().with_order(json!([{ "name": "ASC" }]));
        let variables =
            page_variables(&json!({ "id": "t1" }), Some("c1".into()), 10, &options);
        assert_eq!(
            variables,
            json!({ "id": "t1", "after": "c1", "limit": 10, "order": [{ "name": "ASC" }] })
        );
    }

    #[test]
    fn list_options_builders() {
        let options = ListOptions::default()
            .with_filter(json!({ "search": "acme" }))
            .with_order(json!([{ "name": "ASC" }]));
        assert_eq!(options.filter, Some(json!({ "search": "acme" })));
        assert_eq!(options.order, Some(json!([{ "name": "ASC" }])));
    }
}
