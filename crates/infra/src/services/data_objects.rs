//! Data object call site

use raito_core::ListStream;
use raito_domain::{DataObject, EdgeOutcome, RaitoError, Result};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::{fetch_one, list_stream, map_edge, parse_page, ListOptions, ListQuery, Operation};
use crate::api::GraphqlClient;

const GET_DATA_OBJECT_QUERY: &str = r"
query GetDataObject($id: ID!) {
  dataObject(id: $id) {
    __typename
    ... on DataObject { id name fullName type description deleted }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const LIST_DATA_OBJECTS_QUERY: &str = r"
query ListDataObjects($after: String, $limit: Int, $filter: DataObjectFilterInput, $order: [DataObjectOrderByInput!]) {
  dataObjects(after: $after, limit: $limit, filter: $filter, order: $order) {
    __typename
    ... on PagedResult {
      pageInfo { hasNextPage startCursor endCursor }
      edges {
        cursor
        node { __typename ... on DataObject { id name fullName type description deleted } }
      }
    }
    ... on PermissionDeniedError { message }
  }
}";

const DATA_OBJECT_BY_NAME_QUERY: &str = r"
query DataObjectByExternalId($fullName: String!, $dataSource: ID!) {
  dataObjects(filter: { fullName: $fullName, dataSources: [$dataSource] }) {
    __typename
    ... on PagedResult {
      edges {
        cursor
        node { __typename ... on DataObject { id } }
      }
    }
    ... on PermissionDeniedError { message }
  }
}";

const GET_DATA_OBJECT: Operation = Operation {
    name: "GetDataObject",
    query: GET_DATA_OBJECT_QUERY,
    field: "dataObject",
    success: &["DataObject"],
    object_type: "dataObject",
};

const LIST_DATA_OBJECTS: ListQuery = ListQuery {
    operation: "ListDataObjects",
    query: LIST_DATA_OBJECTS_QUERY,
    field: "dataObjects",
    parent: None,
    node_typename: "DataObject",
};

const DATA_OBJECT_BY_NAME: ListQuery = ListQuery {
    operation: "DataObjectByExternalId",
    query: DATA_OBJECT_BY_NAME_QUERY,
    field: "dataObjects",
    parent: None,
    node_typename: "DataObject",
};

#[derive(Deserialize)]
struct DataObjectId {
    id: String,
}

/// Read access to the data objects synced from data sources
#[derive(Debug, Clone)]
pub struct DataObjectClient {
    graphql: GraphqlClient,
    page_size: usize,
}

impl DataObjectClient {
    pub fn new(graphql: GraphqlClient, page_size: usize) -> Self {
        Self { graphql, page_size }
    }

    /// Get a data object by id
    ///
    /// # Errors
    /// `RaitoError::NotFound` if no data object has this id.
    #[instrument(skip(self))]
    pub async fn get_data_object(&self, id: &str) -> Result<DataObject> {
        fetch_one(&self.graphql, &GET_DATA_OBJECT, json!({ "id": id }), id).await
    }

    /// Stream all data objects matching `options`
    pub fn list_data_objects(
        &self,
        cancel: &CancellationToken,
        options: ListOptions,
    ) -> ListStream<DataObject> {
        list_stream(&self.graphql, cancel, LIST_DATA_OBJECTS, json!({}), self.page_size, options)
    }

    /// Resolve the id of the data object with `full_name` in `data_source_id`
    ///
    /// # Errors
    /// `RaitoError::NotFound` when nothing matches and `RaitoError::Client`
    /// when the name is ambiguous.
    #[instrument(skip(self))]
    pub async fn get_data_object_id_by_name(
        &self,
        full_name: &str,
        data_source_id: &str,
    ) -> Result<String> {
        let variables = json!({ "fullName": full_name, "dataSource": data_source_id });
        let result = self
            .graphql
            .execute_field(
                DATA_OBJECT_BY_NAME.operation,
                DATA_OBJECT_BY_NAME.query,
                &variables,
                DATA_OBJECT_BY_NAME.field,
            )
            .await?;

        let page = parse_page(result, DATA_OBJECT_BY_NAME.operation)?;
        debug!(full_name, matches = page.edges.len(), "Resolved data object name");

        let mut edges = page.edges.into_iter();
        match (edges.next(), edges.next()) {
            (Some(edge), None) => {
                let outcome: EdgeOutcome<DataObjectId> =
                    map_edge(edge, DATA_OBJECT_BY_NAME.node_typename)?;
                outcome.item.map(|found| found.id).ok_or_else(|| not_found(full_name))
            }
            (None, _) => Err(not_found(full_name)),
            (Some(_), Some(_)) => Err(RaitoError::Client(format!(
                "unexpected number of results for data object {full_name:?}"
            ))),
        }
    }
}

fn not_found(full_name: &str) -> RaitoError {
    RaitoError::NotFound {
        object_type: "dataObject".to_string(),
        id: full_name.to_string(),
        message: "no data object with this name".to_string(),
    }
}
