//! Data source call site

use raito_core::ListStream;
use raito_domain::{DataSource, DataSourceInput, IdentityStore, Result};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::{delete_one, fetch_one, list_stream, ListOptions, ListQuery, Operation};
use crate::api::GraphqlClient;

const GET_DATA_SOURCE_QUERY: &str = r"
query GetDataSource($id: ID!) {
  dataSource(id: $id) {
    __typename
    ... on DataSource { id name description type syncMethod }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const CREATE_DATA_SOURCE_QUERY: &str = r"
mutation CreateDataSource($input: DataSourceInput!) {
  createDataSource(input: $input) {
    __typename
    ... on DataSource { id name description type syncMethod }
    ... on AlreadyExistsError { message }
    ... on InvalidInputError { message }
    ... on PermissionDeniedError { message }
  }
}";

const UPDATE_DATA_SOURCE_QUERY: &str = r"
mutation UpdateDataSource($id: ID!, $input: DataSourceInput!) {
  updateDataSource(id: $id, input: $input) {
    __typename
    ... on DataSource { id name description type syncMethod }
    ... on AlreadyExistsError { message }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const DELETE_DATA_SOURCE_QUERY: &str = r"
mutation DeleteDataSource($id: ID!) {
  deleteDataSource(id: $id) {
    __typename
    ... on DeleteDataSource { success }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const LIST_DATA_SOURCES_QUERY: &str = r"
query ListDataSources($after: String, $limit: Int, $filter: DataSourceFilterInput, $order: [DataSourceOrderByInput!]) {
  dataSources(after: $after, limit: $limit, filter: $filter, order: $order) {
    __typename
    ... on PagedResult {
      pageInfo { hasNextPage startCursor endCursor }
      edges {
        cursor
        node { __typename ... on DataSource { id name description type syncMethod } }
      }
    }
    ... on PermissionDeniedError { message }
  }
}";

const ADD_IDENTITY_STORE_QUERY: &str = r"
mutation AddIdentityStoreToDataSource($id: ID!, $identityStore: ID!) {
  addIdentityStoreToDataSource(dsId: $id, isId: $identityStore) {
    __typename
    ... on DataSource { id }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const REMOVE_IDENTITY_STORE_QUERY: &str = r"
mutation RemoveIdentityStoreFromDataSource($id: ID!, $identityStore: ID!) {
  removeIdentityStoreFromDataSource(dsId: $id, isId: $identityStore) {
    __typename
    ... on DataSource { id }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const DATA_SOURCE_IDENTITY_STORES_QUERY: &str = r"
query DataSourceIdentityStores($id: ID!) {
  dataSource(id: $id) {
    __typename
    ... on DataSource {
      identityStores { id name description type master native }
    }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const SUCCESS: &[&str] = &["DataSource"];

const GET_DATA_SOURCE: Operation = Operation {
    name: "GetDataSource",
    query: GET_DATA_SOURCE_QUERY,
    field: "dataSource",
    success: SUCCESS,
    object_type: "dataSource",
};

const CREATE_DATA_SOURCE: Operation = Operation {
    name: "CreateDataSource",
    query: CREATE_DATA_SOURCE_QUERY,
    field: "createDataSource",
    success: SUCCESS,
    object_type: "dataSource",
};

const UPDATE_DATA_SOURCE: Operation = Operation {
    name: "UpdateDataSource",
    query: UPDATE_DATA_SOURCE_QUERY,
    field: "updateDataSource",
    success: SUCCESS,
    object_type: "dataSource",
};

const DELETE_DATA_SOURCE: Operation = Operation {
    name: "DeleteDataSource",
    query: DELETE_DATA_SOURCE_QUERY,
    field: "deleteDataSource",
    success: &["DeleteDataSource"],
    object_type: "dataSource",
};

const ADD_IDENTITY_STORE: Operation = Operation {
    name: "AddIdentityStoreToDataSource",
    query: ADD_IDENTITY_STORE_QUERY,
    field: "addIdentityStoreToDataSource",
    success: SUCCESS,
    object_type: "dataSource",
};

const REMOVE_IDENTITY_STORE: Operation = Operation {
    name: "RemoveIdentityStoreFromDataSource",
    query: REMOVE_IDENTITY_STORE_QUERY,
    field: "removeIdentityStoreFromDataSource",
    success: SUCCESS,
    object_type: "dataSource",
};

const DATA_SOURCE_IDENTITY_STORES: Operation = Operation {
    name: "DataSourceIdentityStores",
    query: DATA_SOURCE_IDENTITY_STORES_QUERY,
    field: "dataSource",
    success: SUCCESS,
    object_type: "dataSource",
};

const LIST_DATA_SOURCES: ListQuery = ListQuery {
    operation: "ListDataSources",
    query: LIST_DATA_SOURCES_QUERY,
    field: "dataSources",
    parent: None,
    node_typename: "DataSource",
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedIdentityStores {
    #[serde(default)]
    identity_stores: Vec<IdentityStore>,
}

/// Read and write access to data sources
#[derive(Debug, Clone)]
pub struct DataSourceClient {
    graphql: GraphqlClient,
    page_size: usize,
}

impl DataSourceClient {
    pub fn new(graphql: GraphqlClient, page_size: usize) -> Self {
        Self { graphql, page_size }
    }

    /// Get a data source by id
    ///
    /// # Errors
    /// `RaitoError::NotFound` if no data source has this id.
    #[instrument(skip(self))]
    pub async fn get_data_source(&self, id: &str) -> Result<DataSource> {
        fetch_one(&self.graphql, &GET_DATA_SOURCE, json!({ "id": id }), id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_data_source(&self, input: &DataSourceInput) -> Result<DataSource> {
        let data_source: DataSource =
            fetch_one(&self.graphql, &CREATE_DATA_SOURCE, json!({ "input": input }), "").await?;

        info!(id = %data_source.id, "Created data source");
        Ok(data_source)
    }

    #[instrument(skip(self, input))]
    pub async fn update_data_source(&self, id: &str, input: &DataSourceInput) -> Result<DataSource> {
        fetch_one(&self.graphql, &UPDATE_DATA_SOURCE, json!({ "id": id, "input": input }), id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_data_source(&self, id: &str) -> Result<()> {
        delete_one(&self.graphql, &DELETE_DATA_SOURCE, id).await?;

        info!(id, "Deleted data source");
        Ok(())
    }

    /// Stream all data sources matching `options`
    pub fn list_data_sources(
        &self,
        cancel: &CancellationToken,
        options: ListOptions,
    ) -> ListStream<DataSource> {
        list_stream(&self.graphql, cancel, LIST_DATA_SOURCES, json!({}), self.page_size, options)
    }

    /// Link an existing identity store to a data source
    ///
    /// # Errors
    /// `RaitoError::NotFound` if either object does not exist.
    #[instrument(skip(self))]
    pub async fn add_identity_store(&self, id: &str, identity_store_id: &str) -> Result<()> {
        let _: serde_json::Value = fetch_one(
            &self.graphql,
            &ADD_IDENTITY_STORE,
            json!({ "id": id, "identityStore": identity_store_id }),
            id,
        )
        .await?;

        info!(id, identity_store = identity_store_id, "Linked identity store");
        Ok(())
    }

    /// Unlink an identity store from a data source
    #[instrument(skip(self))]
    pub async fn remove_identity_store(&self, id: &str, identity_store_id: &str) -> Result<()> {
        let _: serde_json::Value = fetch_one(
            &self.graphql,
            &REMOVE_IDENTITY_STORE,
            json!({ "id": id, "identityStore": identity_store_id }),
            id,
        )
        .await?;

        info!(id, identity_store = identity_store_id, "Unlinked identity store");
        Ok(())
    }

    /// The identity stores linked to a data source
    ///
    /// The server returns them as a plain list, so this does not stream.
    #[instrument(skip(self))]
    pub async fn list_identity_stores(&self, id: &str) -> Result<Vec<IdentityStore>> {
        let linked: LinkedIdentityStores =
            fetch_one(&self.graphql, &DATA_SOURCE_IDENTITY_STORES, json!({ "id": id }), id).await?;

        debug!(id, count = linked.identity_stores.len(), "Loaded linked identity stores");
        Ok(linked.identity_stores)
    }
}
