//! Identity store call site

use raito_core::ListStream;
use raito_domain::{IdentityStore, IdentityStoreInput, Result};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{delete_one, fetch_one, list_stream, ListOptions, ListQuery, Operation};
use crate::api::GraphqlClient;

const GET_IDENTITY_STORE_QUERY: &str = r"
query GetIdentityStore($id: ID!) {
  identityStore(id: $id) {
    __typename
    ... on IdentityStore { id name description type master native }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const CREATE_IDENTITY_STORE_QUERY: &str = r"
mutation CreateIdentityStore($input: IdentityStoreInput!) {
  createIdentityStore(input: $input) {
    __typename
    ... on IdentityStore { id name description type master native }
    ... on AlreadyExistsError { message }
    ... on InvalidInputError { message }
    ... on PermissionDeniedError { message }
  }
}";

const UPDATE_IDENTITY_STORE_QUERY: &str = r"
mutation UpdateIdentityStore($id: ID!, $input: IdentityStoreInput!) {
  updateIdentityStore(id: $id, input: $input) {
    __typename
    ... on IdentityStore { id name description type master native }
    ... on AlreadyExistsError { message }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const DELETE_IDENTITY_STORE_QUERY: &str = r"
mutation DeleteIdentityStore($id: ID!) {
  deleteIdentityStore(id: $id) {
    __typename
    ... on DeleteIdentityStore { success }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const LIST_IDENTITY_STORES_QUERY: &str = r"
query ListIdentityStores($after: String, $limit: Int, $filter: IdentityStoreFilterInput, $order: [IdentityStoreOrderByInput!]) {
  identityStores(after: $after, limit: $limit, filter: $filter, order: $order) {
    __typename
    ... on PagedResult {
      pageInfo { hasNextPage startCursor endCursor }
      edges {
        cursor
        node { __typename ... on IdentityStore { id name description type master native } }
      }
    }
    ... on PermissionDeniedError { message }
  }
}";

const SUCCESS: &[&str] = &["IdentityStore"];

const GET_IDENTITY_STORE: Operation = Operation {
    name: "GetIdentityStore",
    query: GET_IDENTITY_STORE_QUERY,
    field: "identityStore",
    success: SUCCESS,
    object_type: "identityStore",
};

const CREATE_IDENTITY_STORE: Operation = Operation {
    name: "CreateIdentityStore",
    query: CREATE_IDENTITY_STORE_QUERY,
    field: "createIdentityStore",
    success: SUCCESS,
    object_type: "identityStore",
};

const UPDATE_IDENTITY_STORE: Operation = Operation {
    name: "UpdateIdentityStore",
    query: UPDATE_IDENTITY_STORE_QUERY,
    field: "updateIdentityStore",
    success: SUCCESS,
    object_type: "identityStore",
};

const DELETE_IDENTITY_STORE: Operation = Operation {
    name: "DeleteIdentityStore",
    query: DELETE_IDENTITY_STORE_QUERY,
    field: "deleteIdentityStore",
    success: &["DeleteIdentityStore"],
    object_type: "identityStore",
};

const LIST_IDENTITY_STORES: ListQuery = ListQuery {
    operation: "ListIdentityStores",
    query: LIST_IDENTITY_STORES_QUERY,
    field: "identityStores",
    parent: None,
    node_typename: "IdentityStore",
};

/// Read and write access to identity stores
#[derive(Debug, Clone)]
pub struct IdentityStoreClient {
    graphql: GraphqlClient,
    page_size: usize,
}

impl IdentityStoreClient {
    pub fn new(graphql: GraphqlClient, page_size: usize) -> Self {
        Self { graphql, page_size }
    }

    #[instrument(skip(self))]
    pub async fn get_identity_store(&self, id: &str) -> Result<IdentityStore> {
        fetch_one(&self.graphql, &GET_IDENTITY_STORE, json!({ "id": id }), id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_identity_store(&self, input: &IdentityStoreInput) -> Result<IdentityStore> {
        let store: IdentityStore =
            fetch_one(&self.graphql, &CREATE_IDENTITY_STORE, json!({ "input": input }), "").await?;

        info!(id = %store.id, "Created identity store");
        Ok(store)
    }

    #[instrument(skip(self, input))]
    pub async fn update_identity_store(
        &self,
        id: &str,
        input: &IdentityStoreInput,
    ) -> Result<IdentityStore> {
        fetch_one(&self.graphql, &UPDATE_IDENTITY_STORE, json!({ "id": id, "input": input }), id)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_identity_store(&self, id: &str) -> Result<()> {
        delete_one(&self.graphql, &DELETE_IDENTITY_STORE, id).await?;

        info!(id, "Deleted identity store");
        Ok(())
    }

    pub fn list_identity_stores(
        &self,
        cancel: &CancellationToken,
        options: ListOptions,
    ) -> ListStream<IdentityStore> {
        list_stream(&self.graphql, cancel, LIST_IDENTITY_STORES, json!({}), self.page_size, options)
    }
}
