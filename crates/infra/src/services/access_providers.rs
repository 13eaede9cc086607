//! Access provider call site
//!
//! Create and update may answer with the provider itself or with an
//! `AccessProviderWithOptionalAccessRequests` wrapper carrying it under
//! `accessProvider`. The who and what lists are paged results nested in the
//! provider they belong to.

use raito_core::ListStream;
use raito_domain::{
    typename_of, AccessProvider, AccessProviderInput, AccessWhatAccessProviderItem,
    AccessWhatItem, AccessWhoItem, DataObject, Result,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{
    classify, delete_one, fetch_one, list_stream, ListOptions, ListQuery, Operation, ParentObject,
};
use crate::api::GraphqlClient;

const WRAPPER_TYPENAME: &str = "AccessProviderWithOptionalAccessRequests";

const GET_ACCESS_PROVIDER_QUERY: &str = r"
query GetAccessProvider($id: ID!) {
  accessProvider(id: $id) {
    __typename
    ... on AccessProvider { id name description action state type }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const CREATE_ACCESS_PROVIDER_QUERY: &str = r"
mutation CreateAccessProvider($input: AccessProviderInput!) {
  createAccessProvider(input: $input) {
    __typename
    ... on AccessProvider { id name description action state type }
    ... on AccessProviderWithOptionalAccessRequests {
      accessProvider { __typename id name description action state type }
    }
    ... on AlreadyExistsError { message }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const UPDATE_ACCESS_PROVIDER_QUERY: &str = r"
mutation UpdateAccessProvider($id: ID!, $input: AccessProviderInput!) {
  updateAccessProvider(id: $id, input: $input) {
    __typename
    ... on AccessProvider { id name description action state type }
    ... on AccessProviderWithOptionalAccessRequests {
      accessProvider { __typename id name description action state type }
    }
    ... on AlreadyExistsError { message }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const DELETE_ACCESS_PROVIDER_QUERY: &str = r"
mutation DeleteAccessProvider($id: ID!) {
  deleteAccessProvider(id: $id) {
    __typename
    ... on AccessProvider { id }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const LIST_ACCESS_PROVIDERS_QUERY: &str = r"
query ListAccessProviders($after: String, $limit: Int, $filter: AccessProviderFilterInput, $order: [AccessProviderOrderByInput!]) {
  accessProviders(after: $after, limit: $limit, filter: $filter, order: $order) {
    __typename
    ... on PagedResult {
      pageInfo { hasNextPage startCursor endCursor }
      edges {
        cursor
        node { __typename ... on AccessProvider { id name description action state type } }
      }
    }
    ... on PermissionDeniedError { message }
  }
}";

const ACTIVATE_ACCESS_PROVIDER_QUERY: &str = r"
mutation ActivateAccessProvider($id: ID!) {
  activateAccessProvider(id: $id) {
    __typename
    ... on AccessProvider { id name description action state type }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const DEACTIVATE_ACCESS_PROVIDER_QUERY: &str = r"
mutation DeactivateAccessProvider($id: ID!) {
  deactivateAccessProvider(id: $id) {
    __typename
    ... on AccessProvider { id name description action state type }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const WHO_LIST_QUERY: &str = r"
query GetAccessProviderWhoList($id: ID!, $after: String, $limit: Int, $order: [AccessWhoOrderByInput!]) {
  accessProvider(id: $id) {
    __typename
    ... on AccessProvider {
      whoList(after: $after, limit: $limit, order: $order) {
        __typename
        ... on PagedResult {
          pageInfo { hasNextPage startCursor endCursor }
          edges {
            cursor
            node {
              __typename
              ... on AccessWhoItem {
                item {
                  __typename
                  ... on User { id name }
                  ... on Group { id name }
                  ... on AccessProvider { id name }
                }
                expiresAt
                type
              }
            }
          }
        }
        ... on PermissionDeniedError { message }
      }
    }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const WHAT_DATA_OBJECTS_QUERY: &str = r"
query GetAccessProviderWhatDataObjectList($id: ID!, $after: String, $limit: Int, $filter: AccessWhatFilterInput, $order: [AccessWhatOrderByInput!]) {
  accessProvider(id: $id) {
    __typename
    ... on AccessProvider {
      whatDataObjects(after: $after, limit: $limit, filter: $filter, order: $order) {
        __typename
        ... on PagedResult {
          pageInfo { hasNextPage startCursor endCursor }
          edges {
            cursor
            node {
              __typename
              ... on AccessWhatItem {
                dataObject { id name fullName type description deleted }
                permissions
                globalPermissions
              }
            }
          }
        }
        ... on PermissionDeniedError { message }
      }
    }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const WHAT_ACCESS_PROVIDERS_QUERY: &str = r"
query GetAccessProviderWhatAccessProviders($id: ID!, $after: String, $limit: Int, $filter: AccessWhatAccessProviderFilterInput, $order: [AccessWhatOrderByInput!]) {
  accessProvider(id: $id) {
    __typename
    ... on AccessProvider {
      whatAccessProviders(after: $after, limit: $limit, filter: $filter, order: $order) {
        __typename
        ... on PagedResult {
          pageInfo { hasNextPage startCursor endCursor }
          edges {
            cursor
            node {
              __typename
              ... on AccessWhatAccessProviderItem {
                accessProvider { id name description action state type }
                expiresAt
              }
            }
          }
        }
        ... on PermissionDeniedError { message }
      }
    }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const ABAC_WHAT_SCOPE_QUERY: &str = r"
query ListAccessProviderAbacWhatScope($id: ID!, $after: String, $limit: Int, $search: String, $order: [DataObjectOrderByInput!]) {
  accessProvider(id: $id) {
    __typename
    ... on AccessProvider {
      whatAbacScope(after: $after, limit: $limit, search: $search, order: $order) {
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
    }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const SUCCESS: &[&str] = &["AccessProvider"];

const GET_ACCESS_PROVIDER: Operation = Operation {
    name: "GetAccessProvider",
    query: GET_ACCESS_PROVIDER_QUERY,
    field: "accessProvider",
    success: SUCCESS,
    object_type: "accessProvider",
};

const CREATE_ACCESS_PROVIDER: Operation = Operation {
    name: "CreateAccessProvider",
    query: CREATE_ACCESS_PROVIDER_QUERY,
    field: "createAccessProvider",
    success: SUCCESS,
    object_type: "accessProvider",
};

const UPDATE_ACCESS_PROVIDER: Operation = Operation {
    name: "UpdateAccessProvider",
    query: UPDATE_ACCESS_PROVIDER_QUERY,
    field: "updateAccessProvider",
    success: SUCCESS,
    object_type: "accessProvider",
};

const DELETE_ACCESS_PROVIDER: Operation = Operation {
    name: "DeleteAccessProvider",
    query: DELETE_ACCESS_PROVIDER_QUERY,
    field: "deleteAccessProvider",
    success: SUCCESS,
    object_type: "accessProvider",
};

const ACTIVATE_ACCESS_PROVIDER: Operation = Operation {
    name: "ActivateAccessProvider",
    query: ACTIVATE_ACCESS_PROVIDER_QUERY,
    field: "activateAccessProvider",
    success: SUCCESS,
    object_type: "accessProvider",
};

const DEACTIVATE_ACCESS_PROVIDER: Operation = Operation {
    name: "DeactivateAccessProvider",
    query: DEACTIVATE_ACCESS_PROVIDER_QUERY,
    field: "deactivateAccessProvider",
    success: SUCCESS,
    object_type: "accessProvider",
};

const LIST_ACCESS_PROVIDERS: ListQuery = ListQuery {
    operation: "ListAccessProviders",
    query: LIST_ACCESS_PROVIDERS_QUERY,
    field: "accessProviders",
    parent: None,
    node_typename: "AccessProvider",
};

const fn nested_in_provider(field: &'static str) -> Option<ParentObject> {
    Some(ParentObject { typenames: SUCCESS, field, object_type: "accessProvider" })
}

const WHO_LIST: ListQuery = ListQuery {
    operation: "GetAccessProviderWhoList",
    query: WHO_LIST_QUERY,
    field: "accessProvider",
    parent: nested_in_provider("whoList"),
    node_typename: "AccessWhoItem",
};

const WHAT_DATA_OBJECTS: ListQuery = ListQuery {
    operation: "GetAccessProviderWhatDataObjectList",
    query: WHAT_DATA_OBJECTS_QUERY,
    field: "accessProvider",
    parent: nested_in_provider("whatDataObjects"),
    node_typename: "AccessWhatItem",
};

const WHAT_ACCESS_PROVIDERS: ListQuery = ListQuery {
    operation: "GetAccessProviderWhatAccessProviders",
    query: WHAT_ACCESS_PROVIDERS_QUERY,
    field: "accessProvider",
    parent: nested_in_provider("whatAccessProviders"),
    node_typename: "AccessWhatAccessProviderItem",
};

const ABAC_WHAT_SCOPE: ListQuery = ListQuery {
    operation: "ListAccessProviderAbacWhatScope",
    query: ABAC_WHAT_SCOPE_QUERY,
    field: "accessProvider",
    parent: nested_in_provider("whatAbacScope"),
    node_typename: "DataObject",
};

/// Read and write access to access providers
#[derive(Debug, Clone)]
pub struct AccessProviderClient {
    graphql: GraphqlClient,
    page_size: usize,
}

impl AccessProviderClient {
    pub fn new(graphql: GraphqlClient, page_size: usize) -> Self {
        Self { graphql, page_size }
    }

    /// Get an access provider by id
    ///
    /// # Errors
    /// `RaitoError::NotFound` if no access provider has this id.
    #[instrument(skip(self))]
    pub async fn get_access_provider(&self, id: &str) -> Result<AccessProvider> {
        fetch_one(&self.graphql, &GET_ACCESS_PROVIDER, json!({ "id": id }), id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_access_provider(
        &self,
        input: &AccessProviderInput,
    ) -> Result<AccessProvider> {
        let provider: AccessProvider =
            self.write(&CREATE_ACCESS_PROVIDER, json!({ "input": input }), "").await?;

        info!(id = %provider.id, "Created access provider");
        Ok(provider)
    }

    #[instrument(skip(self, input))]
    pub async fn update_access_provider(
        &self,
        id: &str,
        input: &AccessProviderInput,
    ) -> Result<AccessProvider> {
        self.write(&UPDATE_ACCESS_PROVIDER, json!({ "id": id, "input": input }), id).await
    }

    /// Delete an access provider
    ///
    /// The server answers with the deleted provider rather than a success flag.
    #[instrument(skip(self))]
    pub async fn delete_access_provider(&self, id: &str) -> Result<()> {
        delete_one(&self.graphql, &DELETE_ACCESS_PROVIDER, id).await?;

        info!(id, "Deleted access provider");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn activate_access_provider(&self, id: &str) -> Result<AccessProvider> {
        let provider: AccessProvider =
            fetch_one(&self.graphql, &ACTIVATE_ACCESS_PROVIDER, json!({ "id": id }), id).await?;

        info!(id, state = ?provider.state, "Activated access provider");
        Ok(provider)
    }

    #[instrument(skip(self))]
    pub async fn deactivate_access_provider(&self, id: &str) -> Result<AccessProvider> {
        let provider: AccessProvider =
            fetch_one(&self.graphql, &DEACTIVATE_ACCESS_PROVIDER, json!({ "id": id }), id).await?;

        info!(id, state = ?provider.state, "Deactivated access provider");
        Ok(provider)
    }

    pub fn list_access_providers(
        &self,
        cancel: &CancellationToken,
        options: ListOptions,
    ) -> ListStream<AccessProvider> {
        list_stream(&self.graphql, cancel, LIST_ACCESS_PROVIDERS, json!({}), self.page_size, options)
    }

    /// Stream the users, groups and access providers granted access by `id`
    ///
    /// Only the ordering of `options` applies to this list.
    pub fn list_who(
        &self,
        cancel: &CancellationToken,
        id: &str,
        options: ListOptions,
    ) -> ListStream<AccessWhoItem> {
        let options = ListOptions { filter: None, ..options };
        list_stream(&self.graphql, cancel, WHO_LIST, json!({ "id": id }), self.page_size, options)
    }

    /// Stream the data objects `id` grants access to, with their permissions
    pub fn list_what_data_objects(
        &self,
        cancel: &CancellationToken,
        id: &str,
        options: ListOptions,
    ) -> ListStream<AccessWhatItem> {
        list_stream(
            &self.graphql,
            cancel,
            WHAT_DATA_OBJECTS,
            json!({ "id": id }),
            self.page_size,
            options,
        )
    }

    /// Stream the access providers `id` grants access to
    pub fn list_what_access_providers(
        &self,
        cancel: &CancellationToken,
        id: &str,
        options: ListOptions,
    ) -> ListStream<AccessWhatAccessProviderItem> {
        list_stream(
            &self.graphql,
            cancel,
            WHAT_ACCESS_PROVIDERS,
            json!({ "id": id }),
            self.page_size,
            options,
        )
    }

    /// Stream the data objects matched by the attribute-based what rule of `id`
    ///
    /// `search` narrows the objects by name; only the ordering of `options`
    /// applies.
    pub fn list_abac_what_scope(
        &self,
        cancel: &CancellationToken,
        id: &str,
        search: Option<&str>,
        options: ListOptions,
    ) -> ListStream<DataObject> {
        let options = ListOptions { filter: None, ..options };
        list_stream(
            &self.graphql,
            cancel,
            ABAC_WHAT_SCOPE,
            json!({ "id": id, "search": search }),
            self.page_size,
            options,
        )
    }

    /// Create or update, unwrapping the access request wrapper
    async fn write(
        &self,
        operation: &Operation,
        variables: Value,
        id: &str,
    ) -> Result<AccessProvider> {
        let result = self
            .graphql
            .execute_field(operation.name, operation.query, &variables, operation.field)
            .await?;

        classify(unwrap_provider(result), operation, id)
    }
}

/// Replace the request wrapper by the provider it carries
fn unwrap_provider(mut result: Value) -> Value {
    if typename_of(&result) == Some(WRAPPER_TYPENAME) {
        let mut provider = result.get_mut("accessProvider").map(Value::take).unwrap_or(Value::Null);
        if let Some(object) = provider.as_object_mut() {
            object
                .entry("__typename")
                .or_insert_with(|| Value::String("AccessProvider".to_string()));
        }
        return provider;
    }
    result
}
