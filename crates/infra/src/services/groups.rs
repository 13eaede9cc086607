//! Group call site

use raito_core::ListStream;
use raito_domain::{Group, Result};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::{fetch_one, list_stream, ListOptions, ListQuery, Operation};
use crate::api::GraphqlClient;

const GET_GROUP_QUERY: &str = r"
query GetGroup($id: ID!) {
  group(id: $id) {
    __typename
    ... on Group { id name displayName description externalId }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const LIST_GROUPS_QUERY: &str = r"
query ListGroups($after: String, $limit: Int, $filter: GroupFilterInput, $order: [GroupOrderByInput!]) {
  groups(after: $after, limit: $limit, filter: $filter, order: $order) {
    __typename
    ... on PagedResult {
      pageInfo { hasNextPage startCursor endCursor }
      edges {
        cursor
        node { __typename ... on Group { id name displayName description externalId } }
      }
    }
    ... on PermissionDeniedError { message }
  }
}";

const GET_GROUP: Operation = Operation {
    name: "GetGroup",
    query: GET_GROUP_QUERY,
    field: "group",
    success: &["Group"],
    object_type: "group",
};

const LIST_GROUPS: ListQuery = ListQuery {
    operation: "ListGroups",
    query: LIST_GROUPS_QUERY,
    field: "groups",
    parent: None,
    node_typename: "Group",
};

/// Read access to identity groups
#[derive(Debug, Clone)]
pub struct GroupClient {
    graphql: GraphqlClient,
    page_size: usize,
}

impl GroupClient {
    pub fn new(graphql: GraphqlClient, page_size: usize) -> Self {
        Self { graphql, page_size }
    }

    #[instrument(skip(self))]
    pub async fn get_group(&self, id: &str) -> Result<Group> {
        fetch_one(&self.graphql, &GET_GROUP, json!({ "id": id }), id).await
    }

    pub fn list_groups(&self, cancel: &CancellationToken, options: ListOptions) -> ListStream<Group> {
        list_stream(&self.graphql, cancel, LIST_GROUPS, json!({}), self.page_size, options)
    }
}
