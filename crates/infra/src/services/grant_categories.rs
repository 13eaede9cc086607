//! Grant category call site
//!
//! Categories are few, so listing returns them all at once.

use raito_domain::{GrantCategory, GrantCategoryInput, RaitoError, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::{fetch_one, mutate_flag, Operation};
use crate::api::GraphqlClient;

macro_rules! grant_category_details {
    () => {
        "id name description icon isSystem isDefault canCreate allowDuplicateNames multiDataSource"
    };
}

const GET_GRANT_CATEGORY_QUERY: &str = concat!(
    r"
query GetGrantCategory($id: ID!) {
  grantCategory(id: $id) {
    __typename
    ... on GrantCategory { ",
    grant_category_details!(),
    r" }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}"
);

const CREATE_GRANT_CATEGORY_QUERY: &str = concat!(
    r"
mutation CreateGrantCategory($input: GrantCategoryInput!) {
  createGrantCategory(input: $input) {
    __typename
    ... on GrantCategory { ",
    grant_category_details!(),
    r" }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}"
);

const UPDATE_GRANT_CATEGORY_QUERY: &str = concat!(
    r"
mutation UpdateGrantCategory($id: ID!, $input: GrantCategoryInput!) {
  updateGrantCategory(id: $id, input: $input) {
    __typename
    ... on GrantCategory { ",
    grant_category_details!(),
    r" }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}"
);

const DELETE_GRANT_CATEGORY_QUERY: &str = r"
mutation DeleteGrantCategory($id: ID!) {
  deleteGrantCategory(id: $id) {
    __typename
    ... on DeleteGrantCategory { success }
    ... on InvalidInputError { message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const LIST_GRANT_CATEGORIES_QUERY: &str = concat!(
    r"
query ListGrantCategories {
  grantCategories { ",
    grant_category_details!(),
    r" }
}"
);

const SUCCESS: &[&str] = &["GrantCategory"];

const GET_GRANT_CATEGORY: Operation = Operation {
    name: "GetGrantCategory",
    query: GET_GRANT_CATEGORY_QUERY,
    field: "grantCategory",
    success: SUCCESS,
    object_type: "grantCategory",
};

const CREATE_GRANT_CATEGORY: Operation = Operation {
    name: "CreateGrantCategory",
    query: CREATE_GRANT_CATEGORY_QUERY,
    field: "createGrantCategory",
    success: SUCCESS,
    object_type: "grantCategory",
};

const UPDATE_GRANT_CATEGORY: Operation = Operation {
    name: "UpdateGrantCategory",
    query: UPDATE_GRANT_CATEGORY_QUERY,
    field: "updateGrantCategory",
    success: SUCCESS,
    object_type: "grantCategory",
};

const DELETE_GRANT_CATEGORY: Operation = Operation {
    name: "DeleteGrantCategory",
    query: DELETE_GRANT_CATEGORY_QUERY,
    field: "deleteGrantCategory",
    success: &["DeleteGrantCategory"],
    object_type: "grantCategory",
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantCategories {
    #[serde(default)]
    grant_categories: Vec<GrantCategory>,
}

/// Read and write access to grant categories
#[derive(Debug, Clone)]
pub struct GrantCategoryClient {
    graphql: GraphqlClient,
}

impl GrantCategoryClient {
    pub fn new(graphql: GraphqlClient) -> Self {
        Self { graphql }
    }

    #[instrument(skip(self))]
    pub async fn get_grant_category(&self, id: &str) -> Result<GrantCategory> {
        fetch_one(&self.graphql, &GET_GRANT_CATEGORY, json!({ "id": id }), id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_grant_category(&self, input: &GrantCategoryInput) -> Result<GrantCategory> {
        let category: GrantCategory =
            fetch_one(&self.graphql, &CREATE_GRANT_CATEGORY, json!({ "input": input }), "").await?;

        info!(id = %category.id, "Created grant category");
        Ok(category)
    }

    #[instrument(skip(self, input))]
    pub async fn update_grant_category(
        &self,
        id: &str,
        input: &GrantCategoryInput,
    ) -> Result<GrantCategory> {
        fetch_one(&self.graphql, &UPDATE_GRANT_CATEGORY, json!({ "id": id, "input": input }), id)
            .await
    }

    /// Delete a grant category
    ///
    /// # Errors
    /// `RaitoError::Client` when the server reports `success: false`.
    #[instrument(skip(self))]
    pub async fn delete_grant_category(&self, id: &str) -> Result<()> {
        mutate_flag(&self.graphql, &DELETE_GRANT_CATEGORY, json!({ "id": id }), id).await?;

        info!(id, "Deleted grant category");
        Ok(())
    }

    /// All grant categories of the tenant
    #[instrument(skip(self))]
    pub async fn list_grant_categories(&self) -> Result<Vec<GrantCategory>> {
        let data =
            self.graphql.execute("ListGrantCategories", LIST_GRANT_CATEGORIES_QUERY, &json!({})).await?;
        let data: GrantCategories = serde_json::from_value(data).map_err(|e| {
            RaitoError::Client(format!("failed to decode grant categories: {e}"))
        })?;

        debug!(count = data.grant_categories.len(), "Loaded grant categories");
        Ok(data.grant_categories)
    }
}
