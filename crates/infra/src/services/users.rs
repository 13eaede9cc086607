//! User call site

use raito_domain::{RaitoError, Result, User, UserInput};
use serde_json::json;
use tracing::{info, instrument};

use super::{delete_one, fetch_one, Operation};
use crate::api::GraphqlClient;

macro_rules! user_operation {
    ($name:literal, $field:literal, $declarations:literal, $arguments:literal) => {
        Operation {
            name: $name,
            query: concat!(
                "\nmutation ",
                $name,
                "(",
                $declarations,
                ") {\n  ",
                $field,
                "(",
                $arguments,
                ") {\n    __typename\n    ... on User { id name email isRaitoUser type }\n    ... on InvalidEmailError { errEmail message }\n    ... on NotFoundError { message }\n    ... on PermissionDeniedError { message }\n  }\n}"
            ),
            field: $field,
            success: USER,
            object_type: "user",
        }
    };
}

const GET_USER_QUERY: &str = r"
query GetUser($id: ID!) {
  user(id: $id) {
    __typename
    ... on User { id name email isRaitoUser type }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const GET_USER_BY_EMAIL_QUERY: &str = r"
query GetUserByEmail($email: String!) {
  userByEmail(email: $email) {
    __typename
    ... on User { id name email isRaitoUser type }
    ... on InvalidEmailError { errEmail message }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const DELETE_USER_QUERY: &str = r"
mutation DeleteUser($id: ID!) {
  deleteUser(id: $id) {
    __typename
    ... on UserDelete { success }
    ... on PermissionDeniedError { message }
  }
}";

const USER: &[&str] = &["User"];

const GET_USER: Operation = Operation {
    name: "GetUser",
    query: GET_USER_QUERY,
    field: "user",
    success: USER,
    object_type: "user",
};

const GET_USER_BY_EMAIL: Operation = Operation {
    name: "GetUserByEmail",
    query: GET_USER_BY_EMAIL_QUERY,
    field: "userByEmail",
    success: USER,
    object_type: "user",
};

const CREATE_USER: Operation =
    user_operation!("CreateUser", "createUser", "$input: UserInput!", "input: $input");

const UPDATE_USER: Operation = user_operation!(
    "UpdateUser",
    "updateUser",
    "$id: ID!, $input: UserInput!",
    "id: $id, input: $input"
);

const DELETE_USER: Operation = Operation {
    name: "DeleteUser",
    query: DELETE_USER_QUERY,
    field: "deleteUser",
    success: &["UserDelete"],
    object_type: "user",
};

const INVITE_AS_RAITO_USER: Operation = user_operation!(
    "InviteAsRaitoUser",
    "inviteAsRaitoUser",
    "$id: ID!, $noPassword: Boolean",
    "id: $id, noPassword: $noPassword"
);

const REMOVE_AS_RAITO_USER: Operation =
    user_operation!("RemoveAsRaitoUser", "removeAsRaitoUser", "$id: ID!", "id: $id");

const SET_USER_PASSWORD: Operation = user_operation!(
    "SetUserPassword",
    "setPassword",
    "$id: ID!, $password: String!",
    "id: $id, password: $password"
);

/// Read and write access to users
#[derive(Debug, Clone)]
pub struct UserClient {
    graphql: GraphqlClient,
}

impl UserClient {
    pub fn new(graphql: GraphqlClient) -> Self {
        Self { graphql }
    }

    /// Get a user by id
    ///
    /// # Errors
    /// `RaitoError::NotFound` if no user has this id.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<User> {
        fetch_one(&self.graphql, &GET_USER, json!({ "id": id }), id).await
    }

    /// Get a user by email address
    ///
    /// # Errors
    /// `RaitoError::InvalidEmail` for a malformed address and
    /// `RaitoError::NotFound` when no user has it.
    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        fetch_one(&self.graphql, &GET_USER_BY_EMAIL, json!({ "email": email }), email).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: &UserInput) -> Result<User> {
        let user: User = fetch_one(&self.graphql, &CREATE_USER, json!({ "input": input }), "").await?;

        info!(id = %user.id, "Created user");
        Ok(user)
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: &str, input: &UserInput) -> Result<User> {
        if id.is_empty() {
            return Err(RaitoError::InvalidInput("user id must not be empty".into()));
        }

        fetch_one(&self.graphql, &UPDATE_USER, json!({ "id": id, "input": input }), id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        delete_one(&self.graphql, &DELETE_USER, id).await?;

        info!(id, "Deleted user");
        Ok(())
    }

    /// Give an existing user access to Raito Cloud
    ///
    /// With `no_password` the invitation skips the password setup step.
    #[instrument(skip(self))]
    pub async fn invite_as_raito_user(&self, id: &str, no_password: bool) -> Result<User> {
        let user: User = fetch_one(
            &self.graphql,
            &INVITE_AS_RAITO_USER,
            json!({ "id": id, "noPassword": no_password }),
            id,
        )
        .await?;

        info!(id, "Invited user");
        Ok(user)
    }

    /// Revoke a user's access to Raito Cloud; the user itself is kept
    #[instrument(skip(self))]
    pub async fn remove_as_raito_user(&self, id: &str) -> Result<User> {
        let user: User =
            fetch_one(&self.graphql, &REMOVE_AS_RAITO_USER, json!({ "id": id }), id).await?;

        info!(id, "Removed Raito access");
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn set_user_password(&self, id: &str, password: &str) -> Result<User> {
        fetch_one(&self.graphql, &SET_USER_PASSWORD, json!({ "id": id, "password": password }), id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use raito_core::AccessTokenProvider;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::AuthenticatingTransport;
    use crate::http::HttpClient;

    struct StaticToken;

    #[async_trait]
    impl AccessTokenProvider for StaticToken {
        async fn access_token(&self) -> Result<String> {
            Ok("token-1".to_string())
        }
    }

    fn users_for(server: &MockServer) -> UserClient {
        let transport =
            AuthenticatingTransport::new(HttpClient::new().unwrap(), Arc::new(StaticToken), "acme");
        UserClient::new(GraphqlClient::new(transport, &server.uri()))
    }

    #[tokio::test]
    async fn update_without_id_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = users_for(&server).update_user("", &UserInput::default()).await.unwrap_err();
        assert!(matches!(err, RaitoError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unsuccessful_delete_is_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "operationName": "DeleteUser" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "deleteUser": { "__typename": "UserDelete", "success": false } }
            })))
            .mount(&server)
            .await;

        let err = users_for(&server).delete_user("u1").await.unwrap_err();
        assert!(matches!(err, RaitoError::Client(ref msg) if msg.contains("user delete")));
    }

    #[tokio::test]
    async fn invalid_email_is_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "userByEmail": {
                    "__typename": "InvalidEmailError",
                    "errEmail": "not-an-email",
                    "message": "invalid email"
                } }
            })))
            .mount(&server)
            .await;

        let err = users_for(&server).get_user_by_email("not-an-email").await.unwrap_err();
        match err {
            RaitoError::InvalidEmail { email, .. } => assert_eq!(email, "not-an-email"),
            other => panic!("expected invalid email, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invite_sends_no_password_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "InviteAsRaitoUser",
                "variables": { "id": "u1", "noPassword": true }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "inviteAsRaitoUser": {
                    "__typename": "User", "id": "u1", "name": "Alice", "isRaitoUser": true
                } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = users_for(&server).invite_as_raito_user("u1", true).await.unwrap();
        assert!(user.is_raito_user);
    }

    #[tokio::test]
    async fn set_password_on_missing_user_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "operationName": "SetUserPassword" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "setPassword": { "__typename": "NotFoundError", "message": "no user" } }
            })))
            .mount(&server)
            .await;

        let err = users_for(&server).set_user_password("u9", "pw").await.unwrap_err();
        assert!(matches!(err, RaitoError::NotFound { ref id, .. } if id == "u9"));
    }
}
