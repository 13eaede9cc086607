//! Role call site
//!
//! Role assignments are listed either globally or below the object they
//! apply to, in which case the paged result is nested in the parent union.

use raito_core::ListStream;
use raito_domain::{RaitoError, Result, Role, RoleAssignment};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{
    fetch_one, list_stream, mutate_flag, ListOptions, ListQuery, Operation, ParentObject,
};
use crate::api::GraphqlClient;

const GET_ROLE_QUERY: &str = r"
query GetRole($id: ID!) {
  role(id: $id) {
    __typename
    ... on Role { id name description }
    ... on NotFoundError { message }
    ... on PermissionDeniedError { message }
  }
}";

const LIST_ROLES_QUERY: &str = r"
query ListRoles($after: String, $limit: Int, $filter: RoleFilterInput, $order: [RoleOrderByInput!]) {
  roles(after: $after, limit: $limit, filter: $filter, order: $order) {
    __typename
    ... on PagedResult {
      pageInfo { hasNextPage startCursor endCursor }
      edges {
        cursor
        node { __typename ... on Role { id name description } }
      }
    }
    ... on PermissionDeniedError { message }
  }
}";

macro_rules! role_assignment_page {
    () => {
        r"
fragment RoleAssignmentPage on PagedResult {
  pageInfo { hasNextPage startCursor endCursor }
  edges {
    cursor
    node {
      __typename
      ... on RoleAssignment {
        id
        role { id name description }
        on {
          __typename
          ... on IdentityStore { id name }
          ... on DataSource { id name }
          ... on DataObject { id name }
          ... on AccessProvider { id name }
        }
        to {
          __typename
          ... on User { id name }
          ... on Group { id name }
          ... on AccessProvider { id name }
        }
      }
    }
  }
}"
    };
}

/// Query listing the role assignments nested below one parent object
macro_rules! role_assignments_on {
    ($name:literal, $field:literal, $parent:literal) => {
        concat!(
            "\nquery ",
            $name,
            "($id: ID!, $after: String, $limit: Int, $filter: RoleAssignmentFilterInput, $order: [RoleAssignmentOrderInput!]) {\n  ",
            $field,
            "(id: $id) {\n    __typename\n    ... on ",
            $parent,
            " {\n      roleAssignments(after: $after, limit: $limit, filter: $filter, order: $order) {\n        __typename\n        ...RoleAssignmentPage\n        ... on PermissionDeniedError { message }\n      }\n    }\n    ... on NotFoundError { message }\n    ... on PermissionDeniedError { message }\n  }\n}",
            role_assignment_page!()
        )
    };
}

/// Mutation answering with the role it changed
macro_rules! role_mutation {
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
                ") {\n    __typename\n    ... on Role { id name description }\n    ... on NotFoundError { message }\n    ... on PermissionDeniedError { message }\n  }\n}"
            ),
            field: $field,
            success: ROLE,
            object_type: "role",
        }
    };
}

const ROLE: &[&str] = &["Role"];

const GET_ROLE: Operation = Operation {
    name: "GetRole",
    query: GET_ROLE_QUERY,
    field: "role",
    success: ROLE,
    object_type: "role",
};

const LIST_ROLES: ListQuery = ListQuery {
    operation: "ListRoles",
    query: LIST_ROLES_QUERY,
    field: "roles",
    parent: None,
    node_typename: "Role",
};

const LIST_ROLE_ASSIGNMENTS: ListQuery = ListQuery {
    operation: "ListRoleAssignments",
    query: concat!(
        r"
query ListRoleAssignments($after: String, $limit: Int, $filter: RoleAssignmentFilterInput, $order: [RoleAssignmentOrderInput!]) {
  roleAssignments(after: $after, limit: $limit, filter: $filter, order: $order) {
    __typename
    ...RoleAssignmentPage
    ... on PermissionDeniedError { message }
  }
}",
        role_assignment_page!()
    ),
    field: "roleAssignments",
    parent: None,
    node_typename: "RoleAssignment",
};

const ON_IDENTITY_STORE: ListQuery = ListQuery {
    operation: "ListRoleAssignmentsOnIdentityStore",
    query: role_assignments_on!(
        "ListRoleAssignmentsOnIdentityStore",
        "identityStore",
        "IdentityStore"
    ),
    field: "identityStore",
    parent: Some(ParentObject {
        typenames: &["IdentityStore"],
        field: "roleAssignments",
        object_type: "identityStore",
    }),
    node_typename: "RoleAssignment",
};

const ON_DATA_OBJECT: ListQuery = ListQuery {
    operation: "ListRoleAssignmentsOnDataObject",
    query: role_assignments_on!("ListRoleAssignmentsOnDataObject", "dataObject", "DataObject"),
    field: "dataObject",
    parent: Some(ParentObject {
        typenames: &["DataObject"],
        field: "roleAssignments",
        object_type: "dataObject",
    }),
    node_typename: "RoleAssignment",
};

const ON_DATA_SOURCE: ListQuery = ListQuery {
    operation: "ListRoleAssignmentsOnDataSource",
    query: role_assignments_on!("ListRoleAssignmentsOnDataSource", "dataSource", "DataSource"),
    field: "dataSource",
    parent: Some(ParentObject {
        typenames: &["DataSource"],
        field: "roleAssignments",
        object_type: "dataSource",
    }),
    node_typename: "RoleAssignment",
};

const ON_ACCESS_PROVIDER: ListQuery = ListQuery {
    operation: "ListRoleAssignmentsOnAccessProvider",
    query: role_assignments_on!(
        "ListRoleAssignmentsOnAccessProvider",
        "accessProvider",
        "AccessProvider"
    ),
    field: "accessProvider",
    parent: Some(ParentObject {
        typenames: &["AccessProvider"],
        field: "roleAssignments",
        object_type: "accessProvider",
    }),
    node_typename: "RoleAssignment",
};

const ON_USER: ListQuery = ListQuery {
    operation: "ListRoleAssignmentsOnUser",
    query: role_assignments_on!("ListRoleAssignmentsOnUser", "user", "User"),
    field: "user",
    parent: Some(ParentObject { typenames: &["User"], field: "roleAssignments", object_type: "user" }),
    node_typename: "RoleAssignment",
};

const ASSIGN_GLOBAL: Operation = role_mutation!(
    "AssignGlobalRole",
    "assignGlobalRole",
    "$role: ID!, $to: [ID!]!",
    "role: $role, to: $to"
);
const ASSIGN_ON_IDENTITY_STORE: Operation = role_mutation!(
    "AssignRoleOnIdentityStore",
    "assignRoleOnIdentityStore",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, to: $to"
);
const ASSIGN_ON_DATA_OBJECT: Operation = role_mutation!(
    "AssignRoleOnDataObject",
    "assignRoleOnDataObject",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, to: $to"
);
const ASSIGN_ON_DATA_SOURCE: Operation = role_mutation!(
    "AssignRoleOnDataSource",
    "assignRoleOnDataSource",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, to: $to"
);
const ASSIGN_ON_ACCESS_PROVIDER: Operation = role_mutation!(
    "AssignRoleOnAccessProvider",
    "assignRoleOnAccessProvider",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, to: $to"
);

const UNASSIGN_GLOBAL: Operation = role_mutation!(
    "UnassignGlobalRole",
    "unassignGlobalRole",
    "$role: ID!, $to: [ID!]!",
    "role: $role, from: $to"
);
const UNASSIGN_FROM_IDENTITY_STORE: Operation = role_mutation!(
    "UnassignRoleFromIdentityStore",
    "unassignRoleFromIdentityStore",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, from: $to"
);
const UNASSIGN_FROM_DATA_OBJECT: Operation = role_mutation!(
    "UnassignRoleFromDataObject",
    "unassignRoleFromDataObject",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, from: $to"
);
const UNASSIGN_FROM_DATA_SOURCE: Operation = role_mutation!(
    "UnassignRoleFromDataSource",
    "unassignRoleFromDataSource",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, from: $to"
);
const UNASSIGN_FROM_ACCESS_PROVIDER: Operation = role_mutation!(
    "UnassignRoleFromAccessProvider",
    "unassignRoleFromAccessProvider",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, from: $to"
);

const UPDATE_ON_IDENTITY_STORE: Operation = role_mutation!(
    "UpdateRoleAssigneesOnIdentityStore",
    "updateRoleAssigneesOnIdentityStore",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, assignees: $to"
);
const UPDATE_ON_DATA_OBJECT: Operation = role_mutation!(
    "UpdateRoleAssigneesOnDataObject",
    "updateRoleAssigneesOnDataObject",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, assignees: $to"
);
const UPDATE_ON_DATA_SOURCE: Operation = role_mutation!(
    "UpdateRoleAssigneesOnDataSource",
    "updateRoleAssigneesOnDataSource",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, assignees: $to"
);
const UPDATE_ON_ACCESS_PROVIDER: Operation = role_mutation!(
    "UpdateRoleAssigneesOnAccessProvider",
    "updateRoleAssigneesOnAccessProvider",
    "$role: ID!, $on: ID!, $to: [ID!]!",
    "role: $role, on: $on, assignees: $to"
);

const SET_GLOBAL_ROLES_FOR_USER: Operation = Operation {
    name: "SetGlobalRolesForUser",
    query: r"
mutation SetGlobalRolesForUser($role: ID!, $to: [ID!]!) {
  setGlobalRolesForUser(role: $role, users: $to) {
    __typename
    ... on SetGlobalRolesForUser { success }
    ... on PermissionDeniedError { message }
  }
}",
    field: "setGlobalRolesForUser",
    success: &["SetGlobalRolesForUser"],
    object_type: "role",
};

/// Which role assignments to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAssignmentScope<'a> {
    /// Every assignment in the tenant
    All,
    IdentityStore(&'a str),
    DataObject(&'a str),
    DataSource(&'a str),
    AccessProvider(&'a str),
    /// Assignments granted to one user
    User(&'a str),
}

impl<'a> RoleAssignmentScope<'a> {
    fn list_query(self) -> (ListQuery, Option<&'a str>) {
        match self {
            Self::All => (LIST_ROLE_ASSIGNMENTS, None),
            Self::IdentityStore(id) => (ON_IDENTITY_STORE, Some(id)),
            Self::DataObject(id) => (ON_DATA_OBJECT, Some(id)),
            Self::DataSource(id) => (ON_DATA_SOURCE, Some(id)),
            Self::AccessProvider(id) => (ON_ACCESS_PROVIDER, Some(id)),
            Self::User(id) => (ON_USER, Some(id)),
        }
    }
}

/// Object a role is assigned on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTarget<'a> {
    /// Tenant-wide role, assignable to users only
    Global,
    IdentityStore(&'a str),
    DataObject(&'a str),
    DataSource(&'a str),
    AccessProvider(&'a str),
}

impl<'a> RoleTarget<'a> {
    fn object_id(self) -> Option<&'a str> {
        match self {
            Self::Global => None,
            Self::IdentityStore(id)
            | Self::DataObject(id)
            | Self::DataSource(id)
            | Self::AccessProvider(id) => Some(id),
        }
    }

    fn assign(self) -> Operation {
        match self {
            Self::Global => ASSIGN_GLOBAL,
            Self::IdentityStore(_) => ASSIGN_ON_IDENTITY_STORE,
            Self::DataObject(_) => ASSIGN_ON_DATA_OBJECT,
            Self::DataSource(_) => ASSIGN_ON_DATA_SOURCE,
            Self::AccessProvider(_) => ASSIGN_ON_ACCESS_PROVIDER,
        }
    }

    fn unassign(self) -> Operation {
        match self {
            Self::Global => UNASSIGN_GLOBAL,
            Self::IdentityStore(_) => UNASSIGN_FROM_IDENTITY_STORE,
            Self::DataObject(_) => UNASSIGN_FROM_DATA_OBJECT,
            Self::DataSource(_) => UNASSIGN_FROM_DATA_SOURCE,
            Self::AccessProvider(_) => UNASSIGN_FROM_ACCESS_PROVIDER,
        }
    }

    fn update(self) -> Option<Operation> {
        match self {
            Self::Global => None,
            Self::IdentityStore(_) => Some(UPDATE_ON_IDENTITY_STORE),
            Self::DataObject(_) => Some(UPDATE_ON_DATA_OBJECT),
            Self::DataSource(_) => Some(UPDATE_ON_DATA_SOURCE),
            Self::AccessProvider(_) => Some(UPDATE_ON_ACCESS_PROVIDER),
        }
    }
}

/// Read access to roles and management of their assignments
#[derive(Debug, Clone)]
pub struct RoleClient {
    graphql: GraphqlClient,
    page_size: usize,
}

impl RoleClient {
    pub fn new(graphql: GraphqlClient, page_size: usize) -> Self {
        Self { graphql, page_size }
    }

    /// Get a role by id
    ///
    /// # Errors
    /// `RaitoError::NotFound` if no role has this id, plus transport and
    /// authentication failures.
    #[instrument(skip(self))]
    pub async fn get_role(&self, id: &str) -> Result<Role> {
        fetch_one(&self.graphql, &GET_ROLE, json!({ "id": id }), id).await
    }

    /// Stream all roles matching `options`
    pub fn list_roles(&self, cancel: &CancellationToken, options: ListOptions) -> ListStream<Role> {
        list_stream(&self.graphql, cancel, LIST_ROLES, json!({}), self.page_size, options)
    }

    /// Stream the role assignments in `scope`
    ///
    /// For a scoped listing, a missing parent object ends the stream with
    /// `RaitoError::NotFound`.
    pub fn list_role_assignments(
        &self,
        cancel: &CancellationToken,
        scope: RoleAssignmentScope<'_>,
        options: ListOptions,
    ) -> ListStream<RoleAssignment> {
        let (list, parent_id) = scope.list_query();
        let arguments = match parent_id {
            Some(id) => json!({ "id": id }),
            None => json!({}),
        };
        list_stream(&self.graphql, cancel, list, arguments, self.page_size, options)
    }

    /// Assign `role_id` on `target` to the given users, groups or access
    /// providers
    #[instrument(skip(self))]
    pub async fn assign_role(
        &self,
        role_id: &str,
        target: RoleTarget<'_>,
        to: &[&str],
    ) -> Result<Role> {
        let role = self.change_role(target.assign(), role_id, target, to).await?;
        info!(role = %role.id, "Assigned role");
        Ok(role)
    }

    /// Remove `role_id` on `target` from the given assignees
    #[instrument(skip(self))]
    pub async fn unassign_role(
        &self,
        role_id: &str,
        target: RoleTarget<'_>,
        from: &[&str],
    ) -> Result<Role> {
        let role = self.change_role(target.unassign(), role_id, target, from).await?;
        info!(role = %role.id, "Unassigned role");
        Ok(role)
    }

    /// Replace the assignees of `role_id` on `target`
    ///
    /// # Errors
    /// `RaitoError::InvalidInput` for [`RoleTarget::Global`]; global roles
    /// are replaced through [`RoleClient::set_global_role_for_users`].
    #[instrument(skip(self))]
    pub async fn update_role_assignees(
        &self,
        role_id: &str,
        target: RoleTarget<'_>,
        assignees: &[&str],
    ) -> Result<Role> {
        let operation = target.update().ok_or_else(|| {
            RaitoError::InvalidInput("global role assignees are set per user".into())
        })?;
        self.change_role(operation, role_id, target, assignees).await
    }

    /// Make `role_id` the global role of exactly `users`, replacing existing
    /// global assignments
    #[instrument(skip(self))]
    pub async fn set_global_role_for_users(&self, role_id: &str, users: &[&str]) -> Result<()> {
        mutate_flag(
            &self.graphql,
            &SET_GLOBAL_ROLES_FOR_USER,
            json!({ "role": role_id, "to": users }),
            role_id,
        )
        .await
    }

    async fn change_role(
        &self,
        operation: Operation,
        role_id: &str,
        target: RoleTarget<'_>,
        assignees: &[&str],
    ) -> Result<Role> {
        let variables = match target.object_id() {
            Some(on) => json!({ "role": role_id, "on": on, "to": assignees }),
            None => json!({ "role": role_id, "to": assignees }),
        };
        fetch_one(&self.graphql, &operation, variables, role_id).await
    }
}
