//! Entity models exchanged with the Raito API
//!
//! Only the fields the client relies on are modelled; unknown fields in
//! responses are ignored.

use serde::{Deserialize, Serialize};

/// A user known to Raito Cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_raito_user: bool,
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
}

/// Input for creating or updating a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub user_type: Option<String>,
}

/// A group synced from an identity store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// A connected data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub source_type: Option<String>,
    #[serde(default)]
    pub sync_method: Option<String>,
}

/// Input for creating or updating a data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_method: Option<String>,
}

/// An identity store holding users and groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStore {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub store_type: Option<String>,
    #[serde(default)]
    pub master: bool,
    #[serde(default)]
    pub native: bool,
}

/// Input for creating or updating an identity store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStoreInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub store_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<bool>,
}

/// A Raito role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An access provider (grant, mask or filter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessProvider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, rename = "type")]
    pub provider_type: Option<String>,
}

/// Input for creating or updating an access provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessProviderInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub provider_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

/// A reference to another object, tagged by its `__typename`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRef {
    #[serde(rename = "__typename")]
    pub typename: String,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A data object (schema, table, column, ...) inside a data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// A role granted to a set of users, groups or access providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub id: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Object the role applies to; absent for global assignments
    #[serde(default)]
    pub on: Option<TypedRef>,
    #[serde(default)]
    pub to: Vec<TypedRef>,
}

/// One beneficiary of an access provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessWhoItem {
    #[serde(default)]
    pub item: Option<TypedRef>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
}

/// One data object covered by an access provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessWhatItem {
    #[serde(default)]
    pub data_object: Option<DataObject>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub global_permissions: Vec<String>,
}

/// One access provider covered by another access provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessWhatAccessProviderItem {
    #[serde(default)]
    pub access_provider: Option<AccessProvider>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// A category grouping access providers in the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub allow_duplicate_names: bool,
    #[serde(default)]
    pub multi_data_source: bool,
}

/// Input for creating or updating a grant category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantCategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_create: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_duplicate_names: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_data_source: Option<bool>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn user_ignores_typename_and_unknown_fields() {
        let user: User = serde_json::from_value(json!({
            "__typename": "User",
            "id": "u1",
            "name": "Alice",
            "email": "alice@example.com",
            "isRaitoUser": true,
            "type": "Human",
            "tags": []
        }))
        .unwrap();

        assert_eq!(user.id, "u1");
        assert!(user.is_raito_user);
        assert_eq!(user.user_type.as_deref(), Some("Human"));
    }

    #[test]
    fn inputs_skip_unset_fields() {
        let input = DataSourceInput { name: Some("snowflake".into()), ..Default::default() };
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"name": "snowflake"}));
    }

    #[test]
    fn role_assignment_keeps_target_typenames() {
        let assignment: RoleAssignment = serde_json::from_value(json!({
            "__typename": "RoleAssignment",
            "id": "ra1",
            "role": { "id": "r1", "name": "Owner" },
            "on": { "__typename": "DataSource", "id": "ds1" },
            "to": [{ "__typename": "User", "id": "u1", "name": "Alice" }]
        }))
        .unwrap();

        assert_eq!(assignment.role.unwrap().name, "Owner");
        assert_eq!(assignment.on.unwrap().typename, "DataSource");
        assert_eq!(assignment.to[0].name.as_deref(), Some("Alice"));
    }
}
