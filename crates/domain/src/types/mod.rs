//! Domain types and models

pub mod credentials;
pub mod entities;
pub mod page;
pub mod variant;

pub use credentials::{AuthOutcome, AuthenticationResult, CredentialRecord};
pub use entities::{
    AccessProvider, AccessProviderInput, AccessWhatAccessProviderItem, AccessWhatItem,
    AccessWhoItem, DataObject, DataSource, DataSourceInput, GrantCategory, GrantCategoryInput,
    Group, IdentityStore, IdentityStoreInput, Role, RoleAssignment, TypedRef, User, UserInput,
};
pub use page::{Edge, EdgeOutcome, ListItem, Page, PageInfo};
pub use variant::{typename_of, ResultVariant};
