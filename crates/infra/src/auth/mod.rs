//! Identity provider and tenant lookup adapters

pub mod cognito;
pub mod org_lookup;

pub use cognito::CognitoIdentityProvider;
pub use org_lookup::HttpOrgLookup;
