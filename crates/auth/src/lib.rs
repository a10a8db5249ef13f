//! `reportdesk-auth` — authentication/authorization boundary.
//!
//! Signs and checks tokens, hashes passwords and decides whether a `Caller`
//! holds a permission. Nothing here knows about HTTP or storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod token;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, TokenClaims, TokenValidationError};
pub use password::{validate_new_password, Argon2Hasher, HashingParams, PasswordError, PasswordHasher, PasswordPolicyViolation};
pub use permissions::{Permission, PermissionSet, UnknownPermission};
pub use principal::Caller;
pub use token::{bearer_token, TokenError, TokenIdentity, TokenService};
