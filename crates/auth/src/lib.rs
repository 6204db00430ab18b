//! `notekeeper-auth`: credential storage, session tokens and the auth service.
//!
//! Independent of HTTP and storage: persistence is reached only through the
//! [`UserStore`] port.

pub mod claims;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::{CredentialHasher, HasherParams, PasswordError};
pub use service::{AuthError, AuthService, SessionVerifier};
pub use store::{NewUser, UserStore, UserStoreError};
pub use token::{TokenError, TokenIssuer};
