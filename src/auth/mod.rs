//! Authentication: tokens, credentials, passwords and the principal they
//! resolve to.

pub mod credential;
pub mod error;
pub mod jwt;
pub mod password;
pub mod principal;

pub use credential::{Credential, CredentialSource, CookieNames, AUTH_COOKIE_NAME};
pub use error::AuthError;
pub use jwt::{Claims, TokenService};
pub use password::PasswordHasher;
pub use principal::{Principal, Role};
