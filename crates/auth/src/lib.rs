//! `szuru-auth` — trust primitives of the authorization domain.
//!
//! Two independent pieces live here: the closed [`PrivilegeRegistry`] with its
//! naming and configuration checks, and the single-use [`CredentialToken`].
//! Neither performs I/O on the request path.

pub mod config;
pub mod naming;
pub mod privilege;
pub mod registry;
pub mod token;
pub mod user;

pub use config::{Config, ConfigError, SecurityConfig};
pub use naming::{upper_snake_case, validate_naming, NamingError};
pub use privilege::{Privilege, UnknownPrivilege};
pub use registry::{PrivilegeRegistry, ReconciliationError, ReconciliationMode, RegistryError};
pub use token::{CredentialToken, TokenPurpose, TokenRejection, TokenState};
pub use user::{InMemoryUserDirectory, User, UserDirectory};
