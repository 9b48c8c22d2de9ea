//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireStaff`] -- Requires `staff` or `admin` role.
//! - [`rbac::RequireCustomer`] -- Requires the `customer` role.

pub mod auth;
pub mod rbac;
