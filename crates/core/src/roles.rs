//! Role model and per-operation authorization predicates.
//!
//! Role ids must match the seed data in `20261001000001_create_roles_table.sql`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_CUSTOMER: &str = "customer";

/// Role id type matching SMALLINT in the database.
pub type RoleId = i16;

#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin = 1,
    Staff = 2,
    Customer = 3,
}

impl Role {
    pub fn id(self) -> RoleId {
        self as RoleId
    }

    pub fn from_id(id: RoleId) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Staff),
            3 => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Staff => ROLE_STAFF,
            Role::Customer => ROLE_CUSTOMER,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_STAFF => Some(Role::Staff),
            ROLE_CUSTOMER => Some(Role::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: Role,
    /// Restaurant a staff member works at. Ignored for other roles.
    pub restaurant_id: Option<DbId>,
}

impl Caller {
    /// Admins manage every restaurant; staff only the one they belong to.
    pub fn can_manage(&self, restaurant_id: DbId) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Staff => self.restaurant_id == Some(restaurant_id),
            Role::Customer => false,
        }
    }

    pub fn require_manage(&self, restaurant_id: DbId) -> Result<(), CoreError> {
        if self.can_manage(restaurant_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Not allowed to manage the waitlist of restaurant {restaurant_id}"
            )))
        }
    }

    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }
}
