//! # Access Control
//!
//! Role-based gating for privileged operations. Each component owns one
//! [`AccessControl`] record. The admin implicitly holds every role and is the
//! only account that can grant or revoke roles.
//!
//! ## Roles
//!
//! - [`Role::Operator`]: privileged lifecycle actions (optimistic approval,
//!   rejection, opening consensus rounds, cancelling disputes).
//! - [`Role::Slasher`]: may reduce a participant's stake. Granted to the
//!   dispute game's account.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::identity::Address;

/// A privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Privileged lifecycle actions.
    Operator,
    /// Stake slashing.
    Slasher,
}

impl Role {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "OPERATOR",
            Self::Slasher => "SLASHER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin plus role membership for one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    admin: Address,
    roles: BTreeMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    /// Create an access-control record administered by `admin`.
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            roles: BTreeMap::new(),
        }
    }

    /// The current admin.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Whether `account` holds `role`. The admin holds every role.
    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        *account == self.admin
            || self
                .roles
                .get(&role)
                .is_some_and(|members| members.contains(account))
    }

    /// Fail unless `caller` holds `role`.
    pub fn require(&self, role: Role, caller: &Address) -> Result<(), AccessError> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(AccessError::MissingRole {
                caller: *caller,
                role,
            })
        }
    }

    /// Fail unless `caller` is the admin.
    pub fn require_admin(&self, caller: &Address) -> Result<(), AccessError> {
        if *caller == self.admin {
            Ok(())
        } else {
            Err(AccessError::NotAdmin { caller: *caller })
        }
    }

    /// Grant `role` to `account`. Returns `false` if it was already held.
    pub fn grant(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<bool, AccessError> {
        self.require_admin(caller)?;
        Ok(self.roles.entry(role).or_default().insert(account))
    }

    /// Revoke `role` from `account`. Returns `false` if it was not held.
    pub fn revoke(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<bool, AccessError> {
        self.require_admin(caller)?;
        Ok(self
            .roles
            .get_mut(&role)
            .is_some_and(|members| members.remove(account)))
    }

    /// Hand the admin seat to `new_admin`.
    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> Result<(), AccessError> {
        self.require_admin(caller)?;
        self.admin = new_admin;
        Ok(())
    }

    /// Members explicitly granted `role` (excludes the implicit admin).
    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.roles.get(&role).into_iter().flatten()
    }
}
