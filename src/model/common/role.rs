use std::fmt::{self, Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// The flat set of user roles. There is no structural hierarchy; each
/// operation checks the exact capabilities it needs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Voter,
    Admin,
    Superadmin,
}

impl Role {
    /// Admin and superadmin are equivalent for election mutation and
    /// audit reads.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }

    /// May a caller with this role hand out the given role?
    /// Only a superadmin may mint another superadmin.
    pub fn may_assign(self, target: Role) -> bool {
        match target {
            Role::Superadmin => self == Self::Superadmin,
            Role::Voter | Role::Admin => self.is_admin(),
        }
    }

    /// May a caller with this role modify a user currently holding the
    /// given role? Existing superadmins are off-limits to plain admins.
    pub fn may_modify(self, current: Role) -> bool {
        current != Self::Superadmin || self == Self::Superadmin
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Voter => "voter",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        })
    }
}

impl From<Role> for Bson {
    fn from(role: Role) -> Self {
        to_bson(&role).unwrap() // Infallible.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_cannot_mint_superadmin() {
        assert!(!Role::Admin.may_assign(Role::Superadmin));
        assert!(Role::Superadmin.may_assign(Role::Superadmin));
    }

    #[test]
    fn admin_may_assign_lower_roles() {
        assert!(Role::Admin.may_assign(Role::Voter));
        assert!(Role::Admin.may_assign(Role::Admin));
        assert!(!Role::Voter.may_assign(Role::Voter));
    }

    #[test]
    fn only_superadmin_touches_superadmins() {
        assert!(!Role::Admin.may_modify(Role::Superadmin));
        assert!(Role::Superadmin.may_modify(Role::Superadmin));
        assert!(Role::Admin.may_modify(Role::Voter));
        assert!(Role::Admin.may_modify(Role::Admin));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(Bson::from(Role::Superadmin), Bson::String("superadmin".into()));
    }
}
