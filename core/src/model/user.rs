use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity issued by the external identity provider. Only the opaque id is
/// kept, as the owner key on tasks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visibility context handed to the persistence layer with every call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Unscoped,
    User(UserId),
}

impl Scope {
    pub fn from_caller(caller: Option<UserId>) -> Self {
        match caller {
            Some(user) => Scope::User(user),
            None => Scope::Unscoped,
        }
    }

    pub fn user(&self) -> Option<&UserId> {
        match self {
            Scope::User(user) => Some(user),
            Scope::Unscoped => None,
        }
    }

    pub fn allows(&self, owner: &UserId) -> bool {
        match self {
            Scope::Unscoped => true,
            Scope::User(user) => user == owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_allows() {
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        assert!(Scope::Unscoped.allows(&alice));
        assert!(Scope::User(alice.clone()).allows(&alice));
        assert!(!Scope::User(alice).allows(&bob));
    }
}
