//! User lookup collaborator.
//!
//! Tokens hold a [`UserId`], never a `User`. Resolving the id goes through a
//! [`UserDirectory`], which is backed by whatever store owns user records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use szuru_core::{Entity, UserId};

/// Read model of a user account, as far as this crate needs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// "Find user by identifier" lookup.
pub trait UserDirectory {
    /// Returns `None` when no user has this id (e.g. the account was deleted).
    fn find_user_by_id(&self, id: UserId) -> Option<User>;
}

/// In-memory [`UserDirectory`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<UserId, User>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user, returning the previous record.
    pub fn insert(&mut self, user: User) -> Option<User> {
        self.users.insert(user.id, user)
    }

    pub fn remove(&mut self, id: UserId) -> Option<User> {
        self.users.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_user_by_id(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }
}
