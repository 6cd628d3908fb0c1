use dashmap::DashMap;

/// A user as resolved from the host's user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub discriminator: String,
}

/// Read-only view of the host's user store. The engine never owns user
/// entities; it looks them up on demand by id.
pub trait UserDirectory: Send + Sync {
    /// Resolve a user by id. None when the directory has no record,
    /// which callers treat per-site: a removal event for an unknown user
    /// is dropped, a group-name derivation aborts the render.
    fn user(&self, id: &str) -> Option<UserRecord>;

    /// Id of the locally logged-in user.
    fn current_user_id(&self) -> String;
}

/// In-memory directory. Hosts typically implement [`UserDirectory`] over
/// their own user store; this one backs the test suite and small embeddings.
pub struct InMemoryDirectory {
    users: DashMap<String, UserRecord>,
    current_user_id: String,
}

impl InMemoryDirectory {
    pub fn new(current_user_id: impl Into<String>) -> Self {
        Self {
            users: DashMap::new(),
            current_user_id: current_user_id.into(),
        }
    }

    pub fn insert(&self, user: UserRecord) {
        self.users.insert(user.id.clone(), user);
    }
}

impl UserDirectory for InMemoryDirectory {
    fn user(&self, id: &str) -> Option<UserRecord> {
        self.users.get(id).map(|u| u.value().clone())
    }

    fn current_user_id(&self) -> String {
        self.current_user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_after_insert() {
        let directory = InMemoryDirectory::new("me");
        directory.insert(UserRecord {
            id: "u1".to_string(),
            username: "Ann".to_string(),
            discriminator: "0001".to_string(),
        });
        let user = directory.user("u1").unwrap();
        assert_eq!(user.username, "Ann");
        assert!(directory.user("u2").is_none());
        assert_eq!(directory.current_user_id(), "me");
    }
}
