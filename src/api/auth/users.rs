//! User lookup seam for digest verification.

/// A user the gate can authenticate.
///
/// `secret` is the cleartext-equivalent value HA1 is built from. Digest's
/// `MD5(username:realm:secret)` construction cannot be fed a one-way
/// password hash, so unlike cookie/basic auth stores this one must hold the
/// raw secret. That is a structural limitation of Digest Auth itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: u32,
    pub username: String,
    pub secret: String,
}

/// External identity store the gate consults by username.
pub trait UserLookup: Send + Sync {
    fn find(&self, username: &str) -> Option<UserRecord>;
}

/// In-memory table backing the demo deployment.
#[derive(Debug, Clone, Default)]
pub struct StaticUserStore {
    users: Vec<UserRecord>,
}

impl StaticUserStore {
    #[must_use]
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    /// The single-entry table the reference deployment ships with.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(vec![UserRecord {
            user_id: 1,
            username: "admin".to_string(),
            secret: "secret".to_string(),
        }])
    }
}

impl UserLookup for StaticUserStore {
    fn find(&self, username: &str) -> Option<UserRecord> {
        self.users
            .iter()
            .find(|user| user.username == username)
            .cloned()
    }
}
