//! Anti-forgery tokens and capability checks for admin requests

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Nonces are valid for two ticks of this many seconds (24 hours in total)
const NONCE_TICK_SECS: i64 = 12 * 60 * 60;

/// Number of hex characters kept from the digest
const NONCE_LENGTH: usize = 10;

/// Checks every admin handler performs before touching state
pub trait RequestGuard: Send + Sync {
    /// Whether `token` is a valid anti-forgery token for `action`
    fn verify_token(&self, action: &str, token: &str) -> bool;

    /// Whether the caller holds `capability`
    fn has_capability(&self, capability: &str) -> bool;
}

/// Issues and verifies time-bucketed nonces bound to an action and a user
#[derive(Debug, Clone)]
pub struct NonceSigner {
    secret: String,
}

impl NonceSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    fn tick(now: DateTime<Utc>) -> i64 {
        now.timestamp().div_euclid(NONCE_TICK_SECS) + 1
    }

    fn sign(&self, tick: i64, action: &str, user_id: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{tick}|{action}|{user_id}|{}", self.secret));
        let digest = hex::encode(hasher.finalize());
        digest[..NONCE_LENGTH].to_string()
    }

    pub fn create(&self, action: &str, user_id: u64) -> String {
        self.create_at(action, user_id, Utc::now())
    }

    pub fn create_at(&self, action: &str, user_id: u64, now: DateTime<Utc>) -> String {
        self.sign(Self::tick(now), action, user_id)
    }

    pub fn verify(&self, action: &str, user_id: u64, token: &str) -> bool {
        self.verify_at(action, user_id, token, Utc::now())
    }

    /// Accepts tokens issued in the current or the previous tick
    pub fn verify_at(&self, action: &str, user_id: u64, token: &str, now: DateTime<Utc>) -> bool {
        if token.is_empty() {
            return false;
        }
        let tick = Self::tick(now);
        [tick, tick - 1]
            .into_iter()
            .any(|t| self.sign(t, action, user_id) == token)
    }
}

/// The user behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: u64,
    pub capabilities: Vec<String>,
}

impl Caller {
    pub fn new(user_id: u64, capabilities: &[&str]) -> Self {
        Self {
            user_id,
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Guard for a logged-in caller using signed nonces
pub struct SessionGuard {
    signer: NonceSigner,
    caller: Caller,
}

impl SessionGuard {
    pub fn new(signer: NonceSigner, caller: Caller) -> Self {
        Self { signer, caller }
    }
}

impl RequestGuard for SessionGuard {
    fn verify_token(&self, action: &str, token: &str) -> bool {
        self.signer.verify(action, self.caller.user_id, token)
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.caller.capabilities.iter().any(|c| c == capability)
    }
}
