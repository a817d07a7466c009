//! Session context and transient purchase bookkeeping.
//!
//! The ambient auth context of the original UI becomes an explicit object
//! here: created at login, passed to whatever flow needs the current user,
//! dropped at logout. The purchase ledger replaces browser storage for
//! in-flight purchase tokens; it is process-local and intentionally not
//! persisted.

use std::collections::HashMap;
use std::sync::Arc;

use astch_sdk::objects::account::UserProfile;
use compact_str::CompactString;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One in-flight purchase, keyed by its gateway token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPurchase {
    pub token: CompactString,
    /// Amount in integral CFA francs.
    pub amount: u64,
    /// What was bought (consultation choice title, book title, ...).
    pub item: String,
    pub started_at: time::OffsetDateTime,
}

/// Shared, transient record of purchases awaiting verification.
#[derive(Debug, Clone, Default)]
pub struct PurchaseLedger {
    inner: Arc<RwLock<HashMap<CompactString, PendingPurchase>>>,
}

impl PurchaseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a purchase right after initiation succeeds.
    pub async fn record(&self, purchase: PendingPurchase) {
        let mut purchases = self.inner.write().await;
        purchases.insert(purchase.token.clone(), purchase);
    }

    /// Look up a purchase without consuming it.
    pub async fn get(&self, token: &str) -> Option<PendingPurchase> {
        self.inner.read().await.get(token).cloned()
    }

    /// Remove and return a purchase once it settled.
    pub async fn take(&self, token: &str) -> Option<PendingPurchase> {
        self.inner.write().await.remove(token)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// The authenticated session a flow runs under.
#[derive(Debug, Clone)]
pub struct SessionContext {
    user: UserProfile,
    started_at: time::OffsetDateTime,
    purchases: PurchaseLedger,
}

impl SessionContext {
    /// Open a session for a freshly authenticated user.
    pub fn new(user: UserProfile) -> Self {
        Self {
            user,
            started_at: time::OffsetDateTime::now_utc(),
            purchases: PurchaseLedger::new(),
        }
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn started_at(&self) -> time::OffsetDateTime {
        self.started_at
    }

    /// The session's purchase ledger (cheap to clone, shared).
    pub fn purchases(&self) -> PurchaseLedger {
        self.purchases.clone()
    }
}
