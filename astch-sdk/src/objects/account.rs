//! Account and catalog types served by the internal backend.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated user, as returned by `GET /api/v1/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<CompactString>,
}

/// A purchasable symbolic item ("offrande").
///
/// Offerings only matter to the payment flow as cart line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    pub id: Uuid,
    pub name: String,
    /// Price in integral CFA francs.
    pub price: u64,
    #[serde(default)]
    pub description: Option<String>,
}
