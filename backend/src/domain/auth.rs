//! Signed-in member identity returned by the remote API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::content::Verify;
use super::forms::wire_enum;

wire_enum! {
    /// Access level of a signed-in member.
    pub enum MemberRole {
        Member => "member",
        Admin => "admin",
    }
}

impl Default for MemberRole {
    fn default() -> Self {
        Self::Member
    }
}

/// Identity established by a successful sign-in or sign-up.
///
/// Only what pages need is kept; upstream tokens are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedInMember {
    /// Upstream user id.
    #[serde(alias = "_id", alias = "userId", alias = "user_id")]
    pub id: String,
    /// Name shown in the page header.
    #[serde(alias = "name", alias = "display_name")]
    pub display_name: String,
    /// Access role.
    #[serde(default)]
    pub role: MemberRole,
}

impl SignedInMember {
    /// Whether the member may open the admin pages.
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

impl Verify for SignedInMember {
    fn verify(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id must not be empty".to_owned());
        }
        if self.display_name.trim().is_empty() {
            return Err("displayName must not be empty".to_owned());
        }
        Ok(())
    }
}
