//! User data model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Entity, read_bool, read_i64, read_string};
use crate::store::{Domain, FieldMap};

pub const ROBLOX_ID: &str = "robloxID";
pub const PRIMARY_GUILD: &str = "primaryGuild";
pub const VERIFIED_AT: &str = "verifiedAt";
pub const PREMIUM: &str = "premium";

/// A chat-platform user and their linked account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserData {
    /// Platform user ID. Always the id that was requested.
    pub id: String,
    /// Linked Roblox account, if verified.
    pub roblox_id: Option<String>,
    /// Guild the user verified through.
    pub primary_guild: Option<String>,
    /// Unix timestamp of verification.
    pub verified_at: Option<i64>,
    pub premium: bool,
}

impl UserData {
    pub fn is_verified(&self) -> bool {
        self.roblox_id.is_some()
    }

    pub fn verified_time(&self) -> Option<DateTime<Utc>> {
        self.verified_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl Entity for UserData {
    const DOMAIN: Domain = Domain::USERS;
    const FIELDS: &'static [&'static str] = &[ROBLOX_ID, PRIMARY_GUILD, VERIFIED_AT, PREMIUM];

    fn from_fields(id: &str, fields: &FieldMap) -> Self {
        Self {
            id: id.to_string(),
            roblox_id: read_string(fields, ROBLOX_ID),
            primary_guild: read_string(fields, PRIMARY_GUILD),
            verified_at: read_i64(fields, VERIFIED_AT),
            premium: read_bool(fields, PREMIUM).unwrap_or(false),
        }
    }
}
