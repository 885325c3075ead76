//! Guild settings model.

use serde::Serialize;

use super::{Entity, read_bool, read_string};
use crate::store::{Domain, FieldMap};

pub const VERIFIED_ROLE_NAME: &str = "verifiedRoleName";
pub const VERIFIED_ROLE_ENABLED: &str = "verifiedRoleEnabled";
pub const UNVERIFIED_ROLE_NAME: &str = "unverifiedRoleName";
pub const UNVERIFIED_ROLE_ENABLED: &str = "unverifiedRoleEnabled";
pub const NICKNAME_TEMPLATE: &str = "nicknameTemplate";
pub const VERIFIED_ROLE: &str = "verifiedRole";
pub const UNVERIFIED_ROLE: &str = "unverifiedRole";
pub const PREMIUM: &str = "premium";

/// Per-guild verification settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuildData {
    /// Platform guild ID
    pub id: String,

    /// Name of the role given to verified members
    pub verified_role_name: String,
    pub verified_role_enabled: bool,

    /// Name of the role given to unverified members
    pub unverified_role_name: String,
    pub unverified_role_enabled: bool,

    /// Template applied to member nicknames
    pub nickname_template: String,

    /// Role IDs, once the roles exist in the guild
    pub verified_role: Option<String>,
    pub unverified_role: Option<String>,

    pub premium: bool,
}

impl Default for GuildData {
    fn default() -> Self {
        Self {
            id: String::new(),
            verified_role_name: "Verified".to_string(),
            verified_role_enabled: true,
            unverified_role_name: "Unverified".to_string(),
            unverified_role_enabled: true,
            nickname_template: "{smart-name}".to_string(),
            verified_role: None,
            unverified_role: None,
            premium: false,
        }
    }
}

impl Entity for GuildData {
    const DOMAIN: Domain = Domain::GUILDS;
    const FIELDS: &'static [&'static str] = &[
        VERIFIED_ROLE_NAME,
        VERIFIED_ROLE_ENABLED,
        UNVERIFIED_ROLE_NAME,
        UNVERIFIED_ROLE_ENABLED,
        NICKNAME_TEMPLATE,
        VERIFIED_ROLE,
        UNVERIFIED_ROLE,
        PREMIUM,
    ];

    fn from_fields(id: &str, fields: &FieldMap) -> Self {
        let defaults = Self::default();

        Self {
            id: id.to_string(),
            verified_role_name: read_string(fields, VERIFIED_ROLE_NAME)
                .unwrap_or(defaults.verified_role_name),
            verified_role_enabled: read_bool(fields, VERIFIED_ROLE_ENABLED)
                .unwrap_or(defaults.verified_role_enabled),
            unverified_role_name: read_string(fields, UNVERIFIED_ROLE_NAME)
                .unwrap_or(defaults.unverified_role_name),
            unverified_role_enabled: read_bool(fields, UNVERIFIED_ROLE_ENABLED)
                .unwrap_or(defaults.unverified_role_enabled),
            nickname_template: read_string(fields, NICKNAME_TEMPLATE)
                .unwrap_or(defaults.nickname_template),
            verified_role: read_string(fields, VERIFIED_ROLE),
            unverified_role: read_string(fields, UNVERIFIED_ROLE),
            premium: read_bool(fields, PREMIUM).unwrap_or(defaults.premium),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;

    #[test]
    fn test_defaults_from_empty_map() {
        let guild = GuildData::from_fields("99", &FieldMap::new());

        assert_eq!(guild.id, "99");
        assert_eq!(guild.verified_role_name, "Verified");
        assert!(guild.unverified_role_enabled);
        assert_eq!(guild.nickname_template, "{smart-name}");
    }

    #[test]
    fn test_known_fields_applied_unknown_ignored() {
        let mut fields = FieldMap::new();
        fields.insert(VERIFIED_ROLE_NAME.to_string(), FieldValue::from("Linked"));
        fields.insert(UNVERIFIED_ROLE_ENABLED.to_string(), FieldValue::from("false"));
        fields.insert(VERIFIED_ROLE.to_string(), FieldValue::Int(555));
        fields.insert("newSetting".to_string(), FieldValue::from("x"));

        let guild = GuildData::from_fields("1", &fields);
        assert_eq!(guild.verified_role_name, "Linked");
        assert!(!guild.unverified_role_enabled);
        assert_eq!(guild.verified_role.as_deref(), Some("555"));
    }

    #[test]
    fn test_every_known_field_is_read() {
        let defaults = GuildData::from_fields("1", &FieldMap::new());

        for field in GuildData::FIELDS {
            // Flip bools, replace strings.
            let value = match field {
                &VERIFIED_ROLE_ENABLED | &UNVERIFIED_ROLE_ENABLED => FieldValue::Bool(false),
                &PREMIUM => FieldValue::Bool(true),
                _ => FieldValue::from("custom"),
            };
            let mut fields = FieldMap::new();
            fields.insert(field.to_string(), value);

            assert_ne!(GuildData::from_fields("1", &fields), defaults, "{field} ignored");
        }
    }
}
