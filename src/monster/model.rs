//! Monster record and role set.

use serde::{Deserialize, Serialize};

/// A single monster record. Identity inside the store is its position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub description: String,
    pub favorite: bool,
    /// One of the known role slugs, or empty when unset. Unknown values
    /// survive import untouched but never count toward a role.
    pub role: String,
}

impl Monster {
    pub fn new(name: &str, description: &str, favorite: bool, role: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            favorite,
            role: role.to_string(),
        }
    }

    /// The record's role if it is one of the known set.
    pub fn role_kind(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Known monster categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Soldier,
    Medic,
    Shield,
    Thief,
    Mage,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Soldier, Role::Medic, Role::Shield, Role::Thief, Role::Mage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Soldier => "soldier",
            Role::Medic => "medic",
            Role::Shield => "shield",
            Role::Thief => "thief",
            Role::Mage => "mage",
        }
    }

    /// Exact slug match; role values are compared case-sensitively everywhere.
    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Soldier => "Soldier",
            Role::Medic => "Medic",
            Role::Shield => "Shield",
            Role::Thief => "Thief",
            Role::Mage => "Mage",
        }
    }
}

/// The two records a fresh store starts with.
pub fn default_monsters() -> Vec<Monster> {
    vec![
        Monster::new("Vampire", "He just wants your blood.", true, "soldier"),
        Monster::new("Swamp Creature", "He awaits you in the swamp.", false, "medic"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_exact() {
        assert_eq!(Role::parse("mage"), Some(Role::Mage));
        assert_eq!(Role::parse("Mage"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_kind_ignores_unknown() {
        let m = Monster::new("Imp", "Small.", false, "jester");
        assert_eq!(m.role_kind(), None);
        assert_eq!(default_monsters()[0].role_kind(), Some(Role::Soldier));
    }

    #[test]
    fn serializes_with_all_fields() {
        let json = serde_json::to_string(&default_monsters()[1]).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Swamp Creature","description":"He awaits you in the swamp.","favorite":false,"role":"medic"}"#
        );
    }
}
