//! # Directory
//!
//! The snapshot of users and channels delivered by the handshake.
//!
//! A [`Directory`] is loaded once when a connection starts and is never
//! mutated afterwards. Its only job is translating human-readable names
//! (`general`, `#general`, `neil`, `@neil`) into the stable ids that appear
//! in events on the wire.
//!
//! # Id Convention
//!
//! Stable ids are recognised by their leading characters, described by an
//! [`IdConvention`]. Input that already looks like an id is returned as is,
//! without a lookup.

use serde::{Deserialize, Serialize};

/// Leading marker of a channel name.
pub const CHANNEL_SIGIL: char = '#';

/// Leading marker of a user name.
pub const USER_SIGIL: char = '@';

/// A named, identified user or channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl Entity {
    /// Create a new entity.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Which leading characters mark a string as a stable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConvention {
    /// Prefixes of channel ids (public and private channels).
    pub channel_prefixes: Vec<String>,
    /// Prefixes of user ids.
    pub user_prefixes: Vec<String>,
}

impl Default for IdConvention {
    fn default() -> Self {
        Self {
            channel_prefixes: vec!["C".to_string(), "G".to_string()],
            user_prefixes: vec!["U".to_string(), "W".to_string()],
        }
    }
}

impl IdConvention {
    /// Whether `candidate` looks like a channel id.
    pub fn is_channel_id(&self, candidate: &str) -> bool {
        has_prefix(&self.channel_prefixes, candidate)
    }

    /// Whether `candidate` looks like a user id.
    pub fn is_user_id(&self, candidate: &str) -> bool {
        has_prefix(&self.user_prefixes, candidate)
    }
}

fn has_prefix(prefixes: &[String], candidate: &str) -> bool {
    prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && candidate.starts_with(prefix.as_str()))
}

/// Read-only lookup of users and channels by name.
///
/// # Example
///
/// ```rust
/// use hark_core::{Directory, Entity};
///
/// let directory = Directory::new(
///     vec![Entity::new("U042", "neil")],
///     vec![Entity::new("C001", "general")],
/// );
///
/// assert_eq!(directory.resolve_user("@neil"), Some("U042"));
/// assert_eq!(directory.resolve_channel("#general"), Some("C001"));
/// assert_eq!(directory.resolve_channel("C999"), Some("C999"));
/// assert_eq!(directory.resolve_channel("random"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: Vec<Entity>,
    channels: Vec<Entity>,
    me: Option<Entity>,
    ids: IdConvention,
}

impl Directory {
    /// Create a directory with the default id convention.
    pub fn new(users: Vec<Entity>, channels: Vec<Entity>) -> Self {
        Self {
            users,
            channels,
            me: None,
            ids: IdConvention::default(),
        }
    }

    /// Replace the id convention.
    pub fn with_convention(mut self, ids: IdConvention) -> Self {
        self.ids = ids;
        self
    }

    /// Record the connected account's own identity.
    pub fn with_me(mut self, me: Entity) -> Self {
        self.me = Some(me);
        self
    }

    /// All known users, in load order.
    pub fn users(&self) -> &[Entity] {
        &self.users
    }

    /// All known channels, in load order.
    pub fn channels(&self) -> &[Entity] {
        &self.channels
    }

    /// The connected account, if the handshake reported it.
    pub fn me(&self) -> Option<&Entity> {
        self.me.as_ref()
    }

    /// The id convention in use.
    pub fn convention(&self) -> &IdConvention {
        &self.ids
    }

    /// Resolve a channel name (with or without `#`) or id to a channel id.
    pub fn resolve_channel<'a>(&'a self, name_or_id: &'a str) -> Option<&'a str> {
        if self.ids.is_channel_id(name_or_id) {
            return Some(name_or_id);
        }
        let name = name_or_id.strip_prefix(CHANNEL_SIGIL).unwrap_or(name_or_id);
        lookup(&self.channels, name)
    }

    /// Resolve a user name (with or without `@`) or id to a user id.
    pub fn resolve_user<'a>(&'a self, name_or_id: &'a str) -> Option<&'a str> {
        if self.ids.is_user_id(name_or_id) {
            return Some(name_or_id);
        }
        let name = name_or_id.strip_prefix(USER_SIGIL).unwrap_or(name_or_id);
        lookup(&self.users, name)
    }
}

fn lookup<'a>(entities: &'a [Entity], name: &str) -> Option<&'a str> {
    entities
        .iter()
        .find(|entity| entity.name == name)
        .map(|entity| entity.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(
            vec![Entity::new("n0", "neil"), Entity::new("U2", "ada")],
            vec![
                Entity::new("CG0", "general"),
                Entity::new("C1", "random"),
                Entity::new("C2", "random"),
            ],
        )
    }

    #[test]
    fn test_resolve_with_and_without_sigil() {
        let dir = directory();
        assert_eq!(dir.resolve_user("neil"), Some("n0"));
        assert_eq!(dir.resolve_user("@neil"), Some("n0"));
        assert_eq!(dir.resolve_channel("general"), Some("CG0"));
        assert_eq!(dir.resolve_channel("#general"), Some("CG0"));
    }

    #[test]
    fn test_id_shaped_input_passes_through() {
        let dir = directory();
        assert_eq!(dir.resolve_channel("C777"), Some("C777"));
        assert_eq!(dir.resolve_channel("G12"), Some("G12"));
        assert_eq!(dir.resolve_user("U999"), Some("U999"));
        assert_eq!(dir.resolve_user("W1"), Some("W1"));
    }

    #[test]
    fn test_lookup_is_case_sensitive_and_exact() {
        let dir = directory();
        assert_eq!(dir.resolve_user("Neil"), None);
        assert_eq!(dir.resolve_user("nei"), None);
        assert_eq!(dir.resolve_channel("#General"), None);
        assert_eq!(dir.resolve_channel("#"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let dir = directory();
        assert_eq!(dir.resolve_channel("random"), Some("C1"));
    }

    #[test]
    fn test_sigils_are_not_interchangeable() {
        let dir = directory();
        assert_eq!(dir.resolve_user("#neil"), None);
        assert_eq!(dir.resolve_channel("@general"), None);
    }

    #[test]
    fn test_custom_convention() {
        let dir = directory().with_convention(IdConvention {
            channel_prefixes: vec!["ch-".to_string()],
            user_prefixes: vec![],
        });
        assert_eq!(dir.resolve_channel("ch-42"), Some("ch-42"));
        assert_eq!(dir.resolve_channel("C777"), None);
        assert_eq!(dir.resolve_user("U2"), None);
        assert_eq!(dir.resolve_user("ada"), Some("U2"));
    }

    #[test]
    fn test_me() {
        let dir = directory().with_me(Entity::new("U0", "hark"));
        assert_eq!(dir.me().map(|me| me.id.as_str()), Some("U0"));
        assert!(directory().me().is_none());
    }
}
