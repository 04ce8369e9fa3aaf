//! Classification of caller-supplied user/tweet references.
//!
//! A reference is either a numeric platform ID or a textual handle. The
//! same rule is applied everywhere a reference becomes request parameters:
//! a non-empty string of ASCII digits is an ID, anything else a handle.

use std::fmt;

use serde::{Serialize, Serializer};

/// A reference to a user or tweet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// Numeric platform ID.
    Id(u64),
    /// Screen name (without `@`).
    Handle(String),
}

/// Which side of a relationship lookup a reference occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Target,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

impl EntityRef {
    /// Classify a raw reference.
    ///
    /// All-digit strings are IDs even when the caller meant a handle made of
    /// digits; the platform offers no way to tell the two apart.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<u64>() {
                return Self::Id(id);
            }
        }
        Self::Handle(trimmed.trim_start_matches('@').to_string())
    }

    #[must_use]
    pub fn is_id(&self) -> bool {
        matches!(self, Self::Id(_))
    }

    /// The numeric ID, if this reference is one.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Handle(_) => None,
        }
    }

    /// Caller-facing label used as a result key.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// User lookup path: by ID or by username.
    #[must_use]
    pub fn user_lookup_path(&self) -> String {
        match self {
            Self::Id(id) => format!("/2/users/{id}"),
            Self::Handle(handle) => format!("/2/users/by/username/{handle}"),
        }
    }

    /// Query parameters for v1.1 endpoints that accept either form.
    #[must_use]
    pub fn user_params(&self) -> (&'static str, String) {
        match self {
            Self::Id(id) => ("user_id", id.to_string()),
            Self::Handle(handle) => ("screen_name", handle.clone()),
        }
    }

    /// `source_id` / `source_screen_name` (or `target_*`) parameter pair.
    #[must_use]
    pub fn relationship_param(&self, role: Role) -> (String, String) {
        let prefix = role.prefix();
        match self {
            Self::Id(id) => (format!("{prefix}_id"), id.to_string()),
            Self::Handle(handle) => (format!("{prefix}_screen_name"), handle.clone()),
        }
    }
}

impl From<u64> for EntityRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for EntityRef {
    fn from(raw: &str) -> Self {
        Self::classify(raw)
    }
}

impl From<String> for EntityRef {
    fn from(raw: String) -> Self {
        Self::classify(&raw)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Handle(handle) => f.write_str(handle),
        }
    }
}

impl Serialize for EntityRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_string_and_integer_classify_identically() {
        assert_eq!(EntityRef::classify("12345"), EntityRef::from(12345_u64));
        assert!(EntityRef::classify("12345").is_id());
    }

    #[test]
    fn test_text_is_handle() {
        assert_eq!(
            EntityRef::classify("goetheuni"),
            EntityRef::Handle("goetheuni".to_string())
        );
        assert_eq!(
            EntityRef::classify("@WWU_Muenster"),
            EntityRef::Handle("WWU_Muenster".to_string())
        );
        // Mixed digits and letters stay a handle
        assert!(!EntityRef::classify("123abc").is_id());
        assert!(!EntityRef::classify("").is_id());
    }

    #[test]
    fn test_overflowing_digits_fall_back_to_handle() {
        let r = EntityRef::classify("99999999999999999999999");
        assert!(matches!(r, EntityRef::Handle(_)));
    }

    #[test]
    fn test_lookup_paths() {
        assert_eq!(EntityRef::from(42_u64).user_lookup_path(), "/2/users/42");
        assert_eq!(
            EntityRef::classify("goetheuni").user_lookup_path(),
            "/2/users/by/username/goetheuni"
        );
    }

    #[test]
    fn test_relationship_params() {
        assert_eq!(
            EntityRef::from(7_u64).relationship_param(Role::Source),
            ("source_id".to_string(), "7".to_string())
        );
        assert_eq!(
            EntityRef::classify("jack").relationship_param(Role::Target),
            ("target_screen_name".to_string(), "jack".to_string())
        );
    }

    #[test]
    fn test_label_round_trips_classification() {
        for raw in ["24677217", "UniKonstanz"] {
            let r = EntityRef::classify(raw);
            assert_eq!(EntityRef::classify(&r.label()), r);
        }
    }
}
