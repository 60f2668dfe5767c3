//! Type-safe identifier wrappers around stable string ids.
//!
//! Every entity in the world has a strongly-typed id to prevent
//! accidental mixing of identifiers at compile time. Ids are lowercase
//! snake-case strings fixed at genesis (`united_dragons`) or derived
//! deterministically from their parts (match ids), never random: the
//! whole simulation must replay byte-identically from a seed.
//!
//! Cross-entity relations are expressed through these ids. Entities
//! never hold references to each other.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `String` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a league.
    LeagueId
}

define_id! {
    /// Unique identifier for a team.
    TeamId
}

define_id! {
    /// Unique identifier for a player.
    PlayerId
}

define_id! {
    /// Unique identifier for a match.
    MatchId
}

define_id! {
    /// Unique identifier for a club owner.
    OwnerId
}

define_id! {
    /// Unique identifier for a staff member.
    StaffId
}

define_id! {
    /// Unique identifier for a media outlet.
    MediaOutletId
}

impl MatchId {
    /// Derive the canonical id for a fixture.
    ///
    /// Match ids are a pure function of their scheduling coordinates so
    /// that fixture generation, and everything seeded from a match id,
    /// is reproducible across runs.
    pub fn for_fixture(
        league: &LeagueId,
        season: u32,
        matchday: u32,
        home: &TeamId,
        away: &TeamId,
    ) -> Self {
        Self(format!(
            "{league}-s{season}-md{matchday}-{home}-vs-{away}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let team = TeamId::new("united_dragons");
        let player = PlayerId::new("united_dragons_st_1");
        // Different types -- the compiler enforces no mixing.
        assert_eq!(team.as_str(), "united_dragons");
        assert_eq!(player.as_str(), "united_dragons_st_1");
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = TeamId::new("city_phoenix");
        let json = serde_json::to_string(&original).expect("serialize");
        assert_eq!(json, "\"city_phoenix\"");
        let restored: TeamId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, original);
    }

    #[test]
    fn match_id_is_deterministic() {
        let a = MatchId::for_fixture(
            &LeagueId::new("premier_fantasy"),
            1,
            3,
            &TeamId::new("united_dragons"),
            &TeamId::new("city_phoenix"),
        );
        let b = MatchId::for_fixture(
            &LeagueId::new("premier_fantasy"),
            1,
            3,
            &TeamId::new("united_dragons"),
            &TeamId::new("city_phoenix"),
        );
        assert_eq!(a, b);
        assert_eq!(
            a.as_str(),
            "premier_fantasy-s1-md3-united_dragons-vs-city_phoenix"
        );
    }
}
