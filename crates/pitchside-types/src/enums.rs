//! Enumeration types shared across the Pitchside workspace.

use serde::{Deserialize, Serialize};

/// On-pitch playing positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Goalkeeper.
    GK,
    /// Centre back.
    CB,
    /// Left back.
    LB,
    /// Right back.
    RB,
    /// Centre midfield.
    CM,
    /// Left midfield.
    LM,
    /// Right midfield.
    RM,
    /// Centre attacking midfield.
    CAM,
    /// Left wing.
    LW,
    /// Right wing.
    RW,
    /// Striker.
    ST,
}

impl Position {
    /// All positions, in defensive-to-attacking order.
    pub const ALL: [Self; 11] = [
        Self::GK,
        Self::CB,
        Self::LB,
        Self::RB,
        Self::CM,
        Self::LM,
        Self::RM,
        Self::CAM,
        Self::LW,
        Self::RW,
        Self::ST,
    ];

    /// Whether the position is part of the defensive line (excluding GK).
    pub const fn is_defender(self) -> bool {
        matches!(self, Self::CB | Self::LB | Self::RB)
    }

    /// Whether the position is an attacking one for scorer weighting.
    pub const fn is_attacking(self) -> bool {
        matches!(self, Self::CAM | Self::LW | Self::RW | Self::ST)
    }

    /// Whether the position counts as a forward for lineup constraints.
    pub const fn is_forward(self) -> bool {
        matches!(self, Self::LW | Self::RW | Self::ST)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::GK => "GK",
            Self::CB => "CB",
            Self::LB => "LB",
            Self::RB => "RB",
            Self::CM => "CM",
            Self::LM => "LM",
            Self::RM => "RM",
            Self::CAM => "CAM",
            Self::LW => "LW",
            Self::RW => "RW",
            Self::ST => "ST",
        };
        write!(f, "{s}")
    }
}

/// Which foot a player prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferredFoot {
    /// Left-footed.
    Left,
    /// Right-footed.
    Right,
    /// Comfortable with both.
    Both,
}

/// Work-rate level for one phase of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkRate {
    /// Low effort.
    Low,
    /// Medium effort.
    Medium,
    /// High effort.
    High,
}

/// Match-time weather, fixed at scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    /// Clear skies.
    Sunny,
    /// Overcast.
    Cloudy,
    /// Rain.
    Rainy,
    /// Snow.
    Snowy,
    /// Strong wind.
    Windy,
    /// Fog.
    Foggy,
}

/// Importance classification attached to an unplayed fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureImportance {
    /// An ordinary league fixture.
    Normal,
    /// Both sides in the top three within three points.
    TitleRace,
    /// A configured rivalry pairing.
    Derby,
    /// Both sides in the bottom three.
    Relegation,
}

/// One letter of a team's recent-form FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    /// Win.
    W,
    /// Draw.
    D,
    /// Loss.
    L,
}

/// Severity bands for in-match injuries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjurySeverity {
    /// 1-2 weeks out.
    Minor,
    /// 3-6 weeks out.
    Moderate,
    /// 7-16 weeks out.
    Severe,
}

/// Severity of a foul.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulSeverity {
    /// A routine foul.
    Regular,
    /// A reckless challenge.
    Dangerous,
    /// A deliberate tactical foul.
    Professional,
}

/// Whether a free kick may be struck directly at goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeKickKind {
    /// Direct shot permitted.
    Direct,
    /// Must touch another player first.
    Indirect,
}

/// Rough pitch location of a free kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeKickLocation {
    /// Within shooting range.
    Dangerous,
    /// Deep in safe territory.
    Safe,
}

/// Which collaborator phase a proposal batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorPhase {
    /// Before the matchday's fixtures are simulated.
    PreMatch,
    /// After all results are in.
    PostMatch,
}

/// Sentiment attached to narrative output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Favourable coverage.
    Positive,
    /// Neutral coverage.
    Neutral,
    /// Critical coverage.
    Negative,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_classification() {
        assert!(Position::CB.is_defender());
        assert!(!Position::GK.is_defender());
        assert!(Position::ST.is_attacking());
        assert!(Position::ST.is_forward());
        assert!(Position::CAM.is_attacking());
        assert!(!Position::CAM.is_forward());
        assert!(!Position::CM.is_attacking());
    }

    #[test]
    fn importance_serializes_snake_case() {
        let json = serde_json::to_string(&FixtureImportance::TitleRace).expect("serialize");
        assert_eq!(json, "\"title_race\"");
    }
}
