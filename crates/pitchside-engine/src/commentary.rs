//! Human-readable commentary lines.
//!
//! Every meaningful match event appends one line of the form
//! `"{minute}' - {verb} {details}"` to the commentary buffer carried in
//! `MatchEnded`.

use pitchside_types::{FreeKickKind, FreeKickLocation, InjurySeverity};

/// A goal, with optional assist and penalty marker.
pub fn goal(minute: u8, scorer: &str, team: &str, assist: Option<&str>, penalty: bool) -> String {
    let mut line = if penalty {
        format!("{minute}' - GOAL! {scorer} converts the penalty for {team}")
    } else {
        format!("{minute}' - GOAL! {scorer} scores for {team}")
    };
    if let Some(provider) = assist {
        line.push_str(&format!(", assisted by {provider}"));
    }
    line
}

/// A yellow card.
pub fn yellow_card(minute: u8, player: &str, reason: &str) -> String {
    format!("{minute}' - Yellow card for {player} ({reason})")
}

/// A red card, direct or second yellow.
pub fn red_card(minute: u8, player: &str, reason: &str, second_yellow: bool) -> String {
    if second_yellow {
        format!("{minute}' - RED CARD! {player} is sent off for a second yellow")
    } else {
        format!("{minute}' - RED CARD! {player} is sent off ({reason})")
    }
}

/// A substitution.
pub fn substitution(minute: u8, off: &str, on: &str, team: &str) -> String {
    format!("{minute}' - Substitution for {team}: {on} replaces {off}")
}

/// An injury stoppage.
pub fn injury(minute: u8, player: &str, description: &str, severity: InjurySeverity) -> String {
    let band = match severity {
        InjurySeverity::Minor => "a knock",
        InjurySeverity::Moderate => "an injury",
        InjurySeverity::Severe => "a serious injury",
    };
    format!("{minute}' - {player} is down with {band} ({description})")
}

/// A corner kick.
pub fn corner(minute: u8, team: &str) -> String {
    format!("{minute}' - Corner kick for {team}")
}

/// A free kick.
pub fn free_kick(minute: u8, team: &str, kind: FreeKickKind, location: FreeKickLocation) -> String {
    let kind_word = match kind {
        FreeKickKind::Direct => "Direct",
        FreeKickKind::Indirect => "Indirect",
    };
    let where_word = match location {
        FreeKickLocation::Dangerous => "in a dangerous position",
        FreeKickLocation::Safe => "deep in their own half",
    };
    format!("{minute}' - {kind_word} free kick for {team} {where_word}")
}

/// A penalty award.
pub fn penalty_awarded(minute: u8, team: &str, reason: &str) -> String {
    format!("{minute}' - PENALTY to {team}! ({reason})")
}

/// A missed penalty.
pub fn penalty_missed(minute: u8, taker: &str) -> String {
    format!("{minute}' - {taker} misses the penalty!")
}

/// An offside flag.
pub fn offside(minute: u8, player: &str) -> String {
    format!("{minute}' - {player} is flagged offside")
}

/// Full-time whistle.
pub fn full_time(home: &str, home_score: u32, away: &str, away_score: u32) -> String {
    format!("90' - Full time: {home} {home_score} - {away_score} {away}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_lead_with_the_minute() {
        assert!(goal(23, "A", "B", None, false).starts_with("23' - "));
        assert!(yellow_card(70, "A", "Dissent").starts_with("70' - "));
        assert!(corner(5, "B").starts_with("5' - "));
    }

    #[test]
    fn goal_mentions_assist_when_present() {
        let line = goal(55, "Striker", "Team", Some("Playmaker"), false);
        assert!(line.contains("assisted by Playmaker"));
    }
}
