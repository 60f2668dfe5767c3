//! Fixture scheduling: the double round-robin calendar.
//!
//! The canonical circle method, anchored on ascending team-id order:
//! the first sorted team is the pivot; after each round the last
//! element moves to position 1. The second half of the season mirrors
//! the first with home and away swapped, giving `2(n-1)` matchdays in
//! which every team plays exactly once. Matchdays are seven days apart
//! from the season's start date.
//!
//! Weather, attendance, and atmosphere are fixed at scheduling time
//! from an RNG derived from `(world.seed, season, league, match id)`,
//! so the calendar is reproducible and independent of simulation
//! order.

use chrono::{Days, NaiveDate};
use tracing::info;

use pitchside_engine::DerivedRng;
use pitchside_types::{
    Event, EventPayload, FixtureImportance, LeagueId, MatchId, TeamId, Weather,
};
use pitchside_world::{projections, World};

use crate::error::CoreError;

/// Share of capacity filled before modifiers.
const BASE_ATTENDANCE_SHARE: f64 = 0.75;

/// Floor on attendance regardless of modifiers.
const MIN_ATTENDANCE: u32 = 1000;

/// Points gap within which a top-three clash is a title race.
const TITLE_RACE_POINT_GAP: u32 = 3;

/// Generate the full fixture list for one league season.
///
/// Returns the `MatchScheduled` events in `(matchday, home, away)`
/// order; folding them into the world creates the unplayed matches.
///
/// # Errors
///
/// Returns [`CoreError::Unschedulable`] when the league has fewer than
/// two teams or an odd membership, and [`CoreError::World`] when a
/// team id does not resolve.
pub fn schedule_season(
    world: &World,
    league_id: &LeagueId,
    season: u32,
    start_date: NaiveDate,
) -> Result<Vec<Event>, CoreError> {
    let league = world.league(league_id)?;
    let mut teams: Vec<TeamId> = league.teams.clone();
    teams.sort();

    let n = teams.len();
    if n < 2 {
        return Err(CoreError::Unschedulable {
            league: league_id.to_string(),
            reason: String::from("fewer than two teams"),
        });
    }
    if n % 2 != 0 {
        return Err(CoreError::Unschedulable {
            league: league_id.to_string(),
            reason: String::from("odd number of teams"),
        });
    }

    let rounds = n as u32 - 1;
    let mut events = Vec::with_capacity(n * (n - 1));
    let mut rotation = teams;

    for round in 0..rounds {
        let first_half_matchday = round + 1;
        let second_half_matchday = rounds + round + 1;

        for i in 0..n / 2 {
            let a = rotation[i].clone();
            let b = rotation[n - 1 - i].clone();

            events.push(schedule_fixture(
                world,
                league_id,
                season,
                first_half_matchday,
                start_date,
                &a,
                &b,
            )?);
            events.push(schedule_fixture(
                world,
                league_id,
                season,
                second_half_matchday,
                start_date,
                &b,
                &a,
            )?);
        }

        // Pivot stays; the last team steps in behind it.
        if let Some(last) = rotation.pop() {
            rotation.insert(1, last);
        }
    }

    // Events in calendar order: matchday, then home id.
    events.sort_by(|a, b| match (&a.payload, &b.payload) {
        (
            EventPayload::MatchScheduled {
                matchday: md_a,
                home_team_id: home_a,
                ..
            },
            EventPayload::MatchScheduled {
                matchday: md_b,
                home_team_id: home_b,
                ..
            },
        ) => md_a.cmp(md_b).then_with(|| home_a.cmp(home_b)),
        _ => core::cmp::Ordering::Equal,
    });

    info!(
        league = %league_id,
        season,
        fixtures = events.len(),
        "season scheduled"
    );
    Ok(events)
}

/// Build one `MatchScheduled` event with derived weather, attendance,
/// and atmosphere.
fn schedule_fixture(
    world: &World,
    league_id: &LeagueId,
    season: u32,
    matchday: u32,
    start_date: NaiveDate,
    home: &TeamId,
    away: &TeamId,
) -> Result<Event, CoreError> {
    let match_id = MatchId::for_fixture(league_id, season, matchday, home, away);
    let date = start_date
        .checked_add_days(Days::new(7 * u64::from(matchday - 1)))
        .unwrap_or(start_date);

    let season_tag = season.to_string();
    let mut rng = DerivedRng::derive(
        world.seed,
        &["fixtures", &season_tag, league_id.as_str(), match_id.as_str()],
    );

    let weather = roll_weather(&mut rng);
    let home_team = world.team(home)?;
    let away_team = world.team(away)?;

    let capacity = home_team.stadium.capacity;
    let reputation_modifier = 1.0 + (f64::from(home_team.reputation) - 50.0) / 100.0;
    let weather_modifier = match weather {
        Weather::Rainy => 0.85,
        Weather::Snowy => 0.70,
        Weather::Foggy => 0.90,
        Weather::Sunny => 1.10,
        Weather::Cloudy | Weather::Windy => 1.0,
    };
    let jitter = 0.90 + rng.unit() * 0.20;
    let attendance = (f64::from(capacity)
        * BASE_ATTENDANCE_SHARE
        * reputation_modifier
        * weather_modifier
        * jitter)
        .round() as u32;
    let attendance = attendance.clamp(MIN_ATTENDANCE, capacity.max(MIN_ATTENDANCE));

    let ratio = f64::from(attendance) / f64::from(capacity.max(1));
    let mut atmosphere = (30.0 + ratio * 60.0).round() as u8;
    if home_team.reputation >= 60 && away_team.reputation >= 60 {
        atmosphere = atmosphere.saturating_add(10);
    }
    let atmosphere = atmosphere.clamp(30, 90);

    let importance = classify_importance(world, league_id, home, away)?;

    let timestamp = date
        .and_hms_opt(9, 0, 0)
        .unwrap_or_default()
        .and_utc();

    Ok(Event::new(
        timestamp,
        EventPayload::MatchScheduled {
            match_id,
            league_id: league_id.clone(),
            matchday,
            season,
            home_team_id: home.clone(),
            away_team_id: away.clone(),
            date,
            weather,
            attendance,
            atmosphere_rating: atmosphere,
            importance,
        },
    ))
}

/// Weather mix: 30% sunny, 25% cloudy, 20% rainy, 10% windy, 10%
/// foggy, 5% snowy.
fn roll_weather(rng: &mut DerivedRng) -> Weather {
    let roll = rng.unit();
    if roll < 0.30 {
        Weather::Sunny
    } else if roll < 0.55 {
        Weather::Cloudy
    } else if roll < 0.75 {
        Weather::Rainy
    } else if roll < 0.85 {
        Weather::Windy
    } else if roll < 0.95 {
        Weather::Foggy
    } else {
        Weather::Snowy
    }
}

/// Classify a fixture's importance from the current table and the
/// configured rivalry set. Derby outranks title race outranks
/// relegation.
pub fn classify_importance(
    world: &World,
    league_id: &LeagueId,
    home: &TeamId,
    away: &TeamId,
) -> Result<FixtureImportance, CoreError> {
    if world.is_rivalry(home, away) {
        return Ok(FixtureImportance::Derby);
    }

    let table = projections::league_table(world, league_id)?;
    let position_of = |team: &TeamId| {
        table
            .iter()
            .find(|row| row.team_id == *team)
            .map(|row| (row.position, row.points))
    };
    let (Some((home_pos, home_pts)), Some((away_pos, away_pts))) =
        (position_of(home), position_of(away))
    else {
        return Ok(FixtureImportance::Normal);
    };

    if home_pos <= 3 && away_pos <= 3 && home_pts.abs_diff(away_pts) <= TITLE_RACE_POINT_GAP {
        return Ok(FixtureImportance::TitleRace);
    }

    let cutoff = table.len() as u32 - 3;
    if home_pos > cutoff && away_pos > cutoff {
        return Ok(FixtureImportance::Relegation);
    }

    Ok(FixtureImportance::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use pitchside_world::create_world;

    fn world() -> World {
        create_world(42, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap())
    }

    fn premier() -> LeagueId {
        LeagueId::new("premier_fantasy")
    }

    fn scheduled_pairs(events: &[Event]) -> Vec<(u32, TeamId, TeamId)> {
        events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::MatchScheduled {
                    matchday,
                    home_team_id,
                    away_team_id,
                    ..
                } => Some((*matchday, home_team_id.clone(), away_team_id.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn double_round_robin_shape() {
        let world = world();
        let events =
            schedule_season(&world, &premier(), 1, world.current_date).expect("schedule");
        // 10 teams: 2 * 45 = 90 fixtures over 18 matchdays.
        assert_eq!(events.len(), 90);
        let pairs = scheduled_pairs(&events);
        let max_md = pairs.iter().map(|(md, _, _)| *md).max().unwrap();
        assert_eq!(max_md, 18);
    }

    #[test]
    fn every_ordered_pair_appears_exactly_once() {
        let world = world();
        let events =
            schedule_season(&world, &premier(), 1, world.current_date).expect("schedule");
        let mut seen: BTreeMap<(TeamId, TeamId), u32> = BTreeMap::new();
        for (_, home, away) in scheduled_pairs(&events) {
            *seen.entry((home, away)).or_default() += 1;
        }
        assert_eq!(seen.len(), 90);
        assert!(seen.values().all(|&count| count == 1));
    }

    #[test]
    fn every_team_plays_once_per_matchday() {
        let world = world();
        let events =
            schedule_season(&world, &premier(), 1, world.current_date).expect("schedule");
        let pairs = scheduled_pairs(&events);
        for matchday in 1..=18u32 {
            let mut seen: BTreeSet<TeamId> = BTreeSet::new();
            for (md, home, away) in &pairs {
                if *md == matchday {
                    assert!(seen.insert(home.clone()), "{home} twice on md {matchday}");
                    assert!(seen.insert(away.clone()), "{away} twice on md {matchday}");
                }
            }
            assert_eq!(seen.len(), 10, "matchday {matchday}");
        }
    }

    #[test]
    fn scheduling_is_deterministic() {
        let world = world();
        let a = schedule_season(&world, &premier(), 1, world.current_date).expect("schedule");
        let b = schedule_season(&world, &premier(), 1, world.current_date).expect("schedule");
        assert_eq!(a, b);
    }

    #[test]
    fn dates_advance_weekly() {
        let world = world();
        let events =
            schedule_season(&world, &premier(), 1, world.current_date).expect("schedule");
        for event in &events {
            if let EventPayload::MatchScheduled { matchday, date, .. } = &event.payload {
                let expected = world
                    .current_date
                    .checked_add_days(Days::new(7 * u64::from(matchday - 1)))
                    .unwrap();
                assert_eq!(*date, expected);
            }
        }
    }

    #[test]
    fn attendance_and_atmosphere_in_range() {
        let world = world();
        let events =
            schedule_season(&world, &premier(), 1, world.current_date).expect("schedule");
        for event in &events {
            if let EventPayload::MatchScheduled {
                attendance,
                atmosphere_rating,
                home_team_id,
                ..
            } = &event.payload
            {
                let capacity = world.team(home_team_id).unwrap().stadium.capacity;
                assert!(*attendance >= 1000);
                assert!(*attendance <= capacity);
                assert!((30..=90).contains(atmosphere_rating));
            }
        }
    }

    #[test]
    fn rivalry_fixture_is_a_derby() {
        let world = world();
        let importance = classify_importance(
            &world,
            &premier(),
            &TeamId::new("united_dragons"),
            &TeamId::new("city_phoenix"),
        )
        .expect("classify");
        assert_eq!(importance, FixtureImportance::Derby);
    }
}
