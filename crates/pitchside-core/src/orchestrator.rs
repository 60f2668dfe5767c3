//! The matchday orchestrator: the single write path into the world.
//!
//! `advance` drives one matchday end to end: pre-match collaborator
//! proposals, parallel match simulation, canonical-order append and
//! apply, post-match proposals, and season rollover. Workers are pure
//! functions of `(snapshot, derived seed)`; the driver reorders their
//! results by `(league, home, away)` before appending, so the log is
//! identical across runs regardless of completion order.
//!
//! Collaborator calls are the only suspension points besides the
//! store's fsync. Each carries a timeout; on timeout or backend error
//! the matchday proceeds with empty updates and a `ValidationFailed`
//! event records the outage. A match whose simulation fails is rolled
//! back to a single `MatchAborted` event; the other matches of the
//! matchday are unaffected.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use pitchside_brain::context::{
    FixtureContext, LeagueContext, MatchdayContext, OutletRef, PlayerRef, ResultContext,
    TableLine,
};
use pitchside_brain::{validate_batch, Collaborator};
use pitchside_engine::{simulate, DerivedRng, MatchInput, SimulatedMatch, TeamSnapshot};
use pitchside_store::EventStore;
use pitchside_types::{
    CollaboratorPhase, Event, EventPayload, Match, MatchId, Player, PlayerId, TeamId,
};
use pitchside_world::{create_world, projections, World};

use crate::error::CoreError;
use crate::scheduler::schedule_season;

/// The fixed genesis date of season one. Replay depends on it, so it
/// is a constant rather than configuration.
pub const GENESIS_YMD: (i32, u32, u32) = (2025, 8, 1);

/// Snapshots are taken when at least this many events accumulated
/// since the last one.
const SNAPSHOT_INTERVAL: u64 = 500;

/// What an `advance` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    /// A matchday's fixtures were simulated.
    MatchesCompleted,
    /// The final matchday finished and the season rolled over.
    SeasonCompleted,
    /// Nothing to do; the calendar was already advanced.
    MatchdayAdvanced,
}

/// Summary returned by [`Orchestrator::advance`].
#[derive(Debug, Clone, Serialize)]
pub struct AdvanceSummary {
    /// What happened.
    pub status: AdvanceStatus,
    /// Matches simulated this call.
    pub matches_played: u32,
    /// Events appended this call.
    pub events_appended: u64,
    /// Season after the call.
    pub season: u32,
}

/// The driver that owns the world, the log, and the collaborator.
pub struct Orchestrator {
    store: EventStore,
    world: World,
    collaborator: Collaborator,
    collaborator_timeout: Duration,
    events_since_snapshot: u64,
}

impl Orchestrator {
    /// Build the orchestrator from a store: rebuild the world from the
    /// log, or run genesis and schedule season one if the log is empty.
    ///
    /// `seed` is only consulted for a fresh log; an existing log pins
    /// its own seed via the `WorldInitialized` record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingGenesis`] for a non-empty log whose
    /// first event is not `WorldInitialized`, and [`CoreError`] for
    /// store or replay failures.
    pub async fn bootstrap(
        store: EventStore,
        collaborator: Collaborator,
        collaborator_timeout: Duration,
        seed: u64,
    ) -> Result<Self, CoreError> {
        let genesis_date = genesis_date();
        let existing = store.read_from(1).await?;

        let world = if existing.is_empty() {
            let mut world = create_world(seed, genesis_date);
            let mut events = vec![Event::new(
                genesis_date.and_hms_opt(8, 0, 0).unwrap_or_default().and_utc(),
                EventPayload::WorldInitialized {
                    season: 1,
                    seed,
                    leagues: world.leagues.keys().cloned().collect(),
                },
            )];
            let league_ids: Vec<_> = world.leagues.keys().cloned().collect();
            for league_id in &league_ids {
                events.extend(schedule_season(&world, league_id, 1, genesis_date)?);
            }
            store.append_batch(&events).await?;
            for event in &events {
                world.apply(event)?;
            }
            info!(seed, events = events.len(), "fresh world created");
            world
        } else {
            let EventPayload::WorldInitialized { seed: logged_seed, .. } =
                &existing[0].event.payload
            else {
                return Err(CoreError::MissingGenesis);
            };
            let logged_seed = *logged_seed;

            // Fast path: resume from the latest snapshot and replay
            // only the tail. A snapshot that fails to decode is
            // discarded in favour of a full replay; snapshots are an
            // optimization, never the source of truth.
            let resumed = match store.latest_snapshot().await? {
                Some(snapshot) => match serde_json::from_slice::<World>(&snapshot.data) {
                    Ok(world) => Some((world, snapshot.sequence)),
                    Err(e) => {
                        warn!(error = %e, "snapshot decode failed; replaying from genesis");
                        None
                    }
                },
                None => None,
            };

            let (mut world, replay_from) = match resumed {
                Some((world, sequence)) => (world, sequence + 1),
                None => (create_world(logged_seed, genesis_date), 1),
            };
            let mut replayed = 0usize;
            for sequenced in existing.iter().filter(|s| s.sequence >= replay_from) {
                world.apply(&sequenced.event)?;
                replayed += 1;
            }
            info!(
                seed = logged_seed,
                replayed,
                from_sequence = replay_from,
                season = world.season,
                "world rebuilt from log"
            );
            world
        };

        Ok(Self {
            store,
            world,
            collaborator,
            collaborator_timeout,
            events_since_snapshot: 0,
        })
    }

    /// Read-only view of the world.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The underlying event store.
    pub const fn store(&self) -> &EventStore {
        &self.store
    }

    /// Advance the simulation by one matchday.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] on store or world failures. Collaborator
    /// and per-match engine failures are local-recoverable and never
    /// propagate out of this method.
    pub async fn advance(&mut self) -> Result<AdvanceSummary, CoreError> {
        let fixtures = self.current_fixtures();
        if fixtures.is_empty() {
            // Idempotent no-op: nothing pending on the current calendar.
            return Ok(AdvanceSummary {
                status: AdvanceStatus::MatchdayAdvanced,
                matches_played: 0,
                events_appended: 0,
                season: self.world.season,
            });
        }

        let matchday_date = fixtures
            .first()
            .map_or(self.world.current_date, |m| m.date);
        let mut events_appended = 0u64;

        // 1. Pre-match soft state.
        events_appended += self
            .collaborate(CollaboratorPhase::PreMatch, &fixtures, &[], matchday_date)
            .await?;

        // 2. Simulate all matches of the matchday in parallel. Workers
        //    get immutable snapshots and a derived seed; nothing else.
        let inputs: Vec<MatchInput> = fixtures
            .iter()
            .map(|m| self.match_input(m))
            .collect();
        let mut join_set: JoinSet<Result<SimulatedMatch, (MatchId, String)>> = JoinSet::new();
        for input in inputs {
            join_set.spawn_blocking(move || {
                let match_id = input.match_id.clone();
                simulate(&input).map_err(|e| (match_id, e.to_string()))
            });
        }
        let mut outcomes: Vec<Result<SimulatedMatch, (MatchId, String)>> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_error) => {
                    error!(error = %join_error, "simulation worker panicked");
                }
            }
        }

        // 3. Canonical order: results sort by (league, home, away), not
        //    by completion order, so appends are deterministic.
        let match_index: BTreeMap<MatchId, &Match> = fixtures
            .iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        outcomes.sort_by(|a, b| {
            let key = |outcome: &Result<SimulatedMatch, (MatchId, String)>| {
                let id = match outcome {
                    Ok(sim) => &sim.match_id,
                    Err((id, _)) => id,
                };
                match_index.get(id).map(|m| {
                    (
                        m.league_id.clone(),
                        m.home_team_id.clone(),
                        m.away_team_id.clone(),
                    )
                })
            };
            key(a).cmp(&key(b))
        });

        // 4. Append in order, then fold into the world.
        let mut batch: Vec<Event> = Vec::new();
        let mut played = 0u32;
        let mut results: Vec<SimulatedMatch> = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(sim) => {
                    self.head_to_head_events(&sim, &mut batch);
                    played += 1;
                    results.push(sim);
                }
                Err((match_id, reason)) => {
                    warn!(match_id = %match_id, reason = %reason, "match aborted, rolling back");
                    batch.push(Event::new(
                        matchday_date.and_hms_opt(17, 0, 0).unwrap_or_default().and_utc(),
                        EventPayload::MatchAborted { match_id, reason },
                    ));
                }
            }
        }
        // Interleave: each match's own events precede its head-to-head
        // updates; `head_to_head_events` already appended per match.
        self.store.append_batch(&batch).await?;
        events_appended += batch.len() as u64;
        for event in &batch {
            self.world.apply(event)?;
        }

        // 5. Post-match soft state over the batch of results.
        events_appended += self
            .collaborate(CollaboratorPhase::PostMatch, &[], &results, matchday_date)
            .await?;

        // 6. Season end when every league has played out its calendar.
        let mut status = AdvanceStatus::MatchesCompleted;
        if self.world.all_seasons_complete() {
            events_appended += self.finish_season(matchday_date).await?;
            status = AdvanceStatus::SeasonCompleted;
        }

        self.maybe_snapshot(events_appended).await?;

        info!(
            matches = played,
            events = events_appended,
            season = self.world.season,
            "matchday advanced"
        );
        Ok(AdvanceSummary {
            status,
            matches_played: played,
            events_appended,
            season: self.world.season,
        })
    }

    /// All unfinished fixtures on each league's current matchday, in
    /// canonical order.
    fn current_fixtures(&self) -> Vec<Match> {
        let mut fixtures: Vec<Match> = Vec::new();
        for league in self.world.leagues.values() {
            if league.is_season_complete() {
                continue;
            }
            fixtures.extend(
                self.world
                    .pending_fixtures(&league.id, league.current_matchday)
                    .into_iter()
                    .cloned(),
            );
        }
        fixtures.sort_by(|a, b| {
            a.league_id
                .cmp(&b.league_id)
                .then_with(|| a.home_team_id.cmp(&b.home_team_id))
                .then_with(|| a.away_team_id.cmp(&b.away_team_id))
        });
        fixtures
    }

    /// Build the immutable engine input for one fixture.
    fn match_input(&self, m: &Match) -> MatchInput {
        let snapshot_for = |team_id: &TeamId| {
            let Some(team) = self.world.teams.get(team_id) else {
                // An unresolvable team yields an empty snapshot; the
                // engine rejects it as an infeasible lineup and the
                // match is aborted rather than the process.
                return TeamSnapshot {
                    id: team_id.clone(),
                    name: team_id.to_string(),
                    players: Vec::new(),
                };
            };
            let mut available: Vec<&Player> = team
                .squad
                .iter()
                .filter_map(|id| self.world.players.get(id))
                .filter(|p| p.is_available())
                .collect();
            // Emergency selection: when fit players cannot fill an
            // eleven (or there is no fit keeper), injured players are
            // risked. Suspended players never play.
            let has_keeper = available
                .iter()
                .any(|p| p.position == pitchside_types::Position::GK);
            if available.len() < 11 || !has_keeper {
                available = team
                    .squad
                    .iter()
                    .filter_map(|id| self.world.players.get(id))
                    .filter(|p| !p.suspended)
                    .collect();
            }
            TeamSnapshot::new(team, &available)
        };
        MatchInput {
            match_id: m.id.clone(),
            home: snapshot_for(&m.home_team_id),
            away: snapshot_for(&m.away_team_id),
            seed: DerivedRng::derive_seed(self.world.seed, &["match", m.id.as_str()]),
            weather: m.weather,
            kickoff: m.date.and_hms_opt(15, 0, 0).unwrap_or_default().and_utc(),
        }
    }

    /// Push one match's events plus its two `HeadToHeadUpdated` events.
    ///
    /// The head-to-head values are computed ahead of application from
    /// the current world state plus this result, so the events can sit
    /// in the same batch as the match and still carry final values.
    fn head_to_head_events(&self, sim: &SimulatedMatch, batch: &mut Vec<Event>) {
        batch.extend(sim.events.iter().cloned());

        let timestamp = sim
            .events
            .last()
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |e| e.timestamp);
        let pairs = [
            (
                &sim.home_team_id,
                &sim.away_team_id,
                sim.home_score,
                sim.away_score,
            ),
            (
                &sim.away_team_id,
                &sim.home_team_id,
                sim.away_score,
                sim.home_score,
            ),
        ];
        for (team_id, opponent_id, scored, conceded) in pairs {
            let current = self
                .world
                .teams
                .get(team_id)
                .and_then(|t| t.head_to_head.get(opponent_id).copied())
                .unwrap_or_default();
            let (mut wins, mut draws, mut losses) =
                (current.wins, current.draws, current.losses);
            if scored > conceded {
                wins += 1;
            } else if scored < conceded {
                losses += 1;
            } else {
                draws += 1;
            }
            batch.push(Event::new(
                timestamp,
                EventPayload::HeadToHeadUpdated {
                    team_id: team_id.clone(),
                    opponent_id: opponent_id.clone(),
                    wins,
                    draws,
                    losses,
                },
            ));
        }
    }

    /// Invoke the collaborator for one phase, validate, append, apply.
    /// Failures and timeouts degrade to a `ValidationFailed` event.
    async fn collaborate(
        &mut self,
        phase: CollaboratorPhase,
        fixtures: &[Match],
        results: &[SimulatedMatch],
        matchday_date: NaiveDate,
    ) -> Result<u64, CoreError> {
        let hour = match phase {
            CollaboratorPhase::PreMatch => 10,
            CollaboratorPhase::PostMatch => 18,
        };
        let timestamp = matchday_date
            .and_hms_opt(hour, 0, 0)
            .unwrap_or_default()
            .and_utc();

        let context = self.build_context(phase, fixtures, results);
        let proposed = tokio::time::timeout(
            self.collaborator_timeout,
            self.collaborator.propose(&context),
        )
        .await;

        let events = match proposed {
            Ok(Ok(batch)) => validate_batch(&self.world, &batch, phase, timestamp),
            Ok(Err(e)) => {
                warn!(error = %e, backend = self.collaborator.name(), "collaborator failed, proceeding with empty updates");
                vec![collaborator_outage_event(timestamp, phase, &e.to_string())]
            }
            Err(_) => {
                warn!(backend = self.collaborator.name(), "collaborator timed out, proceeding with empty updates");
                vec![collaborator_outage_event(timestamp, phase, "timeout")]
            }
        };

        self.store.append_batch(&events).await?;
        for event in &events {
            self.world.apply(event)?;
        }
        Ok(events.len() as u64)
    }

    /// Flatten the world into the collaborator's read-only context.
    fn build_context(
        &self,
        phase: CollaboratorPhase,
        fixtures: &[Match],
        results: &[SimulatedMatch],
    ) -> MatchdayContext {
        let player_ref = |id: &PlayerId| {
            self.world.players.get(id).map(|p| PlayerRef {
                id: p.id.clone(),
                name: p.name.clone(),
                form: p.form,
                morale: p.morale,
            })
        };

        let leagues = self
            .world
            .leagues
            .values()
            .filter_map(|league| {
                let table = projections::league_table(&self.world, &league.id).ok()?;
                Some(LeagueContext {
                    league_id: league.id.clone(),
                    name: league.name.clone(),
                    matchday: league.current_matchday,
                    table: table
                        .into_iter()
                        .map(|row| TableLine {
                            position: row.position,
                            owner_id: self
                                .world
                                .owners
                                .values()
                                .find(|o| o.team_id == row.team_id)
                                .map(|o| o.id.clone()),
                            team_morale: self
                                .world
                                .teams
                                .get(&row.team_id)
                                .map_or(50, |t| t.team_morale),
                            team_id: row.team_id,
                            name: row.team,
                            points: row.points,
                        })
                        .collect(),
                })
            })
            .collect();

        let fixture_contexts = fixtures
            .iter()
            .map(|m| FixtureContext {
                match_id: m.id.clone(),
                home_team_id: m.home_team_id.clone(),
                home_name: self
                    .world
                    .teams
                    .get(&m.home_team_id)
                    .map_or_else(String::new, |t| t.name.clone()),
                away_team_id: m.away_team_id.clone(),
                away_name: self
                    .world
                    .teams
                    .get(&m.away_team_id)
                    .map_or_else(String::new, |t| t.name.clone()),
                importance: m.importance,
            })
            .collect();

        let result_contexts = results
            .iter()
            .map(|sim| {
                let mut scorers = Vec::new();
                let mut sent_off = Vec::new();
                for event in &sim.events {
                    match &event.payload {
                        EventPayload::Goal { scorer, .. } => {
                            if let Some(r) = player_ref(scorer) {
                                scorers.push(r);
                            }
                        }
                        EventPayload::RedCard { player, .. } => {
                            if let Some(r) = player_ref(player) {
                                sent_off.push(r);
                            }
                        }
                        _ => {}
                    }
                }
                let importance = self
                    .world
                    .matches
                    .get(&sim.match_id)
                    .map_or(pitchside_types::FixtureImportance::Normal, |m| {
                        m.importance
                    });
                ResultContext {
                    match_id: sim.match_id.clone(),
                    home_team_id: sim.home_team_id.clone(),
                    home_name: self
                        .world
                        .teams
                        .get(&sim.home_team_id)
                        .map_or_else(String::new, |t| t.name.clone()),
                    away_team_id: sim.away_team_id.clone(),
                    away_name: self
                        .world
                        .teams
                        .get(&sim.away_team_id)
                        .map_or_else(String::new, |t| t.name.clone()),
                    home_score: sim.home_score,
                    away_score: sim.away_score,
                    importance,
                    scorers,
                    sent_off,
                }
            })
            .collect();

        MatchdayContext {
            phase,
            season: self.world.season,
            date: self.world.current_date.to_string(),
            leagues,
            fixtures: fixture_contexts,
            results: result_contexts,
            outlets: self
                .world
                .media_outlets
                .values()
                .map(|o| OutletRef {
                    id: o.id.clone(),
                    name: o.name.clone(),
                })
                .collect(),
        }
    }

    /// Emit `SeasonEnded` per league, let the world roll over, and
    /// schedule the next season's fixtures.
    async fn finish_season(&mut self, matchday_date: NaiveDate) -> Result<u64, CoreError> {
        let ending_season = self.world.season;
        let timestamp = matchday_date
            .and_hms_opt(20, 0, 0)
            .unwrap_or_default()
            .and_utc();

        let mut events: Vec<Event> = Vec::new();
        let league_ids: Vec<_> = self.world.leagues.keys().cloned().collect();
        for league_id in &league_ids {
            let table = projections::league_table(&self.world, league_id)?;
            let Some(champion_row) = table.first() else {
                continue;
            };
            let scorers =
                projections::top_scorers(&self.world, league_id, ending_season, 1)?;
            let assisters =
                projections::top_assisters(&self.world, league_id, ending_season, 1)?;
            let defense = projections::best_defense(&self.world, league_id)?;
            events.push(Event::new(
                timestamp,
                EventPayload::SeasonEnded {
                    league_id: league_id.clone(),
                    season: ending_season,
                    champion: champion_row.team_id.clone(),
                    top_scorer: scorers.first().map(|r| r.player_id.clone()),
                    top_assister: assisters.first().map(|r| r.player_id.clone()),
                    most_clean_sheets: defense
                        .iter()
                        .max_by_key(|row| row.clean_sheets)
                        .map(|row| row.team_id.clone()),
                },
            ));
        }

        self.store.append_batch(&events).await?;
        let mut appended = events.len() as u64;
        for event in &events {
            self.world.apply(event)?;
        }

        // The world has rolled over; lay out the new season from the
        // post-rollover calendar date.
        let start_date = self.world.current_date;
        let mut fixture_events: Vec<Event> = Vec::new();
        for league_id in &league_ids {
            fixture_events.extend(schedule_season(
                &self.world,
                league_id,
                self.world.season,
                start_date,
            )?);
        }
        self.store.append_batch(&fixture_events).await?;
        appended += fixture_events.len() as u64;
        for event in &fixture_events {
            self.world.apply(event)?;
        }

        info!(
            season = ending_season,
            next_season = self.world.season,
            "season concluded and rolled over"
        );
        Ok(appended)
    }

    /// Persist a world snapshot when enough events have accumulated.
    async fn maybe_snapshot(&mut self, appended: u64) -> Result<(), CoreError> {
        self.events_since_snapshot += appended;
        if self.events_since_snapshot < SNAPSHOT_INTERVAL {
            return Ok(());
        }
        let sequence = self.store.latest_sequence().await?;
        match serde_json::to_vec(&self.world) {
            Ok(bytes) => {
                self.store.save_snapshot(sequence, &bytes).await?;
                self.events_since_snapshot = 0;
            }
            Err(e) => {
                // Snapshots are an optimization; losing one is not fatal.
                warn!(error = %e, "world snapshot serialization failed");
            }
        }
        Ok(())
    }
}

/// The event recorded when the collaborator is unreachable.
fn collaborator_outage_event(
    timestamp: DateTime<Utc>,
    phase: CollaboratorPhase,
    reason: &str,
) -> Event {
    let phase_label = match phase {
        CollaboratorPhase::PreMatch => "pre_match",
        CollaboratorPhase::PostMatch => "post_match",
    };
    Event::new(
        timestamp,
        EventPayload::ValidationFailed {
            target_kind: String::from("collaborator"),
            target_id: String::from(phase_label),
            field: String::from("batch"),
            reason: format!("collaborator unavailable: {reason}"),
        },
    )
}

/// Season one's start date.
pub fn genesis_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(GENESIS_YMD.0, GENESIS_YMD.1, GENESIS_YMD.2)
        .unwrap_or_default()
}
