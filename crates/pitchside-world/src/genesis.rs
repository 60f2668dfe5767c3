//! World genesis: deterministic creation of the fantasy leagues.
//!
//! Everything here is a pure function of `(seed, genesis date)`. The
//! same seed always produces the same twenty clubs, the same squads,
//! and the same attribute rolls, which is what lets a fresh process
//! rebuild the world from the log: genesis plus replay equals the
//! world that wrote the log.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use pitchside_engine::DerivedRng;
use pitchside_types::{
    Finances, League, LeagueId, MediaOutlet, MediaOutletId, Owner, OwnerId, Player, PlayerId,
    Position, PreferredFoot, Stadium, StaffId, StaffMember, Team, TeamId, TeamRecord, WorkRate,
};

use crate::world::World;

/// The two leagues and their clubs.
const LEAGUES: [(&str, &str, &[(&str, &str)]); 2] = [
    (
        "premier_fantasy",
        "Premier Fantasy League",
        &[
            ("united_dragons", "United Dragons"),
            ("city_phoenix", "City Phoenix"),
            ("rovers_wolves", "Rovers Wolves"),
            ("athletic_eagles", "Athletic Eagles"),
            ("town_tigers", "Town Tigers"),
            ("villa_lions", "Villa Lions"),
            ("wanderers_hawks", "Wanderers Hawks"),
            ("county_bears", "County Bears"),
            ("forest_foxes", "Forest Foxes"),
            ("united_sharks", "United Sharks"),
        ],
    ),
    (
        "la_fantasy",
        "La Fantasia League",
        &[
            ("real_dragons", "Real Dragones"),
            ("barcelona_suns", "Barcelona Soles"),
            ("atletico_storms", "Atletico Tormentas"),
            ("valencia_flames", "Valencia Llamas"),
            ("sevilla_winds", "Sevilla Vientos"),
            ("villarreal_waves", "Villarreal Ondas"),
            ("real_eagles", "Real Aguilas"),
            ("betis_stars", "Betis Estrellas"),
            ("athletic_thunder", "Athletic Truenos"),
            ("celta_comets", "Celta Cometas"),
        ],
    ),
];

/// Fixed rivalry pairings used by fixture importance tagging.
const RIVALRIES: [(&str, &str); 4] = [
    ("united_dragons", "city_phoenix"),
    ("forest_foxes", "rovers_wolves"),
    ("real_dragons", "barcelona_suns"),
    ("sevilla_winds", "betis_stars"),
];

/// Squad template: sixteen players with position depth.
const SQUAD_TEMPLATE: [(Position, &str); 16] = [
    (Position::GK, "gk1"),
    (Position::GK, "gk2"),
    (Position::CB, "cb1"),
    (Position::CB, "cb2"),
    (Position::CB, "cb3"),
    (Position::LB, "lb1"),
    (Position::RB, "rb1"),
    (Position::CM, "cm1"),
    (Position::CM, "cm2"),
    (Position::LM, "lm1"),
    (Position::RM, "rm1"),
    (Position::CAM, "cam1"),
    (Position::LW, "lw1"),
    (Position::RW, "rw1"),
    (Position::ST, "st1"),
    (Position::ST, "st2"),
];

const FIRST_NAMES: [&str; 24] = [
    "Aldo", "Bram", "Cato", "Dario", "Emeric", "Falko", "Gideon", "Halvar", "Ivo", "Jarek",
    "Kasimir", "Lazlo", "Milo", "Nuno", "Odan", "Pavo", "Quill", "Ragnar", "Santo", "Tiber",
    "Ulric", "Vasco", "Wendel", "Yorick",
];

const LAST_NAMES: [&str; 24] = [
    "Ashford", "Blackwood", "Crowhurst", "Dunmore", "Eastvale", "Fenwick", "Greymoor",
    "Hollowell", "Ironside", "Jasperdale", "Kestrel", "Longbarrow", "Marrowgate", "Northcliff",
    "Oakhaven", "Pellamore", "Quarrington", "Ravensworth", "Stonebridge", "Thornbury",
    "Umberfield", "Vantagard", "Wintermere", "Yarrowond",
];

const TRAIT_POOL: [&str; 6] = [
    "clinical_finisher",
    "engine",
    "leader",
    "set_piece_specialist",
    "speed_merchant",
    "wall",
];

const STADIUM_SUFFIXES: [&str; 4] = ["Park", "Arena", "Grounds", "Field"];

/// Create the world at season 1 from a seed. Fixtures are not scheduled
/// here; the scheduler emits them as events.
pub fn create_world(seed: u64, genesis_date: NaiveDate) -> World {
    let mut world = World {
        season: 1,
        current_date: genesis_date,
        seed,
        leagues: BTreeMap::new(),
        teams: BTreeMap::new(),
        players: BTreeMap::new(),
        matches: BTreeMap::new(),
        owners: BTreeMap::new(),
        staff: BTreeMap::new(),
        media_outlets: BTreeMap::new(),
        rivalries: RIVALRIES
            .iter()
            .map(|(a, b)| (TeamId::new(*a), TeamId::new(*b)))
            .collect(),
        pending_tallies: BTreeMap::new(),
    };

    for (league_id, league_name, clubs) in LEAGUES {
        let league_id = LeagueId::new(league_id);
        let team_count = clubs.len() as u32;
        world.leagues.insert(
            league_id.clone(),
            League {
                id: league_id.clone(),
                name: league_name.to_owned(),
                teams: clubs.iter().map(|(id, _)| TeamId::new(*id)).collect(),
                current_matchday: 1,
                total_matchdays: 2 * (team_count - 1),
                champions_by_season: BTreeMap::new(),
                top_scorers_by_season: BTreeMap::new(),
            },
        );

        for (team_id, team_name) in clubs.iter() {
            create_team(&mut world, seed, &league_id, team_id, team_name);
        }
    }

    create_media_outlets(&mut world);
    world
}

fn create_team(world: &mut World, seed: u64, league_id: &LeagueId, id: &str, name: &str) {
    let mut rng = DerivedRng::derive(seed, &["genesis", "team", id]);
    let team_id = TeamId::new(id);

    let reputation = rng.range_inclusive(40, 85) as u8;
    let capacity = rng.range_inclusive(18, 62) * 1000;
    let balance = i64::from(rng.range_inclusive(5, 80)) * 1_000_000;
    let monthly_costs = i64::from(rng.range_inclusive(1_000, 3_500)) * 1_000;

    let mut squad: Vec<PlayerId> = Vec::with_capacity(SQUAD_TEMPLATE.len());
    for (position, suffix) in SQUAD_TEMPLATE {
        let player = create_player(&mut rng, &team_id, id, suffix, position, reputation);
        squad.push(player.id.clone());
        world.players.insert(player.id.clone(), player);
    }

    let stadium_suffix = STADIUM_SUFFIXES[rng
        .index(STADIUM_SUFFIXES.len())
        .unwrap_or(0)];
    world.teams.insert(
        team_id.clone(),
        Team {
            id: team_id.clone(),
            name: name.to_owned(),
            league_id: league_id.clone(),
            squad,
            tactical_familiarity: rng.range_inclusive(40, 70) as u8,
            team_morale: rng.range_inclusive(45, 65) as u8,
            reputation,
            finances: Finances {
                balance,
                monthly_costs,
                monthly_revenue: monthly_costs + i64::from(rng.range_inclusive(100, 900)) * 1_000,
            },
            stadium: Stadium {
                name: format!("{name} {stadium_suffix}"),
                capacity,
                training_facilities: rng.range_inclusive(40, 90) as u8,
            },
            record: TeamRecord::default(),
            head_to_head: BTreeMap::new(),
        },
    );

    let owner_id = OwnerId::new(format!("{id}_owner"));
    world.owners.insert(
        owner_id.clone(),
        Owner {
            id: owner_id,
            name: roll_name(&mut rng),
            team_id: team_id.clone(),
            role: String::from("Chairman"),
            public_approval: rng.range_inclusive(40, 75) as u8,
        },
    );

    for role in ["Head Coach", "Physio"] {
        let slug = role.to_lowercase().replace(' ', "_");
        let staff_id = StaffId::new(format!("{id}_{slug}"));
        world.staff.insert(
            staff_id.clone(),
            StaffMember {
                id: staff_id,
                name: roll_name(&mut rng),
                team_id: team_id.clone(),
                role: role.to_owned(),
                team_rapport: rng.range_inclusive(45, 70) as u8,
            },
        );
    }
}

fn roll_name(rng: &mut DerivedRng) -> String {
    let first = FIRST_NAMES[rng.index(FIRST_NAMES.len()).unwrap_or(0)];
    let last = LAST_NAMES[rng.index(LAST_NAMES.len()).unwrap_or(0)];
    format!("{first} {last}")
}

/// Roll a player's attributes around position-appropriate bands.
fn create_player(
    rng: &mut DerivedRng,
    team_id: &TeamId,
    team_slug: &str,
    suffix: &str,
    position: Position,
    team_reputation: u8,
) -> Player {
    let roll = |rng: &mut DerivedRng, lo: u32, hi: u32| rng.range_inclusive(lo, hi) as u8;

    let (pace, shooting, passing, defending, physicality) = match position {
        Position::GK => (
            roll(rng, 30, 55),
            roll(rng, 15, 40),
            roll(rng, 40, 65),
            roll(rng, 60, 88),
            roll(rng, 55, 85),
        ),
        Position::CB | Position::LB | Position::RB => (
            roll(rng, 50, 80),
            roll(rng, 25, 55),
            roll(rng, 45, 70),
            roll(rng, 58, 86),
            roll(rng, 55, 85),
        ),
        Position::CM | Position::LM | Position::RM => (
            roll(rng, 50, 78),
            roll(rng, 45, 72),
            roll(rng, 58, 86),
            roll(rng, 45, 70),
            roll(rng, 45, 75),
        ),
        Position::CAM | Position::LW | Position::RW | Position::ST => (
            roll(rng, 55, 88),
            roll(rng, 58, 88),
            roll(rng, 48, 75),
            roll(rng, 20, 45),
            roll(rng, 45, 75),
        ),
    };

    let age = roll(rng, 18, 34);
    let foot_roll = rng.unit();
    let preferred_foot = if foot_roll < 0.70 {
        PreferredFoot::Right
    } else if foot_roll < 0.95 {
        PreferredFoot::Left
    } else {
        PreferredFoot::Both
    };

    let mut traits = BTreeSet::new();
    if rng.chance(0.30) {
        if let Some(i) = rng.index(TRAIT_POOL.len()) {
            traits.insert(TRAIT_POOL[i].to_owned());
        }
    }

    let work_rate = |rng: &mut DerivedRng| match rng.index(3) {
        Some(0) => WorkRate::Low,
        Some(1) => WorkRate::Medium,
        _ => WorkRate::High,
    };

    let reputation = (i32::from(team_reputation) + i32::from(roll(rng, 0, 30)) - 15)
        .clamp(1, 100) as u8;

    let mut player = Player {
        id: PlayerId::new(format!("{team_slug}_{suffix}")),
        name: roll_name(rng),
        team_id: team_id.clone(),
        position,
        age,
        pace,
        shooting,
        passing,
        defending,
        physicality,
        form: roll(rng, 40, 60),
        morale: roll(rng, 40, 60),
        fitness: 100,
        reputation,
        potential: 1,
        preferred_foot,
        weak_foot: roll(rng, 2, 5),
        skill_moves: if position.is_attacking() {
            roll(rng, 2, 5)
        } else {
            roll(rng, 1, 4)
        },
        traits,
        attacking_work_rate: work_rate(rng),
        defensive_work_rate: work_rate(rng),
        injured: false,
        injury_weeks_remaining: 0,
        suspended: false,
        suspension_matches_remaining: 0,
        yellow_cards: 0,
        red_cards: 0,
        season_stats: BTreeMap::new(),
        injury_history: Vec::new(),
        awards: Vec::new(),
    };

    // Potential sits above the current rating with age-decayed headroom.
    let overall = player.overall_rating();
    let headroom = 28u8.saturating_sub(age).min(10) * 2;
    player.potential = overall.saturating_add(headroom).min(99).max(overall);
    player
}

fn create_media_outlets(world: &mut World) {
    let outlets = [
        ("fantasy_sports_daily", "Fantasy Sports Daily", "tabloid"),
        ("the_terrace_times", "The Terrace Times", "broadsheet"),
        ("goal_radio", "Goal Radio", "radio"),
        ("pitchside_wire", "Pitchside Wire", "online"),
    ];
    for (id, name, outlet_type) in outlets {
        let outlet_id = MediaOutletId::new(id);
        world.media_outlets.insert(
            outlet_id.clone(),
            MediaOutlet {
                id: outlet_id,
                name: name.to_owned(),
                outlet_type: outlet_type.to_owned(),
                active_stories: Vec::new(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date")
    }

    #[test]
    fn genesis_is_deterministic() {
        let a = create_world(42, date());
        let b = create_world(42, date());
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = create_world(42, date());
        let b = create_world(7, date());
        assert_ne!(a, b);
    }

    #[test]
    fn two_leagues_of_ten() {
        let world = create_world(42, date());
        assert_eq!(world.leagues.len(), 2);
        for league in world.leagues.values() {
            assert_eq!(league.teams.len(), 10);
            assert_eq!(league.total_matchdays, 18);
        }
        assert_eq!(world.teams.len(), 20);
    }

    #[test]
    fn every_squad_can_field_an_eleven() {
        let world = create_world(42, date());
        for team in world.teams.values() {
            let keepers = team
                .squad
                .iter()
                .filter(|id| world.players[*id].position == Position::GK)
                .count();
            let defenders = team
                .squad
                .iter()
                .filter(|id| world.players[*id].position.is_defender())
                .count();
            let forwards = team
                .squad
                .iter()
                .filter(|id| world.players[*id].position.is_forward())
                .count();
            assert!(keepers >= 1, "{}: no keeper", team.id);
            assert!(defenders >= 3, "{}: thin defense", team.id);
            assert!(forwards >= 1, "{}: no forward", team.id);
            assert!(team.squad.len() >= 11);
        }
    }

    #[test]
    fn every_reference_resolves() {
        let world = create_world(42, date());
        for team in world.teams.values() {
            assert!(world.leagues.contains_key(&team.league_id));
            for player_id in &team.squad {
                let player = world.players.get(player_id).expect("player resolves");
                assert_eq!(player.team_id, team.id);
            }
        }
        for owner in world.owners.values() {
            assert!(world.teams.contains_key(&owner.team_id));
        }
        for staff in world.staff.values() {
            assert!(world.teams.contains_key(&staff.team_id));
        }
    }

    #[test]
    fn attribute_invariants_hold() {
        let world = create_world(42, date());
        for player in world.players.values() {
            for attr in [
                player.pace,
                player.shooting,
                player.passing,
                player.defending,
                player.physicality,
            ] {
                assert!((1..=99).contains(&attr));
            }
            assert!(player.potential >= player.overall_rating());
            assert!((1..=5).contains(&player.weak_foot));
            assert!((1..=5).contains(&player.skill_moves));
            assert!((1..=100).contains(&player.reputation));
        }
    }
}
