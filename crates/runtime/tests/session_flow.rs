use std::time::Duration;

use tactics_core::{
    ActionResolver, ActorDefinition, BasicAttackAction, BattleEnv, BattleMap, BattleOutcome,
    CastSkillAction, EntityId, FailureReason, PeriodicEffectPolicy, Position3, ReplayRunner,
    ResolutionCode, SkillId, SkillPolicy, TeamId,
};
use tactics_runtime::{BattleSession, SessionConfig, SessionError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn actor(id: u32, team: u32, x: i32, hp: i32, rapidity: i32) -> ActorDefinition {
    ActorDefinition::new(
        EntityId(id),
        TeamId(team),
        Position3::new(x, 0, 0),
        hp,
        3,
        rapidity,
    )
}

#[test]
fn duel_runs_to_victory_and_replays_exactly() {
    init_tracing();
    let map = BattleMap::legacy();
    let roster = [actor(1, 1, 0, 20, 9), actor(2, 2, 1, 3, 1)];
    let mut session =
        BattleSession::start(BattleEnv::new(&map), &roster, SessionConfig::new(2024)).unwrap();

    for _ in 0..200 {
        if session.outcome().is_battle_over() {
            break;
        }
        if session.current_actor() == Some(EntityId(1)) && session.remaining_actions() > 0 {
            session
                .submit(BasicAttackAction::new(EntityId(1), EntityId(2)))
                .unwrap();
        } else {
            session.end_turn().unwrap();
        }
    }

    assert_eq!(session.outcome(), BattleOutcome::Victory(TeamId(1)));
    assert!(!session.turns().is_active(EntityId(2)));
    let err = session.end_turn().unwrap_err();
    assert!(matches!(err, SessionError::BattleOver(BattleOutcome::Victory(_))));

    let final_snapshot = session.state().create_snapshot();
    let events = session.state().events().len();
    let record = session.into_replay().unwrap();
    assert_eq!(record.len(), events);

    let runner = ReplayRunner::new(ActionResolver::new(BattleEnv::new(&map)));
    let run = runner.verify(&record).unwrap();
    assert_eq!(run.state.create_snapshot(), final_snapshot);
}

#[test]
fn timeout_ends_the_turn_with_upkeep() {
    init_tracing();
    let map = BattleMap::legacy();
    let roster = [actor(1, 1, 0, 20, 9), actor(2, 2, 4, 20, 1)];
    let config = SessionConfig::new(5).with_turn_time_limit(Duration::from_secs(10));
    let mut session = BattleSession::start(BattleEnv::new(&map), &roster, config).unwrap();

    assert_eq!(session.poll_timeout(Duration::from_secs(5)).unwrap(), None);

    let step = session
        .poll_timeout(Duration::from_secs(10))
        .unwrap()
        .expect("limit reached");
    assert_eq!(step.resolution.code, ResolutionCode::Rejected);
    assert_eq!(step.resolution.failure_reason, FailureReason::TurnTimedOut);
    assert_eq!(step.current_actor, Some(EntityId(2)));
    assert_eq!(step.remaining_actions, 2);
    assert_eq!(step.outcome, BattleOutcome::Ongoing);
}

#[test]
fn poisoned_actor_dies_at_turn_start_and_is_skipped() {
    init_tracing();
    let map = BattleMap::legacy();
    let roster = [
        actor(1, 1, 0, 20, 9),
        actor(2, 2, 2, 10, 5),
        actor(3, 2, 6, 20, 1),
    ];
    let mut session =
        BattleSession::start(BattleEnv::new(&map), &roster, SessionConfig::new(77)).unwrap();

    let venom = SkillPolicy {
        periodic_effect: Some(PeriodicEffectPolicy::poison(10, 2)),
        ..SkillPolicy::new(SkillId(4), 1, 3, 0)
    };
    let step = session
        .submit(CastSkillAction::new(EntityId(1), EntityId(2), venom))
        .unwrap();
    assert!(step.resolution.success, "{:?}", step.resolution);
    assert_eq!(step.remaining_actions, 1);

    let step = session.end_turn().unwrap();
    assert_eq!(step.current_actor, Some(EntityId(3)));
    assert_eq!(session.state().hit_points(EntityId(2)), Some(0));
    assert!(!session.turns().is_active(EntityId(2)));
    assert_eq!(session.outcome(), BattleOutcome::Ongoing);
}

#[test]
fn budget_runs_out_until_the_turn_ends() {
    let map = BattleMap::legacy();
    let roster = [actor(1, 1, 0, 20, 9), actor(2, 2, 5, 20, 1)];
    let config = SessionConfig::new(3).with_actions_per_turn(1);
    let mut session = BattleSession::start(BattleEnv::new(&map), &roster, config).unwrap();

    let step = session
        .submit(tactics_core::MoveAction::new(
            EntityId(1),
            Position3::new(0, 0, 0),
            Position3::new(1, 0, 0),
        ))
        .unwrap();
    assert!(step.resolution.success);
    assert_eq!(step.remaining_actions, 0);

    let err = session
        .submit(tactics_core::MoveAction::new(
            EntityId(1),
            Position3::new(1, 0, 0),
            Position3::new(2, 0, 0),
        ))
        .unwrap_err();
    assert!(matches!(err, SessionError::Turn(_)));

    session.end_turn().unwrap();
    assert_eq!(session.current_actor(), Some(EntityId(2)));
    assert_eq!(session.turns().round(), 1);
    session.end_turn().unwrap();
    assert_eq!(session.current_actor(), Some(EntityId(1)));
    assert_eq!(session.turns().round(), 2);
}
