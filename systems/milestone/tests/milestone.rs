use std::time::Duration;

use grid_snake_core::{Command, Direction, Event, GameState, Position};
use grid_snake_system_milestone::{Config, Milestone, MilestoneThreshold};
use grid_snake_world::{self as world, query, World};

fn pump(world: &mut World, milestone: &mut Milestone, command: Command) -> Vec<Event> {
    let mut log = Vec::new();
    let mut pending = vec![command];

    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        milestone.handle(&events, &mut pending);
        log.extend(events);
    }

    log
}

fn eat_at(world: &mut World, milestone: &mut Milestone, position: Position) -> Vec<Event> {
    let _ = pump(world, milestone, Command::PlaceFood { position });
    pump(
        world,
        milestone,
        Command::Tick {
            dt: Duration::from_millis(150),
        },
    )
}

#[test]
fn fixed_threshold_pauses_world_once() {
    let mut world = World::default();
    let mut milestone = Milestone::new(Config::new(MilestoneThreshold::Fixed(2), 1));
    let _ = pump(
        &mut world,
        &mut milestone,
        Command::RequestDirection {
            direction: Direction::Right,
        },
    );

    let first = eat_at(&mut world, &mut milestone, Position::new(11, 10));
    assert!(!first
        .iter()
        .any(|event| matches!(event, Event::MilestoneReached { .. })));
    assert_eq!(query::state(&world), GameState::Running);

    let second = eat_at(&mut world, &mut milestone, Position::new(12, 10));
    assert!(second.contains(&Event::MilestoneReached { score: 2 }));
    assert_eq!(query::state(&world), GameState::Paused);
    assert!(!milestone.is_armed());

    let _ = pump(&mut world, &mut milestone, Command::AcknowledgeMilestone);
    let third = eat_at(&mut world, &mut milestone, Position::new(13, 10));
    assert!(!third
        .iter()
        .any(|event| matches!(event, Event::MilestoneReached { .. })));
    assert_eq!(query::state(&world), GameState::Running);
    assert_eq!(query::score(&world), 3);
}

#[test]
fn random_threshold_stays_within_range_and_rerolls_on_restart() {
    let threshold = MilestoneThreshold::Random { min: 1, max: 6 };
    let mut milestone = Milestone::new(Config::new(threshold, 0xfeed));
    let mut seen = Vec::new();

    for _ in 0..40 {
        let target = milestone.target();
        assert!((1..=6).contains(&target), "target {target} out of range");
        seen.push(target);

        let mut commands = Vec::new();
        milestone.handle(&[Event::GameRestarted], &mut commands);
        assert!(commands.is_empty());
        assert!(milestone.is_armed());
    }

    seen.sort_unstable();
    seen.dedup();
    assert!(seen.len() > 1, "rerolls should vary the target");
}

#[test]
fn same_seed_draws_same_targets() {
    let threshold = MilestoneThreshold::default();
    let mut first = Milestone::new(Config::new(threshold, 42));
    let mut second = Milestone::new(Config::new(threshold, 42));

    for _ in 0..10 {
        assert_eq!(first.target(), second.target());
        let mut sink = Vec::new();
        first.handle(&[Event::GameRestarted], &mut sink);
        second.handle(&[Event::GameRestarted], &mut sink);
    }
}
