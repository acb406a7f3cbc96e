use std::time::Duration;

use grid_snake_core::{Command, Direction, EdgePolicy, Event, GameState, GridSize, Position};
use grid_snake_system_scoreboard::{ScoreStyle, Scoreboard};
use grid_snake_world::{self as world, query, Config, World};

fn pump(world: &mut World, scoreboard: &mut Scoreboard, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    scoreboard.handle(&events);
    events
}

fn tick(world: &mut World, scoreboard: &mut Scoreboard) -> Vec<Event> {
    pump(
        world,
        scoreboard,
        Command::Tick {
            dt: Duration::from_millis(150),
        },
    )
}

fn walled_world() -> World {
    World::new(
        Config::new(GridSize::new(6), EdgePolicy::Wall, 3)
            .with_opening_food(Some(Position::new(4, 3))),
    )
}

#[test]
fn eating_updates_the_displayed_score_until_restart() {
    let mut world = walled_world();
    let mut scoreboard = Scoreboard::new(ScoreStyle::Chaotic);
    let _ = pump(
        &mut world,
        &mut scoreboard,
        Command::RequestDirection {
            direction: Direction::Right,
        },
    );

    let events = tick(&mut world, &mut scoreboard);
    assert!(events.contains(&Event::FoodEaten {
        position: Position::new(4, 3),
        score: 1,
    }));
    assert_eq!(scoreboard.displayed(), 23);

    let _ = pump(
        &mut world,
        &mut scoreboard,
        Command::PlaceFood {
            position: Position::new(0, 0),
        },
    );
    let _ = tick(&mut world, &mut scoreboard);
    let _ = tick(&mut world, &mut scoreboard);
    assert_eq!(query::state(&world), GameState::Over);
    assert_eq!(scoreboard.displayed(), 23, "game over keeps the last value");

    let events = pump(&mut world, &mut scoreboard, Command::Restart);
    assert!(events.contains(&Event::GameRestarted));
    assert_eq!(scoreboard.displayed(), 0);
}

#[test]
fn reconfiguring_the_grid_clears_the_display() {
    let mut world = walled_world();
    let mut scoreboard = Scoreboard::new(ScoreStyle::Literal);
    let _ = pump(
        &mut world,
        &mut scoreboard,
        Command::RequestDirection {
            direction: Direction::Right,
        },
    );
    let _ = tick(&mut world, &mut scoreboard);
    assert_eq!(scoreboard.displayed(), 1);

    let _ = pump(
        &mut world,
        &mut scoreboard,
        Command::ConfigureGrid {
            size: GridSize::new(0),
            edge_policy: EdgePolicy::Wrap,
        },
    );
    assert_eq!(scoreboard.displayed(), 1, "rejected sizes keep the session");

    let _ = pump(
        &mut world,
        &mut scoreboard,
        Command::ConfigureGrid {
            size: GridSize::new(10),
            edge_policy: EdgePolicy::Wrap,
        },
    );
    assert_eq!(scoreboard.displayed(), 0);
}
