//! Headless симуляция SFEscape
//!
//! Собирает стадию, спавнит игрока и enemy, прогоняет скриптовый сценарий
//! (батарея → зарядка → sub-computer) и печатает переходы FSM.

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use sfescape_simulation::*;

const TICKS: usize = 1800; // ~30s при 60Hz (первый update без тика)

#[derive(Debug, Clone, Copy)]
enum Action {
    Focus(Option<Entity>),
    Press,
    Release,
}

fn main() {
    let seed = 42;
    println!("Starting SFEscape headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    use_fixed_step_updates(&mut app);

    let config = GameConfig::default();
    let stage = match apply_game_config(app.world_mut(), &config) {
        Ok(stage) => stage,
        Err(error) => {
            eprintln!("Config error: {}", error);
            return;
        }
    };

    let player = spawn_player(app.world_mut(), Vec3::new(0.0, 0.0, 3.0), config.health);
    let mut enemy_spawn = EnemySpawn::at(Vec3::new(20.0, 0.0, 20.0));
    enemy_spawn.config = config.enemy.clone();
    enemy_spawn.patrol = vec![Vec3::new(20.0, 0.0, 20.0), Vec3::new(30.0, 0.0, 20.0)];
    enemy_spawn.target = Some(player);
    let enemy = spawn_enemy(app.world_mut(), enemy_spawn);

    let mut state_cursor: EventCursor<EnemyStateChanged> = EventCursor::default();
    let mut quest_cursor: EventCursor<quest::QuestProgressChanged> = EventCursor::default();

    // Скрипт: тик → intent игрока
    let script = [
        (10, Action::Focus(Some(stage.items[0]))),
        (11, Action::Press),
        (20, Action::Focus(Some(stage.charge_station))),
        (21, Action::Press),
        (220, Action::Release),
        (221, Action::Press),
        (230, Action::Focus(Some(stage.sub_computers[0]))),
        (231, Action::Press),
    ];

    for tick in 0..TICKS {
        for (_, action) in script.iter().filter(|(at, _)| *at == tick) {
            let world = app.world_mut();
            match *action {
                Action::Focus(target) => {
                    world.send_event(FocusChanged { actor: player, target });
                }
                Action::Press => {
                    world.send_event(InteractPressed { actor: player });
                }
                Action::Release => {
                    world.send_event(InteractReleased { actor: player });
                }
            }
        }

        app.update();

        let world = app.world();
        for change in state_cursor.read(world.resource::<Events<EnemyStateChanged>>()) {
            println!("Tick {}: enemy {:?} {:?} → {:?}", tick, change.entity, change.from, change.to);
        }
        for change in quest_cursor.read(world.resource::<Events<quest::QuestProgressChanged>>()) {
            println!("Tick {}: quest {}/{}", tick, change.cleared, change.max);
        }

        if tick % 300 == 0 {
            let brain = world.get::<EnemyBrain>(enemy);
            let powered = brain.map(|b| b.is_powered()).unwrap_or(false);
            println!("Tick {}: enemy powered={} entities={}", tick, powered, world.entities().len());
        }
    }

    let outcome = app.world().resource::<SessionOutcome>();
    println!("Simulation complete! outcome={:?}", outcome.ended);
}
