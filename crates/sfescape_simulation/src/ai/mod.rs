//! Enemy AI module
//!
//! Tick-driven FSM (`EnemyBrain`) + power cycle + perception.
//! Brain не знает про ECS: системы собирают `EnemyCtx` и вызывают его методы.

use bevy::prelude::*;

pub mod brain;
pub mod components;
pub mod events;
pub mod navigation;
pub mod power;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod brain_tests;

// Re-export основных типов
pub use brain::{EnemyBrain, EnemyCtx, StateTransition};
pub use components::{Enemy, EnemyConfig, EnemyState, EnemyTarget, HazardContacts, PatrolRoute};
pub use events::{EnemyAttackLanded, EnemyStateChanged, NoiseEmitted, PowerStateChanged, TargetPositionBroadcast};
pub use navigation::{ensure_navigable, NavAgent, NavigationMover, SimpleNavMover};
pub use power::{PowerCycle, PowerSignal};

/// AI Plugin
///
/// Регистрирует enemy системы в FixedUpdate (SimulationSet::Enemy).
/// Порядок выполнения:
/// 1. update_enemy_perception — видимость цели
/// 2. tick_power_cycles — таймер усиления → PowerStateChanged / TargetPositionBroadcast
/// 3. react_to_power_changes — brain реагирует на усиление
/// 4. react_to_noise — шум → SoundChase
/// 5. tick_enemy_brains — тик FSM
/// 6. advance_nav_agents — движение movers → Transform
/// 7. update_move_speed_animation — MoveSpeed
/// 8. detect_enemy_hazards — aura / attack контакты
/// 9. enemy_audio_cues — BGM и крик
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemyStateChanged>()
            .add_event::<PowerStateChanged>()
            .add_event::<TargetPositionBroadcast>()
            .add_event::<NoiseEmitted>()
            .add_event::<EnemyAttackLanded>();

        app.add_systems(
            FixedUpdate,
            (
                systems::update_enemy_perception,
                systems::tick_power_cycles,
                systems::react_to_power_changes,
                systems::react_to_noise,
                systems::tick_enemy_brains,
                systems::advance_nav_agents,
                systems::update_move_speed_animation,
                systems::detect_enemy_hazards,
                systems::enemy_audio_cues,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(crate::SimulationSet::Enemy),
        );
    }
}
