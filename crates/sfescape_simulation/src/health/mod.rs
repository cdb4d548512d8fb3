//! Health module — состояние игрока и infection таймер
//!
//! Single writer: только системы этого модуля меняют `HealthCondition`.
//! Остальные (enemy hazards, медицинская станция) шлют `ConditionChangeRequested`.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

pub mod condition;


pub use condition::{ConditionEffect, ConditionMask, HealthCondition, HealthConfig, PlayerCondition, Posture};

use crate::presentation::{SceneTarget, SceneTransitionRequested};

/// Запрос смены состояния игрока
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionChangeRequested {
    pub actor: Entity,
    pub to: PlayerCondition,
}

/// Состояние игрока изменилось
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionChanged {
    pub actor: Entity,
    pub from: PlayerCondition,
    pub to: PlayerCondition,
}

/// Виньетка / звук опасности вкл/выкл
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DangerCuesToggled {
    pub actor: Entity,
    pub enabled: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostureChanged {
    pub actor: Entity,
    pub posture: Posture,
}

/// Прогресс заражения 0..1 (пока идёт рост или decay)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct InfectionRateChanged {
    pub actor: Entity,
    pub rate: f32,
}

/// Writers для side effects смены состояния
#[derive(SystemParam)]
pub struct HealthEvents<'w> {
    pub changed: EventWriter<'w, ConditionChanged>,
    pub danger_cues: EventWriter<'w, DangerCuesToggled>,
    pub posture: EventWriter<'w, PostureChanged>,
    pub scenes: EventWriter<'w, SceneTransitionRequested>,
}

impl HealthEvents<'_> {
    fn publish(&mut self, actor: Entity, from: PlayerCondition, to: PlayerCondition, effects: Vec<ConditionEffect>) {
        if from != to {
            crate::logger::log_info(&format!("🩺 {:?} condition: {:?} → {:?}", actor, from, to));
            self.changed.write(ConditionChanged { actor, from, to });
        }

        for effect in effects {
            match effect {
                ConditionEffect::DangerCues(enabled) => {
                    self.danger_cues.write(DangerCuesToggled { actor, enabled });
                }
                ConditionEffect::Posture(posture) => {
                    self.posture.write(PostureChanged { actor, posture });
                }
                ConditionEffect::GameOver => {
                    self.scenes.write(SceneTransitionRequested {
                        target: SceneTarget::GameOver,
                    });
                }
            }
        }
    }
}

/// System: применить запросы смены состояния (в порядке поступления)
pub fn apply_condition_requests(
    mut requests: EventReader<ConditionChangeRequested>,
    mut actors: Query<&mut HealthCondition>,
    mut events: HealthEvents,
) {
    for request in requests.read() {
        let Ok(mut health) = actors.get_mut(request.actor) else {
            crate::logger::log_warning(&format!(
                "Condition request for {:?} ignored: no HealthCondition",
                request.actor
            ));
            continue;
        };

        let from = health.condition();
        match health.change_condition(request.to) {
            Ok(effects) => events.publish(request.actor, from, request.to, effects),
            Err(err) => crate::logger::log_error(&format!("{:?}: {}", request.actor, err)),
        }
    }
}

/// System: тик infection таймера (рост / decay)
pub fn tick_infection(
    time: Res<Time<Fixed>>,
    mut actors: Query<(Entity, &HealthConfig, &mut HealthCondition)>,
    mut rates: EventWriter<InfectionRateChanged>,
    mut events: HealthEvents,
) {
    let delta = time.delta_secs();

    for (entity, config, mut health) in actors.iter_mut() {
        if !health.is_infection_growing() && !health.is_infection_decaying() {
            continue;
        }

        let from = health.condition();
        let effects = health.tick(config, delta);
        let to = health.condition();

        rates.write(InfectionRateChanged {
            actor: entity,
            rate: health.infection_rate(config),
        });
        events.publish(entity, from, to, effects);
    }
}

/// Health Plugin
///
/// Порядок: запросы смены состояния → тик таймера.
pub struct HealthPlugin;

impl Plugin for HealthPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ConditionChangeRequested>()
            .add_event::<ConditionChanged>()
            .add_event::<DangerCuesToggled>()
            .add_event::<PostureChanged>()
            .add_event::<InfectionRateChanged>();

        app.add_systems(
            FixedUpdate,
            (apply_condition_requests, tick_infection)
                .chain()
                .in_set(crate::SimulationSet::Health),
        );
    }
}
