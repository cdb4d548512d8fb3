//! EnemyBrains — SystemParam для вызова brain из систем
//!
//! Собирает `EnemyCtx` из компонентов enemy + общих ресурсов,
//! после вызова публикует накопленные переходы как `EnemyStateChanged`.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ai::brain::{EnemyBrain, EnemyCtx};
use crate::ai::components::{EnemyConfig, PatrolRoute};
use crate::ai::events::EnemyStateChanged;
use crate::ai::navigation::NavAgent;
use crate::perception::Perception;
use crate::presentation::{AnimationEvents, AnimationParamChanged};
use crate::scope::CancelScopes;

#[derive(SystemParam)]
pub struct EnemyBrains<'w, 's> {
    pub enemies: Query<
        'w,
        's,
        (
            Entity,
            &'static mut EnemyBrain,
            &'static mut NavAgent,
            &'static EnemyConfig,
            &'static Perception,
            Option<&'static PatrolRoute>,
        ),
    >,
    pub scopes: ResMut<'w, CancelScopes>,
    pub animation: EventWriter<'w, AnimationParamChanged>,
    pub state_changes: EventWriter<'w, EnemyStateChanged>,
}

impl EnemyBrains<'_, '_> {
    /// Read-only доступ к brain
    pub fn brain(&self, entity: Entity) -> Option<&EnemyBrain> {
        self.enemies.get(entity).ok().map(|(_, brain, ..)| brain)
    }

    /// Вызвать brain конкретного enemy. None = entity не enemy (despawned)
    pub fn drive<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut EnemyBrain, &mut EnemyCtx) -> R,
    ) -> Option<R> {
        let Ok((entity, mut brain, mut agent, config, perception, route)) = self.enemies.get_mut(entity) else {
            crate::logger::log_warning(&format!("EnemyBrains: {:?} has no brain, signal ignored", entity));
            return None;
        };

        let mut animation = AnimationEvents {
            entity,
            writer: &mut self.animation,
        };
        let mut ctx = EnemyCtx {
            config,
            nav: &mut *agent.0,
            anim: &mut animation,
            scopes: &mut *self.scopes,
            perception: *perception,
            patrol: route.map(|route| route.points.as_slice()).unwrap_or(&[]),
        };

        let result = f(&mut *brain, &mut ctx);
        publish_transitions(entity, &mut brain, &mut self.state_changes);
        Some(result)
    }

    /// Вызвать brain каждого enemy
    pub fn for_each(&mut self, mut f: impl FnMut(&mut EnemyBrain, &mut EnemyCtx)) {
        for (entity, mut brain, mut agent, config, perception, route) in self.enemies.iter_mut() {
            let mut animation = AnimationEvents {
                entity,
                writer: &mut self.animation,
            };
            let mut ctx = EnemyCtx {
                config,
                nav: &mut *agent.0,
                anim: &mut animation,
                scopes: &mut *self.scopes,
                perception: *perception,
                patrol: route.map(|route| route.points.as_slice()).unwrap_or(&[]),
            };

            f(&mut *brain, &mut ctx);
            publish_transitions(entity, &mut brain, &mut self.state_changes);
        }
    }
}

fn publish_transitions(entity: Entity, brain: &mut EnemyBrain, writer: &mut EventWriter<EnemyStateChanged>) {
    for transition in brain.drain_transitions() {
        crate::logger::log(&format!(
            "AI FSM: {:?} {:?} → {:?}",
            entity, transition.from, transition.to
        ));
        writer.write(EnemyStateChanged {
            entity,
            from: transition.from,
            to: transition.to,
        });
    }
}
