//! Enemy hazards: infection aura и атака (edge-trigger контакты с целью).

use bevy::prelude::*;

use super::driver::EnemyBrains;
use crate::ai::components::{Enemy, EnemyConfig, EnemyTarget, HazardContacts};
use crate::ai::events::EnemyAttackLanded;
use crate::health::{ConditionChangeRequested, HealthCondition, PlayerCondition};

/// System: контакты enemy с целью
///
/// Срабатывает на вход в радиус (как trigger enter):
/// - aura (только powered): Normal → Infected
/// - attack range: begin_attack + Normal → CriticalNormal / Infected → CriticalInfected
///
/// Условие цели меняет только health система (через ConditionChangeRequested).
pub fn detect_enemy_hazards(
    mut enemies: Query<(Entity, &Transform, &EnemyConfig, &EnemyTarget, &mut HazardContacts), With<Enemy>>,
    targets: Query<(&Transform, Option<&HealthCondition>), Without<Enemy>>,
    mut brains: EnemyBrains,
    mut condition_requests: EventWriter<ConditionChangeRequested>,
    mut attack_events: EventWriter<EnemyAttackLanded>,
) {
    for (entity, transform, config, target, mut contacts) in enemies.iter_mut() {
        let Ok((target_transform, health)) = targets.get(target.0) else {
            *contacts = HazardContacts::default();
            continue;
        };

        let distance = transform.translation.distance(target_transform.translation);
        let condition = health.map(HealthCondition::condition);

        // Infection aura
        let aura_active = brains.brain(entity).is_some_and(|brain| brain.aura_active());
        let in_aura = aura_active && distance <= config.aura_radius;
        if in_aura && !contacts.in_aura && condition == Some(PlayerCondition::Normal) {
            crate::logger::log(&format!("☣️ {:?} caught in infection aura of {:?}", target.0, entity));
            condition_requests.write(ConditionChangeRequested {
                actor: target.0,
                to: PlayerCondition::Infected,
            });
        }
        contacts.in_aura = in_aura;

        // Attack contact
        let in_attack_range = distance <= config.attack_range;
        if in_attack_range && !contacts.in_attack_range {
            brains.drive(entity, |brain, ctx| brain.begin_attack(ctx));
            attack_events.write(EnemyAttackLanded {
                enemy: entity,
                target: target.0,
            });

            let critical = match condition {
                Some(PlayerCondition::Normal) => Some(PlayerCondition::CriticalNormal),
                Some(PlayerCondition::Infected) => Some(PlayerCondition::CriticalInfected),
                _ => None,
            };
            if let Some(to) = critical {
                crate::logger::log_info(&format!("💥 {:?} struck {:?} → {:?}", entity, target.0, to));
                condition_requests.write(ConditionChangeRequested { actor: target.0, to });
            }
        }
        contacts.in_attack_range = in_attack_range;
    }
}
