//! Power cycle systems — таймер → события → brain.

use bevy::prelude::*;

use super::driver::EnemyBrains;
use crate::ai::components::{EnemyConfig, EnemyTarget};
use crate::ai::events::{PowerStateChanged, TargetPositionBroadcast};
use crate::ai::power::{PowerCycle, PowerSignal};
use crate::scope::CancelScopes;

/// System: тик таймеров усиления
///
/// Power cycle ничего не знает про brain — только пишет события.
pub fn tick_power_cycles(
    time: Res<Time<Fixed>>,
    mut cycles: Query<(Entity, &EnemyConfig, &mut PowerCycle, Option<&EnemyTarget>)>,
    targets: Query<&Transform>,
    mut scopes: ResMut<CancelScopes>,
    mut power_events: EventWriter<PowerStateChanged>,
    mut broadcast_events: EventWriter<TargetPositionBroadcast>,
) {
    let delta = time.delta_secs();

    for (entity, config, mut cycle, target) in cycles.iter_mut() {
        for signal in cycle.tick(config, &mut scopes, delta) {
            match signal {
                PowerSignal::On => {
                    power_events.write(PowerStateChanged { entity, powered: true });
                }
                PowerSignal::Off => {
                    power_events.write(PowerStateChanged { entity, powered: false });
                }
                PowerSignal::Broadcast => {
                    let Some(target_transform) = target.and_then(|target| targets.get(target.0).ok()) else {
                        crate::logger::log_warning(&format!(
                            "Power: {:?} has no target to broadcast, skipped",
                            entity
                        ));
                        continue;
                    };
                    broadcast_events.write(TargetPositionBroadcast {
                        entity,
                        position: target_transform.translation,
                    });
                }
            }
        }
    }
}

/// System: brain реагирует на edge усиления и broadcast позиции
///
/// Порядок: сначала edges, затем broadcasts (On и первый broadcast в одном тике).
pub fn react_to_power_changes(
    mut power_events: EventReader<PowerStateChanged>,
    mut broadcast_events: EventReader<TargetPositionBroadcast>,
    mut brains: EnemyBrains,
) {
    for event in power_events.read() {
        let powered = event.powered;
        brains.drive(event.entity, |brain, ctx| brain.on_power_changed(ctx, powered));
    }

    for event in broadcast_events.read() {
        let position = event.position;
        crate::logger::log(&format!("📡 {:?} target position broadcast: {:?}", event.entity, position));
        brains.drive(event.entity, |brain, ctx| brain.notify_target_position(ctx, position));
    }
}
