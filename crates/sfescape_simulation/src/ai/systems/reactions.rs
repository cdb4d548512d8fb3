//! AI reaction systems (noise).

use bevy::prelude::*;

use super::driver::EnemyBrains;
use crate::ai::brain::EnemyBrain;
use crate::ai::components::EnemyConfig;
use crate::ai::events::NoiseEmitted;

/// System: enemy слышит шум → SoundChase к источнику
///
/// Skip: сам шумевший, слушатели дальше `hearing_range`.
/// PlayerChase не прерывается (brain сам игнорирует).
pub fn react_to_noise(
    mut noise_events: EventReader<NoiseEmitted>,
    listeners: Query<(Entity, &Transform, &EnemyConfig), With<EnemyBrain>>,
    mut brains: EnemyBrains,
) {
    for noise in noise_events.read() {
        let heard: Vec<Entity> = listeners
            .iter()
            .filter(|(listener, _, _)| noise.source != Some(*listener))
            .filter(|(_, transform, config)| {
                transform.translation.distance(noise.position) <= config.hearing_range
            })
            .map(|(listener, _, _)| listener)
            .collect();

        for listener in heard {
            crate::logger::log(&format!(
                "🔊 {:?} heard noise at {:?}",
                listener, noise.position
            ));
            let position = noise.position;
            brains.drive(listener, |brain, ctx| brain.hear_noise(ctx, position));
        }
    }
}
