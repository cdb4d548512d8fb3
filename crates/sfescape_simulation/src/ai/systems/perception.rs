//! Perception system — заполняет `Perception` каждого enemy.

use bevy::prelude::*;

use crate::ai::components::{Enemy, EnemyConfig, EnemyTarget};
use crate::perception::{can_see_target, ObstacleMap, Perception};

/// System: видимость цели (distance → FOV → line of sight)
///
/// Пишет и позицию/дистанцию цели даже когда она не видна:
/// PlayerChase по ним решает "потерял / нет".
pub fn update_enemy_perception(
    mut enemies: Query<(&Transform, &EnemyConfig, Option<&EnemyTarget>, &mut Perception), With<Enemy>>,
    targets: Query<&Transform>,
    obstacles: Res<ObstacleMap>,
) {
    for (transform, config, target, mut perception) in enemies.iter_mut() {
        let Some(target_transform) = target.and_then(|target| targets.get(target.0).ok()) else {
            *perception = Perception::blind();
            continue;
        };

        let position = transform.translation;
        let target_position = target_transform.translation;

        let visible = can_see_target(
            position,
            *transform.forward(),
            target_position,
            config.detection_range,
            config.half_fov(),
            config.obstacle_mask,
            &*obstacles,
        );

        *perception = Perception {
            target_visible: visible,
            target_position: Some(target_position),
            target_distance: Some(position.distance(target_position)),
        };
    }
}
