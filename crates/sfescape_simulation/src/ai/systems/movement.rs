//! Navigation systems: mover → Transform, MoveSpeed анимация.

use bevy::prelude::*;

use crate::ai::brain::EnemyBrain;
use crate::ai::navigation::NavAgent;
use crate::presentation::{AnimationParamChanged, AnimationValue, ANIM_MOVE_SPEED};

/// Минимальная горизонтальная скорость для поворота модели
const FACING_EPSILON: f32 = 1e-4;

/// System: продвинуть movers и синхронизировать Transform
///
/// Mover authoritative для позиции. Поворот — по направлению движения.
pub fn advance_nav_agents(time: Res<Time<Fixed>>, mut agents: Query<(&mut NavAgent, &mut Transform)>) {
    let delta = time.delta_secs();

    for (mut agent, mut transform) in agents.iter_mut() {
        agent.0.advance(delta);
        transform.translation = agent.0.position();

        let velocity = agent.0.velocity();
        let heading = Vec3::new(velocity.x, 0.0, velocity.z);
        if heading.length_squared() > FACING_EPSILON {
            transform.look_to(heading, Vec3::Y);
        }
    }
}

/// System: MoveSpeed = |velocity| / speed (каждый тик)
pub fn update_move_speed_animation(
    agents: Query<(Entity, &NavAgent), With<EnemyBrain>>,
    mut animation: EventWriter<AnimationParamChanged>,
) {
    for (entity, agent) in agents.iter() {
        let speed = agent.0.speed();
        let ratio = if speed > 0.0 {
            agent.0.velocity().length() / speed
        } else {
            0.0
        };

        animation.write(AnimationParamChanged {
            entity,
            name: ANIM_MOVE_SPEED,
            value: AnimationValue::Float(ratio),
        });
    }
}
