//! Enemy FSM tick system.

use bevy::prelude::*;

use super::driver::EnemyBrains;

/// System: тик enemy brain (perception interrupt → тело текущего состояния)
pub fn tick_enemy_brains(time: Res<Time<Fixed>>, mut brains: EnemyBrains) {
    let delta = time.delta_secs();
    brains.for_each(|brain, ctx| brain.tick(ctx, delta));
}
