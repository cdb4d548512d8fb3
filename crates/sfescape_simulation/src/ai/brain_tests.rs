//! Tests for the enemy brain FSM (no ECS, collaborators in-memory).

#[cfg(test)]
mod tests {
    use super::super::brain::{EnemyBrain, EnemyCtx, StateTransition};
    use super::super::components::{EnemyConfig, EnemyState};
    use super::super::navigation::{NavigationMover, SimpleNavMover};
    use crate::perception::Perception;
    use crate::presentation::{RecordingSink, ANIM_IS_ATTACKING, ANIM_IS_MOVING};
    use crate::scope::CancelScopes;
    use bevy::prelude::*;

    const DT: f32 = 0.25;

    struct Harness {
        brain: EnemyBrain,
        mover: SimpleNavMover,
        sink: RecordingSink,
        scopes: CancelScopes,
        config: EnemyConfig,
        patrol: Vec<Vec3>,
        perception: Perception,
    }

    impl Harness {
        fn new(patrol: Vec<Vec3>) -> Self {
            let mut scopes = CancelScopes::new();
            let root = scopes.open_root();
            Self {
                brain: EnemyBrain::new(root),
                mover: SimpleNavMover::new(Vec3::ZERO, 3.0, Rect::new(-20.0, -20.0, 20.0, 20.0)),
                sink: RecordingSink::default(),
                scopes,
                config: EnemyConfig::default(),
                patrol,
                perception: Perception::blind(),
            }
        }

        fn with_ctx<R>(&mut self, f: impl FnOnce(&mut EnemyBrain, &mut EnemyCtx) -> R) -> R {
            let mut ctx = EnemyCtx {
                config: &self.config,
                nav: &mut self.mover,
                anim: &mut self.sink,
                scopes: &mut self.scopes,
                perception: self.perception,
                patrol: &self.patrol,
            };
            f(&mut self.brain, &mut ctx)
        }

        /// Тик brain + движение mover'а
        fn step(&mut self, dt: f32) {
            self.with_ctx(|brain, ctx| brain.tick(ctx, dt));
            self.mover.advance(dt);
        }

        fn steps(&mut self, count: usize) {
            for _ in 0..count {
                self.step(DT);
            }
        }

        fn see_target_at(&mut self, position: Vec3) {
            let distance = position.distance(self.mover.position());
            self.perception = Perception {
                target_visible: true,
                target_position: Some(position),
                target_distance: Some(distance),
            };
        }

        fn lose_sight_at(&mut self, position: Vec3) {
            let distance = position.distance(self.mover.position());
            self.perception = Perception {
                target_visible: false,
                target_position: Some(position),
                target_distance: Some(distance),
            };
        }
    }

    #[test]
    fn test_starts_idle_and_patrols_after_dwell() {
        let mut h = Harness::new(vec![Vec3::new(5.0, 0.0, 0.0)]);

        // 11 × 0.25 = 2.75s — ещё Idle
        h.steps(11);
        assert_eq!(h.brain.state(), EnemyState::Idle);
        assert!(h.mover.is_stopped());

        // 3.0s — Patrol
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::Patrol);
        assert!(!h.mover.is_stopped());
        assert_eq!(h.mover.destination(), Some(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(h.sink.last_bool(ANIM_IS_MOVING), Some(true));
    }

    #[test]
    fn test_visible_target_preempts_idle_dwell() {
        let mut h = Harness::new(vec![Vec3::new(5.0, 0.0, 0.0)]);

        // t = 1.0s
        h.steps(4);
        assert_eq!(h.brain.state(), EnemyState::Idle);

        h.see_target_at(Vec3::new(0.0, 0.0, -4.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);

        let transitions = h.brain.drain_transitions();
        assert_eq!(
            transitions,
            vec![StateTransition {
                from: EnemyState::Idle,
                to: EnemyState::PlayerChase
            }]
        );
    }

    #[test]
    fn test_visible_target_interrupts_every_state() {
        for start in [EnemyState::Patrol, EnemyState::SoundChase, EnemyState::PoweredChase, EnemyState::Attack] {
            let mut h = Harness::new(vec![Vec3::new(5.0, 0.0, 0.0)]);
            h.with_ctx(|brain, ctx| {
                brain.tick(ctx, 0.0);
                brain.change_state(ctx, start);
            });
            assert_eq!(h.brain.state(), start);

            h.see_target_at(Vec3::new(0.0, 0.0, -3.0));
            h.step(DT);
            assert_eq!(h.brain.state(), EnemyState::PlayerChase, "from {:?}", start);
        }
    }

    #[test]
    fn test_patrol_advances_waypoint_through_idle() {
        let first = Vec3::new(1.0, 0.0, 0.0);
        let second = Vec3::new(-1.0, 0.0, 0.0);
        let mut h = Harness::new(vec![first, second]);

        h.steps(12);
        assert_eq!(h.brain.state(), EnemyState::Patrol);
        assert_eq!(h.mover.destination(), Some(first));

        // 3 m/s × 0.25 = 0.75 за тик: через тик до точки 0.25 < 0.5
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::Idle);
        assert_eq!(h.brain.patrol_index(), 1);

        h.steps(12);
        assert_eq!(h.brain.state(), EnemyState::Patrol);
        assert_eq!(h.mover.destination(), Some(second));
    }

    #[test]
    fn test_patrol_index_wraps_around() {
        let only = Vec3::new(0.25, 0.0, 0.0);
        let mut h = Harness::new(vec![only]);

        h.steps(12);
        assert_eq!(h.brain.state(), EnemyState::Patrol);
        h.steps(2);
        assert_eq!(h.brain.state(), EnemyState::Idle);
        assert_eq!(h.brain.patrol_index(), 0);
    }

    #[test]
    fn test_player_chase_lost_returns_to_idle_when_normal() {
        let mut h = Harness::new(vec![]);
        h.see_target_at(Vec3::new(0.0, 0.0, -5.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);

        h.lose_sight_at(Vec3::new(0.0, 0.0, -15.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::Idle);
    }

    #[test]
    fn test_player_chase_within_range_keeps_chasing() {
        let mut h = Harness::new(vec![]);
        h.see_target_at(Vec3::new(0.0, 0.0, -5.0));
        h.step(DT);

        // Не видим, но ближе miss_player_range
        h.lose_sight_at(Vec3::new(0.0, 0.0, -8.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);
        assert_eq!(h.mover.destination(), Some(Vec3::new(0.0, 0.0, -8.0)));
    }

    #[test]
    fn test_player_chase_lost_while_powered_goes_powered_chase() {
        let mut h = Harness::new(vec![]);
        h.see_target_at(Vec3::new(0.0, 0.0, -5.0));
        h.step(DT);
        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, true));
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);

        h.lose_sight_at(Vec3::new(0.0, 0.0, -15.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::PoweredChase);
    }

    #[test]
    fn test_power_on_while_chasing_unseen_target_goes_powered_chase() {
        let mut h = Harness::new(vec![]);
        h.see_target_at(Vec3::new(0.0, 0.0, -5.0));
        h.step(DT);

        // Цель вне FOV, но ещё в miss_player_range → PlayerChase держится
        h.lose_sight_at(Vec3::new(0.0, 0.0, -8.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);

        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, true));
        assert_eq!(h.brain.state(), EnemyState::PoweredChase);
        assert!(h.brain.aura_active());
    }

    #[test]
    fn test_power_on_and_off_cycle() {
        let mut h = Harness::new(vec![]);
        h.step(DT);

        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, true));
        assert_eq!(h.brain.state(), EnemyState::PoweredChase);
        assert!(h.brain.is_powered());
        assert!(h.brain.aura_active());
        assert!((h.mover.speed() - 3.6).abs() < 1e-5);

        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, false));
        assert_eq!(h.brain.state(), EnemyState::Idle);
        assert!(!h.brain.aura_active());
        assert_eq!(h.mover.speed(), 3.0);
    }

    #[test]
    fn test_power_off_while_target_visible_keeps_chase_and_speed() {
        let mut h = Harness::new(vec![]);
        h.see_target_at(Vec3::new(0.0, 0.0, -5.0));
        h.step(DT);
        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, true));

        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, false));
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);
        assert!(!h.brain.aura_active());
        assert!((h.mover.speed() - 3.6).abs() < 1e-5);

        // Потеряли цель без усиления → Idle, обычная скорость
        h.lose_sight_at(Vec3::new(0.0, 0.0, -15.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::Idle);
        assert_eq!(h.mover.speed(), 3.0);
    }

    #[test]
    fn test_broadcast_retargets_powered_chase() {
        let mut h = Harness::new(vec![]);
        h.step(DT);
        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, true));

        let broadcast = Vec3::new(6.0, 0.0, 2.0);
        h.with_ctx(|brain, ctx| brain.notify_target_position(ctx, broadcast));
        assert_eq!(h.brain.last_known_target(), Some(broadcast));

        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::PoweredChase);
        assert_eq!(h.mover.destination(), Some(broadcast));
    }

    #[test]
    fn test_broadcast_does_not_interrupt_player_chase() {
        let mut h = Harness::new(vec![]);
        h.see_target_at(Vec3::new(0.0, 0.0, -5.0));
        h.step(DT);

        h.with_ctx(|brain, ctx| brain.notify_target_position(ctx, Vec3::new(3.0, 0.0, 3.0)));
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);
        assert_eq!(h.brain.last_known_target(), Some(Vec3::new(3.0, 0.0, 3.0)));
    }

    #[test]
    fn test_sound_chase_reaches_noise_then_idles() {
        let mut h = Harness::new(vec![]);
        h.step(DT);

        h.with_ctx(|brain, ctx| brain.hear_noise(ctx, Vec3::new(1.5, 0.0, 0.0)));
        assert_eq!(h.brain.state(), EnemyState::SoundChase);

        // 1.5м при 0.75м/тик
        h.steps(3);
        assert_eq!(h.brain.state(), EnemyState::Idle);
    }

    #[test]
    fn test_sound_chase_while_powered_returns_to_powered_chase() {
        let mut h = Harness::new(vec![]);
        h.step(DT);
        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, true));

        h.with_ctx(|brain, ctx| brain.hear_noise(ctx, Vec3::new(0.5, 0.0, 0.0)));
        assert_eq!(h.brain.state(), EnemyState::SoundChase);

        h.steps(2);
        assert_eq!(h.brain.state(), EnemyState::PoweredChase);
    }

    #[test]
    fn test_attack_lasts_one_second_then_idle() {
        let mut h = Harness::new(vec![]);
        h.step(DT);

        h.with_ctx(|brain, ctx| brain.begin_attack(ctx));
        assert_eq!(h.brain.state(), EnemyState::Attack);
        assert!(h.mover.is_stopped());
        assert_eq!(h.sink.last_bool(ANIM_IS_ATTACKING), Some(true));

        h.steps(3);
        assert_eq!(h.brain.state(), EnemyState::Attack);

        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::Idle);
        assert_eq!(h.sink.last_bool(ANIM_IS_ATTACKING), Some(false));
    }

    #[test]
    fn test_transition_replaces_body_scope() {
        let mut h = Harness::new(vec![]);
        h.step(DT);
        let idle_scope = h.brain.body_scope().unwrap();

        h.with_ctx(|brain, ctx| brain.begin_attack(ctx));
        let attack_scope = h.brain.body_scope().unwrap();

        assert_ne!(idle_scope, attack_scope);
        assert!(!h.scopes.is_live(idle_scope));
        assert!(h.scopes.is_live(attack_scope));
    }

    #[test]
    fn test_cancelled_root_stops_all_side_effects() {
        let mut h = Harness::new(vec![Vec3::new(5.0, 0.0, 0.0)]);
        h.step(DT);
        let root = h.brain.root_scope();
        h.scopes.cancel(root);

        let recorded = h.sink.animation.len();
        h.steps(20);
        h.see_target_at(Vec3::new(0.0, 0.0, -3.0));
        h.step(DT);
        h.with_ctx(|brain, ctx| brain.on_power_changed(ctx, true));

        assert_eq!(h.brain.state(), EnemyState::Idle);
        assert_eq!(h.sink.animation.len(), recorded);
        assert_eq!(h.mover.destination(), None);
    }

    #[test]
    fn test_navigation_failure_aborts_tick_but_keeps_machine_alive() {
        let mut h = Harness::new(vec![Vec3::new(5.0, 0.0, 0.0)]);
        // Mover далеко за navigable областью
        h.mover = SimpleNavMover::new(Vec3::new(30.0, 0.0, 0.0), 3.0, Rect::new(-20.0, -20.0, 20.0, 20.0));

        h.steps(12);
        assert_eq!(h.brain.state(), EnemyState::Patrol);
        assert_eq!(h.mover.destination(), None);

        // Машина жива: interrupt всё ещё работает
        h.see_target_at(Vec3::new(25.0, 0.0, 0.0));
        h.step(DT);
        assert_eq!(h.brain.state(), EnemyState::PlayerChase);
    }

    #[test]
    fn test_off_navmesh_mover_is_snapped_before_destination() {
        let mut h = Harness::new(vec![Vec3::new(5.0, 0.0, 0.0)]);
        h.mover = SimpleNavMover::new(Vec3::new(20.5, 0.0, 0.0), 3.0, Rect::new(-20.0, -20.0, 20.0, 20.0));

        h.steps(12);
        assert_eq!(h.brain.state(), EnemyState::Patrol);
        assert!(h.mover.is_on_navigable_surface());
        assert_eq!(h.mover.destination(), Some(Vec3::new(5.0, 0.0, 0.0)));
    }
}
