//! Enemy brain — tick-driven FSM
//!
//! Каждое состояние: `on_enter` / `on_tick(dt)` / `on_exit`.
//! "Подождать N секунд" = countdown поле в `StateBody`.
//!
//! Правила:
//! - Видимость цели проверяется первой, каждый тик, в любом состоянии
//! - `change_state` защищён re-entrancy флагом: запрос во время перехода отбрасывается
//! - Тело состояния живёт в child scope от root scope enemy. Переход:
//!   on_exit старого → cancel его scope → новый scope → on_enter нового
//! - Каждый on_tick сначала проверяет что его scope жив (despawn = отмена)

use bevy::prelude::*;

use super::components::{EnemyConfig, EnemyState};
use super::navigation::{ensure_navigable, NavigationMover};
use crate::perception::Perception;
use crate::presentation::{AnimationSink, ANIM_IS_ATTACKING, ANIM_IS_MOVING};
use crate::scope::{CancelScopes, ScopeId};

/// Всё что нужно brain на один вызов (collaborators + snapshot perception)
pub struct EnemyCtx<'a> {
    pub config: &'a EnemyConfig,
    pub nav: &'a mut dyn NavigationMover,
    pub anim: &'a mut dyn AnimationSink,
    pub scopes: &'a mut CancelScopes,
    pub perception: Perception,
    pub patrol: &'a [Vec3],
}

/// Переход FSM (outbox → EnemyStateChanged events)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: EnemyState,
    pub to: EnemyState,
}

/// Payload активного состояния
#[derive(Debug, Clone, Copy, PartialEq)]
enum StateBody {
    Idle { remaining: f32 },
    /// destination_set = false → navigation не удалась, повторяем на тике
    Patrol { destination_set: bool },
    PlayerChase,
    SoundChase,
    PoweredChase,
    Attack { remaining: f32 },
}

/// Component: enemy behavior state machine
#[derive(Component, Debug)]
pub struct EnemyBrain {
    state: EnemyState,
    body: StateBody,
    root_scope: ScopeId,
    body_scope: Option<ScopeId>,
    transitioning: bool,
    patrol_index: usize,
    powered: bool,
    aura_active: bool,
    last_known_target: Option<Vec3>,
    transitions: Vec<StateTransition>,
}

impl EnemyBrain {
    /// `root_scope` — scope владельца (обычно `CancelScopes::open_owned(entity)`)
    pub fn new(root_scope: ScopeId) -> Self {
        Self {
            state: EnemyState::Idle,
            body: StateBody::Idle { remaining: 0.0 },
            root_scope,
            body_scope: None,
            transitioning: false,
            patrol_index: 0,
            powered: false,
            aura_active: false,
            last_known_target: None,
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Infection aura включена (только в powered режиме)
    pub fn aura_active(&self) -> bool {
        self.aura_active
    }

    pub fn last_known_target(&self) -> Option<Vec3> {
        self.last_known_target
    }

    pub fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    pub fn root_scope(&self) -> ScopeId {
        self.root_scope
    }

    pub fn body_scope(&self) -> Option<ScopeId> {
        self.body_scope
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Забрать накопленные переходы (для EnemyStateChanged событий)
    pub fn drain_transitions(&mut self) -> Vec<StateTransition> {
        std::mem::take(&mut self.transitions)
    }

    /// Один тик FSM
    pub fn tick(&mut self, ctx: &mut EnemyCtx, dt: f32) {
        if !ctx.scopes.is_live(self.root_scope) {
            return;
        }
        self.ensure_started(ctx);

        // Highest priority interrupt: цель видна → PlayerChase
        if ctx.perception.target_visible && self.state != EnemyState::PlayerChase {
            self.change_state(ctx, EnemyState::PlayerChase);
            return;
        }

        let Some(scope) = self.body_scope else {
            return;
        };
        if !ctx.scopes.is_live(scope) {
            return;
        }

        self.on_tick(ctx, dt);
    }

    /// Переход в новое состояние. false = отброшен (тот же state / идёт переход / scope мёртв)
    pub fn change_state(&mut self, ctx: &mut EnemyCtx, next: EnemyState) -> bool {
        if self.state == next && self.body_scope.is_some() {
            return false;
        }
        if self.transitioning {
            crate::logger::log(&format!(
                "Enemy FSM: transition {:?} → {:?} dropped (transition in progress)",
                self.state, next
            ));
            return false;
        }
        if !ctx.scopes.is_live(self.root_scope) {
            return false;
        }

        self.transitioning = true;
        let previous = self.state;

        // Барьер: старое тело отменено до первого side effect нового
        if self.body_scope.is_some() {
            self.on_exit(ctx);
        }
        if let Some(scope) = self.body_scope.take() {
            ctx.scopes.cancel(scope);
        }

        self.state = next;
        self.body_scope = Some(ctx.scopes.open_child(self.root_scope));
        self.on_enter(ctx);

        if previous != next {
            self.transitions.push(StateTransition { from: previous, to: next });
        }
        self.transitioning = false;
        true
    }

    /// PowerState signal (On/Off edge)
    pub fn on_power_changed(&mut self, ctx: &mut EnemyCtx, powered: bool) {
        if !ctx.scopes.is_live(self.root_scope) {
            return;
        }
        self.ensure_started(ctx);

        self.powered = powered;
        if powered {
            ctx.nav.set_speed(ctx.config.powered_speed());
            self.aura_active = true;
            let next = if ctx.perception.target_visible {
                EnemyState::PlayerChase
            } else {
                EnemyState::PoweredChase
            };
            self.change_state(ctx, next);
        } else {
            self.aura_active = false;
            if !ctx.perception.target_visible {
                ctx.nav.set_speed(ctx.config.normal_speed);
                self.change_state(ctx, EnemyState::Idle);
            }
        }
    }

    /// Broadcast позиции цели (каждые notification_interval секунд в powered режиме)
    pub fn notify_target_position(&mut self, ctx: &mut EnemyCtx, position: Vec3) {
        if !ctx.scopes.is_live(self.root_scope) {
            return;
        }
        self.ensure_started(ctx);

        self.last_known_target = Some(position);
        if self.state != EnemyState::PlayerChase {
            self.change_state(ctx, EnemyState::PoweredChase);
        }
    }

    /// Услышали шум → идём проверить источник
    pub fn hear_noise(&mut self, ctx: &mut EnemyCtx, position: Vec3) {
        if !ctx.scopes.is_live(self.root_scope) {
            return;
        }
        self.ensure_started(ctx);

        self.last_known_target = Some(position);
        if self.state != EnemyState::PlayerChase {
            self.change_state(ctx, EnemyState::SoundChase);
        }
    }

    /// Контакт атаки с целью
    pub fn begin_attack(&mut self, ctx: &mut EnemyCtx) {
        if !ctx.scopes.is_live(self.root_scope) {
            return;
        }
        self.ensure_started(ctx);
        self.change_state(ctx, EnemyState::Attack);
    }

    /// Первый вход в Idle (без записи перехода)
    fn ensure_started(&mut self, ctx: &mut EnemyCtx) {
        if self.body_scope.is_some() {
            return;
        }
        ctx.nav.set_speed(ctx.config.normal_speed);
        self.change_state(ctx, EnemyState::Idle);
    }

    fn on_enter(&mut self, ctx: &mut EnemyCtx) {
        ctx.anim.set_bool(ANIM_IS_MOVING, self.state.is_moving());

        self.body = match self.state {
            EnemyState::Idle => {
                crate::logger::log("Idle: scanning surroundings...");
                ctx.nav.stop(true);
                if !self.powered {
                    ctx.nav.set_speed(ctx.config.normal_speed);
                }
                StateBody::Idle {
                    remaining: ctx.config.idle_dwell,
                }
            }
            EnemyState::Patrol => {
                crate::logger::log("Patrol: walking the route...");
                ctx.nav.stop(false);
                StateBody::Patrol {
                    destination_set: self.route_to_waypoint(ctx),
                }
            }
            EnemyState::PlayerChase => {
                crate::logger::log("PlayerChase: chasing the target directly");
                ctx.nav.stop(false);
                StateBody::PlayerChase
            }
            EnemyState::SoundChase => {
                crate::logger::log("SoundChase: investigating noise");
                ctx.nav.stop(false);
                StateBody::SoundChase
            }
            EnemyState::PoweredChase => {
                crate::logger::log("PoweredChase: chasing last broadcast position");
                ctx.nav.stop(false);
                StateBody::PoweredChase
            }
            EnemyState::Attack => {
                crate::logger::log("Attack: striking");
                ctx.nav.stop(true);
                ctx.anim.set_bool(ANIM_IS_ATTACKING, true);
                StateBody::Attack {
                    remaining: ctx.config.attack_duration,
                }
            }
        };
    }

    fn on_exit(&mut self, ctx: &mut EnemyCtx) {
        if let StateBody::Attack { .. } = self.body {
            ctx.anim.set_bool(ANIM_IS_ATTACKING, false);
        }
    }

    fn on_tick(&mut self, ctx: &mut EnemyCtx, dt: f32) {
        match self.body {
            StateBody::Idle { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.change_state(ctx, EnemyState::Patrol);
                } else {
                    self.body = StateBody::Idle { remaining };
                }
            }

            StateBody::Patrol { destination_set } => {
                if !destination_set {
                    let destination_set = self.route_to_waypoint(ctx);
                    self.body = StateBody::Patrol { destination_set };
                    return;
                }
                if !self.navigable(ctx) {
                    return;
                }
                if ctx.nav.remaining_distance_below(ctx.config.arrival_threshold) {
                    // Следующая точка, но через Idle (пауза на каждой точке)
                    self.patrol_index = (self.patrol_index + 1) % ctx.patrol.len().max(1);
                    crate::logger::log(&format!("Patrol: next waypoint #{}", self.patrol_index));
                    self.change_state(ctx, EnemyState::Idle);
                }
            }

            StateBody::PlayerChase => {
                if !self.navigable(ctx) {
                    return;
                }
                let (Some(target), Some(distance)) =
                    (ctx.perception.target_position, ctx.perception.target_distance)
                else {
                    crate::logger::log_warning("PlayerChase: no target to chase");
                    return;
                };

                ctx.nav.set_destination(target);

                if distance > ctx.config.miss_player_range {
                    crate::logger::log("PlayerChase: target lost");
                    let next = self.fallback_state();
                    self.change_state(ctx, next);
                }
            }

            StateBody::PoweredChase => {
                if !self.navigable(ctx) {
                    return;
                }
                if ctx.perception.target_visible {
                    self.change_state(ctx, EnemyState::PlayerChase);
                    return;
                }
                if let Some(position) = self.last_known_target {
                    ctx.nav.set_destination(position);
                }
            }

            StateBody::SoundChase => {
                if !self.navigable(ctx) {
                    return;
                }
                if ctx.perception.target_visible {
                    self.change_state(ctx, EnemyState::PlayerChase);
                    return;
                }
                let Some(position) = self.last_known_target else {
                    crate::logger::log_warning("SoundChase: no position to investigate");
                    let next = self.fallback_state();
                    self.change_state(ctx, next);
                    return;
                };

                ctx.nav.set_destination(position);

                if ctx.nav.remaining_distance_below(ctx.config.arrival_threshold) {
                    let next = self.fallback_state();
                    self.change_state(ctx, next);
                }
            }

            StateBody::Attack { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.change_state(ctx, EnemyState::Idle);
                } else {
                    self.body = StateBody::Attack { remaining };
                }
            }
        }
    }

    /// Куда идти после потери цели / достижения точки
    fn fallback_state(&self) -> EnemyState {
        if self.powered {
            EnemyState::PoweredChase
        } else {
            EnemyState::Idle
        }
    }

    /// Navigation precondition. false = тик тела прерван (ошибка залогирована)
    fn navigable(&self, ctx: &mut EnemyCtx) -> bool {
        match ensure_navigable(ctx.nav, ctx.config.navmesh_snap_radius) {
            Ok(()) => true,
            Err(err) => {
                crate::logger::log_error(&format!("Enemy {:?}: {}", self.state, err));
                false
            }
        }
    }

    fn route_to_waypoint(&mut self, ctx: &mut EnemyCtx) -> bool {
        if ctx.patrol.is_empty() {
            crate::logger::log_warning("Patrol: no patrol points configured");
            return false;
        }
        if !self.navigable(ctx) {
            return false;
        }
        let index = self.patrol_index % ctx.patrol.len();
        ctx.nav.set_destination(ctx.patrol[index]);
        true
    }
}
