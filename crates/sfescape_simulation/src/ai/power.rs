//! Power cycle — периодическое усиление enemy
//!
//! Своя шкала времени (f64 elapsed, без накопления ошибки на долгих сессиях).
//! Фаза: `powered_at(t) = t >= T && ((t - T) mod (T + D)) < D`.
//!
//! Пока powered — broadcast sub-process (child scope от scope цикла):
//! сигнал сразу на On и далее каждые `notification_interval` секунд.
//! Off или despawn enemy → broadcast scope отменён.

use bevy::prelude::*;

use super::components::EnemyConfig;
use crate::scope::{CancelScopes, ScopeId};

/// Что произошло за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSignal {
    On,
    Off,
    /// Пора разослать позицию цели
    Broadcast,
}

#[derive(Debug, Clone, Copy)]
struct BroadcastProcess {
    scope: ScopeId,
    until_next: f32,
}

/// Component: таймер усиления enemy
#[derive(Component, Debug)]
pub struct PowerCycle {
    elapsed: f64,
    powered: bool,
    scope: ScopeId,
    broadcast: Option<BroadcastProcess>,
}

impl PowerCycle {
    /// `scope` — child scope от root scope enemy
    pub fn new(scope: ScopeId) -> Self {
        Self {
            elapsed: 0.0,
            powered: false,
            scope,
            broadcast: None,
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn broadcast_scope(&self) -> Option<ScopeId> {
        self.broadcast.map(|process| process.scope)
    }

    /// Фаза усиления в момент t (секунды от spawn)
    pub fn powered_at(t: f64, power_up_time: f64, power_up_duration: f64) -> bool {
        if t < power_up_time {
            return false;
        }
        let period = power_up_time + power_up_duration;
        if period <= 0.0 {
            return false;
        }
        (t - power_up_time).rem_euclid(period) < power_up_duration
    }

    /// Продвинуть таймер. Сигналы в порядке: edge (On/Off), затем Broadcast
    pub fn tick(&mut self, config: &EnemyConfig, scopes: &mut CancelScopes, dt: f32) -> Vec<PowerSignal> {
        let mut signals = Vec::new();
        if !scopes.is_live(self.scope) {
            self.broadcast = None;
            return signals;
        }

        self.elapsed += f64::from(dt);
        let powered = Self::powered_at(
            self.elapsed,
            f64::from(config.power_up_time),
            f64::from(config.power_up_duration),
        );

        if powered != self.powered {
            self.powered = powered;
            if powered {
                crate::logger::log_info(&format!("⚡ Enemy powered up (t={:.2}s)", self.elapsed));
                signals.push(PowerSignal::On);
                self.start_broadcast(scopes, config);
                signals.push(PowerSignal::Broadcast);
                return signals;
            }

            crate::logger::log_info(&format!("Enemy power-up ended (t={:.2}s)", self.elapsed));
            signals.push(PowerSignal::Off);
            self.stop_broadcast(scopes);
            return signals;
        }

        if let Some(process) = self.broadcast.as_mut() {
            if !scopes.is_live(process.scope) {
                self.broadcast = None;
                return signals;
            }
            process.until_next -= dt;
            if process.until_next <= 0.0 {
                process.until_next += config.notification_interval.max(f32::EPSILON);
                signals.push(PowerSignal::Broadcast);
            }
        }

        signals
    }

    fn start_broadcast(&mut self, scopes: &mut CancelScopes, config: &EnemyConfig) {
        // Старый broadcast (если вдруг жив) отменяем до старта нового
        self.stop_broadcast(scopes);
        self.broadcast = Some(BroadcastProcess {
            scope: scopes.open_child(self.scope),
            until_next: config.notification_interval,
        });
    }

    fn stop_broadcast(&mut self, scopes: &mut CancelScopes) {
        if let Some(process) = self.broadcast.take() {
            scopes.cancel(process.scope);
        }
    }
}
