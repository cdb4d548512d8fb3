//! Navigation mover — абстракция pathfinding/движения
//!
//! Enemy FSM отдаёт только high-level команды (destination, stop, speed).
//! Реальное движение — у mover'а: NavMesh агент движка или `SimpleNavMover`
//! для headless симуляции (прямая линия внутри navigable прямоугольника).

use bevy::prelude::*;
use crate::error::NavigationError;

pub trait NavigationMover: Send + Sync {
    /// Стоит ли mover на navigable поверхности
    fn is_on_navigable_surface(&self) -> bool;

    /// Переставить на ближайшую navigable точку в радиусе. false = не нашли
    fn warp_to_nearest(&mut self, point: Vec3, max_radius: f32) -> bool;

    fn set_destination(&mut self, point: Vec3);

    /// true = стоять на месте (destination сохраняется)
    fn stop(&mut self, stopped: bool);

    /// Осталось меньше threshold до destination.
    /// Пока путь считается (path pending) — всегда false.
    fn remaining_distance_below(&self, threshold: f32) -> bool;

    fn velocity(&self) -> Vec3;

    fn speed(&self) -> f32;

    fn set_speed(&mut self, speed: f32);

    fn position(&self) -> Vec3;

    /// Headless hook: продвинуть движение на dt. Движковые movers двигаются сами
    fn advance(&mut self, _dt: f32) {}
}

/// Component: mover enemy entity
#[derive(Component)]
pub struct NavAgent(pub Box<dyn NavigationMover>);

impl NavAgent {
    pub fn new(mover: impl NavigationMover + 'static) -> Self {
        Self(Box::new(mover))
    }
}

/// Precondition перед любой destination командой
///
/// Если mover не на navigable terrain — snap к ближайшей точке в `snap_radius`.
/// Не нашли → Err (текущий тик тела прерывается, FSM живёт дальше).
pub fn ensure_navigable(
    mover: &mut dyn NavigationMover,
    snap_radius: f32,
) -> Result<(), NavigationError> {
    if mover.is_on_navigable_surface() {
        return Ok(());
    }

    let position = mover.position();
    if mover.warp_to_nearest(position, snap_radius) {
        crate::logger::log(&format!(
            "Nav: mover warped back onto navigable surface near {:?}",
            position
        ));
        return Ok(());
    }

    Err(NavigationError::Unavailable {
        x: position.x,
        y: position.y,
        z: position.z,
        radius: snap_radius,
    })
}

/// Headless mover: прямолинейное движение в XZ внутри navigable `Rect`
///
/// Нет препятствий и path pending — путь "считается" мгновенно.
#[derive(Debug, Clone)]
pub struct SimpleNavMover {
    position: Vec3,
    destination: Option<Vec3>,
    velocity: Vec3,
    speed: f32,
    stopped: bool,
    /// Navigable область (x, z)
    area: Rect,
}

impl SimpleNavMover {
    pub fn new(position: Vec3, speed: f32, area: Rect) -> Self {
        Self {
            position,
            destination: None,
            velocity: Vec3::ZERO,
            speed,
            stopped: false,
            area,
        }
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn flat(point: Vec3) -> Vec2 {
        Vec2::new(point.x, point.z)
    }

    fn nearest_in_area(&self, point: Vec3) -> Vec3 {
        let clamped = Self::flat(point).clamp(self.area.min, self.area.max);
        Vec3::new(clamped.x, point.y, clamped.y)
    }
}

impl NavigationMover for SimpleNavMover {
    fn is_on_navigable_surface(&self) -> bool {
        self.area.contains(Self::flat(self.position))
    }

    fn warp_to_nearest(&mut self, point: Vec3, max_radius: f32) -> bool {
        let nearest = self.nearest_in_area(point);
        if Self::flat(nearest).distance(Self::flat(point)) > max_radius {
            return false;
        }
        self.position = nearest;
        self.velocity = Vec3::ZERO;
        true
    }

    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(self.nearest_in_area(point));
    }

    fn stop(&mut self, stopped: bool) {
        self.stopped = stopped;
        if stopped {
            self.velocity = Vec3::ZERO;
        }
    }

    fn remaining_distance_below(&self, threshold: f32) -> bool {
        match self.destination {
            Some(destination) => Self::flat(self.position).distance(Self::flat(destination)) < threshold,
            // Нет пути — remaining distance = 0
            None => true,
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn advance(&mut self, dt: f32) {
        let Some(destination) = self.destination else {
            self.velocity = Vec3::ZERO;
            return;
        };
        if self.stopped || dt <= 0.0 {
            self.velocity = Vec3::ZERO;
            return;
        }

        let to_destination = Vec3::new(
            destination.x - self.position.x,
            0.0,
            destination.z - self.position.z,
        );
        let distance = to_destination.length();
        let step = self.speed * dt;

        if distance <= step {
            self.position.x = destination.x;
            self.position.z = destination.z;
            self.velocity = to_destination / dt;
        } else {
            let direction = to_destination / distance;
            self.position += direction * step;
            self.velocity = direction * self.speed;
        }
    }
}
