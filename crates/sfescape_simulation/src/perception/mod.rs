//! Perception — видит ли наблюдатель цель
//!
//! Три проверки по порядку (fail fast):
//! 1. distance ≤ range
//! 2. угол между forward и направлением на цель ≤ half FOV
//! 3. луч self → target не пересекает препятствия из obstacle_mask
//!
//! Препятствия — AABB объёмы (`ObstacleMap`), без физического движка.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

/// Слои препятствий (bitmask, как collision layers)
pub const LAYER_WALLS: u32 = 1 << 0;
pub const LAYER_PROPS: u32 = 1 << 1;
pub const LAYER_GLASS: u32 = 1 << 2;

/// Маска по умолчанию: стены и мебель блокируют взгляд, стекло — нет
pub const DEFAULT_SIGHT_MASK: u32 = LAYER_WALLS | LAYER_PROPS;

/// Минимальная дистанция: цель "внутри" наблюдателя считается видимой
const MIN_SIGHT_DISTANCE: f32 = 1e-4;

/// Raycast contract (блокирует ли что-то луч)
pub trait LineOfSight {
    fn ray_blocked(&self, origin: Vec3, direction: Dir3, max_distance: f32, mask: u32) -> bool;
}

/// Препятствие для взгляда
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub bounds: Aabb3d,
    pub layers: u32,
}

impl Obstacle {
    /// Box по центру и полуразмерам
    pub fn cuboid(center: Vec3, half_size: Vec3, layers: u32) -> Self {
        Self {
            bounds: Aabb3d::new(center, half_size),
            layers,
        }
    }
}

/// Resource: статическая геометрия препятствий стадии
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleMap {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleMap {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }
}

impl LineOfSight for ObstacleMap {
    fn ray_blocked(&self, origin: Vec3, direction: Dir3, max_distance: f32, mask: u32) -> bool {
        let ray = RayCast3d::new(origin, direction, max_distance);

        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.layers & mask != 0)
            .any(|obstacle| ray.aabb_intersection_at(&obstacle.bounds).is_some())
    }
}

/// Пустой мир (headless тесты без геометрии)
pub struct ClearSight;

impl LineOfSight for ClearSight {
    fn ray_blocked(&self, _origin: Vec3, _direction: Dir3, _max_distance: f32, _mask: u32) -> bool {
        false
    }
}

/// Видит ли наблюдатель цель (pure, без side effects)
pub fn can_see_target(
    self_position: Vec3,
    self_forward: Vec3,
    target_position: Vec3,
    range: f32,
    half_fov_degrees: f32,
    obstacle_mask: u32,
    line_of_sight: &dyn LineOfSight,
) -> bool {
    let to_target = target_position - self_position;
    let distance = to_target.length();

    if distance > range {
        return false;
    }

    let Ok(direction) = Dir3::new(to_target) else {
        // Цель в той же точке что и наблюдатель
        return distance <= MIN_SIGHT_DISTANCE;
    };

    let angle = self_forward.angle_between(*direction).to_degrees();
    if angle > half_fov_degrees {
        return false;
    }

    !line_of_sight.ray_blocked(self_position, direction, distance, obstacle_mask)
}

/// Component: результат perception за текущий тик (пишется системой)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub target_visible: bool,
    pub target_position: Option<Vec3>,
    pub target_distance: Option<f32>,
}

impl Perception {
    /// Наблюдатель без цели (target despawned или не назначен)
    pub fn blind() -> Self {
        Self::default()
    }
}
