//! Stage setup — расстановка объектов стадии
//!
//! Sub-computers ставятся в `sub_computer_count` случайных (seeded RNG)
//! точках из кандидатов. Остальное — фиксированные позиции из layout.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::QuestProgress;
use crate::error::StageError;
use crate::interaction::{
    ChargeStation, ChargeStationConfig, InteractableObject, ItemPickup, MedicalStation, Portal, SubComputer,
};
use crate::inventory::ItemId;
use crate::scope::{CancelScopes, OwnedScope};
use crate::DeterministicRng;

/// Предмет, лежащий на стадии с начала
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageItem {
    pub item: ItemId,
    pub position: [f32; 3],
}

/// Раскладка стадии (позиции как [x, y, z])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageLayout {
    /// Кандидаты для sub-computers
    pub sub_computer_sites: Vec<[f32; 3]>,
    pub sub_computer_count: usize,
    pub charge_station: [f32; 3],
    pub medical_station: [f32; 3],
    pub portal: [f32; 3],
    pub items: Vec<StageItem>,
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            sub_computer_sites: vec![
                [8.0, 0.0, 8.0],
                [-8.0, 0.0, 8.0],
                [8.0, 0.0, -8.0],
                [-8.0, 0.0, -8.0],
                [0.0, 0.0, 14.0],
            ],
            sub_computer_count: 3,
            charge_station: [4.0, 0.0, 0.0],
            medical_station: [-4.0, 0.0, 0.0],
            portal: [0.0, 0.0, -14.0],
            items: vec![
                StageItem { item: ItemId::empty_battery(), position: [2.0, 0.0, 2.0] },
                StageItem { item: ItemId::empty_battery(), position: [-2.0, 0.0, 2.0] },
                StageItem { item: ItemId::empty_battery(), position: [0.0, 0.0, 4.0] },
                StageItem { item: ItemId::medical_box(), position: [-6.0, 0.0, 2.0] },
            ],
        }
    }
}

/// Entities собранной стадии
#[derive(Debug, Clone)]
pub struct StageEntities {
    pub sub_computers: Vec<Entity>,
    pub charge_station: Entity,
    pub medical_station: Entity,
    pub portal: Entity,
    pub items: Vec<Entity>,
}

/// `count` различных точек из `candidates` (порядок кандидатов сохраняется)
pub fn choose_sites<R: Rng + ?Sized>(rng: &mut R, candidates: &[Vec3], count: usize) -> Result<Vec<Vec3>, StageError> {
    if count > candidates.len() {
        return Err(StageError::NotEnoughSites {
            requested: count,
            available: candidates.len(),
        });
    }

    let mut indices = rand::seq::index::sample(rng, candidates.len(), count).into_vec();
    indices.sort_unstable();
    Ok(indices.into_iter().map(|index| candidates[index]).collect())
}

/// Собрать стадию и сбросить quest counter
pub fn setup_stage(
    world: &mut World,
    layout: &StageLayout,
    station_config: ChargeStationConfig,
) -> Result<StageEntities, StageError> {
    let candidates: Vec<Vec3> = layout.sub_computer_sites.iter().copied().map(Vec3::from_array).collect();
    let sites = {
        let mut rng = world.get_resource_or_insert_with(|| DeterministicRng::new(0));
        choose_sites(&mut rng.rng, &candidates, layout.sub_computer_count)?
    };

    let sub_computers: Vec<Entity> = sites
        .iter()
        .map(|site| {
            world
                .spawn((
                    InteractableObject::SubComputer(SubComputer::new()),
                    Transform::from_translation(*site),
                ))
                .id()
        })
        .collect();

    let charge_station = world.spawn(Transform::from_translation(Vec3::from_array(layout.charge_station))).id();
    let root = world
        .get_resource_or_insert_with(CancelScopes::new)
        .open_owned(charge_station);
    world.entity_mut(charge_station).insert((
        InteractableObject::ChargeStation(ChargeStation::new(station_config, root)),
        OwnedScope(root),
    ));

    let medical_station = world
        .spawn((
            InteractableObject::Medical(MedicalStation::new()),
            Transform::from_translation(Vec3::from_array(layout.medical_station)),
        ))
        .id();

    let portal = world
        .spawn((
            InteractableObject::Portal(Portal::new()),
            Transform::from_translation(Vec3::from_array(layout.portal)),
        ))
        .id();

    let items = layout
        .items
        .iter()
        .map(|stage_item| {
            world
                .spawn((
                    InteractableObject::Pickup(ItemPickup::new(stage_item.item.clone())),
                    Transform::from_translation(Vec3::from_array(stage_item.position)),
                ))
                .id()
        })
        .collect();

    world
        .get_resource_or_insert_with(QuestProgress::default)
        .initialize(sub_computers.len() as u32);

    crate::logger::log_info(&format!(
        "🗺️ Stage ready: {} sub-computer(s) at {:?}",
        sub_computers.len(),
        sites
    ));

    Ok(StageEntities {
        sub_computers,
        charge_station,
        medical_station,
        portal,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn candidates() -> Vec<Vec3> {
        (0..6).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_choose_sites_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let sites = choose_sites(&mut rng, &candidates(), 4).unwrap();

        assert_eq!(sites.len(), 4);
        for (i, a) in sites.iter().enumerate() {
            for b in sites.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_choose_sites_is_deterministic_per_seed() {
        let first = choose_sites(&mut ChaCha8Rng::seed_from_u64(42), &candidates(), 3).unwrap();
        let second = choose_sites(&mut ChaCha8Rng::seed_from_u64(42), &candidates(), 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_not_enough_sites() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = choose_sites(&mut rng, &candidates(), 7).unwrap_err();
        assert_eq!(err, StageError::NotEnoughSites { requested: 7, available: 6 });
    }

    #[test]
    fn test_setup_stage_spawns_objects_and_resets_quest() {
        let mut world = World::new();
        world.insert_resource(DeterministicRng::new(9));
        world.insert_resource(QuestProgress::new(10));

        let stage = setup_stage(&mut world, &StageLayout::default(), ChargeStationConfig::default()).unwrap();

        assert_eq!(stage.sub_computers.len(), 3);
        assert_eq!(stage.items.len(), 4);
        let progress = world.resource::<QuestProgress>();
        assert_eq!((progress.cleared(), progress.max()), (0, 3));

        let station = world.get::<InteractableObject>(stage.charge_station).unwrap();
        assert!(matches!(station, InteractableObject::ChargeStation(_)));
        assert!(world.get::<OwnedScope>(stage.charge_station).is_some());
    }
}
