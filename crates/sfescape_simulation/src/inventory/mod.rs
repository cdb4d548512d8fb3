//! Inventory — один предмет в руках
//!
//! # Архитектура
//!
//! **ItemId** — строковый id предмета (открытое множество, задаётся данными).
//! "Нет предмета" = `Option::None`, отдельного sentinel нет.
//!
//! **ItemDatabase** — resource с определениями (имя, описание).
//! Дубликат id = ошибка конфигурации.
//!
//! **Inventory** — component актора: `held: Option<ItemId>`.
//! Меняют только interaction системы (pickup / use / drop).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ItemDatabaseError;
use crate::interaction::spawn_item_pickup;
use crate::presentation::{AudioCue, AudioEvents, AudioSink, SoundClip};

// ============================================================================
// ItemId
// ============================================================================

/// Item identifier (unique string ID)
///
/// # Examples
/// - "empty_battery"
/// - "charged_battery"
/// - "medical_box"
#[derive(Clone, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl ItemId {
    pub fn empty_battery() -> Self {
        "empty_battery".into()
    }

    pub fn charged_battery() -> Self {
        "charged_battery".into()
    }

    pub fn medical_box() -> Self {
        "medical_box".into()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ItemDefinition / ItemDatabase
// ============================================================================

/// Static item definition
#[derive(Clone, Debug, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    /// Название для UI
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Resource: определения предметов
#[derive(Resource, Clone, Debug)]
pub struct ItemDatabase {
    definitions: HashMap<ItemId, ItemDefinition>,
}

impl ItemDatabase {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Из списка определений (первый дубликат → ошибка)
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ItemDefinition>,
    ) -> Result<Self, ItemDatabaseError> {
        let mut database = Self::new();
        for definition in definitions {
            database.register(definition)?;
        }
        Ok(database)
    }

    pub fn register(&mut self, definition: ItemDefinition) -> Result<(), ItemDatabaseError> {
        if self.definitions.contains_key(&definition.id) {
            return Err(ItemDatabaseError::Duplicate(definition.id));
        }
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemDefinition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for ItemDatabase {
    /// Hardcoded definitions (предметы стадии)
    fn default() -> Self {
        let mut definitions = HashMap::new();
        for (id, name, description) in [
            (ItemId::empty_battery(), "Empty Battery", "A drained battery. Charge it at a charge station."),
            (ItemId::charged_battery(), "Charged Battery", "Powers up a sub-computer."),
            (ItemId::medical_box(), "Medical Box", "Cures the infection at a medical station."),
        ] {
            definitions.insert(
                id.clone(),
                ItemDefinition {
                    id,
                    name: name.to_string(),
                    description: description.to_string(),
                },
            );
        }
        Self { definitions }
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// Что произошло с инвентарём (порядок важен: drop до pickup)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryEffect {
    Dropped(ItemId),
    PickedUp(ItemId),
}

/// Component: предмет в руках (0 или 1)
#[derive(Component, Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Inventory {
    held: Option<ItemId>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding(item: ItemId) -> Self {
        Self { held: Some(item) }
    }

    pub fn held(&self) -> Option<&ItemId> {
        self.held.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }

    /// Взять предмет. None → no-op. Уже что-то в руках → сначала drop
    pub fn pick_up(&mut self, item: Option<ItemId>) -> Vec<InventoryEffect> {
        let Some(item) = item else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        if let Some(dropped) = self.drop() {
            effects.push(InventoryEffect::Dropped(dropped));
        }
        self.held = Some(item.clone());
        effects.push(InventoryEffect::PickedUp(item));
        effects
    }

    /// Выбросить предмет. Пусто → None
    pub fn drop(&mut self) -> Option<ItemId> {
        self.held.take()
    }

    /// Использовать (отдать) предмет — только при точном совпадении
    pub fn use_item(&mut self, required: Option<&ItemId>) -> bool {
        match (&self.held, required) {
            (Some(held), Some(required)) if held == required => {
                self.held = None;
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ItemPickedUp {
    pub actor: Entity,
    pub item: ItemId,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ItemDropped {
    pub actor: Entity,
    pub item: ItemId,
    pub position: Vec3,
    /// World pickup заспавненный на месте drop
    pub pickup: Entity,
}

/// Intent: игрок хочет выбросить предмет
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropRequested {
    pub actor: Entity,
}

/// Применить effects инвентаря к миру
///
/// Dropped → world pickup на позиции актора + ItemDropped + звук.
/// PickedUp → ItemPickedUp + звук.
pub fn apply_inventory_effects(
    commands: &mut Commands,
    actor: Entity,
    position: Vec3,
    effects: Vec<InventoryEffect>,
    picked_up: &mut EventWriter<ItemPickedUp>,
    dropped: &mut EventWriter<ItemDropped>,
    cues: &mut EventWriter<AudioCue>,
) {
    for effect in effects {
        let mut audio = AudioEvents {
            source: actor,
            writer: &mut *cues,
        };
        match effect {
            InventoryEffect::Dropped(item) => {
                let pickup = spawn_item_pickup(commands, item.clone(), position);
                crate::logger::log(&format!("🎒 {:?} dropped {}", actor, item.as_str()));
                audio.play_one_shot(SoundClip::ItemDrop, 1.0);
                dropped.write(ItemDropped {
                    actor,
                    item,
                    position,
                    pickup,
                });
            }
            InventoryEffect::PickedUp(item) => {
                crate::logger::log(&format!("🎒 {:?} picked up {}", actor, item.as_str()));
                audio.play_one_shot(SoundClip::ItemPickup, 1.0);
                picked_up.write(ItemPickedUp { actor, item });
            }
        }
    }
}

/// System: DropRequested → выбросить предмет на позиции актора
pub fn handle_drop_requests(
    mut commands: Commands,
    mut requests: EventReader<DropRequested>,
    mut actors: Query<(&mut Inventory, &Transform)>,
    mut picked_up: EventWriter<ItemPickedUp>,
    mut dropped: EventWriter<ItemDropped>,
    mut cues: EventWriter<AudioCue>,
) {
    for request in requests.read() {
        let Ok((mut inventory, transform)) = actors.get_mut(request.actor) else {
            continue;
        };
        let Some(item) = inventory.drop() else {
            continue;
        };

        apply_inventory_effects(
            &mut commands,
            request.actor,
            transform.translation,
            vec![InventoryEffect::Dropped(item)],
            &mut picked_up,
            &mut dropped,
            &mut cues,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn a() -> ItemId {
        ItemId::empty_battery()
    }

    fn b() -> ItemId {
        ItemId::charged_battery()
    }

    #[test]
    fn test_pick_up_none_is_noop() {
        let mut inventory = Inventory::holding(a());
        assert!(inventory.pick_up(None).is_empty());
        assert_eq!(inventory.held(), Some(&a()));
    }

    #[test]
    fn test_pick_up_swaps_with_single_drop() {
        let mut inventory = Inventory::new();
        assert_eq!(inventory.pick_up(Some(a())), vec![InventoryEffect::PickedUp(a())]);

        let effects = inventory.pick_up(Some(b()));
        assert_eq!(
            effects,
            vec![InventoryEffect::Dropped(a()), InventoryEffect::PickedUp(b())]
        );
        assert_eq!(inventory.held(), Some(&b()));
    }

    #[test]
    fn test_drop_empty_is_noop() {
        let mut inventory = Inventory::new();
        assert_eq!(inventory.drop(), None);
    }

    #[test]
    fn test_use_requires_exact_match() {
        let mut inventory = Inventory::holding(a());
        assert!(!inventory.use_item(Some(&b())));
        assert_eq!(inventory.held(), Some(&a()));

        assert!(!inventory.use_item(None));
        assert_eq!(inventory.held(), Some(&a()));

        assert!(inventory.use_item(Some(&a())));
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_database_rejects_duplicates() {
        let definition = ItemDefinition {
            id: a(),
            name: "Empty".to_string(),
            description: String::new(),
        };
        let result = ItemDatabase::from_definitions(vec![definition.clone(), definition]);
        assert_eq!(result.unwrap_err(), ItemDatabaseError::Duplicate(a()));
    }

    #[test]
    fn test_default_database_has_stage_items() {
        let database = ItemDatabase::default();
        assert_eq!(database.len(), 3);
        assert!(database.contains(&ItemId::empty_battery()));
        assert!(database.contains(&ItemId::charged_battery()));
        assert_eq!(
            database.get(&ItemId::medical_box()).map(|d| d.name.as_str()),
            Some("Medical Box")
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        PickUp(Option<u8>),
        Drop,
        Use(u8),
    }

    fn item(index: u8) -> ItemId {
        ItemId(format!("item_{}", index))
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            proptest::option::of(0u8..3).prop_map(Op::PickUp),
            Just(Op::Drop),
            (0u8..3).prop_map(Op::Use),
        ]
    }

    proptest! {
        #[test]
        fn prop_inventory_matches_model(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut inventory = Inventory::new();
            let mut model: Option<ItemId> = None;

            for op in ops {
                match op {
                    Op::PickUp(index) => {
                        let incoming = index.map(item);
                        let effects = inventory.pick_up(incoming.clone());
                        match incoming {
                            None => prop_assert!(effects.is_empty()),
                            Some(new_item) => {
                                let drops = effects.iter().filter(|e| matches!(e, InventoryEffect::Dropped(_))).count();
                                prop_assert_eq!(drops, usize::from(model.is_some()));
                                prop_assert_eq!(effects.last(), Some(&InventoryEffect::PickedUp(new_item.clone())));
                                model = Some(new_item);
                            }
                        }
                    }
                    Op::Drop => {
                        prop_assert_eq!(inventory.drop(), model.take());
                    }
                    Op::Use(index) => {
                        let required = item(index);
                        let consumed = inventory.use_item(Some(&required));
                        prop_assert_eq!(consumed, model.as_ref() == Some(&required));
                        if consumed {
                            model = None;
                        }
                    }
                }
                prop_assert_eq!(inventory.held(), model.as_ref());
            }
        }
    }
}
