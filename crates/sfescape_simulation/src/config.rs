//! GameConfig — параметры симуляции из JSON
//!
//! Все секции опциональны (`#[serde(default)]`): отсутствующее поле = default.

use serde::{Deserialize, Serialize};

use crate::ai::EnemyConfig;
use crate::error::ConfigError;
use crate::health::HealthConfig;
use crate::interaction::ChargeStationConfig;
use crate::inventory::{ItemDatabase, ItemDefinition};
use crate::quest::StageLayout;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub enemy: EnemyConfig,
    pub health: HealthConfig,
    pub charge_station: ChargeStationConfig,
    pub stage: StageLayout,
    /// Пусто = встроенные определения предметов
    pub items: Vec<ItemDefinition>,
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Item database из конфига (дубликат id → ошибка)
    pub fn item_database(&self) -> Result<ItemDatabase, ConfigError> {
        if self.items.is_empty() {
            return Ok(ItemDatabase::default());
        }
        Ok(ItemDatabase::from_definitions(self.items.iter().cloned())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ItemId;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.item_database().unwrap().len(), 3);
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "enemy": { "power_up_time": 4.0 },
            "charge_station": { "required_hold_time": 5.0 },
            "stage": { "sub_computer_count": 2 }
        }"#;
        let config = GameConfig::from_json_str(json).unwrap();

        assert_eq!(config.enemy.power_up_time, 4.0);
        assert_eq!(config.enemy.power_up_duration, 10.0);
        assert_eq!(config.charge_station.required_hold_time, 5.0);
        assert_eq!(config.charge_station.base_rate, 1.0);
        assert_eq!(config.stage.sub_computer_count, 2);
        assert_eq!(config.stage.sub_computer_sites.len(), 5);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = GameConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_duplicate_item_definitions_rejected() {
        let json = r#"{
            "items": [
                { "id": "key", "name": "Key" },
                { "id": "key", "name": "Other Key" }
            ]
        }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        let err = config.item_database().unwrap_err();
        assert!(matches!(err, ConfigError::Items(_)));

        let json = r#"{ "items": [ { "id": "key", "name": "Key" } ] }"#;
        let database = GameConfig::from_json_str(json).unwrap().item_database().unwrap();
        assert!(database.contains(&ItemId::from("key")));
    }
}
