//! SFEscape Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 (headless, без рендера)
//!
//! - enemy AI: perception + tick-driven FSM + power cycle
//! - interaction: объекты стадии, inventory gate, hold-to-charge
//! - health: condition машина игрока + infection таймер
//! - quest: счётчик sub-computers → портал
//!
//! Движок/host общается с симуляцией только событиями (intents внутрь,
//! presentation events наружу).

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod config;
pub mod error;
pub mod health;
pub mod interaction;
pub mod inventory;
pub mod logger;
pub mod perception;
pub mod presentation;
pub mod quest;
pub mod scope;

// Re-export основных типов
pub use ai::{
    AIPlugin, Enemy, EnemyBrain, EnemyConfig, EnemyState, EnemyStateChanged, EnemyTarget, HazardContacts, NavAgent,
    NavigationMover, NoiseEmitted, PatrolRoute, PowerCycle, PowerStateChanged, SimpleNavMover,
};
pub use config::GameConfig;
pub use error::{ConditionError, ConfigError, InteractionError, ItemDatabaseError, NavigationError, StageError};
pub use health::{ConditionChangeRequested, HealthCondition, HealthConfig, HealthPlugin, PlayerCondition};
pub use interaction::{
    FocusChanged, InteractPressed, InteractReleased, InteractableObject, InteractableState, InteractionFocus,
    InteractionPlugin,
};
pub use inventory::{DropRequested, Inventory, ItemDatabase, ItemId};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use perception::{ObstacleMap, Perception};
pub use presentation::{SceneTarget, SceneTransitionRequested, SessionOutcome};
pub use quest::{QuestPlugin, QuestProgress, StageLayout};
pub use scope::{CancelScopes, OwnedScope};

/// Порядок подсистем внутри одного FixedUpdate тика
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Отмена scopes despawned entities
    Lifecycle,
    Enemy,
    /// Intents игрока + зарядка
    Interaction,
    Quest,
    /// can_interact + подсказки UI
    Judgement,
    Health,
    /// Запросы смены сцены
    Outcome,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed мог уже задать create_headless_app
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<CancelScopes>()
            .init_resource::<SessionOutcome>()
            .init_resource::<ObstacleMap>()
            .init_resource::<ItemDatabase>()
            // Presentation events (читает host)
            .add_event::<presentation::AnimationParamChanged>()
            .add_event::<presentation::AudioCue>()
            .add_event::<SceneTransitionRequested>();

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Lifecycle,
                SimulationSet::Enemy,
                SimulationSet::Interaction,
                SimulationSet::Quest,
                SimulationSet::Judgement,
                SimulationSet::Health,
                SimulationSet::Outcome,
            )
                .chain(),
        );

        app.add_plugins((AIPlugin, InteractionPlugin, QuestPlugin, HealthPlugin));

        app.add_systems(
            FixedUpdate,
            (
                scope::cancel_scopes_of_despawned.in_set(SimulationSet::Lifecycle),
                presentation::record_scene_requests.in_set(SimulationSet::Outcome),
            ),
        );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Каждый `app.update()` = ровно один FixedUpdate тик
///
/// Real time двигается на фиксированный шаг вместо wall clock. `First`
/// отрабатывает как в обычном update и чистит очереди событий.
pub fn use_fixed_step_updates(app: &mut App) {
    let timestep = app
        .world()
        .get_resource::<Time<Fixed>>()
        .map(|time| time.timestep())
        .unwrap_or_else(|| Time::<Fixed>::from_hz(60.0).timestep());
    app.insert_resource(TimeUpdateStrategy::ManualDuration(timestep));
}

/// Применить GameConfig: item database + stage
pub fn apply_game_config(world: &mut World, config: &GameConfig) -> Result<quest::StageEntities, ConfigError> {
    let database = config.item_database()?;
    world.insert_resource(database);

    quest::setup_stage(world, &config.stage, config.charge_station).map_err(|error| {
        crate::logger::log_error(&format!("Stage setup failed: {}", error));
        ConfigError::Stage(error)
    })
}

// ============================================================================
// Spawn helpers
// ============================================================================

/// Параметры spawn enemy
#[derive(Debug, Clone)]
pub struct EnemySpawn {
    pub position: Vec3,
    /// Куда смотрит (forward) на старте
    pub facing: Vec3,
    pub config: EnemyConfig,
    pub patrol: Vec<Vec3>,
    pub target: Option<Entity>,
    /// Navigable область для SimpleNavMover
    pub area: Rect,
}

impl EnemySpawn {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            facing: Vec3::NEG_Z,
            config: EnemyConfig::default(),
            patrol: Vec::new(),
            target: None,
            area: Rect::new(-50.0, -50.0, 50.0, 50.0),
        }
    }
}

/// Spawn enemy (brain + power cycle + headless mover)
///
/// Root scope привязан к entity: despawn отменяет тело state и broadcast.
pub fn spawn_enemy(world: &mut World, spawn: EnemySpawn) -> Entity {
    let mover = SimpleNavMover::new(spawn.position, spawn.config.normal_speed, spawn.area);
    spawn_enemy_with_mover(world, spawn, mover)
}

/// Spawn enemy со своей реализацией NavigationMover
pub fn spawn_enemy_with_mover(world: &mut World, spawn: EnemySpawn, mover: impl NavigationMover + 'static) -> Entity {
    let transform = Transform::from_translation(spawn.position).looking_to(spawn.facing, Vec3::Y);
    let entity = world.spawn((Enemy, transform)).id();

    let (root, power_scope) = {
        let mut scopes = world.get_resource_or_insert_with(CancelScopes::new);
        let root = scopes.open_owned(entity);
        let power_scope = scopes.open_child(root);
        (root, power_scope)
    };

    let mut entity_mut = world.entity_mut(entity);
    entity_mut.insert((
        OwnedScope(root),
        EnemyBrain::new(root),
        PowerCycle::new(power_scope),
        NavAgent::new(mover),
        spawn.config,
        Perception::blind(),
        PatrolRoute::new(spawn.patrol),
        HazardContacts::default(),
    ));
    if let Some(target) = spawn.target {
        entity_mut.insert(EnemyTarget(target));
    }

    crate::logger::log_info(&format!("👾 Enemy {:?} spawned at {:?}", entity, spawn.position));
    entity
}

/// Spawn игрока (inventory + condition + interaction focus)
pub fn spawn_player(world: &mut World, position: Vec3, health: HealthConfig) -> Entity {
    world
        .spawn((
            Transform::from_translation(position),
            Inventory::new(),
            HealthCondition::new(),
            health,
            InteractionFocus::new(),
        ))
        .id()
}
