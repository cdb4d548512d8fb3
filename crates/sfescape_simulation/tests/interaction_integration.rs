//! Interaction integration test
//!
//! Полный цикл стадии через intents игрока:
//! батарея → зарядка (hold) → sub-computer → портал → GameClear.
//! Плюс inventory swap/drop, медицинская станция, несколько holders.

use bevy::prelude::*;
use sfescape_simulation::interaction::{ChargeDisplay, HoldInteractable, InteractPrompt};
use sfescape_simulation::inventory::{ItemDropped, ItemPickedUp};
use sfescape_simulation::quest::{StageEntities, StageItem};
use sfescape_simulation::*;

fn create_app() -> App {
    let mut app = create_headless_app(7);
    app.add_plugins(SimulationPlugin);
    app
}

fn step(app: &mut App) {
    let world = app.world_mut();
    let timestep = world.resource::<Time<Fixed>>().timestep();
    world.resource_mut::<Time<Fixed>>().advance_by(timestep);
    world.run_schedule(FixedUpdate);
}

fn steps(app: &mut App, count: usize) {
    for _ in 0..count {
        step(app);
    }
}

/// Стадия с одним sub-computer и двумя пустыми батареями
fn setup(app: &mut App) -> StageEntities {
    let mut config = GameConfig::default();
    config.stage.sub_computer_count = 1;
    config.stage.items = vec![
        StageItem { item: ItemId::empty_battery(), position: [1.0, 0.0, 1.0] },
        StageItem { item: ItemId::empty_battery(), position: [-1.0, 0.0, 1.0] },
    ];
    apply_game_config(app.world_mut(), &config).unwrap()
}

fn focus_and_press(app: &mut App, actor: Entity, target: Entity) {
    app.world_mut().send_event(FocusChanged { actor, target: Some(target) });
    app.world_mut().send_event(InteractPressed { actor });
    step(app);
}

fn held(app: &App, actor: Entity) -> Option<ItemId> {
    app.world().get::<Inventory>(actor).unwrap().held().cloned()
}

fn object_state(app: &App, object: Entity) -> InteractableState {
    app.world().get::<InteractableObject>(object).unwrap().state()
}

fn station_progress(app: &App, station: Entity) -> f32 {
    match app.world().get::<InteractableObject>(station).unwrap() {
        InteractableObject::ChargeStation(station) => station.hold_progress(),
        other => panic!("not a charge station: {:?}", other),
    }
}

fn station_holders(app: &App, station: Entity) -> u32 {
    match app.world().get::<InteractableObject>(station).unwrap() {
        InteractableObject::ChargeStation(station) => station.holders(),
        other => panic!("not a charge station: {:?}", other),
    }
}

#[test]
fn test_full_stage_flow_to_game_clear() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());

    // 1. Пустая батарея
    focus_and_press(&mut app, player, stage.items[0]);
    assert_eq!(held(&app, player), Some(ItemId::empty_battery()));
    assert!(app.world().get_entity(stage.items[0]).is_err());

    // 2. Вставить и держать
    focus_and_press(&mut app, player, stage.charge_station);
    assert_eq!(held(&app, player), None);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::HoldRequiring);

    steps(&mut app, 185);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::ItemSuppliable);
    assert_eq!(station_progress(&app, stage.charge_station), 3.0);

    app.world_mut().send_event(InteractReleased { actor: player });
    step(&mut app);

    // 3. Забрать заряженную
    app.world_mut().send_event(InteractPressed { actor: player });
    step(&mut app);
    assert_eq!(held(&app, player), Some(ItemId::charged_battery()));
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::Accessible);

    // 4. Sub-computer → квест выполнен → портал открыт
    let computer = stage.sub_computers[0];
    focus_and_press(&mut app, player, computer);
    assert_eq!(object_state(&app, computer), InteractableState::Cleared);
    assert_eq!(held(&app, player), None);
    assert!(app.world().resource::<QuestProgress>().is_cleared());
    assert_eq!(object_state(&app, stage.portal), InteractableState::Accessible);

    // 5. Портал
    focus_and_press(&mut app, player, stage.portal);
    assert_eq!(
        app.world().resource::<SessionOutcome>().ended,
        Some(SceneTarget::GameClear)
    );
}

#[test]
fn test_sub_computer_rejects_wrong_item() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());

    focus_and_press(&mut app, player, stage.items[0]);
    focus_and_press(&mut app, player, stage.sub_computers[0]);

    assert_eq!(object_state(&app, stage.sub_computers[0]), InteractableState::Accessible);
    assert_eq!(held(&app, player), Some(ItemId::empty_battery()));
    assert_eq!(app.world().resource::<QuestProgress>().cleared(), 0);

    let focus = app.world().get::<InteractionFocus>(player).unwrap();
    assert!(!focus.can_interact());
    assert_eq!(focus.prompt(), &InteractPrompt::Banned { text: "Boot up" });
}

#[test]
fn test_locked_portal_is_banned() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());

    focus_and_press(&mut app, player, stage.portal);

    assert_eq!(object_state(&app, stage.portal), InteractableState::Unavailable);
    assert_eq!(app.world().resource::<SessionOutcome>().ended, None);
    let focus = app.world().get::<InteractionFocus>(player).unwrap();
    assert_eq!(focus.prompt(), &InteractPrompt::Banned { text: "Escape" });
}

#[test]
fn test_two_holders_charge_twice_as_fast() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let first = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());
    let second = spawn_player(app.world_mut(), Vec3::X, HealthConfig::default());

    focus_and_press(&mut app, first, stage.items[0]);

    // Оба держат с одного тика
    let world = app.world_mut();
    world.send_event(FocusChanged { actor: first, target: Some(stage.charge_station) });
    world.send_event(FocusChanged { actor: second, target: Some(stage.charge_station) });
    world.send_event(InteractPressed { actor: first });
    world.send_event(InteractPressed { actor: second });
    step(&mut app);

    match app.world().get::<InteractableObject>(stage.charge_station).unwrap() {
        InteractableObject::ChargeStation(station) => assert_eq!(station.holders(), 2),
        other => panic!("not a charge station: {:?}", other),
    }

    // 80 тиков ≈ 1.33s → progress ≈ 2.67
    steps(&mut app, 79);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::HoldRequiring);
    assert!((station_progress(&app, stage.charge_station) - 80.0 * 2.0 / 60.0).abs() < 0.01);

    // 1.5s
    steps(&mut app, 12);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::ItemSuppliable);
}

#[test]
fn test_looking_away_pauses_charge() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());

    focus_and_press(&mut app, player, stage.items[0]);
    focus_and_press(&mut app, player, stage.charge_station);
    steps(&mut app, 59);
    let paused_at = station_progress(&app, stage.charge_station);
    assert!((paused_at - 1.0).abs() < 0.01);

    app.world_mut().send_event(FocusChanged { actor: player, target: None });
    steps(&mut app, 120);

    assert_eq!(station_progress(&app, stage.charge_station), paused_at);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::HoldRequiring);
    match app.world().get::<InteractableObject>(stage.charge_station).unwrap() {
        InteractableObject::ChargeStation(station) => {
            assert_eq!(station.holders(), 0);
            assert_eq!(station.display(), ChargeDisplay::InjectedBattery);
        }
        other => panic!("not a charge station: {:?}", other),
    }

    // Новый holder без батареи продолжает с того же места
    focus_and_press(&mut app, player, stage.charge_station);
    steps(&mut app, 125);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::ItemSuppliable);
}

#[test]
fn test_repeated_press_keeps_single_holder() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());

    focus_and_press(&mut app, player, stage.items[0]);
    focus_and_press(&mut app, player, stage.charge_station);
    assert_eq!(station_holders(&app, stage.charge_station), 1);

    // Второе нажатие без release
    app.world_mut().send_event(InteractPressed { actor: player });
    step(&mut app);
    assert_eq!(station_holders(&app, stage.charge_station), 1);

    app.world_mut().send_event(InteractReleased { actor: player });
    step(&mut app);
    assert_eq!(station_holders(&app, stage.charge_station), 0);
    assert!(!app.world().get::<InteractionFocus>(player).unwrap().is_holding());

    // Никто не держит → progress стоит
    let released_at = station_progress(&app, stage.charge_station);
    steps(&mut app, 30);
    assert_eq!(station_progress(&app, stage.charge_station), released_at);
}

#[test]
fn test_completed_charge_releases_holder() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());

    focus_and_press(&mut app, player, stage.items[0]);
    focus_and_press(&mut app, player, stage.charge_station);

    // Держит до конца, кнопку не отпускает
    steps(&mut app, 185);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::ItemSuppliable);
    assert_eq!(station_holders(&app, stage.charge_station), 0);
    assert!(!app.world().get::<InteractionFocus>(player).unwrap().is_holding());

    // Забрать батарею можно без release
    app.world_mut().send_event(InteractPressed { actor: player });
    step(&mut app);
    assert_eq!(held(&app, player), Some(ItemId::charged_battery()));
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::Accessible);

    // Поздний release ничего не трогает
    app.world_mut().send_event(InteractReleased { actor: player });
    step(&mut app);
    assert_eq!(station_holders(&app, stage.charge_station), 0);
    assert_eq!(object_state(&app, stage.charge_station), InteractableState::Accessible);
}

#[test]
fn test_pickup_swaps_held_item() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::new(0.0, 0.0, 2.0), HealthConfig::default());
    app.world_mut()
        .entity_mut(player)
        .insert(Inventory::holding(ItemId::medical_box()));

    focus_and_press(&mut app, player, stage.items[1]);

    assert_eq!(held(&app, player), Some(ItemId::empty_battery()));

    let dropped: Vec<ItemDropped> = app
        .world()
        .resource::<Events<ItemDropped>>()
        .iter_current_update_events()
        .cloned()
        .collect();
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].item, ItemId::medical_box());
    assert_eq!(dropped[0].position, Vec3::new(0.0, 0.0, 2.0));

    // Выброшенный предмет лежит в мире и его можно подобрать
    match app.world().get::<InteractableObject>(dropped[0].pickup).unwrap() {
        InteractableObject::Pickup(pickup) => assert_eq!(pickup.item(), &ItemId::medical_box()),
        other => panic!("expected a pickup: {:?}", other),
    }

    let picked: Vec<ItemPickedUp> = app
        .world()
        .resource::<Events<ItemPickedUp>>()
        .iter_current_update_events()
        .cloned()
        .collect();
    assert_eq!(picked, vec![ItemPickedUp { actor: player, item: ItemId::empty_battery() }]);
}

#[test]
fn test_drop_request_spawns_pickup() {
    let mut app = create_app();
    setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::new(3.0, 0.0, 0.0), HealthConfig::default());
    app.world_mut()
        .entity_mut(player)
        .insert(Inventory::holding(ItemId::charged_battery()));

    app.world_mut().send_event(DropRequested { actor: player });
    step(&mut app);

    assert_eq!(held(&app, player), None);
    let mut pickups = app.world_mut().query::<(&InteractableObject, &Transform)>();
    let dropped_here = pickups
        .iter(app.world())
        .filter(|(object, transform)| {
            matches!(object, InteractableObject::Pickup(pickup) if pickup.item() == &ItemId::charged_battery())
                && transform.translation == Vec3::new(3.0, 0.0, 0.0)
        })
        .count();
    assert_eq!(dropped_here, 1);

    // Пустые руки: drop ничего не делает
    app.world_mut().send_event(DropRequested { actor: player });
    step(&mut app);
    let dropped_events = app.world().resource::<Events<ItemDropped>>().iter_current_update_events().count();
    assert_eq!(dropped_events, 1);
}

#[test]
fn test_medical_station_cures_infected_player() {
    let mut app = create_app();
    let stage = setup(&mut app);
    let player = spawn_player(app.world_mut(), Vec3::ZERO, HealthConfig::default());
    app.world_mut()
        .entity_mut(player)
        .insert(Inventory::holding(ItemId::medical_box()));

    // Здоровому лечение недоступно
    focus_and_press(&mut app, player, stage.medical_station);
    assert_eq!(held(&app, player), Some(ItemId::medical_box()));

    app.world_mut().send_event(ConditionChangeRequested {
        actor: player,
        to: PlayerCondition::Infected,
    });
    steps(&mut app, 60);
    let health = app.world().get::<HealthCondition>(player).unwrap();
    assert_eq!(health.condition(), PlayerCondition::Infected);
    assert!(health.infection_elapsed() > 0.9);

    app.world_mut().send_event(InteractPressed { actor: player });
    step(&mut app);

    let health = app.world().get::<HealthCondition>(player).unwrap();
    assert_eq!(health.condition(), PlayerCondition::Normal);
    assert!(health.is_infection_decaying());
    assert_eq!(held(&app, player), None);
    assert_eq!(object_state(&app, stage.medical_station), InteractableState::Accessible);
}
