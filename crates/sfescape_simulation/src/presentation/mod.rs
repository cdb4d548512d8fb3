//! Presentation sinks — анимация, звук, смена сцены
//!
//! Core логика не знает про Animator/AudioSource движка. Она пишет в трейты
//! `AnimationSink` / `AudioSink`; адаптеры превращают вызовы в Bevy events,
//! которые читает host (движок, UI, тесты).

use bevy::prelude::*;

// ============================================================================
// Animation
// ============================================================================

pub const ANIM_IS_MOVING: &str = "IsMoving";
pub const ANIM_MOVE_SPEED: &str = "MoveSpeed";
pub const ANIM_IS_ATTACKING: &str = "IsAttacking";

/// Именованные параметры анимации (bool/float)
pub trait AnimationSink {
    fn set_bool(&mut self, name: &'static str, value: bool);
    fn set_float(&mut self, name: &'static str, value: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationValue {
    Bool(bool),
    Float(f32),
}

/// Событие: параметр анимации entity изменился
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationParamChanged {
    pub entity: Entity,
    pub name: &'static str,
    pub value: AnimationValue,
}

/// Адаптер AnimationSink → AnimationParamChanged events
pub struct AnimationEvents<'a, 'w> {
    pub entity: Entity,
    pub writer: &'a mut EventWriter<'w, AnimationParamChanged>,
}

impl AnimationSink for AnimationEvents<'_, '_> {
    fn set_bool(&mut self, name: &'static str, value: bool) {
        self.writer.write(AnimationParamChanged {
            entity: self.entity,
            name,
            value: AnimationValue::Bool(value),
        });
    }

    fn set_float(&mut self, name: &'static str, value: f32) {
        self.writer.write(AnimationParamChanged {
            entity: self.entity,
            name,
            value: AnimationValue::Float(value),
        });
    }
}

// ============================================================================
// Audio
// ============================================================================

/// Звуковые клипы симуляции (host маппит на ассеты)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SoundClip {
    MonsterCry,
    BatterySet,
    Charging,
    ChargeComplete,
    PcStart,
    MedicalSpray,
    PortalHum,
    ItemPickup,
    ItemDrop,
}

/// Фоновая музыка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum BgmTrack {
    Normal,
    Chase,
}

pub trait AudioSink {
    fn play_one_shot(&mut self, clip: SoundClip, pitch: f32);
    fn start_loop(&mut self, clip: SoundClip);
    fn stop_loop(&mut self);
    fn play_bgm(&mut self, track: BgmTrack);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCommand {
    OneShot { clip: SoundClip, pitch: f32 },
    StartLoop(SoundClip),
    StopLoop,
    Bgm(BgmTrack),
}

/// Событие: звуковая команда от entity-источника
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub source: Entity,
    pub command: AudioCommand,
}

/// Адаптер AudioSink → AudioCue events
pub struct AudioEvents<'a, 'w> {
    pub source: Entity,
    pub writer: &'a mut EventWriter<'w, AudioCue>,
}

impl AudioEvents<'_, '_> {
    fn emit(&mut self, command: AudioCommand) {
        self.writer.write(AudioCue {
            source: self.source,
            command,
        });
    }
}

impl AudioSink for AudioEvents<'_, '_> {
    fn play_one_shot(&mut self, clip: SoundClip, pitch: f32) {
        self.emit(AudioCommand::OneShot { clip, pitch });
    }

    fn start_loop(&mut self, clip: SoundClip) {
        self.emit(AudioCommand::StartLoop(clip));
    }

    fn stop_loop(&mut self) {
        self.emit(AudioCommand::StopLoop);
    }

    fn play_bgm(&mut self, track: BgmTrack) {
        self.emit(AudioCommand::Bgm(track));
    }
}

/// Sink который всё записывает (тесты и headless отладка)
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub audio: Vec<AudioCommand>,
    pub animation: Vec<(&'static str, AnimationValue)>,
}

impl RecordingSink {
    pub fn last_bool(&self, name: &str) -> Option<bool> {
        self.animation.iter().rev().find_map(|(param, value)| match value {
            AnimationValue::Bool(b) if *param == name => Some(*b),
            _ => None,
        })
    }
}

impl AudioSink for RecordingSink {
    fn play_one_shot(&mut self, clip: SoundClip, pitch: f32) {
        self.audio.push(AudioCommand::OneShot { clip, pitch });
    }

    fn start_loop(&mut self, clip: SoundClip) {
        self.audio.push(AudioCommand::StartLoop(clip));
    }

    fn stop_loop(&mut self) {
        self.audio.push(AudioCommand::StopLoop);
    }

    fn play_bgm(&mut self, track: BgmTrack) {
        self.audio.push(AudioCommand::Bgm(track));
    }
}

impl AnimationSink for RecordingSink {
    fn set_bool(&mut self, name: &'static str, value: bool) {
        self.animation.push((name, AnimationValue::Bool(value)));
    }

    fn set_float(&mut self, name: &'static str, value: f32) {
        self.animation.push((name, AnimationValue::Float(value)));
    }
}

// ============================================================================
// Scene transitions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SceneTarget {
    GameOver,
    GameClear,
}

/// Событие: запрос смены сцены (LoadGameOver / LoadGameClear)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTransitionRequested {
    pub target: SceneTarget,
}

/// Resource: итог сессии (первый запрос сцены побеждает)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOutcome {
    pub ended: Option<SceneTarget>,
}

/// Система: фиксируем первый запрос смены сцены
pub fn record_scene_requests(
    mut requests: EventReader<SceneTransitionRequested>,
    mut outcome: ResMut<SessionOutcome>,
) {
    for request in requests.read() {
        if outcome.ended.is_some() {
            continue;
        }
        outcome.ended = Some(request.target);
        crate::logger::log_info(&format!("🎬 Scene transition requested: {:?}", request.target));
    }
}
