//! Enemy audio cues: BGM по состоянию, крик на смену усиления.

use bevy::prelude::*;

use crate::ai::components::{EnemyConfig, EnemyState};
use crate::ai::events::{EnemyStateChanged, PowerStateChanged};
use crate::presentation::{AudioCue, AudioEvents, AudioSink, BgmTrack, SoundClip};

/// System: звуковые реакции на события enemy
///
/// - вход в PlayerChase → chase BGM
/// - вход в Patrol → normal BGM
/// - усиление On/Off → крик (низкий / высокий pitch)
pub fn enemy_audio_cues(
    mut state_events: EventReader<EnemyStateChanged>,
    mut power_events: EventReader<PowerStateChanged>,
    configs: Query<&EnemyConfig>,
    mut cues: EventWriter<AudioCue>,
) {
    for event in state_events.read() {
        let mut audio = AudioEvents {
            source: event.entity,
            writer: &mut cues,
        };
        match event.to {
            EnemyState::PlayerChase => audio.play_bgm(BgmTrack::Chase),
            EnemyState::Patrol => audio.play_bgm(BgmTrack::Normal),
            _ => {}
        }
    }

    for event in power_events.read() {
        let Ok(config) = configs.get(event.entity) else {
            continue;
        };
        let pitch = if event.powered {
            config.cry_pitch_power_on
        } else {
            config.cry_pitch_power_off
        };

        let mut audio = AudioEvents {
            source: event.entity,
            writer: &mut cues,
        };
        audio.play_one_shot(SoundClip::MonsterCry, pitch);
    }
}
