//! Scripted input sequences for deterministic gameplay tests.

use crate::player::PlayerInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    #[serde(default)]
    pub seed: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub jump_pressed: bool,
    #[serde(default)]
    pub fire_held: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One input per frame. A jump press lands on the first frame of its
    /// group only, since it is an edge.
    pub fn expanded_inputs(&self) -> Vec<PlayerInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(PlayerInput {
                    move_x: frame.move_x.clamp(-1.0, 1.0),
                    jump_pressed: frame.jump_pressed && i == 0,
                    fire_held: frame.fire_held,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_replay(&raw).map_err(|e| format!("{e} ({})", path.display()))
}

pub fn parse_replay(raw: &str) -> Result<ReplaySequence, String> {
    let replay: ReplaySequence =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse replay JSON: {e}"))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 120.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::test_game;
    use crate::events::AudioCue;
    use crate::game::Game;
    use crate::world::Role;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pf_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    const RUN_AND_GUN: &str = r#"{
      "fixed_dt": 0.008333,
      "seed": 42,
      "frames": [
        {"repeat": 30},
        {"move_x": 1.0, "repeat": 60},
        {"move_x": 1.0, "jump_pressed": true, "repeat": 40},
        {"fire_held": true, "repeat": 120},
        {"move_x": -1.0, "fire_held": true, "repeat": 90}
      ]
    }"#;

    fn run(replay: &ReplaySequence) -> Game {
        let mut game = test_game(replay.seed);
        for input in replay.expanded_inputs() {
            game.tick(replay.fixed_dt, input);
        }
        game
    }

    #[test]
    fn expanded_inputs_press_jump_once_per_group() {
        let replay = parse_replay(RUN_AND_GUN).expect("replay should parse");
        let inputs = replay.expanded_inputs();
        assert_eq!(inputs.len(), 340);
        assert_eq!(inputs.iter().filter(|i| i.jump_pressed).count(), 1);
        assert!(inputs[90].jump_pressed);
    }

    #[test]
    fn load_replay_from_file() {
        let path = temp_file_path("valid");
        fs::write(&path, RUN_AND_GUN).expect("write temp file");
        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.seed, 42);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_empty_replay() {
        let err = parse_replay(r#"{"frames": []}"#).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
    }

    #[test]
    fn same_replay_and_seed_reproduce_the_same_run() {
        let replay = parse_replay(RUN_AND_GUN).expect("replay should parse");
        let a = run(&replay);
        let b = run(&replay);

        assert_eq!(a.frame(), b.frame());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.is_running(), b.is_running());
        assert_eq!(a.stats(), b.stats());
        let pa = a.player_snapshot().expect("player");
        let pb = b.player_snapshot().expect("player");
        assert_eq!(pa, pb);

        let rects = |game: &Game| -> Vec<_> {
            game.world()
                .members(Role::Enemy)
                .into_iter()
                .filter_map(|id| game.world().get(id).map(|e| e.sprite.rect))
                .collect()
        };
        assert_eq!(rects(&a), rects(&b));
    }

    #[test]
    fn scripted_run_ends_grounded_after_firing() {
        let replay = parse_replay(RUN_AND_GUN).expect("replay should parse");
        let mut game = run(&replay);
        let player = game.player().expect("player");
        assert!(player.on_floor);
        assert!(player.facing_left);
        assert!(game.drain_cues().contains(&AudioCue::Shoot));
    }
}
