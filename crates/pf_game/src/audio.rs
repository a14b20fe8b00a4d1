//! Audio cue playback. The game only raises cues; this side resolves each one
//! to a decoded clip and mixes it into the default output device.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::assets::{audio_importer, AudioClip};
use crate::events::AudioCue;

const MAX_VOICES: usize = 16;
const CUE_VOLUME: f32 = 0.5;
const FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// One clip in flight, resampled by nearest sample.
#[derive(Debug)]
struct Voice {
    samples: Arc<[f32]>,
    position: f64,
    step: f64,
}

impl Voice {
    fn next_sample(&mut self) -> f32 {
        let sample = self
            .samples
            .get(self.position as usize)
            .copied()
            .unwrap_or(0.0);
        self.position += self.step;
        sample
    }

    fn finished(&self) -> bool {
        self.position as usize >= self.samples.len()
    }
}

/// Sums active voices into the device buffer. Shared with the audio thread.
#[derive(Debug)]
pub struct Mixer {
    voices: Vec<Voice>,
    output_rate: u32,
    volume: f32,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(FALLBACK_SAMPLE_RATE)
    }
}

impl Mixer {
    pub fn new(output_rate: u32) -> Self {
        Self {
            voices: Vec::new(),
            output_rate,
            volume: CUE_VOLUME,
        }
    }

    /// Starts a clip from its first sample. When full, the oldest voice is cut.
    pub fn start(&mut self, clip: &AudioClip) {
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        self.voices.push(Voice {
            samples: Arc::clone(&clip.samples),
            position: 0.0,
            step: f64::from(clip.sample_rate) / f64::from(self.output_rate.max(1)),
        });
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Fills an interleaved buffer, same signal on every channel, then drops
    /// voices that ran out.
    pub fn mix(&mut self, out: &mut [f32], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let sum: f32 = self.voices.iter_mut().map(Voice::next_sample).sum();
            frame.fill((sum * self.volume).clamp(-1.0, 1.0));
        }
        self.voices.retain(|voice| !voice.finished());
    }
}

fn open_output(mixer: Arc<Mutex<Mixer>>) -> Result<cpal::Stream, String> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| "No default output device".to_string())?;
    let supported = device
        .default_output_config()
        .map_err(|e| format!("No output config: {e}"))?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(format!(
            "Unsupported output sample format {:?}",
            supported.sample_format()
        ));
    }
    let config = supported.config();
    let channels = usize::from(config.channels);
    if let Ok(mut state) = mixer.lock() {
        state.output_rate = config.sample_rate.0;
    }

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match mixer.lock() {
                Ok(mut state) => state.mix(data, channels),
                Err(_) => data.fill(0.0),
            },
            |err| log::error!("Audio stream error: {err}"),
            None,
        )
        .map_err(|e| format!("Failed to open audio stream: {e}"))?;
    stream
        .play()
        .map_err(|e| format!("Failed to start audio stream: {e}"))?;
    log::info!(
        "Audio output at {} Hz, {} channels",
        config.sample_rate.0,
        channels
    );
    Ok(stream)
}

#[derive(Default)]
pub struct CuePlayer {
    clips: HashMap<String, AudioClip>,
    reported_missing: HashSet<AudioCue>,
    mixer: Arc<Mutex<Mixer>>,
    /// Dropping the stream stops playback.
    stream: Option<cpal::Stream>,
}

impl CuePlayer {
    /// Clips only, no device. Cues still reach the mixer.
    pub fn new(clips: HashMap<String, AudioClip>) -> Self {
        Self {
            clips,
            ..Self::default()
        }
    }

    /// Missing audio files or a missing device are not fatal; the game runs
    /// silent.
    pub fn load(root: &Path, segments: &[&str]) -> Self {
        let clips = match audio_importer(root, segments) {
            Ok(clips) => {
                log::info!("Loaded {} audio clips", clips.len());
                clips
            }
            Err(err) => {
                log::warn!("Audio disabled: {err}");
                return Self::default();
            }
        };
        if clips.is_empty() {
            return Self::new(clips);
        }

        let mut player = Self::new(clips);
        match open_output(Arc::clone(&player.mixer)) {
            Ok(stream) => player.stream = Some(stream),
            Err(err) => log::warn!("Audio output unavailable, cues will be silent: {err}"),
        }
        player
    }

    /// Starts the cue's clip. False when no clip is loaded for it; that is
    /// reported once per cue.
    pub fn play(&mut self, cue: AudioCue) -> bool {
        let Some(clip) = self.clips.get(cue.clip_name()) else {
            if self.reported_missing.insert(cue) {
                log::warn!("No clip named '{}' for {:?}", cue.clip_name(), cue);
            }
            return false;
        };
        let Ok(mut mixer) = self.mixer.lock() else {
            log::warn!("Audio mixer poisoned, dropping {cue:?}");
            return false;
        };
        mixer.start(clip);
        log::debug!(
            "Cue {:?} -> {} ({} voices, output {})",
            cue,
            clip.path.display(),
            mixer.active_voices(),
            if self.stream.is_some() { "on" } else { "off" }
        );
        true
    }
}
