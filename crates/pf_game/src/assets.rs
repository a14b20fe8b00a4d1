//! Image and audio loading.
//!
//! Images are decoded once into an [`ImageBank`] and referred to by
//! [`ImageId`] everywhere else. Each image's collision mask (and its mirror,
//! for flipped sprites) is built at insert time so collision never touches
//! pixel data.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::level::{LevelFile, DECORATION_LAYER, MAIN_LAYER};
use crate::mask::Mask;
use crate::settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u32);

impl ImageId {
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Frames of one animation, in play order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frames(Vec<ImageId>);

impl Frames {
    pub fn new(ids: Vec<ImageId>) -> Result<Self, String> {
        if ids.is_empty() {
            return Err("An animation needs at least one frame".to_string());
        }
        Ok(Self(ids))
    }

    pub fn first(&self) -> ImageId {
        self.0[0]
    }

    /// Out-of-range indices clamp to the last frame.
    pub fn get(&self, index: usize) -> ImageId {
        self.0[index.min(self.0.len() - 1)]
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug)]
struct BankEntry {
    image: RgbaImage,
    mask: Mask,
    flipped_mask: Mask,
}

#[derive(Debug, Default)]
pub struct ImageBank {
    entries: Vec<BankEntry>,
}

impl ImageBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: RgbaImage) -> ImageId {
        let mask = Mask::from_rgba(&image);
        let flipped_mask = mask.flipped_horizontal();
        let id = ImageId::from_index(self.entries.len());
        self.entries.push(BankEntry {
            image,
            mask,
            flipped_mask,
        });
        id
    }

    pub fn get(&self, id: ImageId) -> Option<&RgbaImage> {
        self.entries.get(id.index()).map(|entry| &entry.image)
    }

    /// Pixel size, or zero for an id this bank never issued.
    pub fn size(&self, id: ImageId) -> (f32, f32) {
        self.get(id)
            .map_or((0.0, 0.0), |image| (image.width() as f32, image.height() as f32))
    }

    pub fn mask(&self, id: ImageId, flipped: bool) -> Option<&Mask> {
        self.entries.get(id.index()).map(|entry| {
            if flipped {
                &entry.flipped_mask
            } else {
                &entry.mask
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImageId, &RgbaImage)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (ImageId::from_index(index), &entry.image))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn join_segments(root: &Path, segments: &[&str]) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}

/// Loads `<root>/<segments...>.png`.
pub fn import_image(bank: &mut ImageBank, root: &Path, segments: &[&str]) -> Result<ImageId, String> {
    let path = join_segments(root, segments).with_extension("png");
    load_into(bank, &path)
}

/// Loads every PNG in a folder, ordered by numeric file stem (`0.png`,
/// `1.png`, ... `10.png`). Non-numeric stems sort after, by name.
pub fn import_folder(
    bank: &mut ImageBank,
    root: &Path,
    segments: &[&str],
) -> Result<Vec<ImageId>, String> {
    let dir = join_segments(root, segments);
    let mut paths = Vec::new();
    let entries = fs::read_dir(&dir)
        .map_err(|e| format!("Failed to read image folder {}: {e}", dir.display()))?;
    for entry in entries {
        let path = entry
            .map_err(|e| format!("Failed to read image folder {}: {e}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")) {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(format!("Image folder {} has no PNG files", dir.display()));
    }
    paths.sort_by_key(|path| frame_sort_key(path));

    paths.iter().map(|path| load_into(bank, path)).collect()
}

fn import_frames(bank: &mut ImageBank, root: &Path, segments: &[&str]) -> Result<Frames, String> {
    let ids = import_folder(bank, root, segments)?;
    Frames::new(ids).map_err(|e| format!("{e}: {}", segments.join("/")))
}

fn frame_sort_key(path: &Path) -> (u64, String) {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    (stem.parse::<u64>().unwrap_or(u64::MAX), stem)
}

fn load_into(bank: &mut ImageBank, path: &Path) -> Result<ImageId, String> {
    let image = image::open(path)
        .map_err(|e| format!("Failed to load image {}: {e}", path.display()))?
        .to_rgba8();
    log::debug!(
        "Loaded image {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(bank.insert(image))
}

/// A decoded sound, downmixed to mono `f32` samples at its own rate.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub samples: Arc<[f32]>,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate.max(1) as f32
    }
}

/// Decodes one WAV file (integer or float PCM, any channel count).
pub fn decode_wav(path: &Path) -> Result<AudioClip, String> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| format!("Failed to open audio file {}: {e}", path.display()))?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<f32>, _>>(),
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()
        }
    }
    .map_err(|e| format!("Failed to decode audio file {}: {e}", path.display()))?;

    let channels = usize::from(spec.channels.max(1));
    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok(AudioClip {
        path: path.to_path_buf(),
        sample_rate: spec.sample_rate,
        samples: samples.into(),
    })
}

/// Decodes every WAV file in a folder, keyed by file stem.
pub fn audio_importer(root: &Path, segments: &[&str]) -> Result<HashMap<String, AudioClip>, String> {
    let dir = join_segments(root, segments);
    let entries = fs::read_dir(&dir)
        .map_err(|e| format!("Failed to read audio folder {}: {e}", dir.display()))?;
    let mut clips = HashMap::new();
    for entry in entries {
        let path = entry
            .map_err(|e| format!("Failed to read audio folder {}: {e}", dir.display()))?
            .path();
        if !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("wav")) {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let clip = decode_wav(&path)?;
        log::debug!(
            "Loaded audio {} ({:.2}s at {} Hz)",
            path.display(),
            clip.duration_secs(),
            clip.sample_rate
        );
        clips.insert(stem, clip);
    }
    Ok(clips)
}

/// Everything the game draws, loaded up front.
#[derive(Debug)]
pub struct GameAssets {
    pub images: ImageBank,
    pub player_frames: Frames,
    pub bullet: ImageId,
    pub fire: ImageId,
    pub bee_frames: Frames,
    pub worm_frames: Frames,
    pub gift: ImageId,
    /// Keyed by the tileset image path used in the level file.
    pub tiles: HashMap<String, ImageId>,
}

impl GameAssets {
    pub fn load(root: &Path, level: &LevelFile) -> Result<Self, String> {
        let mut images = ImageBank::new();
        let player_frames = import_frames(&mut images, root, settings::PLAYER_FRAMES)?;
        let bullet = import_image(&mut images, root, settings::BULLET_IMAGE)?;
        let fire = import_image(&mut images, root, settings::FIRE_IMAGE)?;
        let bee_frames = import_frames(&mut images, root, settings::BEE_FRAMES)?;
        let worm_frames = import_frames(&mut images, root, settings::WORM_FRAMES)?;
        let gift = import_image(&mut images, root, settings::GIFT_IMAGE)?;

        let mut tiles = HashMap::new();
        for layer in [MAIN_LAYER, DECORATION_LAYER] {
            for placement in level.tiles(layer) {
                if tiles.contains_key(placement.image) {
                    continue;
                }
                let segments: Vec<&str> = placement.image.split('/').collect();
                let id = import_image(&mut images, root, &segments)?;
                tiles.insert(placement.image.to_string(), id);
            }
        }

        log::info!(
            "Loaded {} images ({} tile images) from {}",
            images.len(),
            tiles.len(),
            root.display()
        );
        Ok(Self {
            images,
            player_frames,
            bullet,
            fire,
            bee_frames,
            worm_frames,
            gift,
            tiles,
        })
    }
}
