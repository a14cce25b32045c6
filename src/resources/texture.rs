//! Texture decoding and the per-model texture cache.
//!
//! Textures are addressed by their resolved path (`directory.join(file)`). The
//! cache decodes and uploads each path at most once for the lifetime of the
//! owning model and hands out [`TextureId`]s that meshes keep instead of
//! owning the texture.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::{data_structures::model::TextureKind, error::TextureError, resources::gpu::GpuUpload};

/// Layout of decoded pixel data, derived from the image's channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Luma8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::Luma8),
            3 => Some(PixelFormat::Rgb8),
            4 => Some(PixelFormat::Rgba8),
            _ => None,
        }
    }

    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// 8-bit pixel data straight out of the image codec.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl DecodedImage {
    /// Decodes the image file at `path`.
    pub fn decode(path: &Path) -> Result<Self, TextureError> {
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_dynamic(img, path)
    }

    /// Keeps the channel layout of `img`, narrowing 16/32-bit samples to 8 bits.
    pub fn from_dynamic(img: DynamicImage, path: &Path) -> Result<Self, TextureError> {
        let channels = img.color().channel_count();
        let format =
            PixelFormat::from_channels(channels).ok_or_else(|| TextureError::UnsupportedFormat {
                path: path.to_path_buf(),
                channels,
            })?;
        let (width, height) = (img.width(), img.height());
        let pixels = match format {
            PixelFormat::Luma8 => img.into_luma8().into_raw(),
            PixelFormat::Rgb8 => img.into_rgb8().into_raw(),
            PixelFormat::Rgba8 => img.into_rgba8().into_raw(),
        };
        Ok(Self {
            pixels,
            width,
            height,
            format,
        })
    }

    /// A single RGBA pixel.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            pixels: rgba.to_vec(),
            width: 1,
            height: 1,
            format: PixelFormat::Rgba8,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Expands to RGBA8; grey is replicated and missing alpha is opaque.
    pub fn to_rgba8(&self) -> RgbaImage {
        let channels = self.format.channels();
        let width = self.width as usize;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let i = (y as usize * width + x as usize) * channels;
            let p = &self.pixels[i..i + channels];
            match self.format {
                PixelFormat::Luma8 => image::Rgba([p[0], p[0], p[0], 255]),
                PixelFormat::Rgb8 => image::Rgba([p[0], p[1], p[2], 255]),
                PixelFormat::Rgba8 => image::Rgba([p[0], p[1], p[2], p[3]]),
            }
        })
    }
}

/// Number of levels in a full mip chain for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Base level followed by successively halved levels down to 1x1.
pub fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = Vec::with_capacity(mip_level_count(base.width(), base.height()) as usize);
    levels.push(base);
    while let Some(last) = levels.last() {
        let (w, h) = last.dimensions();
        if w <= 1 && h <= 1 {
            break;
        }
        let next = image::imageops::resize(last, (w / 2).max(1), (h / 2).max(1), FilterType::Triangle);
        levels.push(next);
    }
    levels
}

/// Index of a texture inside a [`TextureCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(usize);

impl TextureId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct TextureEntry<T> {
    pub handle: T,
    /// Role of the first material slot that referenced this path.
    pub kind: TextureKind,
    pub path: PathBuf,
    /// `true` if decoding failed and a substitute was uploaded instead.
    pub placeholder: bool,
}

/// Content-addressed texture store: one entry per resolved path, never evicted.
#[derive(Debug)]
pub struct TextureCache<T> {
    entries: Vec<TextureEntry<T>>,
    by_path: HashMap<PathBuf, TextureId>,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_path: HashMap::new(),
        }
    }
}

impl<T> TextureCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureEntry<T>> {
        self.entries.get(id.0)
    }

    pub fn lookup(&self, path: &Path) -> Option<TextureId> {
        self.by_path.get(path).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &TextureEntry<T>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (TextureId(i), entry))
    }

    /// Returns the cached texture for `directory/file`, decoding and uploading
    /// it through `gpu` on first use.
    pub fn load_or_fetch<G>(
        &mut self,
        file: &str,
        directory: &Path,
        kind: TextureKind,
        gpu: &mut G,
    ) -> Result<TextureId, TextureError>
    where
        G: GpuUpload<Texture = T>,
    {
        let path = directory.join(file);
        if let Some(id) = self.lookup(&path) {
            self.note_reuse(id, kind);
            return Ok(id);
        }

        let decoded = DecodedImage::decode(&path)?;
        log::debug!(
            "decoded {} ({}x{}, {:?})",
            path.display(),
            decoded.width(),
            decoded.height(),
            decoded.format()
        );
        let handle = gpu.upload_texture(&decoded, kind, &path.to_string_lossy());
        Ok(self.insert(path, kind, handle, false))
    }

    /// Registers a 1x1 substitute under `directory/file` so later lookups of
    /// the same path share it instead of retrying the decode.
    pub fn insert_placeholder<G>(
        &mut self,
        file: &str,
        directory: &Path,
        kind: TextureKind,
        gpu: &mut G,
    ) -> TextureId
    where
        G: GpuUpload<Texture = T>,
    {
        let path = directory.join(file);
        if let Some(id) = self.lookup(&path) {
            self.note_reuse(id, kind);
            return id;
        }
        let handle = gpu.upload_texture(&kind.placeholder(), kind, &path.to_string_lossy());
        self.insert(path, kind, handle, true)
    }

    /// Cache hits keep the first upload, including its colour space, even
    /// when a later slot asks for a different role. Returns whether the roles
    /// differ.
    fn note_reuse(&self, id: TextureId, kind: TextureKind) -> bool {
        let Some(entry) = self.get(id) else {
            return false;
        };
        if entry.kind == kind {
            log::trace!("texture cache hit for {}", entry.path.display());
            false
        } else {
            log::debug!(
                "{} was first loaded as {} and is reused for a {} slot",
                entry.path.display(),
                entry.kind.as_str(),
                kind.as_str()
            );
            true
        }
    }

    fn insert(&mut self, path: PathBuf, kind: TextureKind, handle: T, placeholder: bool) -> TextureId {
        let id = TextureId(self.entries.len());
        self.by_path.insert(path.clone(), id);
        self.entries.push(TextureEntry {
            handle,
            kind,
            path,
            placeholder,
        });
        id
    }
}
