// font-atlas/src/cache.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Builds font atlases on demand and keeps them per font file and size.
//!
//! The first request for a key runs the whole pipeline: open the face, rasterize the supported
//! character set, plan the grid, composite. Later requests share that result. Concurrent
//! requests for one key wait for a single build; requests for different keys never wait on
//! each other's builds.

use log::{debug, warn};
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::atlas::{self, AtlasLayout, AtlasOptions};
use crate::canvas::Canvas;
use crate::charset;
use crate::error::FontLoadingError;
use crate::font::Font;
use crate::glyph_image;
use crate::metrics::GlyphMetrics;
use crate::rasterizer::Rasterizer;

/// Identifies a rasterized font: the font file and the pixel size it was rendered at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontAtlasKey {
    /// Absolute path to the font file.
    pub path: PathBuf,
    /// Character size, in pixels.
    pub size: u32,
}

impl FontAtlasKey {
    /// Creates a new key.
    #[inline]
    pub fn new<P>(path: P, size: u32) -> FontAtlasKey
    where
        P: Into<PathBuf>,
    {
        FontAtlasKey {
            path: path.into(),
            size,
        }
    }
}

/// The per-character half of an atlas: metrics, kerning and line spacing.
///
/// Outlives the atlas image for fonts that have been disposed.
pub struct FontGlyphs<R>
where
    R: Rasterizer + ?Sized,
{
    metrics: Vec<GlyphMetrics>,
    has_kerning: bool,
    line_spacing: f32,
    face: Mutex<R::Face>,
}

impl<R> FontGlyphs<R>
where
    R: Rasterizer + ?Sized,
{
    /// One entry per supported character, sorted by character.
    #[inline]
    pub fn metrics(&self) -> &[GlyphMetrics] {
        &self.metrics
    }

    /// Looks up the metrics of `character`.
    pub fn glyph(&self, character: char) -> Option<&GlyphMetrics> {
        self.metrics
            .binary_search_by_key(&character, |metrics| metrics.glyph)
            .ok()
            .map(|index| &self.metrics[index])
    }

    /// Returns true if the face carries kerning information.
    #[inline]
    pub fn has_kerning(&self) -> bool {
        self.has_kerning
    }

    /// Distance between successive baselines, in pixels.
    #[inline]
    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    /// Kerning between two glyph indices in 26.6 fixed point.
    pub(crate) fn kerning(&self, rasterizer: &R, left: u32, right: u32) -> i64 {
        let face = lock(&self.face);
        rasterizer.kerning(&face, left, right)
    }
}

impl<R> Debug for FontGlyphs<R>
where
    R: Rasterizer + ?Sized,
{
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("FontGlyphs")
            .field("glyphs", &self.metrics.len())
            .field("has_kerning", &self.has_kerning)
            .field("line_spacing", &self.line_spacing)
            .finish()
    }
}

/// A finished atlas: the packed RGBA image plus the metrics of every supported character.
///
/// Never mutated once built; share it freely.
pub struct FontAtlasData<R>
where
    R: Rasterizer + ?Sized,
{
    key: FontAtlasKey,
    atlas: Arc<Canvas>,
    layout: AtlasLayout,
    glyphs: Arc<FontGlyphs<R>>,
}

impl<R> FontAtlasData<R>
where
    R: Rasterizer + ?Sized,
{
    /// The key this atlas was built for.
    #[inline]
    pub fn key(&self) -> &FontAtlasKey {
        &self.key
    }

    /// The atlas image, ready for texture upload (bottom-left origin).
    #[inline]
    pub fn atlas(&self) -> &Canvas {
        &self.atlas
    }

    #[inline]
    pub(crate) fn shared_atlas(&self) -> &Arc<Canvas> {
        &self.atlas
    }

    /// Metrics, kerning and line spacing of the font.
    #[inline]
    pub fn glyphs(&self) -> &Arc<FontGlyphs<R>> {
        &self.glyphs
    }

    /// One entry per supported character, sorted by character.
    #[inline]
    pub fn metrics(&self) -> &[GlyphMetrics] {
        self.glyphs.metrics()
    }

    /// Looks up the metrics of `character`.
    #[inline]
    pub fn glyph(&self, character: char) -> Option<&GlyphMetrics> {
        self.glyphs.glyph(character)
    }

    /// The grid the atlas was laid out on.
    #[inline]
    pub fn layout(&self) -> &AtlasLayout {
        &self.layout
    }

    /// Returns true if the face carries kerning information.
    #[inline]
    pub fn has_kerning(&self) -> bool {
        self.glyphs.has_kerning()
    }

    /// Distance between successive baselines, in pixels.
    #[inline]
    pub fn line_spacing(&self) -> f32 {
        self.glyphs.line_spacing()
    }
}

impl<R> Debug for FontAtlasData<R>
where
    R: Rasterizer + ?Sized,
{
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("FontAtlasData")
            .field("key", &self.key)
            .field("layout", &self.layout)
            .field("glyphs", &self.glyphs)
            .finish()
    }
}

/// Notified when an atlas leaves the cache, so resources derived from it (such as the GPU
/// texture it was uploaded to) can be released under the same key.
pub trait UnloadListener: Send + Sync {
    /// Called after the atlas for `key` has been removed.
    fn atlas_unloaded(&self, key: &FontAtlasKey);
}

impl<F> UnloadListener for F
where
    F: Fn(&FontAtlasKey) + Send + Sync,
{
    #[inline]
    fn atlas_unloaded(&self, key: &FontAtlasKey) {
        self(key)
    }
}

type Slot<R> = Arc<OnceCell<Arc<FontAtlasData<R>>>>;

/// Builds font atlases on demand and keeps them per font file and size.
pub struct FontAtlasCache<R>
where
    R: Rasterizer,
{
    rasterizer: Arc<R>,
    options: AtlasOptions,
    entries: Mutex<HashMap<FontAtlasKey, Slot<R>>>,
    listeners: RwLock<Vec<Arc<dyn UnloadListener>>>,
}

impl<R> FontAtlasCache<R>
where
    R: Rasterizer,
{
    /// Creates an empty cache that rasterizes with `rasterizer`.
    #[inline]
    pub fn new(rasterizer: Arc<R>) -> FontAtlasCache<R> {
        FontAtlasCache::with_options(rasterizer, AtlasOptions::default())
    }

    /// Creates an empty cache with the given atlas options.
    pub fn with_options(rasterizer: Arc<R>, options: AtlasOptions) -> FontAtlasCache<R> {
        FontAtlasCache {
            rasterizer,
            options,
            entries: Mutex::new(HashMap::new()),
            listeners: RwLock::new(vec![]),
        }
    }

    /// The rasterizer shared by every atlas in this cache.
    #[inline]
    pub fn rasterizer(&self) -> &Arc<R> {
        &self.rasterizer
    }

    /// Returns the atlas for `key`, building it on first use.
    ///
    /// However many threads ask for the same key at once, the atlas is built once and all of
    /// them receive that result. A failed build is not remembered: the slot stays empty and the
    /// next request, or a caller already waiting on it, builds again in that same slot.
    pub fn get_item(&self, key: &FontAtlasKey) -> Result<Arc<FontAtlasData<R>>, FontLoadingError> {
        let slot = lock(&self.entries)
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        slot.get_or_try_init(|| self.build(key).map(Arc::new))
            .map(Arc::clone)
    }

    /// Returns a [`Font`] over the atlas for `key`, building the atlas on first use.
    pub fn load_font(&self, key: &FontAtlasKey) -> Result<Font<R>, FontLoadingError> {
        let data = self.get_item(key)?;
        Ok(Font::new(self.rasterizer.clone(), &data))
    }

    /// Removes the atlas for `key` and notifies every [`UnloadListener`].
    ///
    /// The atlas memory is released once the last outstanding reference (for example a
    /// [`Font`]) is dropped. Returns the removed atlas, if it had been built.
    pub fn unload(&self, key: &FontAtlasKey) -> Option<Arc<FontAtlasData<R>>> {
        let slot = lock(&self.entries).remove(key)?;
        let data = slot.get().cloned();
        if data.is_some() {
            debug!("unloaded font atlas for {} at {}px", key.path.display(), key.size);
            self.notify_unloaded(key);
        }
        data
    }

    /// Unloads every atlas.
    pub fn clear(&self) {
        let keys: Vec<FontAtlasKey> = lock(&self.entries).keys().cloned().collect();
        for key in keys {
            self.unload(&key);
        }
    }

    /// Registers a listener that is told about every unloaded key.
    pub fn add_unload_listener(&self, listener: Arc<dyn UnloadListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Returns true if a finished atlas for `key` is cached.
    pub fn contains(&self, key: &FontAtlasKey) -> bool {
        lock(&self.entries)
            .get(key)
            .map_or(false, |slot| slot.get().is_some())
    }

    /// Returns the number of finished atlases in the cache.
    pub fn len(&self) -> usize {
        lock(&self.entries)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns true if no finished atlas is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify_unloaded(&self, key: &FontAtlasKey) {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.atlas_unloaded(key);
        }
    }

    fn build(&self, key: &FontAtlasKey) -> Result<FontAtlasData<R>, FontLoadingError> {
        validate_path(&key.path)?;
        debug!("building font atlas for {} at {}px", key.path.display(), key.size);

        let rasterizer = &*self.rasterizer;
        let mut face = rasterizer.create_face(&key.path)?;
        rasterizer.set_character_size(&mut face, key.size)?;

        let characters = charset::supported_characters();
        let glyph_indices = rasterizer.glyph_indices(&face, &characters);
        let images = glyph_image::build_glyph_images(rasterizer, &mut face, &glyph_indices);
        let mut metrics = complete_metrics(
            rasterizer.glyph_metrics(&mut face, &glyph_indices),
            &characters,
        );

        let layout = AtlasLayout::plan_with_margin(&images, self.options.margin).map_err(|_| {
            FontLoadingError::EmptyGlyphSet {
                path: key.path.clone(),
                size: key.size,
            }
        })?;
        let atlas = atlas::composite(&images, &mut metrics, &layout);

        let glyphs = FontGlyphs {
            metrics: metrics.into_iter().map(|(_, metrics)| metrics).collect(),
            has_kerning: rasterizer.has_kerning(&face),
            line_spacing: rasterizer.line_spacing(&face),
            face: Mutex::new(face),
        };
        Ok(FontAtlasData {
            key: key.clone(),
            atlas: Arc::new(atlas),
            layout,
            glyphs: Arc::new(glyphs),
        })
    }
}

impl<R> Debug for FontAtlasCache<R>
where
    R: Rasterizer,
{
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("FontAtlasCache")
            .field("options", &self.options)
            .field("atlases", &self.len())
            .finish()
    }
}

fn validate_path(path: &Path) -> Result<(), FontLoadingError> {
    if path.as_os_str().is_empty() {
        return Err(FontLoadingError::EmptyPath);
    }
    if !path.is_file() {
        return Err(FontLoadingError::FileNotFound(path.to_owned()));
    }
    Ok(())
}

/// Keeps exactly one entry per supported character, filling gaps with empty metrics.
fn complete_metrics(
    mut metrics: BTreeMap<char, GlyphMetrics>,
    characters: &[char],
) -> BTreeMap<char, GlyphMetrics> {
    metrics.retain(|&character, _| charset::is_supported(character));
    for &character in characters {
        metrics.entry(character).or_insert_with(|| {
            warn!("complete_metrics(): no metrics for {:?}", character);
            GlyphMetrics::empty(character)
        });
    }
    for (&character, glyph_metrics) in metrics.iter_mut() {
        glyph_metrics.glyph = character;
    }
    metrics
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
