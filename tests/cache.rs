// font-atlas/tests/cache.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Atlas building and caching.

mod common;

use common::{FakeRasterizer, EXISTING_FILE_PATH, MISSING_FILE_PATH};
use font_atlas::atlas::{AtlasOptions, ANTI_CROP_MARGIN};
use font_atlas::cache::{FontAtlasCache, FontAtlasKey};
use font_atlas::canvas::Format;
use font_atlas::charset::{self, SPACE};
use font_atlas::error::FontLoadingError;
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

fn key(size: u32) -> FontAtlasKey {
    FontAtlasKey::new(EXISTING_FILE_PATH, size)
}

fn overlaps(a: RectI, b: RectI) -> bool {
    a.min_x() < b.max_x() && b.min_x() < a.max_x() && a.min_y() < b.max_y() && b.min_y() < a.max_y()
}

fn inside(outer: RectI, inner: RectI) -> bool {
    inner.min_x() >= outer.min_x()
        && inner.min_y() >= outer.min_y()
        && inner.max_x() <= outer.max_x()
        && inner.max_y() <= outer.max_y()
}

#[test]
pub fn get_item_is_idempotent() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let first = cache.get_item(&key(16)).unwrap();
    let second = cache.get_item(&key(16)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.rasterizer().faces_created(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
pub fn different_sizes_are_different_atlases() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let small = cache.get_item(&key(12)).unwrap();
    let large = cache.get_item(&key(24)).unwrap();
    assert!(!Arc::ptr_eq(&small, &large));
    assert!(large.layout().cell_size.y() > small.layout().cell_size.y());
    assert_eq!(cache.rasterizer().faces_created(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
pub fn metrics_cover_every_supported_character_once() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let data = cache.get_item(&key(16)).unwrap();

    let glyphs: Vec<char> = data.metrics().iter().map(|metrics| metrics.glyph).collect();
    let mut expected = charset::supported_characters();
    expected.sort();
    assert_eq!(glyphs, expected);
    assert_eq!(data.metrics().len(), 95);

    for character in charset::supported_characters() {
        assert_eq!(data.glyph(character).unwrap().glyph, character);
    }
    assert!(data.glyph('©').is_none());
}

#[test]
pub fn space_has_no_atlas_region() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let data = cache.get_item(&key(16)).unwrap();
    let space = data.glyph(SPACE).unwrap();
    assert_eq!(space.glyph_bounds, RectI::new(Vector2I::zero(), Vector2I::zero()));
    assert!(!space.has_image());
    assert_eq!(space.horizontal_advance, common::advance(16));
}

#[test]
pub fn glyph_regions_are_packed_without_overlap() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let data = cache.get_item(&key(20)).unwrap();
    let layout = data.layout();
    let atlas = data.atlas();

    assert_eq!(atlas.format, Format::Rgba32);
    assert_eq!(atlas.size, Vector2I::new(layout.width as i32, layout.height as i32));
    assert_eq!((layout.rows, layout.columns), (11, 11));

    let atlas_rect = RectI::new(Vector2I::zero(), atlas.size);
    let regions: Vec<RectI> = data
        .metrics()
        .iter()
        .filter(|metrics| metrics.glyph != SPACE)
        .map(|metrics| {
            let bounds = metrics.glyph_bounds;
            assert_eq!(bounds.size(), common::glyph_size(metrics.glyph, 20));
            assert!(inside(atlas_rect, bounds), "{:?} escapes the atlas", metrics.glyph);
            bounds
        })
        .collect();
    assert_eq!(regions.len(), 94);

    for (index, a) in regions.iter().enumerate() {
        for b in &regions[index + 1..] {
            assert!(!overlaps(*a, *b), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
pub fn glyph_pixels_are_stored_bottom_up() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let data = cache.get_item(&key(16)).unwrap();
    let atlas = data.atlas();
    let height = atlas.size.y();

    for character in "Aa?~".chars() {
        let bounds = data.glyph(character).unwrap().glyph_bounds;
        for y in bounds.min_y()..bounds.max_y() {
            let pixel = atlas.pixel_at(bounds.min_x(), height - 1 - y).unwrap();
            assert_eq!(pixel, &[255, 255, 255, 255]);
        }
        // The margin to the right of the glyph stays transparent.
        let pixel = atlas.pixel_at(bounds.max_x(), height - 1 - bounds.min_y()).unwrap();
        assert_eq!(pixel[3], 0);
    }
}

#[test]
pub fn custom_margin_changes_cell_size() {
    let cache = FontAtlasCache::with_options(
        Arc::new(FakeRasterizer::new()),
        AtlasOptions { margin: 0 },
    );
    let data = cache.get_item(&key(16)).unwrap();
    let default_cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let default_data = default_cache.get_item(&key(16)).unwrap();
    assert_eq!(
        default_data.layout().cell_size - data.layout().cell_size,
        Vector2I::splat(ANTI_CROP_MARGIN as i32)
    );
}

#[test]
pub fn empty_path_is_rejected() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    match cache.get_item(&FontAtlasKey::new("", 16)) {
        Err(FontLoadingError::EmptyPath) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(cache.rasterizer().faces_created(), 0);
    assert!(cache.is_empty());
}

#[test]
pub fn missing_file_is_rejected() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    match cache.get_item(&FontAtlasKey::new(MISSING_FILE_PATH, 16)) {
        Err(FontLoadingError::FileNotFound(path)) => {
            assert_eq!(path.to_str(), Some(MISSING_FILE_PATH))
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(cache.rasterizer().faces_created(), 0);
}

#[test]
pub fn rejected_character_size_is_reported() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    match cache.get_item(&key(0)) {
        Err(FontLoadingError::CharacterSize { size: 0, .. }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
pub fn failed_builds_are_retried() {
    let rasterizer = FakeRasterizer::new();
    rasterizer.fail_next_face.store(true, Ordering::SeqCst);
    let cache = FontAtlasCache::new(Arc::new(rasterizer));

    match cache.get_item(&key(16)) {
        Err(FontLoadingError::Parse(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!cache.contains(&key(16)));

    assert!(cache.get_item(&key(16)).is_ok());
    assert!(cache.contains(&key(16)));
    assert_eq!(cache.rasterizer().faces_created(), 2);
}

#[test]
pub fn glyphs_that_fail_to_rasterize_are_left_out() {
    let rasterizer = FakeRasterizer {
        failing: vec!['A', 'b'],
        missing: vec!['Z'],
        ..FakeRasterizer::default()
    };
    let cache = FontAtlasCache::new(Arc::new(rasterizer));
    let data = cache.get_item(&key(16)).unwrap();

    assert_eq!(data.metrics().len(), 95);
    assert!(!data.glyph('A').unwrap().has_image());
    assert!(!data.glyph('b').unwrap().has_image());
    let missing = data.glyph('Z').unwrap();
    assert!(!missing.has_image());
    assert_eq!(missing.char_index, 0);
    assert_eq!(missing.horizontal_advance, 0.0);
    assert!(data.glyph('B').unwrap().has_image());
}

#[test]
pub fn font_without_any_glyph_image_fails() {
    let rasterizer = FakeRasterizer {
        missing: charset::supported_characters(),
        ..FakeRasterizer::default()
    };
    let cache = FontAtlasCache::new(Arc::new(rasterizer));
    match cache.get_item(&key(16)) {
        Err(FontLoadingError::EmptyGlyphSet { size: 16, .. }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(cache.is_empty());
}

#[test]
pub fn concurrent_requests_build_once() {
    const THREADS: usize = 8;

    let rasterizer = FakeRasterizer {
        face_delay: Some(Duration::from_millis(50)),
        ..FakeRasterizer::default()
    };
    let cache = Arc::new(FontAtlasCache::new(Arc::new(rasterizer)));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.get_item(&key(16)).unwrap()
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    assert_eq!(cache.rasterizer().faces_created(), 1);
    for data in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], data));
    }
}

#[test]
pub fn waiting_callers_retry_a_failed_build_in_the_same_slot() {
    let rasterizer = FakeRasterizer {
        face_delay: Some(Duration::from_millis(200)),
        ..FakeRasterizer::default()
    };
    rasterizer.fail_next_face.store(true, Ordering::SeqCst);
    let cache = Arc::new(FontAtlasCache::new(Arc::new(rasterizer)));
    let barrier = Arc::new(Barrier::new(2));
    let (sender, receiver) = mpsc::channel();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            let sender = sender.clone();
            thread::spawn(move || {
                barrier.wait();
                sender.send(cache.get_item(&key(16))).unwrap();
            })
        })
        .collect();

    // The first build fails; the other caller was already waiting and builds again.
    assert!(receiver.recv().unwrap().is_err());

    // A caller arriving now joins that rebuild instead of starting its own.
    let late = cache.get_item(&key(16)).unwrap();
    let waiting = receiver.recv().unwrap().unwrap();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(Arc::ptr_eq(&late, &waiting));
    assert!(Arc::ptr_eq(&late, &cache.get_item(&key(16)).unwrap()));
    assert_eq!(cache.rasterizer().faces_created(), 2);
}

#[test]
pub fn concurrent_requests_for_different_keys_each_build() {
    let rasterizer = FakeRasterizer {
        face_delay: Some(Duration::from_millis(20)),
        ..FakeRasterizer::default()
    };
    let cache = Arc::new(FontAtlasCache::new(Arc::new(rasterizer)));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.get_item(&key(10 + index)).unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.rasterizer().faces_created(), 4);
    assert_eq!(cache.len(), 4);
}

#[test]
pub fn unload_removes_and_notifies() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let unloaded = Arc::new(Mutex::new(vec![]));
    let recorded = unloaded.clone();
    cache.add_unload_listener(Arc::new(move |key: &FontAtlasKey| {
        recorded.lock().unwrap().push(key.clone());
    }));

    let font = cache.load_font(&key(16)).unwrap();
    let removed = cache.unload(&key(16)).unwrap();
    assert!(ptr::eq(removed.atlas(), font.atlas().unwrap()));
    assert!(!cache.contains(&key(16)));
    assert_eq!(*unloaded.lock().unwrap(), vec![key(16)]);

    // The font keeps its atlas alive after the cache lets go.
    assert!(font.glyph('a').is_some());

    // Unknown keys are a no-op.
    assert!(cache.unload(&key(16)).is_none());
    assert_eq!(unloaded.lock().unwrap().len(), 1);

    // The next request builds a fresh atlas.
    let rebuilt = cache.get_item(&key(16)).unwrap();
    assert!(!Arc::ptr_eq(&rebuilt, &removed));
    assert_eq!(cache.rasterizer().faces_created(), 2);
}

#[test]
pub fn clear_unloads_everything() {
    let cache = FontAtlasCache::new(Arc::new(FakeRasterizer::new()));
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    cache.add_unload_listener(Arc::new(move |_: &FontAtlasKey| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    for size in &[8, 12, 16] {
        cache.get_item(&key(*size)).unwrap();
    }
    assert_eq!(cache.len(), 3);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(notifications.load(Ordering::SeqCst), 3);
}
