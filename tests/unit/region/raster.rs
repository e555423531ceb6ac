use super::*;
use crate::layout::PackedColor;

const WHITE: PackedColor = PackedColor(0xffffff00);

fn region(x0: i32, y0: i32, x1: i32, y1: i32) -> Region {
    Region::alloc(IntRect::new(x0, y0, x1, y1)).expect("alloc")
}

#[test]
fn blend_into_empty_pixel_overwrites() {
    assert_eq!(blend_pixel([0; 4], [10, 20, 30], 255, 255), [10, 20, 30, 255]);
    assert_eq!(blend_pixel([0; 4], [1, 2, 3], 200, 128), [1, 2, 3, 100]);
}

#[test]
fn zero_coverage_is_a_noop() {
    let dst = [9, 8, 7, 6];
    assert_eq!(blend_pixel(dst, [255, 255, 255], 255, 0), dst);
}

#[test]
fn opaque_source_replaces_opaque_destination() {
    assert_eq!(
        blend_pixel([255, 0, 0, 255], [0, 0, 255], 255, 255),
        [0, 0, 255, 255]
    );
}

#[test]
fn partial_blend_matches_reference_integer_math() {
    assert_eq!(
        blend_pixel([200, 100, 0, 128], [0, 0, 200], 255, 128),
        [65, 32, 133, 192]
    );
    assert_eq!(
        blend_pixel([255, 255, 255, 100], [0, 0, 0], 50, 255),
        [155, 155, 155, 131]
    );
}

#[test]
fn empty_region_is_fully_transparent() {
    let mut r = region(0, 0, 8, 4);
    r.data.fill(0xaa);
    draw_region(&mut r, &[], RasterOpts::default());
    assert!(r.data.iter().all(|&b| b == 0));
    assert_eq!(r.stride, 32);
}

#[test]
fn opaque_white_bitmap_is_copied() {
    let mut r = region(0, 0, 10, 10);
    draw_region(&mut r, &[Bitmap::solid(0, 0, 10, 10, WHITE)], RasterOpts::default());
    assert_eq!(r.pixel(5, 5), [255, 255, 255, 255]);
    assert_eq!(r.pixel(0, 9), [255, 255, 255, 255]);
}

#[test]
fn bitmap_is_placed_relative_to_region_origin() {
    let mut r = region(100, 50, 110, 60);
    let red = PackedColor::from_rgba(255, 0, 0, 255);
    draw_region(&mut r, &[Bitmap::solid(104, 53, 2, 1, red)], RasterOpts::default());
    assert_eq!(r.pixel(4, 3), [255, 0, 0, 255]);
    assert_eq!(r.pixel(5, 3), [255, 0, 0, 255]);
    assert_eq!(r.pixel(6, 3), [0, 0, 0, 0]);
    assert_eq!(r.pixel(4, 4), [0, 0, 0, 0]);
}

#[test]
fn partially_contained_bitmaps_are_dropped() {
    let mut r = region(0, 0, 10, 10);
    draw_region(&mut r, &[Bitmap::solid(5, 5, 10, 10, WHITE)], RasterOpts::default());
    assert!(r.data.iter().all(|&b| b == 0));
}

#[test]
fn fully_transparent_color_is_skipped() {
    let mut r = region(0, 0, 4, 4);
    draw_region(
        &mut r,
        &[Bitmap::solid(0, 0, 4, 4, PackedColor(0xffffffff))],
        RasterOpts::default(),
    );
    assert!(r.data.iter().all(|&b| b == 0));
}

#[test]
fn later_bitmaps_draw_on_top() {
    let mut r = region(0, 0, 2, 2);
    let red = PackedColor::from_rgba(255, 0, 0, 255);
    let blue = PackedColor::from_rgba(0, 0, 255, 255);
    draw_region(
        &mut r,
        &[Bitmap::solid(0, 0, 2, 2, red), Bitmap::solid(1, 0, 1, 2, blue)],
        RasterOpts::default(),
    );
    assert_eq!(r.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(r.pixel(1, 1), [0, 0, 255, 255]);
}

#[test]
fn coverage_rows_follow_stride() {
    let mut r = region(0, 0, 2, 2);
    let bmp = Bitmap::new(0, 0, 2, 2, 3, vec![255, 0, 9, 0, 255, 9], WHITE);
    draw_region(&mut r, &[bmp], RasterOpts::default());
    assert_eq!(r.pixel(0, 0)[3], 255);
    assert_eq!(r.pixel(1, 0)[3], 0);
    assert_eq!(r.pixel(0, 1)[3], 0);
    assert_eq!(r.pixel(1, 1)[3], 255);
}

#[test]
fn malformed_coverage_is_skipped() {
    let mut r = region(0, 0, 4, 4);
    let bmp = Bitmap::new(0, 0, 4, 4, 4, vec![255; 10], WHITE);
    draw_region(&mut r, &[bmp], RasterOpts::default());
    assert!(r.data.iter().all(|&b| b == 0));
}

#[test]
fn redraw_starts_from_a_clear_buffer() {
    let mut r = region(0, 0, 4, 4);
    draw_region(&mut r, &[Bitmap::solid(0, 0, 4, 4, WHITE)], RasterOpts::default());
    draw_region(&mut r, &[Bitmap::solid(0, 0, 1, 1, WHITE)], RasterOpts::default());
    assert_eq!(r.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(r.pixel(3, 3), [0, 0, 0, 0]);
}

#[test]
fn outline_frames_the_region() {
    let mut r = region(0, 0, 4, 3);
    draw_region(&mut r, &[], RasterOpts { outline: true });
    for (x, y) in [(0, 0), (3, 0), (0, 2), (3, 2), (1, 0), (0, 1)] {
        assert_eq!(r.pixel(x, y), [0, 0, 0, 255]);
    }
    assert_eq!(r.pixel(1, 1), [0, 0, 0, 0]);
    assert_eq!(r.pixel(2, 1), [0, 0, 0, 0]);
}

#[test]
fn blend_never_wraps_color_channels() {
    for ao in 1..=255u8 {
        for coverage in 1..=255u8 {
            let out = blend_pixel([255, 255, 255, ao], [255, 255, 255], 255, coverage);
            assert!(out[3] >= ao);
            assert!(out[..3].iter().all(|&c| c >= 127), "ao={ao} coverage={coverage}");
        }
    }
}

#[test]
fn bitmap_running_past_the_plane_edge_is_skipped() {
    let x = i32::MAX - 4;
    let mut r = region(x, 0, i32::MAX, 2);
    let overhanging = Bitmap::solid(x, 0, 10, 2, WHITE);
    let inside = Bitmap::solid(x, 0, 4, 2, WHITE);
    draw_region(&mut r, &[overhanging], RasterOpts::default());
    assert!(r.data.iter().all(|&b| b == 0));
    draw_region(&mut r, &[inside], RasterOpts::default());
    assert_eq!(r.pixel(3, 1), [255, 255, 255, 255]);
    assert_eq!(r.pixel(0, 0), [255, 255, 255, 255]);
}
