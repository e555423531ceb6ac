use super::*;
use crate::config::DecoderOpts;

fn engine() -> ReplayEngine {
    ReplayEngine::new(DecoderOpts::default().engine_setup(&[]))
}

fn chunk(specs: Vec<BitmapSpec>) -> Vec<u8> {
    ReplayChunk { bitmaps: specs }.to_bytes().unwrap()
}

fn spec(x: i32, y: i32) -> BitmapSpec {
    BitmapSpec {
        x,
        y,
        w: 2,
        h: 2,
        color: PackedColor(0xffffff00),
        coverage: None,
    }
}

#[test]
fn events_are_active_on_half_open_interval() {
    let mut e = engine();
    e.process_chunk(&chunk(vec![spec(0, 0)]), 1000, 500);
    assert!(e.render_frame(999).images.is_empty());
    assert_eq!(e.render_frame(1000).images.len(), 1);
    assert_eq!(e.render_frame(1499).images.len(), 1);
    assert!(e.render_frame(1500).images.is_empty());
}

#[test]
fn change_flag_tracks_active_set() {
    let mut e = engine();
    e.process_chunk(&chunk(vec![spec(0, 0)]), 0, 1000);
    e.process_chunk(&chunk(vec![spec(10, 0)]), 500, 1000);

    assert_eq!(e.render_frame(100).change, ImageChange::Content);
    assert_eq!(e.render_frame(200).change, ImageChange::None);
    let both = e.render_frame(600);
    assert_eq!(both.change, ImageChange::Content);
    assert_eq!(both.images.iter().map(|b| b.x).collect::<Vec<_>>(), vec![0, 10]);
}

#[test]
fn new_mapping_reports_position_change() {
    let mut e = engine();
    e.process_chunk(&chunk(vec![spec(0, 0)]), 0, 1000);
    let m = crate::foundation::core::FrameGeometry::uniform(64, 64).mapping();
    e.configure_frame(&m);
    assert_eq!(e.render_frame(0).change, ImageChange::Content);
    e.configure_frame(&m);
    assert_eq!(e.render_frame(1).change, ImageChange::None);
    let m2 = crate::foundation::core::FrameGeometry::uniform(128, 64).mapping();
    e.configure_frame(&m2);
    assert_eq!(e.render_frame(2).change, ImageChange::Position);
    assert_eq!(e.mapping(), Some(&m2));
}

#[test]
fn undecodable_and_duplicate_chunks_are_discarded() {
    let mut e = engine();
    e.process_chunk(b"Dialogue: not json", 0, 1000);
    assert_eq!(e.event_count(), 0);

    let mut bad = spec(0, 0);
    bad.coverage = Some(vec![1, 2, 3]);
    e.process_chunk(&chunk(vec![bad]), 0, 1000);
    assert_eq!(e.event_count(), 0);

    let ok = chunk(vec![spec(0, 0)]);
    e.process_chunk(&ok, 0, 1000);
    e.process_chunk(&ok, 0, 1000);
    assert_eq!(e.event_count(), 1);
}

#[test]
fn explicit_coverage_is_used_row_major() {
    let mut e = engine();
    let mut s = spec(0, 0);
    s.coverage = Some(vec![0, 64, 128, 255]);
    e.process_chunk(&chunk(vec![s]), 0, 10);
    let frame = e.render_frame(0);
    let b = &frame.images[0];
    assert_eq!(b.stride, 2);
    assert_eq!(b.row(1), &[128, 255]);
}

#[test]
fn header_and_overrides_are_recorded() {
    let mut e = engine();
    e.process_codec_private(b"[Script Info]");
    let o = ScriptOverrides {
        scaled_border_and_shadow: true,
        ycbcr_matrix: crate::layout::YCbCrMatrix::None,
        layout_res: (640, 360),
    };
    e.apply_overrides(&o);
    assert_eq!(e.header(), b"[Script Info]");
    assert_eq!(e.overrides(), Some(&o));
}
