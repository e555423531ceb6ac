use super::*;
use crate::foundation::core::FrameMapping;
use crate::layout::{RenderedFrame, ScriptOverrides};

#[derive(Default)]
struct Recorder {
    header: Vec<u8>,
    overrides: Option<ScriptOverrides>,
    chunks: Vec<(Vec<u8>, i64, i64)>,
}

impl LayoutEngine for Recorder {
    fn process_codec_private(&mut self, data: &[u8]) {
        self.header = data.to_vec();
    }

    fn apply_overrides(&mut self, overrides: &ScriptOverrides) {
        self.overrides = Some(*overrides);
    }

    fn process_chunk(&mut self, data: &[u8], start_ms: i64, duration_ms: i64) {
        self.chunks.push((data.to_vec(), start_ms, duration_ms));
    }

    fn configure_frame(&mut self, _mapping: &FrameMapping) {}

    fn render_frame(&mut self, _now_ms: i64) -> RenderedFrame {
        RenderedFrame::default()
    }
}

fn ssa(extra: &[u8]) -> TrackFormat {
    TrackFormat {
        codec: SubtitleCodec::Ssa,
        extra: extra.to_vec(),
    }
}

fn open(extra: &[u8]) -> SubtitleDecoder<Recorder> {
    SubtitleDecoder::open(&ssa(extra), DecoderOpts::default(), &[], |_| {
        Ok(Recorder::default())
    })
    .expect("open")
}

fn block(data: &str, pts_ms: i64, dur_ms: i64) -> SubtitleBlock {
    SubtitleBlock::new(data, Tick::from_millis(pts_ms), Tick::from_millis(dur_ms))
}

#[test]
fn other_codecs_are_rejected() {
    let fmt = TrackFormat {
        codec: SubtitleCodec::Other("srt".into()),
        extra: vec![],
    };
    let res = SubtitleDecoder::open(&fmt, DecoderOpts::default(), &[], |_| {
        Ok(Recorder::default())
    });
    assert!(matches!(res, Err(SubError::Unsupported(_))));
}

#[test]
fn engine_factory_failure_is_a_setup_error() {
    let res: SubResult<SubtitleDecoder<Recorder>> =
        SubtitleDecoder::open(&ssa(b""), DecoderOpts::default(), &[], |_| {
            Err(anyhow::anyhow!("no renderer"))
        });
    let err = res.err().expect("setup failure");
    assert!(matches!(err, SubError::Setup(_)));
    assert!(err.to_string().contains("no renderer"));
}

#[test]
fn factory_sees_filtered_fonts() {
    let fonts = [
        FontAttachment {
            name: "a.ttf".into(),
            mime: String::new(),
            data: vec![1],
        },
        FontAttachment {
            name: "notes.txt".into(),
            mime: "text/plain".into(),
            data: vec![2],
        },
    ];
    let mut seen = 0;
    SubtitleDecoder::open(&ssa(b""), DecoderOpts::default(), &fonts, |setup| {
        seen = setup.fonts.len();
        Ok(Recorder::default())
    })
    .expect("open");
    assert_eq!(seen, 1);
}

#[test]
fn header_is_fed_and_patched_before_chunks() {
    let header = b"[Script Info]\nPlayResX: 640\nPlayResY: 480\nOriginal Script: a [http://www.crunchyroll.com/user/a]\n";
    let dec = open(header);
    dec.with_engine(|e| {
        assert_eq!(e.header, header.to_vec());
        assert_eq!(e.overrides.map(|o| o.layout_res), Some((640, 480)));
        assert!(e.chunks.is_empty());
    });

    let plain = open(b"[Script Info]\nPlayResX: 640\n");
    plain.with_engine(|e| assert!(e.overrides.is_none()));
}

#[test]
fn new_timestamp_creates_a_unit_holding_the_engine() {
    let mut dec = open(b"");
    assert_eq!(dec.handle_count(), 1);

    let unit = dec.decode(block("a", 1_000, 2_000)).expect("unit");
    assert_eq!(unit.start(), Tick::from_millis(1_000));
    assert_eq!(unit.stop(), Tick::from_millis(3_000));
    assert!(unit.is_ephemeral());
    assert_eq!(dec.handle_count(), 2);

    // Same timestamp: chunk is fed, no new unit.
    assert!(dec.decode(block("b", 1_000, 2_000)).is_none());
    dec.with_engine(|e| {
        assert_eq!(e.chunks.len(), 2);
        assert_eq!(e.chunks[1], (b"b".to_vec(), 1_000, 2_000));
    });

    drop(unit);
    assert_eq!(dec.handle_count(), 1);
}

#[test]
fn stop_never_moves_backwards() {
    let mut dec = open(b"");
    let a = dec.decode(block("a", 0, 5_000)).unwrap();
    let b = dec.decode(block("b", 1_000, 1_000)).unwrap();
    assert_eq!(a.stop(), Tick::from_millis(5_000));
    assert_eq!(b.stop(), Tick::from_millis(5_000));

    dec.flush();
    let c = dec.decode(block("c", 1_000, 1_000)).unwrap();
    assert_eq!(c.stop(), Tick::from_millis(2_000));
}

#[test]
fn empty_and_corrupted_blocks_are_discarded() {
    let mut dec = open(b"");
    assert!(dec.decode(block("", 0, 1_000)).is_none());
    assert!(dec.decode(SubtitleBlock::new(vec![0u8, b'x'], Tick(0), Tick(0))).is_none());

    let _unit = dec.decode(block("a", 0, 1_000)).unwrap();
    let mut bad = block("b", 0, 1_000);
    bad.corrupted = true;
    assert!(dec.decode(bad).is_none());
    dec.with_engine(|e| assert_eq!(e.chunks.len(), 1));

    // Corruption reset the timing state, so the same timestamp starts a fresh unit.
    assert!(dec.decode(block("c", 0, 1_000)).is_some());
}

#[test]
fn units_outlive_the_decoder() {
    let mut dec = open(b"");
    let mut unit = dec.decode(block("a", 0, 1_000)).unwrap();
    drop(dec);
    let out = unit.update(&crate::session::overlay::UpdateRequest {
        pts: Tick(0),
        geometry: crate::foundation::core::FrameGeometry::uniform(64, 64),
    });
    assert_eq!(out, crate::session::overlay::UpdateOutcome::Cleared);
}
