//! Header fix-up for scripts authored against a legacy custom renderer.
//!
//! Those scripts declare a play resolution but rely on border/shadow scaling and color handling
//! that the reference renderer does not apply by default. They are recognised by a producer
//! signature in `Original Script:` and only when no later fix (`LayoutRes*`,
//! `ScaledBorderAndShadow:`) is present.

/// Marker left in `Original Script:` by the affected producer.
pub const LEGACY_PRODUCER_SIGNATURE: &str = "[http://www.crunchyroll.com/user/";

/// YCbCr matrix hint carried by a script header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum YCbCrMatrix {
    /// Header did not say; engine default applies.
    #[default]
    Default,
    /// Colors are used as-is, no matrix conversion.
    None,
}

/// Track-level overrides applied once, before the track receives events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptOverrides {
    pub scaled_border_and_shadow: bool,
    pub ycbcr_matrix: YCbCrMatrix,
    /// Layout resolution hint, taken from the declared play resolution.
    pub layout_res: (u32, u32),
}

/// Inspect the codec private header and return the overrides to apply, if the header matches the
/// legacy producer and declares a complete play resolution.
pub fn legacy_script_overrides(header: &[u8]) -> Option<ScriptOverrides> {
    let text = String::from_utf8_lossy(header);
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

    if !lines.next()?.starts_with("[Script Info]") {
        return None;
    }

    let mut play_res = [0u32; 2];
    let mut matched = false;
    for line in lines {
        if line.starts_with('[') {
            break;
        }
        if let Some(rest) = line.strip_prefix("PlayResX: ") {
            play_res[0] = leading_u32(rest);
        } else if let Some(rest) = line.strip_prefix("PlayResY: ") {
            play_res[1] = leading_u32(rest);
        } else if line.starts_with("Original Script: ") {
            matched = line.contains(LEGACY_PRODUCER_SIGNATURE);
            if !matched {
                break;
            }
        } else if line.starts_with("LayoutRes") || line.starts_with("ScaledBorderAndShadow:") {
            matched = false;
            break;
        }
    }

    if !matched || play_res[0] == 0 || play_res[1] == 0 {
        return None;
    }
    Some(ScriptOverrides {
        scaled_border_and_shadow: true,
        ycbcr_matrix: YCbCrMatrix::None,
        layout_res: (play_res[0], play_res[1]),
    })
}

fn leading_u32(s: &str) -> u32 {
    let s = s.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/compat.rs"]
mod tests;
