use std::path::{Path, PathBuf};

use crate::foundation::error::{SubError, SubResult};
use crate::layout::{EngineSetup, Hinting};
use crate::region::builder::DEFAULT_MAX_REGIONS;

const TRUETYPE_MIME: &str = "application/x-truetype-font";
const FONT_EXTENSIONS: [&str; 3] = [".ttf", ".otf", ".ttc"];

/// Decoder options, usually loaded once per track.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderOpts {
    /// Additional fonts directory.
    pub fonts_dir: Option<PathBuf>,
    /// Upper bound on regions produced per frame. Values below 1 are treated as 1.
    pub max_regions: usize,
    /// Draw a one-pixel opaque frame around each region.
    pub debug_outline: bool,
    /// Overrides the platform default font family.
    pub default_family: Option<String>,
}

impl Default for DecoderOpts {
    fn default() -> Self {
        Self {
            fonts_dir: None,
            max_regions: DEFAULT_MAX_REGIONS,
            debug_outline: false,
            default_family: None,
        }
    }
}

impl DecoderOpts {
    /// Load options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SubResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| SubError::validation(format!("read '{}': {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| SubError::serde(e.to_string()))
    }

    pub(crate) fn effective_max_regions(&self) -> usize {
        self.max_regions.max(1)
    }

    /// Engine setup for this track: filtered embedded fonts plus fixed engine tuning.
    pub(crate) fn engine_setup(&self, attachments: &[FontAttachment]) -> EngineSetup {
        let fonts = attachments
            .iter()
            .filter(|a| a.is_font())
            .inspect(|a| tracing::debug!(name = %a.name, bytes = a.data.len(), "adding embedded font"))
            .cloned()
            .collect();
        let (default_font, family) = platform_default_font();
        EngineSetup {
            fonts,
            fonts_dir: self.fonts_dir.clone(),
            default_font,
            default_family: self.default_family.clone().unwrap_or(family),
            extract_fonts: true,
            use_margins: false,
            font_scale: 1.0,
            line_spacing: 0.0,
            hinting: Hinting::None,
        }
    }
}

/// File attached to the media container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontAttachment {
    pub name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

impl FontAttachment {
    /// TrueType mime type, or a name longer than the extension ending in a font extension.
    pub fn is_font(&self) -> bool {
        if self.mime.eq_ignore_ascii_case(TRUETYPE_MIME) {
            return true;
        }
        let name = self.name.as_bytes();
        if name.len() <= 4 {
            return false;
        }
        let ext = &name[name.len() - 4..];
        FONT_EXTENSIONS
            .iter()
            .any(|e| ext.eq_ignore_ascii_case(e.as_bytes()))
    }
}

#[cfg(target_os = "android")]
fn platform_default_font() -> (Option<PathBuf>, String) {
    let noto = Path::new("/system/fonts/NotoSansCJK-Regular.ttc");
    if std::fs::File::open(noto).is_ok() {
        (Some(noto.to_path_buf()), "Noto Sans".to_string())
    } else {
        (
            Some(PathBuf::from("/system/fonts/DroidSans-Bold.ttf")),
            "Droid Sans Bold".to_string(),
        )
    }
}

#[cfg(target_os = "macos")]
fn platform_default_font() -> (Option<PathBuf>, String) {
    (None, "Helvetica Neue".to_string())
}

#[cfg(not(any(target_os = "android", target_os = "macos")))]
fn platform_default_font() -> (Option<PathBuf>, String) {
    (None, "Arial".to_string())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
