//! Chart screenshots: which charts are expected, where they live on disk,
//! and how they are encoded for the vision APIs
//!
//! Capturing is done by an external tool. This module only picks up the
//! files it leaves in `SCREENSHOT_DIR/{symbol}/`.

use crate::config::ScreenshotConfig;
use crate::error::{Result, WatchError};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chartwatch_llm::ImageSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Kind of chart shown in a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    TrendAnalysis,
    HeikenAshi,
    VolumeLayout,
    UtBot,
    VolumeProfile,
    Workspace,
}

impl ChartKind {
    /// All kinds in prompt order
    pub const ALL: [ChartKind; 6] = [
        ChartKind::TrendAnalysis,
        ChartKind::HeikenAshi,
        ChartKind::VolumeLayout,
        ChartKind::UtBot,
        ChartKind::Workspace,
        ChartKind::VolumeProfile,
    ];

    /// Stable key, used in template names
    pub fn key(self) -> &'static str {
        match self {
            Self::TrendAnalysis => "trend_analysis",
            Self::HeikenAshi => "heiken_ashi",
            Self::VolumeLayout => "volume_layout",
            Self::UtBot => "utbot",
            Self::VolumeProfile => "volumeprofile",
            Self::Workspace => "workspace",
        }
    }

    /// Human-readable window title
    pub fn title(self) -> &'static str {
        match self {
            Self::TrendAnalysis => "Trend Analysis",
            Self::HeikenAshi => "Smoothed Heiken Ashi",
            Self::VolumeLayout => "Volume Layout",
            Self::UtBot => "UT Bot -Lorentzian",
            Self::VolumeProfile => "Volume Profile",
            Self::Workspace => "Symbolik Workspace",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An expected screenshot: chart kind plus file name pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSlot {
    pub kind: ChartKind,
    /// File name with `{symbol}` placeholder
    pub pattern: String,
}

impl ChartSlot {
    pub fn new(kind: ChartKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }

    /// File name for `symbol`
    pub fn file_name(&self, symbol: &str) -> String {
        self.pattern.replace("{symbol}", symbol)
    }

    /// Slots implied by the configuration
    pub fn from_config(config: &ScreenshotConfig) -> Vec<Self> {
        let mut slots = Vec::new();
        if config.tradingview_enabled {
            let kinds = [
                ChartKind::TrendAnalysis,
                ChartKind::HeikenAshi,
                ChartKind::VolumeLayout,
                ChartKind::VolumeProfile,
            ];
            slots.extend(
                kinds
                    .into_iter()
                    .zip(&config.tab_names)
                    .map(|(kind, name)| Self::new(kind, name.clone())),
            );
        }
        if config.symbolik_enabled {
            slots.push(Self::new(ChartKind::Workspace, config.symbolik_name.clone()));
        }
        slots
    }
}

/// Screenshots found for one symbol
#[derive(Debug, Clone)]
pub struct ScreenshotSet {
    pub symbol: String,
    /// Per-symbol folder; reports are written here too
    pub folder: PathBuf,
    pub entries: Vec<(ChartKind, PathBuf)>,
}

impl ScreenshotSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Chart kinds present, in slot order
    pub fn kinds(&self) -> Vec<ChartKind> {
        self.entries.iter().map(|(kind, _)| *kind).collect()
    }

    /// Read and base64-encode every screenshot
    ///
    /// Unreadable files are skipped with a warning. A set that yields no
    /// image at all is an error.
    pub async fn encode(&self) -> Result<Vec<EncodedImage>> {
        let mut images = Vec::with_capacity(self.entries.len());
        for (kind, path) in &self.entries {
            match EncodedImage::from_path(path).await {
                Ok(image) => {
                    debug!("Encoded {} screenshot ({} bytes base64)", kind, image.data.len());
                    images.push(image);
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        if images.is_empty() {
            return Err(WatchError::screenshot(&self.symbol, "no readable screenshots"));
        }
        Ok(images)
    }
}

/// Where screenshots come from
#[async_trait]
pub trait ScreenshotSource: Send + Sync {
    /// Collect the screenshots for `symbol`
    async fn acquire(&self, symbol: &str) -> Result<ScreenshotSet>;
}

/// Reads screenshots from `root/{symbol}/`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    slots: Vec<ChartSlot>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, slots: Vec<ChartSlot>) -> Self {
        Self {
            root: root.into(),
            slots,
        }
    }

    pub fn from_config(config: &ScreenshotConfig) -> Self {
        Self::new(config.dir.clone(), ChartSlot::from_config(config))
    }

    /// Per-symbol folder
    pub fn folder(&self, symbol: &str) -> PathBuf {
        self.root.join(symbol)
    }
}

#[async_trait]
impl ScreenshotSource for DirectorySource {
    async fn acquire(&self, symbol: &str) -> Result<ScreenshotSet> {
        let folder = self.folder(symbol);
        let mut entries = Vec::new();

        for slot in &self.slots {
            let path = folder.join(slot.file_name(symbol));
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => entries.push((slot.kind, path)),
                _ => debug!("No {} screenshot at {}", slot.kind, path.display()),
            }
        }

        info!(
            "Found {}/{} screenshots for {} in {}",
            entries.len(),
            self.slots.len(),
            symbol,
            folder.display()
        );

        Ok(ScreenshotSet {
            symbol: symbol.to_string(),
            folder,
            entries,
        })
    }
}

/// A base64-encoded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub media_type: String,
    pub data: String,
}

impl EncodedImage {
    /// Read and encode a file
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(&bytes, media_type_for(path)))
    }

    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        Self {
            media_type: media_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    /// `data:` URI
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

impl From<EncodedImage> for ImageSource {
    fn from(image: EncodedImage) -> Self {
        ImageSource::Base64 {
            media_type: image.media_type,
            data: image.data,
        }
    }
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
