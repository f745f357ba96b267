use anyhow::Context;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const UPLOADS_DIR: &str = "uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
        }
    }
}

/// Identifies an image payload by its leading bytes. Declared file names and
/// extensions are never consulted.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageKind> {
    if bytes.len() >= 3 && bytes[..3] == [0xFF, 0xD8, 0xFF] {
        return Some(ImageKind::Jpeg);
    }
    if bytes.len() >= 8 && bytes[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some(ImageKind::Png);
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(ImageKind::Webp);
    }
    None
}

/// Proof-of-payment images live under `<workspace>/uploads`, one file per
/// stored screenshot, named by a fresh v4 uuid. The returned URL is the
/// workspace-relative path of that file.
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(workspace: &Path) -> Self {
        ScreenshotStore {
            dir: workspace.join(UPLOADS_DIR),
        }
    }

    pub fn store(&self, bytes: &[u8], kind: ImageKind) -> anyhow::Result<String> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create uploads dir {}", self.dir.to_string_lossy())
        })?;
        let name = format!("{}.{}", Uuid::new_v4(), kind.extension());
        let path = self.dir.join(&name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;
        Ok(format!("{}/{}", UPLOADS_DIR, name))
    }
}
