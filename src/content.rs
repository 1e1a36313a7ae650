//! Content resolution and upload collaborators.
//!
//! The engine never fetches anything itself. It hands references to a
//! [`ContentResolver`], asks the scene to load the returned
//! [`RenderableSource`], and waits for the host to report back through
//! `upload_finished`, `content_loaded` or `content_failed`.

use crate::error::EngineResult;
use crate::geometry::Size;
use crate::types::{ObjectId, ObjectKind};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// Cross-origin mode the scene should use when loading a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossOrigin {
    /// CORS request without credentials
    #[default]
    Anonymous,
    /// No CORS attribute at all. Used for the single retry after a CORS failure.
    Omit,
}

/// Something the scene knows how to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderableSource {
    pub url: String,
    pub cross_origin: CrossOrigin,
}

impl RenderableSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cross_origin: CrossOrigin::Anonymous,
        }
    }

    /// Local and inline sources never need CORS.
    pub fn for_reference(reference: &str) -> Self {
        let cross_origin = if reference.starts_with("data:") || reference.starts_with("blob:") || reference.starts_with("file:") {
            CrossOrigin::Omit
        } else {
            CrossOrigin::Anonymous
        };
        Self {
            url: reference.to_string(),
            cross_origin,
        }
    }

    #[must_use]
    pub fn without_cross_origin(&self) -> Self {
        Self {
            url: self.url.clone(),
            cross_origin: CrossOrigin::Omit,
        }
    }

    pub fn is_proxied(&self, proxy_prefix: &str) -> bool {
        !proxy_prefix.is_empty() && self.url.starts_with(proxy_prefix)
    }

    /// The direct URL hidden behind a proxy path, if this source is proxied.
    pub fn direct_url(&self, proxy_prefix: &str) -> Option<String> {
        if !self.is_proxied(proxy_prefix) {
            return None;
        }
        let encoded = &self.url[proxy_prefix.len()..];
        let decoded = urlencoding::decode(encoded).ok()?;
        if decoded.is_empty() { None } else { Some(decoded.into_owned()) }
    }
}

/// A file the user picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    /// Guess the object kind from the mime type or file extension.
    pub fn kind(&self) -> ObjectKind {
        let mime = self.mime_type.as_deref().unwrap_or_default();
        let ext = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if mime.starts_with("video/") || matches!(ext.as_str(), "mp4" | "webm" | "mov" | "m4v") {
            ObjectKind::Video
        } else if mime.starts_with("model/") || matches!(ext.as_str(), "glb" | "gltf" | "obj" | "fbx") {
            ObjectKind::Model
        } else {
            ObjectKind::Image
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    pub kind: Option<ObjectKind>,
    /// Folder or project the asset belongs to on the remote side
    pub folder: Option<String>,
}

/// Completion report for an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    /// Asset reference to resolve when `success` is true
    pub asset: Option<String>,
    pub error: Option<String>,
}

impl UploadResult {
    pub fn ok(asset: impl Into<String>) -> Self {
        Self {
            success: true,
            asset: Some(asset.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            asset: None,
            error: Some(error.into()),
        }
    }
}

/// Native dimensions of loaded content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentDims {
    pub width: f64,
    pub height: f64,
}

impl ContentDims {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Read image dimensions from the file header without decoding pixels.
    pub fn probe_file(path: &Path) -> EngineResult<Self> {
        let (w, h) = image::image_dimensions(path)?;
        Ok(Self::new(w as f64, h as f64))
    }

    pub fn probe_bytes(bytes: &[u8]) -> EngineResult<Self> {
        let (w, h) = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(Self::new(w as f64, h as f64))
    }

    /// Scale down so the longest side is at most `max_dim`. Never scales up.
    #[must_use]
    pub fn scaled_to_fit(&self, max_dim: f64) -> Self {
        let longest = self.width.max(self.height);
        if longest <= max_dim || longest <= 0.0 {
            return *self;
        }
        let scale = max_dim / longest;
        Self::new(self.width * scale, self.height * scale)
    }
}

/// Upload and resolution service provided by the host.
pub trait ContentResolver {
    /// Start an upload. Completion arrives via `CanvasEngine::upload_finished`.
    fn upload(&mut self, id: ObjectId, file: &UploadFile, options: &UploadOptions);

    /// Turn any asset reference (id, URL, data URI) into a loadable source.
    fn resolve_any(&self, reference: &str) -> RenderableSource;
}

/// Resolver that treats every reference as a URL and queues uploads for the
/// host to drain.
#[derive(Debug, Default)]
pub struct PassthroughResolver {
    pending_uploads: Vec<(ObjectId, String)>,
}

impl PassthroughResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads started since the last drain, as `(placement id, file name)`.
    pub fn drain_uploads(&mut self) -> Vec<(ObjectId, String)> {
        std::mem::take(&mut self.pending_uploads)
    }
}

impl ContentResolver for PassthroughResolver {
    fn upload(&mut self, id: ObjectId, file: &UploadFile, _options: &UploadOptions) {
        self.pending_uploads.push((id, file.name.clone()));
    }

    fn resolve_any(&self, reference: &str) -> RenderableSource {
        RenderableSource::for_reference(reference)
    }
}
