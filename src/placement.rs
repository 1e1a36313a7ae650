//! Placeholder-to-content lifecycle.
//!
//! ```text
//! Requested -> PlaceholderShown -> Resolving -> Resolved
//!                    |                 |     -> Failed
//!                    |                 |     -> TimedOut
//!                    +-----------------+-----> Cancelled
//! ```
//!
//! The first terminal transition wins. Anything arriving afterwards (a late
//! load after a timeout, a failure after success) is logged and dropped. The
//! one exception is a repeated `content_loaded` for a resolved id, which
//! resyncs helper geometry and reports `ContentUpgraded`.
//!
//! Every load handed to the scene carries an attempt number. Completions for
//! an older attempt belong to a retry or a replaced request and are dropped.
//!
//! Time never comes from the clock here. Callers pass `now` so deadlines are
//! deterministic.

use crate::config::DisplayMode;
use crate::content::{ContentDims, ContentResolver, CrossOrigin, RenderableSource, UploadFile, UploadOptions, UploadResult};
use crate::engine::CanvasEngine;
use crate::error::{EngineError, EngineResult, FailureReason};
use crate::events::EngineEvent;
use crate::geometry::{Bounds, Point, Size};
use crate::history::HistoryService;
use crate::layout::{BatchLayout, BatchSlot, Obstacles, PendingPlacement, PendingPlacements, find_non_overlapping_position, position_right_of};
use crate::scene::{HelperGeometry, SceneGraph};
use crate::types::{CanvasObject, ContentRef, ObjectId, ObjectKind, OperationType, PlaceholderEntry};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStatus {
    Requested,
    PlaceholderShown,
    Resolving,
    Resolved,
    Failed,
    TimedOut,
    Cancelled,
}

impl PlacementStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlacementStatus::Resolved | PlacementStatus::Failed | PlacementStatus::TimedOut | PlacementStatus::Cancelled
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlacementStatus::Requested => "requested",
            PlacementStatus::PlaceholderShown => "placeholder_shown",
            PlacementStatus::Resolving => "resolving",
            PlacementStatus::Resolved => "resolved",
            PlacementStatus::Failed => "failed",
            PlacementStatus::TimedOut => "timed_out",
            PlacementStatus::Cancelled => "cancelled",
        }
    }
}

/// A request to place new content.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    /// Reuse this id, replacing any in-flight placement or empty slot with it
    pub id: Option<ObjectId>,
    pub kind: ObjectKind,
    pub operation: OperationType,
    /// Expected content size. Defaults to the configured placeholder size.
    pub size: Option<Size>,
    /// Explicit centre for the content
    pub target: Option<Point>,
    /// Anchor for batch grids; the viewport centre when absent
    pub anchor: Option<Point>,
    /// Source objects for edits and blends, first one leads
    pub sources: Vec<ObjectId>,
    pub batch: Option<BatchSlot>,
    /// Show an empty upload slot instead of a progress placeholder
    pub awaiting_upload: bool,
}

impl PlacementRequest {
    pub fn new(kind: ObjectKind, operation: OperationType) -> Self {
        Self {
            id: None,
            kind,
            operation,
            size: None,
            target: None,
            anchor: None,
            sources: Vec::new(),
            batch: None,
            awaiting_upload: false,
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Centre the content on `point`.
    pub fn at(mut self, point: Point) -> Self {
        self.target = Some(point);
        self
    }

    pub fn anchored_at(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_sources(mut self, sources: Vec<ObjectId>) -> Self {
        self.sources = sources;
        self
    }

    pub fn in_batch(mut self, group_id: impl Into<String>, index: usize, total: usize) -> Self {
        self.batch = Some(BatchSlot {
            group_id: group_id.into(),
            index,
            total,
        });
        self
    }

    pub fn awaiting_upload(mut self) -> Self {
        self.awaiting_upload = true;
        self
    }
}

/// Book-keeping for one placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRecord {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub operation: OperationType,
    pub status: PlacementStatus,
    /// Placeholder box content is fitted into
    pub slot: Bounds,
    pub source: Option<RenderableSource>,
    pub deadline: Option<Instant>,
    pub cors_retried: bool,
    pub proxy_retried: bool,
    /// Attempt number of the load the scene is currently running
    pub attempt: u32,
    /// Set once the object exists; guards the idempotent path
    pub finalized: bool,
    /// Bounds at the last finalize or upgrade
    pub snapshot: Option<Bounds>,
}

impl PlacementRecord {
    fn new(id: ObjectId, kind: ObjectKind, operation: OperationType, slot: Bounds, attempt: u32) -> Self {
        Self {
            id,
            kind,
            operation,
            status: PlacementStatus::Requested,
            slot,
            source: None,
            deadline: None,
            cors_retried: false,
            proxy_retried: false,
            attempt,
            finalized: false,
            snapshot: None,
        }
    }

    fn transition(&mut self, to: PlacementStatus) {
        debug!(id = %self.id, from = self.status.label(), to = to.label(), "Placement transition");
        self.status = to;
    }

    fn next_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }
}

/// Process-scoped placement state: records, layout reservations and the
/// batch memo. Cleared on engine reset.
#[derive(Debug, Default)]
pub struct PlacementRegistry {
    records: HashMap<ObjectId, PlacementRecord>,
    pending: PendingPlacements,
    batches: BatchLayout,
}

impl PlacementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&PlacementRecord> {
        self.records.get(&id)
    }

    pub fn status(&self, id: ObjectId) -> Option<PlacementStatus> {
        self.records.get(&id).map(|r| r.status)
    }

    pub fn pending(&self) -> &PendingPlacements {
        &self.pending
    }

    pub fn batches(&self) -> &BatchLayout {
        &self.batches
    }

    /// Drop everything known about `id`.
    pub(crate) fn forget(&mut self, id: ObjectId) {
        self.records.remove(&id);
        self.pending.remove(id);
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.pending.clear();
        self.batches.clear();
    }
}

/// Fit `dims` into `slot` per the display mode, centred on the slot.
pub fn fit_content(slot: &Bounds, dims: ContentDims, mode: DisplayMode, min_size: f64) -> Bounds {
    let valid = dims.width.is_finite() && dims.height.is_finite() && dims.width > 0.0 && dims.height > 0.0;
    if !valid {
        return Bounds::centered_on(slot.center(), slot.size().at_least(min_size));
    }
    let scale = match mode {
        DisplayMode::Fit => (slot.width / dims.width).min(slot.height / dims.height),
        DisplayMode::Original => 1.0,
    };
    // Floor the scale, not each axis, so the aspect ratio survives
    let scale_min = (min_size / dims.width).max(min_size / dims.height);
    let scale = scale.max(scale_min);
    Bounds::centered_on(slot.center(), Size::new(dims.width * scale, dims.height * scale))
}

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    /// Show a placeholder for new content and reserve its slot.
    pub fn request_placement(&mut self, request: PlacementRequest) -> EngineResult<ObjectId> {
        let id = request.id.unwrap_or_default();
        let min = self.config.interaction.min_object_size;

        if let Some(record) = self.registry.records.get(&id) {
            if record.status == PlacementStatus::Resolved && self.board.contains_object(id) {
                return Err(EngineError::InvalidTransition {
                    id,
                    action: "request",
                    status: record.status.label(),
                });
            }
        }

        // An existing placeholder with this id keeps its spot
        let reused = self.board.placeholder(id).map(|p| p.bounds);
        if reused.is_some() {
            debug!(%id, "Replacing in-flight placement");
            self.board.remove_placeholder(id);
            self.scene.remove_placeholder(id);
            self.registry.pending.remove(id);
        }

        let size = reused
            .map(|b| b.size())
            .or(request.size)
            .unwrap_or_else(|| Size::new(self.config.placement.default_size.0, self.config.placement.default_size.1))
            .at_least(min);

        let desired = match reused {
            Some(b) => b.origin(),
            None => self.desired_position(&request, size)?,
        };

        let prefer_horizontal = request.operation.prefers_horizontal();
        let outcome = {
            let obstacles = Obstacles::new(self.board.spatial_index(), &self.registry.pending);
            find_non_overlapping_position(desired, size, Some(id), prefer_horizontal, &obstacles, &self.config.layout)
        };
        let bounds = Bounds::from_origin_size(outcome.position, size);

        // Attempts keep counting across a replacement so old loads stay stale
        let attempt = self.registry.records.get(&id).map_or(0, |r| r.attempt);
        let mut record = PlacementRecord::new(id, request.kind, request.operation, bounds, attempt);
        let entry = PlaceholderEntry {
            id,
            bounds,
            operation: request.operation,
            kind: request.kind,
            progress: 0.0,
            awaiting_upload: request.awaiting_upload,
        };
        self.scene.show_placeholder(&entry);
        self.board.add_placeholder(entry);
        self.registry
            .pending
            .register(PendingPlacement::new(id, bounds, request.operation));
        record.transition(PlacementStatus::PlaceholderShown);
        self.registry.records.insert(id, record);

        debug!(%id, operation = request.operation.label(), x = bounds.x, y = bounds.y, "Placeholder shown");
        Ok(id)
    }

    fn desired_position(&mut self, request: &PlacementRequest, size: Size) -> EngineResult<Point> {
        if let Some(target) = request.target {
            return Ok(Bounds::centered_on(target, size).origin());
        }

        // Edits and blends sit to the right of their (first) source
        if let (OperationType::Edit | OperationType::Blend, Some(source_id)) = (request.operation, request.sources.first()) {
            let source = self
                .board
                .object(*source_id)
                .ok_or(EngineError::MissingSource(*source_id))?;
            return Ok(position_right_of(&source.bounds, self.config.placement.edit_gap));
        }

        let anchor = request.anchor.unwrap_or_else(|| self.view.viewport_center());
        match &request.batch {
            Some(slot) => Ok(self.registry.batches.position(slot, anchor, size, &self.config.layout)),
            None => Ok(Bounds::centered_on(anchor, size).origin()),
        }
    }

    /// Resolve `reference` and start loading it into the placeholder.
    ///
    /// Returns the attempt number the completion must be reported with.
    pub fn begin_resolution(&mut self, id: ObjectId, reference: &str, now: Instant) -> EngineResult<u32> {
        let source = self.resolver.resolve_any(reference);
        let timeout = self.config.placement.timeout();
        let record = self.registry.records.get_mut(&id).ok_or(EngineError::UnknownPlacement(id))?;

        match record.status {
            PlacementStatus::PlaceholderShown | PlacementStatus::Resolving => {
                record.source = Some(source.clone());
                record.deadline = Some(now + timeout);
                record.cors_retried = false;
                record.proxy_retried = false;
                record.transition(PlacementStatus::Resolving);
                let attempt = record.next_attempt();
                if let Some(p) = self.board.placeholder_mut(id) {
                    p.awaiting_upload = false;
                }
                self.scene.load_content(id, attempt, &source);
                Ok(attempt)
            }
            // A resolved object can be reloaded with better content; the
            // completion goes through the idempotent path.
            PlacementStatus::Resolved => {
                record.source = Some(source.clone());
                let attempt = record.next_attempt();
                self.scene.load_content(id, attempt, &source);
                Ok(attempt)
            }
            status => Err(EngineError::InvalidTransition {
                id,
                action: "begin resolution",
                status: status.label(),
            }),
        }
    }

    /// Load `attempt` for `id` finished with native size `dims`.
    ///
    /// Safe to call more than once. Later calls only resync helpers.
    pub fn content_loaded(&mut self, id: ObjectId, attempt: u32, dims: ContentDims) -> EngineResult<()> {
        let record = self.registry.records.get(&id).ok_or(EngineError::UnknownPlacement(id))?;

        if record.status.is_terminal() && !record.finalized {
            debug!(%id, status = record.status.label(), "Ignoring late load");
            return Ok(());
        }
        if attempt != record.attempt {
            debug!(%id, attempt, current = record.attempt, "Ignoring load from a stale attempt");
            return Ok(());
        }
        if record.finalized {
            self.refresh_resolved(id);
            return Ok(());
        }
        if record.status != PlacementStatus::Resolving {
            debug!(%id, status = record.status.label(), "Ignoring load before resolution started");
            return Ok(());
        }

        let kind = record.kind;
        let slot = self.board.placeholder(id).map(|p| p.bounds).unwrap_or(record.slot);
        let min = self.config.interaction.min_object_size;
        let bounds = fit_content(&slot, dims, self.config.placement.display_mode, min);
        let content = record
            .source
            .as_ref()
            .map(|s| ContentRef::Source(s.url.clone()))
            .unwrap_or_else(|| ContentRef::Source(String::new()));

        // Placeholder out and object in within the same call
        self.board.remove_placeholder(id);
        self.scene.remove_placeholder(id);
        self.registry.pending.remove(id);

        let object = CanvasObject::new(id, kind, bounds, content);
        self.scene.create_object(&object);
        self.scene.create_helpers(id, &HelperGeometry::for_bounds(bounds));
        self.board.add_object(object);

        if let Some(record) = self.registry.records.get_mut(&id) {
            record.finalized = true;
            record.snapshot = Some(bounds);
            record.deadline = None;
            record.transition(PlacementStatus::Resolved);
        }

        // A selected placeholder hands its selection to the new object
        if self.selection.placeholder() == Some(id) {
            self.update_selection(|s| s.replace([id]));
        }

        info!(%id, kind = kind.label(), "Placement resolved");
        self.events.publish(EngineEvent::ObjectAdded { id, kind, bounds });
        self.events.publish(EngineEvent::PlacementResolved { id, kind, bounds });
        self.history.commit(&format!("place {}", kind.label()));

        if self.config.placement.center_on_placement {
            self.view.center_on(&bounds);
            self.view_changed();
        }
        Ok(())
    }

    fn refresh_resolved(&mut self, id: ObjectId) {
        let Some(bounds) = self.board.object(id).map(|o| o.bounds) else {
            debug!(%id, "Resolved object is gone, ignoring repeat load");
            return;
        };
        self.scene.sync_helpers(id, &HelperGeometry::for_bounds(bounds));
        if let Some(record) = self.registry.records.get_mut(&id) {
            record.snapshot = Some(bounds);
        }
        debug!(%id, "Repeat load, helpers resynced");
        self.events.publish(EngineEvent::ContentUpgraded { id, bounds });
    }

    /// Loading content for `id` failed. Retries once without CORS and once
    /// against the direct URL behind a proxy before giving up.
    pub fn content_failed(&mut self, id: ObjectId, attempt: u32, error: &str, now: Instant) -> EngineResult<()> {
        let timeout = self.config.placement.timeout();
        let proxy_prefix = self.config.placement.proxy_prefix.clone();
        let record = self.registry.records.get_mut(&id).ok_or(EngineError::UnknownPlacement(id))?;

        if record.status != PlacementStatus::Resolving || attempt != record.attempt {
            debug!(%id, status = record.status.label(), attempt, error, "Ignoring stale failure");
            return Ok(());
        }

        let retry = match &record.source {
            Some(source) => {
                if source.cross_origin == CrossOrigin::Anonymous && !record.cors_retried {
                    record.cors_retried = true;
                    Some(source.without_cross_origin())
                } else if !record.proxy_retried {
                    source.direct_url(&proxy_prefix).map(|direct| {
                        record.proxy_retried = true;
                        RenderableSource {
                            url: direct,
                            cross_origin: source.cross_origin,
                        }
                    })
                } else {
                    None
                }
            }
            _ => None,
        };

        match retry {
            Some(source) => {
                warn!(%id, error, url = %source.url, "Content load failed, retrying");
                record.source = Some(source.clone());
                record.deadline = Some(now + timeout);
                let attempt = record.next_attempt();
                self.scene.load_content(id, attempt, &source);
                Ok(())
            }
            None => {
                self.fail_placement(id, FailureReason::LoadFailed(error.to_string()), PlacementStatus::Failed);
                Ok(())
            }
        }
    }

    /// Fail every resolving placement whose deadline has passed.
    ///
    /// Returns the ids that timed out.
    pub fn poll_timeouts(&mut self, now: Instant) -> Vec<ObjectId> {
        let timeout = self.config.placement.timeout();
        let expired: Vec<ObjectId> = self
            .registry
            .records
            .values()
            .filter(|r| r.status == PlacementStatus::Resolving && r.deadline.is_some_and(|d| now >= d))
            .map(|r| r.id)
            .collect();

        for id in &expired {
            self.fail_placement(*id, FailureReason::TimedOut(timeout), PlacementStatus::TimedOut);
        }
        expired
    }

    /// Cancel an in-flight placement. Terminal placements are left alone.
    pub fn cancel_placement(&mut self, id: ObjectId) -> EngineResult<()> {
        if !self.registry.records.contains_key(&id) {
            return Err(EngineError::UnknownPlacement(id));
        }
        self.cancel_placement_quiet(id);
        Ok(())
    }

    /// Returns true if the placement was in flight and is now cancelled.
    pub(crate) fn cancel_placement_quiet(&mut self, id: ObjectId) -> bool {
        match self.registry.records.get(&id) {
            Some(record) if !record.status.is_terminal() => {
                self.fail_placement(id, FailureReason::Cancelled, PlacementStatus::Cancelled);
                true
            }
            Some(record) => {
                debug!(%id, status = record.status.label(), "Cancel after terminal state ignored");
                false
            }
            None => false,
        }
    }

    fn fail_placement(&mut self, id: ObjectId, reason: FailureReason, status: PlacementStatus) {
        self.board.remove_placeholder(id);
        self.scene.remove_placeholder(id);
        self.registry.pending.remove(id);
        if let Some(record) = self.registry.records.get_mut(&id) {
            record.deadline = None;
            record.transition(status);
        }
        if self.selection.placeholder() == Some(id) {
            self.update_selection(|s| {
                s.remove(id);
            });
        }
        info!(%id, %reason, "Placement failed");
        self.events.publish(EngineEvent::PlacementFailed { id, reason });
    }

    /// Report progress in `0.0..=1.0`. Out-of-range values are clamped.
    pub fn report_progress(&mut self, id: ObjectId, progress: f32) -> EngineResult<()> {
        let record = self.registry.records.get(&id).ok_or(EngineError::UnknownPlacement(id))?;
        if record.status.is_terminal() {
            debug!(%id, "Ignoring progress for finished placement");
            return Ok(());
        }
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        if let Some(p) = self.board.placeholder_mut(id) {
            p.progress = progress;
        }
        self.scene.update_placeholder_progress(id, progress);
        self.events.publish(EngineEvent::PlacementProgress { id, progress });
        Ok(())
    }

    /// Show a placeholder and hand the file to the resolver for upload.
    ///
    /// Image files without an explicit size get a placeholder matching their
    /// header dimensions.
    pub fn start_upload(&mut self, request: PlacementRequest, file: &UploadFile, options: &UploadOptions) -> EngineResult<ObjectId> {
        let mut request = request;
        request.kind = options.kind.unwrap_or_else(|| file.kind());
        request.operation = OperationType::Upload;
        request.awaiting_upload = false;
        if request.size.is_none() && request.kind == ObjectKind::Image {
            match ContentDims::probe_bytes(&file.bytes) {
                Ok(dims) => request.size = Some(dims.scaled_to_fit(self.config.placement.max_image_dimension).size()),
                Err(e) => debug!(file = %file.name, error = %e, "Could not probe upload, using default size"),
            }
        }

        let id = self.request_placement(request)?;
        debug!(%id, file = %file.name, bytes = file.bytes.len(), "Upload started");
        self.resolver.upload(id, file, options);
        Ok(id)
    }

    /// Upload completion from the resolver.
    pub fn upload_finished(&mut self, id: ObjectId, result: UploadResult, now: Instant) -> EngineResult<()> {
        let record = self.registry.records.get(&id).ok_or(EngineError::UnknownPlacement(id))?;
        if record.status.is_terminal() {
            debug!(%id, "Ignoring upload completion for finished placement");
            return Ok(());
        }

        match (result.success, result.asset) {
            (true, Some(asset)) => self.begin_resolution(id, &asset, now).map(|_| ()),
            (_, _) => {
                let message = result.error.unwrap_or_else(|| "unknown error".to_string());
                self.fail_placement(id, FailureReason::UploadFailed(message), PlacementStatus::Failed);
                Ok(())
            }
        }
    }

    /// Place an image from disk right away, scaled so its longest side fits
    /// the configured maximum.
    pub fn place_local_image(&mut self, path: &Path, at: Option<Point>) -> EngineResult<ObjectId> {
        let dims = ContentDims::probe_file(path)?.scaled_to_fit(self.config.placement.max_image_dimension);
        let size = dims.size().at_least(self.config.interaction.min_object_size);
        let center = at.unwrap_or_else(|| self.view.viewport_center());
        let id = ObjectId::new();

        let outcome = {
            let obstacles = Obstacles::new(self.board.spatial_index(), &self.registry.pending);
            find_non_overlapping_position(
                Bounds::centered_on(center, size).origin(),
                size,
                Some(id),
                false,
                &obstacles,
                &self.config.layout,
            )
        };
        let bounds = Bounds::from_origin_size(outcome.position, size);
        let object = CanvasObject::new(id, ObjectKind::Image, bounds, ContentRef::Source(path.display().to_string()));

        self.scene.create_object(&object);
        self.scene.create_helpers(id, &HelperGeometry::for_bounds(bounds));
        self.board.add_object(object);
        info!(%id, path = %path.display(), "Placed local image");
        self.events.publish(EngineEvent::ObjectAdded {
            id,
            kind: ObjectKind::Image,
            bounds,
        });
        self.history.commit("place image");
        Ok(id)
    }
}
