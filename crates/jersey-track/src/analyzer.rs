//! One synchronous pipeline run per frame.

use jersey_track_core::{ConvertError, PlanarYuvFrame, RgbImage, Rotation, YuvToRgbConverter};
use jersey_track_detect::{
    locate_candidates, read_numbers, CropStats, NumberLocator, RosterFilter, ScoredBox,
    TextRecognizer, TileGrid,
};
use jersey_track_tracker::{TrackedPlayer, TrackerState};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::PipelineConfig;

/// Frame-level failures. Per-tile and per-crop model errors never surface
/// here; they are logged and counted instead.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    #[error("frame has no pixels (width={width}, height={height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Everything one pipeline run produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    /// Tracker output after this frame.
    pub players: Vec<TrackedPlayer>,
    /// Candidates that survived suppression, frame-normalized.
    pub candidates: Vec<ScoredBox>,
    pub crop_stats: CropStats,
    /// Upright frame size after rotation.
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Converter, tiling engine, OCR orchestrator and tracker wired together.
///
/// `analyze` takes `&mut self`, so runs on one analyzer are serialized and
/// the tracker sees frames in call order.
pub struct FrameAnalyzer<L, R> {
    locator: L,
    recognizer: R,
    converter: YuvToRgbConverter,
    working: RgbImage,
    grid: TileGrid,
    config: PipelineConfig,
    tracker: TrackerState,
    roster: RosterFilter,
}

impl<L, R> FrameAnalyzer<L, R>
where
    L: NumberLocator,
    R: TextRecognizer,
{
    pub fn new(locator: L, recognizer: R, config: PipelineConfig) -> Self {
        Self {
            locator,
            recognizer,
            converter: YuvToRgbConverter::new(),
            working: RgbImage::new(0, 0),
            grid: TileGrid::from_params(&config.tiling),
            tracker: TrackerState::new(config.tracker.clone()),
            roster: RosterFilter::default(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn roster_filter(&self) -> &RosterFilter {
        &self.roster
    }

    /// Applies from the next analyzed frame on.
    pub fn set_roster_filter(&mut self, roster: RosterFilter) {
        if roster != self.roster {
            log::info!("roster filter updated ({} numbers)", roster.len());
            self.roster = roster;
        }
    }

    pub fn tracker(&self) -> &TrackerState {
        &self.tracker
    }

    /// Drop every tracked player, e.g. when the camera session restarts.
    pub fn reset_tracking(&mut self) {
        self.tracker.reset();
    }

    /// Convert, rotate, locate, read and track one camera frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame),
            fields(width = frame.width, height = frame.height, rotation = frame.rotation.degrees())
        )
    )]
    pub fn analyze(&mut self, frame: &PlanarYuvFrame) -> Result<FrameReport, AnalyzeError> {
        self.converter.convert(frame, &mut self.working)?;
        let Self {
            locator,
            recognizer,
            working,
            grid,
            config,
            tracker,
            roster,
            ..
        } = self;
        let report = match frame.rotation.apply(working) {
            Some(upright) => run_stages(locator, recognizer, grid, config, tracker, roster, &upright),
            None => run_stages(locator, recognizer, grid, config, tracker, roster, working),
        };
        Ok(report)
    }

    /// Same as [`FrameAnalyzer::analyze`] for a frame that is already RGB.
    pub fn analyze_rgb(
        &mut self,
        image: &RgbImage,
        rotation: Rotation,
    ) -> Result<FrameReport, AnalyzeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalyzeError::EmptyFrame { width, height });
        }
        let report = match rotation.apply(image) {
            Some(upright) => self.run(&upright),
            None => self.run(image),
        };
        Ok(report)
    }

    fn run(&mut self, image: &RgbImage) -> FrameReport {
        run_stages(
            &mut self.locator,
            &self.recognizer,
            &self.grid,
            &self.config,
            &mut self.tracker,
            &self.roster,
            image,
        )
    }
}

fn run_stages<L, R>(
    locator: &mut L,
    recognizer: &R,
    grid: &TileGrid,
    config: &PipelineConfig,
    tracker: &mut TrackerState,
    roster: &RosterFilter,
    image: &RgbImage,
) -> FrameReport
where
    L: NumberLocator,
    R: TextRecognizer,
{
    let (frame_width, frame_height) = image.dimensions();
    let candidates = locate_candidates(locator, image, grid, &config.tiling);
    let boxes: Vec<_> = candidates.iter().map(|c| c.bbox).collect();
    let readout = read_numbers(recognizer, image, &boxes, roster, &config.crop);
    let players = tracker.update(readout.detections, frame_width, frame_height);

    log::debug!(
        "frame {}x{}: {} candidates, {} read, {} tracked",
        frame_width,
        frame_height,
        candidates.len(),
        readout.stats.accepted,
        players.len()
    );

    FrameReport {
        players,
        candidates,
        crop_stats: readout.stats,
        frame_width,
        frame_height,
    }
}
