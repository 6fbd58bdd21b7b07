//! shapeye-pipeline: per-frame shape and color classification (sans-IO).
//!
//! Finds triangles, squares, and rectangles colored red, green, or blue
//! inside a movable region of a frame, then draws the results back onto
//! the frame:
//! crop -> binarize -> contour extraction -> filtering ->
//! polygon approximation -> shape + color classification -> annotation.
//!
//! This crate has **no I/O dependencies** -- frames arrive as in-memory
//! [`RgbImage`]s and leave the same way. Capturing, displaying, and
//! keyboard handling live in the `shapeye` binary (or any other driver).
//!
//! Every cycle is independent: nothing about one frame's shapes is kept
//! for the next. The only state that outlives a cycle is the region of
//! interest, owned by [`RegionController`].

pub mod annotate;
pub mod approx;
pub mod binarize;
pub mod color;
pub mod config;
pub mod contour;
pub mod filter;
pub mod region;
pub mod shape;
pub mod types;

pub use annotate::AnnotationStyle;
pub use config::{BorderPolicy, DetectorConfig, HsvGate, HueBands};
pub use contour::{ContourExtractor, ContourExtractorKind};
pub use region::{Direction, Modifier, MoveCommand, RegionController};
pub use types::{
    ColorLabel, Contour, CycleResult, CycleStats, Detection, Frame, Mask, PipelineError, Point,
    Polygon, Rect, RgbImage, ShapeLabel,
};

/// The detection pipeline, configured once and run per frame.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
    extractor: ContourExtractorKind,
}

impl Detector {
    /// Build a detector from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `config` fails
    /// [`DetectorConfig::validate`].
    pub fn new(config: DetectorConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: ContourExtractorKind::default(),
        })
    }

    /// Use a different contour extraction strategy.
    #[must_use]
    pub const fn with_extractor(mut self, extractor: ContourExtractorKind) -> Self {
        self.extractor = extractor;
        self
    }

    /// The configuration this detector runs with.
    #[must_use]
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify the shapes inside `roi` without touching the frame.
    ///
    /// # Pipeline steps
    ///
    /// 1. Crop the region and binarize it
    /// 2. Extract contours (flat, compressed)
    /// 3. Drop contours touching the region border or below minimum size
    /// 4. Approximate each survivor with a polygon in frame coordinates
    /// 5. Classify shape, then color (color only for triangles and
    ///    quadrilaterals)
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::RoiOutOfBounds`] if `roi` is empty or does
    /// not fit inside `frame`.
    pub fn detect(&self, frame: &Frame, roi: Rect) -> Result<CycleResult, PipelineError> {
        if roi.is_empty() || !roi.fits_within(frame.width(), frame.height()) {
            return Err(PipelineError::RoiOutOfBounds {
                roi,
                frame_width: frame.width(),
                frame_height: frame.height(),
            });
        }
        let config = &self.config;

        // 1. Crop and binarize.
        let region = binarize::crop(frame, roi);
        let mask = binarize::binarize(&region, config.binarize_threshold);

        // 2. Contour extraction.
        let contours = self.extractor.extract(&mask);

        let mut stats = CycleStats {
            contours_found: contours.len(),
            ..CycleStats::default()
        };
        let mut detections = Vec::new();

        for contour in &contours {
            // 3. Filtering.
            if let Err(reason) = filter::check(
                contour,
                roi.width,
                roi.height,
                config.border_policy,
                config.min_shape_dim,
            ) {
                tracing::trace!(?reason, points = contour.len(), "contour rejected");
                match reason {
                    filter::Rejection::TouchesBorder => stats.rejected_border += 1,
                    filter::Rejection::TooSmall => stats.rejected_small += 1,
                }
                continue;
            }

            // 4. Approximation into frame coordinates.
            let polygon =
                approx::approximate(contour, config.approx_tolerance_factor, roi.origin());
            let Some(bounds) = polygon.bounding_rect() else {
                continue;
            };
            stats.polygons += 1;

            // 5. Classification.
            let shape = shape::classify(&polygon, config.square_ratio);
            let color = if shape == ShapeLabel::Unclassified {
                ColorLabel::Unknown
            } else {
                color::classify(&polygon, frame, &config.hsv_gate, &config.hue_bands)
            };

            let detection = Detection {
                polygon,
                bounds,
                shape,
                color,
            };
            if detection.label().is_some() {
                stats.labeled += 1;
            }
            detections.push(detection);
        }

        tracing::debug!(
            contours = stats.contours_found,
            rejected_border = stats.rejected_border,
            rejected_small = stats.rejected_small,
            polygons = stats.polygons,
            labeled = stats.labeled,
            "detection cycle complete"
        );

        Ok(CycleResult { detections, stats })
    }

    /// Run [`detect`](Self::detect) and draw the results onto `frame`.
    ///
    /// Detection reads the unannotated frame; drawing happens afterwards,
    /// so outlines and labels never feed back into classification.
    ///
    /// # Errors
    ///
    /// Same as [`detect`](Self::detect). On error the frame is untouched.
    pub fn process_frame(
        &self,
        frame: &mut Frame,
        roi: Rect,
        style: &AnnotationStyle,
    ) -> Result<CycleResult, PipelineError> {
        let result = self.detect(frame, roi)?;
        annotate::annotate(frame, roi, &result.detections, style);
        Ok(result)
    }
}

/// Run one full cycle with a fresh [`Detector`]: read the region from
/// `region`, detect, and annotate `frame` in place.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a bad configuration, or
/// [`PipelineError::FrameSizeMismatch`] if `frame` is not the size
/// `region` was built for.
pub fn process_frame(
    frame: &mut Frame,
    region: &RegionController,
    config: &DetectorConfig,
    style: &AnnotationStyle,
) -> Result<CycleResult, PipelineError> {
    region.check_frame(frame.width(), frame.height())?;
    let detector = Detector::new(config.clone())?;
    detector.process_frame(frame, region.current_rect(), style)
}
