//! Plate localization: frame in, cropped plate (or nothing) out.

use std::ffi::OsString;

use image::DynamicImage;
use serde::Deserialize;
use tracing::{debug, warn};

use plategate_types::Result;

use crate::command::{scratch_path, ExternalCommand};
use crate::crop::PlateCrop;

/// Finds the plate in a full camera frame
pub trait PlateLocator: Send + Sync {
    fn locate(&self, frame: &DynamicImage) -> Result<Option<PlateCrop>>;
}

/// Treats the whole frame as the plate; used for pre-cropped input or when
/// no detector is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct WholeFrameLocator;

impl PlateLocator for WholeFrameLocator {
    fn locate(&self, frame: &DynamicImage) -> Result<Option<PlateCrop>> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(None);
        }
        Ok(Some(PlateCrop::new(frame.clone())))
    }
}

#[derive(Debug, Deserialize)]
struct PlateDetectionResult {
    detected: bool,
    confidence: Option<f32>,
    bbox: Option<Vec<i64>>,
    elapsed_ms: Option<u32>,
    error: Option<String>,
}

/// Plate detector run as a subprocess (YOLO or similar).
///
/// Invoked as `<command> --image <frame> --min-conf <c> --output-crop <png>`.
/// The tool either writes the crop to the given path or reports a
/// `[x1, y1, x2, y2]` bounding box that is cropped here.
#[derive(Debug, Clone)]
pub struct CommandPlateLocator {
    command: ExternalCommand,
    min_conf: f32,
}

impl CommandPlateLocator {
    pub fn new(command_line: &str, min_conf: f32) -> Result<Self> {
        Ok(Self {
            command: ExternalCommand::parse(command_line)?,
            min_conf,
        })
    }
}

impl PlateLocator for CommandPlateLocator {
    fn locate(&self, frame: &DynamicImage) -> Result<Option<PlateCrop>> {
        let frame_path = scratch_path("plategate_frame", "png");
        let crop_path = scratch_path("plategate_crop", "png");
        frame.save_with_format(&frame_path, image::ImageFormat::Png)?;

        let args = [
            OsString::from("--image"),
            frame_path.clone().into_os_string(),
            OsString::from("--min-conf"),
            OsString::from(format!("{}", self.min_conf)),
            OsString::from("--output-crop"),
            crop_path.clone().into_os_string(),
        ];

        let response = self.command.run_json::<PlateDetectionResult>(&args);
        let _ = std::fs::remove_file(&frame_path);

        let parsed = match response {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "plate locator failed");
                let _ = std::fs::remove_file(&crop_path);
                return Ok(None);
            }
        };

        if let Some(ref error) = parsed.error {
            warn!(error = %error, "plate locator reported an error");
        }

        if !parsed.detected {
            debug!("plate locator: no plate detected");
            let _ = std::fs::remove_file(&crop_path);
            return Ok(None);
        }

        debug!(
            confidence = parsed.confidence.unwrap_or(0.0),
            elapsed_ms = parsed.elapsed_ms.unwrap_or(0),
            "plate located"
        );

        if crop_path.exists() {
            let crop = PlateCrop::open(&crop_path);
            let _ = std::fs::remove_file(&crop_path);
            return crop.map(Some);
        }

        Ok(parsed.bbox.as_deref().and_then(|bbox| crop_bbox(frame, bbox)))
    }
}

/// Crop `[x1, y1, x2, y2]` out of the frame, clamped to its bounds
fn crop_bbox(frame: &DynamicImage, bbox: &[i64]) -> Option<PlateCrop> {
    let [x1, y1, x2, y2] = bbox else {
        return None;
    };
    let clamp_x = |v: i64| v.clamp(0, frame.width() as i64) as u32;
    let clamp_y = |v: i64| v.clamp(0, frame.height() as i64) as u32;
    let (x1, x2) = (clamp_x(*x1), clamp_x(*x2));
    let (y1, y2) = (clamp_y(*y1), clamp_y(*y2));

    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some(PlateCrop::new(frame.crop_imm(x1, y1, x2 - x1, y2 - y1)))
}
