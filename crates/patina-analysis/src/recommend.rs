//! Parameter recommendation from extracted features.
//!
//! Each feature is normalized against a fixed empirical range and the
//! results are linearly combined into the drive/character/saturation/
//! presence controls. An instrument category applies bounded overrides on
//! top (floors and ceilings, never hard replacements) so the feature
//! mapping still shows through.

use patina_core::{InterpMode, ProcessorParams};

use crate::features::SourceFeatures;

/// Broad source category used to bias a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstrumentCategory {
    /// Bass instruments: keep weight, avoid fizz.
    Bass,
    /// Lead vocals: open the top, cap the saturation.
    Vocal,
    /// Drum buses: push drive and saturation.
    Drums,
    /// No bias applied.
    #[default]
    Auto,
}

impl InstrumentCategory {
    /// Parse a free-form label ("bass DI", "LeadVocal", ...) into a
    /// category. Unrecognized labels fall back to [`Self::Auto`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("bass") {
            Self::Bass
        } else if lower.contains("vocal") || lower.contains("vox") {
            Self::Vocal
        } else if lower.contains("drum") {
            Self::Drums
        } else {
            Self::Auto
        }
    }
}

/// Normalize `x` against an empirical range into [0, 1].
fn norm(x: f32, lo: f32, hi: f32) -> f32 {
    ((x - lo) / (hi - lo + 1e-9)).clamp(0.0, 1.0)
}

/// Map a feature set to recommended processor parameters.
///
/// Always recommends the adaptive interpolator, full wet mix, and unity
/// trim; the four tone controls derive from the features.
#[must_use]
pub fn recommend(features: &SourceFeatures, category: InstrumentCategory) -> ProcessorParams {
    let mut drive =
        norm(features.flatness, 0.05, 0.25) * 0.8 + norm(features.crest_db, 6.0, 18.0) * 0.2;
    let mut character = norm(features.band_low / (features.band_high + 1e-9), 0.5, 4.0);
    let mut saturation = norm(features.flux, 0.0, 0.1) * 0.6 + 0.2;
    let mut presence = norm(features.centroid_hz, 1000.0, 6000.0);

    match category {
        InstrumentCategory::Bass => {
            character = character.max(0.6);
            presence = presence.min(0.4);
        }
        InstrumentCategory::Vocal => {
            presence = presence.max(0.6);
            saturation = saturation.min(0.6);
        }
        InstrumentCategory::Drums => {
            drive = drive.max(0.5);
            saturation = saturation.max(0.6);
        }
        InstrumentCategory::Auto => {}
    }

    ProcessorParams {
        drive,
        character,
        saturation,
        presence,
        mix: 1.0,
        input_gain_db: 0.0,
        output_gain_db: 0.0,
        interp: InterpMode::Adaptive,
        ..ProcessorParams::default()
    }
    .clamped()
}
