/// Confidence and reliability helpers shared by graph construction,
/// scoring and the analysis response reshaping.

/// Confidence assumed for entities, relations and studies that carry none.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub(crate) fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

/// Clamp a model-reported confidence into [0.0, 1.0].
/// NaN is treated as missing and mapped to the default.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return DEFAULT_CONFIDENCE;
    }
    value.clamp(0.0, 1.0)
}

/// Resolve an optional confidence, falling back to the default.
pub fn confidence_or_default(value: Option<f64>) -> f64 {
    value.unwrap_or(DEFAULT_CONFIDENCE)
}
