// Analysis module - feature extraction and correlation
//
// Pipeline: Signal → FeatureExtractor → FeatureSequence → Correlator →
// CorrelationCurve → AlignmentResult. Both stages are pure CPU work with no
// shared mutable state.

pub mod correlation;
pub mod features;

pub use correlation::{AlignmentResult, CorrelationCurve, Correlator};
pub use features::{FeatureExtractor, FeatureSequence};
