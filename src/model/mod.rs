//! Impact Model - pure functions from true metrics + defect rates to
//! observed metrics, detection power, and a qualitative recommendation

pub mod defects;
pub mod impact;
pub mod inputs;
pub mod recommend;
pub mod scenario;
pub mod simulate;
pub mod stats;

pub use defects::{
    apply_event_loss, apply_partial_data, apply_segmentation_error, apply_timeframe_bias,
    apply_user_id_error, compose_defects, effective_sample_size, ComposedRates,
};
pub use impact::{compute_impact, sweep, DefectKind, ImpactResult, SweepPoint, TARGET_POWER};
pub use inputs::{ArmQuality, Arm, ExperimentInputs, ModelError, QualityParams};
pub use recommend::{recommend, Advisory, Recommendation, RecommendationSignals};
pub use scenario::Scenario;
pub use simulate::{simulate, SimulationResult};
pub use stats::{compute_mde, compute_power, normal_cdf, normal_quantile, required_sample_size};
