//! Session behavior tracking: the append-only interaction log, its
//! fixed-shape aggregation, and the deterministic intent classifier that
//! every other component can fall back on.

pub mod classifier;
pub mod debounce;
pub mod log;
pub mod profile;

pub use classifier::{ClassifierThresholds, IntentClassification, IntentLabel, RuleClassifier};
pub use debounce::DebounceGate;
pub use log::InteractionLog;
pub use profile::{aggregate, BehaviorProfile};
