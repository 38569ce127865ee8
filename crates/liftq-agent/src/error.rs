//! Fatal contract violations.

/// A caller broke a numeric contract of the decision engine.
///
/// These are fatal to the current operation: the violating shapes or values
/// are reported to the caller, never coerced or clamped.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum PreconditionViolation {
    #[display("observation has {got} features, the configured input size is {expected}")]
    ObservationLength { expected: usize, got: usize },
    #[display(
        "snapshot shape ({got_floors} floors, {got_elevators} elevators) does not match \
         the configured ({floors} floors, {elevators} elevators)"
    )]
    SnapshotShape {
        floors: usize,
        elevators: usize,
        got_floors: usize,
        got_elevators: usize,
    },
    #[display("parameter set holds {got} values, the topology requires {expected}")]
    ParameterCount { expected: usize, got: usize },
    #[display("training target has {got} values, the network predicts {expected} actions")]
    TargetLength { expected: usize, got: usize },
    #[display("{context} produced a non-finite value ({value})")]
    NonFinite { context: &'static str, value: f32 },
}
