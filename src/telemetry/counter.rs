use std::fmt;
use std::sync::Arc;

use super::{CounterId, Result, SampleView};

/// Computes a counter value from up to two operand samples.
///
/// The closure receives the view to read samples from and the counter's two
/// operand ids; unused slots carry [`CounterId::UNDEFINED`].
pub type ComputeFn =
    Arc<dyn Fn(&SampleView<'_>, CounterId, CounterId) -> Result<f64> + Send + Sync>;

/// A named computation over catalog samples.
#[derive(Clone)]
pub struct Counter {
    compute: ComputeFn,
    operands: [CounterId; 2],
}

impl Counter {
    pub fn new(compute: ComputeFn, operands: [CounterId; 2]) -> Self {
        Self { compute, operands }
    }

    /// A counter consuming a single operand.
    pub fn unary(compute: ComputeFn, operand: CounterId) -> Self {
        Self::new(compute, [operand, CounterId::UNDEFINED])
    }

    pub fn operands(&self) -> [CounterId; 2] {
        self.operands
    }

    /// Runs the compute closure against `view`.
    pub fn evaluate(&self, view: &SampleView<'_>) -> Result<f64> {
        (self.compute)(view, self.operands[0], self.operands[1])
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("operands", &self.operands)
            .finish_non_exhaustive()
    }
}
