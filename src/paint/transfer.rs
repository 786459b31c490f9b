use crate::foundation::error::{CompositeError, CompositeResult};

/// Scalar `[0, 1] -> [0, 1]` mapping applied to soft-mask samples.
///
/// Evaluation may fail (a malformed function object in the source document); callers degrade
/// instead of aborting the render.
pub trait TransferFunction: Send + Sync {
    /// Evaluate the function at `x`.
    fn eval(&self, x: f64) -> anyhow::Result<f64>;

    /// Return `true` when `eval(x) == x` for every input.
    fn is_identity(&self) -> bool {
        false
    }
}

/// `f(x) = x`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityTransfer;

impl TransferFunction for IdentityTransfer {
    fn eval(&self, x: f64) -> anyhow::Result<f64> {
        Ok(x)
    }

    fn is_identity(&self) -> bool {
        true
    }
}

/// Linearly interpolated lookup table spanning `[0, 1]`.
#[derive(Clone, Debug)]
pub struct SampledTransfer {
    samples: Vec<f64>,
}

impl SampledTransfer {
    /// Build from at least two samples, evenly spaced over the domain.
    pub fn new(samples: Vec<f64>) -> CompositeResult<Self> {
        if samples.len() < 2 {
            return Err(CompositeError::validation(
                "sampled transfer function needs at least 2 samples",
            ));
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(CompositeError::validation(
                "sampled transfer function samples must be finite",
            ));
        }
        Ok(Self { samples })
    }
}

impl TransferFunction for SampledTransfer {
    fn eval(&self, x: f64) -> anyhow::Result<f64> {
        anyhow::ensure!(x.is_finite(), "transfer input is not finite: {x}");
        let last = self.samples.len() - 1;
        let pos = x.clamp(0.0, 1.0) * last as f64;
        let i = (pos.floor() as usize).min(last - 1);
        let t = pos - i as f64;
        Ok(self.samples[i] + (self.samples[i + 1] - self.samples[i]) * t)
    }

    fn is_identity(&self) -> bool {
        let last = (self.samples.len() - 1) as f64;
        self.samples
            .iter()
            .enumerate()
            .all(|(i, s)| (s - i as f64 / last).abs() < 1e-9)
    }
}

/// Exponential interpolation `c0 + x^n (c1 - c0)`.
#[derive(Clone, Copy, Debug)]
pub struct ExponentialTransfer {
    /// Output at `x = 0`.
    pub c0: f64,
    /// Output at `x = 1`.
    pub c1: f64,
    /// Exponent.
    pub n: f64,
}

impl TransferFunction for ExponentialTransfer {
    fn eval(&self, x: f64) -> anyhow::Result<f64> {
        let y = self.c0 + x.powf(self.n) * (self.c1 - self.c0);
        anyhow::ensure!(
            y.is_finite(),
            "exponential transfer is undefined at {x} (n = {})",
            self.n
        );
        Ok(y)
    }

    fn is_identity(&self) -> bool {
        self.c0 == 0.0 && self.c1 == 1.0 && self.n == 1.0
    }
}

/// Transfer function backed by a closure.
pub struct FnTransfer<F>(pub F);

impl<F> TransferFunction for FnTransfer<F>
where
    F: Fn(f64) -> anyhow::Result<f64> + Send + Sync,
{
    fn eval(&self, x: f64) -> anyhow::Result<f64> {
        (self.0)(x)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/transfer.rs"]
mod tests;
