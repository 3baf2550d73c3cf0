//! Inference-engine seam.
//!
//! The engine itself (weights, graph execution, quantization) lives outside
//! this crate. The controller only needs to write three input slots, invoke
//! the model and read three output slots back, which is what
//! [`InferenceEngine`] captures.

use core::fmt;

use crate::utils::error::ConfigError;

/// Which side of the model a tensor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorKind {
    Input,
    Output,
}

impl fmt::Display for TensorKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TensorKind::Input => f.write_str("input"),
            TensorKind::Output => f.write_str("output"),
        }
    }
}

/// A ready-to-run model with pre-allocated tensors.
///
/// Tensor slots must stay valid between `invoke` calls: the controller
/// resolves them by index on every tick and expects the same length it saw
/// when the model was bound.
pub trait InferenceEngine {
    type Error: fmt::Debug;

    /// Writable slots of the input tensor at `index`.
    fn input(
        &mut self,
        index: usize,
    ) -> Option<&mut [f32]>;

    /// Readable slots of the output tensor at `index`.
    fn output(
        &self,
        index: usize,
    ) -> Option<&[f32]>;

    /// Run one forward pass on the current input slots.
    fn invoke(&mut self) -> Result<(), Self::Error>;
}

impl<T: InferenceEngine + ?Sized> InferenceEngine for &mut T {
    type Error = T::Error;

    fn input(
        &mut self,
        index: usize,
    ) -> Option<&mut [f32]> {
        T::input(self, index)
    }

    fn output(
        &self,
        index: usize,
    ) -> Option<&[f32]> {
        T::output(self, index)
    }

    fn invoke(&mut self) -> Result<(), Self::Error> {
        T::invoke(self)
    }
}

/// Fire-and-forget diagnostic channel handed over together with the model.
pub trait ErrorSink {
    fn report(
        &mut self,
        args: fmt::Arguments<'_>,
    );
}

impl<T: ErrorSink + ?Sized> ErrorSink for &mut T {
    fn report(
        &mut self,
        args: fmt::Arguments<'_>,
    ) {
        T::report(self, args)
    }
}

/// Error sink that forwards every report to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(
        &mut self,
        args: fmt::Arguments<'_>,
    ) {
        tracing::error!(target: "airc::model", "{}", args);
    }
}

/// Index-based handle onto an engine-owned tensor.
///
/// Holds no pointer into the engine, only the tensor index and the slot count
/// observed at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorView {
    index: usize,
    len: usize,
}

impl TensorView {
    /// Resolve tensor `index` of the given kind and check it holds at least
    /// `required` slots.
    pub fn bind<E: InferenceEngine + ?Sized>(
        engine: &mut E,
        kind: TensorKind,
        index: usize,
        required: usize,
    ) -> Result<Self, ConfigError> {
        let len = match kind {
            TensorKind::Input => engine.input(index).map(|s| s.len()),
            TensorKind::Output => engine.output(index).map(|s| s.len()),
        }
        .ok_or(ConfigError::MissingTensor { kind, index })?;

        if len < required {
            return Err(ConfigError::TensorTooSmall {
                kind,
                len,
                required,
            });
        }
        Ok(Self { index, len })
    }

    /// Slot count observed when the view was bound.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Borrow the first `N` input slots.
    pub fn input_slots<'e, E: InferenceEngine + ?Sized, const N: usize>(
        &self,
        engine: &'e mut E,
    ) -> Option<&'e mut [f32; N]> {
        engine
            .input(self.index)?
            .get_mut(..N)?
            .try_into()
            .ok()
    }

    /// Copy out the first `N` output slots.
    pub fn output_slots<E: InferenceEngine + ?Sized, const N: usize>(
        &self,
        engine: &E,
    ) -> Option<[f32; N]> {
        engine.output(self.index)?.get(..N)?.try_into().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slots {
        input: [f32; 4],
        output: [f32; 2],
    }

    impl InferenceEngine for Slots {
        type Error = ();

        fn input(
            &mut self,
            index: usize,
        ) -> Option<&mut [f32]> {
            (index == 0).then_some(&mut self.input[..])
        }

        fn output(
            &self,
            index: usize,
        ) -> Option<&[f32]> {
            (index == 0).then_some(&self.output[..])
        }

        fn invoke(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn bind_accepts_larger_tensor() {
        let mut engine = Slots {
            input: [0.0; 4],
            output: [0.0; 2],
        };
        let view = TensorView::bind(&mut engine, TensorKind::Input, 0, 3).unwrap();
        assert_eq!(view.len(), 4);

        let slots: &mut [f32; 3] = view.input_slots(&mut engine).unwrap();
        slots[2] = 0.5;
        assert_eq!(engine.input, [0.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn bind_rejects_short_and_missing_tensors() {
        let mut engine = Slots {
            input: [0.0; 4],
            output: [0.0; 2],
        };
        assert_eq!(
            TensorView::bind(&mut engine, TensorKind::Output, 0, 3),
            Err(ConfigError::TensorTooSmall {
                kind: TensorKind::Output,
                len: 2,
                required: 3
            })
        );
        assert_eq!(
            TensorView::bind(&mut engine, TensorKind::Input, 1, 3),
            Err(ConfigError::MissingTensor {
                kind: TensorKind::Input,
                index: 1
            })
        );
    }
}
