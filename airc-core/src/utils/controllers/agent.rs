//! Drive-loop controller.
//!
//! Each tick reads the range sensor, normalizes the three beams, runs the
//! classifier and commands the actuator with the winning steering class at
//! full throttle. Commands can also arrive through `AGENT_CHANNEL`.

use serde::{Deserialize, Serialize};

use crate::utils::{
    controllers::{
        drivers::{Actuator, RangeSensor},
        AgentCommand, AGENT_CHANNEL,
    },
    error::{ConfigError, DriveError, StateError},
    inference::{ErrorSink, InferenceEngine, TensorKind, TensorView},
    math::{
        decision::{SteeringCommand, CLASS_COUNT},
        normalize::{Calibration, SensorReading, BEAMS},
    },
};

/// Value attached to every inference-failure report.
const INVOKE_FAILURE_DIAGNOSTIC: f64 = 1.0;

/// What to do after repeated inference failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    /// Stop the actuator once this many invocations in a row have failed.
    /// `None` keeps the last command in effect indefinitely.
    pub safe_stop_after: Option<u32>,
}

/// Runtime configuration of a [`DriveLoopController`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub calibration: Calibration,
    pub policy: FailurePolicy,
}

struct Model<E, R> {
    engine: E,
    sink: R,
    input: TensorView,
    output: TensorView,
}

/// Sensor → normalize → infer → decide → actuate.
///
/// Collaborators are generic; pass `&mut T` to lend them instead of handing
/// them over. The controller is *Ready* once both [`initialize`] and
/// [`set_model`] have run.
///
/// [`initialize`]: DriveLoopController::initialize
/// [`set_model`]: DriveLoopController::set_model
pub struct DriveLoopController<A, S, E, R> {
    calibration: Calibration,
    policy: FailurePolicy,
    actuator: Option<A>,
    sensor: Option<S>,
    model: Option<Model<E, R>>,
    consecutive_failures: u32,
}

impl<A, S, E, R> DriveLoopController<A, S, E, R>
where
    A: Actuator,
    S: RangeSensor,
    E: InferenceEngine,
    R: ErrorSink,
{
    pub fn new(calibration: Calibration) -> Self {
        Self::with_policy(calibration, FailurePolicy::default())
    }

    pub fn with_policy(
        calibration: Calibration,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            calibration,
            policy,
            actuator: None,
            sensor: None,
            model: None,
            consecutive_failures: 0,
        }
    }

    pub fn from_config(config: AgentConfig) -> Self {
        Self::with_policy(config.calibration, config.policy)
    }

    /// Store the actuator and sensor used by every later call.
    pub fn initialize(
        &mut self,
        actuator: A,
        sensor: S,
    ) {
        self.actuator = Some(actuator);
        self.sensor = Some(sensor);
    }

    /// Bind a ready-to-run model and the sink its failures are reported to.
    ///
    /// Input tensor 0 and output tensor 0 must each hold at least three slots.
    /// On error the previously bound model, if any, stays in place.
    pub fn set_model(
        &mut self,
        mut engine: E,
        sink: R,
    ) -> Result<(), ConfigError> {
        let input = TensorView::bind(&mut engine, TensorKind::Input, 0, BEAMS)?;
        let output = TensorView::bind(&mut engine, TensorKind::Output, 0, CLASS_COUNT)?;
        tracing::info!(
            input_slots = input.len(),
            output_slots = output.len(),
            "Model bound"
        );

        self.model = Some(Model {
            engine,
            sink,
            input,
            output,
        });
        self.consecutive_failures = 0;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.actuator.is_some() && self.sensor.is_some() && self.model.is_some()
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Inference failures seen since the last successful tick.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Run one tick of the decision loop.
    ///
    /// Issues exactly one actuator command on success. A failed invocation is
    /// reported once to the error sink and issues no `cmd`; the failure is
    /// also returned so callers can react.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn drive(&mut self) -> Result<SteeringCommand, DriveError<E::Error>> {
        let (Some(actuator), Some(sensor)) = (self.actuator.as_mut(), self.sensor.as_mut()) else {
            return Err(StateError::NotInitialized.into());
        };
        let model = self.model.as_mut().ok_or(StateError::ModelNotSet)?;

        let mut raw = [0u16; BEAMS];
        sensor.get_data(&mut raw);
        let reading = SensorReading::from(raw);
        let input = self.calibration.normalize_reading(reading);
        tracing::trace!(?reading, ?input, "Sensor sampled");

        let slots: &mut [f32; BEAMS] = model
            .input
            .input_slots(&mut model.engine)
            .ok_or(StateError::TensorLost(TensorKind::Input))?;
        *slots = input.to_array();

        if let Err(error) = model.engine.invoke() {
            model.sink.report(format_args!(
                "inference invoke failed: {:.1}",
                INVOKE_FAILURE_DIAGNOSTIC
            ));
            tracing::error!(?error, "Inference failed, skipping actuation");

            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if let Some(limit) = self.policy.safe_stop_after {
                if self.consecutive_failures == limit.max(1) {
                    tracing::warn!(failures = self.consecutive_failures, "Safe-stop engaged");
                    actuator.stop();
                }
            }
            return Err(DriveError::Inference(error));
        }

        let scores: [f32; CLASS_COUNT] = model
            .output
            .output_slots(&model.engine)
            .ok_or(StateError::TensorLost(TensorKind::Output))?;
        let command = SteeringCommand::from_scores(&scores);
        tracing::debug!(?scores, direction = ?command.direction, "Steering decided");

        actuator.cmd(command.steering(), command.throttle);
        self.consecutive_failures = 0;
        Ok(command)
    }

    /// Halt the actuator. Safe to call repeatedly.
    pub fn stop(&mut self) -> Result<(), StateError> {
        let actuator = self.actuator.as_mut().ok_or(StateError::NotInitialized)?;
        actuator.stop();
        tracing::debug!("Actuator stopped");
        Ok(())
    }

    /// Execute one `AgentCommand`.
    ///
    /// Returns the issued steering command for `Drive`, `None` for `Stop`.
    pub fn execute_command(
        &mut self,
        command: AgentCommand,
    ) -> Result<Option<SteeringCommand>, DriveError<E::Error>> {
        match command {
            AgentCommand::Drive => self.drive().map(Some),
            AgentCommand::Stop => {
                self.stop()?;
                Ok(None)
            }
        }
    }

    /// Serve commands from `AGENT_CHANNEL` forever.
    pub async fn agent_ch(&mut self) -> ! {
        loop {
            let command = AGENT_CHANNEL.receiver().receive().await;
            tracing::debug!(?command, "Received agent command");
            match self.execute_command(command) {
                Ok(Some(cmd)) => {
                    tracing::info!(steering = cmd.steering(), throttle = cmd.throttle, "Drive tick")
                }
                Ok(None) => tracing::info!("Agent stopped"),
                // already reported through the error sink
                Err(DriveError::Inference(_)) => {}
                Err(DriveError::State(e)) => {
                    tracing::warn!("Agent command {:?} rejected: {}", command, e)
                }
            }
        }
    }
}
