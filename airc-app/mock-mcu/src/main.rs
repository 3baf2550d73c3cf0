use std::{error::Error, path::PathBuf};

use airc_core::mk_static;
use airc_core::utils::controllers::agent::{AgentConfig, DriveLoopController};
use airc_core::utils::controllers::drivers::{Actuator, RangeSensor};
use airc_core::utils::inference::{InferenceEngine, TracingErrorSink};
use airc_core::utils::math::normalize::{Calibration, SensorReading};
use airc_core::utils::pace;
use clap::Parser;
use embassy_executor::Executor;
use embassy_time::{Duration, Timer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Maximum number of scripted sensor readings.
const MAX_READINGS: usize = 16;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// JSON agent configuration (calibration and failure policy)
    #[clap(long)]
    config: Option<PathBuf>,
    /// override the calibration lower bound
    #[clap(long)]
    min: Option<u16>,
    /// override the calibration upper bound
    #[clap(long)]
    max: Option<u16>,
    /// drive tick period in milliseconds
    #[clap(long, default_value_t = 100)]
    period_ms: u64,
    /// number of drive ticks before stopping, 0 runs forever
    #[clap(long, default_value_t = 20)]
    ticks: u32,
    /// make every Nth inference fail
    #[clap(long)]
    fail_every: Option<u32>,
    /// stop the motors after this many failed inferences in a row
    #[clap(long)]
    safe_stop_after: Option<u32>,
    /// scripted sensor reading as LEFT,CENTER,RIGHT (repeatable)
    #[clap(long = "reading", value_parser = parse_reading)]
    readings: Vec<SensorReading>,
}

fn parse_reading(s: &str) -> Result<SensorReading, String> {
    let beams = s
        .split(',')
        .map(|v| v.trim().parse::<u16>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let beams: [u16; 3] = beams
        .try_into()
        .map_err(|_| String::from("expected LEFT,CENTER,RIGHT"))?;
    Ok(SensorReading::from(beams))
}

/// Motor driver that logs to console.
#[derive(Default)]
struct ConsoleMotor {
    running: bool,
}

impl Actuator for ConsoleMotor {
    fn cmd(
        &mut self,
        steering: f32,
        throttle: f32,
    ) {
        self.running = true;
        info!(steering, throttle, "Motor command");
    }

    fn stop(&mut self) {
        if self.running {
            info!("Motor stopped");
        } else {
            info!("Motor already stopped");
        }
        self.running = false;
    }
}

/// Range sensor that replays a fixed script of readings in a loop.
struct ScriptedSensor {
    script: heapless::Vec<SensorReading, MAX_READINGS>,
    cursor: usize,
}

impl ScriptedSensor {
    fn new(readings: &[SensorReading]) -> Self {
        let defaults = [
            SensorReading::new(900, 300, 200),
            SensorReading::new(600, 800, 300),
            SensorReading::new(200, 400, 900),
            SensorReading::new(500, 500, 500),
        ];
        let source = if readings.is_empty() {
            &defaults[..]
        } else {
            readings
        };

        let mut script = heapless::Vec::new();
        for reading in source {
            if script.push(*reading).is_err() {
                warn!("Sensor script truncated to {} readings", MAX_READINGS);
                break;
            }
        }
        Self { script, cursor: 0 }
    }
}

impl RangeSensor for ScriptedSensor {
    fn get_data(
        &mut self,
        buffer: &mut [u16],
    ) {
        let beams = self.script[self.cursor].to_array();
        self.cursor = (self.cursor + 1) % self.script.len();
        for (slot, beam) in buffer.iter_mut().zip(beams) {
            *slot = beam;
        }
    }
}

#[derive(Debug)]
enum SimError {
    #[allow(dead_code)]
    Injected { invocation: u32 },
}

/// Stand-in classifier: scores each direction by how open it is.
struct LinearModel {
    input: [f32; 3],
    output: [f32; 3],
    weights: [[f32; 3]; 3],
    bias: [f32; 3],
    fail_every: Option<u32>,
    invocations: u32,
}

impl LinearModel {
    fn new(fail_every: Option<u32>) -> Self {
        Self {
            input: [0.0; 3],
            output: [0.0; 3],
            weights: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            // favour going straight when the beams agree
            bias: [0.0, 0.05, 0.0],
            fail_every: fail_every.filter(|&n| n > 0),
            invocations: 0,
        }
    }
}

impl InferenceEngine for LinearModel {
    type Error = SimError;

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

    fn invoke(&mut self) -> Result<(), Self::Error> {
        self.invocations += 1;
        if self
            .fail_every
            .is_some_and(|n| self.invocations % n == 0)
        {
            return Err(SimError::Injected {
                invocation: self.invocations,
            });
        }
        for (class, row) in self.weights.iter().enumerate() {
            let dot: f32 = row.iter().zip(self.input).map(|(w, x)| w * x).sum();
            self.output[class] = dot + self.bias[class];
        }
        Ok(())
    }
}

type Agent = DriveLoopController<ConsoleMotor, ScriptedSensor, LinearModel, TracingErrorSink>;

fn load_config(opts: &Opts) -> Result<AgentConfig, Box<dyn Error>> {
    let mut config = match &opts.config {
        Some(path) => serde_json::from_str::<AgentConfig>(&std::fs::read_to_string(path)?)?,
        None => AgentConfig::default(),
    };
    if opts.min.is_some() || opts.max.is_some() {
        let base = config.calibration;
        config.calibration = Calibration::new(
            opts.min.unwrap_or(base.min_value()),
            opts.max.unwrap_or(base.max_value()),
        )?;
    }
    if opts.safe_stop_after.is_some() {
        config.policy.safe_stop_after = opts.safe_stop_after;
    }
    Ok(config)
}

#[embassy_executor::task]
async fn agent_task(mut agent: Agent) -> ! {
    agent.agent_ch().await
}

#[embassy_executor::task]
async fn pacer_task(
    period: Duration,
    ticks: Option<u32>,
) {
    pace(period, ticks).await;
    // let the agent drain the final stop
    Timer::after(period).await;
    info!("Drive session finished");
    std::process::exit(0);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    info!(
        min = config.calibration.min_value(),
        max = config.calibration.max_value(),
        safe_stop_after = ?config.policy.safe_stop_after,
        "Agent configured"
    );

    let mut agent = Agent::from_config(config);
    agent.initialize(ConsoleMotor::default(), ScriptedSensor::new(&opts.readings));
    if let Err(e) = agent.set_model(LinearModel::new(opts.fail_every), TracingErrorSink) {
        error!("Model rejected: {}", e);
        std::process::exit(2);
    }

    let period = Duration::from_millis(opts.period_ms.max(1));
    let ticks = (opts.ticks > 0).then_some(opts.ticks);

    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(agent_task(agent)).unwrap();
        spawner.spawn(pacer_task(period, ticks)).unwrap();
    });
}
