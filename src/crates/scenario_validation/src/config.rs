use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::validation::ValidationFactory;

/// One sequence of checks, in the order they must be satisfied.
pub type SequenceSpec = Vec<ValidationFactory>;

/// Checks and timing for a scenario; build any number of runs from it.
#[derive(Clone)]
pub struct ScenarioConfig {
    /// Sequences that must all hold for the whole run.
    pub always: Vec<SequenceSpec>,
    /// Alternative milestone sequences; any one completing passes the run.
    pub eventually: Vec<SequenceSpec>,
    /// Hard wall-clock bound on the run.
    pub timeout: Duration,
    /// Longest single wait for the next snapshot before re-checking the deadline and abort flag.
    pub snapshot_wait: Duration,
}

impl ScenarioConfig {
    pub fn new(
        always: Vec<SequenceSpec>,
        eventually: Vec<SequenceSpec>,
        timeout: Duration,
    ) -> Self {
        Self {
            always,
            eventually,
            timeout,
            snapshot_wait: Duration::from_millis(10),
        }
    }

    /// Add an invariant sequence.
    pub fn with_always_sequence(mut self, sequence: SequenceSpec) -> Self {
        self.always.push(sequence);
        self
    }

    /// Add an alternative milestone sequence.
    pub fn with_eventually_sequence(mut self, sequence: SequenceSpec) -> Self {
        self.eventually.push(sequence);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_snapshot_wait(mut self, wait: Duration) -> Self {
        self.snapshot_wait = wait;
        self
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Duration::from_secs(10))
    }
}

impl fmt::Debug for ScenarioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lengths = |sets: &[SequenceSpec]| sets.iter().map(Vec::len).collect::<Vec<_>>();
        f.debug_struct("ScenarioConfig")
            .field("always", &lengths(&self.always))
            .field("eventually", &lengths(&self.eventually))
            .field("timeout", &self.timeout)
            .field("snapshot_wait", &self.snapshot_wait)
            .finish()
    }
}

/// Process-level configuration for launching a simulator binary.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Path to the simulator binary to spawn.
    pub binary_path: PathBuf,
    /// Additional CLI arguments passed through to the simulator.
    pub extra_args: Vec<String>,
    /// Extra environment variables applied to the child process.
    pub env: BTreeMap<String, String>,
    /// Optional working directory override for the child process.
    pub working_directory: Option<PathBuf>,
    /// Upper bound on how long to wait for the simulator to announce readiness.
    pub startup_timeout: Duration,
}

impl SimulatorConfig {
    /// Create a new config targeting a specific simulator binary.
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            extra_args: Vec::new(),
            env: BTreeMap::new(),
            working_directory: None,
            startup_timeout: Duration::from_secs(5),
        }
    }

    /// Add a passthrough CLI argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Add an environment variable override.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Override the working directory for the spawned process.
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Override the startup timeout used while waiting for the readiness line.
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }
}
