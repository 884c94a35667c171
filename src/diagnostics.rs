use crate::StrError;
use std::fmt;
use std::str::FromStr;

const ROOT: usize = 0;

const BANNER: &str = "--------------------- Error Message ---------------------------------------";

const FOOTER: &str = "--------------------- End of Error Message --------------------------------";

/// Specifies where the error reports go
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Stderr,
    Stdout,
    None,
}

impl FromStr for OutputTarget {
    type Err = StrError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stderr" => Ok(OutputTarget::Stderr),
            "stdout" => Ok(OutputTarget::Stdout),
            "none" => Ok(OutputTarget::None),
            _ => Err("error output must be one of stderr, stdout, none"),
        }
    }
}

/// Holds the state of the reporting state machine
///
/// * `Idle` -- no failure reported since the last `finish` or `reset`
/// * `ReportingInitial` -- the first report of an episode printed the full message
/// * `ReportingRepeat` -- the same error travels up the stack; only frames are printed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportState {
    Idle,
    ReportingInitial,
    ReportingRepeat,
}

/// Holds an error together with the stage that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Failure {
    /// Name of the failing stage (e.g., "assembly")
    pub stage: &'static str,

    /// Error message
    pub error: StrError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

/// Attaches a stage name to the error of a Result
pub trait WithStage<T> {
    fn stage(self, stage: &'static str) -> Result<T, Failure>;
}

impl<T> WithStage<T> for Result<T, StrError> {
    fn stage(self, stage: &'static str) -> Result<T, Failure> {
        self.map_err(|error| Failure { stage, error })
    }
}

/// Prints failure reports once per episode
///
/// The context is created at startup and handed to every reporting call. Only the root rank
/// writes; the other ranks go silent until the episode ends.
#[derive(Clone, Debug)]
pub struct DiagnosticContext {
    program: String,
    version: &'static str,
    rank: usize,
    size: usize,
    target: OutputTarget,
    state: ReportState,
    frame: usize,
    last: Option<StrError>,
}

impl DiagnosticContext {
    /// Allocates a new instance
    pub fn new(program: &str, rank: usize, size: usize, target: OutputTarget) -> Self {
        DiagnosticContext {
            program: program.to_string(),
            version: env!("CARGO_PKG_VERSION"),
            rank,
            size,
            target,
            state: ReportState::Idle,
            frame: 1,
            last: None,
        }
    }

    /// Returns the current state
    pub fn state(&self) -> ReportState {
        self.state
    }

    /// Reports a failure and returns the lines written (empty on silent ranks)
    pub fn report(&mut self, failure: &Failure) -> Vec<String> {
        let mut lines = Vec::new();
        let repeat = self.state != ReportState::Idle && self.last == Some(failure.error);
        if repeat {
            self.state = ReportState::ReportingRepeat;
        } else {
            lines.push(BANNER.to_string());
            if self.state != ReportState::Idle {
                lines.push("  a new error was triggered after a previous error".to_string());
                lines.push("  above is the traceback of the previous error, below the new one".to_string());
            }
            lines.push(failure.error.to_string());
            lines.push(format!("stage: {}", failure.stage));
            lines.push(format!(
                "{} v{} with {} worker(s), reported by rank {}",
                self.program, self.version, self.size, self.rank
            ));
            self.state = ReportState::ReportingInitial;
            self.frame = 1;
            self.last = Some(failure.error);
        }
        lines.push(format!("#{} {}", self.frame, failure.stage));
        self.frame += 1;
        self.emit(lines)
    }

    /// Closes the current episode (if any) and returns the lines written
    pub fn finish(&mut self) -> Vec<String> {
        if self.state == ReportState::Idle {
            return Vec::new();
        }
        self.reset();
        self.emit(vec![FOOTER.to_string()])
    }

    /// Returns to the idle state without printing
    pub fn reset(&mut self) {
        self.state = ReportState::Idle;
        self.frame = 1;
        self.last = None;
    }

    fn emit(&self, lines: Vec<String>) -> Vec<String> {
        if self.rank != ROOT {
            return Vec::new();
        }
        let lines: Vec<String> = lines
            .into_iter()
            .map(|line| format!("[{}] ERROR: {}", self.rank, line))
            .collect();
        for line in &lines {
            match self.target {
                OutputTarget::Stderr => eprintln!("{}", line),
                OutputTarget::Stdout => println!("{}", line),
                OutputTarget::None => (),
            }
        }
        lines
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
