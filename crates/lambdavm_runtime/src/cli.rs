//! Command-line argument parsing for the `lambdavm` binary.

use std::path::PathBuf;

use lambdavm_language::{TraceConfig, VmConfig};
use thiserror::Error;

/// A problem with the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// An option that takes a value was last on the line.
    #[error("{0} requires a value")]
    MissingValue(&'static str),

    /// An option value did not parse.
    #[error("invalid {flag} value: {value}")]
    InvalidValue {
        /// The option.
        flag: &'static str,
        /// What was given.
        value: String,
    },

    /// An option nobody recognizes.
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// CLI configuration parsed from arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Source files to evaluate, in order.
    pub files: Vec<PathBuf>,
    /// Evaluate the files and exit without starting the REPL.
    pub batch_mode: bool,
    /// Print help and exit.
    pub show_help: bool,
    /// Print the version and exit.
    pub show_version: bool,
    /// Print each compiled program before running it.
    pub dump: bool,
    /// Echo every executed instruction to stderr.
    pub trace_vm: bool,
    /// Evaluate with the tree-walking interpreter instead of the VM.
    pub interpret: bool,
    /// Capacity for each of the three VM stacks.
    pub stack_size: Option<usize>,
    /// Instruction budget per evaluation.
    pub max_steps: Option<u64>,
}

impl CliConfig {
    /// Builds the VM configuration these options describe.
    #[must_use]
    pub fn vm_config(&self) -> VmConfig {
        let mut config = VmConfig::new();
        if let Some(size) = self.stack_size {
            config = config.with_stack_capacity(size);
        }
        if let Some(max) = self.max_steps {
            config = config.with_max_steps(max);
        }
        if self.trace_vm {
            config = config.with_trace(TraceConfig::new().enabled().to_stderr());
        }
        config
    }
}

/// Parses arguments, skipping the program name in `args[0]`.
///
/// # Errors
/// Returns an error for unknown options and missing or malformed values.
pub fn parse_args<I, S>(args: I) -> Result<CliConfig, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut config = CliConfig::default();
    let mut args = args.into_iter().map(Into::into).skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--dump" => config.dump = true,
            "--trace-vm" => config.trace_vm = true,
            "-i" | "--interpret" => config.interpret = true,
            "--stack-size" => {
                let size: usize = value_of("--stack-size", args.next())?;
                if size == 0 {
                    return Err(CliError::InvalidValue {
                        flag: "--stack-size",
                        value: "0".to_string(),
                    });
                }
                config.stack_size = Some(size);
            }
            "--max-steps" => config.max_steps = Some(value_of("--max-steps", args.next())?),
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(CliError::UnknownOption(flag.to_string()));
            }
            path => config.files.push(PathBuf::from(path)),
        }
    }

    Ok(config)
}

fn value_of<T: std::str::FromStr>(
    flag: &'static str,
    value: Option<String>,
) -> Result<T, CliError> {
    let value = value.ok_or(CliError::MissingValue(flag))?;
    value
        .parse()
        .map_err(|_| CliError::InvalidValue { flag, value })
}
