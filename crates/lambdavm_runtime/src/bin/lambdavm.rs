//! lambdavm CLI entry point.

use lambdavm_runtime::{CliConfig, Repl, parse_args};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn run(args: impl Iterator<Item = String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("lambdavm {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if config.trace_vm || config.dump {
        print_debug_flags(&config);
    }

    let mut repl = Repl::new()?
        .with_config(config.vm_config())
        .with_dump(config.dump)
        .with_interpreter(config.interpret);

    for file in &config.files {
        let outcome = if config.interpret {
            repl.interpret_file(file).map(|_| ())
        } else {
            repl.eval_file(file).map(|_| ())
        };
        if let Err(e) = outcome {
            return Err(match &e.context {
                Some(ctx) => format!("{e} ({ctx})").into(),
                None => e.into(),
            });
        }
    }

    if config.batch_mode {
        return Ok(());
    }

    // Files establish their own context; skip the banner after them.
    if !config.files.is_empty() {
        repl = repl.without_banner();
    }

    repl.run()?;
    Ok(())
}

fn print_debug_flags(config: &CliConfig) {
    eprintln!("\x1b[33mDebug flags enabled:\x1b[0m");
    if config.dump {
        eprintln!("  - Bytecode listings (--dump)");
    }
    if config.trace_vm {
        eprintln!("  - VM instruction tracing (--trace-vm)");
    }
    eprintln!();
}

fn print_help() {
    println!(
        "\x1b[1mlambdavm\x1b[0m - Untyped lambda calculus on a closure-converting bytecode VM

\x1b[1mUSAGE:\x1b[0m
    lambdavm [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Files to evaluate before starting the REPL

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -b, --batch        Evaluate files and exit (no REPL)
    -i, --interpret    Evaluate with the tree-walking interpreter; results print as terms
    --stack-size N     Capacity of each VM stack (default 1024)
    --max-steps N      Instruction budget per expression (default unlimited)

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --dump             Print the bytecode of every expression before running it
    --trace-vm         Echo every executed instruction to stderr

\x1b[1mEXAMPLES:\x1b[0m
    lambdavm                          Start interactive REPL
    lambdavm church.lam               Evaluate church.lam, then start REPL
    lambdavm -b church.lam            Evaluate church.lam and exit
    lambdavm --dump -b id.lam         Show the compiled code for id.lam
    lambdavm -i -b church.lam         Print the resulting lambda terms

\x1b[1mSYNTAX:\x1b[0m
    x                    Symbol
    \\x body              Lambda
    (f a)                Application

\x1b[1mREPL COMMANDS:\x1b[0m
    :help                Show commands
    :quit                Exit REPL
    :dump                Toggle bytecode listings
    :trace               Toggle instruction tracing
    :interp              Toggle tree-walking evaluation
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input"
    );
}
