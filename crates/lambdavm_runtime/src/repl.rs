//! The main REPL implementation.

use crate::editor::{LineEditor, ReadResult, RustylineEditor, open_parens};
use lambdavm_foundation::{Error, ErrorKind, Result, Value};
use lambdavm_language::{
    Ast, Interpreter, ScopeChain, TraceOutput, Vm, VmConfig, compile_expr, parse,
};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Commands understood at the prompt, each introduced by `:`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the command summary.
    Help,
    /// Leave the REPL.
    Quit,
    /// Toggle printing the compiled bytecode before running it.
    Dump,
    /// Toggle echoing every executed instruction to stderr.
    Trace,
    /// Toggle evaluating with the tree-walking interpreter.
    Interp,
}

impl Command {
    /// Every command, in help order.
    pub const ALL: [Self; 5] = [
        Self::Help,
        Self::Quit,
        Self::Dump,
        Self::Trace,
        Self::Interp,
    ];

    /// The command's name without the leading `:`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Dump => "dump",
            Self::Trace => "trace",
            Self::Interp => "interp",
        }
    }

    const fn summary(self) -> &'static str {
        match self {
            Self::Help => "show this help",
            Self::Quit => "exit the REPL",
            Self::Dump => "toggle bytecode listings",
            Self::Trace => "toggle instruction tracing",
            Self::Interp => "toggle tree-walking evaluation (results print as terms)",
        }
    }

    /// Parses a command line such as `:dump`. Unambiguous prefixes are accepted.
    ///
    /// # Errors
    /// Returns an error if no command matches.
    pub fn parse(line: &str) -> Result<Self> {
        let name = line.trim().trim_start_matches(':');
        let mut matches = Self::ALL
            .into_iter()
            .filter(|cmd| !name.is_empty() && cmd.name().starts_with(name));
        match (matches.next(), matches.next()) {
            (Some(cmd), None) => Ok(cmd),
            _ => Err(Error::new(ErrorKind::Internal(format!(
                "unknown command ':{name}' (try :help)"
            )))),
        }
    }
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// The bytecode VM for evaluation.
    vm: Vm,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Whether to print each compiled program before running it.
    dump: bool,

    /// Whether to evaluate with the interpreter instead of the VM.
    interpret: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,

    /// Binder names seen so far, offered for completion.
    symbols: BTreeSet<String>,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        let mut repl = Self {
            editor,
            vm: Vm::new(),
            show_banner: true,
            dump: false,
            interpret: false,
            prompt: "Enter expression> ".to_string(),
            continuation_prompt: "... ".to_string(),
            symbols: BTreeSet::new(),
        };
        repl.refresh_completions();
        repl
    }

    /// Replaces the VM with one built from `config`.
    #[must_use]
    pub fn with_config(mut self, config: VmConfig) -> Self {
        self.vm = Vm::with_config(config);
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Enables or disables bytecode listings.
    #[must_use]
    pub const fn with_dump(mut self, dump: bool) -> Self {
        self.dump = dump;
        self
    }

    /// Selects the tree-walking interpreter instead of the VM.
    #[must_use]
    pub const fn with_interpreter(mut self, interpret: bool) -> Self {
        self.interpret = interpret;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns the VM.
    #[must_use]
    pub const fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Returns whether bytecode listings are printed.
    #[must_use]
    pub const fn dump_enabled(&self) -> bool {
        self.dump
    }

    /// Returns whether the interpreter is evaluating input.
    #[must_use]
    pub const fn interpreter_enabled(&self) -> bool {
        self.interpret
    }

    /// Returns whether instruction tracing is on.
    #[must_use]
    pub fn trace_enabled(&self) -> bool {
        self.vm.tracer().is_enabled()
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.print_error(&e);
                }
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false); // EOF
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }

        self.editor.add_history(&input);

        if trimmed.starts_with(':') {
            return Ok(self.execute_command(Command::parse(trimmed)?));
        }

        if self.interpret {
            match self.interpret(&input) {
                Ok(Some(term)) => println!("Result> {term}"),
                Ok(None) => {}
                Err(e) => self.print_error(&e),
            }
        } else {
            match self.eval(&input) {
                Ok(Some(value)) => println!("{}", self.format_value(&value)),
                Ok(None) => {}
                Err(e) => self.print_error(&e),
            }
        }

        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let prompt = if first_line {
                &self.prompt
            } else {
                &self.continuation_prompt
            };

            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if first_line {
                        input = line;
                    } else {
                        input.push('\n');
                        input.push_str(&line);
                    }

                    if self.is_complete(&input) {
                        return Ok(Some(input));
                    }

                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if first_line {
                        println!();
                        return Ok(Some(String::new()));
                    }
                    println!("\nInput cancelled.");
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(Error::new(ErrorKind::Internal(
                        "unexpected EOF in multi-line input".to_string(),
                    )));
                }
            }
        }
    }

    /// Checks if input is complete (no parenthesis left open).
    #[allow(clippy::unused_self)]
    fn is_complete(&self, input: &str) -> bool {
        input.trim_start().starts_with(':') || open_parens(input) <= 0
    }

    /// Applies a REPL command. Returns `false` when the REPL should exit.
    pub fn execute_command(&mut self, command: Command) -> bool {
        match command {
            Command::Help => self.print_help(),
            Command::Quit => return false,
            Command::Dump => {
                self.dump = !self.dump;
                println!("bytecode listings {}", on_off(self.dump));
            }
            Command::Trace => {
                let tracer = self.vm.tracer_mut();
                if tracer.is_enabled() {
                    tracer.disable();
                } else {
                    tracer.set_output(TraceOutput::Stderr);
                    tracer.enable();
                }
                println!("instruction tracing {}", on_off(self.trace_enabled()));
            }
            Command::Interp => {
                self.interpret = !self.interpret;
                println!("tree-walking evaluation {}", on_off(self.interpret));
            }
        }
        true
    }

    /// Evaluates every expression in `input` and returns the last value,
    /// or `None` if the input holds no expression.
    ///
    /// # Errors
    ///
    /// Returns the first parse, compile, or runtime error; later expressions
    /// are not evaluated.
    pub fn eval(&mut self, input: &str) -> Result<Option<Value>> {
        let exprs = parse(input)?;
        self.remember_symbols(&exprs);

        let mut result = None;
        for expr in &exprs {
            result = Some(self.eval_expr(expr)?);
        }
        Ok(result)
    }

    /// Evaluates every expression in `input` with the interpreter and
    /// returns the last result printed as a lambda term.
    ///
    /// # Errors
    ///
    /// Returns the first parse or evaluation error.
    pub fn interpret(&mut self, input: &str) -> Result<Option<String>> {
        let exprs = parse(input)?;
        self.remember_symbols(&exprs);

        let mut interpreter = Interpreter::with_config(self.vm.config());
        let mut result = None;
        for expr in &exprs {
            result = Some(interpreter.eval(expr)?.to_string());
        }
        Ok(result)
    }

    /// Compiles and runs one expression against an empty scope.
    fn eval_expr(&mut self, expr: &Ast) -> Result<Value> {
        let code = compile_expr(expr, &ScopeChain::empty())?;
        if self.dump {
            print!("{}", code.disassemble());
        }
        self.vm.execute(&code)
    }

    /// Evaluates every expression in a file, printing each result.
    ///
    /// Returns the last value, or `None` for a file with no expressions.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or an expression fails;
    /// the error names the file.
    pub fn eval_file(&mut self, path: &Path) -> Result<Option<Value>> {
        let exprs = self.read_file(path)?;

        let mut result = None;
        for expr in &exprs {
            let value = self.eval_expr(expr).map_err(|e| in_file(e, path))?;
            println!("{}", self.format_value(&value));
            result = Some(value);
        }
        Ok(result)
    }

    /// Like [`Repl::eval_file`], but evaluates with the interpreter and
    /// returns the last result printed as a lambda term.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or an expression fails;
    /// the error names the file.
    pub fn interpret_file(&mut self, path: &Path) -> Result<Option<String>> {
        let exprs = self.read_file(path)?;

        let mut interpreter = Interpreter::with_config(self.vm.config());
        let mut result = None;
        for expr in &exprs {
            let term = interpreter
                .eval(expr)
                .map_err(|e| in_file(e, path))?
                .to_string();
            println!("Result> {term}");
            result = Some(term);
        }
        Ok(result)
    }

    fn read_file(&mut self, path: &Path) -> Result<Vec<Ast>> {
        let source = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::Internal(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        })?;

        let exprs = parse(&source).map_err(|e| in_file(e, path))?;
        self.remember_symbols(&exprs);
        Ok(exprs)
    }

    fn remember_symbols(&mut self, exprs: &[Ast]) {
        let before = self.symbols.len();
        for expr in exprs {
            collect_binders(expr, &mut self.symbols);
        }
        if self.symbols.len() != before {
            self.refresh_completions();
        }
    }

    fn refresh_completions(&mut self) {
        let words = Command::ALL
            .iter()
            .map(|cmd| format!(":{}", cmd.name()))
            .chain(self.symbols.iter().cloned())
            .collect();
        self.editor.set_completions(words);
    }

    /// Formats a value for display.
    #[allow(clippy::unused_self)]
    fn format_value(&self, value: &Value) -> String {
        format!("Result> {value}")
    }

    /// Prints an error to stderr.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        match &error.context {
            Some(ctx) => eprintln!("\x1b[31mError: {error} ({ctx})\x1b[0m"),
            None => eprintln!("\x1b[31mError: {error}\x1b[0m"),
        }
    }

    #[allow(clippy::unused_self)]
    fn print_help(&self) {
        println!("Enter one lambda-calculus expression per line:");
        println!("  x            symbol");
        println!("  \\x body      lambda");
        println!("  (f a)        application");
        println!();
        for cmd in Command::ALL {
            println!("  :{:<10} {}", cmd.name(), cmd.summary());
        }
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("lambdavm v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for commands. Use Ctrl+D to exit.\n");

        let _ = io::stdout().flush();
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Names `path` as the source of `error`, keeping any position already set.
fn in_file(error: Error, path: &Path) -> Error {
    let context = error
        .context
        .clone()
        .unwrap_or_default()
        .with_source(path.display().to_string());
    error.with_context(context)
}

fn collect_binders(expr: &Ast, out: &mut BTreeSet<String>) {
    let mut pending = vec![expr];
    while let Some(node) = pending.pop() {
        match node {
            Ast::Symbol(..) => {}
            Ast::Lambda(param, body, _) => {
                out.insert(param.clone());
                pending.push(body);
            }
            Ast::Application(operator, operand, _) => {
                pending.push(operator);
                pending.push(operand);
            }
        }
    }
}
