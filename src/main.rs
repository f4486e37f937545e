use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::{Builder, Env};
use log::{debug, info};
use memmap2::Mmap;

use rlox::ast_printer::{AstPrinter, RpnPrinter};
use rlox::error::LoxError;
use rlox::interpreter::Interpreter;
use rlox::lox;
use rlox::scanner::Scanner;
use rlox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// Log file written when --log is given
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print each token as a JSON object
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse {
        filename: Option<PathBuf>,

        /// Print the expression in reverse polish notation
        #[arg(long)]
        rpn: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive session
    Repl,
}

/// Memory‑maps a script file.
fn map_file(filename: &Path) -> Result<Mmap> {
    info!("Mapping file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    // SAFETY: the mapping is read‑only and lives only for this run; scripts
    // are not expected to be modified while being interpreted.
    let mmap = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", mmap.len(), filename);

    Ok(mmap)
}

fn as_source(mmap: &Mmap) -> Result<&str> {
    std::str::from_utf8(mmap)
        .map_err(LoxError::from)
        .context("Script is not valid UTF-8")
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    // `[module:line] - message`, default Debug, override with RUST_LOG
    Builder::from_env(Env::default().default_filter_or("debug"))
        .format(|buf, record| {
            // Strip 'rlox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rlox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

/// Report a Lox failure on stderr and exit with its conventional code.
fn fail(error: &LoxError) -> ! {
    debug!("Exiting after error: {}", error);
    eprintln!("{}", error);
    std::process::exit(error.exit_code());
}

fn no_input(command: &str) {
    info!("No filepath provided for {}", command);
    println!("No input filepath was provided. Exiting...");
}

fn tokenize(source: &str, json: bool) -> Result<()> {
    let mut tokenized = true;

    for token in Scanner::new(source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if json {
                    println!("{}", serde_json::to_string(&token)?);
                } else {
                    println!("{}", token);
                }
            }

            Err(e) => {
                tokenized = false;

                debug!("Tokenization debug: {}", e);

                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");

        std::process::exit(65);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn parse(source: &str, rpn: bool) {
    let tokens: Vec<Token<'_>> = lox::scan(source).unwrap_or_else(|e| fail(&e));
    let expr = lox::parse_expression(&tokens).unwrap_or_else(|e| fail(&e));

    info!("Expression parsed successfully");

    let printed = if rpn {
        RpnPrinter::print(&expr)
    } else {
        AstPrinter::print(&expr)
    };

    debug!("AST: {}", printed);
    println!("{}", printed);
}

fn evaluate(source: &str) {
    let tokens: Vec<Token<'_>> = lox::scan(source).unwrap_or_else(|e| fail(&e));
    let expr = lox::parse_expression(&tokens).unwrap_or_else(|e| fail(&e));
    let mut interpreter = Interpreter::new();

    match lox::evaluate(&mut interpreter, &expr) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
        }
        Err(e) => fail(&e),
    }
}

fn run(source: &str) {
    info!("Provided input:\n {}", source);

    let tokens: Vec<Token<'_>> = lox::scan(source).unwrap_or_else(|e| fail(&e));
    let statements = lox::parse(&tokens).unwrap_or_else(|e| fail(&e));

    info!("Parsed {} statements", statements.len());

    let mut interpreter = Interpreter::new();

    match lox::execute(&mut interpreter, &statements) {
        Ok(()) => info!("Program executed successfully"),
        Err(e) => fail(&e),
    }
}

// ───────────────────────────── REPL ─────────────────────────────

const REPL_HELP: &str = "Commands:\n  :quit, :q   Exit the session\n  :help       Show this help";

/// Run one REPL line.  The session's interpreter keeps closures and classes
/// that point into earlier lines, so each line's source and trees are leaked
/// for the lifetime of the process.
fn repl_line(interpreter: &mut Interpreter<'static>, line: String) -> rlox::error::Result<()> {
    let source: &'static str = Box::leak(line.into_boxed_str());
    let tokens: &'static [Token<'static>] = Box::leak(lox::scan(source)?.into_boxed_slice());

    match lox::parse(tokens) {
        Ok(statements) => {
            let statements: &'static [_] = Box::leak(statements.into_boxed_slice());
            lox::execute(interpreter, statements)
        }
        // `1 + 2` without a semicolon: show its value.
        Err(program_error) => match lox::parse_expression(tokens) {
            Ok(expr) => {
                let expr: &'static _ = Box::leak(Box::new(expr));
                let value = lox::evaluate(interpreter, expr)?;
                println!("{}", value);
                Ok(())
            }
            Err(_) => Err(program_error),
        },
    }
}

fn repl() -> Result<()> {
    info!("Starting REPL");

    let mut interpreter: Interpreter<'static> = Interpreter::new();
    interpreter.set_repl_mode(true);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("Failed to read line")? == 0 {
            // EOF
            println!();
            break;
        }

        match line.trim() {
            ":quit" | ":q" => break,
            ":help" => println!("{}", REPL_HELP),
            "" => continue,
            _ => {
                if let Err(e) = repl_line(&mut interpreter, line) {
                    debug!("REPL error: {}", e);
                    eprintln!("{}", e);
                }
            }
        }
    }

    info!("REPL finished");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger(&args.log_file)?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Some(Commands::Tokenize { filename, json }) => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let mmap = map_file(&filename)?;
                tokenize(as_source(&mmap)?, json)?;
            }
            None => no_input("Tokenize"),
        },

        Some(Commands::Parse { filename, rpn }) => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let mmap = map_file(&filename)?;
                parse(as_source(&mmap)?, rpn);
                info!("Parse subcommand completed");
            }
            None => no_input("Parse"),
        },

        Some(Commands::Evaluate { filename }) => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");
                let mmap = map_file(&filename)?;
                evaluate(as_source(&mmap)?);
                info!("Evaluate subcommand completed");
            }
            None => no_input("Evaluate"),
        },

        Some(Commands::Run { filename }) => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let mmap = map_file(&filename)?;
                run(as_source(&mmap)?);
            }
            None => no_input("Run"),
        },

        Some(Commands::Repl) | None => repl()?,
    }

    Ok(())
}
