//! Playground CLI - run snippets through the execution engine locally

use clap::{Parser, Subcommand};
use console::style;
use env_logger::{Builder, Env};
use log::Level;
use playground_exec::cli::RuntimeArgs;
use playground_exec::{utils, ExecutionRequest, Language, PlaygroundError};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "playground")]
#[command(version, about = "Run playground snippets with the same limits as the server", long_about = None)]
#[command(after_help = "EXAMPLES:
    playground run snippet.py
    echo 'console.log(1)' | playground run --language javascript
    playground --deadline 5 run loop.py
    playground check
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    runtime: RuntimeArgs,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a snippet from a file (or stdin when omitted or "-")
    Run {
        /// Language identifier
        #[arg(short, long, default_value = "python")]
        language: String,

        /// Snippet file
        file: Option<PathBuf>,
    },

    /// Check that interpreters and the dependency root are present
    Check,

    /// List accepted language identifiers
    Languages,
}

fn logger_builder(env: Env) -> Builder {
    let mut builder = Builder::from_env(env);
    builder.format(|buf, record| {
        let level = match record.level() {
            Level::Error => format!("{}", style("ERROR").red().bold()),
            Level::Warn => format!("{}", style("WARN ").yellow().bold()),
            Level::Info => format!("{}", style("INFO ").green()),
            Level::Debug => format!("{}", style("DEBUG").cyan()),
            Level::Trace => format!("{}", style("TRACE").dim()),
        };
        writeln!(buf, "{} {}", level, record.args())
    });
    builder
}

fn init_logger(verbose: bool) {
    let env = Env::default().filter_or("RUST_LOG", if verbose { "debug" } else { "warn" });
    logger_builder(env).init();
}

fn read_snippet(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            Ok(code)
        }
    }
}

async fn run(
    runtime: &RuntimeArgs,
    language: String,
    file: Option<PathBuf>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let playground = runtime.build()?;
    let code = read_snippet(file.as_deref())?;

    let outcome = playground
        .execute(&ExecutionRequest::new(code, language))
        .await?;

    print!("{}", outcome.stdout);
    std::io::stdout().flush()?;
    if !outcome.stderr.is_empty() {
        eprint!("{}", outcome.stderr);
        if !outcome.stderr.ends_with('\n') {
            eprintln!();
        }
    }

    Ok(outcome.succeeded)
}

fn check(runtime: &RuntimeArgs) -> bool {
    let mut ok = true;

    for (name, program) in [("python", &runtime.python), ("javascript", &runtime.node)] {
        match utils::find_executable(program) {
            Some(path) => println!(
                "{} {:<11} {}",
                style("✓").green().bold(),
                name,
                path.display()
            ),
            None => {
                ok = false;
                println!(
                    "{} {:<11} {} not found",
                    style("✗").red().bold(),
                    name,
                    program.display()
                );
            }
        }
    }

    if runtime.node_modules.is_dir() {
        println!(
            "{} {:<11} {}",
            style("✓").green().bold(),
            "node_modules",
            runtime.node_modules.display()
        );
    } else {
        ok = false;
        println!(
            "{} {:<11} {} missing",
            style("✗").red().bold(),
            "node_modules",
            runtime.node_modules.display()
        );
    }

    if utils::is_root() {
        println!(
            "{} running as root: snippets would inherit root privileges",
            style("!").yellow().bold()
        );
    }

    ok
}

fn main() {
    let cli = Cli::parse();

    init_logger(cli.verbose);

    match cli.command {
        Commands::Run { language, file } => {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("{} {}", style("error:").red().bold(), e);
                    std::process::exit(2);
                }
            };

            match runtime.block_on(run(&cli.runtime, language, file)) {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("{} {}", style("error:").red().bold(), e);
                    let unsupported = e
                        .downcast_ref::<PlaygroundError>()
                        .is_some_and(|e| matches!(e, PlaygroundError::UnsupportedLanguage(_)));
                    if unsupported {
                        eprintln!("Supported: {}", Language::IDENTIFIERS.join(", "));
                    }
                    std::process::exit(2);
                }
            }
        }
        Commands::Check => {
            if !check(&cli.runtime) {
                std::process::exit(1);
            }
        }
        Commands::Languages => {
            for id in Language::IDENTIFIERS {
                if let Ok(language) = Language::resolve(id) {
                    println!("{:<11} -> {}", id, language);
                }
            }
        }
    }
}
