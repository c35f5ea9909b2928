//! rtscope CLI - コマンドラインインターフェース
//!
//! 停止中の ChibiOS/RT ターゲットのダンプを読み込み、スレッド・タイマ・トレースを表示する

mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rtscope_core::{Command, Inspector, KernelLayout, ReplaySession};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// rtscope - ChibiOS/RT kernel inspector
#[derive(Parser)]
#[command(name = "rtscope")]
#[command(version)]
#[command(about = "Kernel-aware inspector for paused ChibiOS/RT targets", long_about = None)]
struct Cli {
    /// Path to the recorded target dump
    dump: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<ViewCommand>,
}

/// カーネル構造体の名前の上書き
#[derive(Args)]
struct LayoutArgs {
    /// Symbol of the thread registry root
    #[arg(long)]
    registry: Option<String>,

    /// Type name of the thread control block
    #[arg(long)]
    thread_type: Option<String>,

    /// Symbol of the virtual timer delta list
    #[arg(long)]
    timer_list: Option<String>,

    /// Type name of a virtual timer
    #[arg(long)]
    timer_type: Option<String>,

    /// Symbol of the trace buffer
    #[arg(long)]
    trace_buffer: Option<String>,

    /// Type name of a trace event
    #[arg(long)]
    trace_event_type: Option<String>,

    /// Maximum length of a thread name
    #[arg(long)]
    name_len: Option<usize>,

    /// Saved stack pointer member, tried in the given order (repeatable)
    #[arg(long = "stack-member")]
    stack_members: Vec<String>,
}

impl LayoutArgs {
    /// 指定された項目だけをデフォルトのレイアウトに上書きする
    fn into_layout(self) -> KernelLayout {
        let mut layout = KernelLayout::default();

        if let Some(symbol) = self.registry {
            layout = layout.with_registry_symbol(symbol);
        }
        if let Some(ty) = self.thread_type {
            layout = layout.with_thread_type(ty);
        }
        if let Some(symbol) = self.timer_list {
            layout = layout.with_timer_list_symbol(symbol);
        }
        if let Some(ty) = self.timer_type {
            layout = layout.with_timer_type(ty);
        }
        if let Some(symbol) = self.trace_buffer {
            layout = layout.with_trace_buffer_symbol(symbol);
        }
        if let Some(ty) = self.trace_event_type {
            layout = layout.with_trace_event_type(ty);
        }
        if let Some(len) = self.name_len {
            layout = layout.with_name_max_len(len);
        }
        if !self.stack_members.is_empty() {
            layout = layout.with_stack_members(self.stack_members);
        }

        layout
    }
}

/// ターゲットが動作中のときの案内
const RUNNING_NOTICE: &str = "target is running, try again later";

#[derive(Subcommand, Clone, Copy)]
enum ViewCommand {
    /// Show the thread registry
    Threads,
    /// Show the virtual timer delta list
    Timers,
    /// Show the trace buffer
    Trace,
    /// Start an interactive session (default)
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = ReplaySession::load(&cli.dump)
        .with_context(|| format!("failed to load dump {}", cli.dump.display()))?;
    info!(dump = %cli.dump.display(), values = session.value_count(), "Loaded dump");

    let mut inspector = Inspector::with_layout(session, cli.layout.into_layout());

    match cli.command.unwrap_or(ViewCommand::Repl) {
        ViewCommand::Threads => show_threads(&mut inspector),
        ViewCommand::Timers => show_timers(&mut inspector),
        ViewCommand::Trace => show_trace(&mut inspector),
        ViewCommand::Repl => {
            println!("rtscope - ChibiOS/RT kernel inspector");
            println!("Version {}", env!("CARGO_PKG_VERSION"));
            println!();
            run_repl(&mut inspector)
        }
    }
}

/// ログ出力を初期化する（RUST_LOG があればそちらを優先）
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// REPLループを実行する
fn run_repl(inspector: &mut Inspector<ReplaySession>) -> Result<()> {
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("(rtscope) ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                match Command::parse(line) {
                    Some(Command::Quit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Some(command) => {
                        if let Err(e) = handle_command(inspector, command) {
                            eprintln!("Error: {}", e);
                        }
                    }
                    None => {
                        println!("Unknown command: {}", line);
                        println!("Type 'help' for available commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn handle_command(inspector: &mut Inspector<ReplaySession>, command: Command) -> Result<()> {
    match command {
        Command::Threads => show_threads(inspector),
        Command::Timers => show_timers(inspector),
        Command::Trace => show_trace(inspector),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Quit => Ok(()),
    }
}

fn show_threads(inspector: &mut Inspector<ReplaySession>) -> Result<()> {
    show(inspector.threads(), render::threads)
}

fn show_timers(inspector: &mut Inspector<ReplaySession>) -> Result<()> {
    show(inspector.timers(), render::timers)
}

fn show_trace(inspector: &mut Inspector<ReplaySession>) -> Result<()> {
    show(inspector.trace(), render::trace)
}

/// 走査結果を表示する。ターゲットが動作中なら案内だけを表示する
fn show<T, E>(result: Result<Option<T>, E>, render: fn(&T) -> String) -> Result<()>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match result? {
        Some(collected) => println!("{}", render(&collected)),
        None => println!("{}", RUNNING_NOTICE),
    }
    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!();
    println!("  help (h, ?)      - Show this help message");
    println!("  quit/exit/q      - Exit the inspector");
    println!();
    println!("Kernel views:");
    println!("  threads (th)     - Show threads in the registry");
    println!("  timers (vt)      - Show armed virtual timers");
    println!("  trace (tb)       - Show the context switch trace, oldest first");
    println!();
    println!("Fields that cannot be read on this kernel are shown as '-'.");
}
