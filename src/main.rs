//! Reference CLI for the runtime core: parses flags, wires up ambient
//! logging, builds a small demo program, runs it through the resolver and
//! evaluator, and reports an uncaught exception the way the top-level
//! handler is specified to (§4.13/§7).

mod demo;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use strand_exception::Exception;
use strand_log::{ConsoleAppender, Level, Logger};
use strand_resolver::Program;
use strand_thread::ThreadTable;
use strand_value::queue::BlockingQueue;
use strand_value::Value;

#[derive(Parser)]
#[command(name = "strand")]
#[command(about = "Reference runtime for the Strand scripting language", long_about = None)]
#[command(version)]
struct Cli {
    /// Promote parse-time type warnings to hard parse errors.
    #[arg(long)]
    strict: bool,

    /// Number of slots in the thread table (slot 0 is reserved for signals).
    #[arg(long, default_value_t = strand_thread::DEFAULT_CAPACITY)]
    thread_capacity: usize,

    /// Bound on the demo's blocking queue; unbounded if omitted.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Which built-in demo program to run.
    #[arg(long, default_value = "hello")]
    demo: String,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("starting strand (strict={}, thread_capacity={})", cli.strict, cli.thread_capacity);

    let _threads = ThreadTable::new(cli.thread_capacity);
    let _queue = BlockingQueue::new(cli.queue_capacity);

    let root_logger = Logger::root();
    root_logger.set_level(Some(Level::Info));
    root_logger.add_appender(Arc::new(ConsoleAppender::new()));
    let demo_logger = root_logger.descendant("strand.demo");

    let program = Program::new();
    program.declare_global(demo::RESULT_GLOBAL, Value::Nothing);
    let body = match demo::build(&cli.demo) {
        Some(body) => body,
        None => {
            eprintln!("PARSE-ERROR: unknown demo '{}'", cli.demo);
            return ExitCode::from(2);
        }
    };

    let mut evaluator = strand_eval::Evaluator::new(program.clone());
    match evaluator.exec_block(&body) {
        Ok(_) => {
            let _ = demo_logger.log(Level::Info, "demo '{}' completed successfully", vec![Value::string(cli.demo.clone())]);
            if let Some(result) = program.global(demo::RESULT_GLOBAL) {
                println!("{}", result.lock().to_display_string());
            }
            ExitCode::SUCCESS
        }
        Err(exception) => {
            let _ = demo_logger.log(Level::Error, "demo '{}' raised an uncaught exception", vec![Value::string(cli.demo.clone())]);
            print_uncaught(&exception);
            ExitCode::from(1)
        }
    }
}

/// §7: "Uncaught exceptions at program top-level print kind, err, desc,
/// then the call stack in reverse chronological order; arg, if present and
/// non-`Nothing`, is pretty-printed beneath."
fn print_uncaught(exception: &Exception) {
    eprint!("{}", exception.format_chain());
    if !matches!(exception.core.arg, Value::Nothing) {
        eprintln!("arg: {}", exception.core.arg.to_display_string());
    }
}
