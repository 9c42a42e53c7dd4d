use bintur::{
    analyze, Halt, Machine, MachineError, Program, ProgramLoader, ProgramManager, Step,
};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  bintur-cli programs/binary-increment.json -d
  bintur-cli --builtin \"Unary increment\" --tape numbers.json --json")]
struct Cli {
    /// The program file (JSON) to execute
    program: Option<String>,

    /// Run a built-in program by name instead of a file
    #[clap(short, long, conflicts_with = "program")]
    builtin: Option<String>,

    /// Initial tape file (JSON), replacing the program's own tape
    #[clap(short, long)]
    tape: Option<String>,

    /// Number of tape cells
    #[clap(long)]
    capacity: Option<usize>,

    /// Maximum number of executed instructions
    #[clap(long)]
    max_steps: Option<usize>,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print all rules grouped by state before running
    #[clap(short, long)]
    rules: bool,

    /// Analyze the program before running and stop on problems
    #[clap(short, long)]
    check: bool,

    /// Print the final machine state as JSON
    #[clap(long)]
    json: bool,

    /// List the built-in programs and exit
    #[clap(short, long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list {
        for name in ProgramManager::list_program_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, MachineError> {
    let mut program = load_program(cli)?;

    if let Some(path) = &cli.tape {
        program.tape = ProgramLoader::load_tape(Path::new(path))?;
    }
    if let Some(capacity) = cli.capacity {
        program.config = program.config.with_tape_capacity(capacity);
    }
    if let Some(max_steps) = cli.max_steps {
        program.config = program.config.with_max_steps(max_steps);
    }

    let mut machine = Machine::from_program(&program)?;

    if cli.check {
        if let Err(e) = analyze(machine.table(), machine.config()) {
            eprintln!("Analysis failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    }

    if cli.rules {
        println!("{}\n", machine.table().render_listing());
    }

    let outcome = if cli.debug {
        println!("Program: {}", program.name);
        for state in &program.states {
            println!("  {}", state);
        }
        println!();

        if let Err(e) = machine.fetch() {
            Step::Halt(Halt::Err(e))
        } else {
            print_frame(&machine);
            loop {
                let (step, advanced) = advance(&mut machine);
                if advanced {
                    print_frame(&machine);
                }
                if step != Step::Continue {
                    break step;
                }
            }
        }
    } else {
        machine.run()
    };

    let code = match &outcome {
        Step::Halt(Halt::Ok) => ExitCode::SUCCESS,
        Step::Continue => {
            eprintln!("Step limit of {} reached.", machine.config().max_steps);
            ExitCode::FAILURE
        }
        Step::Halt(Halt::Err(e)) => {
            eprintln!("Machine error: {}", e);
            ExitCode::FAILURE
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&machine.snapshot())?);
    } else {
        println!("{}", machine.tape());
    }

    Ok(code)
}

fn load_program(cli: &Cli) -> Result<Program, MachineError> {
    match (&cli.program, &cli.builtin) {
        (Some(path), _) => ProgramLoader::load_program(Path::new(path)),
        (None, Some(name)) => ProgramManager::get_program_by_name(name),
        (None, None) => ProgramManager::get_program_by_index(0),
    }
}

/// Steps the machine, reporting whether an instruction was actually executed.
///
/// A step rejected before execution (halted, head at the tape edge) leaves the
/// frame unchanged.
fn advance(machine: &mut Machine) -> (Step, bool) {
    let before = machine.step_count();
    let step = machine.step();
    (step, machine.step_count() != before)
}

/// Prints the tape with a marker under the head, then the state and fetched instruction.
fn print_frame(machine: &Machine) {
    let tape: String = machine.cells().map(|cell| cell.symbol.as_char()).collect();
    let marker: String = machine
        .cells()
        .map(|cell| if cell.active { '^' } else { ' ' })
        .collect();

    let status = if machine.is_halted() {
        "HALT".to_string()
    } else {
        format!("step {}", machine.step_count())
    };

    println!("{}", tape);
    println!("{}", marker.trim_end());
    println!(
        "state: {}  {}  [{}]\n",
        machine.state(),
        machine.describe_current_instruction().unwrap_or_default(),
        status
    );
}
