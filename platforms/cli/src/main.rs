use clap::Parser;
use mtm::{
    diagnose, Program, ProgramLoader, ProgramManager, Step, TuringMachine, TuringMachineError,
    MAX_EXECUTION_STEPS, TRACE_TARGET,
};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const BANNER_WIDTH: usize = 45;

/// Runs a multi-tape Turing machine description on an input word.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  mtm programs/palindrome.tm 1001
  mtm --verbose --builtin binary-increment 1011")]
struct Cli {
    /// Path to a machine description (.tm), or a built-in program name with --builtin
    program: String,

    /// The input word written onto the first tape
    #[clap(default_value = "")]
    input: String,

    /// Print the input, a trace of every step and the result
    #[clap(short, long)]
    verbose: bool,

    /// Stop after this many steps
    #[clap(long, default_value_t = MAX_EXECUTION_STEPS, conflicts_with = "unlimited")]
    max_steps: usize,

    /// Run until the machine halts
    #[clap(long)]
    unlimited: bool,

    /// Treat analysis findings as errors
    #[clap(long)]
    strict: bool,

    /// Print a JSON report instead of the plain output
    #[clap(long, conflicts_with = "verbose")]
    json: bool,

    /// Look PROGRAM up among the built-in programs
    #[clap(long)]
    builtin: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    output: String,
    steps: usize,
    state: String,
    halted: bool,
    accepted: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let program = match load_program(&cli) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.verbose {
        println!("Input: {}", cli.input);
    }

    let report = match execute(&cli, &program) {
        Ok(report) => report,
        Err(e) => {
            if cli.verbose {
                println!("{}", illegal_input(&cli.input, &e));
            } else {
                eprintln!("Error: {}", e);
            }
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else if cli.verbose {
        println!("Result: {}", report.output);
        println!("{}", banner("END"));
    } else {
        println!("{}", report.output);
    }

    ExitCode::SUCCESS
}

/// Builds a machine for the input word and runs it within the configured step limit.
fn execute(cli: &Cli, program: &Program) -> Result<Report, TuringMachineError> {
    let mut machine = TuringMachine::new(program, &cli.input)?;

    if cli.verbose {
        println!("{}", banner("RUN"));
    }

    let limit = (!cli.unlimited).then_some(cli.max_steps);
    let halted = machine.run(limit, cli.verbose) == Step::Halt;

    Ok(Report {
        output: machine.output(),
        steps: machine.step_count(),
        state: machine.state().to_string(),
        halted,
        accepted: halted && program.is_final(machine.state()),
    })
}

/// Installs a stderr layer for diagnostics filtered by `RUST_LOG` and, when `verbose` is set,
/// a plain stdout layer that only carries the execution trace.
fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Ok(directive) = format!("{TRACE_TARGET}=off").parse() {
        filter = filter.add_directive(directive);
    }

    let diagnostics = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let trace = verbose.then(|| {
        fmt::layer()
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_writer(std::io::stdout)
            .with_filter(EnvFilter::new(format!("{TRACE_TARGET}=info")))
    });

    tracing_subscriber::registry()
        .with(diagnostics)
        .with(trace)
        .init();
}

/// Loads the program named on the command line and runs the analyzer over it.
fn load_program(cli: &Cli) -> Result<Program, TuringMachineError> {
    let program = if cli.builtin {
        ProgramManager::get_program_by_name(&cli.program)?
    } else {
        ProgramLoader::load_program(Path::new(&cli.program))?
    };

    let findings = diagnose(&program);
    if cli.strict {
        if let Some(finding) = findings.into_iter().next() {
            return Err(finding.into());
        }
    } else {
        for finding in findings {
            warn!("{}", finding);
        }
    }

    Ok(program)
}

/// Renders a failed start between banners, pointing at the offending input symbol if any.
fn illegal_input(input: &str, error: &TuringMachineError) -> String {
    let details = match error {
        TuringMachineError::InvalidInputSymbol { index, symbol } => format!(
            "error: '{}' was not declared in the set of input symbols\nInput: {}\n       {}^",
            symbol,
            input,
            " ".repeat(*index)
        ),
        _ => format!("error: {}", error),
    };

    format!("{}\n{}\n{}", banner("ERR"), details, banner("END"))
}

fn banner(label: &str) -> String {
    format!("{:=^width$}", format!(" {label} "), width = BANNER_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["mtm", "machine.tm"]);

        assert_eq!(cli.program, "machine.tm");
        assert_eq!(cli.input, "");
        assert_eq!(cli.max_steps, MAX_EXECUTION_STEPS);
        assert!(!cli.unlimited && !cli.strict && !cli.json && !cli.builtin);
    }

    #[test]
    fn test_max_steps_conflicts_with_unlimited() {
        let result = Cli::try_parse_from(["mtm", "--max-steps", "5", "--unlimited", "a.tm"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_banner() {
        let line = banner("RUN");

        assert_eq!(line.chars().count(), BANNER_WIDTH);
        assert!(line.starts_with("====") && line.contains(" RUN "));
    }

    #[test]
    fn test_load_builtin() {
        let cli = Cli::parse_from(["mtm", "--builtin", "--strict", "palindrome", "1001"]);
        let program = load_program(&cli).unwrap();

        assert_eq!(program.tapes, 2);
    }

    fn run(args: &[&str]) -> Result<Report, TuringMachineError> {
        let cli = Cli::parse_from(args.iter().copied());
        let program = load_program(&cli)?;
        execute(&cli, &program)
    }

    #[test]
    fn test_accepted_run() {
        let report = run(&["mtm", "--builtin", "palindrome", "1001"]).unwrap();

        assert_eq!(report.output, "1001");
        assert_eq!(report.steps, 16);
        assert_eq!(report.state, "accept");
        assert!(report.halted);
        assert!(report.accepted);
    }

    #[test]
    fn test_rejected_run() {
        let report = run(&["mtm", "--builtin", "palindrome", "10"]).unwrap();

        assert_eq!(report.state, "reject");
        assert!(report.halted);
        assert!(!report.accepted);
    }

    #[test]
    fn test_step_limit_reached() {
        let report = run(&["mtm", "--builtin", "--max-steps", "3", "binary-increment", "1011"])
            .unwrap();

        assert_eq!(report.steps, 3);
        assert_eq!(report.state, "right");
        assert!(!report.halted);
        assert!(!report.accepted);
    }

    #[test]
    fn test_unlimited_run() {
        let report = run(&["mtm", "--builtin", "--unlimited", "binary-increment", "111"]).unwrap();

        assert_eq!(report.output, "1000");
        assert!(report.halted && report.accepted);
    }

    #[test]
    fn test_json_report() {
        let report = run(&["mtm", "--json", "--builtin", "binary-increment", "1011"]).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "output": "1100",
                "steps": 9,
                "state": "done",
                "halted": true,
                "accepted": true,
            })
        );
    }

    #[test]
    fn test_illegal_input() {
        let error = run(&["mtm", "--builtin", "palindrome", "10a1"]).unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::InvalidInputSymbol {
                index: 2,
                symbol: 'a'
            }
        );

        let lines: Vec<String> = illegal_input("10a1", &error)
            .lines()
            .map(String::from)
            .collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], banner("ERR"));
        assert_eq!(
            lines[1],
            "error: 'a' was not declared in the set of input symbols"
        );
        assert_eq!(lines[2], "Input: 10a1");
        assert_eq!(lines[3], "         ^");
        assert_eq!(lines[4], banner("END"));
    }

    #[test]
    fn test_load_unknown_builtin() {
        let cli = Cli::parse_from(["mtm", "--builtin", "nothing"]);
        assert!(load_program(&cli).is_err());
    }
}
