mod cli;
mod exit_codes;
mod form;
mod logging;
mod output;
mod transport;

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use reqtester_core::{Dispatcher, RequestSpec};
use tracing::debug;

use cli::{Cli, Commands, SendArgs, TargetArgs};
use exit_codes::ExitCode;
use output::Outcome;
use transport::UreqTransport;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    logging::log_init(cli.verbose);

    match run(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::RequestFailed.into()
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    debug!(scheme = %cli.target.scheme, host = %cli.target.host, anonymous_auth = %cli.target.anonymous_auth, "configured target");
    match cli.command {
        Some(Commands::Send(args)) => send(&cli.target, args),
        Some(Commands::Form) | None => form_session(&cli.target),
    }
}

fn send(target: &TargetArgs, args: SendArgs) -> Result<ExitCode> {
    let mut spec = RequestSpec::new(args.method, args.path).with_data(args.data);
    if let Some(path) = &args.file {
        spec = spec.with_file(form::load_file(path)?);
    }

    let mut dispatcher = Dispatcher::new(target.request_builder(), UreqTransport::new());
    let outcome = Outcome::from_result(dispatcher.dispatch(&spec));
    println!("{}", outcome.text);
    Ok(outcome.exit_code)
}

fn form_session(target: &TargetArgs) -> Result<ExitCode> {
    let mut dispatcher = Dispatcher::new(target.request_builder(), UreqTransport::new());
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = std::io::stdout().lock();
    form::run_form(&mut dispatcher, stdin.lock(), &mut stdout, interactive)?;
    Ok(ExitCode::Success)
}
