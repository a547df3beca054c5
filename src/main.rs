use std::env;
use std::time::Duration;
use spike_console::{
    SdResult,
    board::ports::SerialConnector,
    config::{self, Action},
    logger,
    services::Context,
    shell::{Shell, StdTerminal},
};

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> SdResult<()> {
    let args: Vec<String> = env::args().collect();
    let config = match config::parse_args(&args)? {
        Action::Run(c) => c,
        Action::Help(usage) => {
            print!("{usage}");
            return Ok(());
        }
    };
    logger::enable(config.verbose);
    logger::log("spike-console started...");

    let connector = SerialConnector::new(config.baud_rate, Duration::from_millis(config.timeout_ms));
    let mut shell = Shell::new(Context::new(Box::new(connector), Box::new(StdTerminal)));
    shell.startup(config.port.as_deref());
    // dropping the shell closes the session, error paths included
    shell.run()?;
    Ok(())
}
