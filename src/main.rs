use log::{error, info};

mod bench;
mod cli;
mod engine;
mod referee;
mod report;
mod runner;
mod tc;
mod uttt;

fn main() -> std::io::Result<()> {
    let _logger = flexi_logger::Logger::try_with_env()
        .ok()
        .and_then(|logger| logger.start().ok());

    let Some(cli_options) = cli::parse() else {
        return Ok(());
    };
    info!("{:#?}", &cli_options);

    let r = runner::Runner::new(cli_options);
    r.run().inspect_err(|e| error!("match aborted: {e}"))
}
