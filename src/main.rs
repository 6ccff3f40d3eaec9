mod cli;
mod input;
mod logging;
mod pipeline;
mod replay;
mod report;
mod sink;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
