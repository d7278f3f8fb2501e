mod cli;
mod config;
mod error;
mod logging;
mod pipeline;
mod runner;
mod scaffold;
mod templates;

fn main() -> anyhow::Result<()> {
    let app = cli::parse();
    logging::init(app.verbose);
    runner::run(app)
}
