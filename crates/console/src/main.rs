use clap::Parser;
use odyssey_admin_console::{Cli, ConsoleConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConsoleConfig::resolve(&cli)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log.as_str()))
        .init();

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    tokio::select! {
        res = odyssey_admin_console::run(&config, stdin, &mut stdout) => res,
        _ = tokio::signal::ctrl_c() => {
            log::info!("interrupted");
            Ok(())
        }
    }
}
