use crate::config::ConfigLoader;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a config file with every default filled in
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the resolved configuration
    Show,
}

pub fn run(command: ConfigCommand, loader: &ConfigLoader) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Init { force } => {
            loader.write_default(force)?;
            println!("Configuración escrita en {}", loader.path().display());
        }
        ConfigCommand::Show => {
            let config = loader.load()?;
            println!("backend        {}", config.backend);
            println!("base_url       {}", config.api.base_url);
            match config.api.timeout {
                Some(timeout) => println!("timeout        {}s", timeout.as_secs()),
                None => println!("timeout        -"),
            }
            println!("stale_time     {}s", config.stale_time.as_secs());
            println!(
                "polling        {}ms / {}ms",
                config.payment_page_interval.as_millis(),
                config.invoice_detail_interval.as_millis()
            );
            println!("finance        {}", config.finance_path.display());
        }
    }
    Ok(())
}
