use clap::Parser;
use menu_panel::cli::commands::{cmd_inspect, cmd_render, cmd_run};
use menu_panel::cli::config::{Cli, Commands, load_config, log_filter};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            scenario,
            format,
            output,
        } => {
            // CLI > config > default
            let format = format.unwrap_or_else(|| config.run.format.clone());
            let output = output.or_else(|| config.run.output.clone());
            let all_passed = cmd_run(&scenario, &format, output.as_deref(), &config)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Inspect { page } => {
            print!("{}", cmd_inspect(&page, &config)?);
        }
        Commands::Render {
            page,
            formset,
            add,
            remove,
        } => {
            println!("{}", cmd_render(&page, &formset, add, &remove, &config)?);
        }
    }

    Ok(())
}
