use clap::{Arg, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cognos::config::Config;
use cognos::dispatch::Dispatcher;
use cognos::safety;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("cognos")
        .about("Plain-language command assistant for the shell")
        .long_about(
            "cognos runs shell commands directly and turns plain-language requests into \
             commands, asking before anything that can change your system",
        )
        .arg(Arg::new("text")
            .help("A shell command or a request in plain language")
            .num_args(1..))
        .arg(Arg::new("set-api-key")
            .long("set-api-key")
            .help("Set the Anthropic API key")
            .value_name("API_KEY")
            .num_args(1))
        .arg(Arg::new("config")
            .long("config")
            .help("Show configuration information")
            .action(clap::ArgAction::SetTrue))
        .arg(Arg::new("list-tools")
            .long("list-tools")
            .help("List the tools available to the model")
            .action(clap::ArgAction::SetTrue))
        .arg(Arg::new("explain")
            .long("explain")
            .help("Explain a command and show its safety verdict without running it")
            .value_name("COMMAND")
            .num_args(1))
        .get_matches();

    if let Some(api_key) = matches.get_one::<String>("set-api-key") {
        Config::store_api_key(api_key.clone())?;
        println!("API key saved successfully");
        return Ok(());
    }

    let config = Config::load()?;

    if matches.get_flag("config") {
        config.show_config_info()?;
        return Ok(());
    }

    let dispatcher = Dispatcher::from_config(&config)?;

    if matches.get_flag("list-tools") {
        for (name, description) in dispatcher.tools().list() {
            println!("{:<14} {}", name, description);
        }
        return Ok(());
    }

    if let Some(command) = matches.get_one::<String>("explain") {
        println!("{}", dispatcher.explain(command).await);
        println!("Safety: {:?}", safety::classify(command));
        return Ok(());
    }

    let line = matches
        .get_many::<String>("text")
        .unwrap_or_default()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    if line.trim().is_empty() {
        eprintln!("No input provided. Use 'cognos --help' for usage information.");
        return Ok(());
    }

    info!("Processing input: {}", line);
    let result = dispatcher.handle_line(&line).await?;
    std::process::exit(result.exit_code);
}
