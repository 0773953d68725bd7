use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::fmt::SubscriberBuilder;

use guify::config::read_config_arg;
use guify::form::{Arguments, CallbackError};
use guify::{launch, Form, FormDefinition, GuifyError};

/// Build a parameter form and print the chosen arguments as JSON on "Run".
#[derive(Parser, Debug)]
#[command(name = "guify", version, about)]
struct Cli {
    /// JSON configuration file (or inline JSON object) to preload.
    #[arg(short, long)]
    config: Option<String>,

    /// TOML form definition; a small demo form is used when omitted.
    #[arg(short, long)]
    form: Option<PathBuf>,

    /// Window title override.
    #[arg(short, long)]
    title: Option<String>,
}

fn print_arguments(args: &Arguments) -> Result<(), CallbackError> {
    println!("{}", serde_json::to_string(&args.to_json())?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), GuifyError> {
    let definition = match &cli.form {
        Some(path) => FormDefinition::load(path)?,
        None => FormDefinition::demo(),
    };
    let mut options = definition.options();
    if cli.title.is_some() {
        options.title = cli.title;
    }
    let mut form = Form::new(definition.signature()?, print_arguments).with_options(options);
    form.build()?;

    let preload = cli.config.as_deref().map(read_config_arg).transpose()?;
    launch(form, preload)
}

fn main() -> ExitCode {
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("guify: {}", e);
            ExitCode::FAILURE
        }
    }
}
