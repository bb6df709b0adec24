use std::{fmt, process::ExitCode, sync::Arc};

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Password, Select, Text};
use skyglass_core::{
    Config, DeviceConfig, DeviceLocator, FileStore, LocationMemory, ProviderId, ViewState,
    WeatherApp,
    provider::{default_provider_from_config, provider_from_config},
};
use tracing::info;

use crate::terminal::TerminalPresenter;

type App = WeatherApp<TerminalPresenter<std::io::Stdout>, Local>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglass", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// Use simulated weather data instead of the live provider.
    #[arg(long, global = true)]
    pub demo: bool,

    /// Without a subcommand an interactive session starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the provider, API key and device position.
    Configure,

    /// Show weather for a city.
    Search {
        /// City name; prompts (pre-filled with the last location) when absent.
        city: Option<String>,
    },

    /// Show weather for the configured device position.
    Locate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    Locate,
    Quit,
}

impl Action {
    const fn all() -> [Action; 3] {
        [Action::Search, Action::Locate, Action::Quit]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Search => "Search city",
            Action::Locate => "Use my location",
            Action::Quit => "Quit",
        })
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Some(Command::Configure) => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Some(Command::Search { city }) => {
                let mut app = build_app(self.demo)?;
                let input = match city {
                    Some(city) => city,
                    None => {
                        let prefill = app.startup().unwrap_or_default();
                        match prompt_city(&prefill)? {
                            Some(input) => input,
                            None => return Ok(ExitCode::SUCCESS),
                        }
                    }
                };
                Ok(exit_code(app.search(&input).await))
            }
            Some(Command::Locate) => {
                let mut app = build_app(self.demo)?;
                Ok(exit_code(app.locate().await))
            }
            None => {
                interactive(self.demo).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn exit_code(state: &ViewState) -> ExitCode {
    match state {
        ViewState::Error(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn build_app(demo: bool) -> anyhow::Result<App> {
    let config = Config::load()?;

    let provider = if demo {
        provider_from_config(ProviderId::Simulated, &config)?
    } else {
        default_provider_from_config(&config)?
    };

    if demo || config.provider_id()? == ProviderId::Simulated {
        eprintln!(
            "Running in demo mode. To use real weather data, get an OpenWeatherMap API key \
             and run `skyglass configure`."
        );
    }

    let store = FileStore::open_default()?;
    info!(path = %store.path().display(), "using location storage");

    Ok(WeatherApp::new(
        provider,
        DeviceLocator::new(config.geolocator()),
        LocationMemory::new(Arc::new(store)),
        TerminalPresenter::stdout(),
        Local,
    ))
}

/// Welcome screen, then a search/locate loop until the user quits.
async fn interactive(demo: bool) -> anyhow::Result<()> {
    let mut app = build_app(demo)?;
    let mut input = app.startup().unwrap_or_default();

    loop {
        let menu = Select::new("What would you like to do?", Action::all().to_vec());
        let action = match menu.prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match action {
            Action::Search => {
                if let Some(typed) = prompt_city(&input)? {
                    app.search(&typed).await;
                    input = typed;
                }
            }
            Action::Locate => {
                app.locate().await;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

/// City prompt pre-filled with `initial`; `None` when the user backs out.
fn prompt_city(initial: &str) -> anyhow::Result<Option<String>> {
    match Text::new("City:")
        .with_initial_value(initial)
        .with_help_message("Press Enter to search")
        .prompt()
    {
        Ok(city) => Ok(Some(city)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let provider = Select::new("Weather provider:", ProviderId::all().to_vec())
        .with_starting_cursor(if config.provider_id()? == ProviderId::Live { 0 } else { 1 })
        .prompt()?;
    config.set_provider(provider);

    if provider == ProviderId::Live {
        let api_key = Password::new("OpenWeatherMap API key:")
            .without_confirmation()
            .with_help_message("Leave empty to keep the current key")
            .prompt()?;
        let api_key = api_key.trim();
        if !api_key.is_empty() {
            config.set_api_key(api_key.to_string());
        } else if config.api_key.is_none() {
            bail!(
                "The live provider needs an API key.\n\
                 Hint: get one at https://openweathermap.org/api"
            );
        }
    }

    let set_device = Confirm::new("Set a device position for `skyglass locate`?")
        .with_default(config.device.is_some())
        .prompt()?;
    config.device = if set_device {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number")
            .prompt()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            bail!("Coordinates out of range: {latitude}, {longitude}");
        }
        Some(DeviceConfig { latitude, longitude })
    } else {
        None
    };

    config.save()?;
    let path = Config::config_file_path().context("Failed to locate saved config")?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
