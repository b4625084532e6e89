use clap::Parser;
use pinmap::config::cli::{Command, ListArgs};
use pinmap::core::session::SessionSettings;
use pinmap::utils::error::ErrorCategory;
use pinmap::utils::{logger, validation::Validate};
use pinmap::{
    AppConfig, CliConfig, ConsoleMap, EventOutcome, HttpPinApi, MapEvent, MapSession,
    PinMapError, ScriptedInteraction,
};

type CliSession = MapSession<HttpPinApi, ConsoleMap, ScriptedInteraction>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_message());
            std::process::exit(exit_code(&e));
        }
    };

    logger::init_logger(cli.verbose, config.logging.format);
    tracing::info!("Starting pinmap against {}", config.server.base_url);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_message());
        std::process::exit(exit_code(&e));
    }

    if let Err(e) = run(&cli, &config).await {
        tracing::error!("❌ pinmap failed: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_message());
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &AppConfig) -> pinmap::Result<()> {
    let api = HttpPinApi::new(config.server.base_url.clone(), config.request_timeout())?;
    let settings = config.session_settings();

    match &cli.command {
        Command::List(args) => list(api, settings, args).await,
        Command::Titles => {
            let mut session = MapSession::new(
                api,
                ConsoleMap::new(),
                ScriptedInteraction::new(),
                settings,
            );
            session.load().await?;
            for title in session.job_titles() {
                println!("{}", title);
            }
            Ok(())
        }
        Command::Add(args) => {
            let interaction = ScriptedInteraction::new().with_input(args.input());
            let mut session = MapSession::new(api, ConsoleMap::new(), interaction, settings);
            session.load().await?;

            match session.handle(MapEvent::MapClicked(args.location())).await? {
                EventOutcome::Submitted { pin, summary } => {
                    println!(
                        "✅ Profile saved as pin #{} ({} markers on the map)",
                        pin.0, summary.rendered
                    );
                }
                other => tracing::warn!("Pin was not submitted: {:?}", other),
            }
            Ok(())
        }
    }
}

async fn list(api: HttpPinApi, settings: SessionSettings, args: &ListArgs) -> pinmap::Result<()> {
    let default_radius = settings.nearby_radius_km;
    let mut interaction = ScriptedInteraction::new();
    if let Some(near) = args.near {
        interaction = interaction.with_position(near);
    }

    let mut session: CliSession = MapSession::new(api, ConsoleMap::new(), interaction, settings);
    session.load().await?;
    session
        .handle(MapEvent::FiltersChanged(args.controls(default_radius)))
        .await?;
    if args.near.is_some() {
        session.handle(MapEvent::LocateMe).await?;
    }
    if args.nearby {
        session.handle(MapEvent::SearchNearby).await?;
    }

    let map = session.presenter().widget();
    for line in map.render_lines() {
        println!("{}", line);
    }
    tracing::info!(
        "{} of {} pins on the map",
        map.len(),
        session.store().len()
    );
    Ok(())
}

fn exit_code(error: &PinMapError) -> i32 {
    match error.category() {
        ErrorCategory::Validation => 2,
        ErrorCategory::Network => 3,
        ErrorCategory::Geolocation => 4,
        ErrorCategory::Configuration => 1,
    }
}
