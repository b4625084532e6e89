use crate::config::toml_config::AppConfig;
use crate::core::presenter::ReconcileStrategy;
use crate::domain::model::{Coordinate, FilterControls, PinInput};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pinmap")]
#[command(about = "Browse and add job-profile pins from the command line")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override server.base_url
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override map.strategy
    #[arg(long, value_parser = ["recolor", "rebuild"])]
    pub strategy: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load the pins and print the markers that the filters leave on the map
    List(ListArgs),
    /// Print the distinct job titles
    Titles,
    /// Drop a new pin at a coordinate
    Add(AddArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[arg(long, default_value = "")]
    pub keyword: String,

    /// Exact job title
    #[arg(long, default_value = "")]
    pub job: String,

    #[arg(long, default_value = "")]
    pub min_exp: String,

    #[arg(long, default_value = "")]
    pub max_exp: String,

    /// Reference point as LAT,LON
    #[arg(long, value_parser = parse_coordinate)]
    pub near: Option<Coordinate>,

    /// Radius in km around --near (defaults to filter.nearby_radius_km)
    #[arg(long, requires = "near")]
    pub radius: Option<String>,

    /// Fixed-radius search around the configured map center
    #[arg(long)]
    pub nearby: bool,
}

impl ListArgs {
    pub fn controls(&self, default_radius_km: f64) -> FilterControls {
        let radius_km = match (&self.near, &self.radius) {
            (_, Some(radius)) => radius.clone(),
            (Some(_), None) => default_radius_km.to_string(),
            (None, None) => String::new(),
        };
        FilterControls {
            keyword: self.keyword.clone(),
            job_filter: self.job.clone(),
            min_exp: self.min_exp.clone(),
            max_exp: self.max_exp.clone(),
            radius_km,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    #[arg(long)]
    pub job: String,

    /// Years of experience
    #[arg(long)]
    pub exp: String,

    #[arg(long)]
    pub url: String,
}

impl AddArgs {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    pub fn input(&self) -> PinInput {
        PinInput {
            job: self.job.clone(),
            exp: self.exp.clone(),
            url: self.url.clone(),
        }
    }
}

impl CliConfig {
    /// Loads the configuration file (or defaults) and applies flag overrides.
    pub fn resolve(&self) -> crate::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        match self.strategy.as_deref() {
            Some("rebuild") => config.map.strategy = ReconcileStrategy::Rebuild,
            Some("recolor") => config.map.strategy = ReconcileStrategy::Recolor,
            _ => {}
        }

        Ok(config)
    }
}

fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{}'", raw))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;

    let coordinate = Coordinate::new(lat, lon);
    if !coordinate.is_valid() {
        return Err(format!("({}, {}) is outside the map", lat, lon));
    }
    Ok(coordinate)
}
