pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{
    console::{ConsoleMap, ScriptedInteraction},
    http::HttpPinApi,
};
pub use core::{
    filter::{matches, FilterCriteria},
    presenter::{MapPresenter, ReconcileStrategy},
    session::{EventOutcome, MapEvent, MapSession},
    store::PinStore,
    submission::SubmissionFlow,
};
pub use utils::error::{PinMapError, Result};
