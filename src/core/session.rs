use crate::core::filter::{ExperienceMode, FilterCriteria};
use crate::core::presenter::{MapPresenter, ReconcileStrategy, ReconcileSummary};
use crate::core::store::PinStore;
use crate::core::submission::SubmissionFlow;
use crate::domain::model::{Coordinate, FilterControls, Notice, PinEntry, PinId, Viewport};
use crate::domain::ports::{Interaction, MapWidget, PinApi};
use crate::utils::error::{PinMapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const SAME_PIN_TOLERANCE_KM: f64 = 0.1;

/// What happens to the local pin list after the server accepted a new pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterSubmit {
    /// Append the submitted pin locally.
    #[default]
    Append,
    /// Fetch the whole list again.
    Reload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub strategy: ReconcileStrategy,
    pub viewport: Viewport,
    pub locate_zoom: u8,
    pub live_radius: bool,
    pub nearby_radius_km: f64,
    pub experience_mode: ExperienceMode,
    pub after_submit: AfterSubmit,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            strategy: ReconcileStrategy::default(),
            viewport: Viewport::default(),
            locate_zoom: 12,
            live_radius: false,
            nearby_radius_km: 100.0,
            experience_mode: ExperienceMode::default(),
            after_submit: AfterSubmit::default(),
        }
    }
}

/// Everything the page can ask the session to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    FiltersChanged(FilterControls),
    /// Move-end of the map.
    ViewportMoved(Viewport),
    /// "Search nearby": fixed radius around the current viewport center.
    SearchNearby,
    LocateMe,
    MapClicked(Coordinate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Reconciled(ReconcileSummary),
    Submitted { pin: PinId, summary: ReconcileSummary },
    Cancelled,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NearbySearch {
    center: Coordinate,
    radius_km: f64,
}

/// Single-threaded driver: owns the store, the presenter and the submission
/// flow, and handles one event at a time.
pub struct MapSession<A: PinApi, W: MapWidget, I: Interaction> {
    api: A,
    interaction: I,
    settings: SessionSettings,
    store: PinStore,
    presenter: MapPresenter<W>,
    flow: SubmissionFlow,
    controls: FilterControls,
    nearby: Option<NearbySearch>,
    located: Option<Coordinate>,
}

impl<A: PinApi, W: MapWidget, I: Interaction> MapSession<A, W, I> {
    pub fn new(api: A, widget: W, interaction: I, settings: SessionSettings) -> Self {
        let presenter = MapPresenter::new(widget, settings.strategy, settings.viewport);
        Self {
            api,
            interaction,
            settings,
            store: PinStore::new(),
            presenter,
            flow: SubmissionFlow::new(),
            controls: FilterControls::default(),
            nearby: None,
            located: None,
        }
    }

    pub fn store(&self) -> &PinStore {
        &self.store
    }

    pub fn presenter(&self) -> &MapPresenter<W> {
        &self.presenter
    }

    pub fn flow(&self) -> &SubmissionFlow {
        &self.flow
    }

    pub fn interaction(&self) -> &I {
        &self.interaction
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Options for the job-title selector.
    pub fn job_titles(&self) -> BTreeSet<String> {
        self.store.distinct_job_titles()
    }

    /// Criteria for the current controls, viewport and location.
    pub fn current_criteria(&self) -> FilterCriteria {
        let reference = self.located.or_else(|| {
            self.settings
                .live_radius
                .then(|| self.presenter.viewport().center)
        });
        let criteria =
            FilterCriteria::from_controls(&self.controls, self.settings.experience_mode, reference);

        match self.nearby {
            Some(nearby) => criteria.with_radius(nearby.center, nearby.radius_km),
            None => criteria,
        }
    }

    /// Fetches the initial pins and renders them. The store is untouched on failure.
    pub async fn load(&mut self) -> Result<ReconcileSummary> {
        tracing::info!("Loading pins");
        match self.api.fetch_pins().await {
            Ok(pins) => {
                tracing::info!("Loaded {} pins", pins.len());
                self.store.extend(pins);
                Ok(self.reconcile())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Handles one event to completion. Errors have already been shown to
    /// the user when they are returned.
    pub async fn handle(&mut self, event: MapEvent) -> Result<EventOutcome> {
        tracing::debug!("Handling {:?}", event);
        match event {
            MapEvent::FiltersChanged(controls) => {
                self.controls = controls;
                self.nearby = None;
                Ok(EventOutcome::Reconciled(self.reconcile()))
            }
            MapEvent::ViewportMoved(viewport) => {
                self.presenter.move_viewport(viewport);
                if self.settings.live_radius {
                    Ok(EventOutcome::Reconciled(self.reconcile()))
                } else {
                    Ok(EventOutcome::Unchanged)
                }
            }
            MapEvent::SearchNearby => {
                self.nearby = Some(NearbySearch {
                    center: self.presenter.viewport().center,
                    radius_km: self.settings.nearby_radius_km,
                });
                Ok(EventOutcome::Reconciled(self.reconcile()))
            }
            MapEvent::LocateMe => self.locate().await,
            MapEvent::MapClicked(at) => self.add_pin(at).await,
        }
    }

    async fn locate(&mut self) -> Result<EventOutcome> {
        match self.interaction.current_position().await {
            Ok(at) => {
                tracing::info!("Located user at ({:.4}, {:.4})", at.lat, at.lon);
                self.located = Some(at);
                self.presenter.focus(at, self.settings.locate_zoom);
                self.presenter.show_location(at);
                Ok(EventOutcome::Reconciled(self.reconcile()))
            }
            Err(e) => Err(self.report(e)),
        }
    }

    async fn add_pin(&mut self, at: Coordinate) -> Result<EventOutcome> {
        if let Err(e) = self.flow.begin(at) {
            return Err(self.report(e));
        }

        let Some(input) = self.interaction.prompt_pin(at).await else {
            self.flow.cancel();
            return Ok(EventOutcome::Cancelled);
        };

        if let Err(e) = self.flow.provide(input) {
            return Err(self.report(e));
        }

        let submitted = self.flow.submit(&self.api).await;
        self.flow.finish();
        let pin = match submitted {
            Ok(pin) => pin,
            Err(e) => return Err(self.report(e)),
        };

        let id = match self.settings.after_submit {
            AfterSubmit::Append => self.store.append(pin),
            AfterSubmit::Reload => match self.api.fetch_pins().await {
                Ok(pins) => {
                    self.presenter.clear();
                    self.store.replace_all(pins);
                    self.find_pin(&pin).unwrap_or_else(|| {
                        tracing::warn!("Reloaded pin list does not contain the new pin");
                        self.store.append(pin)
                    })
                }
                Err(e) => {
                    tracing::warn!("Reload after submit failed, appending locally: {}", e);
                    self.store.append(pin)
                }
            },
        };

        let summary = self.reconcile();
        self.interaction.notify(Notice::ProfileSaved);
        Ok(EventOutcome::Submitted { pin: id, summary })
    }

    /// Last stored entry that is the submitted pin, allowing for the server
    /// rounding its coordinates.
    fn find_pin(&self, pin: &PinEntry) -> Option<PinId> {
        self.store
            .iter()
            .filter(|(_, entry)| {
                entry.job == pin.job
                    && entry.exp == pin.exp
                    && entry.url == pin.url
                    && entry.position().distance_to(&pin.position()) <= SAME_PIN_TOLERANCE_KM
            })
            .map(|(id, _)| id)
            .last()
    }

    fn reconcile(&mut self) -> ReconcileSummary {
        let criteria = self.current_criteria();
        self.presenter.reconcile(&self.store, &criteria)
    }

    fn report(&mut self, error: PinMapError) -> PinMapError {
        tracing::warn!("{:?} error: {}", error.category(), error);
        self.interaction.notify(Notice::Error(error.user_message()));
        error
    }
}
