use crate::domain::model::{Coordinate, MarkerIcon, MarkerId, MarkerView, Notice, PinInput};
use crate::domain::ports::{Interaction, MapWidget};
use crate::utils::error::{PinMapError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};

/// Headless map widget: keeps markers in memory and logs every change.
#[derive(Debug, Default)]
pub struct ConsoleMap {
    markers: BTreeMap<MarkerId, MarkerView>,
    view: Option<(Coordinate, u8)>,
    located: Option<Coordinate>,
}

impl ConsoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerView> {
        self.markers.values()
    }

    pub fn view(&self) -> Option<(Coordinate, u8)> {
        self.view
    }

    pub fn located(&self) -> Option<Coordinate> {
        self.located
    }

    /// One line per marker, highlighted markers flagged with `*`.
    pub fn render_lines(&self) -> Vec<String> {
        self.markers
            .values()
            .map(|m| {
                let flag = match m.icon {
                    MarkerIcon::Highlighted => '*',
                    MarkerIcon::Default => ' ',
                };
                format!(
                    "{} {:>9.4} {:>10.4}  {} ({} years)  {}",
                    flag, m.position.lat, m.position.lon, m.label, m.popup.exp, m.popup.url
                )
            })
            .collect()
    }
}

impl MapWidget for ConsoleMap {
    fn add_marker(&mut self, marker: &MarkerView) {
        tracing::trace!("add marker {:?} for {}", marker.id, marker.label);
        self.markers.insert(marker.id, marker.clone());
    }

    fn remove_marker(&mut self, id: MarkerId) {
        tracing::trace!("remove marker {:?}", id);
        self.markers.remove(&id);
    }

    fn set_marker_icon(&mut self, id: MarkerId, icon: MarkerIcon) {
        tracing::trace!("set marker {:?} icon {:?}", id, icon);
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.icon = icon;
        }
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        tracing::debug!("view ({}, {}) zoom {}", center.lat, center.lon, zoom);
        self.view = Some((center, zoom));
    }

    fn show_location(&mut self, at: Coordinate) {
        self.located = Some(at);
    }
}

/// `Interaction` that replays queued answers and records notices.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    inputs: VecDeque<PinInput>,
    position: Option<Coordinate>,
    notices: Vec<Notice>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: PinInput) -> Self {
        self.inputs.push_back(input);
        self
    }

    pub fn with_position(mut self, position: Coordinate) -> Self {
        self.position = Some(position);
        self
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn prompt_pin(&mut self, _at: Coordinate) -> Option<PinInput> {
        self.inputs.pop_front()
    }

    async fn current_position(&mut self) -> Result<Coordinate> {
        self.position.ok_or_else(|| PinMapError::GeolocationError {
            message: "no position available".to_string(),
        })
    }

    fn notify(&mut self, notice: Notice) {
        match &notice {
            Notice::ProfileSaved => tracing::info!("Profile saved!"),
            Notice::Error(message) => tracing::warn!("{}", message),
        }
        self.notices.push(notice);
    }
}
