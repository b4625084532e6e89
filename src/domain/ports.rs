use crate::domain::model::{Coordinate, MarkerIcon, MarkerId, MarkerView, Notice, PinEntry, PinInput};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The read and write endpoints of the pin server.
#[async_trait]
pub trait PinApi: Send + Sync {
    async fn fetch_pins(&self) -> Result<Vec<PinEntry>>;
    async fn submit_pin(&self, pin: &PinEntry) -> Result<()>;
}

/// The map widget that actually draws markers.
pub trait MapWidget: Send {
    fn add_marker(&mut self, marker: &MarkerView);
    fn remove_marker(&mut self, id: MarkerId);
    fn set_marker_icon(&mut self, id: MarkerId, icon: MarkerIcon);
    fn set_view(&mut self, center: Coordinate, zoom: u8);
    /// Marks the user's located position, replacing any earlier mark.
    fn show_location(&mut self, at: Coordinate);
}

/// Everything the session needs from the person in front of the map.
#[async_trait]
pub trait Interaction: Send {
    /// Collects pin attributes for a clicked coordinate. `None` when dismissed.
    async fn prompt_pin(&mut self, at: Coordinate) -> Option<PinInput>;
    async fn current_position(&mut self) -> Result<Coordinate>;
    fn notify(&mut self, notice: Notice);
}
