pub mod filter;
pub mod geo;
pub mod presenter;
pub mod session;
pub mod store;
pub mod submission;

pub use crate::domain::model::{Coordinate, FilterControls, PinEntry, PinId, Viewport};
pub use crate::domain::ports::{Interaction, MapWidget, PinApi};
pub use crate::utils::error::Result;
