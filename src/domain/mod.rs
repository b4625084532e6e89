// Domain layer: pin models and the ports to the server, the map widget and the user.

pub mod model;
pub mod ports;
