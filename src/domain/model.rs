use crate::utils::error::{PinMapError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};

/// A point on the map in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        crate::core::geo::distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// One profile pin, exactly as exchanged with the `/data` and `/submit` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinEntry {
    pub lat: f64,
    pub lon: f64,
    pub job: String,
    pub exp: u32,
    pub url: String,
}

impl PinEntry {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

impl Validate for PinEntry {
    fn validate(&self) -> Result<()> {
        if !self.position().is_valid() {
            return Err(PinMapError::validation(
                "location",
                format!("({}, {}) is outside the map", self.lat, self.lon),
            ));
        }
        validate_non_empty_string("job", &self.job)
    }
}

/// Position of an entry in the pin store. Stable because the store only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub usize);

/// Raw pin attributes as typed by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinInput {
    pub job: String,
    pub exp: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    #[default]
    Default,
    Highlighted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub job: String,
    pub exp: u32,
    pub url: String,
}

impl MarkerPopup {
    pub fn to_html(&self) -> String {
        format!(
            "<b>{}</b><br>{} years<br><a href=\"{}\" target=\"_blank\">Profile</a>",
            escape_html(&self.job),
            self.exp,
            escape_html(&self.url)
        )
    }
}

/// A rendered marker and the pin it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub id: MarkerId,
    pub pin: PinId,
    pub position: Coordinate,
    pub icon: MarkerIcon,
    pub label: String,
    pub popup: MarkerPopup,
}

impl MarkerView {
    pub fn for_pin(id: MarkerId, pin: PinId, entry: &PinEntry, icon: MarkerIcon) -> Self {
        Self {
            id,
            pin,
            position: entry.position(),
            icon,
            label: entry.job.clone(),
            popup: MarkerPopup {
                job: entry.job.clone(),
                exp: entry.exp,
                url: entry.url.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Coordinate::new(20.0, 0.0),
            zoom: 2,
        }
    }
}

/// Raw values of the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterControls {
    pub keyword: String,
    /// Empty means "All Job Titles".
    pub job_filter: String,
    pub min_exp: String,
    pub max_exp: String,
    pub radius_km: String,
}

/// Messages shown to the user outside of the map itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ProfileSaved,
    Error(String),
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_entry_wire_format() {
        let json = serde_json::json!({
            "lat": 10.0, "lon": 10.0, "job": "Engineer", "exp": 5, "url": "http://x"
        });
        let entry: PinEntry = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(entry.job, "Engineer");
        assert_eq!(serde_json::to_value(&entry).unwrap(), json);
    }

    #[test]
    fn test_negative_experience_is_rejected_on_the_wire() {
        let json = serde_json::json!({
            "lat": 0.0, "lon": 0.0, "job": "Cook", "exp": -2, "url": "u"
        });
        assert!(serde_json::from_value::<PinEntry>(json).is_err());
    }

    #[test]
    fn test_pin_entry_validation() {
        let pin = PinEntry {
            lat: 10.0,
            lon: 10.0,
            job: "Engineer".to_string(),
            exp: 5,
            url: String::new(),
        };
        assert!(pin.validate().is_ok());

        let out_of_range = PinEntry {
            lat: 500.0,
            lon: -999.0,
            ..pin.clone()
        };
        assert!(out_of_range.validate().is_err());

        let untitled = PinEntry {
            job: "  ".to_string(),
            ..pin
        };
        assert!(untitled.validate().is_err());
    }

    #[test]
    fn test_popup_html_is_escaped() {
        let popup = MarkerPopup {
            job: "R&D <lead>".to_string(),
            exp: 4,
            url: "http://a\"b".to_string(),
        };
        assert_eq!(
            popup.to_html(),
            "<b>R&amp;D &lt;lead&gt;</b><br>4 years<br><a href=\"http://a&quot;b\" target=\"_blank\">Profile</a>"
        );
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
