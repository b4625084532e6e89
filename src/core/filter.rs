use crate::domain::model::{Coordinate, FilterControls, PinEntry};
use serde::{Deserialize, Serialize};

/// Which experience controls the page offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceMode {
    /// Minimum and maximum fields.
    #[default]
    Range,
    /// A single "N+" slider; any maximum is ignored.
    Minimum,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExperienceBounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl ExperienceBounds {
    pub fn contains(&self, exp: u32) -> bool {
        let exp = i64::from(exp);
        self.min.is_none_or(|min| exp >= min) && self.max.is_none_or(|max| exp <= max)
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusFilter {
    pub center: Coordinate,
    pub radius_km: f64,
}

impl RadiusFilter {
    pub fn contains(&self, entry: &PinEntry) -> bool {
        self.center.distance_to(&entry.position()) <= self.radius_km
    }
}

/// The active predicates for one reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub keyword: String,
    pub job_filter: Option<String>,
    pub experience: ExperienceBounds,
    pub radius: Option<RadiusFilter>,
}

impl FilterCriteria {
    /// Builds criteria from raw control values.
    ///
    /// Unparseable numeric fields become absent criteria instead of
    /// comparisons that fail for every pin. `reference` is the point the
    /// live radius is measured from; without it the radius field is ignored.
    pub fn from_controls(
        controls: &FilterControls,
        mode: ExperienceMode,
        reference: Option<Coordinate>,
    ) -> Self {
        let job_filter = Some(controls.job_filter.as_str())
            .filter(|job| !job.is_empty())
            .map(str::to_string);

        let min = parse_bound("min_exp", &controls.min_exp);
        let max = match mode {
            ExperienceMode::Range => parse_bound("max_exp", &controls.max_exp),
            ExperienceMode::Minimum => None,
        };

        let radius = reference.and_then(|center| {
            parse_radius(&controls.radius_km).map(|radius_km| RadiusFilter { center, radius_km })
        });

        Self {
            keyword: controls.keyword.clone(),
            job_filter,
            experience: ExperienceBounds { min, max },
            radius,
        }
    }

    pub fn with_radius(mut self, center: Coordinate, radius_km: f64) -> Self {
        self.radius = Some(RadiusFilter { center, radius_km });
        self
    }

    pub fn is_active(&self) -> bool {
        !self.keyword.is_empty()
            || self.job_filter.is_some()
            || self.experience.is_active()
            || self.radius.is_some()
    }
}

/// True when `entry` satisfies every active criterion.
pub fn matches(entry: &PinEntry, criteria: &FilterCriteria) -> bool {
    let keyword_ok = criteria.keyword.is_empty()
        || entry
            .job
            .to_lowercase()
            .contains(&criteria.keyword.to_lowercase());

    let job_ok = criteria
        .job_filter
        .as_deref()
        .is_none_or(|job| job.is_empty() || entry.job == job);

    let radius_ok = criteria
        .radius
        .as_ref()
        .is_none_or(|radius| radius.contains(entry));

    keyword_ok && job_ok && criteria.experience.contains(entry.exp) && radius_ok
}

fn parse_bound(field: &str, raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value.trunc() as i64),
        _ => {
            tracing::debug!("Ignoring malformed {} filter value '{}'", field, raw);
            None
        }
    }
}

fn parse_radius(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            tracing::debug!("Ignoring malformed radius filter value '{}'", raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engineer() -> PinEntry {
        PinEntry {
            lat: 10.0,
            lon: 10.0,
            job: "Engineer".to_string(),
            exp: 5,
            url: "http://x".to_string(),
        }
    }

    fn at_origin() -> PinEntry {
        PinEntry {
            lat: 0.0,
            lon: 0.0,
            ..engineer()
        }
    }

    fn controls(keyword: &str, min: &str, max: &str) -> FilterControls {
        FilterControls {
            keyword: keyword.to_string(),
            min_exp: min.to_string(),
            max_exp: max.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_keyword_and_experience_match() {
        let criteria = FilterCriteria::from_controls(
            &controls("eng", "0", "10"),
            ExperienceMode::Range,
            None,
        );
        assert!(matches(&engineer(), &criteria));
    }

    #[test]
    fn test_keyword_mismatch() {
        let criteria = FilterCriteria::from_controls(
            &controls("doctor", "", ""),
            ExperienceMode::Range,
            None,
        );
        assert!(!matches(&engineer(), &criteria));
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let criteria = FilterCriteria {
            keyword: "ENGIN".to_string(),
            ..Default::default()
        };
        assert!(matches(&engineer(), &criteria));
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let criteria = FilterCriteria::default();
        assert!(!criteria.is_active());
        assert!(matches(&engineer(), &criteria));
    }

    #[test]
    fn test_job_filter_requires_exact_title() {
        let mut criteria = FilterCriteria::from_controls(
            &FilterControls {
                job_filter: "Engineer".to_string(),
                ..Default::default()
            },
            ExperienceMode::Range,
            None,
        );
        assert!(matches(&engineer(), &criteria));

        criteria.job_filter = Some("engineer".to_string());
        assert!(!matches(&engineer(), &criteria));
    }

    #[test]
    fn test_experience_bounds_are_inclusive() {
        let bounds = ExperienceBounds {
            min: Some(5),
            max: Some(5),
        };
        assert!(bounds.contains(5));
        assert!(!bounds.contains(4));
        assert!(!bounds.contains(6));
    }

    #[test]
    fn test_minimum_mode_ignores_maximum() {
        let criteria = FilterCriteria::from_controls(
            &controls("", "3", "4"),
            ExperienceMode::Minimum,
            None,
        );
        assert_eq!(criteria.experience.max, None);
        assert!(matches(&engineer(), &criteria));
    }

    #[test]
    fn test_malformed_bounds_are_absent() {
        let criteria = FilterCriteria::from_controls(
            &controls("", "abc", "NaN"),
            ExperienceMode::Range,
            None,
        );
        assert_eq!(criteria.experience, ExperienceBounds::default());
        assert!(!criteria.is_active());
        assert!(matches(&engineer(), &criteria));
    }

    #[test]
    fn test_fractional_bound_truncates() {
        let criteria = FilterCriteria::from_controls(
            &controls("", "4.9", ""),
            ExperienceMode::Range,
            None,
        );
        assert_eq!(criteria.experience.min, Some(4));
    }

    #[test]
    fn test_radius_scenarios() {
        let near = FilterCriteria::default().with_radius(Coordinate::new(0.0, 0.0), 1.0);
        assert!(matches(&at_origin(), &near));

        let far = FilterCriteria::default().with_radius(Coordinate::new(10.0, 10.0), 100.0);
        assert!(!matches(&at_origin(), &far));
    }

    #[test]
    fn test_live_radius_needs_reference_point() {
        let raw = FilterControls {
            radius_km: "50".to_string(),
            ..Default::default()
        };
        assert!(FilterCriteria::from_controls(&raw, ExperienceMode::Range, None)
            .radius
            .is_none());

        let criteria = FilterCriteria::from_controls(
            &raw,
            ExperienceMode::Range,
            Some(Coordinate::new(0.0, 0.0)),
        );
        assert_eq!(criteria.radius.map(|r| r.radius_km), Some(50.0));
    }

    #[test]
    fn test_negative_radius_is_absent() {
        let raw = FilterControls {
            radius_km: "-5".to_string(),
            ..Default::default()
        };
        let criteria = FilterCriteria::from_controls(
            &raw,
            ExperienceMode::Range,
            Some(Coordinate::new(0.0, 0.0)),
        );
        assert!(criteria.radius.is_none());
    }

    #[test]
    fn test_narrowing_never_adds_matches() {
        let pins: Vec<PinEntry> = (0..12)
            .map(|i| PinEntry {
                lat: f64::from(i) * 3.0,
                lon: f64::from(i) * -2.0,
                job: if i % 2 == 0 { "Engineer" } else { "Data Engineer" }.to_string(),
                exp: i,
                url: String::new(),
            })
            .collect();
        let center = Coordinate::new(0.0, 0.0);

        let pairs = [
            (
                FilterCriteria::default().with_radius(center, 2000.0),
                FilterCriteria::default().with_radius(center, 500.0),
            ),
            (
                FilterCriteria {
                    experience: ExperienceBounds {
                        min: Some(2),
                        max: Some(10),
                    },
                    ..Default::default()
                },
                FilterCriteria {
                    experience: ExperienceBounds {
                        min: Some(4),
                        max: Some(8),
                    },
                    ..Default::default()
                },
            ),
            (
                FilterCriteria {
                    keyword: "eng".to_string(),
                    ..Default::default()
                },
                FilterCriteria {
                    keyword: "data eng".to_string(),
                    ..Default::default()
                },
            ),
        ];

        for (wide, narrow) in &pairs {
            for pin in &pins {
                if !matches(pin, wide) {
                    assert!(!matches(pin, narrow), "{pin:?} matched {narrow:?}");
                }
            }
        }
    }
}
