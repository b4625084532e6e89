use crate::core::filter::{matches, FilterCriteria};
use crate::core::store::PinStore;
use crate::domain::model::{Coordinate, MarkerIcon, MarkerId, MarkerView, PinId, Viewport};
use crate::domain::ports::MapWidget;
use serde::{Deserialize, Serialize};

/// How filtered-out pins are presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStrategy {
    /// Every pin keeps a marker; matches are highlighted.
    #[default]
    Recolor,
    /// Only matching pins get a marker.
    Rebuild,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub rendered: usize,
    pub highlighted: usize,
    pub created: usize,
    pub removed: usize,
}

/// Owns the viewport and the rendered markers, and keeps the widget in sync.
pub struct MapPresenter<W: MapWidget> {
    widget: W,
    strategy: ReconcileStrategy,
    viewport: Viewport,
    markers: Vec<MarkerView>,
    next_marker_id: u64,
    reconcile_count: u64,
}

impl<W: MapWidget> MapPresenter<W> {
    pub fn new(mut widget: W, strategy: ReconcileStrategy, viewport: Viewport) -> Self {
        widget.set_view(viewport.center, viewport.zoom);
        Self {
            widget,
            strategy,
            viewport,
            markers: Vec::new(),
            next_marker_id: 0,
            reconcile_count: 0,
        }
    }

    pub fn strategy(&self) -> ReconcileStrategy {
        self.strategy
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Records a viewport change made by the user on the widget.
    pub fn move_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Moves the widget to `center` and records the new viewport.
    pub fn focus(&mut self, center: Coordinate, zoom: u8) {
        self.viewport = Viewport { center, zoom };
        self.widget.set_view(center, zoom);
    }

    pub fn show_location(&mut self, at: Coordinate) {
        self.widget.show_location(at);
    }

    pub fn markers(&self) -> &[MarkerView] {
        &self.markers
    }

    /// Snapshot of what is on the map, in store order.
    pub fn rendered(&self) -> Vec<(PinId, MarkerIcon)> {
        let mut rendered: Vec<_> = self.markers.iter().map(|m| (m.pin, m.icon)).collect();
        rendered.sort_by_key(|(pin, _)| *pin);
        rendered
    }

    pub fn reconcile_count(&self) -> u64 {
        self.reconcile_count
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Drops every marker. Used when the store was replaced wholesale and
    /// marker back-references may point at different pins.
    pub fn clear(&mut self) -> usize {
        let removed = self.markers.len();
        for marker in self.markers.drain(..) {
            self.widget.remove_marker(marker.id);
        }
        removed
    }

    pub fn reconcile(&mut self, store: &PinStore, criteria: &FilterCriteria) -> ReconcileSummary {
        self.reconcile_count += 1;
        let summary = match self.strategy {
            ReconcileStrategy::Recolor => self.recolor(store, criteria),
            ReconcileStrategy::Rebuild => self.rebuild(store, criteria),
        };

        tracing::debug!(
            "Reconciled {} pins ({:?}): {} rendered, {} highlighted, {} created, {} removed",
            store.len(),
            self.strategy,
            summary.rendered,
            summary.highlighted,
            summary.created,
            summary.removed
        );
        summary
    }

    fn recolor(&mut self, store: &PinStore, criteria: &FilterCriteria) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        let highlight_enabled = criteria.is_active();

        // Markers are created in store order and never removed, so the tail
        // of the store is exactly the pins without a marker.
        let known = self.markers.len();
        for (pin, entry) in store.iter().skip(known) {
            let marker = MarkerView::for_pin(self.allocate_id(), pin, entry, MarkerIcon::Default);
            self.widget.add_marker(&marker);
            self.markers.push(marker);
            summary.created += 1;
        }

        for marker in &mut self.markers {
            let Some(entry) = store.get(marker.pin) else {
                continue;
            };
            let icon = if highlight_enabled && matches(entry, criteria) {
                MarkerIcon::Highlighted
            } else {
                MarkerIcon::Default
            };
            if icon == MarkerIcon::Highlighted {
                summary.highlighted += 1;
            }
            if marker.icon != icon {
                marker.icon = icon;
                self.widget.set_marker_icon(marker.id, icon);
            }
        }

        summary.rendered = self.markers.len();
        summary
    }

    fn rebuild(&mut self, store: &PinStore, criteria: &FilterCriteria) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for marker in self.markers.drain(..) {
            self.widget.remove_marker(marker.id);
            summary.removed += 1;
        }

        for (pin, entry) in store.iter() {
            if !matches(entry, criteria) {
                continue;
            }
            let marker = MarkerView::for_pin(self.allocate_id(), pin, entry, MarkerIcon::Default);
            self.widget.add_marker(&marker);
            self.markers.push(marker);
            summary.created += 1;
        }

        summary.rendered = self.markers.len();
        summary
    }

    fn allocate_id(&mut self) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        id
    }
}
