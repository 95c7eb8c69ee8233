//! Selection broadcasting to the host.

use crate::segment::Segment;

/// Host callback receiving every segment in index order.
pub type SelectionCallback = Box<dyn FnMut(&[Segment])>;

/// Notifies the host when the set of selected segments changes.
///
/// Publishing the same ordered sequence of selected ids twice in a row
/// notifies only once. The comparison starts from an empty selection, so an
/// initial publish with nothing selected is silent.
#[derive(Default)]
pub struct SelectionBroadcaster {
    callback: Option<SelectionCallback>,
    last_selected: Vec<String>,
    notifications: u64,
}

impl SelectionBroadcaster {
    /// Create a broadcaster with no subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the host callback, replacing any previous one.
    pub fn subscribe(&mut self, callback: SelectionCallback) {
        self.callback = Some(callback);
    }

    /// Drop the host callback.
    pub fn unsubscribe(&mut self) {
        self.callback = None;
    }

    /// Whether a callback is registered.
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.callback.is_some()
    }

    /// Publish a fresh snapshot of all segments.
    ///
    /// Returns `true` when the selected-id sequence changed and the host was
    /// notified (or would have been, had a callback been registered).
    pub fn publish(&mut self, segments: &[Segment]) -> bool {
        let selected: Vec<String> = segments
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.id.clone())
            .collect();

        if selected == self.last_selected {
            return false;
        }

        self.last_selected = selected;
        self.notifications += 1;
        tracing::debug!(
            "Selection changed: [{}]",
            self.last_selected.join(", ")
        );

        if let Some(callback) = self.callback.as_mut() {
            callback(segments);
        }
        true
    }

    /// Ids of the selected segments in the last notification.
    #[must_use]
    pub fn last_selected(&self) -> &[String] {
        &self.last_selected
    }

    /// How many notifications have been emitted.
    #[must_use]
    pub fn notifications(&self) -> u64 {
        self.notifications
    }
}

impl std::fmt::Debug for SelectionBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionBroadcaster")
            .field("subscribed", &self.callback.is_some())
            .field("last_selected", &self.last_selected)
            .field("notifications", &self.notifications)
            .finish()
    }
}
