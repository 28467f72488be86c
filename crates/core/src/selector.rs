//! Image inventory and next-image selection.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use serde::Serialize;

/// The ordered, deduplicated set of image identifiers for one deployment.
///
/// Order defines the default traversal order and is stable for the
/// lifetime of the server. Consumers address images by identifier, not by
/// position, so appending new images never changes the meaning of
/// already-stored records.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ImageSet {
    images: IndexSet<String>,
}

impl ImageSet {
    /// Build an image set, dropping duplicates while keeping first-seen order.
    pub fn new(images: impl IntoIterator<Item = String>) -> Self {
        Self {
            images: images.into_iter().collect(),
        }
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.images.contains(image_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Select the next image to present.
    ///
    /// Scans forward from `start_index` (clamped into range) in declared
    /// order and returns the first image not in `completed`. No wrap-around:
    /// a single forward pass to the end. `None` means the annotator has
    /// completed every image from the start point on; callers treat it as
    /// the terminal "all done" state, not an error.
    pub fn next<'a>(&'a self, completed: &BTreeSet<String>, start_index: usize) -> Option<&'a str> {
        if self.images.is_empty() {
            return None;
        }
        let start = start_index.min(self.images.len() - 1);
        self.images
            .iter()
            .skip(start)
            .map(String::as_str)
            .find(|id| !completed.contains(*id))
    }

    /// Reconcile a client-cached position with server-side truth.
    ///
    /// If the client's last-worked image is still present and not yet
    /// completed, resume exactly there. Otherwise the cached position is
    /// stale (the image was already submitted, or no longer exists) and we
    /// fall back to a scan from the front.
    pub fn resume<'a>(
        &'a self,
        completed: &BTreeSet<String>,
        last_image: Option<&str>,
    ) -> Option<&'a str> {
        if let Some(last) = last_image {
            if let Some(id) = self.images.get(last) {
                if !completed.contains(id.as_str()) {
                    return Some(id.as_str());
                }
            }
        }
        self.next(completed, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images() -> ImageSet {
        ImageSet::new(["a.png", "b.png", "c.png", "d.png"].map(String::from))
    }

    fn done(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicates_are_dropped_keeping_first_position() {
        let set = ImageSet::new(["x.png", "y.png", "x.png"].map(String::from));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), ["x.png", "y.png"]);
    }

    #[test]
    fn next_with_nothing_completed_returns_first() {
        assert_eq!(images().next(&done(&[]), 0), Some("a.png"));
    }

    #[test]
    fn next_skips_completed_images() {
        assert_eq!(images().next(&done(&["a.png", "b.png"]), 0), Some("c.png"));
    }

    #[test]
    fn next_respects_start_index() {
        assert_eq!(images().next(&done(&[]), 2), Some("c.png"));
    }

    #[test]
    fn next_does_not_wrap_around() {
        // b.png before the start index stays unvisited.
        assert_eq!(images().next(&done(&["c.png", "d.png"]), 2), None);
    }

    #[test]
    fn next_terminal_when_all_completed() {
        let all = done(&["a.png", "b.png", "c.png", "d.png"]);
        assert_eq!(images().next(&all, 0), None);
    }

    #[test]
    fn out_of_range_start_index_is_clamped() {
        assert_eq!(images().next(&done(&[]), 999), Some("d.png"));
    }

    #[test]
    fn empty_image_set_yields_none() {
        let empty = ImageSet::default();
        assert_eq!(empty.next(&done(&[]), 0), None);
        assert_eq!(empty.next(&done(&[]), 7), None);
    }

    #[test]
    fn resume_returns_hinted_image_when_still_pending() {
        assert_eq!(
            images().resume(&done(&["a.png"]), Some("c.png")),
            Some("c.png")
        );
    }

    #[test]
    fn resume_falls_back_when_hint_already_completed() {
        assert_eq!(
            images().resume(&done(&["a.png", "c.png"]), Some("c.png")),
            Some("b.png")
        );
    }

    #[test]
    fn resume_falls_back_when_hint_no_longer_exists() {
        assert_eq!(
            images().resume(&done(&["a.png"]), Some("gone.png")),
            Some("b.png")
        );
    }

    #[test]
    fn resume_without_hint_scans_from_front() {
        assert_eq!(images().resume(&done(&[]), None), Some("a.png"));
    }
}
