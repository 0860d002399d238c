//! [`DetectionFrame`] – the object states decoded from one detect response.
//!
//! A frame is immutable once built.  The client shares it behind an `Arc`,
//! so a reader that cloned the `Arc` keeps a consistent snapshot even if a
//! newer frame replaces it mid-extraction.

use aidk_types::ObjectState;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct DetectionFrame {
    objects: Vec<ObjectState>,
    detected_at: DateTime<Utc>,
}

impl Default for DetectionFrame {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DetectionFrame {
    /// Build a frame stamped with the current time.
    pub fn new(objects: Vec<ObjectState>) -> Self {
        Self::at(objects, Utc::now())
    }

    pub fn at(objects: Vec<ObjectState>, detected_at: DateTime<Utc>) -> Self {
        Self {
            objects,
            detected_at,
        }
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    pub fn objects(&self) -> &[ObjectState] {
        &self.objects
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The current state for `name`.  When several states share the name the
    /// last one (the latest) wins.
    pub fn object(&self, name: &str) -> Option<&ObjectState> {
        self.objects.iter().rev().find(|o| o.obj_name == name)
    }

    /// Distinct object names, in first-seen order.
    pub fn object_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for obj in &self.objects {
            if !names.contains(&obj.obj_name.as_str()) {
                names.push(&obj.obj_name);
            }
        }
        names
    }

    /// Instance count per name, aligned with [`DetectionFrame::object_names`].
    pub fn object_counts(&self) -> Vec<usize> {
        self.object_names()
            .into_iter()
            .map(|name| self.object_count(name))
            .collect()
    }

    /// Instance count of the current state for `name`; `0` when absent.
    pub fn object_count(&self, name: &str) -> usize {
        self.object(name).map_or(0, ObjectState::instance_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidk_types::DetectionInstance;

    fn state(name: &str, n: usize, ai_index: u32) -> ObjectState {
        ObjectState {
            ai_index,
            ..ObjectState::new(name, vec![DetectionInstance::default(); n])
        }
    }

    #[test]
    fn latest_state_wins_for_repeated_name() {
        let frame = DetectionFrame::new(vec![state("box1", 1, 10), state("box1", 2, 11)]);
        assert_eq!(frame.object("box1").unwrap().ai_index, 11);
        assert_eq!(frame.object_count("box1"), 2);
    }

    #[test]
    fn names_and_counts_are_aligned() {
        let frame = DetectionFrame::new(vec![
            state("box1", 3, 1),
            state("cup", 1, 1),
            state("box1", 2, 2),
        ]);
        assert_eq!(frame.object_names(), vec!["box1", "cup"]);
        assert_eq!(frame.object_counts(), vec![2, 1]);
    }

    #[test]
    fn missing_object_counts_zero() {
        let frame = DetectionFrame::default();
        assert!(frame.is_empty());
        assert!(frame.object("ghost").is_none());
        assert_eq!(frame.object_count("ghost"), 0);
    }
}
