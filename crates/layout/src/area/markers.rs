//! Markers registered on a page, for retrieval from static content.

use folio_idf::{Marker, RetrievePosition};
use folio_types::OwnerHandle;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct MarkerEntry {
    owner: OwnerHandle,
    class_name: String,
    text: String,
    /// The owner's first area is on this page.
    starts_here: bool,
    /// The owner's last area is on this page.
    ends_here: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerTable {
    entries: Vec<MarkerEntry>,
    /// Last marker text of each class on the pages before this one.
    carryover: HashMap<String, String>,
}

impl MarkerTable {
    pub fn with_carryover(carryover: HashMap<String, String>) -> Self {
        Self {
            entries: Vec::new(),
            carryover,
        }
    }

    /// Registers the markers of `owner` once per page.
    pub fn add(&mut self, owner: OwnerHandle, markers: &[Marker], starts_here: bool) {
        if markers.is_empty() || self.entries.iter().any(|e| e.owner == owner) {
            return;
        }
        self.entries.extend(markers.iter().map(|m| MarkerEntry {
            owner,
            class_name: m.class_name.clone(),
            text: m.text.clone(),
            starts_here,
            ends_here: false,
        }));
    }

    pub fn finish(&mut self, owner: OwnerHandle) {
        for entry in self.entries.iter_mut().filter(|e| e.owner == owner) {
            entry.ends_here = true;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn retrieve(&self, class_name: &str, position: RetrievePosition) -> Option<&str> {
        let mut of_class = self.entries.iter().filter(|e| e.class_name == class_name);
        let carried = || self.carryover.get(class_name).map(String::as_str);
        let first_including_carryover = || {
            self.entries
                .iter()
                .find(|e| e.class_name == class_name)
                .map(|e| e.text.as_str())
                .or_else(carried)
        };
        match position {
            RetrievePosition::FirstStartingWithinPage => of_class
                .find(|e| e.starts_here)
                .map(|e| e.text.as_str())
                .or_else(first_including_carryover),
            RetrievePosition::FirstIncludingCarryover => first_including_carryover(),
            RetrievePosition::LastStartingWithinPage => of_class
                .filter(|e| e.starts_here)
                .last()
                .map(|e| e.text.as_str())
                .or_else(first_including_carryover),
            RetrievePosition::LastEndingWithinPage => {
                let last = self.entries.iter().filter(|e| e.class_name == class_name).last();
                of_class
                    .filter(|e| e.ends_here)
                    .last()
                    .or(last)
                    .map(|e| e.text.as_str())
                    .or_else(carried)
            }
        }
    }

    /// The carryover the next page starts with.
    pub fn carry_forward(&self) -> HashMap<String, String> {
        let mut carried = self.carryover.clone();
        for entry in &self.entries {
            carried.insert(entry.class_name.clone(), entry.text.clone());
        }
        carried
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(text: &str) -> Vec<Marker> {
        vec![Marker {
            class_name: "chapter".into(),
            text: text.into(),
        }]
    }

    #[test]
    fn retrieval_positions() {
        let mut table = MarkerTable::with_carryover(HashMap::from([(
            "chapter".to_string(),
            "Zero".to_string(),
        )]));
        table.add(OwnerHandle(1), &marker("One"), false);
        table.add(OwnerHandle(2), &marker("Two"), true);
        table.add(OwnerHandle(3), &marker("Three"), true);
        table.finish(OwnerHandle(1));
        table.finish(OwnerHandle(2));

        use RetrievePosition::*;
        assert_eq!(table.retrieve("chapter", FirstStartingWithinPage), Some("Two"));
        assert_eq!(table.retrieve("chapter", FirstIncludingCarryover), Some("One"));
        assert_eq!(table.retrieve("chapter", LastStartingWithinPage), Some("Three"));
        assert_eq!(table.retrieve("chapter", LastEndingWithinPage), Some("Two"));
        assert_eq!(table.retrieve("section", FirstIncludingCarryover), None);
        assert_eq!(table.carry_forward()["chapter"], "Three");
    }

    #[test]
    fn empty_pages_fall_back_to_carryover() {
        let table = MarkerTable::with_carryover(HashMap::from([(
            "chapter".to_string(),
            "Zero".to_string(),
        )]));
        assert_eq!(
            table.retrieve("chapter", RetrievePosition::FirstStartingWithinPage),
            Some("Zero")
        );
        assert_eq!(
            table.retrieve("chapter", RetrievePosition::LastEndingWithinPage),
            Some("Zero")
        );
    }

    #[test]
    fn markers_register_once_per_owner() {
        let mut table = MarkerTable::default();
        table.add(OwnerHandle(1), &marker("One"), true);
        table.add(OwnerHandle(1), &marker("One"), false);
        assert_eq!(table.entries.len(), 1);
    }
}
