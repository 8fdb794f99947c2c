use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved plate number, optionally with the photo it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub id: Uuid,
    pub number: String,
    /// Reference (path or URI) to the captured image, if any.
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Plate {
    pub fn new(number: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
            image,
            created_at: Local::now().naive_local(),
        }
    }
}

/// Demo entries used to seed an empty store, newest first.
pub fn sample_plates() -> Vec<Plate> {
    let now = Local::now().naive_local();
    [
        ("81B-67890", 200),
        ("29A-12345", 500),
        ("30F-25658", 1000),
    ]
    .into_iter()
    .map(|(number, age_secs)| Plate {
        id: Uuid::new_v4(),
        number: number.to_string(),
        image: None,
        created_at: now - Duration::seconds(age_secs),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_plate_has_fresh_id() {
        let a = Plate::new("30F-25658", None);
        let b = Plate::new("30F-25658", None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.number, "30F-25658");
    }

    #[test]
    fn samples_are_newest_first() {
        let samples = sample_plates();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].number, "81B-67890");
        assert!(samples
            .windows(2)
            .all(|w| w[0].created_at > w[1].created_at));
    }

    #[test]
    fn serializes_with_field_names() {
        let plate = Plate::new("29A-12345", Some("file:///tmp/p.jpg".into()));
        let json = serde_json::to_value(&plate).unwrap();
        assert_eq!(json["number"], "29A-12345");
        assert_eq!(json["image"], "file:///tmp/p.jpg");
    }
}
