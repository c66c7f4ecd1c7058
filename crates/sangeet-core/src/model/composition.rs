use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::ids::CompositionId;

/// A composition as submitted for saving, before it has an id or timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raga: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tala: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instruments: Vec<String>,
    /// Tempo in beats per minute.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tempo: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mood: String,
    /// Location of the generated audio.
    #[serde(default, deserialize_with = "null_as_default")]
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CompositionDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, raga: impl Into<String>, tala: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            raga: raga.into(),
            tala: tala.into(),
            instruments: Vec::new(),
            tempo: 0.0,
            mood: String::new(),
            audio_url: String::new(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_instruments<I, S>(mut self, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instruments = instruments.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_tempo(mut self, tempo: f64) -> Self {
        self.tempo = tempo;
        self
    }

    #[must_use]
    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    #[must_use]
    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = url.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A generated piece persisted in the local composition store.
///
/// The serialized form uses camelCase keys since the same blob is read
/// and written by the browser client. Text fields, instruments and tempo
/// read as empty when missing or `null`; only the id and timestamps are
/// required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedComposition {
    pub id: CompositionId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raga: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tala: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instruments: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tempo: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mood: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

impl SavedComposition {
    /// Stamp a draft with an id, using `at` for both timestamps.
    #[must_use]
    pub fn from_draft(draft: CompositionDraft, id: CompositionId, at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            raga: draft.raga,
            tala: draft.tala,
            instruments: draft.instruments,
            tempo: draft.tempo,
            mood: draft.mood,
            audio_url: draft.audio_url,
            description: draft.description,
            created_at: at,
            generated_at: at,
        }
    }

    /// The user-supplied part of the record.
    #[must_use]
    pub fn to_draft(&self) -> CompositionDraft {
        CompositionDraft {
            title: self.title.clone(),
            raga: self.raga.clone(),
            tala: self.tala.clone(),
            instruments: self.instruments.clone(),
            tempo: self.tempo,
            mood: self.mood.clone(),
            audio_url: self.audio_url.clone(),
            description: self.description.clone(),
        }
    }

    /// Case-insensitive substring match over the searchable text fields.
    ///
    /// Title, raga, tala, mood, every instrument and the description are
    /// considered. An empty query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();

        contains(&self.title, &needle)
            || contains(&self.raga, &needle)
            || contains(&self.tala, &needle)
            || contains(&self.mood, &needle)
            || self.instruments.iter().any(|instrument| contains(instrument, &needle))
            || self
                .description
                .as_deref()
                .is_some_and(|description| contains(description, &needle))
    }
}

fn contains(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}

/// Read `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SavedComposition {
        let draft = CompositionDraft::new("Evening Calm", "Yaman", "Teentaal")
            .with_instruments(["Sitar", "Tabla"])
            .with_tempo(72.0)
            .with_mood("Serene")
            .with_audio_url("https://cdn.example.com/audio/1.mp3")
            .with_description("Slow alap into a gat");
        SavedComposition::from_draft(draft, CompositionId::from("c1"), Utc::now())
    }

    #[test]
    fn test_draft_builder() {
        let draft = CompositionDraft::new("Dawn", "Bhairav", "Ektaal").with_tempo(60.0);
        assert_eq!(draft.raga, "Bhairav");
        assert!((draft.tempo - 60.0).abs() < f64::EPSILON);
        assert!(draft.instruments.is_empty());
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_from_draft_stamps_both_timestamps() {
        let composition = sample();
        assert_eq!(composition.created_at, composition.generated_at);
        assert_eq!(composition.id.as_str(), "c1");
    }

    #[test]
    fn test_matches_each_field() {
        let composition = sample();
        for query in ["evening", "YAMAN", "teen", "serene", "tabla", "alap"] {
            assert!(composition.matches(query), "expected match for {query}");
        }
        assert!(!composition.matches("bhairavi"));
    }

    #[test]
    fn test_matches_without_description() {
        let mut composition = sample();
        composition.description = None;
        assert!(!composition.matches("alap"));
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("audioUrl").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("generatedAt").is_some());
    }

    #[test]
    fn test_deserialize_browser_record() {
        let raw = r#"{
            "id": "lq2x9k3abc12de",
            "title": "Monsoon",
            "raga": "Megh",
            "tala": "Jhaptaal",
            "instruments": ["Bansuri"],
            "tempo": 84,
            "mood": "Hopeful",
            "audioUrl": "https://cdn.example.com/m.mp3",
            "createdAt": "2024-07-01T10:00:00.000Z",
            "generatedAt": "2024-07-01T10:00:00.000Z"
        }"#;
        let composition: SavedComposition = serde_json::from_str(raw).unwrap();
        assert_eq!(composition.raga, "Megh");
        assert!(composition.description.is_none());
        assert_eq!(composition.instruments, vec!["Bansuri".to_string()]);
    }

    #[test]
    fn test_missing_and_null_fields_read_as_empty() {
        let raw = r#"{
            "id": "lq2x9k3abc12de",
            "title": "Sketch",
            "tala": null,
            "tempo": null,
            "instruments": null,
            "createdAt": "2024-07-01T10:00:00.000Z",
            "generatedAt": "2024-07-01T10:00:00.000Z"
        }"#;
        let composition: SavedComposition = serde_json::from_str(raw).unwrap();
        assert_eq!(composition.title, "Sketch");
        assert!(composition.raga.is_empty());
        assert!(composition.tala.is_empty());
        assert!(composition.mood.is_empty());
        assert!(composition.audio_url.is_empty());
        assert!(composition.instruments.is_empty());
        assert!(composition.tempo.abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_without_timestamps_is_rejected() {
        let raw = r#"{ "id": "x", "title": "Loose" }"#;
        assert!(serde_json::from_str::<SavedComposition>(raw).is_err());
    }
}
