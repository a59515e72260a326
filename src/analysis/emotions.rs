// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Emotion categories and normalized score vectors

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Every category either analyzer can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Calm,
    Anxious,
    Excited,
    Depressed,
    Focused,
    Distracted,
    Confident,
    Hesitant,
    Energetic,
    Melancholic,
    Creative,
    Logical,
    Joyful,
    Contemplative,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Calm => "calm",
            Emotion::Anxious => "anxious",
            Emotion::Excited => "excited",
            Emotion::Depressed => "depressed",
            Emotion::Focused => "focused",
            Emotion::Distracted => "distracted",
            Emotion::Confident => "confident",
            Emotion::Hesitant => "hesitant",
            Emotion::Energetic => "energetic",
            Emotion::Melancholic => "melancholic",
            Emotion::Creative => "creative",
            Emotion::Logical => "logical",
            Emotion::Joyful => "joyful",
            Emotion::Contemplative => "contemplative",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories reported for traced shapes, in output order
pub const SHAPE_EMOTIONS: [Emotion; 8] = [
    Emotion::Calm,
    Emotion::Anxious,
    Emotion::Excited,
    Emotion::Depressed,
    Emotion::Focused,
    Emotion::Distracted,
    Emotion::Confident,
    Emotion::Hesitant,
];

/// Categories reported for free-form drawings, in output order
pub const DRAWING_EMOTIONS: [Emotion; 8] = [
    Emotion::Calm,
    Emotion::Anxious,
    Emotion::Energetic,
    Emotion::Melancholic,
    Emotion::Creative,
    Emotion::Logical,
    Emotion::Joyful,
    Emotion::Contemplative,
];

/// Normalized scores over an ordered set of categories
///
/// Values sum to 1.0, or are uniform when every raw score was zero. The
/// category order is kept for tie-breaking and serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionScores {
    entries: Vec<(Emotion, f32)>,
}

impl EmotionScores {
    /// Normalize raw scores; negative and non-finite values count as zero
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (Emotion, f32)>,
    {
        let mut entries: Vec<(Emotion, f32)> = raw
            .into_iter()
            .map(|(emotion, score)| {
                let score = if score.is_finite() { score.max(0.0) } else { 0.0 };
                (emotion, score)
            })
            .collect();

        let total: f32 = entries.iter().map(|(_, score)| score).sum();
        if total > 0.0 {
            for (_, score) in entries.iter_mut() {
                *score /= total;
            }
        } else if !entries.is_empty() {
            let uniform = 1.0 / entries.len() as f32;
            for (_, score) in entries.iter_mut() {
                *score = uniform;
            }
        }

        Self { entries }
    }

    /// Pair raw model outputs with categories, then normalize
    pub fn from_predictions(categories: &[Emotion], predictions: &[f32]) -> Self {
        Self::from_raw(categories.iter().copied().zip(predictions.iter().copied()))
    }

    pub fn get(&self, emotion: Emotion) -> Option<f32> {
        self.entries
            .iter()
            .find(|(e, _)| *e == emotion)
            .map(|(_, score)| *score)
    }

    /// Category with the strictly highest score; ties go to the earlier one
    pub fn dominant(&self) -> Option<Emotion> {
        let mut best: Option<(Emotion, f32)> = None;
        for &(emotion, score) in &self.entries {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((emotion, score)),
            }
        }
        best.map(|(emotion, _)| emotion)
    }

    /// Scores sorted high to low, equal scores keeping category order
    pub fn ranked(&self) -> Vec<(Emotion, f32)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, score)| score).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for EmotionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (emotion, score) in &self.entries {
            map.serialize_entry(emotion.as_str(), score)?;
        }
        map.end()
    }
}
