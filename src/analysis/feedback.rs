// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Templated feedback and recommendation text

use rand::seq::SliceRandom;
use rand::Rng;

use super::emotions::{Emotion, EmotionScores};
use super::AnalysisError;

/// Secondary categories above this score get a sentence of their own
pub const SECONDARY_THRESHOLD: f32 = 0.2;
/// How many categories after the dominant one are considered
const MAX_SECONDARY: usize = 2;

/// Feedback and recommendation sentences for one category
#[derive(Debug, Clone, Copy)]
pub struct TemplateEntry {
    pub emotion: Emotion,
    pub feedback: [&'static str; 2],
    pub recommendations: [&'static str; 2],
}

/// Template table for one analyzer
#[derive(Debug, Clone, Copy)]
pub struct FeedbackTemplates {
    entries: &'static [TemplateEntry],
}

impl FeedbackTemplates {
    pub const SHAPE: FeedbackTemplates = FeedbackTemplates {
        entries: SHAPE_TEMPLATES,
    };

    pub const DRAWING: FeedbackTemplates = FeedbackTemplates {
        entries: DRAWING_TEMPLATES,
    };

    fn entry(&self, emotion: Emotion) -> Result<&'static TemplateEntry, AnalysisError> {
        self.entries
            .iter()
            .find(|entry| entry.emotion == emotion)
            .ok_or(AnalysisError::MissingTemplate(emotion))
    }

    /// Dominant-category sentence plus lowercased sentences for strong
    /// runners-up (ranks 2 and 3 with score above [`SECONDARY_THRESHOLD`])
    pub fn generate_feedback<R: Rng + ?Sized>(
        &self,
        scores: &EmotionScores,
        rng: &mut R,
    ) -> Result<String, AnalysisError> {
        let dominant = scores.dominant().ok_or(AnalysisError::EmptyScores)?;
        let mut feedback = pick(&self.entry(dominant)?.feedback, rng).to_string();

        let ranked = scores.ranked();
        for (emotion, score) in ranked
            .iter()
            .filter(|(emotion, _)| *emotion != dominant)
            .take(MAX_SECONDARY)
        {
            if *score > SECONDARY_THRESHOLD {
                let sentence = pick(&self.entry(*emotion)?.feedback, rng);
                feedback.push(' ');
                feedback.push_str(&sentence.to_lowercase());
            }
        }

        Ok(feedback)
    }

    /// One recommendation for the dominant category
    pub fn generate_recommendation<R: Rng + ?Sized>(
        &self,
        scores: &EmotionScores,
        rng: &mut R,
    ) -> Result<String, AnalysisError> {
        let dominant = scores.dominant().ok_or(AnalysisError::EmptyScores)?;
        Ok(pick(&self.entry(dominant)?.recommendations, rng).to_string())
    }
}

fn pick<R: Rng + ?Sized>(options: &[&'static str; 2], rng: &mut R) -> &'static str {
    options.choose(rng).copied().unwrap_or(options[0])
}

const SHAPE_TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry {
        emotion: Emotion::Calm,
        feedback: [
            "Your drawing suggests a calm and balanced state of mind.",
            "Your steady hand indicates inner tranquility.",
        ],
        recommendations: [
            "Try to maintain this balanced state through meditation or mindful activities.",
            "Your calm demeanor is an asset. Use it to tackle complex tasks today.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Anxious,
        feedback: [
            "Your drawing suggests some underlying tension or anxiety.",
            "The way you traced the shape may indicate some nervousness.",
        ],
        recommendations: [
            "Consider taking deep breaths and practicing mindfulness to reduce tension.",
            "Focus on one task at a time to manage nervous energy.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Excited,
        feedback: [
            "Your drawing suggests excitement and enthusiasm.",
            "Your energetic approach indicates high spirits.",
        ],
        recommendations: [
            "Channel your enthusiasm into creative endeavors.",
            "Use this energy for tasks requiring innovation and brainstorming.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Depressed,
        feedback: [
            "Your drawing suggests some emotional heaviness.",
            "The pressure and pacing of your strokes may indicate low mood.",
        ],
        recommendations: [
            "Consider engaging in physical activity to boost your mood.",
            "Connect with others - social interactions can help lift your spirits.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Focused,
        feedback: [
            "Your drawing shows remarkable focus and attention to detail.",
            "Your precision indicates a highly concentrated state.",
        ],
        recommendations: [
            "Your concentration is exceptional. Use it for demanding tasks.",
            "Remember to take occasional breaks to maintain this focus.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Distracted,
        feedback: [
            "Your drawing suggests you might be experiencing some distractions.",
            "The irregularities may indicate divided attention.",
        ],
        recommendations: [
            "Try to minimize interruptions and create a dedicated work environment.",
            "Short meditation sessions might help improve your concentration.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Confident,
        feedback: [
            "Your drawing shows confidence and decisiveness.",
            "Your bold strokes indicate self-assurance.",
        ],
        recommendations: [
            "Your confidence serves you well. Consider tackling challenging tasks.",
            "Share your assurance with others who may need encouragement.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Hesitant,
        feedback: [
            "Your drawing suggests some uncertainty or hesitation.",
            "The tentative strokes may indicate cautiousness.",
        ],
        recommendations: [
            "Trust yourself more. Your careful approach has its own strengths.",
            "Breaking tasks into smaller steps might help reduce uncertainty.",
        ],
    },
];

const DRAWING_TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry {
        emotion: Emotion::Calm,
        feedback: [
            "Your drawing reflects a peaceful and balanced mindset.",
            "The composition shows inner harmony and tranquility.",
        ],
        recommendations: [
            "Your peaceful mindset is ideal for meditation or reflective activities.",
            "Channel this tranquility into mindful practices or nature connection.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Anxious,
        feedback: [
            "Your drawing suggests some underlying tension or unease.",
            "The elements in your drawing may reflect some nervousness or worry.",
        ],
        recommendations: [
            "Try deep breathing exercises to help manage feelings of tension.",
            "Consider physical activity to release nervous energy.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Energetic,
        feedback: [
            "Your drawing is full of vitality and dynamic energy.",
            "The vibrant elements suggest enthusiasm and high energy.",
        ],
        recommendations: [
            "Channel your abundant energy into creative or physical pursuits.",
            "This is a great time for brainstorming or starting new projects.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Melancholic,
        feedback: [
            "Your drawing has a contemplative, somewhat somber quality.",
            "There's a thoughtful, introspective mood to your creation.",
        ],
        recommendations: [
            "Express your deeper feelings through journaling or art.",
            "Connect with a supportive friend to share what's on your mind.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Creative,
        feedback: [
            "Your drawing shows remarkable imagination and creativity.",
            "The unique elements reflect an innovative mindset.",
        ],
        recommendations: [
            "Your imaginative state is perfect for artistic expression.",
            "Take advantage of this creative flow for problem-solving.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Logical,
        feedback: [
            "Your drawing shows structured thinking and methodical approach.",
            "The organized elements suggest analytical processing.",
        ],
        recommendations: [
            "Your analytical mindset is ideal for organizing tasks or planning.",
            "Consider tackling complex problems requiring systematic thinking.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Joyful,
        feedback: [
            "Your drawing radiates positivity and cheerfulness.",
            "The uplifting elements reflect a happy state of mind.",
        ],
        recommendations: [
            "Share your positive energy with others who might need uplifting.",
            "Use this happy state to engage in fulfilling social activities.",
        ],
    },
    TemplateEntry {
        emotion: Emotion::Contemplative,
        feedback: [
            "Your drawing suggests deep thought and reflection.",
            "The thoughtful composition indicates philosophical consideration.",
        ],
        recommendations: [
            "Your reflective state is perfect for journaling or deep reading.",
            "Take time for introspection and personal growth activities.",
        ],
    },
];
