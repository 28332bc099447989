//! Fixed candidate pools per time window.

use serde::{Deserialize, Serialize};

use super::context::{ActivityCategory, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    TouchGrass,
    Exercise,
    Breathing,
    Meditation,
}

/// The activity shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedActivity {
    pub kind: ActivityKind,
    pub title: String,
    pub reason: String,
    pub duration_minutes: u32,
    pub category: ActivityCategory,
    /// 0.0 ..= 1.0, used by the presentation layer for emphasis.
    pub urgency: f64,
    /// Exercise library id, for exercise suggestions.
    pub exercise_ref: Option<String>,
}

/// Template an engine rule can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub kind: ActivityKind,
    pub title: &'static str,
    pub duration_minutes: u32,
    pub category: ActivityCategory,
    pub exercise_ref: Option<&'static str>,
}

impl Candidate {
    pub fn suggest(&self, reason: impl Into<String>, urgency: f64) -> SuggestedActivity {
        SuggestedActivity {
            kind: self.kind,
            title: self.title.to_string(),
            reason: reason.into(),
            duration_minutes: self.duration_minutes,
            category: self.category,
            urgency: urgency.clamp(0.0, 1.0),
            exercise_ref: self.exercise_ref.map(str::to_string),
        }
    }
}

const MICRO: &[Candidate] = &[
    Candidate {
        kind: ActivityKind::Breathing,
        title: "Three Deep Breaths",
        duration_minutes: 1,
        category: ActivityCategory::Mental,
        exercise_ref: Some("deep_breathing"),
    },
    Candidate {
        kind: ActivityKind::Exercise,
        title: "Quick Chin Tuck",
        duration_minutes: 1,
        category: ActivityCategory::Posture,
        exercise_ref: Some("chin_tuck_quick"),
    },
    Candidate {
        kind: ActivityKind::Exercise,
        title: "20-20-20 Eye Rest",
        duration_minutes: 1,
        category: ActivityCategory::Mental,
        exercise_ref: Some("eye_exercise_20_20_20"),
    },
];

const QUICK: &[Candidate] = &[
    Candidate {
        kind: ActivityKind::Exercise,
        title: "Shoulder Blade Squeeze",
        duration_minutes: 2,
        category: ActivityCategory::Posture,
        exercise_ref: Some("scapular_retraction"),
    },
    Candidate {
        kind: ActivityKind::Exercise,
        title: "Shoulder Rolls",
        duration_minutes: 2,
        category: ActivityCategory::Physical,
        exercise_ref: Some("shoulder_rolls"),
    },
    Candidate {
        kind: ActivityKind::Breathing,
        title: "Box Breathing",
        duration_minutes: 2,
        category: ActivityCategory::Mental,
        exercise_ref: None,
    },
];

const STANDARD: &[Candidate] = &[
    Candidate {
        kind: ActivityKind::TouchGrass,
        title: "Step Outside",
        duration_minutes: 5,
        category: ActivityCategory::Outdoor,
        exercise_ref: None,
    },
    Candidate {
        kind: ActivityKind::Exercise,
        title: "Upper Trap Stretch",
        duration_minutes: 5,
        category: ActivityCategory::Posture,
        exercise_ref: Some("upper_trap_stretch"),
    },
    Candidate {
        kind: ActivityKind::Meditation,
        title: "Mindful Pause",
        duration_minutes: 5,
        category: ActivityCategory::Mental,
        exercise_ref: None,
    },
];

const EXTENDED: &[Candidate] = &[
    Candidate {
        kind: ActivityKind::TouchGrass,
        title: "Walk Around the Block",
        duration_minutes: 10,
        category: ActivityCategory::Outdoor,
        exercise_ref: None,
    },
    Candidate {
        kind: ActivityKind::Exercise,
        title: "Desk Mobility Routine",
        duration_minutes: 8,
        category: ActivityCategory::Physical,
        exercise_ref: Some("thoracic_extension"),
    },
    Candidate {
        kind: ActivityKind::Meditation,
        title: "Guided Meditation",
        duration_minutes: 10,
        category: ActivityCategory::Mental,
        exercise_ref: None,
    },
];

/// Used when a rule wants a mental reset and the pool has none.
pub const BREATHING_RESET: Candidate = Candidate {
    kind: ActivityKind::Breathing,
    title: "Three Deep Breaths",
    duration_minutes: 1,
    category: ActivityCategory::Mental,
    exercise_ref: Some("deep_breathing"),
};

/// Last resort when there is nothing to pick from.
pub const GENERIC_BREAK: Candidate = Candidate {
    kind: ActivityKind::TouchGrass,
    title: "Take a Break",
    duration_minutes: 5,
    category: ActivityCategory::Outdoor,
    exercise_ref: None,
};

pub fn candidate_pool(window: TimeWindow) -> &'static [Candidate] {
    match window {
        TimeWindow::Micro => MICRO,
        TimeWindow::Quick => QUICK,
        TimeWindow::Standard => STANDARD,
        TimeWindow::Extended => EXTENDED,
    }
}
