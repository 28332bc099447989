use serde::{Deserialize, Serialize};

/// Water reminder shown next to the activity suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationAdvice {
    pub should_remind: bool,
    pub message: String,
    pub urgency: f64,
    pub glasses_needed: u32,
}

/// `None` once the goal is met or when no goal is set.
pub fn hydration_advice(intake_glasses: u32, goal_glasses: u32) -> Option<HydrationAdvice> {
    if goal_glasses == 0 || intake_glasses >= goal_glasses {
        return None;
    }

    let glasses_needed = goal_glasses - intake_glasses;
    let percentage = f64::from(intake_glasses) / f64::from(goal_glasses);
    let (urgency, message) = if percentage < 0.25 {
        (
            0.9,
            format!("Your water intake is low today. {glasses_needed} glasses to go, start with one now."),
        )
    } else if percentage < 0.5 {
        (
            0.7,
            format!("You're behind on water. Grab a glass, {glasses_needed} left for today."),
        )
    } else if percentage < 0.75 {
        (
            0.5,
            format!("Halfway there. {glasses_needed} more glasses to hit your goal."),
        )
    } else {
        (
            0.3,
            format!(
                "Almost there! Just {glasses_needed} more {}.",
                if glasses_needed == 1 { "glass" } else { "glasses" }
            ),
        )
    };

    Some(HydrationAdvice {
        should_remind: true,
        message,
        urgency,
        glasses_needed,
    })
}
