use serde::Serialize;

pub const WEEK_THRESHOLD: u32 = 7;
pub const MONTH_THRESHOLD: u32 = 30;

/// Highest streak milestone reached by a current streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Milestone {
    Week,
    Month,
}

impl Milestone {
    pub fn for_streak(current_streak: u32) -> Option<Self> {
        if current_streak >= MONTH_THRESHOLD {
            Some(Milestone::Month)
        } else if current_streak >= WEEK_THRESHOLD {
            Some(Milestone::Week)
        } else {
            None
        }
    }

    pub fn threshold(&self) -> u32 {
        match self {
            Milestone::Week => WEEK_THRESHOLD,
            Milestone::Month => MONTH_THRESHOLD,
        }
    }
}
