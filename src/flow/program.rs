//! Assistance programs and keyword routing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keywords that send a conversation to emergency food aid.
const EMERGENCY_KEYWORDS: &[&str] = &[
    "no food",
    "hunger crisis",
    "starving",
    "disaster",
    "displacement",
    "urgent",
    "immediate",
    "emergency",
    "no food available",
    "crisis",
];

/// Keywords that send a conversation to nutrition support.
const NUTRITION_KEYWORDS: &[&str] = &[
    "nutrition",
    "malnutrition",
    "child nutrition",
    "maternal",
    "pregnant",
    "lactating",
    "breastfeeding",
    "dietary",
    "pregnancy",
];

/// Program a beneficiary is referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    /// Acute shortage: disaster, displacement, no food at all.
    EmergencyFoodAid,
    /// Child, maternal and dietary nutrition needs.
    NutritionSupport,
    /// Everything else.
    GeneralFoodAccess,
}

impl Program {
    /// Classify a user message; emergency keywords win over nutrition ones.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

        if mentions(EMERGENCY_KEYWORDS) {
            Self::EmergencyFoodAid
        } else if mentions(NUTRITION_KEYWORDS) {
            Self::NutritionSupport
        } else {
            Self::GeneralFoodAccess
        }
    }

    /// Identifier used in webhook payloads and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmergencyFoodAid => "emergency_food_aid",
            Self::NutritionSupport => "nutrition_support",
            Self::GeneralFoodAccess => "general_food_access",
        }
    }

    /// Name shown to the beneficiary.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::EmergencyFoodAid => "Emergency Food Aid",
            Self::NutritionSupport => "Nutrition Support Program",
            Self::GeneralFoodAccess => "General Food Access Program",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
