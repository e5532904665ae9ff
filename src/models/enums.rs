use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A string did not match any variant (or alias) of a tracked enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// Parsing is case-insensitive and accepts aliases (English spellings the
/// extractor commonly emits, plus the Chinese labels used in chat). Serde goes
/// through the same path, so wire values always serialize as the canonical
/// string.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal $(| $alias:literal)*),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// All variants in declaration order.
            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                $(
                    if needle.eq_ignore_ascii_case($s) $(|| needle.eq_ignore_ascii_case($alias))* {
                        return Ok(Self::$variant);
                    }
                )+
                Err(UnknownVariant {
                    kind: stringify!($name),
                    value: s.to_string(),
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ═══════════════════════════════════════════════════════════
// Domains and routing targets
// ═══════════════════════════════════════════════════════════

str_enum!(
    /// A health-tracking domain that owns record collections.
    ///
    /// Declaration order is the canonical domain order used for iteration,
    /// map keys and tie-breaking.
    Domain {
        Cycle => "cycle" | "cycle_tracker" | "menstrual",
        SymptomMood => "symptom_mood" | "symptom" | "symptoms",
        Fertility => "fertility",
        Nutrition => "nutrition",
        Exercise => "exercise",
        Lifestyle => "lifestyle",
    }
);

str_enum!(
    /// Where the router sends an utterance.
    ///
    /// Declaration order is the routing priority: on a keyword-count tie the
    /// earlier variant wins.
    RouteTarget {
        Cycle => "cycle" | "cycle_tracker",
        SymptomMood => "symptom_mood",
        Fertility => "fertility",
        Nutrition => "nutrition",
        Exercise => "exercise",
        HealthInsights => "health_insights",
        Lifestyle => "lifestyle",
        Recipe => "recipe",
    }
);

impl RouteTarget {
    /// The tracked domain behind this target. `HealthInsights` and `Recipe`
    /// own no record collections.
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Self::Cycle => Some(Domain::Cycle),
            Self::SymptomMood => Some(Domain::SymptomMood),
            Self::Fertility => Some(Domain::Fertility),
            Self::Nutrition => Some(Domain::Nutrition),
            Self::Exercise => Some(Domain::Exercise),
            Self::Lifestyle => Some(Domain::Lifestyle),
            Self::HealthInsights | Self::Recipe => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Record value enums
// ═══════════════════════════════════════════════════════════

str_enum!(FlowIntensity {
    Light => "Light" | "轻微" | "轻",
    Medium => "Medium" | "中等" | "中",
    Heavy => "Heavy" | "大量" | "重",
    Spotting => "Spotting" | "点滴" | "少量",
});

str_enum!(SleepQuality {
    Excellent => "Excellent",
    Good => "Good",
    Fair => "Fair",
    Poor => "Poor",
});

impl SleepQuality {
    /// Points on a 10-scale used by the lifestyle score.
    pub fn points(&self) -> f64 {
        match self {
            Self::Excellent => 10.0,
            Self::Good => 8.0,
            Self::Fair => 6.0,
            Self::Poor => 3.0,
        }
    }

    /// Rank on a 4-scale used by the sleep trend.
    pub fn rank(&self) -> f64 {
        match self {
            Self::Excellent => 4.0,
            Self::Good => 3.0,
            Self::Fair => 2.0,
            Self::Poor => 1.0,
        }
    }
}

str_enum!(StressLevel {
    Low => "Low",
    Moderate => "Moderate" | "Medium",
    High => "High",
    VeryHigh => "Very High" | "very_high" | "VeryHigh",
});

impl StressLevel {
    /// Stress as a 0-100 reverse indicator (higher is worse).
    pub fn burden(&self) -> f64 {
        match self {
            Self::Low => 0.0,
            Self::Moderate => 30.0,
            Self::High => 60.0,
            Self::VeryHigh => 90.0,
        }
    }
}

str_enum!(ExerciseIntensity {
    Low => "Low Intensity" | "low" | "low_intensity",
    Moderate => "Moderate Intensity" | "moderate" | "moderate_intensity" | "medium",
    High => "High Intensity" | "high" | "high_intensity",
});

str_enum!(CervicalMucusType {
    Dry => "Dry",
    Sticky => "Sticky",
    Creamy => "Creamy",
    Watery => "Watery",
    EggWhite => "Egg White" | "egg_white" | "EggWhite",
});

str_enum!(OvulationTestResult {
    Positive => "Positive",
    Negative => "Negative",
    NotTaken => "Not Taken" | "not_taken" | "NotTaken",
});

str_enum!(FertilityGoal {
    TryingToConceive => "Trying to Conceive" | "trying_to_conceive" | "ttc",
    AvoidingPregnancy => "Avoiding Pregnancy" | "avoiding_pregnancy",
    GeneralHealth => "General Health Monitoring" | "general_health" | "General Health",
    MenopauseTracking => "Menopause Tracking" | "menopause_tracking",
});

impl Default for FertilityGoal {
    fn default() -> Self {
        Self::GeneralHealth
    }
}

// ═══════════════════════════════════════════════════════════
// Derived labels
// ═══════════════════════════════════════════════════════════

str_enum!(CycleRegularity {
    Regular => "regular",
    SomewhatRegular => "somewhat regular" | "somewhat_regular",
    Irregular => "irregular",
    NeedsMoreData => "needs more data" | "needs_more_data",
});

impl Default for CycleRegularity {
    fn default() -> Self {
        Self::NeedsMoreData
    }
}

str_enum!(BbtPattern {
    Biphasic => "biphasic",
    Monophasic => "monophasic",
    InsufficientData => "insufficient data" | "insufficient_data",
});

impl Default for BbtPattern {
    fn default() -> Self {
        Self::InsufficientData
    }
}

str_enum!(SleepTrend {
    Good => "good",
    Fair => "fair",
    NeedsImprovement => "needs improvement" | "needs_improvement",
    InsufficientData => "insufficient data" | "insufficient_data",
});

impl Default for SleepTrend {
    fn default() -> Self {
        Self::InsufficientData
    }
}

str_enum!(HydrationStatus {
    Good => "good",
    Fair => "fair",
    Insufficient => "insufficient",
    NoData => "no data" | "no_data",
});

impl Default for HydrationStatus {
    fn default() -> Self {
        Self::NoData
    }
}

str_enum!(
    /// Per-domain trend bucket in the overall insight.
    Trend {
        Improving => "improving",
        Stable => "stable",
        Declining => "declining",
    }
);

str_enum!(Priority {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

impl Priority {
    /// Suggested follow-up horizon for a recommendation of this priority.
    pub fn timeline(&self) -> &'static str {
        match self {
            Self::High => "1-2 weeks",
            Self::Medium => "2-4 weeks",
            Self::Low => "1-2 months",
        }
    }
}

/// Mood labels counted as positive when scoring mood balance.
const POSITIVE_MOODS: &[&str] = &["happy", "calm", "energetic", "开心", "平静"];

/// Whether a free-form mood label reads as a positive mood.
pub fn is_positive_mood(mood_type: &str) -> bool {
    let needle = mood_type.trim().to_lowercase();
    POSITIVE_MOODS.iter().any(|m| *m == needle)
}
