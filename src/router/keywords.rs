use crate::models::RouteTarget;

/// Keyword set for one routing target. Keywords are lower-case and matched
/// as substrings of the lower-cased utterance.
pub struct KeywordSet {
    pub target: RouteTarget,
    pub keywords: &'static [&'static str],
}

const CYCLE: &[&str] = &[
    // Chinese
    "月经", "经期", "大姨妈", "生理期", "来例假", "流量", "周期",
    // English
    "period", "menstrual", "cycle", "flow", "bleeding",
];

const SYMPTOM_MOOD: &[&str] = &[
    // Chinese
    "症状", "头痛", "痉挛", "疼痛", "疲劳", "腹胀", "恶心", "痤疮",
    "情绪", "心情", "焦虑", "烦躁", "开心", "悲伤", "压力",
    // English
    "symptom", "pain", "cramp", "headache", "bloating", "mood", "anxiety", "tired",
];

const FERTILITY: &[&str] = &[
    // Chinese
    "怀孕", "备孕", "排卵", "受孕", "生育", "避孕", "基础体温",
    // English
    "pregnancy", "ovulation", "fertility", "conceive", "basal temperature",
];

const NUTRITION: &[&str] = &[
    // Chinese
    "营养", "饮食", "补充", "维生素", "钙", "铁", "水分", "健康饮食",
    // English
    "nutrition", "diet", "vitamin", "supplement", "calcium", "iron", "water",
];

const EXERCISE: &[&str] = &[
    // Chinese
    "运动", "锻炼", "瑜伽", "健身", "跑步", "游泳", "散步",
    // English
    "exercise", "workout", "yoga", "fitness", "running", "swimming", "walking",
];

const HEALTH_INSIGHTS: &[&str] = &[
    // Chinese
    "分析", "建议", "预测", "趋势", "模式", "洞察", "健康状况",
    // English
    "analysis", "insight", "prediction", "trend", "pattern", "health status",
];

const LIFESTYLE: &[&str] = &[
    // Chinese
    "睡眠", "作息", "生活习惯", "压力", "体重", "生活方式",
    // English
    "sleep", "lifestyle", "stress", "weight", "habit",
];

const RECIPE: &[&str] = &[
    // Chinese
    "食谱", "菜谱", "做菜", "烹饪", "料理", "配方",
    // English
    "recipe", "cooking", "dish", "meal", "ingredient",
];

/// Built-in bilingual table, in routing priority order.
pub const DEFAULT_TABLE: &[KeywordSet] = &[
    KeywordSet { target: RouteTarget::Cycle, keywords: CYCLE },
    KeywordSet { target: RouteTarget::SymptomMood, keywords: SYMPTOM_MOOD },
    KeywordSet { target: RouteTarget::Fertility, keywords: FERTILITY },
    KeywordSet { target: RouteTarget::Nutrition, keywords: NUTRITION },
    KeywordSet { target: RouteTarget::Exercise, keywords: EXERCISE },
    KeywordSet { target: RouteTarget::HealthInsights, keywords: HEALTH_INSIGHTS },
    KeywordSet { target: RouteTarget::Lifestyle, keywords: LIFESTYLE },
    KeywordSet { target: RouteTarget::Recipe, keywords: RECIPE },
];
