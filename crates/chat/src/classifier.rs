//! Question intent classification.
//!
//! Keyword-rule dispatch over a closed intent set. Deterministic and free
//! of I/O so retrieval parameters are reproducible for identical input;
//! every call site matching on [`Intent`] is exhaustive, so adding an
//! intent is a compile-time-checked change.

use serde::{Deserialize, Serialize};

/// The closed set of question intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Price, layout, facilities of a specific property
    PropertyDetail,
    /// Schools, childcare, school districts
    Education,
    /// Stations, lines, commute, road traffic
    Transit,
    /// Shops, hospitals, banks, daily amenities
    Infrastructure,
    /// Crime, disaster risk, evacuation
    Safety,
    /// City hall, subsidies, municipal services
    Administrative,
    /// Everything else
    General,
}

impl Intent {
    /// Metadata category this intent biases retrieval toward.
    pub fn category(&self) -> Option<&'static str> {
        match self {
            Intent::PropertyDetail => Some("物件概要"),
            Intent::Education => Some("教育・子育て"),
            Intent::Transit => Some("交通・アクセス"),
            Intent::Infrastructure => Some("生活利便性"),
            Intent::Safety => Some("安全・防災"),
            Intent::Administrative => Some("行政施策・政策"),
            Intent::General => None,
        }
    }

    /// Top-k for this intent given the configured baseline.
    ///
    /// Focused intents search a filtered slice of the index, so a smaller k
    /// keeps precision; general questions get the full baseline.
    pub fn retrieval_top_k(&self, base: usize) -> usize {
        match self {
            Intent::General => base,
            _ => base.div_ceil(2).max(3).min(base),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::PropertyDetail => "property-detail",
            Intent::Education => "education",
            Intent::Transit => "transit",
            Intent::Infrastructure => "infrastructure",
            Intent::Safety => "safety",
            Intent::Administrative => "administrative",
            Intent::General => "general",
        }
    }
}

/// Keyword tables, checked in declaration order; order is the tie break.
const KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::PropertyDetail,
        &[
            "物件", "間取り", "価格", "家賃", "築年数", "設備", "面積", "階数", "分譲",
            "この部屋", "管理費",
        ],
    ),
    (
        Intent::Education,
        &[
            "小学校", "中学校", "高校", "保育園", "幼稚園", "学童", "学区", "塾", "教育",
            "子育て", "学校", "待機児童",
        ],
    ),
    (
        Intent::Transit,
        &[
            "駅", "電車", "バス", "路線", "通勤", "通学", "アクセス", "交通", "渋滞",
            "新幹線", "終電",
        ],
    ),
    (
        Intent::Infrastructure,
        &[
            "スーパー", "コンビニ", "病院", "買い物", "銀行", "郵便局", "薬局", "飲食店",
            "公園", "図書館", "ジム",
        ],
    ),
    (
        Intent::Safety,
        &[
            "治安", "防犯", "防災", "避難", "ハザード", "地震", "犯罪", "災害", "洪水",
            "耐震", "交番", "液状化",
        ],
    ),
    (
        Intent::Administrative,
        &[
            "市役所", "行政", "助成", "補助金", "ゴミ", "市政", "手続き", "住民票", "税金",
            "自治体", "子ども医療費",
        ],
    ),
];

/// Classify an utterance into an intent.
///
/// Total over the input domain: the intent with the most keyword hits wins,
/// ties resolve to the earlier table entry, and zero hits fall back to
/// [`Intent::General`].
pub fn classify(text: &str) -> Intent {
    let mut best = Intent::General;
    let mut best_hits = 0usize;

    for (intent, keywords) in KEYWORDS {
        let hits = keywords.iter().filter(|k| text.contains(*k)).count();
        if hits > best_hits {
            best = *intent;
            best_hits = hits;
        }
    }

    tracing::debug!(intent = best.as_str(), hits = best_hits, "Classified question");
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_detail() {
        assert_eq!(classify("この物件の間取りと価格を教えて"), Intent::PropertyDetail);
    }

    #[test]
    fn test_education() {
        assert_eq!(classify("近くの小学校について教えて"), Intent::Education);
        assert_eq!(classify("保育園の待機児童は多いですか"), Intent::Education);
    }

    #[test]
    fn test_transit() {
        assert_eq!(classify("最寄り駅までのアクセスはどうですか"), Intent::Transit);
        assert_eq!(classify("朝の通勤で電車は混みますか"), Intent::Transit);
    }

    #[test]
    fn test_infrastructure() {
        assert_eq!(classify("近くにスーパーやコンビニはありますか"), Intent::Infrastructure);
        assert_eq!(classify("夜間に診てくれる病院はある？"), Intent::Infrastructure);
    }

    #[test]
    fn test_safety() {
        assert_eq!(classify("この地域の治安はどうですか"), Intent::Safety);
        assert_eq!(classify("洪水のハザードマップで危険な区域？"), Intent::Safety);
    }

    #[test]
    fn test_administrative() {
        assert_eq!(classify("引越しの手続きは市役所でできますか"), Intent::Administrative);
        assert_eq!(classify("転入世帯への補助金はありますか"), Intent::Administrative);
    }

    #[test]
    fn test_general_default() {
        assert_eq!(classify("この街の雰囲気はどうですか"), Intent::General);
        assert_eq!(classify(""), Intent::General);
        assert_eq!(classify("hello world"), Intent::General);
    }

    #[test]
    fn test_most_hits_wins() {
        // One transit keyword (駅) against two education keywords (小学校 contains 学校 too)
        assert_eq!(classify("駅の近くの小学校"), Intent::Education);
    }

    #[test]
    fn test_deterministic() {
        let text = "小学校と駅とスーパーについて";
        let first = classify(text);
        for _ in 0..10 {
            assert_eq!(classify(text), first);
        }
    }

    #[test]
    fn test_every_intent_has_category_or_is_general() {
        let intents = [
            Intent::PropertyDetail,
            Intent::Education,
            Intent::Transit,
            Intent::Infrastructure,
            Intent::Safety,
            Intent::Administrative,
            Intent::General,
        ];
        for intent in intents {
            match intent {
                Intent::General => assert!(intent.category().is_none()),
                _ => assert!(intent.category().is_some()),
            }
        }
    }

    #[test]
    fn test_top_k_bias() {
        assert_eq!(Intent::General.retrieval_top_k(10), 10);
        assert_eq!(Intent::Education.retrieval_top_k(10), 5);
        assert_eq!(Intent::Transit.retrieval_top_k(4), 3);
        // Never exceeds the baseline
        assert_eq!(Intent::Safety.retrieval_top_k(2), 2);
    }
}
