// Static dashboard catalog - sections and the KPI/chart keys they own
//
// The catalog is the single place section membership is declared. Visibility
// resolution and snapshot ordering both look keys up here, so a key can only
// ever belong to one section.
use super::metrics::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDef {
    pub key: &'static str,
    pub title: &'static str,
    pub source: Source,
    pub kpis: &'static [&'static str],
    pub charts: &'static [&'static str],
}

pub const SECTIONS: &[SectionDef] = &[
    SectionDef {
        key: "web_analytics",
        title: "Web Analytics",
        source: Source::Traffic,
        kpis: &[
            "visitors",
            "sessions",
            "pageviews",
            "bounce_rate",
            "avg_session_duration",
        ],
        charts: &["traffic_trend", "channel_breakdown"],
    },
    SectionDef {
        key: "advanced_analytics",
        title: "Advanced Analytics",
        source: Source::Traffic,
        kpis: &["pages_per_session", "new_visitor_share", "revenue"],
        charts: &["device_breakdown", "top_pages"],
    },
    SectionDef {
        key: "seo_analytics",
        title: "SEO Analytics",
        source: Source::Seo,
        kpis: &["clicks", "impressions", "ctr", "avg_position"],
        charts: &["search_trend"],
    },
    SectionDef {
        key: "keyword_analytics",
        title: "Keyword Analytics",
        source: Source::Seo,
        kpis: &["ranked_keywords", "top_ten_keywords"],
        charts: &["top_queries", "position_buckets"],
    },
    SectionDef {
        key: "mention_analytics",
        title: "AI Mention Analytics",
        source: Source::Mentions,
        kpis: &["mentions", "mention_share_of_voice", "mention_sentiment"],
        charts: &["mention_trend", "assistant_breakdown"],
    },
];

pub fn section(key: &str) -> Option<&'static SectionDef> {
    SECTIONS.iter().find(|s| s.key == key)
}

/// Section owning a KPI key, if the key is known.
pub fn section_of_kpi(key: &str) -> Option<&'static SectionDef> {
    SECTIONS.iter().find(|s| s.kpis.contains(&key))
}

pub fn section_of_chart(key: &str) -> Option<&'static SectionDef> {
    SECTIONS.iter().find(|s| s.charts.contains(&key))
}

/// Every KPI key in catalog order.
pub fn all_kpi_keys() -> impl Iterator<Item = &'static str> {
    SECTIONS.iter().flat_map(|s| s.kpis.iter().copied())
}

/// Every chart key in catalog order.
pub fn all_chart_keys() -> impl Iterator<Item = &'static str> {
    SECTIONS.iter().flat_map(|s| s.charts.iter().copied())
}

/// Position of a KPI key in catalog order. Unknown keys sort last so a
/// misbehaving source cannot reorder the known ones.
pub fn kpi_position(key: &str) -> usize {
    all_kpi_keys()
        .position(|k| k == key)
        .unwrap_or(usize::MAX)
}

pub fn chart_position(key: &str) -> usize {
    all_chart_keys()
        .position(|k| k == key)
        .unwrap_or(usize::MAX)
}
