//! Console rendering of an analysis result.

use std::fmt::Write;

use revlens_core::{AnalysisResult, PromptLanguage};

struct Labels {
    title: &'static str,
    product: &'static str,
    sentiment: &'static str,
    recommendation: &'static str,
    reviews: &'static str,
    pros: &'static str,
    cons: &'static str,
    themes: &'static str,
    none: &'static str,
}

const RUSSIAN: Labels = Labels {
    title: "========== ОТЧЕТ АНАЛИЗА ПРОДУКТА ==========",
    product: "ID продукта",
    sentiment: "Общая тональность",
    recommendation: "Рекомендация",
    reviews: "Проанализировано отзывов",
    pros: "Ключевые преимущества:",
    cons: "Ключевые недостатки:",
    themes: "Основные темы:",
    none: "(нет)",
};

const ENGLISH: Labels = Labels {
    title: "========== PRODUCT ANALYSIS REPORT ==========",
    product: "Product ID",
    sentiment: "Overall sentiment",
    recommendation: "Recommendation",
    reviews: "Reviews analyzed",
    pros: "Key pros:",
    cons: "Key cons:",
    themes: "Common themes:",
    none: "(none)",
};

const RULE: &str = "=============================================";

/// Renders `result` as a plain-text report in `language`.
///
/// `review_count` is shown when known (i.e. right after a run). A sentinel
/// result carries no lists, so their sections are left out.
pub(crate) fn render_report(
    result: &AnalysisResult,
    review_count: Option<usize>,
    language: PromptLanguage,
) -> String {
    let l = match language {
        PromptLanguage::Russian => &RUSSIAN,
        PromptLanguage::English => &ENGLISH,
    };
    let mut out = String::new();

    let _ = writeln!(out, "{}", l.title);
    let _ = writeln!(out, "{}: {}", l.product, result.product_id);
    let _ = writeln!(out, "{}: {}", l.sentiment, result.overall_sentiment);
    let _ = writeln!(out, "{}: {}", l.recommendation, result.purchase_recommendation);
    if let Some(count) = review_count {
        let _ = writeln!(out, "{}: {count}", l.reviews);
    }

    let lists = if result.is_sentinel() {
        Vec::new()
    } else {
        vec![
            (l.pros, &result.key_pros),
            (l.cons, &result.key_cons),
            (l.themes, &result.common_themes),
        ]
    };
    for (heading, items) in lists {
        let _ = writeln!(out, "\n{heading}");
        if items.is_empty() {
            let _ = writeln!(out, "{}", l.none);
        }
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
    }

    let _ = writeln!(out, "{RULE}");
    out
}
