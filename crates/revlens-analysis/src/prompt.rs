//! Analysis prompt construction.

use std::fmt::Write;

use revlens_core::{ProductReview, PromptLanguage};

/// Reviews beyond this many are left out of the prompt entirely.
pub const MAX_PROMPT_REVIEWS: usize = 20;

struct Template {
    product_line: &'static str,
    format_header: &'static str,
    intro: &'static str,
    sentiment_rule: &'static str,
    lists_rule: &'static str,
    recommendation_rule: &'static str,
    no_prose_rule: &'static str,
    reviews_header: &'static str,
    review_word: &'static str,
    rating_word: &'static str,
    result_header: &'static str,
}

const RUSSIAN: Template = Template {
    product_line: "Продукт",
    format_header: "### Строгий формат JSON-анализа",
    intro: "Ты ДОЛЖЕН предоставить анализ отзывов ТОЛЬКО в этом формате JSON БЕЗ дополнительного текста. Правила:",
    sentiment_rule: "1. OverallSentiment: Одно из [Крайне положительные, Положительные, Смешанные, Отрицательные, Крайне отрицательные]",
    lists_rule: "2. KeyPros/KeyCons/CommonThemes: Массивы из 3-15 кратких фраз на русском",
    recommendation_rule: "3. PurchaseRecommendation: Одно из [Да, Нет, С оговорками]",
    no_prose_rule: "4. НИКОГДА не добавляй пояснения, заметки или текст вне JSON-структуры",
    reviews_header: "### Отзывы",
    review_word: "Отзыв",
    rating_word: "Рейтинг",
    result_header: "### Результат анализа (ТОЛЬКО JSON):",
};

const ENGLISH: Template = Template {
    product_line: "Product",
    format_header: "### Strict JSON analysis format",
    intro: "You MUST return the review analysis ONLY in this JSON format WITHOUT any other text. Rules:",
    sentiment_rule: "1. OverallSentiment: One of [Extremely positive, Positive, Mixed, Negative, Extremely negative]",
    lists_rule: "2. KeyPros/KeyCons/CommonThemes: Arrays of 3-15 short phrases in English",
    recommendation_rule: "3. PurchaseRecommendation: One of [Yes, No, With reservations]",
    no_prose_rule: "4. NEVER add explanations, notes or any text outside the JSON structure",
    reviews_header: "### Reviews",
    review_word: "Review",
    rating_word: "Rating",
    result_header: "### Analysis result (JSON ONLY):",
};

const JSON_SHAPE: &str = r#"{
  "OverallSentiment": "",
  "KeyPros": [""],
  "KeyCons": [""],
  "CommonThemes": [""],
  "PurchaseRecommendation": ""
}"#;

fn template(language: PromptLanguage) -> &'static Template {
    match language {
        PromptLanguage::Russian => &RUSSIAN,
        PromptLanguage::English => &ENGLISH,
    }
}

/// Number of reviews that [`build_prompt`] includes for a batch of `total`.
#[must_use]
pub fn prompt_review_count(total: usize) -> usize {
    total.min(MAX_PROMPT_REVIEWS)
}

/// Renders the analysis prompt for `reviews`.
///
/// The product line is taken from the first review and omitted for an empty
/// batch. Only the first [`MAX_PROMPT_REVIEWS`] reviews are listed, each as
/// `[Review i/n, Rating: r/5] content` in the prompt language.
#[must_use]
pub fn build_prompt(reviews: &[ProductReview], language: PromptLanguage) -> String {
    let t = template(language);
    let mut out = String::new();

    out.push_str("### System Prompt\n");
    if let Some(first) = reviews.first() {
        let _ = writeln!(
            out,
            "\n{}: {}, ID: {}",
            t.product_line, first.source, first.product_id
        );
    }

    for line in [
        t.format_header,
        t.intro,
        t.sentiment_rule,
        t.lists_rule,
        t.recommendation_rule,
        t.no_prose_rule,
        JSON_SHAPE,
        "",
        t.reviews_header,
    ] {
        out.push_str(line);
        out.push('\n');
    }

    let shown = prompt_review_count(reviews.len());
    for (i, review) in reviews.iter().take(shown).enumerate() {
        let _ = writeln!(
            out,
            "[{} {}/{}, {}: {}/5] {}",
            t.review_word,
            i + 1,
            shown,
            t.rating_word,
            review.rating,
            review.content
        );
    }

    out.push_str(t.result_header);
    out.push('\n');
    out
}
