//! User message templates for the reasoning stages
//!
//! Every template renders under strict undefined handling, so callers pass
//! every variable, using `null` or an empty list where nothing applies.

use impact_prompt::{JinjaTemplate, Result};

// ============================================================================
// Summarizer
// ============================================================================

/// Vars: `articles` (`title`, `source`, `body`)
pub fn summarize_prompt() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "impact.user.summarize",
        r"Summarize the market issue behind these {{ articles | length }} articles.
{% for article in articles %}
[{{ loop.index }}] {{ article.title }}{% if article.source %} ({{ article.source }}){% endif %}
{{ article.body }}
{% endfor %}",
        r"다음 기사 {{ articles | length }}건이 다루는 시장 이슈를 요약하세요.
{% for article in articles %}
[{{ loop.index }}] {{ article.title }}{% if article.source %} ({{ article.source }}){% endif %}
{{ article.body }}
{% endfor %}",
    )
}

// ============================================================================
// Recommenders
// ============================================================================

/// Vars: `summary`, `count`, `feedback`, `previous_feedback`
pub fn recommend_primary_prompt() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "impact.user.recommend_primary",
        r"Market issue ({{ summary.issue_category }}, sentiment {{ summary.sentiment_score | signed }} {{ summary.sentiment_label }}):
{{ summary.digest }}

Keywords: {{ summary.keywords | join(', ') }}

Propose up to {{ count }} listed companies that benefit directly from this issue.
{%- if feedback %}

MANDATORY CORRECTION: the previous proposal was rejected. Address every point below:
{{ feedback }}
{%- endif %}
{%- if previous_feedback %}

Earlier rejections, do not repeat these mistakes:
{%- for item in previous_feedback %}
- {{ item }}
{%- endfor %}
{%- endif %}",
        r"시장 이슈 ({{ summary.issue_category }}, 심리 {{ summary.sentiment_score | signed }} {{ summary.sentiment_label }}):
{{ summary.digest }}

키워드: {{ summary.keywords | join(', ') }}

이 이슈로 직접 수혜를 받는 상장사를 최대 {{ count }}개 제시하세요.
{%- if feedback %}

필수 수정 사항: 이전 제안이 반려되었습니다. 아래 지적 사항을 모두 반영하세요:
{{ feedback }}
{%- endif %}
{%- if previous_feedback %}

이전 반려 사유, 같은 실수를 반복하지 마세요:
{%- for item in previous_feedback %}
- {{ item }}
{%- endfor %}
{%- endif %}",
    )
}

/// Vars: `summary`, `count`, `primary`, `excluded`, `feedback`, `previous_feedback`
pub fn recommend_secondary_prompt() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "impact.user.recommend_secondary",
        r"Market issue ({{ summary.issue_category }}, sentiment {{ summary.sentiment_score | signed }} {{ summary.sentiment_label }}):
{{ summary.digest }}

First-order beneficiaries:
{%- for equity in primary %}
- {{ equity.name }} ({{ equity.identifier }}): {{ equity.rationale }}
{%- else %}
- none retained
{%- endfor %}
{%- if excluded %}

Excluded as already priced in, never name these:
{%- for equity in excluded %}
- {{ equity.name }} ({{ equity.identifier }})
{%- endfor %}
{%- endif %}

Propose up to {{ count }} second-order ripple effects.
{%- if feedback %}

MANDATORY CORRECTION: the previous proposal was rejected. Address every point below:
{{ feedback }}
{%- endif %}
{%- if previous_feedback %}

Earlier rejections, do not repeat these mistakes:
{%- for item in previous_feedback %}
- {{ item }}
{%- endfor %}
{%- endif %}",
        r"시장 이슈 ({{ summary.issue_category }}, 심리 {{ summary.sentiment_score | signed }} {{ summary.sentiment_label }}):
{{ summary.digest }}

1차 수혜주:
{%- for equity in primary %}
- {{ equity.name }} ({{ equity.identifier }}): {{ equity.rationale }}
{%- else %}
- 남은 종목 없음
{%- endfor %}
{%- if excluded %}

이미 선반영되어 제외된 종목, 절대 제시하지 마세요:
{%- for equity in excluded %}
- {{ equity.name }} ({{ equity.identifier }})
{%- endfor %}
{%- endif %}

2차 파급 효과를 최대 {{ count }}개 제시하세요.
{%- if feedback %}

필수 수정 사항: 이전 제안이 반려되었습니다. 아래 지적 사항을 모두 반영하세요:
{{ feedback }}
{%- endif %}
{%- if previous_feedback %}

이전 반려 사유, 같은 실수를 반복하지 마세요:
{%- for item in previous_feedback %}
- {{ item }}
{%- endfor %}
{%- endif %}",
    )
}

// ============================================================================
// Critics
// ============================================================================

/// Vars: `summary`, `candidates`
pub fn critique_primary_prompt() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "impact.user.critique_primary",
        r"Market issue ({{ summary.issue_category }}):
{{ summary.digest }}

Proposed first-order beneficiaries:
{%- for equity in candidates %}
{{ loop.index }}. {{ equity.name }} ({{ equity.identifier }}), confidence {{ equity.confidence }}, expected {{ equity.expected_trend }}
   {{ equity.rationale }}
{%- else %}
(empty list)
{%- endfor %}

Review the list against all four criteria.",
        r"시장 이슈 ({{ summary.issue_category }}):
{{ summary.digest }}

제안된 1차 수혜주:
{%- for equity in candidates %}
{{ loop.index }}. {{ equity.name }} ({{ equity.identifier }}), 신뢰도 {{ equity.confidence }}, 예상 방향 {{ equity.expected_trend }}
   {{ equity.rationale }}
{%- else %}
(빈 목록)
{%- endfor %}

네 가지 기준으로 목록을 검토하세요.",
    )
}

/// Vars: `summary`, `primary`, `effects`
pub fn critique_secondary_prompt() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "impact.user.critique_secondary",
        r"Market issue ({{ summary.issue_category }}):
{{ summary.digest }}

First-order beneficiaries: {% for equity in primary %}{{ equity.name }} ({{ equity.identifier }}){% if not loop.last %}, {% endif %}{% else %}none{% endfor %}

Proposed ripple effects:
{%- for effect in effects %}
{{ loop.index }}. {{ effect.sector }} [{{ effect.impact_level }}, {{ effect.trend_direction }}]
   Chain: {{ effect.causal_chain }}
   Related: {% for equity in effect.related_equities %}{{ equity.name }} ({{ equity.identifier }}){% if not loop.last %}, {% endif %}{% else %}none{% endfor %}
{%- else %}
(empty list)
{%- endfor %}

Review the list against all four criteria.",
        r"시장 이슈 ({{ summary.issue_category }}):
{{ summary.digest }}

1차 수혜주: {% for equity in primary %}{{ equity.name }} ({{ equity.identifier }}){% if not loop.last %}, {% endif %}{% else %}없음{% endfor %}

제안된 2차 파급 효과:
{%- for effect in effects %}
{{ loop.index }}. {{ effect.sector }} [{{ effect.impact_level }}, {{ effect.trend_direction }}]
   인과 사슬: {{ effect.causal_chain }}
   관련 종목: {% for equity in effect.related_equities %}{{ equity.name }} ({{ equity.identifier }}){% if not loop.last %}, {% endif %}{% else %}없음{% endfor %}
{%- else %}
(빈 목록)
{%- endfor %}

네 가지 기준으로 목록을 검토하세요.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use impact_prompt::{Language, PromptTemplate};
    use serde_json::{Value, json};

    fn summary() -> Value {
        json!({
            "digest": "The central bank cut the base rate by 25bp.",
            "sentiment_score": 0.6,
            "sentiment_label": "positive",
            "keywords": ["rate cut", "bank", "bonds", "housing", "growth"],
            "issue_category": "interest_rate",
        })
    }

    #[test]
    fn test_summarize_lists_articles() {
        let prompt = summarize_prompt()
            .unwrap()
            .render(
                &Language::English,
                &json!({ "articles": [
                    { "title": "Rate cut", "source": "Yonhap", "body": "The bank cut rates." },
                    { "title": "Bonds rally", "source": "", "body": "Yields fell." },
                ]}),
            )
            .unwrap();
        assert!(prompt.contains("these 2 articles"));
        assert!(prompt.contains("[1] Rate cut (Yonhap)"));
        assert!(prompt.contains("[2] Bonds rally\nYields fell."));
    }

    #[test]
    fn test_feedback_is_mandatory_when_present() {
        let template = recommend_primary_prompt().unwrap();

        let first = template
            .render(
                &Language::English,
                &json!({ "summary": summary(), "count": 3, "feedback": null, "previous_feedback": [] }),
            )
            .unwrap();
        assert!(first.contains("sentiment +0.60 positive"));
        assert!(first.contains("up to 3 listed companies"));
        assert!(!first.contains("MANDATORY"));

        let retry = template
            .render(
                &Language::English,
                &json!({
                    "summary": summary(),
                    "count": 3,
                    "feedback": "Drop the construction names.",
                    "previous_feedback": ["Codes must be real."],
                }),
            )
            .unwrap();
        assert!(retry.contains("MANDATORY CORRECTION"));
        assert!(retry.contains("Drop the construction names."));
        assert!(retry.contains("- Codes must be real."));
    }

    #[test]
    fn test_missing_variable_fails() {
        let result = recommend_primary_prompt()
            .unwrap()
            .render(&Language::English, &json!({ "summary": summary(), "count": 3 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_secondary_prompt_names_exclusions() {
        let prompt = recommend_secondary_prompt()
            .unwrap()
            .render(
                &Language::Korean,
                &json!({
                    "summary": summary(),
                    "count": 2,
                    "primary": [{ "identifier": "105560", "name": "KB금융", "rationale": "NIM" }],
                    "excluded": [{ "identifier": "055550", "name": "신한지주" }],
                    "feedback": null,
                    "previous_feedback": [],
                }),
            )
            .unwrap();
        assert!(prompt.contains("- KB금융 (105560): NIM"));
        assert!(prompt.contains("제외된 종목"));
        assert!(prompt.contains("신한지주 (055550)"));
    }

    #[test]
    fn test_critique_secondary_renders_chains() {
        let prompt = critique_secondary_prompt()
            .unwrap()
            .render(
                &Language::English,
                &json!({
                    "summary": summary(),
                    "primary": [],
                    "effects": [{
                        "sector": "Construction",
                        "causal_chain": "rate cut -> mortgage demand -> housing starts",
                        "impact_level": "medium",
                        "trend_direction": "positive",
                        "related_equities": [{ "identifier": "000720", "name": "Hyundai E&C" }],
                    }],
                }),
            )
            .unwrap();
        assert!(prompt.contains("First-order beneficiaries: none"));
        assert!(prompt.contains("1. Construction [medium, positive]"));
        assert!(prompt.contains("Related: Hyundai E&C (000720)"));
    }
}
