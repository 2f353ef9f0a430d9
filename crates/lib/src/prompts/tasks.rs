//! Static prompts for the structured AI tasks. These are the programmatic
//! defaults; the server's task configuration can override any of them.

use crate::questions::QUESTIONS;
use crate::text::truncate_chars;

/// Prefill reads at most this many characters of the source transcript.
pub const PREFILL_SOURCE_CHAR_LIMIT: usize = 12_000;

pub const PREFILL_SYSTEM_PROMPT: &str = "Extract coaching knowledge from transcript to fill 30 \
    brand questions. Answer concisely in the coach's voice using only the source. If unknown, \
    return empty string. Return JSON with integer keys 1..30 and string values.";

/// The user prompt for the prefill task: the (truncated) source transcript
/// followed by the full question bank.
pub fn prefill_user_prompt(source: &str) -> String {
    format!(
        "SOURCE START\n{}\nSOURCE END\n\nQUESTIONS:\n{}\n\nReturn JSON with keys 1..30.",
        truncate_chars(source, PREFILL_SOURCE_CHAR_LIMIT),
        QUESTIONS.join("\n")
    )
}

pub const TRANSCRIPT_ANALYSIS_SYSTEM_PROMPT: &str = "You are an expert business analyst \
    specializing in client success and coaching. Extract actionable insights from call \
    transcripts.";

pub fn transcript_analysis_user_prompt(content: &str) -> String {
    format!(
        "\
Analyze this success team call transcript and extract:

1. Summary (2-3 sentences)
2. Key Points (3-5 main topics discussed)
3. Pain Points (client challenges mentioned)
4. Opportunities (potential improvements or wins)
5. Action Items (specific next steps)
6. Overall Sentiment (positive/negative/neutral/mixed)

Format as JSON with these exact keys: summary, keyPoints, painPoints, opportunities, actionItems, sentiment

TRANSCRIPT:
{content}"
    )
}

pub const TREND_ANALYSIS_SYSTEM_PROMPT: &str = "You are an expert data analyst specializing in \
    coaching trends and client behavior patterns. Analyze the provided data and return \
    structured JSON insights.";

/// Each transcript or training excerpt fed to trend analysis is clipped to
/// this many characters so fifty of them still fit one request.
pub const TREND_EXCERPT_CHAR_LIMIT: usize = 1_000;

pub fn trend_analysis_user_prompt(
    transcript_sections: &str,
    training_sections: &str,
    insight_lines: &str,
) -> String {
    format!(
        "\
Analyze the following coaching data to identify trends, patterns, and insights:

TRANSCRIPTS:
{transcript_sections}

TRAINING DATA:
{training_sections}

EXISTING INSIGHTS:
{insight_lines}

Please analyze this data and provide:
1. Trending topics with frequency and sentiment
2. Effective coaching patterns
3. Client insights and pain points
4. Actionable recommendations

Format as JSON with the following structure:
{{
  \"trendingTopics\": [{{\"topic\": \"string\", \"frequency\": number, \"sentiment\": \"positive|negative|neutral\", \"trendDirection\": \"up|down|stable\", \"confidence\": number}}],
  \"coachingPatterns\": [{{\"pattern\": \"string\", \"effectiveness\": number, \"frequency\": number, \"description\": \"string\"}}],
  \"clientInsights\": [{{\"insight\": \"string\", \"category\": \"pain_point|opportunity|success_pattern|risk\", \"severity\": \"low|medium|high|critical\", \"confidence\": number}}],
  \"recommendations\": [{{\"recommendation\": \"string\", \"priority\": \"low|medium|high\", \"impact\": \"string\", \"action\": \"string\"}}]
}}"
    )
}

pub const INSIGHT_GENERATION_SYSTEM_PROMPT: &str = "You are an expert coaching consultant \
    analyzing trends to generate actionable insights.";

pub fn insight_generation_user_prompt(trend_data_json: &str) -> String {
    format!(
        "\
Based on this trend analysis data, generate a specific, actionable insight for a coach:

{trend_data_json}

Provide:
1. A clear, specific insight
2. The category (pain_point, opportunity, success_pattern, or risk)
3. Severity level
4. Recommended action
5. Expected impact

Format as JSON with these exact keys: insight, category, severity, action, impact"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefill_prompt_truncates_the_source() {
        let source = "s".repeat(20_000);
        let prompt = prefill_user_prompt(&source);
        let body_start = prompt.find("SOURCE START\n").unwrap() + "SOURCE START\n".len();
        let body_end = prompt.find("\nSOURCE END").unwrap();
        assert_eq!(body_end - body_start, PREFILL_SOURCE_CHAR_LIMIT);
    }

    #[test]
    fn prefill_prompt_lists_every_question() {
        let prompt = prefill_user_prompt("short source");
        for question in QUESTIONS {
            assert!(prompt.contains(question));
        }
    }
}
