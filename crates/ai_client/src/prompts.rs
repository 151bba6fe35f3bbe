//! Prompt templates for the dashboard's ask/analyze features.
//!
//! The model only ever receives serialized record data and returns free
//! text; nothing downstream computes with its output.

use crate::AnalysisOutput;

pub const BIDS_ANALYST_SYSTEM: &str = "You are a helpful data analyst. Your task is to answer a question based on the provided bids data.
Analyze the data carefully and provide a clear, concise answer to the user's question.
Base your answer ONLY on the data provided. Do not make up information. If the data does not contain the answer, say so.

Context on the data columns:
- 'bidSubmission' represents the total number of bids submitted for a given month. This is the denominator for calculating win rates.
- 'won', 'lost', 'cancelled', 'dropped' represent the outcomes of bids.
- If the user asks for a \"win rate\" or \"win ratio\", you should calculate it by dividing the total 'won' bids by the total 'bidSubmission' bids and express it as a percentage.";

pub const CSD_ANALYST_SYSTEM: &str = "You are a helpful data analyst. Your task is to answer a question based on the provided call-center and inventory data.
Analyze the data carefully and provide a clear, concise answer to the user's question.
Base your answer ONLY on the data provided. Do not make up information. If the data does not contain the answer, say so.

Context on the data columns:
- 'totalCalls' and 'cancelledCalls' describe call volume per service center per month.
- 'available', 'occupied' and 'inTransit' describe inventory value per service center per month; numbers may be comma-formatted.";

pub const OPERATIONS_EXPERT_SYSTEM: &str = "You are a service center operations expert. Analyze the given month and service center data and provide trend analysis and optimization suggestions.
Respond in exactly two sections, introduced by the lines 'Trend Analysis:' and 'Optimization Suggestions:'.
Focus on actions that the service center manager could take this month to improve performance.";

const TREND_HEADING: &str = "Trend Analysis:";
const SUGGESTIONS_HEADING: &str = "Optimization Suggestions:";

pub fn bids_question(question: &str, bids_json: &str) -> String {
    format!(
        "Data:\n```json\n{bids_json}\n```\n\nQuestion:\n\"{question}\"\n\nAnswer the question based on the data."
    )
}

pub fn csd_question(question: &str, calls_json: &str, inventory_json: &str) -> String {
    format!(
        "Calls Data:\n```json\n{calls_json}\n```\n\nInventory Data:\n```json\n{inventory_json}\n```\n\nQuestion:\n\"{question}\"\n\nAnswer the question based on the data."
    )
}

pub fn center_analysis(
    month: &str,
    service_center: &str,
    calls_summary: &str,
    inventory_summary: &str,
) -> String {
    format!(
        "Month: {month}\nService Center: {service_center}\nCalls Data: {calls_summary}\nInventory Data: {inventory_summary}\n\nBased on this information, provide a detailed trend analysis and specific, actionable suggestions for optimizing calls, cancellations, and inventory management at the service center."
    )
}

/// Splits a free-text answer into the two expected sections. The model is a
/// best-effort collaborator: when the headings are missing the whole text
/// becomes the trend analysis and the suggestions stay empty.
pub fn split_analysis(answer: &str) -> AnalysisOutput {
    let Some(suggestions_at) = answer.find(SUGGESTIONS_HEADING) else {
        return AnalysisOutput {
            trend_analysis: strip_heading(answer, TREND_HEADING),
            optimization_suggestions: String::new(),
        };
    };

    let (trend_part, suggestions_part) = answer.split_at(suggestions_at);
    AnalysisOutput {
        trend_analysis: strip_heading(trend_part, TREND_HEADING),
        optimization_suggestions: strip_heading(suggestions_part, SUGGESTIONS_HEADING),
    }
}

fn strip_heading(text: &str, heading: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix(heading)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
