//! The fixed bank of 30 brand-voice questions a coach answers to train
//! their assistant. Indexed 1..=30 everywhere in the API; the order and
//! text are stable and treated as data, not configuration.

pub const QUESTION_COUNT: usize = 30;

pub const QUESTIONS: [&str; QUESTION_COUNT] = [
    "What is your origin story as a coach, and what moment made you commit to this work?",
    "Describe your ideal client in detail: who they are, what they struggle with, and what they want.",
    "What transformation do you promise clients, and how do you describe it in your own words?",
    "Walk through your coaching methodology step by step, from first call to final result.",
    "What beliefs about your field do you hold that most other coaches would disagree with?",
    "How do you explain complex concepts to a beginner? Give an example in your own voice.",
    "What are the three biggest mistakes you see clients make, and how do you correct each one?",
    "Describe your tone of voice: how do you sound when you motivate, when you teach, and when you push back?",
    "What phrases, metaphors, or signature expressions do you use constantly?",
    "What topics or advice will you never give, and why?",
    "Tell a client success story exactly the way you would tell it on a sales call.",
    "How do you handle a client who is not following the program? Write your actual response.",
    "What does your check-in process look like, and what do you ask clients every week?",
    "How do you price and position your offers, and how do you justify the investment?",
    "What objections do you hear most often, and how do you answer each one?",
    "Describe your content style on social media: formats, hooks, and calls to action you rely on.",
    "What daily habits or non-negotiables do you hold clients to?",
    "How do you assess a new client in the first session? List the exact questions you ask.",
    "What does a typical week of working with you look like for a client?",
    "How do you talk about setbacks and plateaus with clients?",
    "What results can a client expect at 30, 60, and 90 days?",
    "What is your philosophy on accountability, and how do you enforce it?",
    "Describe the biggest client failure you have seen and what you learned from it.",
    "How do you celebrate client wins, and what do you say when they hit a milestone?",
    "What boundaries do you keep with clients, and how do you communicate them?",
    "How do you stay current in your field, and which sources do you trust?",
    "What would a client say about you after six months of working together?",
    "How do you open and close a coaching call? Write your actual script.",
    "What makes your approach different from every other coach in your niche?",
    "If a stranger asked what you do, how would you answer in two sentences?",
];

/// Returns the text for a 1-based question index, or `None` when the index
/// is outside 1..=30.
pub fn question_text(index: u32) -> Option<&'static str> {
    if index == 0 {
        return None;
    }
    QUESTIONS.get(index as usize - 1).copied()
}

/// Validates a 1-based question index at the API boundary. The answer store
/// itself would accept any integer, so out-of-range indices are rejected
/// before they reach it.
pub fn validate_index(index: u32) -> Result<(), crate::errors::AssistantError> {
    if question_text(index).is_some() {
        Ok(())
    } else {
        Err(crate::errors::AssistantError::QuestionIndexOutOfRange(index))
    }
}
