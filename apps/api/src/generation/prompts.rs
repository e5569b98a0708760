// LLM prompt constants for question generation, coding problems and code judging.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for the daily assessment batch.
pub const QUESTIONS_SYSTEM: &str = "You are a technical interviewer. \
    Return strictly valid JSON array only.";

/// Daily assessment prompt. Replace: {requirements}, {format_lines}, {raw_json_instruction}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate a daily technical assessment for a Full Stack Developer.

Requirements:
{requirements}

Response Format (JSON Array):
[
{format_lines}
]

{raw_json_instruction}"#;

/// One MCQ requirement line. Replace: {count}, {label}, {focus}
pub const MCQ_REQUIREMENT: &str =
    r#"EXACTLY {count} Multiple Choice Questions (MCQs) covering "{label}" (this batch focuses on {focus})."#;

/// Subjective requirement line. Replace: {count}, {label}, {focus}
pub const SUBJECTIVE_REQUIREMENT: &str =
    r#"EXACTLY {count} Subjective Question covering "{label}" (this batch focuses on {focus})."#;

/// Example MCQ item. Replace: {label}
pub const MCQ_FORMAT_LINE: &str = r#"    {"category": "{label}", "type": "mcq", "text": "Question?", "options": ["A", "B", "C", "D"], "correct_answer": "Correct Option Text"},"#;

/// Example subjective item. Replace: {label}
pub const SUBJECTIVE_FORMAT_LINE: &str = r#"    {"category": "{label}", "type": "subjective", "text": "Question?", "options": [], "correct_answer": "Model Answer"}"#;

/// System prompt for coding-problem generation.
pub const CODING_SYSTEM: &str = "You are a JSON generator. Output strictly valid JSON only.";

/// Coding-problem prompt. Replace: {theme}, {raw_json_instruction}
pub const CODING_PROMPT_TEMPLATE: &str = r#"Generate a single unique coding interview problem about {theme}.

Return ONLY a raw JSON object with this exact structure:
{
    "title": "Short Title",
    "description": "Problem statement...",
    "difficulty": "Easy/Medium/Hard",
    "test_cases": [
        {"input": "arg1, arg2", "output": "result"},
        {"input": "arg1, arg2", "output": "result"}
    ]
}

{raw_json_instruction}"#;

/// System prompt for code judging.
pub const EVALUATION_SYSTEM: &str = "You are a code judge. Return strictly valid JSON only.";

/// Code judging prompt. Replace: {problem_title}, {language}, {code}, {raw_json_instruction}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are a strict code judge and compiler.

Problem: {problem_title}
Language: {language}

Code:
{code}

Task:
1. Analyze the code for Correctness, Time Complexity, and Space Complexity.
2. Check for Syntax Errors.
3. Simulate running against 3-4 edge cases.
4. Provide a detailed, structured output.

Response Format (JSON):
{
    "status": "success" or "error",
    "output": "Detailed console output...",
    "analysis": {
        "correctness": "Passed/Failed",
        "time_complexity": "O(...)",
        "space_complexity": "O(...)",
        "feedback": "Brief feedback on code quality..."
    }
}

{raw_json_instruction}"#;
