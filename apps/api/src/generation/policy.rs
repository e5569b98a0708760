//! Per-task generation policies.
//!
//! Assessment generation raises so the caller can show an actionable
//! configuration error. Every other task degrades to a renderable fallback.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Surface the failure to the caller.
    Raise,
    /// Resolve to the task's fallback payload.
    Degrade,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskPolicy {
    /// Name used in logs.
    pub task: &'static str,
    pub max_attempts: u32,
    /// Deadline for a single LLM call.
    pub timeout: Duration,
    pub temperature: f32,
    pub propagation: Propagation,
}

pub const DAILY_QUESTIONS: TaskPolicy = TaskPolicy {
    task: "daily_questions",
    max_attempts: 3,
    timeout: Duration::from_secs(60),
    temperature: 0.7,
    propagation: Propagation::Raise,
};

pub const CODING_PROBLEM: TaskPolicy = TaskPolicy {
    task: "coding_problem",
    max_attempts: 3,
    timeout: Duration::from_secs(8),
    temperature: 0.6,
    propagation: Propagation::Degrade,
};

pub const CODE_EVALUATION: TaskPolicy = TaskPolicy {
    task: "code_evaluation",
    max_attempts: 3,
    timeout: Duration::from_secs(30),
    temperature: 0.2,
    propagation: Propagation::Degrade,
};

pub const INTERVIEW_FOLLOWUP: TaskPolicy = TaskPolicy {
    task: "interview_followup",
    max_attempts: 3,
    timeout: Duration::from_secs(30),
    temperature: 0.7,
    propagation: Propagation::Degrade,
};

pub const INTERVIEW_FEEDBACK: TaskPolicy = TaskPolicy {
    task: "interview_feedback",
    max_attempts: 3,
    timeout: Duration::from_secs(45),
    temperature: 0.5,
    propagation: Propagation::Degrade,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Policies {
    pub daily_questions: TaskPolicy,
    pub coding_problem: TaskPolicy,
    pub code_evaluation: TaskPolicy,
    pub interview_followup: TaskPolicy,
    pub interview_feedback: TaskPolicy,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            daily_questions: DAILY_QUESTIONS,
            coding_problem: CODING_PROBLEM,
            code_evaluation: CODE_EVALUATION,
            interview_followup: INTERVIEW_FOLLOWUP,
            interview_feedback: INTERVIEW_FEEDBACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_assessment_generation_raises() {
        let policies = Policies::default();
        assert_eq!(policies.daily_questions.propagation, Propagation::Raise);
        for policy in [
            policies.coding_problem,
            policies.code_evaluation,
            policies.interview_followup,
            policies.interview_feedback,
        ] {
            assert_eq!(policy.propagation, Propagation::Degrade, "{}", policy.task);
        }
    }

    #[test]
    fn test_structured_tasks_run_cooler_than_question_generation() {
        let policies = Policies::default();
        assert!(policies.code_evaluation.temperature < policies.daily_questions.temperature);
        assert!(policies.coding_problem.temperature < policies.daily_questions.temperature);
    }

    #[test]
    fn test_attempt_budgets_and_deadlines_are_bounded() {
        let policies = Policies::default();
        for policy in [
            policies.daily_questions,
            policies.coding_problem,
            policies.code_evaluation,
            policies.interview_followup,
            policies.interview_feedback,
        ] {
            assert!((1..=3).contains(&policy.max_attempts), "{}", policy.task);
            assert!(policy.timeout >= Duration::from_secs(8), "{}", policy.task);
            assert!(policy.timeout <= Duration::from_secs(60), "{}", policy.task);
        }
    }
}
