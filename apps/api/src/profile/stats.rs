use serde::Serialize;

use crate::models::profile::{ActivitySummary, SkillLevel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentStats {
    pub total: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodingStats {
    pub total_submissions: i64,
    pub passed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewStats {
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillsAnalysis {
    #[serde(rename = "Python")]
    pub python: SkillLevel,
    #[serde(rename = "Problem Solving")]
    pub problem_solving: SkillLevel,
    #[serde(rename = "Communication")]
    pub communication: SkillLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub assessments: AssessmentStats,
    pub coding: CodingStats,
    pub interviews: InterviewStats,
    /// Assessments taken plus coding problems passed.
    pub total_completed: i64,
    pub skills_analysis: SkillsAnalysis,
}

pub fn build_stats(activity: &ActivitySummary) -> ProfileStats {
    let total = activity.assessment_scores.len();
    let average_score = if total == 0 {
        0.0
    } else {
        activity.assessment_scores.iter().map(|s| f64::from(*s)).sum::<f64>() / total as f64
    };

    ProfileStats {
        assessments: AssessmentStats {
            total,
            average_score,
        },
        coding: CodingStats {
            total_submissions: activity.coding_submissions,
            passed: activity.coding_passed,
        },
        interviews: InterviewStats {
            total: activity.interviews,
        },
        total_completed: total as i64 + activity.coding_passed,
        skills_analysis: SkillsAnalysis {
            python: level(activity.coding_passed as f64, 5.0, 2.0),
            problem_solving: level(average_score, 80.0, 50.0),
            communication: activity
                .latest_interview_score
                .map_or(SkillLevel::Beginner, |score| level(f64::from(score), 80.0, 60.0)),
        },
    }
}

/// Strictly above `advanced` is Advanced, strictly above `intermediate` is Intermediate.
fn level(value: f64, advanced: f64, intermediate: f64) -> SkillLevel {
    if value > advanced {
        SkillLevel::Advanced
    } else if value > intermediate {
        SkillLevel::Intermediate
    } else {
        SkillLevel::Beginner
    }
}
