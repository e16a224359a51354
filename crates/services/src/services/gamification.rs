use db::models::task::Task;
use db::types::Difficulty;
use serde::Serialize;

pub const MIN_TASK_XP: i64 = 5;
pub const EFFICIENCY_BONUS_XP: i64 = 5;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Reward {
    pub xp: i64,
    pub achievements: Vec<String>,
}

fn base_xp(difficulty: Difficulty) -> i64 {
    match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Medium => 15,
        Difficulty::Hard => 25,
    }
}

/// XP for one completion. Beating the estimate by more than 20% earns a
/// bonus, running more than 20% over costs one, and the result never drops
/// below the minimum.
pub fn compute_xp(
    difficulty: Difficulty,
    estimated_minutes: Option<i32>,
    actual_minutes: Option<i32>,
) -> i64 {
    let mut xp = base_xp(difficulty);
    if let (Some(estimated), Some(actual)) = (estimated_minutes, actual_minutes) {
        let efficiency = f64::from(estimated) / f64::from(actual.max(1));
        if efficiency > 1.2 {
            xp += EFFICIENCY_BONUS_XP;
        } else if efficiency < 0.8 {
            xp -= EFFICIENCY_BONUS_XP;
        }
    }
    xp.max(MIN_TASK_XP)
}

/// Achievements unlocked by this completion. `completed_count` is the
/// owner's done-task total including the task just completed.
pub fn achievements(task: &Task, completed_count: u64) -> Vec<String> {
    let mut unlocked = Vec::new();
    if completed_count == 1 {
        unlocked.push("First Task Completed".to_string());
    }
    if completed_count == 10 {
        unlocked.push("Productivity Pro".to_string());
    }
    if task.difficulty == Difficulty::Hard {
        unlocked.push("Challenge Accepted".to_string());
    }
    if let (Some(estimated), Some(actual)) = (task.estimated_minutes, task.actual_minutes)
        && (estimated - actual).abs() <= 5
    {
        unlocked.push("Time Management Expert".to_string());
    }
    unlocked
}

pub fn compute_reward(task: &Task, completed_count: u64) -> Reward {
    Reward {
        xp: compute_xp(task.difficulty, task.estimated_minutes, task.actual_minutes),
        achievements: achievements(task, completed_count),
    }
}
