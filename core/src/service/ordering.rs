use std::cmp::Ordering;

use crate::model::Task;

/// Display order: pending before completed, newest first within each group.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.is_completed()
        .cmp(&b.is_completed())
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}
