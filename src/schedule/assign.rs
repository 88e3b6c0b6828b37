use std::cmp::Reverse;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::grid::Grid;
use super::availability::{is_available, Roster};
use super::priority::priority_list;
use super::types::{AssignmentState, Lesson};

/// Indices of `lessons` in processing order: highest priority score first,
/// ties kept in template scan order
pub fn processing_order(lessons: &[Lesson]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..lessons.len()).collect();
    // sort_by_key is stable
    order.sort_by_key(|&i| Reverse(lessons[i].priority_score()));
    order
}

/// Assigns a teacher to as many lessons as possible.
///
/// Lessons are handled greedily in [`processing_order`]; an earlier lesson's
/// teacher is never taken back. For each lesson the ranked priority list is
/// walked first, then the rest of the roster in column order. A lesson whose
/// code has no priority list, or for which nobody is free, stays unassigned.
///
/// `lessons` keeps its original order; only `assigned_teacher` changes.
pub fn assign_teachers(
    lessons: &mut [Lesson],
    roster: &Roster,
    priority_table: &Grid,
    config: &Config,
) -> AssignmentState {
    let mut state = AssignmentState::new();
    let order = processing_order(lessons);

    for (rank, &i) in order.iter().enumerate() {
        let lesson = &lessons[i];
        debug!(
            rank = rank + 1,
            code = %lesson.code,
            period = %lesson.period,
            score = lesson.priority_score(),
            "lesson order"
        );
    }

    for &i in &order {
        let lesson = &mut lessons[i];
        let period = lesson.period;

        let candidates = match priority_list(lesson.code, priority_table, &config.priority) {
            Some(list) if !list.is_empty() => list,
            _ => {
                warn!(code = %lesson.code, %period, "no priority list for lesson, leaving it unassigned");
                continue;
            }
        };

        // Ranked candidates first
        let mut chosen = candidates
            .iter()
            .find(|name| is_available(name, roster, &state, period, &config.markers))
            .cloned();

        // Then anyone else on the roster who is free
        if chosen.is_none() {
            debug!(code = %lesson.code, %period, "priority list exhausted, searching the roster");
            chosen = roster
                .entries()
                .iter()
                .filter(|entry| !candidates.contains(&entry.name))
                .find(|entry| is_available(&entry.name, roster, &state, period, &config.markers))
                .map(|entry| entry.name.clone());

            if let Some(name) = &chosen {
                info!(code = %lesson.code, %period, teacher = %name, "assigned teacher outside the priority list");
            }
        }

        match chosen {
            Some(name) => {
                info!(code = %lesson.code, %period, teacher = %name, "assigned teacher");
                state.commit(period, &name);
                lesson.assigned_teacher = Some(name);
            }
            None => {
                warn!(code = %lesson.code, %period, "no available teacher for lesson");
            }
        }
    }

    state
}
