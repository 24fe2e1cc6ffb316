//! Gamification panel: user statistics, points, level and achievements.
//!
//! # Invariants
//! - Points are `5·created + 10·completed + 15·categories + 20·days_active`.
//! - Level is `points / 100 + 1`.
//! - Achievements are derived on every call; nothing is persisted.

use crate::audience::AudienceMode;
use crate::model::note::{Note, NoteStatus, Priority};
use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

const POINTS_PER_LEVEL: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub points: u32,
}

const STUDENT_ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_note",
        title: "First Note!",
        description: "Created your very first note!",
        points: 10,
    },
    Achievement {
        id: "note_master",
        title: "Note Master",
        description: "Created 10 notes!",
        points: 50,
    },
    Achievement {
        id: "organized",
        title: "Super Organized",
        description: "Used 5 different categories!",
        points: 30,
    },
    Achievement {
        id: "priority_pro",
        title: "Priority Pro",
        description: "Set priority on 10 notes!",
        points: 25,
    },
];

const PROFESSIONAL_ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_note",
        title: "Getting Started",
        description: "Created your first note",
        points: 10,
    },
    Achievement {
        id: "productivity_boost",
        title: "Productivity Boost",
        description: "Completed 25 tasks",
        points: 100,
    },
];

/// Raw counters behind the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub notes_created: usize,
    pub notes_completed: usize,
    pub categories_used: usize,
    /// Notes whose priority was moved off the `medium` default.
    pub prioritized_notes: usize,
    /// Distinct UTC days with at least one note created or edited.
    pub days_active: usize,
}

impl UserStats {
    pub fn from_notes(notes: &[Note]) -> Self {
        let categories: BTreeSet<&str> = notes
            .iter()
            .filter_map(|note| note.category.as_deref())
            .collect();
        let days: BTreeSet<NaiveDate> = notes
            .iter()
            .flat_map(|note| [note.created_date, note.updated_date])
            .filter_map(epoch_ms_to_day)
            .collect();

        Self {
            notes_created: notes.len(),
            notes_completed: notes
                .iter()
                .filter(|note| note.status == NoteStatus::Completed)
                .count(),
            categories_used: categories.len(),
            prioritized_notes: notes
                .iter()
                .filter(|note| note.priority != Priority::Medium)
                .count(),
            days_active: days.len(),
        }
    }

    pub fn points(&self) -> u64 {
        5 * self.notes_created as u64
            + 10 * self.notes_completed as u64
            + 15 * self.categories_used as u64
            + 20 * self.days_active as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub stats: UserStats,
    pub points: u64,
    pub level: u64,
    /// Points still needed to reach the next level.
    pub points_to_next_level: u64,
    pub achievements: Vec<Achievement>,
}

pub fn achievements_for(audience: AudienceMode) -> &'static [Achievement] {
    match audience {
        AudienceMode::Professional => PROFESSIONAL_ACHIEVEMENTS,
        AudienceMode::Student => STUDENT_ACHIEVEMENTS,
    }
}

fn is_unlocked(achievement: &Achievement, stats: &UserStats) -> bool {
    match achievement.id {
        "first_note" => stats.notes_created >= 1,
        "note_master" => stats.notes_created >= 10,
        "organized" => stats.categories_used >= 5,
        "priority_pro" => stats.prioritized_notes >= 10,
        "productivity_boost" => stats.notes_completed >= 25,
        _ => false,
    }
}

pub fn progress(notes: &[Note], audience: AudienceMode) -> Progress {
    let stats = UserStats::from_notes(notes);
    let points = stats.points();
    let level = points / POINTS_PER_LEVEL + 1;
    Progress {
        stats,
        points,
        level,
        points_to_next_level: level * POINTS_PER_LEVEL - points,
        achievements: achievements_for(audience)
            .iter()
            .filter(|achievement| is_unlocked(achievement, &stats))
            .copied()
            .collect(),
    }
}

fn epoch_ms_to_day(epoch_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(epoch_ms).map(|moment| moment.date_naive())
}
