//! Seed fixtures for the shared guest/demo hierarchy.
//!
//! Users and categories are referenced by their position in the seed
//! lists; the bootstrap resolves positions to the ids the database assigns.

use chrono::{DateTime, Duration, Months, Utc};

use crate::task::TaskStatus;

/// Name of the guest user group
pub const GUEST_GROUP_NAME: &str = "Development";

#[derive(Debug, Clone, Copy)]
pub struct GuestUserSeed {
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct GuestTaskSeed {
    pub title: &'static str,
    pub description: &'static str,
    pub creator: usize,
    pub responsible: usize,
    pub category: usize,
    pub status: TaskStatus,
    pub estimate: i32,
    pub start: StartOffset,
}

/// Start date of a seeded task relative to the login time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOffset {
    Days(i64),
    Months(u32),
}

impl StartOffset {
    pub fn resolve(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            StartOffset::Days(days) => now + Duration::days(days),
            StartOffset::Months(months) => now
                .checked_add_months(Months::new(months))
                .unwrap_or(now),
        }
    }
}

/// Seed users. The first one is the identity a guest logs in as.
pub const GUEST_USERS: [GuestUserSeed; 3] = [
    GuestUserSeed {
        name: "Taro Yamada",
        email: "yamada@guest.lookback.invalid",
        password: "password123",
    },
    GuestUserSeed {
        name: "Hanako Sato",
        email: "sato@guest.lookback.invalid",
        password: "password456",
    },
    GuestUserSeed {
        name: "Ichiro Suzuki",
        email: "suzuki@guest.lookback.invalid",
        password: "password789",
    },
];

pub const GUEST_CATEGORIES: [&str; 2] = ["Bug Fixes", "New Features"];

pub const GUEST_TASKS: [GuestTaskSeed; 5] = [
    GuestTaskSeed {
        title: "Fix authentication issue",
        description: "Users cannot log in after the update",
        creator: 0,
        responsible: 0,
        category: 0,
        status: TaskStatus::NotStarted,
        estimate: 3,
        start: StartOffset::Days(1),
    },
    GuestTaskSeed {
        title: "Launch new marketing campaign",
        description: "Marketing for the summer sale",
        creator: 0,
        responsible: 1,
        category: 1,
        status: TaskStatus::InProgress,
        estimate: 10,
        start: StartOffset::Months(1),
    },
    GuestTaskSeed {
        title: "Financial audit",
        description: "Audit of the last quarter",
        creator: 0,
        responsible: 2,
        category: 1,
        status: TaskStatus::NotStarted,
        estimate: 15,
        start: StartOffset::Days(7),
    },
    GuestTaskSeed {
        title: "Data backup",
        description: "End of month data backup",
        creator: 2,
        responsible: 0,
        category: 0,
        status: TaskStatus::LookBack,
        estimate: 2,
        start: StartOffset::Days(0),
    },
    GuestTaskSeed {
        title: "Improve UI",
        description: "Make the interface more user friendly",
        creator: 1,
        responsible: 0,
        category: 1,
        status: TaskStatus::LookBack,
        estimate: 5,
        start: StartOffset::Days(-3),
    },
];
