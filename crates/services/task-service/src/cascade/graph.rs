//! Ownership graph and the deletion plans derived from it.
//!
//! The graph lists which tables reference which, and through which
//! columns. Plans are computed from it once and cached: for a root kind
//! the plan holds one step per path from a dependent table up to the
//! root, ordered so that rows are always deleted before the rows they
//! reference.

use std::fmt;

use once_cell::sync::Lazy;

/// Primary key column shared by every table
pub const PRIMARY_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    UserGroup,
    User,
    Category,
    Task,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::UserGroup,
        EntityKind::User,
        EntityKind::Category,
        EntityKind::Task,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::UserGroup => "user_groups",
            EntityKind::User => "users",
            EntityKind::Category => "categories",
            EntityKind::Task => "tasks",
        }
    }

    fn index(self) -> usize {
        match self {
            EntityKind::UserGroup => 0,
            EntityKind::User => 1,
            EntityKind::Category => 2,
            EntityKind::Task => 3,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// `child` rows reference `parent` rows through any of `columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub child: EntityKind,
    pub parent: EntityKind,
    pub columns: &'static [&'static str],
}

/// Every foreign key of the schema.
pub static DEPENDENCIES: [Dependency; 4] = [
    Dependency {
        child: EntityKind::Task,
        parent: EntityKind::User,
        columns: &["creator_user_id", "responsible_user_id"],
    },
    Dependency {
        child: EntityKind::Task,
        parent: EntityKind::Category,
        columns: &["category_id"],
    },
    Dependency {
        child: EntityKind::User,
        parent: EntityKind::UserGroup,
        columns: &["user_group_id"],
    },
    Dependency {
        child: EntityKind::Category,
        parent: EntityKind::UserGroup,
        columns: &["user_group_id"],
    },
];

static DELETION_ORDER: Lazy<Vec<EntityKind>> = Lazy::new(|| topological_order(&DEPENDENCIES));

static PLANS: Lazy<Vec<CascadePlan>> = Lazy::new(|| {
    EntityKind::ALL
        .iter()
        .map(|&root| CascadePlan::build(root, &DEPENDENCIES))
        .collect()
});

/// Kinds ordered so that every kind comes after all kinds referencing it.
pub fn deletion_order() -> &'static [EntityKind] {
    &DELETION_ORDER
}

fn topological_order(deps: &[Dependency]) -> Vec<EntityKind> {
    let mut remaining = EntityKind::ALL.to_vec();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        // Ready once no remaining kind still references it
        let ready: Vec<EntityKind> = remaining
            .iter()
            .copied()
            .filter(|&kind| {
                !deps
                    .iter()
                    .any(|d| d.parent == kind && remaining.contains(&d.child))
            })
            .collect();

        if ready.is_empty() {
            // A cycle cannot be ordered; keep declaration order for the rest
            order.append(&mut remaining);
            break;
        }

        remaining.retain(|kind| !ready.contains(kind));
        order.extend(ready);
    }

    order
}

/// One `DELETE` of a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionStep {
    pub kind: EntityKind,
    /// Hops from `kind` up to the plan root. Empty for the root itself.
    pub path: Vec<Dependency>,
}

/// Ordered deletion steps for one root kind.
#[derive(Debug, Clone)]
pub struct CascadePlan {
    root: EntityKind,
    steps: Vec<DeletionStep>,
}

impl CascadePlan {
    /// Cached plan for a root kind.
    pub fn for_root(root: EntityKind) -> &'static CascadePlan {
        &PLANS[root.index()]
    }

    fn build(root: EntityKind, deps: &[Dependency]) -> Self {
        let mut steps = Vec::new();
        collect_steps(root, Vec::new(), deps, &mut steps);

        let order = topological_order(deps);
        let rank = |kind: EntityKind| order.iter().position(|k| *k == kind).unwrap_or(usize::MAX);
        steps.sort_by_key(|step| rank(step.kind));

        Self { root, steps }
    }

    pub fn root(&self) -> EntityKind {
        self.root
    }

    pub fn steps(&self) -> &[DeletionStep] {
        &self.steps
    }
}

fn collect_steps(
    kind: EntityKind,
    path: Vec<Dependency>,
    deps: &[Dependency],
    steps: &mut Vec<DeletionStep>,
) {
    for dep in deps.iter().filter(|d| d.parent == kind) {
        let mut child_path = Vec::with_capacity(path.len() + 1);
        child_path.push(*dep);
        child_path.extend(path.iter().copied());
        collect_steps(dep.child, child_path, deps, steps);
    }
    steps.push(DeletionStep { kind, path });
}
