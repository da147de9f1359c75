//! SQLite-based storage for habits and goals.
//!
//! Every read and write is scoped by owner: a record that belongs to someone
//! else behaves exactly like a missing one.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::goal::{Goal, GoalPatch};
use crate::habit::{CompletionRecord, Habit, HabitPatch, ToggleOutcome};
use crate::streak;

/// How long a connection waits for another writer to release the lock.
const BUSY_TIMEOUT_MS: u64 = 5_000;

const HABIT_COLUMNS: &str = "id, owner, name, icon, color, completed_dates, current_streak, \
                             longest_streak, created_at, updated_at";

const GOAL_COLUMNS: &str = "id, owner, title, description, category, progress, target_date, \
                            status, created_at, updated_at";

// === Row decoding ===

/// Habit columns as stored, before validation.
struct HabitRow {
    id: String,
    owner: String,
    name: String,
    icon: String,
    color: String,
    completed_dates: String,
    current_streak: u32,
    longest_streak: u32,
    created_at: String,
    updated_at: String,
}

impl HabitRow {
    fn read(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            name: row.get(2)?,
            icon: row.get(3)?,
            color: row.get(4)?,
            completed_dates: row.get(5)?,
            current_streak: row.get(6)?,
            longest_streak: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_habit(self) -> Result<Habit, DatabaseError> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            id: self.id.clone(),
            message,
        };
        let raw_dates: Vec<String> =
            serde_json::from_str(&self.completed_dates).map_err(|e| corrupt(e.to_string()))?;
        let (completed_dates, duplicates) =
            CompletionRecord::from_persisted(&raw_dates).map_err(|e| corrupt(e.to_string()))?;
        if duplicates > 0 {
            tracing::warn!(habit = %self.id, duplicates, "collapsed duplicate completion dates");
        }

        Ok(Habit {
            icon: self.icon.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?,
            color: self.color.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?,
            created_at: parse_timestamp(&self.created_at).map_err(&corrupt)?,
            updated_at: parse_timestamp(&self.updated_at).map_err(&corrupt)?,
            completed_dates,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            name: self.name,
            owner: self.owner,
            id: self.id.clone(),
        })
    }
}

/// Goal columns as stored, before validation.
struct GoalRow {
    id: String,
    owner: String,
    title: String,
    description: Option<String>,
    category: String,
    progress: i64,
    target_date: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl GoalRow {
    fn read(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            progress: row.get(5)?,
            target_date: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_goal(self) -> Result<Goal, DatabaseError> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            id: self.id.clone(),
            message,
        };
        let target_date = self
            .target_date
            .as_deref()
            .map(streak::parse_day)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(Goal {
            category: self.category.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?,
            status: self.status.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?,
            progress: crate::goal::clamp_progress(self.progress),
            created_at: parse_timestamp(&self.created_at).map_err(&corrupt)?,
            updated_at: parse_timestamp(&self.updated_at).map_err(&corrupt)?,
            target_date,
            description: self.description,
            title: self.title,
            owner: self.owner,
            id: self.id.clone(),
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{value}': {e}"))
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn format_target_date(value: Option<NaiveDate>) -> Option<String> {
    value.map(streak::format_day)
}

// === Statement helpers shared by plain calls and transactions ===

fn select_habit(conn: &Connection, owner: &str, id: &str) -> Result<Option<Habit>> {
    let row = conn
        .query_row(
            &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1 AND owner = ?2"),
            params![id, owner],
            HabitRow::read,
        )
        .optional()?;
    Ok(row.map(HabitRow::into_habit).transpose()?)
}

fn write_habit(conn: &Connection, habit: &Habit) -> Result<usize> {
    let dates = serde_json::to_string(&habit.completed_dates.to_persisted())?;
    let changed = conn.execute(
        "UPDATE habits
         SET name = ?1, icon = ?2, color = ?3, completed_dates = ?4,
             current_streak = ?5, longest_streak = ?6, updated_at = ?7
         WHERE id = ?8 AND owner = ?9",
        params![
            habit.name,
            habit.icon.name(),
            habit.color.as_str(),
            dates,
            habit.current_streak,
            habit.longest_streak,
            format_timestamp(habit.updated_at),
            habit.id,
            habit.owner,
        ],
    )?;
    Ok(changed)
}

fn select_goal(conn: &Connection, owner: &str, id: &str) -> Result<Option<Goal>> {
    let row = conn
        .query_row(
            &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1 AND owner = ?2"),
            params![id, owner],
            GoalRow::read,
        )
        .optional()?;
    Ok(row.map(GoalRow::into_goal).transpose()?)
}

fn write_goal(conn: &Connection, goal: &Goal) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE goals
         SET title = ?1, description = ?2, category = ?3, progress = ?4,
             target_date = ?5, status = ?6, updated_at = ?7
         WHERE id = ?8 AND owner = ?9",
        params![
            goal.title,
            goal.description,
            goal.category.as_str(),
            goal.progress,
            format_target_date(goal.target_date),
            goal.status.as_str(),
            format_timestamp(goal.updated_at),
            goal.id,
            goal.owner,
        ],
    )?;
    Ok(changed)
}

/// SQLite database holding habits and goals.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/habitflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitflow.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Writers from other processes wait on the lock instead of failing.
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Habit CRUD ===

    /// Insert a new habit.
    pub fn create_habit(&self, habit: &Habit) -> Result<()> {
        let dates = serde_json::to_string(&habit.completed_dates.to_persisted())?;
        self.conn.execute(
            &format!("INSERT INTO habits ({HABIT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            params![
                habit.id,
                habit.owner,
                habit.name,
                habit.icon.name(),
                habit.color.as_str(),
                dates,
                habit.current_streak,
                habit.longest_streak,
                format_timestamp(habit.created_at),
                format_timestamp(habit.updated_at),
            ],
        )?;
        tracing::debug!(habit = %habit.id, owner = %habit.owner, "habit created");
        Ok(())
    }

    /// Get one habit owned by `owner`.
    pub fn get_habit(&self, owner: &str, id: &str) -> Result<Option<Habit>> {
        select_habit(&self.conn, owner, id)
    }

    /// List the habits of `owner`, newest first.
    pub fn list_habits(&self, owner: &str) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE owner = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
            .query_map(params![owner], HabitRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|row| row.into_habit().map_err(CoreError::from))
            .collect()
    }

    /// Apply `patch` to a habit and persist it.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if `owner` has no habit `id`.
    pub fn update_habit(&self, owner: &str, id: &str, patch: HabitPatch) -> Result<Habit> {
        let mut habit = select_habit(&self.conn, owner, id)?
            .ok_or_else(|| CoreError::habit_not_found(id))?;
        habit.apply(patch)?;
        write_habit(&self.conn, &habit)?;
        Ok(habit)
    }

    /// Delete a habit.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if `owner` has no habit `id`.
    pub fn delete_habit(&self, owner: &str, id: &str) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        if deleted == 0 {
            return Err(CoreError::habit_not_found(id));
        }
        Ok(())
    }

    /// Flip completion of `date` for a habit and persist the new streak.
    ///
    /// The read-modify-write runs in an immediate transaction so concurrent
    /// togglers serialize on the write lock.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if `owner` has no habit `id`.
    pub fn toggle_habit(
        &mut self,
        owner: &str,
        id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(Habit, ToggleOutcome)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut habit = select_habit(&tx, owner, id)?.ok_or_else(|| CoreError::habit_not_found(id))?;
        let outcome = habit.toggle(date, today);
        write_habit(&tx, &habit)?;
        tx.commit()?;

        tracing::debug!(
            habit = %habit.id,
            date = %date,
            ?outcome,
            current_streak = habit.current_streak,
            longest_streak = habit.longest_streak,
            "habit toggled"
        );
        Ok((habit, outcome))
    }

    // === Goal CRUD ===

    /// Insert a new goal.
    pub fn create_goal(&self, goal: &Goal) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO goals ({GOAL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            params![
                goal.id,
                goal.owner,
                goal.title,
                goal.description,
                goal.category.as_str(),
                goal.progress,
                format_target_date(goal.target_date),
                goal.status.as_str(),
                format_timestamp(goal.created_at),
                format_timestamp(goal.updated_at),
            ],
        )?;
        tracing::debug!(goal = %goal.id, owner = %goal.owner, "goal created");
        Ok(())
    }

    /// Get one goal owned by `owner`.
    pub fn get_goal(&self, owner: &str, id: &str) -> Result<Option<Goal>> {
        select_goal(&self.conn, owner, id)
    }

    /// List the goals of `owner`, newest first.
    pub fn list_goals(&self, owner: &str) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE owner = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
            .query_map(params![owner], GoalRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|row| row.into_goal().map_err(CoreError::from))
            .collect()
    }

    /// Apply `patch` to a goal and persist it.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if `owner` has no goal `id`.
    pub fn update_goal(&self, owner: &str, id: &str, patch: GoalPatch) -> Result<Goal> {
        let mut goal = select_goal(&self.conn, owner, id)?
            .ok_or_else(|| CoreError::goal_not_found(id))?;
        goal.apply(patch)?;
        write_goal(&self.conn, &goal)?;
        Ok(goal)
    }

    /// Delete a goal.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if `owner` has no goal `id`.
    pub fn delete_goal(&self, owner: &str, id: &str) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM goals WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        if deleted == 0 {
            return Err(CoreError::goal_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{GoalCategory, GoalStatus};
    use crate::habit::{HabitColor, HabitIcon};
    use chrono::Duration;

    const OWNER: &str = "alice@example.com";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn new_habit(name: &str) -> Habit {
        Habit::new(OWNER, name, HabitIcon::Heart, HabitColor::new("#10b981").unwrap()).unwrap()
    }

    #[test]
    fn habit_create_and_get() {
        let db = Database::open_memory().unwrap();
        let habit = new_habit("Stretch");
        db.create_habit(&habit).unwrap();

        let loaded = db.get_habit(OWNER, &habit.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Stretch");
        assert_eq!(loaded.icon, HabitIcon::Heart);
        assert_eq!(loaded.color.as_str(), "#10b981");
        assert!(loaded.completed_dates.is_empty());
    }

    #[test]
    fn other_owner_cannot_see_habit() {
        let db = Database::open_memory().unwrap();
        let habit = new_habit("Stretch");
        db.create_habit(&habit).unwrap();

        assert!(db.get_habit("mallory", &habit.id).unwrap().is_none());
        assert!(db.list_habits("mallory").unwrap().is_empty());
        assert!(matches!(
            db.delete_habit("mallory", &habit.id),
            Err(CoreError::NotFound { .. })
        ));
        assert!(db.get_habit(OWNER, &habit.id).unwrap().is_some());
    }

    #[test]
    fn list_habits_newest_first() {
        let db = Database::open_memory().unwrap();
        let mut older = new_habit("Older");
        older.created_at = Utc::now() - Duration::days(1);
        db.create_habit(&older).unwrap();
        db.create_habit(&new_habit("Newer")).unwrap();

        let names: Vec<_> = db
            .list_habits(OWNER)
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[test]
    fn toggle_persists_dates_and_streaks() {
        let mut db = Database::open_memory().unwrap();
        let habit = new_habit("Meditate");
        db.create_habit(&habit).unwrap();

        db.toggle_habit(OWNER, &habit.id, today() - Duration::days(1), today())
            .unwrap();
        let (toggled, outcome) = db.toggle_habit(OWNER, &habit.id, today(), today()).unwrap();
        assert_eq!(outcome, ToggleOutcome::Added);
        assert_eq!(toggled.current_streak, 2);

        let loaded = db.get_habit(OWNER, &habit.id).unwrap().unwrap();
        assert_eq!(loaded.completed_dates.to_persisted(), vec!["2024-05-19", "2024-05-20"]);
        assert_eq!(loaded.current_streak, 2);
        assert_eq!(loaded.longest_streak, 2);

        let (toggled, outcome) = db.toggle_habit(OWNER, &habit.id, today(), today()).unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
        assert_eq!(toggled.current_streak, 1);
        assert_eq!(toggled.longest_streak, 2);
    }

    #[test]
    fn toggle_unknown_habit_is_not_found() {
        let mut db = Database::open_memory().unwrap();
        let result = db.toggle_habit(OWNER, "missing", today(), today());
        assert!(matches!(result, Err(CoreError::NotFound { kind: "Habit", .. })));
    }

    #[test]
    fn stored_duplicates_are_collapsed_on_load() {
        let db = Database::open_memory().unwrap();
        let habit = new_habit("Walk");
        db.create_habit(&habit).unwrap();
        db.conn()
            .execute(
                "UPDATE habits SET completed_dates = ?1 WHERE id = ?2",
                params![r#"["2024-05-20","2024-05-20","2024-05-19"]"#, habit.id],
            )
            .unwrap();

        let loaded = db.get_habit(OWNER, &habit.id).unwrap().unwrap();
        assert_eq!(loaded.completed_dates.len(), 2);
    }

    #[test]
    fn malformed_stored_date_is_an_error() {
        let db = Database::open_memory().unwrap();
        let habit = new_habit("Walk");
        db.create_habit(&habit).unwrap();
        db.conn()
            .execute(
                "UPDATE habits SET completed_dates = ?1 WHERE id = ?2",
                params![r#"["2024-05-20","May 19"]"#, habit.id],
            )
            .unwrap();

        let result = db.get_habit(OWNER, &habit.id);
        assert!(matches!(
            result,
            Err(CoreError::Database(DatabaseError::CorruptRow { .. }))
        ));
    }

    #[test]
    fn update_habit_applies_patch() {
        let db = Database::open_memory().unwrap();
        let habit = new_habit("Journal");
        db.create_habit(&habit).unwrap();

        let updated = db
            .update_habit(
                OWNER,
                &habit.id,
                HabitPatch {
                    name: Some("Evening journal".to_string()),
                    icon: Some(HabitIcon::Book),
                    color: None,
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Evening journal");

        let loaded = db.get_habit(OWNER, &habit.id).unwrap().unwrap();
        assert_eq!(loaded.icon, HabitIcon::Book);
        assert_eq!(loaded.color.as_str(), "#10b981");
    }

    #[test]
    fn goal_round_trip_and_update() {
        let db = Database::open_memory().unwrap();
        let target = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let goal = Goal::new(
            OWNER,
            "Save 10%",
            Some("Every paycheck".to_string()),
            GoalCategory::Finance,
            Some(target),
        )
        .unwrap();
        db.create_goal(&goal).unwrap();

        let loaded = db.get_goal(OWNER, &goal.id).unwrap().unwrap();
        assert_eq!(loaded.category, GoalCategory::Finance);
        assert_eq!(loaded.target_date, Some(target));
        assert_eq!(loaded.description.as_deref(), Some("Every paycheck"));

        let updated = db
            .update_goal(
                OWNER,
                &goal.id,
                GoalPatch {
                    progress: Some(250),
                    status: Some(GoalStatus::Completed),
                    target_date: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.progress, 100);

        let loaded = db.get_goal(OWNER, &goal.id).unwrap().unwrap();
        assert_eq!(loaded.status, GoalStatus::Completed);
        assert_eq!(loaded.target_date, None);
    }

    #[test]
    fn goal_delete_scoped_by_owner() {
        let db = Database::open_memory().unwrap();
        let goal = Goal::new(OWNER, "Learn Rust", None, GoalCategory::Career, None).unwrap();
        db.create_goal(&goal).unwrap();

        assert!(db.delete_goal("mallory", &goal.id).is_err());
        db.delete_goal(OWNER, &goal.id).unwrap();
        assert!(db.list_goals(OWNER).unwrap().is_empty());
        assert!(matches!(
            db.delete_goal(OWNER, &goal.id),
            Err(CoreError::NotFound { kind: "Goal", .. })
        ));
    }
}
