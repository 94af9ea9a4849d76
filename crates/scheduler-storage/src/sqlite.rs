//! Sqlite-backed repository. Single-writer discipline: every mutating
//! method that touches more than one table runs inside a transaction, so a
//! crash mid-write never leaves practice log and derived stats
//! disagreeing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{query, query_as, SqlitePool};
use std::str::FromStr;

use scheduler_core::domain::{
    Compound, CompoundStats, DimensionUnlock, PracticeEntry, Proficiency, Signature,
    SignatureStats, StreakInfo,
};
use scheduler_core::ports::{PracticeEntryUpdate, Repository};

use crate::error::StorageError;
use crate::models::{
    CompoundStatsRow, DimensionUnlockRow, PracticeEntryRow, ProficiencyRow, SignatureStatsRow,
    StreakRow,
};

/// Opens (creating if missing) a sqlite database at `db_path` and runs
/// pending migrations.
pub async fn init_sqlite_pool(db_path: &str) -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(db_path, "sqlite repository ready");
    Ok(pool)
}

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_entry(row: PracticeEntryRow) -> anyhow::Result<PracticeEntry> {
    Ok(PracticeEntry {
        id: row.id as u64,
        logged_at: DateTime::parse_from_rfc3339(&row.logged_at)?.with_timezone(&Utc),
        scale: row.scale,
        position: row.position,
        rhythm: row.rhythm,
        rhythm_pattern: row.rhythm_pattern,
        note_pattern: row.note_pattern,
        articulation: row.articulation,
        key: row.key,
        bpm: row.bpm as u32,
        npm: row.npm as u32,
        reasoning: row.reasoning,
    })
}

fn row_to_signature_stats(row: SignatureStatsRow) -> SignatureStats {
    SignatureStats {
        sig_id: row.sig_id,
        attempts: row.attempts as u32,
        best_npm: row.best_npm as u32,
        ema_npm: row.ema_npm,
        last_npm: row.last_npm as u32,
        last_seen_session: row.last_seen_session.map(|s| s as u64),
        has_expanded: row.has_expanded != 0,
        mastery_streak: row.mastery_streak as u32,
        is_mastered: row.is_mastered != 0,
        struggling_streak: row.struggling_streak as u32,
    }
}

fn row_to_compound_stats(row: CompoundStatsRow) -> CompoundStats {
    CompoundStats {
        compound_id: row.compound_id,
        attempts: row.attempts as u32,
        best_npm: row.best_npm as u32,
        ema_npm: row.ema_npm,
        last_npm: row.last_npm as u32,
        last_bpm: row.last_bpm as u32,
        has_expanded: row.has_expanded != 0,
        mastery_streak: row.mastery_streak as u32,
        is_mastered: row.is_mastered != 0,
        struggling_streak: row.struggling_streak as u32,
        last_practiced_session: row.last_practiced_session.map(|s| s as u64),
        max_varied_tier: row.max_varied_tier as u32,
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn log_practice(
        &self,
        scale: String,
        position: String,
        rhythm: String,
        rhythm_pattern: String,
        note_pattern: Option<String>,
        articulation: Option<String>,
        key: String,
        bpm: u32,
        npm: u32,
        reasoning: Option<String>,
    ) -> anyhow::Result<PracticeEntry> {
        let logged_at = Utc::now();
        let result = query(
            "INSERT INTO practice_log
                (logged_at, scale, position, rhythm, rhythm_pattern, note_pattern, articulation, key, bpm, npm, reasoning)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(logged_at.to_rfc3339())
        .bind(&scale)
        .bind(&position)
        .bind(&rhythm)
        .bind(&rhythm_pattern)
        .bind(&note_pattern)
        .bind(&articulation)
        .bind(&key)
        .bind(bpm as i64)
        .bind(npm as i64)
        .bind(&reasoning)
        .execute(&self.pool)
        .await?;

        Ok(PracticeEntry {
            id: result.last_insert_rowid() as u64,
            logged_at,
            scale,
            position,
            rhythm,
            rhythm_pattern,
            note_pattern,
            articulation,
            key,
            bpm,
            npm,
            reasoning,
        })
    }

    async fn get_last_practice(&self) -> anyhow::Result<Option<PracticeEntry>> {
        let row = query_as::<_, PracticeEntryRow>(
            "SELECT * FROM practice_log ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_entry).transpose()
    }

    async fn get_recent_practice(&self, limit: u32) -> anyhow::Result<Vec<PracticeEntry>> {
        let rows = query_as::<_, PracticeEntryRow>(
            "SELECT * FROM practice_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_entry).collect()
    }

    async fn get_all_practice(&self) -> anyhow::Result<Vec<PracticeEntry>> {
        let rows = query_as::<_, PracticeEntryRow>("SELECT * FROM practice_log ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_entry).collect()
    }

    async fn get_practice_by_id(&self, id: u64) -> anyhow::Result<Option<PracticeEntry>> {
        let row = query_as::<_, PracticeEntryRow>("SELECT * FROM practice_log WHERE id = ?")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_entry).transpose()
    }

    async fn update_practice(&self, id: u64, update: PracticeEntryUpdate) -> anyhow::Result<()> {
        let affected = query(
            "UPDATE practice_log SET scale = ?, position = ?, rhythm = ?, rhythm_pattern = ?,
                note_pattern = ?, articulation = ?, key = ?, bpm = ?, npm = ?, reasoning = ?
             WHERE id = ?",
        )
        .bind(update.scale)
        .bind(update.position)
        .bind(update.rhythm)
        .bind(update.rhythm_pattern)
        .bind(update.note_pattern)
        .bind(update.articulation)
        .bind(update.key)
        .bind(update.bpm as i64)
        .bind(update.npm as i64)
        .bind(update.reasoning)
        .bind(id as i64)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(StorageError::NotFound(format!("practice entry {id}")).into());
        }
        Ok(())
    }

    async fn delete_practice(&self, id: u64) -> anyhow::Result<()> {
        query("DELETE FROM practice_log WHERE id = ?")
            .bind(id as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn has_any_practice(&self) -> anyhow::Result<bool> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM practice_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn get_total_practice_count(&self) -> anyhow::Result<u64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM practice_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn get_stats(&self, sig_id: &str) -> anyhow::Result<Option<SignatureStats>> {
        let row = query_as::<_, SignatureStatsRow>("SELECT * FROM signature_stats WHERE sig_id = ?")
            .bind(sig_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(row_to_signature_stats))
    }

    async fn get_all_stats(&self) -> anyhow::Result<Vec<SignatureStats>> {
        let rows = query_as::<_, SignatureStatsRow>("SELECT * FROM signature_stats")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(row_to_signature_stats).collect())
    }

    async fn update_stats(&self, sig_id: &str, npm: u32, session: u64, alpha: f64) -> anyhow::Result<()> {
        let mut stats = self
            .get_stats(sig_id)
            .await?
            .unwrap_or_else(|| SignatureStats::new(sig_id));
        stats.attempts += 1;
        stats.best_npm = stats.best_npm.max(npm);
        stats.ema_npm = scheduler_core::normalizer::ema(stats.ema_npm, npm as f64, alpha);
        stats.last_npm = npm;
        stats.last_seen_session = Some(session);
        upsert_signature_stats(&self.pool, &stats).await
    }

    async fn update_progression(
        &self,
        sig_id: &str,
        npm: u32,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) -> anyhow::Result<()> {
        let mut stats = self
            .get_stats(sig_id)
            .await?
            .unwrap_or_else(|| SignatureStats::new(sig_id));
        if npm >= expansion_npm {
            stats.has_expanded = true;
        }
        if npm >= mastery_npm {
            stats.mastery_streak += 1;
        } else {
            stats.mastery_streak = 0;
        }
        if stats.mastery_streak >= mastery_streak_required {
            stats.is_mastered = true;
        }
        if npm < struggling_npm {
            stats.struggling_streak += 1;
        } else {
            stats.struggling_streak = 0;
        }
        upsert_signature_stats(&self.pool, &stats).await
    }

    async fn get_current_session(&self) -> anyhow::Result<u64> {
        let (session,): (i64,) = query_as("SELECT session FROM session_counter WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(session as u64)
    }

    async fn increment_session(&self) -> anyhow::Result<u64> {
        query("UPDATE session_counter SET session = session + 1 WHERE id = 1")
            .execute(&self.pool)
            .await?;
        self.get_current_session().await
    }

    async fn get_compound_stats(&self, compound_id: &str) -> anyhow::Result<Option<CompoundStats>> {
        let row = query_as::<_, CompoundStatsRow>("SELECT * FROM compound_stats WHERE compound_id = ?")
            .bind(compound_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(row_to_compound_stats))
    }

    async fn get_or_create_compound_stats(&self, compound: &Compound) -> anyhow::Result<CompoundStats> {
        let id = compound.compound_id();
        if let Some(existing) = self.get_compound_stats(&id).await? {
            return Ok(existing);
        }
        let fresh = CompoundStats::new(id);
        upsert_compound_stats(&self.pool, &fresh).await?;
        Ok(fresh)
    }

    async fn update_compound_stats(
        &self,
        compound_id: &str,
        npm: u32,
        bpm: u32,
        session: u64,
        alpha: f64,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
        max_varied_tier: u32,
    ) -> anyhow::Result<CompoundStats> {
        let mut stats = self
            .get_compound_stats(compound_id)
            .await?
            .unwrap_or_else(|| CompoundStats::new(compound_id));
        stats.apply_attempt(
            npm,
            bpm,
            session,
            alpha,
            expansion_npm,
            mastery_npm,
            mastery_streak_required,
            struggling_npm,
        );
        stats.max_varied_tier = stats.max_varied_tier.max(max_varied_tier);
        upsert_compound_stats(&self.pool, &stats).await?;
        Ok(stats)
    }

    async fn get_all_compound_stats(&self) -> anyhow::Result<Vec<CompoundStats>> {
        let rows = query_as::<_, CompoundStatsRow>("SELECT * FROM compound_stats")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(row_to_compound_stats).collect())
    }

    async fn get_related_compounds(&self, compound_id: &str) -> anyhow::Result<Vec<CompoundStats>> {
        let Ok(target) = Compound::parse_compound_id(compound_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .get_all_compound_stats()
            .await?
            .into_iter()
            .filter(|s| {
                s.compound_id != compound_id
                    && Compound::parse_compound_id(&s.compound_id)
                        .map(|c| scheduler_core::domain::changed_dimension(&target, &c).is_some())
                        .unwrap_or(false)
            })
            .collect())
    }

    async fn set_compound_expanded(&self, compound_id: &str, expanded: bool) -> anyhow::Result<()> {
        query("UPDATE compound_stats SET has_expanded = ? WHERE compound_id = ?")
            .bind(expanded as i64)
            .bind(compound_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_dimension_unlocked(&self, dimension: &str) -> anyhow::Result<bool> {
        if matches!(dimension, "scale" | "position" | "rhythm") {
            return Ok(true);
        }
        let (count,): (i64,) =
            query_as("SELECT COUNT(*) FROM dimension_unlocks WHERE dimension = ?")
                .bind(dimension)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn unlock_dimension(&self, dimension: &str, session: u64) -> anyhow::Result<()> {
        query(
            "INSERT OR IGNORE INTO dimension_unlocks (dimension, unlocked_at_session, unlocked_at)
             VALUES (?, ?, ?)",
        )
        .bind(dimension)
        .bind(session as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_unlocked_dimensions(&self) -> anyhow::Result<Vec<DimensionUnlock>> {
        let rows = query_as::<_, DimensionUnlockRow>("SELECT * FROM dimension_unlocks")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|r| {
                Ok(DimensionUnlock {
                    dimension: r.dimension,
                    unlocked_at_session: r.unlocked_at_session as u64,
                    unlocked_at: DateTime::parse_from_rfc3339(&r.unlocked_at)?.with_timezone(&Utc),
                })
            })
            .collect()
    }

    async fn count_expanded_compounds_in_tier(&self, tier: u32) -> anyhow::Result<u32> {
        Ok(self
            .get_all_compound_stats()
            .await?
            .into_iter()
            .filter(|s| s.has_expanded && s.max_varied_tier <= tier)
            .count() as u32)
    }

    async fn recalculate_all_stats(
        &self,
        alpha: f64,
        expansion_npm: u32,
        mastery_npm: u32,
        mastery_streak_required: u32,
        struggling_npm: u32,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        query("DELETE FROM signature_stats").execute(&mut *tx).await?;
        query("DELETE FROM compound_stats").execute(&mut *tx).await?;
        query("UPDATE session_counter SET session = 0 WHERE id = 1")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let log = self.get_all_practice().await?;
        let mut signature_stats: std::collections::HashMap<String, SignatureStats> =
            std::collections::HashMap::new();
        let mut compound_stats: std::collections::HashMap<String, CompoundStats> =
            std::collections::HashMap::new();
        let mut session = 0u64;

        for entry in &log {
            session += 1;
            for sig_id in [
                format!("scale:{}", entry.scale),
                format!("position:{}", entry.position),
                format!("rhythm:{}:{}", entry.rhythm, entry.rhythm_pattern),
            ] {
                let stats = signature_stats
                    .entry(sig_id.clone())
                    .or_insert_with(|| SignatureStats::new(sig_id));
                stats.apply_attempt(
                    entry.npm,
                    session,
                    alpha,
                    expansion_npm,
                    mastery_npm,
                    mastery_streak_required,
                    struggling_npm,
                );
            }

            let compound_id = Compound::from_practice_entry(entry).compound_id();
            let cstats = compound_stats
                .entry(compound_id.clone())
                .or_insert_with(|| CompoundStats::new(compound_id));
            cstats.apply_attempt(
                entry.npm,
                entry.bpm,
                session,
                alpha,
                expansion_npm,
                mastery_npm,
                mastery_streak_required,
                struggling_npm,
            );
        }

        query("UPDATE session_counter SET session = ? WHERE id = 1")
            .bind(session as i64)
            .execute(&self.pool)
            .await?;
        for stats in signature_stats.values() {
            upsert_signature_stats(&self.pool, stats).await?;
        }
        for stats in compound_stats.values() {
            upsert_compound_stats(&self.pool, stats).await?;
        }
        Ok(())
    }

    async fn set_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<()> {
        query("INSERT OR IGNORE INTO proficiencies (dimension, value) VALUES (?, ?)")
            .bind(dimension)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<()> {
        query("DELETE FROM proficiencies WHERE dimension = ? AND value = ?")
            .bind(dimension)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_proficient(&self, dimension: &str, value: &str) -> anyhow::Result<bool> {
        let (count,): (i64,) =
            query_as("SELECT COUNT(*) FROM proficiencies WHERE dimension = ? AND value = ?")
                .bind(dimension)
                .bind(value)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn get_proficiencies(&self, dimension: &str) -> anyhow::Result<Vec<Proficiency>> {
        let rows = query_as::<_, ProficiencyRow>("SELECT * FROM proficiencies WHERE dimension = ?")
            .bind(dimension)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Proficiency {
                dimension: r.dimension,
                value: r.value,
            })
            .collect())
    }

    async fn get_all_proficiencies(&self) -> anyhow::Result<Vec<Proficiency>> {
        let rows = query_as::<_, ProficiencyRow>("SELECT * FROM proficiencies")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Proficiency {
                dimension: r.dimension,
                value: r.value,
            })
            .collect())
    }

    async fn get_struggling_compounds(&self, threshold: u32) -> anyhow::Result<Vec<CompoundStats>> {
        let rows = query_as::<_, CompoundStatsRow>(
            "SELECT * FROM compound_stats WHERE struggling_streak >= ?",
        )
        .bind(threshold as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_compound_stats).collect())
    }

    async fn get_struggling_proficiencies(&self, threshold: u32) -> anyhow::Result<Vec<Proficiency>> {
        let proficiencies = self.get_all_proficiencies().await?;
        let struggling_rows = query_as::<_, SignatureStatsRow>(
            "SELECT * FROM signature_stats WHERE struggling_streak >= ?",
        )
        .bind(threshold as i64)
        .fetch_all(&self.pool)
        .await?;
        let struggling: Vec<SignatureStats> =
            struggling_rows.into_iter().map(row_to_signature_stats).collect();
        Ok(proficiencies
            .into_iter()
            .filter(|p| {
                struggling.iter().any(|s| {
                    Signature::parse(&s.sig_id)
                        .map(|sig| sig.dimension_name() == p.dimension && sig.value_name() == p.value)
                        .unwrap_or(false)
                })
            })
            .collect())
    }

    async fn get_streak_info(&self) -> anyhow::Result<StreakInfo> {
        let row: StreakRow = query_as("SELECT * FROM streak WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(StreakInfo {
            current_streak: row.current_streak as u32,
            longest_streak: row.longest_streak as u32,
            last_practice_date: row
                .last_practice_date
                .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
                .transpose()?,
            streak_freezes: row.streak_freezes as u32,
        })
    }

    async fn update_streak_data(
        &self,
        current: u32,
        longest: u32,
        last_date: Option<NaiveDate>,
        freezes: u32,
    ) -> anyhow::Result<()> {
        query(
            "UPDATE streak SET current_streak = ?, longest_streak = ?, last_practice_date = ?, streak_freezes = ?
             WHERE id = 1",
        )
        .bind(current as i64)
        .bind(longest as i64)
        .bind(last_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(freezes as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_streak_freezes(&self, n: u32) -> anyhow::Result<()> {
        query("UPDATE streak SET streak_freezes = streak_freezes + ? WHERE id = 1")
            .bind(n as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn earn_achievement(&self, id: &str, earned_at: DateTime<Utc>) -> anyhow::Result<()> {
        query("INSERT OR IGNORE INTO achievements (id, earned_at) VALUES (?, ?)")
            .bind(id)
            .bind(earned_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn has_achievement(&self, id: &str) -> anyhow::Result<bool> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM achievements WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn get_earned_achievement_ids(&self) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(String,)> = query_as("SELECT id FROM achievements")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn get_max_npm_across_compounds(&self) -> anyhow::Result<u32> {
        let (max,): (Option<i64>,) = query_as("SELECT MAX(best_npm) FROM compound_stats")
            .fetch_one(&self.pool)
            .await?;
        Ok(max.unwrap_or(0) as u32)
    }

    async fn count_mastered_compounds(&self) -> anyhow::Result<u32> {
        let (count,): (i64,) =
            query_as("SELECT COUNT(*) FROM compound_stats WHERE is_mastered != 0")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u32)
    }

    async fn count_expanded_compounds(&self) -> anyhow::Result<u32> {
        let (count,): (i64,) =
            query_as("SELECT COUNT(*) FROM compound_stats WHERE has_expanded != 0")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u32)
    }

    async fn get_mastered_positions(&self) -> anyhow::Result<Vec<String>> {
        let mastered = self
            .get_all_compound_stats()
            .await?
            .into_iter()
            .filter(|s| s.is_mastered)
            .filter_map(|s| Compound::parse_compound_id(&s.compound_id).ok())
            .filter_map(|c| match c.get("position") {
                Some(Signature::Position { name }) => Some(name.clone()),
                _ => None,
            })
            .collect();
        Ok(mastered)
    }

    async fn get_distinct_practiced_values(&self, dimension: &str) -> anyhow::Result<Vec<String>> {
        let column = match dimension {
            "scale" => "scale",
            "position" => "position",
            "rhythm" => "rhythm",
            "note-pattern" => "note_pattern",
            "articulation" => "articulation",
            _ => return Ok(Vec::new()),
        };
        let rows: Vec<(Option<String>,)> = query_as(&format!(
            "SELECT DISTINCT {column} FROM practice_log WHERE {column} IS NOT NULL ORDER BY {column}"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(|(v,)| v).collect())
    }
}

async fn upsert_signature_stats(pool: &SqlitePool, stats: &SignatureStats) -> anyhow::Result<()> {
    query(
        "INSERT INTO signature_stats
            (sig_id, attempts, best_npm, ema_npm, last_npm, last_seen_session, has_expanded, mastery_streak, is_mastered, struggling_streak)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(sig_id) DO UPDATE SET
            attempts = excluded.attempts,
            best_npm = excluded.best_npm,
            ema_npm = excluded.ema_npm,
            last_npm = excluded.last_npm,
            last_seen_session = excluded.last_seen_session,
            has_expanded = excluded.has_expanded,
            mastery_streak = excluded.mastery_streak,
            is_mastered = excluded.is_mastered,
            struggling_streak = excluded.struggling_streak",
    )
    .bind(&stats.sig_id)
    .bind(stats.attempts as i64)
    .bind(stats.best_npm as i64)
    .bind(stats.ema_npm)
    .bind(stats.last_npm as i64)
    .bind(stats.last_seen_session.map(|s| s as i64))
    .bind(stats.has_expanded as i64)
    .bind(stats.mastery_streak as i64)
    .bind(stats.is_mastered as i64)
    .bind(stats.struggling_streak as i64)
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_compound_stats(pool: &SqlitePool, stats: &CompoundStats) -> anyhow::Result<()> {
    query(
        "INSERT INTO compound_stats
            (compound_id, attempts, best_npm, ema_npm, last_npm, last_bpm, has_expanded, mastery_streak, is_mastered, struggling_streak, last_practiced_session, max_varied_tier)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(compound_id) DO UPDATE SET
            attempts = excluded.attempts,
            best_npm = excluded.best_npm,
            ema_npm = excluded.ema_npm,
            last_npm = excluded.last_npm,
            last_bpm = excluded.last_bpm,
            has_expanded = excluded.has_expanded,
            mastery_streak = excluded.mastery_streak,
            is_mastered = excluded.is_mastered,
            struggling_streak = excluded.struggling_streak,
            last_practiced_session = excluded.last_practiced_session,
            max_varied_tier = excluded.max_varied_tier",
    )
    .bind(&stats.compound_id)
    .bind(stats.attempts as i64)
    .bind(stats.best_npm as i64)
    .bind(stats.ema_npm)
    .bind(stats.last_npm as i64)
    .bind(stats.last_bpm as i64)
    .bind(stats.has_expanded as i64)
    .bind(stats.mastery_streak as i64)
    .bind(stats.is_mastered as i64)
    .bind(stats.struggling_streak as i64)
    .bind(stats.last_practiced_session.map(|s| s as i64))
    .bind(stats.max_varied_tier as i64)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        init_sqlite_pool("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn logs_and_reads_back_a_practice_entry() {
        let repo = SqliteRepository::new(test_pool().await);
        let entry = repo
            .log_practice(
                "pentatonic_minor".into(),
                "E".into(),
                "8ths".into(),
                "xx".into(),
                None,
                None,
                "C".into(),
                210,
                420,
                None,
            )
            .await
            .unwrap();
        let fetched = repo.get_practice_by_id(entry.id).await.unwrap().unwrap();
        assert_eq!(fetched.npm, 420);
        assert_eq!(repo.get_total_practice_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn compound_stats_round_trip_through_upsert() {
        let repo = SqliteRepository::new(test_pool().await);
        let stats = repo
            .update_compound_stats("c1", 400, 200, 1, 0.3, 350, 450, 3, 150, 0)
            .await
            .unwrap();
        assert_eq!(stats.attempts, 1);
        let reloaded = repo.get_compound_stats("c1").await.unwrap().unwrap();
        assert_eq!(reloaded.best_npm, 400);
    }

    #[tokio::test]
    async fn streak_freezes_accumulate() {
        let repo = SqliteRepository::new(test_pool().await);
        repo.add_streak_freezes(2).await.unwrap();
        let streak = repo.get_streak_info().await.unwrap();
        assert_eq!(streak.streak_freezes, 2);
    }

    #[tokio::test]
    async fn struggling_proficiencies_cross_reference_signature_stats() {
        let repo = SqliteRepository::new(test_pool().await);
        repo.set_proficient("scale", "pentatonic_minor").await.unwrap();
        repo.set_proficient("scale", "pentatonic_major").await.unwrap();

        repo.update_progression("scale:pentatonic_minor", 100, 400, 480, 3, 200)
            .await
            .unwrap();
        repo.update_progression("scale:pentatonic_minor", 100, 400, 480, 3, 200)
            .await
            .unwrap();
        repo.update_progression("scale:pentatonic_major", 500, 400, 480, 3, 200)
            .await
            .unwrap();

        let struggling = repo.get_struggling_proficiencies(2).await.unwrap();
        assert_eq!(struggling.len(), 1);
        assert_eq!(struggling[0].value, "pentatonic_minor");
    }
}
