use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use crate::errors::Result;
use crate::session::UserId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub users: BTreeSet<UserId>,
    pub videos: u64,
    pub mp3: u64,
}

/// On-disk layout of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsFile {
    /// Epoch seconds of the very first load.
    pub start_time: f64,
    pub total_users: u64,
    pub total_videos: u64,
    pub total_mp3: u64,
    #[serde(default)]
    pub daily: BTreeMap<NaiveDate, DailyStats>,
}

impl StatsFile {
    fn fresh() -> Self {
        Self {
            start_time: crate::utils::unix_now(),
            total_users: 0,
            total_videos: 0,
            total_mp3: 0,
            daily: BTreeMap::new(),
        }
    }

    /// Distinct users over all recorded days.
    fn recompute_total_users(&mut self) {
        let distinct: BTreeSet<UserId> = self.daily.values().flat_map(|d| d.users.iter().copied()).collect();
        self.total_users = distinct.len() as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub start_time: f64,
    pub total_users: u64,
    pub total_videos: u64,
    pub total_mp3: u64,
}

/// Durable usage counters.
///
/// Every mutation takes the lock, recomputes `total_users` and rewrites the
/// whole file before releasing it, so the file on disk is always consistent.
/// The recompute walks every stored day; old days are never evicted.
pub struct StatsLedger {
    path: PathBuf,
    state: Mutex<StatsFile>,
}

impl StatsLedger {
    /// Loads the ledger, or starts a fresh one when the file is absent.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let mut stats: StatsFile = serde_json::from_str(&content)?;
                stats.recompute_total_users();
                log::info!("📊 [STATS] Loaded {} day(s) from {:?}", stats.daily.len(), path);
                stats
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("📊 [STATS] No stats file at {:?}, starting fresh", path);
                StatsFile::fresh()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds the user to the day's set; repeated calls for the same day are no-ops
    /// apart from the flush.
    pub async fn record_user(&self, date: NaiveDate, user_id: UserId) -> Result<()> {
        self.mutate(|stats| {
            stats.daily.entry(date).or_default().users.insert(user_id);
        })
        .await
    }

    pub async fn record_video(&self, date: NaiveDate) -> Result<()> {
        self.mutate(|stats| {
            stats.total_videos += 1;
            stats.daily.entry(date).or_default().videos += 1;
        })
        .await
    }

    pub async fn record_mp3(&self, date: NaiveDate) -> Result<()> {
        self.mutate(|stats| {
            stats.total_mp3 += 1;
            stats.daily.entry(date).or_default().mp3 += 1;
        })
        .await
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let stats = self.state.lock().await;
        StatsSnapshot {
            start_time: stats.start_time,
            total_users: stats.total_users,
            total_videos: stats.total_videos,
            total_mp3: stats.total_mp3,
        }
    }

    pub async fn day(&self, date: NaiveDate) -> DailyStats {
        let stats = self.state.lock().await;
        stats.daily.get(&date).cloned().unwrap_or_default()
    }

    async fn mutate<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut StatsFile),
    {
        let mut stats = self.state.lock().await;
        apply(&mut stats);
        stats.recompute_total_users();
        Self::flush(&self.path, &stats).await
    }

    /// Writes a sibling temp file and renames it over the ledger.
    async fn flush(path: &Path, stats: &StatsFile) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = serde_json::to_string_pretty(stats)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = StatsLedger::load(dir.path().join("stats.json")).await.unwrap();
        let snap = ledger.snapshot().await;
        assert_eq!(snap.total_users, 0);
        assert_eq!(snap.total_videos, 0);
        assert!(snap.start_time > 0.0);
        assert!(!dir.path().join("stats.json").exists());
    }

    #[tokio::test]
    async fn same_user_twice_on_one_day_is_counted_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = StatsLedger::load(dir.path().join("stats.json")).await.unwrap();

        ledger.record_user(day(1), 42).await.unwrap();
        ledger.record_user(day(1), 42).await.unwrap();

        let today = ledger.day(day(1)).await;
        assert_eq!(today.users.iter().filter(|u| **u == 42).count(), 1);
        assert_eq!(ledger.snapshot().await.total_users, 1);
    }

    #[tokio::test]
    async fn total_users_is_distinct_across_days() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = StatsLedger::load(dir.path().join("stats.json")).await.unwrap();

        ledger.record_user(day(1), 1).await.unwrap();
        ledger.record_user(day(1), 2).await.unwrap();
        ledger.record_user(day(2), 1).await.unwrap();
        ledger.record_user(day(3), 3).await.unwrap();
        ledger.record_user(day(3), 2).await.unwrap();

        // 5 per-day entries but only 3 people
        assert_eq!(ledger.snapshot().await.total_users, 3);
    }

    #[tokio::test]
    async fn counters_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stats.json");
        let start_time = {
            let ledger = StatsLedger::load(&path).await.unwrap();
            ledger.record_user(day(5), 7).await.unwrap();
            ledger.record_video(day(5)).await.unwrap();
            ledger.record_mp3(day(5)).await.unwrap();
            ledger.record_mp3(day(6)).await.unwrap();
            ledger.snapshot().await.start_time
        };

        let reloaded = StatsLedger::load(&path).await.unwrap();
        let snap = reloaded.snapshot().await;
        assert_eq!(snap.start_time, start_time);
        assert_eq!(snap.total_users, 1);
        assert_eq!(snap.total_videos, 1);
        assert_eq!(snap.total_mp3, 2);
        assert_eq!(reloaded.day(day(5)).await.mp3, 1);
        assert_eq!(reloaded.day(day(6)).await.mp3, 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn file_uses_iso_dates_and_user_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let ledger = StatsLedger::load(&path).await.unwrap();
        ledger.record_user(day(9), 11).await.unwrap();
        ledger.record_video(day(9)).await.unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["start_time"].is_f64());
        assert_eq!(raw["total_users"], 1);
        assert_eq!(raw["total_videos"], 1);
        assert_eq!(raw["total_mp3"], 0);
        assert_eq!(raw["daily"]["2024-03-09"]["users"], serde_json::json!([11]));
        assert_eq!(raw["daily"]["2024-03-09"]["videos"], 1);
    }

    #[tokio::test]
    async fn loads_a_file_written_by_hand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(
            &path,
            r#"{"start_time": 1700000000.5, "total_users": 9, "total_videos": 4, "total_mp3": 2,
                "daily": {"2024-03-01": {"users": [1, 2, 2], "videos": 4, "mp3": 2}}}"#,
        )
        .unwrap();

        let ledger = StatsLedger::load(&path).await.unwrap();
        assert_eq!(ledger.day(day(1)).await.users.len(), 2);
        let loaded = ledger.snapshot().await;
        assert_eq!(loaded.total_users, 2);
        assert_eq!(loaded.total_videos, 4);
        ledger.record_user(day(2), 3).await.unwrap();
        assert_eq!(ledger.snapshot().await.total_users, 3);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(StatsLedger::load(&path).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = std::sync::Arc::new(StatsLedger::load(dir.path().join("stats.json")).await.unwrap());

        let handles: Vec<_> = (0..20u64)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.record_user(day(1), i % 5).await.unwrap();
                    ledger.record_video(day(1)).await.unwrap();
                })
            })
            .collect();
        futures::future::join_all(handles).await;

        let snap = ledger.snapshot().await;
        assert_eq!(snap.total_videos, 20);
        assert_eq!(snap.total_users, 5);
        assert_eq!(ledger.day(day(1)).await.videos, 20);
    }
}
