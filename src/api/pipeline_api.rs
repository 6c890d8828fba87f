// ==========================================
// 制作進行管理 - 流水线 API
// ==========================================
// 职责: 三个核心操作 + 截止日视图
// - rank_priority: 优先作业排序
// - simulate_delay: 遅延カスケード模拟（只读）
// - aggregate_progress: 进捗集计
// 红线: 无结果返回空列表,不是错误；无效 id / 工程名返回 NotFound
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::project_api::resolve_episode;
use crate::config::ConfigManager;
use crate::domain::types::Phase;
use crate::domain::work_item::WorkItem;
use crate::engine::cascade::{CascadeImpact, DelayCascadeSimulator};
use crate::engine::deadline::{DeadlineBuckets, DeadlineClassifier};
use crate::engine::priority::{resolve_section, PriorityRanker};
use crate::engine::progress::{ProgressAggregator, ProjectProgress};
use crate::perf::PerfGuard;
use crate::repository::cut_repo::CutRepository;
use crate::repository::error::RepositoryError;
use crate::repository::project_repo::{EpisodeRepository, ProjectRepository};

/// 截止日视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineReport {
    pub today: NaiveDate,
    pub buckets: DeadlineBuckets,
    /// soon_days 日内到期（不含已超期）
    pub due_soon: usize,
    pub soon_days: i64,
}

// ==========================================
// PipelineApi - 流水线 API
// ==========================================
pub struct PipelineApi {
    project_repo: Arc<ProjectRepository>,
    episode_repo: Arc<EpisodeRepository>,
    cut_repo: Arc<CutRepository>,
    config: Arc<ConfigManager>,
    ranker: PriorityRanker,
    simulator: DelayCascadeSimulator,
    aggregator: ProgressAggregator,
    classifier: DeadlineClassifier,
}

impl PipelineApi {
    pub fn new(
        project_repo: Arc<ProjectRepository>,
        episode_repo: Arc<EpisodeRepository>,
        cut_repo: Arc<CutRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            project_repo,
            episode_repo,
            cut_repo,
            config,
            ranker: PriorityRanker::new(),
            simulator: DelayCascadeSimulator::new(),
            aggregator: ProgressAggregator::new(),
            classifier: DeadlineClassifier::new(),
        }
    }

    /// 优先作业排序
    ///
    /// # 参数
    /// - `section`: 部门名 (sakkan / enshutsu / douga / shiage / satsuei) 或工程名；None 为全工程
    ///
    /// # 返回
    /// - Ok(Vec<WorkItem>): 排好序的开放作业,空列表表示无待办
    /// - Err(NotFound): 话数不存在 / section 既非部门也非工程
    pub fn rank_priority(
        &self,
        project_id: i64,
        ep_number: i32,
        section: Option<&str>,
    ) -> ApiResult<Vec<WorkItem>> {
        let _perf = PerfGuard::new("pipeline.rank_priority");
        tracing::info!(project_id, ep_number, section = ?section, "rank priority");

        let phases = match section.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => {
                Some(resolve_section(name).ok_or_else(|| ApiError::not_found("phase", name))?)
            }
            None => None,
        };
        let episode = resolve_episode(&self.episode_repo, project_id, ep_number)?;

        let items = self.cut_repo.list_open_phase_records(episode.id, phases)?;
        let ranked = self.ranker.rank(items);
        tracing::debug!(episode_id = episode.id, count = ranked.len(), "priority ranked");
        Ok(ranked)
    }

    /// 遅延カスケード模拟（不写任何记录）
    pub fn simulate_delay(
        &self,
        project_id: i64,
        ep_number: i32,
        phase: Phase,
        days: i64,
    ) -> ApiResult<Vec<CascadeImpact>> {
        let _perf = PerfGuard::new("pipeline.simulate_delay");
        tracing::info!(project_id, ep_number, %phase, days, "simulate delay");

        let episode = resolve_episode(&self.episode_repo, project_id, ep_number)?;
        let impacts = self
            .simulator
            .simulate(phase, days, |p| -> Result<_, RepositoryError> {
                self.cut_repo.list_phase_records(episode.id, p, true)
            })?;
        tracing::debug!(
            episode_id = episode.id,
            impacted_phases = impacts.len(),
            "delay simulated"
        );
        Ok(impacts)
    }

    /// 按工程名（DB 代码或英文名）模拟
    pub fn simulate_delay_by_name(
        &self,
        project_id: i64,
        ep_number: i32,
        phase: &str,
        days: i64,
    ) -> ApiResult<Vec<CascadeImpact>> {
        let phase = Phase::parse(phase).ok_or_else(|| ApiError::not_found("phase", phase))?;
        self.simulate_delay(project_id, ep_number, phase, days)
    }

    /// 作品进捗集计
    pub fn aggregate_progress(&self, project_id: i64) -> ApiResult<ProjectProgress> {
        let _perf = PerfGuard::new("pipeline.aggregate_progress");
        tracing::info!(project_id, "aggregate progress");

        let project = self
            .project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::not_found("project", project_id))?;

        let mut episodes = Vec::new();
        for episode in self.episode_repo.list_by_project(project_id)? {
            let cut_count = self.episode_repo.count_cuts(episode.id)?;
            let mut counts = Vec::with_capacity(Phase::ALL.len());
            for phase in Phase::ALL {
                counts.push((phase, self.cut_repo.count_phase_records(episode.id, phase)?));
            }
            episodes.push(self.aggregator.aggregate_episode(
                episode.id,
                episode.number,
                episode.title,
                cut_count,
                &counts,
            ));
        }

        let unassigned = self.cut_repo.count_unassigned_open_work(project_id)?;
        let delayed = self.cut_repo.count_delayed_work(project_id)?;
        tracing::debug!(
            project_id,
            episodes = episodes.len(),
            unassigned,
            delayed,
            "progress aggregated"
        );
        Ok(self
            .aggregator
            .aggregate_project(project.id, project.name, episodes, unassigned, delayed))
    }

    /// 截止日视图
    pub fn deadlines(&self, project_id: i64, today: NaiveDate) -> ApiResult<DeadlineReport> {
        let _perf = PerfGuard::new("pipeline.deadlines");
        tracing::info!(project_id, %today, "deadlines");

        if self.project_repo.find_by_id(project_id)?.is_none() {
            return Err(ApiError::not_found("project", project_id));
        }
        let soon_days = self
            .config
            .deadline_soon_days()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let items = self.cut_repo.list_open_with_deadline(project_id)?;
        let due_soon = self.classifier.due_soon_count(&items, today, soon_days);
        let buckets = self.classifier.classify(items, today);
        Ok(DeadlineReport {
            today,
            buckets,
            due_soon,
            soon_days,
        })
    }
}
