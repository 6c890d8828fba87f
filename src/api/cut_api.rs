// ==========================================
// 制作進行管理 - 卡 / 工程记录 API
// ==========================================
// 职责: 卡登记（范围 / 单个）、工程记录更新、优先标记、看板
// 红线: 范围解析失败整体报错,不做部分登记
// 红线: 无变化的更新返回 NoChange,不是错误
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::project_api::resolve_episode;
use crate::api::roster_api::RosterApi;
use crate::config::ConfigManager;
use crate::domain::cut::{
    is_valid_difficulty, BoardColumn, Cut, CutDetail, CutPriorityUpdate, CutSummary, PhaseRecord,
    PhaseUpdate,
};
use crate::domain::cut_range::parse_cut_range;
use crate::domain::project::Episode;
use crate::domain::retake::RetakeRecord;
use crate::domain::types::{Phase, PhaseStatus};
use crate::repository::cut_repo::CutRepository;
use crate::repository::project_repo::EpisodeRepository;
use crate::repository::retake_repo::RetakeRepository;

/// 工程记录更新结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum PhaseUpdateOutcome {
    /// 已写入,附更新后的记录
    Updated(PhaseRecord),
    /// 没有需要写入的字段
    NoChange,
}

impl PhaseUpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, PhaseUpdateOutcome::Updated(_))
    }
}

// ==========================================
// CutApi - 卡 API
// ==========================================
pub struct CutApi {
    episode_repo: Arc<EpisodeRepository>,
    cut_repo: Arc<CutRepository>,
    retake_repo: Arc<RetakeRepository>,
    roster: Arc<RosterApi>,
    config: Arc<ConfigManager>,
}

impl CutApi {
    pub fn new(
        episode_repo: Arc<EpisodeRepository>,
        cut_repo: Arc<CutRepository>,
        retake_repo: Arc<RetakeRepository>,
        roster: Arc<RosterApi>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            episode_repo,
            cut_repo,
            retake_repo,
            roster,
            config,
        }
    }

    fn episode(&self, project_id: i64, ep_number: i32) -> ApiResult<Episode> {
        resolve_episode(&self.episode_repo, project_id, ep_number)
    }

    fn cut(&self, episode: &Episode, cut_number: &str) -> ApiResult<Cut> {
        self.cut_repo
            .find_by_number(episode.id, cut_number.trim())?
            .ok_or_else(|| {
                ApiError::not_found("cut", format!("#{} {}", episode.number, cut_number.trim()))
            })
    }

    fn difficulty_or_default(&self, difficulty: Option<i32>) -> ApiResult<i32> {
        let difficulty = match difficulty {
            Some(d) => d,
            None => self
                .config
                .default_difficulty()
                .map_err(|e| ApiError::InternalError(e.to_string()))?,
        };
        if !is_valid_difficulty(difficulty) {
            return Err(ApiError::InvalidInput(format!(
                "难易度必须在 1-5 之间: {}",
                difficulty
            )));
        }
        Ok(difficulty)
    }

    // ==========================================
    // 登记
    // ==========================================

    /// 按卡号范围批量登记
    ///
    /// # 返回
    /// - Ok(usize): 新建卡数（已存在的卡跳过,不计入）
    pub fn register_cuts(
        &self,
        project_id: i64,
        ep_number: i32,
        spec: &str,
        difficulty: Option<i32>,
    ) -> ApiResult<usize> {
        let numbers = parse_cut_range(spec)?;
        let difficulty = self.difficulty_or_default(difficulty)?;
        let episode = self.episode(project_id, ep_number)?;
        tracing::info!(episode_id = episode.id, spec, requested = numbers.len(), "register cuts");

        let created = self
            .cut_repo
            .insert_batch(episode.id, &numbers, difficulty)?;
        tracing::debug!(
            episode_id = episode.id,
            created,
            skipped = numbers.len() - created,
            "cuts registered"
        );
        Ok(created)
    }

    /// 单个登记；已存在时返回 ConstraintViolation
    pub fn register_cut(
        &self,
        project_id: i64,
        ep_number: i32,
        cut_number: &str,
        difficulty: Option<i32>,
    ) -> ApiResult<Cut> {
        let numbers = parse_cut_range(cut_number)?;
        if numbers.len() != 1 {
            return Err(ApiError::InvalidInput(format!(
                "单个登记只接受一个卡号: {}",
                cut_number
            )));
        }
        let difficulty = self.difficulty_or_default(difficulty)?;
        let episode = self.episode(project_id, ep_number)?;
        tracing::info!(episode_id = episode.id, cut = %numbers[0], "register cut");

        self.cut_repo
            .insert_one(episode.id, &numbers[0], difficulty)
            .map_err(|e| {
                tracing::warn!(error = %e, cut = %numbers[0], "register cut failed");
                ApiError::from(e)
            })?;
        self.cut(&episode, &numbers[0])
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn list_cuts(&self, project_id: i64, ep_number: i32) -> ApiResult<Vec<CutSummary>> {
        let episode = self.episode(project_id, ep_number)?;
        let cuts = self.cut_repo.list_summaries(episode.id)?;
        tracing::debug!(episode_id = episode.id, count = cuts.len(), "list cuts");
        Ok(cuts)
    }

    pub fn show_cut(&self, project_id: i64, ep_number: i32, cut_number: &str) -> ApiResult<CutDetail> {
        let episode = self.episode(project_id, ep_number)?;
        self.cut_repo
            .find_detail(episode.id, cut_number.trim())?
            .ok_or_else(|| {
                ApiError::not_found("cut", format!("#{} {}", episode.number, cut_number.trim()))
            })
    }

    /// 工程别看板
    pub fn board(&self, project_id: i64, ep_number: i32) -> ApiResult<Vec<BoardColumn>> {
        let episode = self.episode(project_id, ep_number)?;
        Ok(self.cut_repo.board(episode.id)?)
    }

    pub fn retake_history(
        &self,
        project_id: i64,
        ep_number: i32,
        cut_number: &str,
    ) -> ApiResult<Vec<RetakeRecord>> {
        let episode = self.episode(project_id, ep_number)?;
        let cut = self.cut(&episode, cut_number)?;
        Ok(self.retake_repo.list_by_cut(cut.id)?)
    }

    // ==========================================
    // 更新
    // ==========================================

    /// 更新一条工程记录
    ///
    /// - 只写与当前值不同的字段；全部相同时返回 NoChange
    /// - completed 只能进入 retake
    /// - 担当必须是已登记的创作者/会社
    pub fn update_phase(
        &self,
        project_id: i64,
        ep_number: i32,
        cut_number: &str,
        phase: Phase,
        patch: &PhaseUpdate,
        now: NaiveDateTime,
    ) -> ApiResult<PhaseUpdateOutcome> {
        let episode = self.episode(project_id, ep_number)?;
        let cut = self.cut(&episode, cut_number)?;
        let current = self
            .cut_repo
            .find_phase_record(cut.id, phase)?
            .ok_or_else(|| ApiError::not_found("phase", format!("{} {}", cut.number, phase)))?;

        let mut effective = patch.effective_against(&current);
        if effective.status != Some(PhaseStatus::Retake) {
            effective.retake_reason = None;
        }
        if effective.is_empty() {
            tracing::debug!(cut = %cut.number, %phase, "phase update is a no-op");
            return Ok(PhaseUpdateOutcome::NoChange);
        }

        if let Some(next) = effective.status {
            if !current.status.can_transition_to(next) {
                tracing::warn!(cut = %cut.number, %phase, from = %current.status, to = %next, "rejected status transition");
                return Err(ApiError::InvalidStateTransition {
                    from: current.status.to_string(),
                    to: next.to_string(),
                });
            }
        }
        if let Some(assignee) = effective.assignee {
            self.roster.ensure_assignee_exists(assignee)?;
        }

        tracing::info!(cut = %cut.number, %phase, "update phase");
        self.cut_repo
            .update_phase(&current, &effective, now)
            .map_err(|e| {
                tracing::error!(error = %e, cut = %cut.number, %phase, "phase update failed");
                ApiError::from(e)
            })?;

        let updated = self
            .cut_repo
            .find_phase_record(cut.id, phase)?
            .ok_or_else(|| ApiError::not_found("phase", format!("{} {}", cut.number, phase)))?;
        Ok(PhaseUpdateOutcome::Updated(updated))
    }

    /// 设置难易度 / 优先标记 / 优先理由
    pub fn set_priority(
        &self,
        project_id: i64,
        ep_number: i32,
        cut_number: &str,
        patch: &CutPriorityUpdate,
    ) -> ApiResult<Cut> {
        if let Some(d) = patch.difficulty {
            if !is_valid_difficulty(d) {
                return Err(ApiError::InvalidInput(format!("难易度必须在 1-5 之间: {}", d)));
            }
        }
        let episode = self.episode(project_id, ep_number)?;
        let cut = self.cut(&episode, cut_number)?;
        if patch.is_empty() {
            return Ok(cut);
        }
        tracing::info!(cut = %cut.number, "set priority");
        self.cut_repo.update_priority(cut.id, patch)?;
        self.cut(&episode, &cut.number)
    }
}
