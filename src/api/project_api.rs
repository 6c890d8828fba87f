// ==========================================
// 制作進行管理 - 作品 / 话数 API
// ==========================================
// 职责: 作品创建与切换、话数创建与概览
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::project::{Episode, NewEpisode, NewProject, Project};
use crate::domain::types::Phase;
use crate::engine::progress::{PhaseProgress, ProgressAggregator};
use crate::repository::cut_repo::CutRepository;
use crate::repository::project_repo::{EpisodeRepository, ProjectRepository};

/// 话数概览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeOverview {
    pub episode: Episode,
    pub cut_count: i64,
    pub phases: Vec<PhaseProgress>,
}

/// 按 (作品, 话数) 取话数,不存在时返回 NotFound(episode)
pub(crate) fn resolve_episode(
    episode_repo: &EpisodeRepository,
    project_id: i64,
    number: i32,
) -> ApiResult<Episode> {
    episode_repo
        .find_by_number(project_id, number)?
        .ok_or_else(|| ApiError::not_found("episode", format!("project={} #{}", project_id, number)))
}

// ==========================================
// ProjectApi - 作品 API
// ==========================================
pub struct ProjectApi {
    project_repo: Arc<ProjectRepository>,
    episode_repo: Arc<EpisodeRepository>,
    cut_repo: Arc<CutRepository>,
    config: Arc<ConfigManager>,
}

impl ProjectApi {
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
        }
    }

    /// 创建作品并设为当前作品
    pub fn create_project(&self, project: &NewProject) -> ApiResult<Project> {
        let name = project.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("作品名不能为空".to_string()));
        }
        if project.total_episodes <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "话数必须大于0: {}",
                project.total_episodes
            )));
        }
        tracing::info!(name, "create project");

        let normalized = NewProject {
            name: name.to_string(),
            ..project.clone()
        };
        let id = self.project_repo.insert(&normalized)?;
        self.config
            .set_active_project(id, name)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        self.project_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("project", id))
    }

    pub fn list_projects(&self) -> ApiResult<Vec<Project>> {
        Ok(self.project_repo.list()?)
    }

    /// 按作品名切换当前作品
    pub fn switch_project(&self, name: &str) -> ApiResult<Project> {
        let project = self
            .project_repo
            .find_by_name(name.trim())?
            .ok_or_else(|| ApiError::not_found("project", name))?;
        self.config
            .set_active_project(project.id, &project.name)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        tracing::info!(project_id = project.id, "active project switched");
        Ok(project)
    }

    /// 当前作品；未设置或已被删除时返回 NotFound
    pub fn active_project(&self) -> ApiResult<Project> {
        let id = self
            .config
            .active_project_id()
            .map_err(|e| ApiError::InternalError(e.to_string()))?
            .ok_or_else(|| ApiError::not_found("project", "(active)"))?;
        self.project_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("project", id))
    }

    // ==========================================
    // 话数
    // ==========================================

    pub fn create_episode(&self, project_id: i64, episode: &NewEpisode) -> ApiResult<Episode> {
        if episode.number <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "话数编号必须大于0: {}",
                episode.number
            )));
        }
        if self.project_repo.find_by_id(project_id)?.is_none() {
            return Err(ApiError::not_found("project", project_id));
        }
        tracing::info!(project_id, number = episode.number, "create episode");

        let id = self.episode_repo.insert(project_id, episode)?;
        self.episode_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("episode", id))
    }

    pub fn list_episodes(&self, project_id: i64) -> ApiResult<Vec<Episode>> {
        Ok(self.episode_repo.list_by_project(project_id)?)
    }

    /// 话数概览（卡数 + 工程别完了/遅延/リテイク）
    pub fn show_episode(&self, project_id: i64, number: i32) -> ApiResult<EpisodeOverview> {
        let episode = resolve_episode(&self.episode_repo, project_id, number)?;
        let cut_count = self.episode_repo.count_cuts(episode.id)?;

        let mut counts = Vec::with_capacity(Phase::ALL.len());
        for phase in Phase::ALL {
            counts.push((phase, self.cut_repo.count_phase_records(episode.id, phase)?));
        }
        tracing::debug!(episode_id = episode.id, cut_count, "episode overview");

        let progress = ProgressAggregator::new().aggregate_episode(
            episode.id,
            episode.number,
            episode.title.clone(),
            cut_count,
            &counts,
        );

        Ok(EpisodeOverview {
            episode,
            cut_count,
            phases: progress.phases,
        })
    }
}
