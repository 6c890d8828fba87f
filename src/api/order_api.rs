// ==========================================
// 制作進行管理 - 发注书 API
// ==========================================
// 职责: 发注书作成、查询、状态迁移
// 红线: 发注书不修改工程记录
// 状态: draft → issued → accepted → completed (issued 可直接 completed)
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::project_api::resolve_episode;
use crate::api::roster_api::RosterApi;
use crate::config::ConfigManager;
use crate::domain::cut_range::parse_cut_range;
use crate::domain::order::{NewOrder, Order};
use crate::domain::types::{AssigneeKind, OrderStatus, Phase};
use crate::repository::order_repo::OrderRepository;
use crate::repository::project_repo::EpisodeRepository;

/// 发注书作成请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub project_id: i64,
    pub ep_number: i32,
    pub phase: Phase,
    /// 卡号范围 (C001-C010 / C001,C003)
    pub cuts: String,
    pub assignee_kind: AssigneeKind,
    /// 担当 id 或名字（部分匹配）
    pub assignee: String,
    /// 0 表示沿用默认单价
    pub price_per_cut: i64,
    pub deadline: Option<NaiveDate>,
}

// ==========================================
// OrderApi - 发注书 API
// ==========================================
pub struct OrderApi {
    episode_repo: Arc<EpisodeRepository>,
    order_repo: Arc<OrderRepository>,
    roster: Arc<RosterApi>,
    config: Arc<ConfigManager>,
}

impl OrderApi {
    pub fn new(
        episode_repo: Arc<EpisodeRepository>,
        order_repo: Arc<OrderRepository>,
        roster: Arc<RosterApi>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            episode_repo,
            order_repo,
            roster,
            config,
        }
    }

    /// 作成发注书（status = draft）
    ///
    /// 单价为 0 时: 个人取其卡单价,会社取配置默认单价
    pub fn create_order(&self, req: &CreateOrderRequest) -> ApiResult<Order> {
        if req.price_per_cut < 0 {
            return Err(ApiError::InvalidInput(format!(
                "卡单价不能为负: {}",
                req.price_per_cut
            )));
        }
        let cut_numbers = parse_cut_range(&req.cuts)?;
        let episode = resolve_episode(&self.episode_repo, req.project_id, req.ep_number)?;

        let (assignee_id, fallback_price) = match req.assignee_kind {
            AssigneeKind::Creator => {
                let creator = self.roster.show_creator(&req.assignee)?;
                (creator.id, creator.price_per_cut)
            }
            AssigneeKind::Company => {
                let company = self.roster.show_company(&req.assignee)?;
                let default_price = self
                    .config
                    .default_price_per_cut()
                    .map_err(|e| ApiError::InternalError(e.to_string()))?;
                (company.id, default_price)
            }
        };
        let price_per_cut = if req.price_per_cut == 0 {
            fallback_price
        } else {
            req.price_per_cut
        };

        let order = NewOrder {
            episode_id: episode.id,
            phase: req.phase,
            cut_numbers,
            assignee_kind: req.assignee_kind,
            assignee_id,
            price_per_cut,
            deadline: req.deadline,
        };
        let total = order.total_price().ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "合计金额溢出: {} × {} 卡",
                price_per_cut,
                order.cut_numbers.len()
            ))
        })?;
        tracing::info!(
            episode_id = episode.id,
            phase = %req.phase,
            cuts = order.cut_numbers.len(),
            total,
            "create order"
        );

        let id = self.order_repo.insert(&order)?;
        self.show_order(id)
    }

    /// 发注书一览；ep_number 为 None 时列出作品内全部话数
    pub fn list_orders(&self, project_id: i64, ep_number: Option<i32>) -> ApiResult<Vec<Order>> {
        match ep_number {
            Some(n) => {
                let episode = resolve_episode(&self.episode_repo, project_id, n)?;
                Ok(self.order_repo.list(Some(episode.id))?)
            }
            None => {
                let episode_ids: Vec<i64> = self
                    .episode_repo
                    .list_by_project(project_id)?
                    .into_iter()
                    .map(|e| e.id)
                    .collect();
                let orders = self
                    .order_repo
                    .list(None)?
                    .into_iter()
                    .filter(|o| episode_ids.contains(&o.episode_id))
                    .collect();
                Ok(orders)
            }
        }
    }

    pub fn show_order(&self, id: i64) -> ApiResult<Order> {
        self.order_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("order", id))
    }

    pub fn issue(&self, id: i64, now: NaiveDateTime) -> ApiResult<Order> {
        self.transition(id, OrderStatus::Issued, now)
    }

    pub fn accept(&self, id: i64, now: NaiveDateTime) -> ApiResult<Order> {
        self.transition(id, OrderStatus::Accepted, now)
    }

    pub fn complete(&self, id: i64, now: NaiveDateTime) -> ApiResult<Order> {
        self.transition(id, OrderStatus::Completed, now)
    }

    fn transition(&self, id: i64, next: OrderStatus, now: NaiveDateTime) -> ApiResult<Order> {
        let order = self.show_order(id)?;
        if !order.status.can_transition_to(next) {
            tracing::warn!(order_id = id, from = %order.status, to = %next, "rejected order transition");
            return Err(ApiError::InvalidStateTransition {
                from: order.status.to_string(),
                to: next.to_string(),
            });
        }
        tracing::info!(order_id = id, to = %next, "order status");
        self.order_repo.update_status(id, next, now)?;
        self.show_order(id)
    }
}
