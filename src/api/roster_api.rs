// ==========================================
// 制作進行管理 - 人员 / 外注会社 API
// ==========================================
// 职责: 创作者与外注会社的登记、查询、更新
// 注: 名字查询为部分匹配,多人命中时取 id 最小者（有损匹配）
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::cut::AssigneeRef;
use crate::domain::roster::{
    is_valid_rating, Company, Creator, CreatorUpdate, NewCompany, NewCreator,
};
use crate::domain::types::AssigneeKind;
use crate::repository::roster_repo::{CompanyRepository, CreatorRepository};

fn check_rating(field: &str, rating: i32) -> ApiResult<()> {
    if is_valid_rating(rating) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "{} 必须在 1-5 之间: {}",
            field, rating
        )))
    }
}

// ==========================================
// RosterApi - 人员 API
// ==========================================
pub struct RosterApi {
    creator_repo: Arc<CreatorRepository>,
    company_repo: Arc<CompanyRepository>,
}

impl RosterApi {
    pub fn new(creator_repo: Arc<CreatorRepository>, company_repo: Arc<CompanyRepository>) -> Self {
        Self {
            creator_repo,
            company_repo,
        }
    }

    // ==========================================
    // 创作者
    // ==========================================

    pub fn add_creator(&self, creator: &NewCreator) -> ApiResult<Creator> {
        if creator.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("名字不能为空".to_string()));
        }
        check_rating("speed", creator.speed_rating)?;
        check_rating("quality", creator.quality_rating)?;
        if creator.price_per_cut < 0 {
            return Err(ApiError::InvalidInput(format!(
                "卡单价不能为负: {}",
                creator.price_per_cut
            )));
        }
        tracing::info!(name = %creator.name, "add creator");

        let id = self.creator_repo.insert(creator)?;
        self.creator_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("creator", id))
    }

    pub fn list_creators(&self, skill: Option<&str>) -> ApiResult<Vec<Creator>> {
        let skill = skill.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.creator_repo.list(skill)?)
    }

    /// 按 id 或名字（部分匹配）查询
    pub fn show_creator(&self, id_or_name: &str) -> ApiResult<Creator> {
        let key = id_or_name.trim();
        let found = match key.parse::<i64>() {
            Ok(id) => self.creator_repo.find_by_id(id)?,
            Err(_) => self.creator_repo.find_by_name_partial(key)?,
        };
        found.ok_or_else(|| ApiError::not_found("creator", key))
    }

    /// 按补丁更新；空补丁直接返回当前记录
    pub fn update_creator(&self, id_or_name: &str, patch: &CreatorUpdate) -> ApiResult<Creator> {
        let creator = self.show_creator(id_or_name)?;
        if patch.is_empty() {
            return Ok(creator);
        }
        if let Some(v) = patch.speed_rating {
            check_rating("speed", v)?;
        }
        if let Some(v) = patch.quality_rating {
            check_rating("quality", v)?;
        }
        if matches!(patch.price_per_cut, Some(p) if p < 0) {
            return Err(ApiError::InvalidInput("卡单价不能为负".to_string()));
        }
        tracing::info!(creator_id = creator.id, "update creator");

        self.creator_repo.update(creator.id, patch)?;
        self.creator_repo
            .find_by_id(creator.id)?
            .ok_or_else(|| ApiError::not_found("creator", creator.id))
    }

    // ==========================================
    // 外注会社
    // ==========================================

    pub fn add_company(&self, company: &NewCompany) -> ApiResult<Company> {
        if company.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("会社名不能为空".to_string()));
        }
        check_rating("quality", company.quality_rating)?;
        tracing::info!(name = %company.name, "add company");

        let id = self.company_repo.insert(company)?;
        self.company_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("company", id))
    }

    pub fn list_companies(&self) -> ApiResult<Vec<Company>> {
        Ok(self.company_repo.list()?)
    }

    pub fn show_company(&self, id_or_name: &str) -> ApiResult<Company> {
        let key = id_or_name.trim();
        let found = match key.parse::<i64>() {
            Ok(id) => self.company_repo.find_by_id(id)?,
            Err(_) => self.company_repo.find_by_name_partial(key)?,
        };
        found.ok_or_else(|| ApiError::not_found("company", key))
    }

    // ==========================================
    // 担当解析
    // ==========================================

    /// 由类型 + id/名字 解析担当引用
    pub fn resolve_assignee(&self, kind: AssigneeKind, id_or_name: &str) -> ApiResult<AssigneeRef> {
        match kind {
            AssigneeKind::Creator => Ok(AssigneeRef::creator(self.show_creator(id_or_name)?.id)),
            AssigneeKind::Company => Ok(AssigneeRef::company(self.show_company(id_or_name)?.id)),
        }
    }

    /// 担当引用是否指向已存在的记录
    pub fn ensure_assignee_exists(&self, assignee: AssigneeRef) -> ApiResult<()> {
        let exists = match assignee.kind {
            AssigneeKind::Creator => self.creator_repo.find_by_id(assignee.id)?.is_some(),
            AssigneeKind::Company => self.company_repo.find_by_id(assignee.id)?.is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(ApiError::not_found(assignee.kind.to_db_str(), assignee.id))
        }
    }
}
