// ==========================================
// 制作進行管理 - 人员 / 外注会社 领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 评分下限 / 上限 (speed / quality)
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn is_valid_rating(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

// ==========================================
// Creator - 个人创作者
// ==========================================
// 对齐: creator 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: i64,
    pub name: String,
    pub category: Option<String>, // animator / douga / shiage ...
    pub skills: Option<String>,   // 逗号分隔: action,mecha
    pub speed_rating: i32,
    pub quality_rating: i32,
    pub pulls_deadline: bool, // 常拖稿
    pub daily_capacity: i32,
    pub price_per_cut: i64, // 卡单价 (円)
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCreator {
    pub name: String,
    pub category: Option<String>,
    pub skills: Option<String>,
    pub speed_rating: i32,
    pub quality_rating: i32,
    pub price_per_cut: i64,
}

impl Default for NewCreator {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: None,
            skills: None,
            speed_rating: 3,
            quality_rating: 3,
            price_per_cut: 0,
        }
    }
}

/// 创作者更新补丁
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorUpdate {
    pub speed_rating: Option<i32>,
    pub quality_rating: Option<i32>,
    pub price_per_cut: Option<i64>,
    pub skills: Option<String>,
    pub daily_capacity: Option<i32>,
    pub pulls_deadline: Option<bool>,
    pub notes: Option<String>,
}

impl CreatorUpdate {
    pub fn is_empty(&self) -> bool {
        self.speed_rating.is_none()
            && self.quality_rating.is_none()
            && self.price_per_cut.is_none()
            && self.skills.is_none()
            && self.daily_capacity.is_none()
            && self.pulls_deadline.is_none()
            && self.notes.is_none()
    }
}

// ==========================================
// Company - 外注会社
// ==========================================
// 对齐: company 表, name 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub capabilities: Option<String>, // 对应工程 (逗号分隔)
    pub capacity_per_day: i32,
    pub num_staff: i32,
    pub quality_rating: i32,
    pub contact: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub capabilities: Option<String>,
    pub capacity_per_day: i32,
    pub num_staff: i32,
    pub quality_rating: i32,
}

impl Default for NewCompany {
    fn default() -> Self {
        Self {
            name: String::new(),
            capabilities: None,
            capacity_per_day: 0,
            num_staff: 0,
            quality_rating: 3,
        }
    }
}
