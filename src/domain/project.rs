// ==========================================
// 制作進行管理 - 作品 / 话数 领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Project - 作品
// ==========================================
// 对齐: project 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,               // 作品名 (唯一)
    pub short_name: Option<String>, // 略称
    pub total_episodes: i32,        // 话数 (默认 12)
    pub created_at: Option<NaiveDateTime>,
}

/// 新建作品参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub short_name: Option<String>,
    pub total_episodes: i32,
}

// ==========================================
// Episode - 话数
// ==========================================
// 对齐: episode 表, UNIQUE(project_id, number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub project_id: i64,
    pub number: i32,                 // 第N话
    pub title: Option<String>,       // 副标题
    pub air_date: Option<String>,    // 放送日 (YYYY-MM-DD)
    pub v_edit_date: Option<String>, // V编日
    pub created_at: Option<NaiveDateTime>,
}

/// 新建话数参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEpisode {
    pub number: i32,
    pub title: Option<String>,
    pub air_date: Option<String>,
    pub v_edit_date: Option<String>,
}
