// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库 + AppState 组装,常用的作品/话数/卡准备
// ==========================================

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use seishin::app::AppState;
use seishin::domain::{NewEpisode, NewProject, PhaseUpdate};
use seishin::{Phase, PhaseStatus};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时数据库并组装 AppState
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - AppState: 应用状态
pub fn create_test_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();
    let state = AppState::new(db_path)?;
    Ok((temp_file, state))
}

/// 固定的写入时间
pub fn fixed_now() -> NaiveDateTime {
    date(2026, 10, 19).and_hms_opt(10, 0, 0).expect("valid time")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// 创建作品 + 第1话 + 卡
///
/// # 返回
/// - i64: 作品 id
pub fn seed_episode(state: &AppState, cuts: &str) -> Result<i64, Box<dyn Error>> {
    let project = state.project_api.create_project(&NewProject {
        name: "テスト作品".to_string(),
        short_name: None,
        total_episodes: 12,
    })?;
    state.project_api.create_episode(
        project.id,
        &NewEpisode {
            number: 1,
            ..Default::default()
        },
    )?;
    state.cut_api.register_cuts(project.id, 1, cuts, None)?;
    Ok(project.id)
}

/// 把第1话某卡某工程设为指定状态
pub fn set_status(
    state: &AppState,
    project_id: i64,
    cut: &str,
    phase: Phase,
    status: PhaseStatus,
) -> Result<(), Box<dyn Error>> {
    state.cut_api.update_phase(
        project_id,
        1,
        cut,
        phase,
        &PhaseUpdate {
            status: Some(status),
            ..Default::default()
        },
        fixed_now(),
    )?;
    Ok(())
}

/// 把第1话某卡的全部工程设为完了
pub fn complete_all_phases(
    state: &AppState,
    project_id: i64,
    cut: &str,
) -> Result<(), Box<dyn Error>> {
    for phase in Phase::ALL {
        set_status(state, project_id, cut, phase, PhaseStatus::Completed)?;
    }
    Ok(())
}
