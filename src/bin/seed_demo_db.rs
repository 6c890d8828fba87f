// ==========================================
// 制作進行管理 - 演示数据库生成
// ==========================================
// 用法: seed_demo_db [db_path]
// 已存在的库先备份再重建
// ==========================================

use chrono::{Duration, Local};
use std::error::Error;
use std::fs;
use std::path::Path;

use seishin::api::CreateOrderRequest;
use seishin::app::{get_default_db_path, AppState};
use seishin::domain::{
    AssigneeRef, CutPriorityUpdate, NewCompany, NewCreator, NewEpisode, NewProject, PhaseUpdate,
};
use seishin::{AssigneeKind, Phase, PhaseStatus};

const DEMO_PROJECT: &str = "デモ作品";
const DEMO_CUTS: &str = "C001-C020";

fn main() -> Result<(), Box<dyn Error>> {
    seishin::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    let now = Local::now().naive_local();
    let today = now.date();

    let project = state.project_api.create_project(&NewProject {
        name: DEMO_PROJECT.to_string(),
        short_name: Some("デモ".to_string()),
        total_episodes: 12,
    })?;
    state.project_api.create_episode(
        project.id,
        &NewEpisode {
            number: 1,
            title: Some("はじまり".to_string()),
            ..Default::default()
        },
    )?;
    let created = state.cut_api.register_cuts(project.id, 1, DEMO_CUTS, None)?;

    let creator = state.roster_api.add_creator(&NewCreator {
        name: "山田 花子".to_string(),
        category: Some("animator".to_string()),
        skills: Some("action,mecha".to_string()),
        speed_rating: 4,
        quality_rating: 5,
        price_per_cut: 3800,
    })?;
    let company = state.roster_api.add_company(&NewCompany {
        name: "スタジオ東雲".to_string(),
        capabilities: Some("douga,shiage".to_string()),
        capacity_per_day: 40,
        num_staff: 12,
        quality_rating: 3,
    })?;

    // LO 前半完了
    for n in 1..=10 {
        let cut = format!("C{:03}", n);
        for phase in [Phase::LayoutRaw, Phase::LayoutDirection, Phase::LayoutSupervision] {
            state.cut_api.update_phase(
                project.id,
                1,
                &cut,
                phase,
                &PhaseUpdate {
                    status: Some(PhaseStatus::Completed),
                    ..Default::default()
                },
                now,
            )?;
        }
        state.cut_api.update_phase(
            project.id,
            1,
            &cut,
            Phase::KeyRaw,
            &PhaseUpdate {
                status: Some(PhaseStatus::InProgress),
                assignee: Some(AssigneeRef::creator(creator.id)),
                deadline: Some(today + Duration::days(n)),
                retake_reason: None,
            },
            now,
        )?;
    }

    state.cut_api.update_phase(
        project.id,
        1,
        "C003",
        Phase::KeyRaw,
        &PhaseUpdate {
            status: Some(PhaseStatus::Delayed),
            ..Default::default()
        },
        now,
    )?;
    state.cut_api.set_priority(
        project.id,
        1,
        "C010",
        &CutPriorityUpdate {
            difficulty: Some(5),
            is_priority: Some(true),
            priority_reason: Some("retake risk".to_string()),
        },
    )?;

    let order = state.order_api.create_order(&CreateOrderRequest {
        project_id: project.id,
        ep_number: 1,
        phase: Phase::InBetween,
        cuts: "C001-C010".to_string(),
        assignee_kind: AssigneeKind::Company,
        assignee: company.name.clone(),
        price_per_cut: 280,
        deadline: Some(today + Duration::days(14)),
    })?;
    state.order_api.issue(order.id, now)?;

    eprintln!(
        "Seeded {}: project={} cuts={} creator={} company={} order={}",
        db_path, project.name, created, creator.name, company.name, order.id
    );
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
