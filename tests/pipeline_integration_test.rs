// ==========================================
// 流水线引擎集成测试
// ==========================================
// 测试目标: 优先作业排序 / 遅延カスケード / 进捗集计 / 截止日视图
// 经由 AppState 走完整的 API → Repository → Engine 链路
// ==========================================

mod test_helpers;

use seishin::domain::{AssigneeRef, CutPriorityUpdate, NewCreator, NewEpisode, PhaseUpdate};
use seishin::logging;
use seishin::{Phase, PhaseStatus};
use test_helpers::{complete_all_phases, create_test_state, date, fixed_now, seed_episode, set_status};

fn set_difficulty(state: &seishin::app::AppState, project_id: i64, cut: &str, difficulty: i32) {
    state
        .cut_api
        .set_priority(
            project_id,
            1,
            cut,
            &CutPriorityUpdate {
                difficulty: Some(difficulty),
                ..Default::default()
            },
        )
        .expect("set difficulty");
}

// ==========================================
// 优先作业排序
// ==========================================

#[test]
fn test_sakkan_section_orders_by_difficulty_then_cut() {
    logging::init_test();
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C005").expect("seed");
    set_difficulty(&state, project_id, "C002", 5);
    set_difficulty(&state, project_id, "C004", 4);

    let ranked = state
        .pipeline_api
        .rank_priority(project_id, 1, Some("sakkan"))
        .expect("rank");

    assert_eq!(ranked.len(), 10);
    let order: Vec<(&str, Phase)> = ranked
        .iter()
        .map(|item| (item.cut_number.as_str(), item.phase))
        .collect();
    assert_eq!(
        order,
        vec![
            ("C002", Phase::LayoutSupervision),
            ("C002", Phase::KeySupervision),
            ("C004", Phase::LayoutSupervision),
            ("C004", Phase::KeySupervision),
            ("C001", Phase::LayoutSupervision),
            ("C001", Phase::KeySupervision),
            ("C003", Phase::LayoutSupervision),
            ("C003", Phase::KeySupervision),
            ("C005", Phase::LayoutSupervision),
            ("C005", Phase::KeySupervision),
        ]
    );
}

#[test]
fn test_priority_flagged_delayed_cut_comes_first() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C010").expect("seed");
    set_difficulty(&state, project_id, "C001", 5);
    set_status(&state, project_id, "C010", Phase::InBetween, PhaseStatus::Delayed).expect("delay");
    state
        .cut_api
        .set_priority(
            project_id,
            1,
            "C010",
            &CutPriorityUpdate {
                is_priority: Some(true),
                priority_reason: Some("retake risk".to_string()),
                ..Default::default()
            },
        )
        .expect("flag");

    let ranked = state
        .pipeline_api
        .rank_priority(project_id, 1, Some("douga"))
        .expect("rank");

    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0].cut_number, "C010");
    assert_eq!(ranked[0].status, PhaseStatus::Delayed);
    assert_eq!(ranked[0].priority_reason.as_deref(), Some("retake risk"));
    assert_eq!(ranked[1].cut_number, "C001");
}

#[test]
fn test_completed_work_is_not_ranked() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C002").expect("seed");
    complete_all_phases(&state, project_id, "C001").expect("complete");

    let all = state
        .pipeline_api
        .rank_priority(project_id, 1, None)
        .expect("rank");
    assert_eq!(all.len(), 10);
    assert!(all.iter().all(|item| item.cut_number == "C002"));

    complete_all_phases(&state, project_id, "C002").expect("complete");
    let none = state
        .pipeline_api
        .rank_priority(project_id, 1, Some("shiage"))
        .expect("rank");
    assert!(none.is_empty());
}

#[test]
fn test_rank_accepts_single_phase_name() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C003").expect("seed");

    let ranked = state
        .pipeline_api
        .rank_priority(project_id, 1, Some("key-raw"))
        .expect("rank");
    assert_eq!(ranked.len(), 3);
    assert!(ranked.iter().all(|item| item.phase == Phase::KeyRaw));
}

#[test]
fn test_rank_unknown_section_or_episode_is_not_found() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let err = state
        .pipeline_api
        .rank_priority(project_id, 1, Some("oshiage"))
        .unwrap_err();
    assert!(err.is_not_found());

    let err = state
        .pipeline_api
        .rank_priority(project_id, 9, None)
        .unwrap_err();
    assert!(err.is_not_found());
}

// ==========================================
// 遅延カスケード
// ==========================================

#[test]
fn test_three_day_key_raw_delay_cascade() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C003").expect("seed");
    set_status(&state, project_id, "C001", Phase::KeyDirection, PhaseStatus::Completed)
        .expect("complete");

    let impacts = state
        .pipeline_api
        .simulate_delay(project_id, 1, Phase::KeyRaw, 3)
        .expect("simulate");

    let summary: Vec<(Phase, i64, usize)> = impacts
        .iter()
        .map(|i| (i.phase, i.delay_days, i.affected_cuts))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Phase::KeyRaw, 3, 3),
            (Phase::KeyDirection, 2, 2),
            (Phase::KeySupervision, 1, 3),
        ]
    );
    assert!(impacts[1].cuts.iter().all(|row| row.cut_number != "C001"));
}

#[test]
fn test_cascade_by_name_and_unknown_phase() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let impacts = state
        .pipeline_api
        .simulate_delay_by_name(project_id, 1, "genga_raw", 2)
        .expect("simulate");
    assert_eq!(impacts.len(), 2);

    let err = state
        .pipeline_api
        .simulate_delay_by_name(project_id, 1, "genga", 2)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_cascade_on_completed_episode_is_empty() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C002").expect("seed");
    complete_all_phases(&state, project_id, "C001").expect("complete");
    complete_all_phases(&state, project_id, "C002").expect("complete");

    let impacts = state
        .pipeline_api
        .simulate_delay(project_id, 1, Phase::LayoutRaw, 10)
        .expect("simulate");
    assert!(impacts.is_empty());
}

#[test]
fn test_cascade_does_not_mutate_and_is_repeatable() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C004").expect("seed");
    set_status(&state, project_id, "C002", Phase::InBetween, PhaseStatus::InProgress)
        .expect("start");

    let board_before = state.cut_api.board(project_id, 1).expect("board");
    let first = state
        .pipeline_api
        .simulate_delay(project_id, 1, Phase::KeySupervision, 4)
        .expect("simulate");
    let second = state
        .pipeline_api
        .simulate_delay(project_id, 1, Phase::KeySupervision, 4)
        .expect("simulate");
    let board_after = state.cut_api.board(project_id, 1).expect("board");

    assert_eq!(first, second);
    assert_eq!(board_before, board_after);
}

#[test]
fn test_cascade_monotonic_in_days() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C002").expect("seed");

    let mut previous = 0;
    for days in 0..=12 {
        let impacts = state
            .pipeline_api
            .simulate_delay(project_id, 1, Phase::LayoutDirection, days)
            .expect("simulate");
        assert!(impacts.len() >= previous, "days={}", days);
        previous = impacts.len();
    }
    // layout-direction 起点的下游共 9 个工程
    assert_eq!(previous, 9);
}

// ==========================================
// 进捗集计
// ==========================================

#[test]
fn test_progress_aggregation_is_consistent() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C004").expect("seed");
    state
        .project_api
        .create_episode(
            project_id,
            &NewEpisode {
                number: 2,
                title: Some("second".to_string()),
                ..Default::default()
            },
        )
        .expect("episode 2");
    state
        .cut_api
        .register_cuts(project_id, 2, "C001-C002", None)
        .expect("cuts");

    complete_all_phases(&state, project_id, "C001").expect("complete");
    set_status(&state, project_id, "C002", Phase::LayoutRaw, PhaseStatus::Delayed).expect("delay");
    set_status(&state, project_id, "C003", Phase::LayoutRaw, PhaseStatus::Retake).expect("retake");

    let progress = state
        .pipeline_api
        .aggregate_progress(project_id)
        .expect("aggregate");

    assert_eq!(progress.project_id, project_id);
    assert_eq!(progress.episodes.len(), 2);
    assert!(progress.episodes.iter().all(|ep| ep.is_consistent()));

    let ep1 = &progress.episodes[0];
    assert_eq!(ep1.episode_number, 1);
    assert_eq!(ep1.cut_count, 4);
    let lo = ep1.phase(Phase::LayoutRaw).expect("layout-raw");
    assert_eq!(lo.total, 4);
    assert_eq!(lo.done, 1);
    assert_eq!(lo.delayed, 1);
    assert_eq!(lo.retake, 1);
    let v_edit = ep1.phase(Phase::VideoEdit).expect("video-edit");
    assert_eq!(v_edit.done, 1);

    let ep2 = &progress.episodes[1];
    assert_eq!(ep2.cut_count, 2);
    assert!(ep2.phases.iter().all(|p| p.total == 2 && p.done == 0));

    // 4 卡 × 10 + 2 卡 × 10 - C001 的 10 条完了
    assert_eq!(progress.unassigned_open, 50);
    assert_eq!(progress.delayed, 1);
}

#[test]
fn test_progress_counts_assigned_work() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");
    let creator = state
        .roster_api
        .add_creator(&NewCreator {
            name: "佐藤".to_string(),
            ..Default::default()
        })
        .expect("creator");
    state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::KeyRaw,
            &PhaseUpdate {
                assignee: Some(AssigneeRef::creator(creator.id)),
                ..Default::default()
            },
            fixed_now(),
        )
        .expect("assign");

    let progress = state
        .pipeline_api
        .aggregate_progress(project_id)
        .expect("aggregate");
    assert_eq!(progress.unassigned_open, 9);
}

#[test]
fn test_progress_unknown_project_is_not_found() {
    let (_tmp, state) = create_test_state().expect("state");
    let err = state.pipeline_api.aggregate_progress(999).unwrap_err();
    assert!(err.is_not_found());
}

// ==========================================
// 截止日视图
// ==========================================

#[test]
fn test_deadline_report_buckets() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C004").expect("seed");
    let today = date(2026, 10, 19);
    let deadlines = [
        ("C001", date(2026, 10, 17)),
        ("C002", today),
        ("C003", date(2026, 10, 20)),
        ("C004", date(2026, 10, 23)),
    ];
    for (cut, deadline) in deadlines {
        state
            .cut_api
            .update_phase(
                project_id,
                1,
                cut,
                Phase::KeyRaw,
                &PhaseUpdate {
                    deadline: Some(deadline),
                    ..Default::default()
                },
                fixed_now(),
            )
            .expect("deadline");
    }

    let report = state
        .pipeline_api
        .deadlines(project_id, today)
        .expect("deadlines");
    assert_eq!(report.buckets.overdue.len(), 1);
    assert_eq!(report.buckets.today.len(), 1);
    assert_eq!(report.buckets.tomorrow.len(), 1);
    assert_eq!(report.buckets.this_week.len(), 1);
    assert_eq!(report.buckets.overdue[0].cut_number, "C001");
    assert_eq!(report.soon_days, 3);
    // 今日 + 明日（C004 在 4 日后,超出 3 日）
    assert_eq!(report.due_soon, 2);
}
