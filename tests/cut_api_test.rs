// ==========================================
// 卡 / 工程记录 API 测试
// ==========================================
// 测试目标: 卡登记、工程记录更新、リテイク履历、看板
// ==========================================

mod test_helpers;

use seishin::api::{ApiError, PhaseUpdateOutcome};
use seishin::domain::{AssigneeRef, NewCompany, PhaseUpdate};
use seishin::{Phase, PhaseStatus};
use test_helpers::{create_test_state, date, fixed_now, seed_episode, set_status};

// ==========================================
// 登记
// ==========================================

#[test]
fn test_register_creates_ten_phase_records_per_cut() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C003").expect("seed");

    let cuts = state.cut_api.list_cuts(project_id, 1).expect("list");
    assert_eq!(cuts.len(), 3);
    for summary in &cuts {
        assert_eq!(summary.cut.difficulty, 3);
        assert_eq!(summary.current_phase, Some(Phase::LayoutRaw));
        assert_eq!(summary.completed_phases, 0);
    }

    let detail = state.cut_api.show_cut(project_id, 1, "C002").expect("show");
    let phases: Vec<Phase> = detail.phases.iter().map(|r| r.phase).collect();
    assert_eq!(phases, Phase::ALL.to_vec());
    assert!(detail
        .phases
        .iter()
        .all(|r| r.status == PhaseStatus::Pending && r.assignee.is_none()));
}

#[test]
fn test_batch_register_skips_existing_cuts() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C003").expect("seed");

    let created = state
        .cut_api
        .register_cuts(project_id, 1, "C002-C005", Some(4))
        .expect("register");
    assert_eq!(created, 2);

    let cuts = state.cut_api.list_cuts(project_id, 1).expect("list");
    assert_eq!(cuts.len(), 5);
    // 已存在的卡保持原难易度
    assert_eq!(cuts[1].cut.difficulty, 3);
    assert_eq!(cuts[4].cut.difficulty, 4);
}

#[test]
fn test_single_register_duplicate_is_constraint_violation() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let cut = state
        .cut_api
        .register_cut(project_id, 1, "C002", Some(2))
        .expect("register");
    assert_eq!(cut.number, "C002");
    assert_eq!(cut.difficulty, 2);

    let err = state
        .cut_api
        .register_cut(project_id, 1, "C001", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::ConstraintViolation(_)), "{:?}", err);
}

#[test]
fn test_register_rejects_bad_input() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let err = state
        .cut_api
        .register_cuts(project_id, 1, "C010-C001", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRange(_)), "{:?}", err);

    let err = state
        .cut_api
        .register_cuts(project_id, 1, "C002", Some(6))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)), "{:?}", err);

    let err = state
        .cut_api
        .register_cuts(project_id, 7, "C002", None)
        .unwrap_err();
    assert!(err.is_not_found());

    // 失败的登记不留下任何卡
    assert_eq!(state.cut_api.list_cuts(project_id, 1).expect("list").len(), 1);
}

#[test]
fn test_mixed_list_and_range_registers_nothing() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let err = state
        .cut_api
        .register_cuts(project_id, 1, "C010,C011-C013", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRange(_)), "{:?}", err);

    let numbers: Vec<String> = state
        .cut_api
        .list_cuts(project_id, 1)
        .expect("list")
        .into_iter()
        .map(|s| s.cut.number)
        .collect();
    assert_eq!(numbers, vec!["C001"]);
}

// ==========================================
// 工程记录更新
// ==========================================

#[test]
fn test_update_phase_sets_timestamps() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let outcome = state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::LayoutRaw,
            &PhaseUpdate {
                status: Some(PhaseStatus::InProgress),
                deadline: Some(date(2026, 10, 25)),
                ..Default::default()
            },
            fixed_now(),
        )
        .expect("update");

    match outcome {
        PhaseUpdateOutcome::Updated(record) => {
            assert_eq!(record.status, PhaseStatus::InProgress);
            assert_eq!(record.deadline, Some(date(2026, 10, 25)));
            assert_eq!(record.started_at, Some(fixed_now()));
            assert_eq!(record.completed_at, None);
        }
        PhaseUpdateOutcome::NoChange => panic!("expected an update"),
    }

    set_status(&state, project_id, "C001", Phase::LayoutRaw, PhaseStatus::Completed)
        .expect("complete");
    let detail = state.cut_api.show_cut(project_id, 1, "C001").expect("show");
    let record = detail.phase(Phase::LayoutRaw).expect("record");
    assert_eq!(record.completed_at, Some(fixed_now()));
    assert_eq!(detail.current_phase(), Some(Phase::LayoutDirection));
}

#[test]
fn test_identical_update_is_no_change() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let outcome = state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::KeyRaw,
            &PhaseUpdate {
                status: Some(PhaseStatus::Pending),
                ..Default::default()
            },
            fixed_now(),
        )
        .expect("update");
    assert_eq!(outcome, PhaseUpdateOutcome::NoChange);

    let outcome = state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::KeyRaw,
            &PhaseUpdate::default(),
            fixed_now(),
        )
        .expect("update");
    assert!(!outcome.is_updated());
}

#[test]
fn test_completed_phase_only_reopens_as_retake() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");
    set_status(&state, project_id, "C001", Phase::InBetween, PhaseStatus::Completed)
        .expect("complete");

    let err = state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::InBetween,
            &PhaseUpdate {
                status: Some(PhaseStatus::Pending),
                ..Default::default()
            },
            fixed_now(),
        )
        .unwrap_err();
    assert!(
        matches!(err, ApiError::InvalidStateTransition { .. }),
        "{:?}",
        err
    );

    let detail = state.cut_api.show_cut(project_id, 1, "C001").expect("show");
    assert_eq!(
        detail.phase(Phase::InBetween).map(|r| r.status),
        Some(PhaseStatus::Completed)
    );
}

#[test]
fn test_retake_history_opens_and_resolves() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");
    set_status(&state, project_id, "C001", Phase::KeySupervision, PhaseStatus::Completed)
        .expect("complete");

    state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::KeySupervision,
            &PhaseUpdate {
                status: Some(PhaseStatus::Retake),
                retake_reason: Some("line quality".to_string()),
                ..Default::default()
            },
            fixed_now(),
        )
        .expect("retake");

    let history = state
        .cut_api
        .retake_history(project_id, 1, "C001")
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].phase, Phase::KeySupervision);
    assert_eq!(history[0].reason.as_deref(), Some("line quality"));
    assert!(!history[0].is_resolved());

    set_status(&state, project_id, "C001", Phase::KeySupervision, PhaseStatus::InProgress)
        .expect("rework");
    let history = state
        .cut_api
        .retake_history(project_id, 1, "C001")
        .expect("history");
    assert_eq!(history.len(), 1);
    assert!(history[0].is_resolved());
}

#[test]
fn test_assignee_must_exist() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let err = state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::InBetween,
            &PhaseUpdate {
                assignee: Some(AssigneeRef::company(42)),
                ..Default::default()
            },
            fixed_now(),
        )
        .unwrap_err();
    assert!(err.is_not_found());

    let company = state
        .roster_api
        .add_company(&NewCompany {
            name: "スタジオ東雲".to_string(),
            ..Default::default()
        })
        .expect("company");
    let outcome = state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C001",
            Phase::InBetween,
            &PhaseUpdate {
                assignee: Some(AssigneeRef::company(company.id)),
                ..Default::default()
            },
            fixed_now(),
        )
        .expect("assign");
    match outcome {
        PhaseUpdateOutcome::Updated(record) => {
            assert_eq!(record.assignee_name.as_deref(), Some("スタジオ東雲"));
        }
        PhaseUpdateOutcome::NoChange => panic!("expected an update"),
    }
}

#[test]
fn test_update_unknown_cut_is_not_found() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001").expect("seed");

    let err = state
        .cut_api
        .update_phase(
            project_id,
            1,
            "C999",
            Phase::LayoutRaw,
            &PhaseUpdate {
                status: Some(PhaseStatus::InProgress),
                ..Default::default()
            },
            fixed_now(),
        )
        .unwrap_err();
    assert!(err.is_not_found());
}

// ==========================================
// 看板 / 话数概览
// ==========================================

#[test]
fn test_board_and_episode_overview() {
    let (_tmp, state) = create_test_state().expect("state");
    let project_id = seed_episode(&state, "C001-C003").expect("seed");
    set_status(&state, project_id, "C002", Phase::LayoutRaw, PhaseStatus::Completed)
        .expect("complete");
    set_status(&state, project_id, "C003", Phase::LayoutRaw, PhaseStatus::Delayed)
        .expect("delay");

    let board = state.cut_api.board(project_id, 1).expect("board");
    assert_eq!(board.len(), 10);
    assert_eq!(board[0].phase, Phase::LayoutRaw);
    let statuses: Vec<(&str, PhaseStatus)> = board[0]
        .entries
        .iter()
        .map(|e| (e.cut_number.as_str(), e.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("C001", PhaseStatus::Pending),
            ("C002", PhaseStatus::Completed),
            ("C003", PhaseStatus::Delayed),
        ]
    );

    let overview = state.project_api.show_episode(project_id, 1).expect("overview");
    assert_eq!(overview.cut_count, 3);
    assert_eq!(overview.phases.len(), 10);
    assert_eq!(overview.phases[0].done, 1);
    assert_eq!(overview.phases[0].delayed, 1);
}
