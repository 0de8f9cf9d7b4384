mod helpers;

use runcheck::domain::models::{
    default_subjects, ChecklistType, Device, HistoryTarget, SafetyLevel, Slot, StatusValue, SubjectUpdate,
    TargetType, Tracked, WatchedFields,
};
use runcheck::domain::ports::SubjectRepository;
use runcheck::DomainError;

use helpers::database::{admin, leader, setup_test_env, slot_with_checklist, teardown_test_env};

#[tokio::test]
async fn test_override_equal_to_default_is_removed() {
    let env = setup_test_env().await;
    let (_, view) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;
    let checklists = &env.engine.checklists;
    let manager = leader("ARR01");

    let relaxed = SubjectUpdate { required: Some(false), ..SubjectUpdate::default() };
    let ee = checklists.update_subject(&manager, view.id, "EE", &relaxed).await.unwrap();
    assert!(!ee.required);
    assert_eq!(env.repos.subjects.list_overrides(view.id).await.unwrap().len(), 1);

    let restored = SubjectUpdate { required: Some(true), ..SubjectUpdate::default() };
    let ee = checklists.update_subject(&manager, view.id, "EE", &restored).await.unwrap();
    assert!(ee.required);
    assert!(env.repos.subjects.list_overrides(view.id).await.unwrap().is_empty());

    // Setting the default value when no override exists stores nothing either
    checklists.update_subject(&manager, view.id, "ME", &restored).await.unwrap();
    assert!(env.repos.subjects.list_overrides(view.id).await.unwrap().is_empty());

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_mandatory_subject_required_is_immutable() {
    let env = setup_test_env().await;
    let slot = env
        .engine
        .targets
        .create_slot(&admin(), Slot::new("FS1_CSS:PPS", "ARR01").with_safety_level(SafetyLevel::CreditedPps))
        .await
        .unwrap();
    let view = env
        .engine
        .checklists
        .create_checklist(&leader("ARR01"), TargetType::Slot, slot.id)
        .await
        .unwrap();
    assert_eq!(view.checklist_type, ChecklistType::SlotSafety);

    for subject in ["ESHQ", "PPS"] {
        for required in [true, false] {
            let update = SubjectUpdate { required: Some(required), ..SubjectUpdate::default() };
            let err = env
                .engine
                .checklists
                .update_subject(&admin(), view.id, subject, &update)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::ValidationFailed(_)), "{subject} required = {required}: {err:?}");
            assert!(err.to_string().contains("mandatory"), "{subject}: {err}");
        }
    }

    // A mandatory subject's other fields remain editable
    let update = SubjectUpdate { desc: Some("ESH & Quality".to_string()), ..SubjectUpdate::default() };
    let eshq = env
        .engine
        .checklists
        .update_subject(&admin(), view.id, "ESHQ", &update)
        .await
        .unwrap();
    assert_eq!(eshq.desc, "ESH & Quality");
    assert!(eshq.mandatory);

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_approval_follows_final_subject_only() {
    let env = setup_test_env().await;
    let checklists = &env.engine.checklists;

    let (_, first) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;
    checklists.set_status(&leader("EE"), first.id, "EE", "Y", "").await.unwrap();
    let outcome = checklists.set_status(&leader("ARR01"), first.id, "AM", "Y", "").await.unwrap();
    assert!(outcome.summary.approved);
    assert_eq!((outcome.summary.checked, outcome.summary.total), (2, 3));

    let (_, second) = slot_with_checklist(&env, "FS2_CSS", "ARR01").await;
    checklists.set_status(&leader("EE"), second.id, "EE", "Y", "").await.unwrap();
    checklists.set_status(&leader("ME"), second.id, "ME", "Y", "").await.unwrap();
    let outcome = checklists.set_status(&leader("ARR01"), second.id, "AM", "N", "").await.unwrap();
    assert!(!outcome.summary.approved);
    assert_eq!((outcome.summary.checked, outcome.summary.total), (2, 3));

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_lock_and_unlock_round_trip() {
    let env = setup_test_env().await;
    let checklists = &env.engine.checklists;
    let (_, view) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;

    checklists.set_status(&leader("ARR01"), view.id, "AM", "Y", "").await.unwrap();

    for (subject, unit) in [("EE", "EE"), ("ME", "ME")] {
        let err = checklists
            .set_status(&leader(unit), view.id, subject, "Y", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)), "{subject}: {err:?}");
    }

    let outcome = checklists.set_status(&leader("ARR01"), view.id, "AM", "N", "").await.unwrap();
    assert!(!outcome.summary.approved);

    let outcome = checklists.set_status(&leader("EE"), view.id, "EE", "Y", "").await.unwrap();
    assert_eq!(outcome.status.value, StatusValue::Y);
    assert_eq!(outcome.summary.checked, 1);

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_yc_requires_comment() {
    let env = setup_test_env().await;
    let checklists = &env.engine.checklists;
    let (_, view) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;

    for comment in ["", "   "] {
        let err = checklists
            .set_status(&leader("EE"), view.id, "EE", "YC", comment)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    let outcome = checklists.set_status(&leader("EE"), view.id, "EE", "YC", "ok").await.unwrap();
    assert_eq!(outcome.status.value, StatusValue::YC);
    assert_eq!(outcome.status.comment, "ok");
    assert_eq!(outcome.summary.checked, 1);

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_unchanged_save_records_no_history() {
    let env = setup_test_env().await;

    let mut device = Tracked::new(Device::new("FE_MAG_01", "magnet", "EE"));
    let store = &*env.repos.targets;
    let first = env.engine.ledger.save(&mut device, "amy", &WatchedFields::All, store).await.unwrap();
    let second = env.engine.ledger.save(&mut device, "amy", &WatchedFields::All, store).await.unwrap();
    assert!(first.is_some());
    assert!(second.is_none());

    let history = env
        .engine
        .checklists
        .history_for(HistoryTarget::Device, device.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_repeating_a_status_adds_no_history() {
    let env = setup_test_env().await;
    let checklists = &env.engine.checklists;
    let (_, view) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;

    checklists.set_status(&leader("EE"), view.id, "EE", "Y", "").await.unwrap();
    checklists.set_status(&leader("EE"), view.id, "EE", "Y", "").await.unwrap();
    assert_eq!(checklists.status_history(view.id, "EE").await.unwrap().len(), 1);

    checklists.set_status(&leader("EE"), view.id, "EE", "N", "").await.unwrap();
    let history = checklists.status_history(view.id, "EE").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].changes[0].path, "value");
    assert_eq!(history[0].changes[0].value, serde_json::json!("N"));

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_slot_checklist_end_to_end() {
    let env = setup_test_env().await;
    let checklists = &env.engine.checklists;
    let (_, view) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;

    assert_eq!(view.checklist_type, ChecklistType::SlotDefault);
    let template = default_subjects(ChecklistType::SlotDefault);
    assert_eq!(view.subjects.len(), template.len());
    for (effective, default) in view.subjects.iter().zip(&template) {
        assert_eq!(effective.name, default.name);
        assert_eq!(effective.desc, default.desc);
        assert_eq!(effective.required, default.required);
        assert_eq!(effective.assignees, default.assignees);
        assert!(!effective.is_custom());
    }
    assert!(!view.approved);

    let outcome = checklists.set_status(&leader("EE"), view.id, "EE", "Y", "").await.unwrap();
    assert!(!outcome.summary.approved);

    let outcome = checklists
        .set_status(&leader("ARR01"), view.id, "AM", "YC", "cleared for beam")
        .await
        .unwrap();
    assert!(outcome.summary.approved);

    let err = checklists.set_status(&leader("ME"), view.id, "ME", "Y", "").await.unwrap_err();
    assert!(matches!(err, DomainError::ValidationFailed(_)));
    assert_eq!(err.status_code(), 400);

    let current = checklists.get_checklist(view.id).await.unwrap();
    assert!(current.approved);
    assert_eq!(current.status_for("AM").unwrap().input_by, "arr01-lead");

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_custom_subject_stays_on_its_checklist() {
    let env = setup_test_env().await;
    let checklists = &env.engine.checklists;
    let (_, x) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;
    let (_, y) = slot_with_checklist(&env, "FS2_CSS", "ARR01").await;

    let custom = checklists
        .create_custom_subject(&leader("ARR01"), x.id, "Vacuum leak check", &["GRP:VAC#LEADER".to_string()])
        .await
        .unwrap();
    assert!(custom.name.starts_with('C'));
    assert!(custom.required);

    let on_x = checklists.get_checklist(x.id).await.unwrap();
    assert!(on_x.subjects.iter().any(|s| s.name == custom.name));
    assert_eq!(on_x.total, 4);

    let on_y = checklists.get_checklist(y.id).await.unwrap();
    assert!(on_y.subjects.iter().all(|s| s.name != custom.name));
    assert_eq!(on_y.total, 3);

    teardown_test_env(env).await;
}

#[tokio::test]
async fn test_status_rejections_by_kind() {
    let env = setup_test_env().await;
    let checklists = &env.engine.checklists;
    let (_, view) = slot_with_checklist(&env, "FS1_CSS", "ARR01").await;

    let err = checklists.set_status(&leader("EE"), view.id, "NOPE", "Y", "").await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = checklists.set_status(&leader("CRYO"), view.id, "CRYO", "Y", "").await.unwrap_err();
    assert!(matches!(err, DomainError::ValidationFailed(_)), "optional subject: {err:?}");

    let err = checklists.set_status(&leader("EE"), view.id, "EE", "MAYBE", "").await.unwrap_err();
    assert!(matches!(err, DomainError::ValidationFailed(_)));

    let err = checklists.set_status(&leader("ME"), view.id, "EE", "Y", "").await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    // The override role may set any status
    let operator = runcheck::Actor::new("ops", ["SYS:RUNCHECK"]);
    checklists.set_status(&operator, view.id, "EE", "Y", "").await.unwrap();

    teardown_test_env(env).await;
}
