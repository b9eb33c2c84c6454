use chrono::NaiveDate;
use timeline_tool::timeline::{NodeKind, ROOT_ID, Timeline, TimelineError};
use uuid::Uuid;

#[test]
fn new_timeline_has_only_the_root_group() {
    let timeline = Timeline::new();
    assert!(timeline.is_empty());
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline.kind(ROOT_ID), Some(NodeKind::Group));
    assert!(timeline.root().children.is_empty());
}

#[test]
fn inserted_children_keep_their_order() {
    let mut timeline = Timeline::new();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();
    let g = timeline.insert_group(ROOT_ID, "g").unwrap();
    let b = timeline.insert_task(g, "b").unwrap();

    assert_eq!(timeline.children(ROOT_ID).unwrap(), &[a, g]);
    assert_eq!(timeline.children(g).unwrap(), &[b]);
    assert_eq!(timeline.parent(b), Some(g));
    assert_eq!(timeline.parent(a), Some(ROOT_ID));
    assert_eq!(timeline.parent(ROOT_ID), None);
}

#[test]
fn reserved_and_duplicate_ids_are_rejected() {
    let mut timeline = Timeline::new();
    assert_eq!(
        timeline.insert_task_with_id(ROOT_ID, ROOT_ID, "bad"),
        Err(TimelineError::ReservedRoot)
    );

    let id = Uuid::new_v4();
    timeline.insert_task_with_id(id, ROOT_ID, "a").unwrap();
    assert_eq!(
        timeline.insert_group_with_id(id, ROOT_ID, "b"),
        Err(TimelineError::DuplicateId(id))
    );
}

#[test]
fn inserting_under_a_task_fails() {
    let mut timeline = Timeline::new();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();
    assert_eq!(
        timeline.insert_task(a, "child"),
        Err(TimelineError::NotAGroup(a))
    );
}

#[test]
fn removing_a_group_drops_its_subtree_and_scrubs_edges() {
    let mut timeline = Timeline::new();
    let g = timeline.insert_group(ROOT_ID, "g").unwrap();
    let inner = timeline.insert_task(g, "inner").unwrap();
    let outer = timeline.insert_task(ROOT_ID, "outer").unwrap();
    timeline.set_previous(outer, vec![inner]).unwrap();

    timeline.remove_node(g).unwrap();

    assert!(!timeline.contains(g));
    assert!(!timeline.contains(inner));
    assert!(timeline.task(outer).unwrap().previous.is_empty());
    assert_eq!(timeline.children(ROOT_ID).unwrap(), &[outer]);
}

#[test]
fn the_root_cannot_be_removed_or_moved() {
    let mut timeline = Timeline::new();
    assert_eq!(timeline.remove_node(ROOT_ID), Err(TimelineError::ReservedRoot));
    assert_eq!(
        timeline.move_node(ROOT_ID, ROOT_ID, 0),
        Err(TimelineError::ReservedRoot)
    );
}

#[test]
fn move_node_reorders_within_a_parent() {
    let mut timeline = Timeline::new();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();
    let b = timeline.insert_task(ROOT_ID, "b").unwrap();
    let c = timeline.insert_task(ROOT_ID, "c").unwrap();

    timeline.move_node(c, ROOT_ID, 0).unwrap();
    assert_eq!(timeline.children(ROOT_ID).unwrap(), &[c, a, b]);
}

#[test]
fn move_node_reparents() {
    let mut timeline = Timeline::new();
    let g = timeline.insert_group(ROOT_ID, "g").unwrap();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();

    timeline.move_node(a, g, 99).unwrap(); // index clamps
    assert_eq!(timeline.children(g).unwrap(), &[a]);
    assert_eq!(timeline.parent(a), Some(g));
    assert_eq!(timeline.children(ROOT_ID).unwrap(), &[g]);
}

#[test]
fn moving_a_group_into_its_own_subtree_fails() {
    let mut timeline = Timeline::new();
    let outer = timeline.insert_group(ROOT_ID, "outer").unwrap();
    let inner = timeline.insert_group(outer, "inner").unwrap();

    assert_eq!(
        timeline.move_node(outer, inner, 0),
        Err(TimelineError::MoveIntoSelf(outer))
    );
    assert_eq!(
        timeline.move_node(outer, outer, 0),
        Err(TimelineError::MoveIntoSelf(outer))
    );
}

#[test]
fn workload_and_progress_are_validated() {
    let mut timeline = Timeline::new();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();

    assert!(timeline.set_workload(a, 2.5).is_ok());
    assert_eq!(
        timeline.set_workload(a, -1.0),
        Err(TimelineError::InvalidWorkload(a))
    );
    assert_eq!(
        timeline.set_workload(a, f64::NAN),
        Err(TimelineError::InvalidWorkload(a))
    );

    assert!(timeline.set_progress(a, 0.75).is_ok());
    assert_eq!(
        timeline.set_progress(a, 1.5),
        Err(TimelineError::InvalidProgress(a))
    );
}

#[test]
fn dependency_targets_must_exist_and_avoid_the_root() {
    let mut timeline = Timeline::new();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();

    let ghost = Uuid::new_v4();
    assert_eq!(
        timeline.set_previous(a, vec![ghost]),
        Err(TimelineError::UnknownNode(ghost))
    );
    assert_eq!(
        timeline.set_previous(a, vec![ROOT_ID]),
        Err(TimelineError::ReservedRoot)
    );
}

#[test]
fn self_reference_is_allowed_at_the_model_level() {
    let mut timeline = Timeline::new();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();
    assert!(timeline.set_previous(a, vec![a]).is_ok());
}

#[test]
fn static_begin_and_assignments_round_trip() {
    let mut timeline = Timeline::new();
    let a = timeline.insert_task(ROOT_ID, "a").unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    timeline.set_static_begin(a, Some(date)).unwrap();
    assert_eq!(timeline.task(a).unwrap().static_begin, Some(date));
    timeline.set_static_begin(a, None).unwrap();
    assert_eq!(timeline.task(a).unwrap().static_begin, None);
}

#[test]
fn preorder_follows_the_display_order() {
    let mut timeline = Timeline::new();
    let g = timeline.insert_group(ROOT_ID, "g").unwrap();
    let a = timeline.insert_task(g, "a").unwrap();
    let b = timeline.insert_task(g, "b").unwrap();
    let c = timeline.insert_task(ROOT_ID, "c").unwrap();

    assert_eq!(timeline.preorder(), vec![ROOT_ID, g, a, b, c]);
}
