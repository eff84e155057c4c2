//! Tests for the engine module.

use std::sync::Arc;

use jiff::civil::{date, Date};

use super::*;
use crate::{
    models::{Action, Section, Task, TaskPayload, Timeline},
    stream::StreamSession,
};

fn queue_for(text: &str) -> Vec<BufferedAction> {
    let mut session = StreamSession::new();
    let mut actions = session.consume(text).actions;
    actions.extend(session.finish().actions);
    actions
}

fn drain_text(text: &str) -> DrainOutcome {
    drain(
        &Plan::new(),
        &TaskDictionary::new(),
        queue_for(text).into_iter().map(QueuedAction::from),
        DEFAULT_ITERATION_CAP,
    )
}

fn start_of(plan: &Plan, id: &str) -> Option<Date> {
    plan.find_task(id).and_then(|t| t.start_date)
}

fn plan_with(tasks: Vec<Task>) -> Plan {
    let mut plan = Plan {
        sections: vec![Section {
            name: "A".to_string(),
            tasks,
        }],
        timeline: None,
    };
    plan.widen_timeline();
    plan
}

fn dated(id: &str, start: Date, duration: u32) -> Task {
    Task::new_task(id, id.to_uppercase(), duration).starting(start)
}

fn assert_edges_hold(plan: &Plan) {
    for child in plan.tasks() {
        let Some(child_start) = child.start_date else {
            continue;
        };
        for parent in &child.dependencies {
            let parent_end = plan.find_task(parent).and_then(Task::resolved_end).unwrap();
            assert!(
                child_start >= parent_end,
                "{} starts {} before {} ends {}",
                child.id,
                child_start,
                parent,
                parent_end
            );
        }
    }
}

// ---------------------------------------------------------------------------
// apply / drain
// ---------------------------------------------------------------------------

#[test]
fn test_scenario_dependency_chain() {
    let outcome = drain_text("```\nsection A\nOne :t1, 2025-01-01, 2d\nTwo :t2, after t1, 2d\n```\n");
    let t2 = outcome.plan.find_task("t2").unwrap();
    assert_eq!(t2.start_date, Some(date(2025, 1, 3)));
    assert_eq!(t2.end_date, Some(date(2025, 1, 5)));
    assert_eq!(
        outcome.plan.timeline,
        Some(Timeline {
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 5),
        })
    );
    assert_eq!(outcome.dictionary, TaskDictionary::from_plan(&outcome.plan));
}

#[test]
fn test_scenario_forward_milestone() {
    let outcome = drain_text(
        "```\nsection A\nDone: milestone, after t1\nOne :t1, 2025-01-01, 4d\n```\n",
    );
    let done = outcome.plan.find_task("done").unwrap();
    let t1 = outcome.plan.find_task("t1").unwrap();
    assert_eq!(done.start_date, t1.end_date);
    assert_eq!(done.start_date, Some(date(2025, 1, 5)));
    assert!(outcome.parked.is_empty());
    assert!(outcome.dropped.is_empty());
}

#[test]
fn test_forward_references_resolve_like_backward_ones() {
    let backward = drain_text(
        "```\nsection A\nOne :t1, 2025-01-01, 2d\nTwo :t2, after t1, 3d\nThree :t3, after t2, 1d\n```\n",
    );
    let forward = drain_text(
        "```\nsection A\nThree :t3, after t2, 1d\nTwo :t2, after t1, 3d\nOne :t1, 2025-01-01, 2d\n```\n",
    );
    for id in ["t1", "t2", "t3"] {
        assert_eq!(
            backward.plan.find_task(id),
            forward.plan.find_task(id),
            "id {id}"
        );
    }
    assert_eq!(backward.plan.timeline, forward.plan.timeline);
}

#[test]
fn test_applying_queue_twice_is_idempotent() {
    let text = "```\nsection A\nDone: milestone, after t1\nOne :t1, 2025-01-01, 2d\n\
                section B\nTwo :t2, after done, 2d\n```\n";
    let queue: Vec<QueuedAction> = queue_for(text).into_iter().map(Into::into).collect();
    let once = drain(&Plan::new(), &TaskDictionary::new(), queue.clone(), 10);
    let twice = drain(&once.plan, &once.dictionary, queue.clone(), 10);
    assert_eq!(once.plan, twice.plan);

    let doubled = drain(
        &Plan::new(),
        &TaskDictionary::new(),
        queue.iter().cloned().chain(queue.iter().cloned()),
        10,
    );
    assert_eq!(once.plan, doubled.plan);
}

#[test]
fn test_add_section_is_not_duplicated() {
    let plan = Plan::new();
    let add = BufferedAction::new(Action::AddSection {
        name: "A".to_string(),
    });
    let first = apply(&plan, &add, &TaskDictionary::new(), 10);
    let second = apply(&first.plan, &add, &first.dictionary, 10);
    assert_eq!(second.plan.sections.len(), 1);
    assert_eq!(first.plan, second.plan);
}

#[test]
fn test_task_for_missing_section_is_noop() {
    let action = BufferedAction::new(Action::add(TaskPayload::new(
        "Nowhere",
        dated("t1", date(2025, 1, 1), 1),
    )));
    let applied = apply(&Plan::new(), &action, &TaskDictionary::new(), 10);
    assert_eq!(applied.plan, Plan::new());
    assert!(applied.dictionary.is_empty());
    assert!(applied.requeue.is_empty());
}

#[test]
fn test_add_existing_id_replaces_and_stays_unique() {
    let plan = Plan {
        sections: vec![Section::new("A"), Section::new("B")],
        timeline: None,
    };
    let first = apply(
        &plan,
        &BufferedAction::new(Action::add(TaskPayload::new("A", dated("t1", date(2025, 1, 1), 1)))),
        &TaskDictionary::new(),
        10,
    );
    let second = apply(
        &first.plan,
        &BufferedAction::new(Action::add(TaskPayload::new("B", dated("t1", date(2025, 1, 1), 5)))),
        &first.dictionary,
        10,
    );
    assert_eq!(second.plan.tasks().count(), 1);
    assert_eq!(second.plan.section_of("t1"), Some("B"));
    assert_eq!(second.dictionary.get("t1").unwrap().duration, Some(5));
}

#[test]
fn test_pending_add_requeues_resolve_marker() {
    let plan = Plan {
        sections: vec![Section::new("A")],
        timeline: None,
    };
    let pending = Task::new_task("t2", "Two", 2).after(["t1"]);
    let applied = apply(
        &plan,
        &BufferedAction::new(Action::add(TaskPayload::new("A", pending.clone()))),
        &TaskDictionary::new(),
        10,
    );
    assert!(applied.plan.find_task("t2").unwrap().is_pending());
    assert_eq!(applied.requeue.len(), 1);
    let retry = &applied.requeue[0];
    assert!(matches!(retry.action, Action::ResolveDependency(_)));

    // Still missing: the very same action comes back.
    let again = apply(&applied.plan, retry, &applied.dictionary, 10);
    assert_eq!(again.requeue, vec![retry.clone()]);
}

#[test]
fn test_missing_dependency_retry_is_capped() {
    let text = "```\nsection A\nOrphan :t1, after ghost, 2d\nOther :t2, 2025-01-01, 1d\n```\n";
    let first = drain(
        &Plan::new(),
        &TaskDictionary::new(),
        queue_for(text).into_iter().map(QueuedAction::from),
        2,
    );
    assert_eq!(first.parked.len(), 1);
    assert!(first.dropped.is_empty());

    // The parked retry fails again on the next drain and hits the cap.
    let second = drain(&first.plan, &first.dictionary, first.parked.clone(), 2);
    assert_eq!(second.dropped, vec!["t1".to_string()]);
    assert!(second.parked.is_empty());
    assert!(second.plan.find_task("t1").unwrap().is_pending());
    assert!(second.plan.find_task("t2").is_some());
}

#[test]
fn test_cycle_through_pipeline_is_left_unresolved() {
    let outcome = drain_text("```\nsection A\nA :a, after b, 1d\nB :b, after a, 1d\n```\n");
    assert!(start_of(&outcome.plan, "a").is_none());
    assert!(start_of(&outcome.plan, "b").is_none());
    assert!(outcome.parked.len() + outcome.dropped.len() <= 2);
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_engine_streams_incrementally() {
    let engine = EngineBuilder::new().build().unwrap();
    let mut session = StreamSession::new();
    let text = "```mermaid\nsection A\nTwo :t2, after t1, 2d\nOne :t1, 2025-01-01, 2d\n```\n";

    for piece in text.as_bytes().chunks(5) {
        let chunk = std::str::from_utf8(piece).unwrap();
        engine.enqueue(session.consume(chunk).actions);
        engine.drain().await.unwrap();
    }
    engine.enqueue(session.finish().actions);
    engine.drain().await.unwrap();

    let plan = engine.plan();
    assert_eq!(start_of(&plan, "t2"), Some(date(2025, 1, 3)));
    assert_eq!(engine.dictionary(), TaskDictionary::from_plan(&plan));
}

#[tokio::test]
async fn test_engine_rejects_concurrent_drain() {
    let engine = Arc::new(EngineBuilder::new().build().unwrap());
    engine.enqueue(queue_for(
        "```\nsection A\nOne :t1, 2025-01-01, 2d\nTwo :t2, after t1, 2d\n```\n",
    ));

    let (first, second) = tokio::join!(engine.drain(), engine.drain());
    let errors = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(GanttError::DrainInProgress)))
        .count();
    assert_eq!(errors, 1);

    // The guard is released afterwards.
    assert!(engine.drain().await.is_ok());
    assert!(engine.apply_all().is_ok());
    assert_eq!(start_of(&engine.plan(), "t2"), Some(date(2025, 1, 3)));
}

#[test]
fn test_engine_apply_next_and_reset() {
    let engine = EngineBuilder::new().build().unwrap();
    engine.enqueue(queue_for("```\nsection A\nOne :t1, 2025-01-01, 2d\n```\n"));
    let total = engine.queued();

    assert!(engine.apply_next().unwrap());
    assert_eq!(engine.queued(), total - 1);
    assert_eq!(engine.plan().sections.len(), 1);

    let report = engine.apply_all().unwrap();
    assert_eq!(report.applied, total - 1);
    assert!(!engine.apply_next().unwrap());

    engine.reset();
    assert_eq!(engine.plan(), Plan::new());
    assert_eq!(engine.queued(), 0);
}

#[test]
fn test_engine_apply_next_keeps_fifo_order() {
    let engine = EngineBuilder::new().build().unwrap();
    engine.enqueue(queue_for(
        "```\nsection A\nDone: milestone, after t1\nOne :t1, 2025-01-01, 2d\n```\n",
    ));

    // Section, then the pending milestone whose retry goes to the back.
    assert!(engine.apply_next().unwrap());
    assert!(engine.apply_next().unwrap());
    assert!(engine.plan().find_task("t1").is_none());

    // The third step is the task that followed the milestone, not its retry.
    assert!(engine.apply_next().unwrap());
    assert_eq!(start_of(&engine.plan(), "t1"), Some(date(2025, 1, 1)));

    let report = engine.apply_all().unwrap();
    assert!(report.dropped.is_empty());
    assert_eq!(start_of(&engine.plan(), "done"), Some(date(2025, 1, 3)));
}

#[tokio::test]
async fn test_engine_keeps_distant_forward_reference() {
    let engine = EngineBuilder::new().build().unwrap();
    let mut session = StreamSession::new();
    let mut lines = vec![
        "```".to_string(),
        "section A".to_string(),
        "Done: milestone, after t1".to_string(),
    ];
    lines.extend((0..15).map(|n| format!("Filler {n} :f{n}, 2025-01-01, 1d")));
    lines.push("One :t1, 2025-02-01, 2d".to_string());

    let mut dropped = Vec::new();
    for line in &lines {
        engine.enqueue(session.consume(&format!("{line}\n")).actions);
        dropped.extend(engine.drain().await.unwrap().dropped);
    }

    // Dated as soon as t1 lands, before the closing sweep.
    assert_eq!(start_of(&engine.plan(), "done"), Some(date(2025, 2, 3)));
    assert!(dropped.is_empty());
    assert_eq!(engine.queued(), 0);
}

#[test]
fn test_engine_applies_structural_updates() {
    let plan = plan_with(vec![
        dated("t1", date(2025, 1, 1), 2),
        dated("t2", date(2025, 1, 3), 2).after(["t1"]),
    ]);
    let engine = EngineBuilder::new()
        .with_plan(Some(plan.clone()))
        .build()
        .unwrap();

    let updates = Propagator::new(&plan).on_task_moved("t1", date(2025, 1, 10));
    engine.enqueue_updates(&updates);
    engine.apply_all().unwrap();

    let moved = engine.plan();
    assert_eq!(start_of(&moved, "t2"), Some(date(2025, 1, 12)));
    assert_eq!(moved.timeline.unwrap().end_date, date(2025, 1, 14));
    assert_edges_hold(&moved);
}

// ---------------------------------------------------------------------------
// Propagator
// ---------------------------------------------------------------------------

#[test]
fn test_move_later_pushes_dependents_transitively() {
    let plan = plan_with(vec![
        dated("a", date(2025, 1, 1), 2),
        dated("b", date(2025, 1, 3), 3).after(["a"]),
        dated("c", date(2025, 1, 6), 1).after(["b"]),
        dated("far", date(2025, 2, 1), 1).after(["c"]),
    ]);
    let updates = Propagator::new(&plan).on_task_moved("a", date(2025, 1, 5));
    let moved = plan.with_updates(&updates);

    assert_eq!(start_of(&moved, "a"), Some(date(2025, 1, 5)));
    assert_eq!(start_of(&moved, "b"), Some(date(2025, 1, 7)));
    assert_eq!(start_of(&moved, "c"), Some(date(2025, 1, 10)));
    // Already satisfied: untouched and not reported.
    assert_eq!(start_of(&moved, "far"), Some(date(2025, 2, 1)));
    assert!(updates.iter().all(|u| u.id != "far"));
    assert_edges_hold(&moved);
}

#[test]
fn test_move_earlier_pulls_dependencies_back() {
    let plan = plan_with(vec![
        dated("a", date(2025, 1, 1), 2),
        dated("b", date(2025, 1, 3), 3).after(["a"]),
        dated("c", date(2025, 1, 6), 1).after(["b"]),
    ]);
    let updates = Propagator::new(&plan).on_task_moved("c", date(2025, 1, 4));
    let moved = plan.with_updates(&updates);

    // b must end by Jan 4, so it starts Jan 1; a must end by Jan 1.
    assert_eq!(start_of(&moved, "b"), Some(date(2025, 1, 1)));
    assert_eq!(moved.find_task("b").unwrap().end_date, Some(date(2025, 1, 4)));
    assert_eq!(start_of(&moved, "a"), Some(date(2024, 12, 30)));
    assert_edges_hold(&moved);
}

#[test]
fn test_move_milestone_and_diamond() {
    let plan = plan_with(vec![
        dated("a", date(2025, 1, 1), 1),
        dated("b", date(2025, 1, 2), 1).after(["a"]),
        dated("c", date(2025, 1, 2), 5).after(["a"]),
        Task::new_milestone("m", "M")
            .after(["b", "c"])
            .starting(date(2025, 1, 7)),
    ]);
    let updates = Propagator::new(&plan).on_task_moved("a", date(2025, 1, 3));
    let moved = plan.with_updates(&updates);

    assert_eq!(start_of(&moved, "c"), Some(date(2025, 1, 4)));
    assert_eq!(start_of(&moved, "m"), Some(date(2025, 1, 9)));
    let milestone = updates.iter().find(|u| u.id == "m").unwrap();
    assert_eq!(milestone.end_date, None);
    assert_eq!(milestone.duration, None);
    assert_edges_hold(&moved);
}

#[test]
fn test_move_unknown_or_same_day() {
    let plan = plan_with(vec![dated("a", date(2025, 1, 1), 1)]);
    let propagator = Propagator::new(&plan);
    assert!(propagator.on_task_moved("ghost", date(2025, 1, 1)).is_empty());

    let same = propagator.on_task_moved("a", date(2025, 1, 1));
    assert_eq!(same.len(), 1);
    assert_eq!(plan.with_updates(&same), plan);
}

#[test]
fn test_move_terminates_on_cycle() {
    let plan = plan_with(vec![
        dated("a", date(2025, 1, 1), 1).after(["b"]),
        dated("b", date(2025, 1, 2), 1).after(["a"]),
    ]);
    let updates = Propagator::new(&plan).on_task_moved("a", date(2025, 1, 5));
    assert_eq!(updates.len(), 2);
}

#[test]
fn test_scenario_section_resize_doubles() {
    let tasks = vec![
        dated("t1", date(2025, 1, 1), 2),
        dated("t2", date(2025, 1, 3), 2),
    ];
    let plan = plan_with(tasks.clone());
    let updates = Propagator::new(&plan).calculate_section_resize(&tasks, 2.0, date(2025, 1, 1));

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].id, "t1");
    assert_eq!(updates[0].start_date, date(2025, 1, 1));
    assert_eq!(updates[0].duration, Some(4));
    assert_eq!(updates[1].id, "t2");
    assert_eq!(updates[1].start_date, date(2025, 1, 5));
    assert_eq!(updates[1].duration, Some(4));
    // Inputs untouched.
    assert_eq!(plan.find_task("t2").unwrap().duration, Some(2));
}

#[test]
fn test_section_resize_floor() {
    let tasks = vec![
        dated("a", date(2025, 1, 1), 10),
        dated("b", date(2025, 1, 11), 10),
        dated("c", date(2025, 1, 21), 10),
        Task::new_milestone("m", "M").starting(date(2025, 1, 31)),
    ];
    let plan = plan_with(tasks.clone());
    let updates = Propagator::new(&plan).calculate_section_resize(&tasks, 0.01, date(2025, 1, 1));

    assert_eq!(updates.len(), 4);
    for update in updates.iter().filter(|u| u.id != "m") {
        assert!(update.duration.unwrap() >= 1);
    }
    let resized = plan.with_updates(&updates);
    let span_end = resized.tasks().filter_map(Task::resolved_end).max().unwrap();
    let span = crate::dates::days_between(date(2025, 1, 1), span_end).unwrap();
    assert!(span >= tasks.len() as i64);
    assert_eq!(resized.find_task("m").unwrap().duration, None);
}

#[test]
fn test_section_resize_cascades_across_sections() {
    let mut plan = plan_with(vec![
        dated("a", date(2025, 1, 1), 2),
        dated("b", date(2025, 1, 3), 2).after(["a"]),
    ]);
    let mut later = Section::new("B");
    later.upsert(dated("c", date(2025, 1, 5), 1).after(["b"]));
    plan.sections.push(later);

    let updates = Propagator::new(&plan).resize_section("A", 1.5, None);
    let resized = plan.with_updates(&updates);

    assert_eq!(resized.find_task("b").unwrap().end_date, Some(date(2025, 1, 7)));
    assert_eq!(start_of(&resized, "c"), Some(date(2025, 1, 7)));
    assert_edges_hold(&resized);
}

#[test]
fn test_section_resize_impossible_states() {
    let plan = plan_with(vec![dated("a", date(2025, 1, 1), 2)]);
    let propagator = Propagator::new(&plan);
    assert!(propagator
        .calculate_section_resize(&[], 2.0, date(2025, 1, 1))
        .is_empty());
    assert!(propagator.resize_section("missing", 2.0, None).is_empty());
    assert!(propagator.resize_section("A", 0.0, None).is_empty());
    assert!(propagator.resize_section("A", f64::NAN, None).is_empty());

    let zero_span = vec![Task::new_milestone("m", "M").starting(date(2025, 1, 1))];
    assert!(propagator
        .calculate_section_resize(&zero_span, 2.0, date(2025, 1, 1))
        .is_empty());
}

#[test]
fn test_updates_to_actions_targets_sections() {
    let plan = plan_with(vec![
        dated("a", date(2025, 1, 1), 2),
        Task::new_milestone("m", "M").starting(date(2025, 1, 3)),
    ]);
    let updates = vec![
        DateUpdate {
            id: "m".to_string(),
            start_date: date(2025, 1, 9),
            end_date: None,
            duration: None,
        },
        DateUpdate {
            id: "ghost".to_string(),
            start_date: date(2025, 1, 9),
            end_date: None,
            duration: None,
        },
    ];
    let actions = updates_to_actions(&plan, &updates);
    assert_eq!(actions.len(), 1);
    match &actions[0].action {
        Action::UpdateMilestone(payload) => {
            assert_eq!(payload.section, "A");
            assert_eq!(payload.task.start_date, Some(date(2025, 1, 9)));
        }
        other => panic!("unexpected {other:?}"),
    }
}
