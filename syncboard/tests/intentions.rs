//! Intentions applied to a document, observed through the change feed

use std::sync::{Arc, Mutex};
use syncboard::{
    BoardError, BoardEvent, Document, EntityKind, Execute, ExecutionResult, Intention, ReplicaId,
};

type Events = Arc<Mutex<Vec<BoardEvent>>>;

fn observed(replica: &str) -> (Document, Events) {
    let mut doc = Document::new("room", ReplicaId::from_string(replica));
    let events: Events = Arc::default();
    let sink = events.clone();
    doc.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    (doc, events)
}

fn apply(doc: &mut Document, intention: Intention) -> serde_json::Value {
    intention.execute(doc).into_result().unwrap()
}

/// Three columns named A, B, C; column 0 holds three cards
fn populated(doc: &mut Document) {
    for name in ["A", "B", "C"] {
        apply(doc, Intention::AddColumn);
        let column = doc.column_count() - 1;
        apply(
            doc,
            Intention::UpdateColumnName {
                column,
                name: name.into(),
            },
        );
    }
    for name in ["x", "y", "z"] {
        let card = apply(doc, Intention::AddCard { column: 0 });
        assert_eq!(card["column"], doc.get_column(0).unwrap().id.as_str());
        let index = doc.cards(0).unwrap().len() - 1;
        apply(
            doc,
            Intention::UpdateCardName {
                column: 0,
                card: index,
                name: name.into(),
            },
        );
    }
}

fn column_names(doc: &Document) -> Vec<String> {
    doc.columns().into_iter().map(|c| c.name).collect()
}

fn card_names(doc: &Document, column: usize) -> Vec<String> {
    doc.cards(column)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[test]
fn test_add_column_emits_added_at_end() {
    let (mut doc, events) = observed("a");
    apply(&mut doc, Intention::AddColumn);
    let value = apply(&mut doc, Intention::AddColumn);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    match &events[1] {
        BoardEvent::Added { kind, id, at } => {
            assert_eq!(*kind, EntityKind::Column);
            assert_eq!(id.as_str(), value["id"].as_str().unwrap());
            assert_eq!(at.index, 1);
            assert_eq!(&at.parent, doc.board_id());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_delete_column_cascades_cards_first() {
    let (mut doc, events) = observed("a");
    populated(&mut doc);
    let history = doc.history().len();
    events.lock().unwrap().clear();

    let value = apply(&mut doc, Intention::DeleteColumn { column: 0 });
    assert_eq!(value["cards"], 3);
    assert_eq!(doc.history().len(), history + 1);
    assert_eq!(column_names(&doc), vec!["B", "C"]);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 4);
    for event in &events[..3] {
        assert!(matches!(
            event,
            BoardEvent::Removed {
                kind: EntityKind::Card,
                ..
            }
        ));
    }
    assert!(matches!(
        &events[3],
        BoardEvent::Removed {
            kind: EntityKind::Column,
            at,
            ..
        } if at.index == 0
    ));
}

#[test]
fn test_move_card_onto_itself_is_a_noop() {
    let (mut doc, events) = observed("a");
    populated(&mut doc);
    let history = doc.history().len();
    events.lock().unwrap().clear();

    let result = Intention::MoveCard {
        from_column: 0,
        from_card: 0,
        to_column: 0,
        to_card: 0,
    }
    .execute(&mut doc);

    assert!(matches!(result, ExecutionResult::Unlogged { .. }));
    assert_eq!(result.into_result().unwrap()["noop"], true);
    assert_eq!(doc.history().len(), history);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_move_column_uses_final_index() {
    let (mut doc, events) = observed("a");
    populated(&mut doc);
    events.lock().unwrap().clear();

    let value = apply(&mut doc, Intention::MoveColumn { from: 0, to: 2 });
    assert_eq!(value["from"], 0);
    assert_eq!(value["to"], 2);
    assert_eq!(column_names(&doc), vec!["B", "C", "A"]);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    match &events[0] {
        BoardEvent::Moved { from, to, .. } => {
            assert_eq!(from.index, 0);
            assert_eq!(to.index, 2);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_stale_card_index_changes_nothing() {
    let (mut doc, events) = observed("a");
    populated(&mut doc);
    let before = doc.snapshot();
    let history = doc.history().len();
    events.lock().unwrap().clear();

    let result = Intention::DeleteCard { column: 0, card: 5 }.execute(&mut doc);
    let (result, entry) = result.split();

    assert!(matches!(result, Err(BoardError::StaleReference { .. })));
    assert!(entry.unwrap().is_failure());
    assert_eq!(doc.snapshot(), before);
    assert_eq!(doc.history().len(), history);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_nudges_at_edges_are_noops() {
    let (mut doc, _) = observed("a");
    populated(&mut doc);
    let history = doc.history().len();

    for intention in [
        Intention::MoveCardUp { column: 0, card: 0 },
        Intention::MoveCardToTop { column: 0, card: 0 },
        Intention::MoveCardDown { column: 0, card: 2 },
        Intention::MoveCardToBottom { column: 0, card: 2 },
        Intention::MoveCardLeft { column: 0, card: 1 },
        Intention::MoveColumnLeft { column: 0 },
        Intention::MoveColumnRight { column: 2 },
    ] {
        let result = intention.execute(&mut doc);
        assert!(
            matches!(result, ExecutionResult::Unlogged { .. }),
            "{intention:?} should be a no-op"
        );
    }
    assert_eq!(doc.history().len(), history);
}

#[test]
fn test_nudges_reorder_cards() {
    let (mut doc, _) = observed("a");
    populated(&mut doc);

    apply(&mut doc, Intention::MoveCardDown { column: 0, card: 0 });
    assert_eq!(card_names(&doc, 0), vec!["y", "x", "z"]);

    apply(&mut doc, Intention::MoveCardToTop { column: 0, card: 2 });
    assert_eq!(card_names(&doc, 0), vec!["z", "y", "x"]);

    apply(&mut doc, Intention::MoveCardRight { column: 0, card: 0 });
    apply(&mut doc, Intention::MoveCardRight { column: 0, card: 0 });
    assert_eq!(card_names(&doc, 0), vec!["x"]);
    assert_eq!(card_names(&doc, 1), vec!["z", "y"]);

    apply(&mut doc, Intention::MoveCardLeft { column: 1, card: 0 });
    assert_eq!(card_names(&doc, 0), vec!["x", "z"]);
}

#[test]
fn test_remote_merge_reports_events_to_peer() {
    let (mut a, _) = observed("a");
    populated(&mut a);
    let (mut b, events) = observed("b");
    for change in a.drain_outbox() {
        b.apply(&change);
    }
    assert_eq!(b.snapshot(), a.snapshot());
    events.lock().unwrap().clear();

    apply(&mut a, Intention::DeleteColumn { column: 0 });
    apply(
        &mut a,
        Intention::UpdateBoardName {
            name: "Roadmap".into(),
        },
    );
    for change in a.drain_outbox() {
        b.apply(&change);
    }

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 5);
    assert!(matches!(
        &events[3],
        BoardEvent::Removed {
            kind: EntityKind::Column,
            ..
        }
    ));
    match &events[4] {
        BoardEvent::FieldChanged { kind, old, new, .. } => {
            assert_eq!(*kind, EntityKind::Board);
            assert_eq!(old, "");
            assert_eq!(new, "Roadmap");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_filter_cards_by_text() {
    let (mut doc, _) = observed("a");
    populated(&mut doc);
    apply(
        &mut doc,
        Intention::UpdateCardDescription {
            column: 0,
            card: 2,
            description: "Ship the X release".into(),
        },
    );

    let x = doc.get_card(0, 0).unwrap().id;
    let z = doc.get_card(0, 2).unwrap().id;
    assert_eq!(doc.filter_cards("X"), vec![x, z]);
    assert!(doc.filter_cards("nothing").is_empty());
}
