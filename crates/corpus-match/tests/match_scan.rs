use corpus_match::{EngineConfig, EngineError, EngineEvent, MatchEngine, MatchStatus, RopeBuffer};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

type Events = Arc<Mutex<Vec<EngineEvent>>>;

fn recording_engine(text: &str, config: EngineConfig) -> (MatchEngine<RopeBuffer>, Events) {
    let mut engine = MatchEngine::from_text(text, config);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    engine.subscribe(move |event| {
        seen_clone.lock().unwrap().push(event.clone());
    });
    (engine, seen)
}

#[test]
fn test_simple_scan() {
    let (mut engine, seen) = recording_engine("abc def 123 456 ghi", EngineConfig::default());
    assert_eq!(engine.set_pattern(r"\w+").unwrap(), MatchStatus::Matches(5));
    assert_eq!(
        engine.match_ranges(),
        vec![0..3, 4..7, 8..11, 12..15, 16..19]
    );

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 1);
    let EngineEvent::MatchesChanged { intervals } = &events[0] else {
        panic!("expected MatchesChanged, got {:?}", events[0]);
    };
    assert_eq!(intervals.len(), 5);
}

#[test]
fn test_infinite_match() {
    let (mut engine, seen) = recording_engine("abc", EngineConfig::default());
    assert_eq!(engine.set_pattern("x*").unwrap(), MatchStatus::Infinite);
    assert!(engine.intervals().is_empty());
    assert_eq!(engine.status().to_string(), "Infinite");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[
            EngineEvent::MatchesChanged {
                intervals: Vec::new()
            },
            EngineEvent::InfiniteMatches,
        ]
    );
}

#[test]
fn test_infinite_match_discards_previous_results() {
    let (mut engine, seen) = recording_engine("abc def", EngineConfig::default());
    engine.set_pattern("abc").unwrap();
    assert_eq!(engine.intervals().len(), 1);
    seen.lock().unwrap().clear();

    assert_eq!(engine.set_pattern(r"\w*").unwrap(), MatchStatus::Infinite);
    assert!(engine.intervals().is_empty());
    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        EngineEvent::MatchesChanged {
            intervals: Vec::new()
        }
    );
    assert_eq!(events[1], EngineEvent::InfiniteMatches);
}

#[test]
fn test_invalid_pattern() {
    let (mut engine, seen) = recording_engine("abc", EngineConfig::default());
    engine.set_pattern("b").unwrap();

    let err = engine.set_pattern("(b").unwrap_err();
    assert!(matches!(err, EngineError::Pattern(_)));
    assert_eq!(engine.status(), MatchStatus::Error);
    assert_eq!(engine.status().to_string(), "Error");
    assert!(engine.intervals().is_empty());
    assert!(engine.pattern().is_none());

    let events = seen.lock().unwrap();
    let [.., cleared, invalid] = events.as_slice() else {
        panic!("expected at least two events, got {:?}", events);
    };
    assert_eq!(
        *cleared,
        EngineEvent::MatchesChanged {
            intervals: Vec::new()
        }
    );
    assert!(matches!(invalid, EngineEvent::InvalidPattern { .. }));
}

#[test]
fn test_every_status_failure_clears_highlights() {
    let (mut engine, seen) = recording_engine("abc def", EngineConfig::default());
    engine.set_pattern("abc").unwrap();
    engine.set_pattern(r"\w*").unwrap();
    engine.set_pattern("(bad").unwrap_err();
    engine.set_pattern("def").unwrap();
    engine.set_pattern("(bad").unwrap_err();
    assert!(engine.intervals().is_empty());

    let sizes: Vec<String> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|event| match event {
            EngineEvent::MatchesChanged { intervals } => intervals.len().to_string(),
            EngineEvent::InfiniteMatches => "infinite".to_string(),
            EngineEvent::InvalidPattern { .. } => "invalid".to_string(),
            other => format!("{:?}", other),
        })
        .collect();
    assert_eq!(
        sizes,
        vec!["1", "0", "infinite", "0", "invalid", "1", "0", "invalid"]
    );
}

#[test]
fn test_buffer_change_rescans() {
    let (mut engine, seen) = recording_engine("one two", EngineConfig::default());
    engine.set_pattern("o").unwrap();
    assert_eq!(engine.match_ranges(), vec![0..1, 6..7]);

    engine.edit_buffer(|buffer| buffer.set_text("foo")).unwrap();
    assert_eq!(engine.match_ranges(), vec![1..2, 2..3]);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_buffer_change_without_pattern_stays_idle() {
    let mut engine = MatchEngine::from_text("abc", EngineConfig::default());
    engine.edit_buffer(|buffer| buffer.insert(0, "x")).unwrap();
    assert_eq!(engine.status(), MatchStatus::Idle);
    assert!(engine.intervals().is_empty());
}

#[test]
fn test_palette_rotation() {
    let config = EngineConfig::from_json_str(r##"{ "palette": ["#a", "#b"] }"##).unwrap();
    let mut engine = MatchEngine::from_text("x x x", config);
    engine.set_pattern("x").unwrap();
    let colors: Vec<String> = engine
        .intervals()
        .iter()
        .map(|(_, i)| i.color.as_str().to_string())
        .collect();
    assert_eq!(colors, vec!["#a", "#b", "#a"]);
}

#[test]
fn test_multiline_interval_positions() {
    let mut engine = MatchEngine::from_text("ab\ncd\nef", EngineConfig::default());
    engine.set_pattern(r"b\ncd").unwrap();
    let id = engine.intervals().first().unwrap();
    let interval = engine.intervals().get(id).unwrap();
    assert_eq!((interval.start.line, interval.start.column), (0, 1));
    assert_eq!((interval.end.line, interval.end.column), (1, 1));
    assert_eq!(engine.interval_text(id).unwrap(), "b\ncd");
}

#[test]
fn test_manual_interval_and_removal() {
    let (mut engine, seen) = recording_engine("aaa bbb ccc", EngineConfig::default());
    engine.set_pattern("bbb").unwrap();

    let err = engine.add_interval(5..9).unwrap_err();
    assert!(matches!(err, EngineError::Interval(_)));

    let id = engine.add_interval(0..3).unwrap();
    assert_eq!(engine.match_ranges(), vec![0..3, 4..7]);
    assert_eq!(engine.status(), MatchStatus::Matches(2));

    engine.remove_interval(id).unwrap();
    assert_eq!(engine.match_ranges(), vec![4..7]);
    assert_eq!(engine.status().to_string(), "1");

    assert!(matches!(
        engine.add_interval(10..20),
        Err(EngineError::InvalidRange { .. })
    ));
    assert!(matches!(
        engine.remove_interval(id),
        Err(EngineError::Interval(_))
    ));
    assert_eq!(seen.lock().unwrap().len(), 3);
}
