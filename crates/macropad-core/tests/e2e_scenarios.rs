// Macropad End-to-End Test Scenarios
//
// These tests drive the full decode-dispatch-classify pipeline over
// synthetic byte streams, simulating a keypad session without hardware.

use std::io::Cursor;

use macropad_core::{
    codec, key_release, read_records, ActionMap, DeviceError, InputEvent, Key, EV_KEY,
};

// =========================================================================
// Test Helpers
// =========================================================================

fn key_event(code: u16, value: u32) -> InputEvent {
    InputEvent {
        time_sec: 1_700_000_000,
        time_usec: 500,
        event_type: EV_KEY,
        code,
        value,
    }
}

fn syn_report() -> InputEvent {
    InputEvent {
        time_sec: 1_700_000_000,
        time_usec: 500,
        event_type: 0x00,
        code: 0,
        value: 0,
    }
}

fn stream(events: &[InputEvent]) -> Vec<u8> {
    events.iter().flat_map(codec::encode).collect()
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn press_release_syn_frame_dispatches_one_action() {
    // One keystroke as the kernel reports it: press, release, frame marker
    let events = [key_event(30, 1), key_event(30, 0), syn_report()];

    let mut seen = Vec::new();
    let mut releases = Vec::new();

    let mut cursor = Cursor::new(stream(&events));
    read_records(&mut cursor, |event| {
        seen.push(event);
        if let Some(key) = key_release(&event) {
            releases.push(key);
        }
    })
    .unwrap();

    // The handler sees every record in device order, unfiltered
    assert_eq!(seen, events);
    // Only the release qualifies for downstream dispatch
    assert_eq!(releases, vec![Key::from(30)]);
}

#[test]
fn held_key_repeats_are_not_dispatched() {
    let events = [
        key_event(79, 1), // KEY_KP1 down
        key_event(79, 2), // repeat
        key_event(79, 2), // repeat
        key_event(79, 0), // up
        syn_report(),
    ];

    let mut releases = Vec::new();
    let mut cursor = Cursor::new(stream(&events));
    read_records(&mut cursor, |event| {
        if let Some(key) = key_release(&event) {
            releases.push(key);
        }
    })
    .unwrap();

    assert_eq!(releases, vec![Key::from(79)]);
}

#[test]
fn keystroke_stream_triggers_mapped_commands_in_order() {
    let map = ActionMap::from_json_str(
        r#"
        {
            "ActionMapping": [
                { "KeyCode": "KEY_KP1", "Action": ["whoami"] },
                { "KeyCode": "KEY_KP2", "Action": ["echo", "Hello World!"] }
            ]
        }
        "#,
    )
    .unwrap();

    // KP1 tapped, KP2 tapped, then an unmapped key
    let events = [
        key_event(79, 1),
        key_event(79, 0),
        syn_report(),
        key_event(80, 1),
        key_event(80, 0),
        syn_report(),
        key_event(30, 1),
        key_event(30, 0),
        syn_report(),
    ];

    let mut commands: Vec<Vec<String>> = Vec::new();
    let mut cursor = Cursor::new(stream(&events));
    read_records(&mut cursor, |event| {
        if let Some(key) = key_release(&event) {
            if let Some(command) = map.lookup(key) {
                commands.push(command.to_vec());
            }
        }
    })
    .unwrap();

    assert_eq!(
        commands,
        vec![
            vec!["whoami".to_string()],
            vec!["echo".to_string(), "Hello World!".to_string()],
        ]
    );
}

#[test]
fn truncated_session_reports_framing_violation_after_good_records() {
    let mut bytes = stream(&[key_event(79, 1), key_event(79, 0)]);
    bytes.truncate(bytes.len() - 5); // cut the last record short

    let mut seen = 0;
    let mut cursor = Cursor::new(bytes);
    let err = read_records(&mut cursor, |_| seen += 1).unwrap_err();

    assert_eq!(seen, 1);
    assert!(matches!(err, DeviceError::Malformed(_)));
}

#[test]
fn non_key_events_pass_through_uninterpreted() {
    let rel = InputEvent {
        time_sec: 0,
        time_usec: 0,
        event_type: 0x02, // EV_REL
        code: 1,
        value: 0, // would be a "release" if this were EV_KEY
    };
    let events = [rel, syn_report()];

    let mut seen = Vec::new();
    let mut releases = 0;
    let mut cursor = Cursor::new(stream(&events));
    read_records(&mut cursor, |event| {
        seen.push(event);
        if key_release(&event).is_some() {
            releases += 1;
        }
    })
    .unwrap();

    assert_eq!(seen, events);
    assert_eq!(releases, 0);
}
