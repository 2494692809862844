mod common;

use common::{Call, RecordingRack};
use tonegrid::effects::EffectParam;
use tonegrid::engine::{ManualClock, Tick, Transport};
use tonegrid::error::Error;
use tonegrid::sequencing::{Pattern, Pitch, RowBinding, Scale, Sequencer, StepUnit, Tempo};
use tonegrid::session::{Grid, Session, SessionConfig, MELODY_SLOT};
use tonegrid::synth::SampleBank;

type TestSession = Session<ManualClock, RecordingRack>;

fn session() -> (ManualClock, TestSession) {
    let clock = ManualClock::new();
    let session = Session::new(
        SessionConfig::default(),
        clock.clone(),
        RecordingRack::new(5),
        SampleBank::new(),
    )
    .unwrap();
    (clock, session)
}

/// Pump every 10 ms until `until` seconds.
fn advance(clock: &ManualClock, session: &mut TestSession, from: f64, until: f64) {
    let mut now = from;
    while now < until {
        now += 0.01;
        clock.set(now);
        session.pump();
    }
}

#[test]
fn single_cell_plays_once_per_loop() {
    let (clock, mut session) = session();
    session.toggle_cell(Grid::Melody, 0, 0).unwrap();
    session.play().unwrap();

    // 8 eighth notes at 120 BPM = 2 s per loop; three loops.
    advance(&clock, &mut session, 0.0, 5.9);

    let melody = &session.rack().slots[MELODY_SLOT];
    let notes = melody.attack_releases();
    assert_eq!(notes.len(), 3);
    let top = Scale::Major.pitch_of(0).unwrap();
    for (i, (pitch, time)) in notes.iter().enumerate() {
        assert_eq!(*pitch, top);
        assert!((time - (0.05 + 2.0 * i as f64)).abs() < 1e-9);
    }
    assert_eq!(session.rack().note_count(), 3);
}

#[test]
fn notes_carry_the_step_duration_and_velocity() {
    let (clock, mut session) = session();
    session.set_cell_velocity(Grid::Rhythm, 2, 1, 0.4).unwrap();
    session.play().unwrap();
    advance(&clock, &mut session, 0.0, 0.5);

    let hihat = &session.rack().slots[3];
    assert_eq!(hihat.calls.len(), 1);
    match hihat.calls[0] {
        Call::AttackRelease {
            pitch,
            duration,
            time,
            velocity,
        } => {
            assert_eq!(pitch, Pitch::C2);
            assert!((duration - 0.25).abs() < 1e-9);
            assert!((time.unwrap() - 0.3).abs() < 1e-9);
            assert_eq!(velocity, 0.4);
        }
        ref other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn edits_reach_the_next_tick_only() {
    let (clock, mut session) = session();
    session.play().unwrap();

    // Steps 0 and 1 are already scheduled once the clock passes 0.25.
    advance(&clock, &mut session, 0.0, 0.25);
    assert_eq!(session.current_step(), 2);
    session.toggle_cell(Grid::Rhythm, 0, 1).unwrap();
    session.toggle_cell(Grid::Rhythm, 0, 2).unwrap();
    advance(&clock, &mut session, 0.25, 0.5);

    let kick = session.rack().slots[1].attack_releases();
    assert_eq!(kick.len(), 1);
    assert!((kick[0].1 - 0.55).abs() < 1e-9);
}

#[test]
fn clearing_a_full_grid_keeps_the_transport_running() {
    let (clock, mut session) = session();
    for row in 0..8 {
        for step in 0..8 {
            session.toggle_cell(Grid::Melody, row, step).unwrap();
        }
    }
    assert_eq!(session.pattern(Grid::Melody).active_count(), 64);

    session.play().unwrap();
    advance(&clock, &mut session, 0.0, 1.0);
    assert!(session.rack().note_count() > 0);

    session.clear_pattern();
    assert_eq!(session.pattern(Grid::Melody).active_count(), 0);
    assert_eq!(session.current_step(), 0);
    session.rack_mut().clear();

    let before = session.transport().current_step();
    advance(&clock, &mut session, 1.0, 4.0);
    assert!(session.is_playing());
    assert!(session.transport().current_step() > before);
    assert_eq!(session.rack().note_count(), 0);
}

#[test]
fn stop_silences_every_slot() {
    let (clock, mut session) = session();
    session.toggle_cell(Grid::Rhythm, 0, 0).unwrap();
    session.play().unwrap();
    advance(&clock, &mut session, 0.0, 1.0);

    session.rack_mut().clear();
    session.stop();
    for slot in &session.rack().slots {
        assert_eq!(slot.calls, vec![Call::Silence]);
    }

    advance(&clock, &mut session, 1.0, 5.0);
    assert_eq!(session.rack().note_count(), 0);
}

#[test]
fn sound_change_disposes_before_replacing() {
    let (_clock, mut session) = session();
    session.select_sound("square").unwrap();

    let rack = session.rack();
    assert_eq!(rack.retired.len(), 1);
    assert_eq!(rack.retired[0].calls.last(), Some(&Call::Dispose));
    assert_eq!(rack.slots[MELODY_SLOT].kind.as_deref(), Some("square"));
    assert!(!rack.slots[MELODY_SLOT].disposed);

    assert!(matches!(
        session.select_sound("bagpipes"),
        Err(Error::UnknownInstrument { category: "sound", .. })
    ));
    assert_eq!(session.rack().retired.len(), 1);
    assert_eq!(session.sound(), "square");
}

#[test]
fn volume_reaches_every_instrument() {
    let (_clock, mut session) = session();
    assert_eq!(session.set_volume(12.0), 0.0);
    for slot in &session.rack().slots {
        assert_eq!(slot.calls, vec![Call::Effect(EffectParam::VolumeDb, 0.0)]);
    }
}

#[test]
fn effect_changes_go_to_the_melody_only() {
    let (_clock, mut session) = session();
    assert_eq!(session.set_effect("filter", "q", 0.0), Ok(0.1));
    assert_eq!(
        session.rack().slots[MELODY_SLOT].calls,
        vec![Call::Effect(EffectParam::FilterQ, 0.1)]
    );
    assert!(session.rack().slots[1].calls.is_empty());
}

#[test]
fn sequencers_sharing_a_transport_keep_their_own_position() {
    let clock = ManualClock::new();
    let mut transport = Transport::new(clock.clone(), Tempo::DEFAULT, StepUnit::Eighth);
    let mut rack = RecordingRack::new(2);

    let mut eight = Pattern::new(vec!["a".into()], 8, 1);
    eight.toggle(0, 0).unwrap();
    let mut three = Pattern::new(vec!["b".into()], 3, 1);
    three.toggle(0, 0).unwrap();

    let mut long = Sequencer::new(eight, vec![RowBinding::new(0, Pitch::C4)]);
    let mut short = Sequencer::new(three, vec![RowBinding::new(1, Pitch::C3)]);

    transport.start().unwrap();
    let mut ticks: Vec<Tick> = Vec::new();
    let mut now = 0.0;
    while ticks.len() < 24 {
        now += 0.01;
        clock.set(now);
        transport.pump(|tick| ticks.push(tick));
    }
    for tick in &ticks[..24] {
        long.on_tick(tick, &mut rack);
        short.on_tick(tick, &mut rack);
    }

    assert_eq!(rack.slots[0].attack_releases().len(), 3);
    assert_eq!(rack.slots[1].attack_releases().len(), 8);
    assert_eq!(long.current_step(), 0);
    assert_eq!(short.current_step(), 0);
}
