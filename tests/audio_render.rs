use tonegrid::console::InputEvent;
use tonegrid::dsp::oscillator::Waveform;
use tonegrid::engine::{self, Clock, ManualClock};
use tonegrid::sequencing::Pitch;
use tonegrid::session::{Grid, Session, SessionConfig, MELODY_SLOT};
use tonegrid::synth::{Instrument, InstrumentSpec, LocalRack, SampleBank, Synth};
use tonegrid::voices::DrumKind;

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 480;

fn offline(config: SessionConfig) -> Session<ManualClock, LocalRack> {
    Session::offline(config, SAMPLE_RATE, SampleBank::new()).unwrap()
}

/// Render `seconds` of audio in 10 ms blocks.
fn bounce(session: &mut Session<ManualClock, LocalRack>, seconds: f32) -> Vec<f32> {
    let blocks = (seconds * SAMPLE_RATE) as usize / BLOCK;
    let mut out = Vec::with_capacity(blocks * BLOCK);
    let mut block = vec![0.0; BLOCK];
    for _ in 0..blocks {
        session.render(&mut block);
        out.extend_from_slice(&block);
    }
    out
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0, |p, s| p.max(s.abs()))
}

fn energy(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s * s).sum()
}

#[test]
fn kick_lands_on_its_scheduled_frame() {
    let mut session = offline(SessionConfig::default());
    session.toggle_cell(Grid::Rhythm, 0, 0).unwrap();
    session.play().unwrap();

    let audio = bounce(&mut session, 0.5);
    // First tick at the 50 ms start delay.
    let onset = (0.05 * SAMPLE_RATE) as usize;
    assert!(audio[..onset].iter().all(|s| *s == 0.0));
    assert!(peak(&audio[onset..onset + 4800]) > 0.01);
    assert!(audio.iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn empty_session_renders_silence() {
    let mut session = offline(SessionConfig::default());
    session.play().unwrap();
    assert_eq!(peak(&bounce(&mut session, 1.0)), 0.0);
}

#[test]
fn stop_cuts_held_and_scheduled_notes() {
    let mut session = offline(SessionConfig::default());
    for step in 0..8 {
        session.toggle_cell(Grid::Melody, 4, step).unwrap();
    }
    session.play().unwrap();
    session.handle_input(InputEvent::KeyDown('a'));
    assert!(peak(&bounce(&mut session, 0.5)) > 0.0);

    session.stop();
    let tail = bounce(&mut session, 1.0);
    // Default release is 0.3 s; everything is gone well before the end.
    assert!(peak(&tail[tail.len() / 2..]) < 1e-4);
}

#[test]
fn cleared_grid_goes_quiet_while_playing() {
    let mut session = offline(SessionConfig::default());
    for row in 0..8 {
        for step in 0..8 {
            session.toggle_cell(Grid::Melody, row, step).unwrap();
        }
    }
    session.play().unwrap();
    assert!(peak(&bounce(&mut session, 1.0)) > 0.0);

    session.clear_pattern();
    let after = bounce(&mut session, 2.0);
    assert!(session.is_playing());
    assert!(peak(&after[after.len() / 2..]) < 1e-4);
}

#[test]
fn lower_cutoff_removes_energy() {
    let render = |cutoff: f32| {
        let mut session = offline(SessionConfig::default().sound("sawtooth"));
        session.set_effect("filter", "frequency", cutoff).unwrap();
        session.handle_input(InputEvent::KeyDown('a'));
        energy(&bounce(&mut session, 0.3))
    };

    let open = render(5000.0);
    let closed = render(100.0);
    assert!(closed < open * 0.5, "open {} closed {}", open, closed);
}

#[test]
fn volume_scales_the_output() {
    let render = |db: f32| {
        let mut session = offline(SessionConfig::default().volume(db));
        session.handle_input(InputEvent::KeyDown('j'));
        peak(&bounce(&mut session, 0.2))
    };

    let loud = render(0.0);
    let quiet = render(-20.0);
    assert!(quiet < loud * 0.2, "loud {} quiet {}", loud, quiet);
}

#[test]
fn disposed_synth_is_silent_and_ignores_triggers() {
    let mut synth = Synth::new(SAMPLE_RATE, &InstrumentSpec::tone(Waveform::Square));
    let mut out = vec![0.0; BLOCK];
    synth.trigger_attack(Pitch::A4, None, 1.0);
    synth.render(&mut out);
    assert!(peak(&out) > 0.0);

    synth.dispose();
    synth.trigger_attack(Pitch::C4, None, 1.0);
    synth.render(&mut out);
    assert_eq!(peak(&out), 0.0);
}

#[test]
fn every_drum_sounds_through_its_slot() {
    for drum in DrumKind::ALL {
        let mut synth = Synth::new(SAMPLE_RATE, &InstrumentSpec::percussion(drum));
        synth.trigger_attack_release(Pitch::C2, 0.1, Some(0.0), 1.0);
        let mut out = vec![0.0; 4800];
        synth.render(&mut out);
        assert!(peak(&out) > 0.001, "{} is silent", drum);
    }
}

#[test]
fn engine_plays_a_live_session() {
    let config = SessionConfig::default();
    let specs = config.instrument_specs(&SampleBank::new()).unwrap();
    let (handle, mut engine, clock) = engine::channel(SAMPLE_RATE, &specs, 256);
    let mut session = Session::new(config, clock.clone(), handle, SampleBank::new()).unwrap();

    session.toggle_cell(Grid::Rhythm, 1, 0).unwrap();
    session.toggle_cell(Grid::Melody, 0, 2).unwrap();
    assert!(session.play().is_err());
    clock.unlock();
    session.play().unwrap();

    let mut block = vec![0.0; BLOCK];
    let mut loudest: f32 = 0.0;
    while clock.now() < 1.0 {
        session.pump();
        engine.render(&mut block);
        loudest = loudest.max(peak(&block));
    }
    assert!(loudest > 0.01);
    assert!(engine.synth(MELODY_SLOT).unwrap().position() >= 48_000);

    session.select_sound("triangle").unwrap();
    engine.render(&mut block);
    assert_eq!(engine.synth(MELODY_SLOT).unwrap().kind().name(), "triangle");
}
