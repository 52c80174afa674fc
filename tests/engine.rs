use std::time::{Duration, Instant};

use soundsmith::engine::UPDATE_CAPACITY;
use soundsmith::grid::{GridGeometry, PaletteSlot};
use soundsmith::timing::TransportConfig;
use soundsmith::{
    BlockId, Config, ConfigError, EngineCommand, EngineHandle, EngineUpdate, PitchClass, Placement, Position,
    RecordingTrigger, spawn_engine,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn config(track_width: f32) -> Config {
    Config {
        transport: TransportConfig {
            track_width,
            ..Default::default()
        },
        palette: vec![
            PaletteSlot {
                pitch: PitchClass::C,
                home: Position::new(28.0, 400.0),
            },
            PaletteSlot {
                pitch: PitchClass::G,
                home: Position::new(256.0, 400.0),
            },
        ],
        ..Default::default()
    }
}

fn home_block(engine: &EngineHandle, pitch: PitchClass) -> BlockId {
    engine
        .board()
        .blocks
        .iter()
        .find(|block| block.pitch == pitch && block.placement == Placement::Home)
        .map(|block| block.id)
        .unwrap()
}

fn drop_on_grid(engine: &EngineHandle, id: BlockId, position: Position) -> EngineUpdate {
    engine.send(EngineCommand::Drag { id, position });
    engine.send(EngineCommand::Release { id });
    engine.update_rx.recv_timeout(TIMEOUT).unwrap()
}

/// Collects updates until the engine reports that playback stopped.
fn until_stopped(engine: &EngineHandle) -> Vec<EngineUpdate> {
    let mut updates = Vec::new();
    loop {
        let update = engine.update_rx.recv_timeout(TIMEOUT).unwrap();
        let stopped = update == EngineUpdate::PlaybackState { running: false };
        updates.push(update);
        if stopped {
            return updates;
        }
    }
}

#[test]
fn test_placed_note_fires_once_and_track_end_stops() {
    let recorder = RecordingTrigger::new();
    let engine = spawn_engine(&config(60.0), recorder.clone()).unwrap();

    let c = home_block(&engine, PitchClass::C);
    let spawned = drop_on_grid(&engine, c, Position::new(28.0, 40.0));
    assert!(matches!(
        spawned,
        EngineUpdate::BlockSpawned {
            pitch: PitchClass::C,
            ..
        }
    ));

    engine.send(EngineCommand::Play);
    let updates = until_stopped(&engine);

    assert_eq!(updates[0], EngineUpdate::PlaybackState { running: true });
    let triggered: Vec<&EngineUpdate> = updates
        .iter()
        .filter(|update| matches!(update, EngineUpdate::NoteTriggered { .. }))
        .collect();
    assert_eq!(
        triggered,
        vec![&EngineUpdate::NoteTriggered {
            id: c,
            pitch: PitchClass::C
        }]
    );
    assert_eq!(recorder.calls(), vec![PitchClass::C]);

    let board = engine.board();
    assert!(!board.running);
    assert!(board.playhead > 60.0);

    engine.shutdown();
}

#[test]
fn test_stop_cancels_ticks() {
    let engine = spawn_engine(&config(400.0), RecordingTrigger::new()).unwrap();

    engine.send(EngineCommand::Play);
    let mut playheads = 0;
    while playheads < 3 {
        if let EngineUpdate::Playhead { .. } = engine.update_rx.recv_timeout(TIMEOUT).unwrap() {
            playheads += 1;
        }
    }

    engine.send(EngineCommand::Stop);
    until_stopped(&engine);
    let frozen = engine.board().playhead;

    assert!(
        engine
            .update_rx
            .recv_timeout(Duration::from_millis(100))
            .is_err()
    );
    assert_eq!(engine.board().playhead, frozen);
    assert!(!engine.board().running);

    engine.shutdown();
}

#[test]
fn test_toggle_restarts_and_refires() {
    let recorder = RecordingTrigger::new();
    let engine = spawn_engine(&config(40.0), recorder.clone()).unwrap();

    let g = home_block(&engine, PitchClass::G);
    drop_on_grid(&engine, g, Position::new(12.0, 260.0));

    engine.send(EngineCommand::TogglePlay);
    until_stopped(&engine);
    engine.send(EngineCommand::TogglePlay);
    until_stopped(&engine);

    assert_eq!(recorder.calls(), vec![PitchClass::G, PitchClass::G]);
    engine.shutdown();
}

#[test]
fn test_gestures_update_the_board() {
    let engine = spawn_engine(&config(400.0), RecordingTrigger::new()).unwrap();
    assert_eq!(engine.board().blocks.len(), 2);

    let c = home_block(&engine, PitchClass::C);
    drop_on_grid(&engine, c, Position::new(120.0, 230.0));

    let board = engine.board();
    assert_eq!(board.blocks.len(), 3);
    let placed = board.blocks.iter().find(|block| block.id == c).unwrap();
    assert_eq!(placed.position, Position::new(120.0, 250.0));
    assert_eq!(placed.placement, Placement::Placed);

    let fresh_c = home_block(&engine, PitchClass::C);
    engine.send(EngineCommand::Remove { id: fresh_c });
    engine.send(EngineCommand::Clear);
    engine.send(EngineCommand::Play);
    assert_eq!(
        engine.update_rx.recv_timeout(TIMEOUT).unwrap(),
        EngineUpdate::PlaybackState { running: true }
    );

    let board = engine.board();
    assert_eq!(board.blocks.len(), 2);
    assert!(board.blocks.iter().any(|block| block.id == fresh_c));
    assert!(board.blocks.iter().all(|block| block.placement == Placement::Home));

    engine.shutdown();
}

#[test]
fn test_rejects_gridless_config() {
    let config = Config {
        grid: GridGeometry {
            rows: 0,
            ..Default::default()
        },
        ..Default::default()
    };

    let result = spawn_engine(&config, RecordingTrigger::new());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_undrained_updates_are_capped() {
    let mut config = config(1500.0);
    config.transport.tick_period = 0.001;
    config.transport.speed = 1000.0;
    let engine = spawn_engine(&config, RecordingTrigger::new()).unwrap();

    engine.send(EngineCommand::Play);
    let deadline = Instant::now() + Duration::from_secs(30);
    while !engine.board().running {
        assert!(Instant::now() < deadline);
        std::thread::sleep(Duration::from_millis(1));
    }
    while engine.board().running {
        assert!(Instant::now() < deadline);
        std::thread::sleep(Duration::from_millis(10));
    }

    let queued = engine.update_rx.try_iter().count();
    assert_eq!(queued, UPDATE_CAPACITY);
    assert!(engine.board().playhead >= 1500.0);

    engine.shutdown();
}
