use std::path::PathBuf;
use std::time::Duration;

use soundsmith::{
    Config, EngineCommand, EngineHandle, EngineUpdate, PitchClass, Placement, Position, Silent,
    ToneOutput, spawn_engine,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEMO_PHRASE: [(PitchClass, f32, u32); 6] = [
    (PitchClass::C, 40.0, 3),
    (PitchClass::E, 100.0, 2),
    (PitchClass::G, 160.0, 1),
    (PitchClass::B, 220.0, 0),
    (PitchClass::A, 280.0, 1),
    (PitchClass::F, 340.0, 2),
];

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match Config::load(&PathBuf::from(&path)) {
            Ok(config) => config,
            Err(e) => {
                error!(%path, "{}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let (output, engine) = match ToneOutput::open(&config.audio) {
        Ok((output, trigger)) => (Some(output), spawn_engine(&config, trigger)),
        Err(e) => {
            warn!("{}, continuing without sound", e);
            (None, spawn_engine(&config, Silent))
        }
    };
    let engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    lay_out_phrase(&engine, &config);

    engine.send(EngineCommand::Play);
    while let Ok(update) = engine.update_rx.recv() {
        match update {
            EngineUpdate::NoteTriggered { id, pitch } => info!(%id, %pitch, "note triggered"),
            EngineUpdate::PlaybackState { running: false } => break,
            _ => {}
        }
    }

    engine.shutdown();
    drop(output);
}

fn lay_out_phrase(engine: &EngineHandle, config: &Config) {
    for (pitch, x, row) in DEMO_PHRASE {
        let board = engine.board();
        let Some(block) = board
            .blocks
            .iter()
            .find(|block| block.pitch == pitch && block.placement == Placement::Home)
        else {
            warn!(%pitch, "no palette block for pitch");
            continue;
        };

        let position = Position::new(x, config.grid.row_center(row.min(config.grid.rows - 1)));
        engine.send(EngineCommand::Drag {
            id: block.id,
            position,
        });
        engine.send(EngineCommand::Release { id: block.id });

        let spawned = engine.update_rx.recv_timeout(Duration::from_secs(1));
        if !matches!(spawned, Ok(EngineUpdate::BlockSpawned { .. })) {
            warn!(%pitch, "palette slot was not replenished");
        }
    }
}
