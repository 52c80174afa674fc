use crate::{
    Config, ConfigError,
    audio::SoundTrigger,
    events::{Event, StopReason},
    grid::{BlockId, NoteBlock, PitchClass, PlacementStore, Position},
    timing::{Scheduler, Ticker},
};
use arc_swap::ArcSwap;
use crossbeam::channel::{Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, trace};

/// Updates buffered for the UI. Past this, updates are dropped until the
/// receiver catches up; `EngineHandle::board` always has the latest state.
pub const UPDATE_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    Drag { id: BlockId, position: Position },
    Release { id: BlockId },
    Remove { id: BlockId },
    ReturnHome { id: BlockId },
    Clear,
    Play,
    Stop,
    TogglePlay,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineUpdate {
    Playhead { position: f32 },
    NoteTriggered { id: BlockId, pitch: PitchClass },
    PlaybackState { running: bool },
    BlockSpawned { id: BlockId, pitch: PitchClass },
}

/// What a UI needs to draw a frame.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub blocks: Vec<NoteBlock>,
    pub playhead: f32,
    pub running: bool,
}

pub struct EngineHandle {
    pub command_tx: Sender<EngineCommand>,
    /// Bounded at `UPDATE_CAPACITY`. Undrained updates are dropped, not queued.
    pub update_rx: Receiver<EngineUpdate>,
    board: Arc<ArcSwap<Board>>,
    thread: JoinHandle<()>,
}

impl EngineHandle {
    /// Returns `false` once the engine thread is gone.
    pub fn send(&self, command: EngineCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    /// Latest published board.
    pub fn board(&self) -> Arc<Board> {
        self.board.load_full()
    }

    pub fn shutdown(self) {
        let _ = self.command_tx.send(EngineCommand::Shutdown);
        let _ = self.thread.join();
    }
}

pub fn spawn_engine<S>(config: &Config, sound: S) -> Result<EngineHandle, ConfigError>
where
    S: SoundTrigger + Send + 'static,
{
    config.validate()?;

    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::bounded(UPDATE_CAPACITY);

    let store = PlacementStore::with_palette(config.grid, &config.palette_slots());
    let board = Arc::new(ArcSwap::from_pointee(Board {
        blocks: store.snapshot(),
        ..Default::default()
    }));

    let state = EngineState {
        store,
        ticker: Ticker::new(config.transport.period()),
        scheduler: Scheduler::new(config.transport.clone(), sound),
        board: board.clone(),
    };

    let thread = std::thread::spawn(move || {
        engine_thread(state, command_rx, update_tx);
    });

    Ok(EngineHandle {
        command_tx,
        update_rx,
        board,
        thread,
    })
}

struct EngineState<S> {
    store: PlacementStore,
    scheduler: Scheduler<S>,
    ticker: Ticker,
    board: Arc<ArcSwap<Board>>,
}

fn engine_thread<S: SoundTrigger>(
    mut state: EngineState<S>,
    command_rx: Receiver<EngineCommand>,
    update_tx: Sender<EngineUpdate>,
) {
    info!(blocks = state.store.len(), "engine started");

    loop {
        let ticks = state.ticker.receiver();
        let updates = crossbeam::select! {
            recv(command_rx) -> command => match command {
                Ok(EngineCommand::Shutdown) | Err(_) => None,
                Ok(command) => Some(state.handle(command)),
            },
            recv(ticks) -> _ => Some(state.tick()),
        };
        let Some(updates) = updates else {
            break;
        };

        state.publish();
        for update in updates {
            if let Err(TrySendError::Full(update)) = update_tx.try_send(update) {
                trace!(?update, "update queue full, dropping update");
            }
        }
    }

    state.ticker.cancel();
    info!("engine stopped");
}

impl<S: SoundTrigger> EngineState<S> {
    fn handle(&mut self, command: EngineCommand) -> Vec<EngineUpdate> {
        debug!(?command, "engine command");
        match command {
            EngineCommand::Drag { id, position } => {
                self.store.place(id, position);
                Vec::new()
            }
            EngineCommand::Release { id } => self
                .store
                .commit_placement(id)
                .and_then(|refill| self.store.get(refill))
                .map(|block| EngineUpdate::BlockSpawned {
                    id: block.id,
                    pitch: block.pitch,
                })
                .into_iter()
                .collect(),
            EngineCommand::Remove { id } => {
                self.store.remove(id);
                Vec::new()
            }
            EngineCommand::ReturnHome { id } => {
                self.store.return_home(id);
                Vec::new()
            }
            EngineCommand::Clear => {
                self.store.clear_placed();
                Vec::new()
            }
            EngineCommand::Play => self.play(),
            EngineCommand::Stop => self.stop(),
            EngineCommand::TogglePlay => {
                if self.scheduler.is_running() {
                    self.stop()
                } else {
                    self.play()
                }
            }
            EngineCommand::Shutdown => Vec::new(),
        }
    }

    fn play(&mut self) -> Vec<EngineUpdate> {
        if !self.scheduler.start(&mut self.store) {
            return Vec::new();
        }
        self.forward(vec![Event::Started])
    }

    fn stop(&mut self) -> Vec<EngineUpdate> {
        if !self.scheduler.stop() {
            return Vec::new();
        }
        self.forward(vec![Event::Stopped {
            reason: StopReason::Command,
        }])
    }

    fn tick(&mut self) -> Vec<EngineUpdate> {
        let events = self.scheduler.tick(&mut self.store);
        self.forward(events)
    }

    /// Keeps the ticker in step with the transport and turns scheduler
    /// events into UI updates.
    fn forward(&mut self, events: Vec<Event>) -> Vec<EngineUpdate> {
        events
            .into_iter()
            .map(|event| match event {
                Event::PlayheadMoved { position } => EngineUpdate::Playhead { position },
                Event::NoteTriggered { id, pitch } => EngineUpdate::NoteTriggered { id, pitch },
                Event::Started => {
                    self.ticker.start();
                    EngineUpdate::PlaybackState { running: true }
                }
                Event::Stopped { reason } => {
                    self.ticker.cancel();
                    info!(?reason, "transport stopped");
                    EngineUpdate::PlaybackState { running: false }
                }
            })
            .collect()
    }

    fn publish(&self) {
        self.board.store(Arc::new(Board {
            blocks: self.store.snapshot(),
            playhead: self.scheduler.playhead(),
            running: self.scheduler.is_running(),
        }));
    }
}
