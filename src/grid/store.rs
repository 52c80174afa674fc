use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BlockId, GridGeometry, NoteBlock, PitchClass, Placement, Position};

const CHROMATIC_SLOTS_X: [f32; 12] = [
    28.0, 57.0, 85.0, 114.0, 142.0, 199.0, 228.0, 256.0, 285.0, 313.0, 342.0, 370.0,
];

/// Home position of one palette block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteSlot {
    pub pitch: PitchClass,
    pub home: Position,
}

impl PaletteSlot {
    /// One slot per pitch class laid out like a keyboard along the bottom
    /// edge of the grid. The bottom edge is outside every row's tolerance,
    /// so blocks resting there never fire.
    pub fn chromatic(geometry: &GridGeometry) -> Vec<PaletteSlot> {
        let scale = geometry.width / super::DEFAULT_GRID_WIDTH;
        PitchClass::ALL
            .into_iter()
            .zip(CHROMATIC_SLOTS_X)
            .map(|(pitch, x)| PaletteSlot {
                pitch,
                home: Position::new(x * scale, geometry.height),
            })
            .collect()
    }
}

/// Owns every note block on the board, keyed by id.
#[derive(Debug, Clone)]
pub struct PlacementStore {
    geometry: GridGeometry,
    blocks: BTreeMap<BlockId, NoteBlock>,
    next_id: u64,
}

impl PlacementStore {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            blocks: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn with_palette(geometry: GridGeometry, slots: &[PaletteSlot]) -> Self {
        let mut store = Self::new(geometry);
        for slot in slots {
            store.spawn_home(slot.pitch, slot.home);
        }
        store
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Adds a palette block resting at `home`.
    pub fn spawn_home(&mut self, pitch: PitchClass, home: Position) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        let home = self.geometry.clamp(home);
        self.blocks.insert(
            id,
            NoteBlock {
                id,
                pitch,
                position: home,
                home,
                placement: Placement::Home,
                triggered: false,
            },
        );
        id
    }

    pub fn get(&self, id: BlockId) -> Option<&NoteBlock> {
        self.blocks.get(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteBlock> {
        self.blocks.values()
    }

    pub fn snapshot(&self) -> Vec<NoteBlock> {
        self.blocks.values().cloned().collect()
    }

    /// Palette blocks of `pitch`, resting or mid-drag.
    pub fn palette_count(&self, pitch: PitchClass) -> usize {
        self.blocks
            .values()
            .filter(|block| block.pitch == pitch && block.is_palette())
            .count()
    }

    /// Drag update. Tracks the pointer without snapping.
    pub fn place(&mut self, id: BlockId, position: Position) {
        let position = self.geometry.clamp(position);
        if let Some(block) = self.blocks.get_mut(&id) {
            block.position = position;
            if block.placement == Placement::Home {
                block.placement = Placement::Lifted;
            }
        }
    }

    /// Drag release. Snaps the block onto a row and, when it was lifted off
    /// the palette, refills the palette slot. Returns the refill block.
    /// A block still resting at home stays where it is.
    pub fn commit_placement(&mut self, id: BlockId) -> Option<BlockId> {
        let geometry = self.geometry;
        let block = self.blocks.get_mut(&id)?;
        if block.placement == Placement::Home {
            return None;
        }
        block.position.y = geometry.snap_to_row(block.position.y);

        if block.placement == Placement::Placed {
            return None;
        }
        block.placement = Placement::Placed;
        let (pitch, home) = (block.pitch, block.home);
        debug!(%id, %pitch, x = block.position.x, y = block.position.y, "placed block");

        let refill = self.spawn_home(pitch, home);
        debug!(id = %refill, %pitch, "replenished palette slot");
        Some(refill)
    }

    /// Deletes a placed block. Palette blocks and unknown ids are left alone.
    pub fn remove(&mut self, id: BlockId) -> bool {
        match self.blocks.get(&id) {
            Some(block) if block.placement == Placement::Placed => {
                self.blocks.remove(&id);
                debug!(%id, "removed block");
                true
            }
            _ => false,
        }
    }

    /// Drops every placed block and sends lifted palette blocks home.
    pub fn clear_placed(&mut self) -> usize {
        let before = self.blocks.len();
        self.blocks
            .retain(|_, block| block.placement != Placement::Placed);
        for block in self.blocks.values_mut() {
            if block.placement == Placement::Lifted {
                block.position = block.home;
                block.placement = Placement::Home;
            }
        }
        let removed = before - self.blocks.len();
        debug!(removed, "cleared placed blocks");
        removed
    }

    /// Puts a lifted palette block back on its slot.
    pub fn return_home(&mut self, id: BlockId) -> bool {
        match self.blocks.get_mut(&id) {
            Some(block) if block.placement == Placement::Lifted => {
                block.position = block.home;
                block.placement = Placement::Home;
                block.triggered = false;
                true
            }
            _ => false,
        }
    }

    pub fn notes_near(
        &self,
        x: f32,
        on_row: impl Fn(f32) -> bool,
    ) -> impl Iterator<Item = &NoteBlock> {
        self.blocks.values().filter(move |block| {
            self.geometry.within_window(x, block.position.x) && on_row(block.position.y)
        })
    }

    /// Flags the block as fired. Returns its pitch only when the flag was clear.
    pub fn mark_triggered(&mut self, id: BlockId) -> Option<PitchClass> {
        let block = self.blocks.get_mut(&id)?;
        if block.triggered {
            return None;
        }
        block.triggered = true;
        Some(block.pitch)
    }

    pub fn reset_triggered(&mut self) {
        for block in self.blocks.values_mut() {
            block.triggered = false;
        }
    }
}
