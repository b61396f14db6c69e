//! Game events.
//!
//! Everything observable the game does is recorded as a [`GameEvent`] in an
//! [`EventLog`]. Presentation layers drain the log after each step with
//! [`EventLog::take_events`] and animate from it; the headless driver prints
//! it as JSON lines.

use serde::Serialize;

use cylinder::{BulletId, BulletType};

use crate::game::GameState;

/// Which side a fired casing flies out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CasingSide {
    /// Out to the left.
    Left,
    /// Out to the right.
    Right,
}

/// What happened when the hammer fell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FireOutcome {
    /// The slot was empty.
    DryFire,
    /// The slot held a dud: smoke, no casing.
    Misfire,
    /// A live round detonated.
    Detonation {
        /// Where the casing went.
        casing: CasingSide,
    },
}

/// Something the game did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum GameEvent {
    /// The state machine moved.
    StateChanged {
        /// Previous state.
        from: GameState,
        /// New state.
        to: GameState,
    },
    /// A bullet started seating.
    LoadStarted {
        /// Target slot.
        slot: usize,
        /// Instance id.
        bullet: BulletId,
        /// Bullet type.
        kind: BulletType,
    },
    /// A bullet finished seating.
    Loaded {
        /// Target slot.
        slot: usize,
    },
    /// Loading waits for the player to name the bullet.
    NameRequested {
        /// Target slot.
        slot: usize,
        /// Bullet type being named.
        kind: BulletType,
    },
    /// A pending name prompt closed without loading.
    NameDismissed {
        /// Whether the saved name for the type was cleared.
        cleared: bool,
    },
    /// An eject started.
    EjectStarted {
        /// Slot being emptied.
        slot: usize,
        /// Alt-click fast eject.
        fast: bool,
    },
    /// An eject finished; the slot is empty.
    Ejected {
        /// Emptied slot.
        slot: usize,
    },
    /// A cover was opened or closed.
    CoverToggled {
        /// Slot.
        slot: usize,
        /// New cover state.
        hidden: bool,
    },
    /// Every unfired bullet was covered.
    CoversClosed,
    /// The chamber started spinning.
    SpinStarted {
        /// Initial velocity.
        velocity: f64,
        /// Whether the spin ends in an implicit fire.
        intentional: bool,
    },
    /// Infinite spin switched on or off.
    InfiniteSpin {
        /// New mode.
        enabled: bool,
    },
    /// Slot boundaries passed under the pin this frame.
    SlotsCrossed {
        /// Boundaries crossed.
        count: u32,
    },
    /// The current spin completed another full turn.
    SpinCounted {
        /// Full turns so far.
        count: u64,
    },
    /// The chamber came to rest.
    SpinStopped {
        /// Slot-aligned rotation.
        rotation: f64,
        /// Slot at the firing position.
        slot: usize,
        /// Full turns the spin made.
        spins: u64,
    },
    /// A slow drag release snapped without spinning.
    DragSettled {
        /// Slot-aligned rotation.
        rotation: f64,
    },
    /// The spin counter display cleared.
    SpinCountCleared {
        /// Lifetime spins.
        total: u64,
    },
    /// A covered bullet at the pin was uncovered before detonating.
    Uncovered {
        /// Slot.
        slot: usize,
    },
    /// The hammer fell.
    Fired {
        /// Slot at the firing position.
        slot: usize,
        /// Result.
        outcome: FireOutcome,
    },
    /// A named bullet fired and shows its message.
    BulletRevealed {
        /// Bullet name.
        name: String,
        /// On-fire message.
        message: String,
    },
    /// A reset started; every loaded slot is ejecting.
    ResetStarted,
    /// The reset finished; the chamber is empty.
    ResetFinished,
    /// Quick load filled the chamber.
    QuickLoaded,
    /// A preset was saved.
    PresetSaved {
        /// Bank index.
        index: usize,
    },
    /// A preset was cleared.
    PresetCleared {
        /// Bank index.
        index: usize,
    },
    /// A preset started loading; the chamber is cleared.
    PresetLoading {
        /// Bank index.
        index: usize,
    },
    /// Preset content landed in the chamber.
    PresetApplied {
        /// Bank index.
        index: usize,
    },
    /// A notice appeared.
    Notice {
        /// Notice text.
        text: String,
    },
    /// The notice went away.
    NoticeCleared,
    /// The chamber started smoking.
    SmokeStarted,
    /// The chamber stopped smoking.
    SmokeStopped,
}

/// Ordered record of events since the last drain.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: GameEvent) {
        tracing::trace!("event: {:?}", event);
        self.events.push(event);
    }

    /// Drains and returns every recorded event, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Number of events in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_in_order() {
        let mut log = EventLog::new();
        log.push(GameEvent::ResetStarted);
        log.push(GameEvent::ResetFinished);
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.take_events(),
            vec![GameEvent::ResetStarted, GameEvent::ResetFinished]
        );
        assert!(log.is_empty());
    }

    #[test]
    fn events_serialize_tagged() {
        let event = GameEvent::Fired {
            slot: 2,
            outcome: FireOutcome::Detonation {
                casing: CasingSide::Left,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "fired");
        assert_eq!(json["outcome"]["kind"], "detonation");
        assert_eq!(json["outcome"]["casing"], "left");

        let json = serde_json::to_value(GameEvent::StateChanged {
            from: GameState::Ready,
            to: GameState::Spinning,
        })
        .unwrap();
        assert_eq!(json["to"], "spinning");
    }
}
