use crate::infrastructure::error::SessionError;
use ctf_session_core::{PlayerFields, WireMessage};
use std::collections::VecDeque;

/// Bounded FIFO of game messages waiting to go out.
///
/// A `State` delta pushed right behind a queued delta for the same player
/// is merged into it instead of taking a new slot. Nothing is ever merged
/// past a later message, so send order is kept.
#[derive(Debug)]
pub struct MessageQueue {
    queue: VecDeque<WireMessage>,
    max_size: usize,
}

impl MessageQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn push(&mut self, msg: WireMessage) -> Result<(), QueueError> {
        let msg = match self.coalesce(msg) {
            Some(msg) => msg,
            None => return Ok(()),
        };
        if self.queue.len() >= self.max_size {
            return Err(QueueError::Full { max: self.max_size });
        }
        self.queue.push_back(msg);
        Ok(())
    }

    /// Fold a state delta into the tail if the tail is a delta from the
    /// same player. Returns the message back if it still needs a slot.
    fn coalesce(&mut self, msg: WireMessage) -> Option<WireMessage> {
        let incoming = match msg {
            WireMessage::State(p) => p,
            other => return Some(other),
        };

        match self.queue.back_mut() {
            Some(WireMessage::State(tail)) if tail.id == incoming.id => {
                merge_fields(&mut tail.fields, incoming.fields);
                None
            }
            _ => Some(WireMessage::State(incoming)),
        }
    }

    /// Take up to `max` messages from the front
    pub fn take_batch(&mut self, max: usize) -> Vec<WireMessage> {
        let n = max.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Newer values win; fields the newer delta leaves out keep the older value
fn merge_fields(older: &mut PlayerFields, newer: PlayerFields) {
    if newer.team.is_some() {
        older.team = newer.team;
    }
    if newer.position.is_some() {
        older.position = newer.position;
    }
    if newer.rotation.is_some() {
        older.rotation = newer.rotation;
    }
    if newer.health.is_some() {
        older.health = newer.health;
    }
    if newer.current_weapon.is_some() {
        older.current_weapon = newer.current_weapon;
    }
    if newer.display_name.is_some() {
        older.display_name = newer.display_name;
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum QueueError {
    #[error("Queue is full (max size: {max})")]
    Full { max: usize },
}

impl From<QueueError> for SessionError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Full { max } => SessionError::QueueFull { max },
        }
    }
}
