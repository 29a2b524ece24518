use crossbeam_channel::{Receiver, TryRecvError};

/// A key event as the interactive controller sees it, independent of the
/// terminal or windowing library that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Char(char),
    Space,
    Escape,
}

/// Non-blocking source of key presses, polled once per frame.
pub trait KeySource: Send {
    /// The next pending key, or `None` when nothing is waiting.
    fn poll(&mut self) -> Option<KeyPress>;
}

/// Reads keys sent from another thread over a crossbeam channel.
pub struct ChannelKeySource {
    rx: Receiver<KeyPress>,
    disconnected: bool,
}

impl ChannelKeySource {
    pub fn new(rx: Receiver<KeyPress>) -> Self {
        Self {
            rx,
            disconnected: false,
        }
    }

    /// True once every sender has been dropped and the queue is drained.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl KeySource for ChannelKeySource {
    fn poll(&mut self) -> Option<KeyPress> {
        match self.rx.try_recv() {
            Ok(key) => Some(key),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.disconnected {
                    log::debug!("Key input channel closed");
                    self.disconnected = true;
                }
                None
            }
        }
    }
}

/// Never yields a key. Used when there is no interactive input.
pub struct NoKeys;

impl KeySource for NoKeys {
    fn poll(&mut self) -> Option<KeyPress> {
        None
    }
}
