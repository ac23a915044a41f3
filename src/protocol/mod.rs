//! Serial command protocol: byte-at-a-time token framing and the fixed
//! command vocabulary.
//!
//! Two framings exist on the wire. The turret pair speaks LX200-style
//! commands terminated by `#` (`:Mn#`, `:Q#`, ...); the focus link speaks
//! two-byte commands terminated by the sign itself (`F+`, `F-`). The
//! tokenizer consumes one byte at a time so interrupt-style delivery and
//! batch reads produce identical token streams.

pub mod dispatch;

pub use dispatch::Dispatcher;

/// Cap on bytes accumulated without a terminator. The longest valid
/// command is four bytes; anything past the cap is line noise and gets
/// discarded so memory use stays flat.
pub const MAX_PENDING_BYTES: usize = 64;

/// Terminator discipline of one serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `#`-terminated LX200 commands (turret pan/tilt).
    Lx200,
    /// `+`/`-` terminated focus commands.
    FocusSign,
}

impl Framing {
    fn is_terminator(self, byte: u8) -> bool {
        match self {
            Framing::Lx200 => byte == b'#',
            Framing::FocusSign => byte == b'+' || byte == b'-',
        }
    }
}

/// Accumulates bytes until a terminator completes a command token.
#[derive(Debug)]
pub struct Tokenizer {
    framing: Framing,
    buffer: Vec<u8>,
}

impl Tokenizer {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            buffer: Vec::with_capacity(MAX_PENDING_BYTES),
        }
    }

    /// Append one byte; returns the completed token when the byte is a
    /// terminator. Never blocks.
    pub fn feed(&mut self, byte: u8) -> Option<String> {
        if self.buffer.len() >= MAX_PENDING_BYTES && !self.framing.is_terminator(byte) {
            tracing::warn!(
                "Discarding {} unterminated bytes from command stream",
                self.buffer.len()
            );
            self.buffer.clear();
        }
        self.buffer.push(byte);
        if !self.framing.is_terminator(byte) {
            return None;
        }
        let token = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        Some(token)
    }

    /// Bytes currently pending without a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// The closed command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `:Mn#` tilt toward the upper bound.
    TiltUp,
    /// `:Ms#` tilt toward the lower bound.
    TiltDown,
    /// `:Me#` azimuth positive, unbounded.
    PanEast,
    /// `:Mw#` azimuth negative, unbounded.
    PanWest,
    /// `:Q#` controlled stop of both turret axes.
    Stop,
    /// `F+` focus in by one increment.
    FocusIn,
    /// `F-` focus out by one increment.
    FocusOut,
}

impl Command {
    /// Substring match against the vocabulary, case-sensitive.
    ///
    /// Deliberately permissive: a valid command embedded in line noise
    /// (`xx:Mn#`) still matches, which keeps the host wire-compatible
    /// with senders that pad or mangle frames. Partial strings match
    /// nothing.
    pub fn match_token(token: &str) -> Option<Command> {
        if token.contains(":Mn#") {
            Some(Command::TiltUp)
        } else if token.contains(":Ms#") {
            Some(Command::TiltDown)
        } else if token.contains(":Me#") {
            Some(Command::PanEast)
        } else if token.contains(":Mw#") {
            Some(Command::PanWest)
        } else if token.contains(":Q#") {
            Some(Command::Stop)
        } else if token.contains("F+") {
            Some(Command::FocusIn)
        } else if token.contains("F-") {
            Some(Command::FocusOut)
        } else {
            None
        }
    }
}
