//! Forward-only walk over the command list

use crate::elements::Command;
use std::ops::Range;

/// Cursor over positioned commands
///
/// Besides plain iteration it can swallow a contiguous run of upcoming
/// commands so the outer walk never visits them.
#[derive(Debug, Clone)]
pub struct CommandCursor<'a> {
    commands: &'a [Command],
    position: usize,
}

impl<'a> CommandCursor<'a> {
    pub fn new(commands: &'a [Command]) -> Self {
        Self {
            commands,
            position: 0,
        }
    }

    /// Position of the next command to be returned
    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn peek(&self) -> Option<(usize, &'a Command)> {
        self.commands
            .get(self.position)
            .map(|command| (self.position, command))
    }

    /// Consume commands while `predicate` holds, returning their positions
    pub fn consume_run<P>(&mut self, mut predicate: P) -> Range<usize>
    where
        P: FnMut(usize, &Command) -> bool,
    {
        let start = self.position;
        while let Some((position, command)) = self.peek() {
            if !predicate(position, command) {
                break;
            }
            self.position += 1;
        }
        start..self.position
    }
}

impl<'a> Iterator for CommandCursor<'a> {
    type Item = (usize, &'a Command);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.peek()?;
        self.position += 1;
        Some(item)
    }
}
