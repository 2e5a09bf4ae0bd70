// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup handoff pipe.
//!
//! The code that asks for a task to start blocks in [`HandoffPipe::wait_ready`]
//! until the code that confirmed the OS process exists calls
//! [`HandoffPipe::notify_ready`].

use std::fs::File;
use std::io::{self, Read, Write};

/// Read/write ends of an anonymous pipe, closed on drop.
#[derive(Debug)]
pub struct HandoffPipe {
    read: File,
    write: File,
}

impl HandoffPipe {
    pub fn new(read: File, write: File) -> Self {
        Self { read, write }
    }

    /// Signal the waiting side that the spawned process exists.
    pub fn notify_ready(&self) -> io::Result<()> {
        (&self.write).write_all(&[1])
    }

    /// Block until [`notify_ready`](Self::notify_ready) has been called once.
    pub fn wait_ready(&self) -> io::Result<()> {
        let mut buf = [0u8; 1];
        (&self.read).read_exact(&mut buf)
    }

    pub fn read_end(&self) -> &File {
        &self.read
    }

    pub fn write_end(&self) -> &File {
        &self.write
    }
}
