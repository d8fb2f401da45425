//! Non-blocking TCP transport.

use anyhow::{Context, Result};
use log::debug;
use std::io::{self, Read, Write};
use std::net::TcpStream;

use super::Transport;

/// Largest chunk pulled off the socket per service call
const RECV_CHUNK: usize = 64;

/// Controller connection over TCP.
///
/// Reads and writes only touch internal buffers; the socket itself is only
/// used from [`Transport::service`], which never blocks.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    rbuf: Vec<u8>,
    wbuf: Vec<u8>,
    closed: bool,
}

impl TcpTransport {
    pub fn connect(addr: &str) -> Result<Self> {
        let stream =
            TcpStream::connect(addr).with_context(|| format!("connecting to {}", addr))?;
        Self::from_stream(stream)
    }

    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream
            .set_nonblocking(true)
            .context("switching controller socket to non-blocking")?;
        stream.set_nodelay(true).context("disabling Nagle")?;
        Ok(Self {
            stream,
            rbuf: Vec::new(),
            wbuf: Vec::new(),
            closed: false,
        })
    }

    fn flush_pending(&mut self) -> Result<()> {
        while !self.wbuf.is_empty() {
            match self.stream.write(&self.wbuf) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(sent) => {
                    self.wbuf.drain(..sent);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("writing to controller"),
            }
        }
        Ok(())
    }

    fn fill_received(&mut self) -> Result<()> {
        let mut chunk = [0u8; RECV_CHUNK];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    debug!("Controller closed the connection");
                    self.closed = true;
                    break;
                }
                Ok(n) => self.rbuf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("reading from controller"),
            }
        }
        Ok(())
    }
}

impl Transport for TcpTransport {
    fn read(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.rbuf)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.wbuf.extend_from_slice(bytes);
    }

    fn service(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush_pending()?;
        self.fill_received()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
