//! Scripted in-memory transport for reader tests
//!
//! Inbound bytes are scheduled on the tokio clock, so tests run with
//! `start_paused = true` and never wait in real time.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::time::{sleep, sleep_until, Instant};

use uhfkit_core::{Command, Frame};
use uhfkit_transport::{Error, Result, Transport};

#[derive(Default)]
struct State {
    /// Bytes the reader will emit, with their arrival time
    inbound: VecDeque<(Instant, Bytes)>,

    /// One reply per write, queued in order
    replies: VecDeque<Bytes>,

    written: Vec<Vec<u8>>,
    clears: usize,
    connected: bool,
}

impl State {
    fn arrived(&self, now: Instant) -> usize {
        self.inbound
            .iter()
            .take_while(|(at, _)| *at <= now)
            .map(|(_, chunk)| chunk.len())
            .sum()
    }

    fn take_arrived(&mut self, now: Instant, max: usize) -> BytesMut {
        let mut out = BytesMut::new();

        while out.len() < max {
            let Some((at, chunk)) = self.inbound.front_mut() else {
                break;
            };
            if *at > now {
                break;
            }

            let room = max - out.len();
            if chunk.len() <= room {
                out.extend_from_slice(chunk);
                self.inbound.pop_front();
            } else {
                out.extend_from_slice(&chunk.split_to(room));
            }
        }

        out
    }
}

pub(crate) struct MockTransport {
    state: Arc<Mutex<State>>,
}

/// Test-side handle to a [`MockTransport`]
#[derive(Clone)]
pub(crate) struct MockHandle {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub(crate) fn new() -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(State::default()));
        (
            Self {
                state: state.clone(),
            },
            MockHandle { state },
        )
    }
}

impl MockHandle {
    /// Answer the next write with `bytes`
    pub(crate) fn reply(&self, bytes: impl Into<Bytes>) {
        self.state.lock().unwrap().replies.push_back(bytes.into());
    }

    /// Emit `bytes` unprompted, `delay` from now
    pub(crate) fn emit_after(&self, delay: Duration, bytes: impl Into<Bytes>) {
        let at = Instant::now() + delay;
        let mut state = self.state.lock().unwrap();
        state.inbound.push_back((at, bytes.into()));
        state.inbound.make_contiguous().sort_by_key(|(at, _)| *at);
    }

    pub(crate) fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().written.clone()
    }

    pub(crate) fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }

    /// Lose the link without the reader closing it
    pub(crate) fn drop_link(&self) {
        self.state.lock().unwrap().connected = false;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.connected {
            return Err(Error::AlreadyConnected);
        }
        state.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.state.lock().unwrap().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        state.written.push(data.to_vec());
        if let Some(reply) = state.replies.pop_front() {
            let pos = state.inbound.partition_point(|(at, _)| *at <= now);
            state.inbound.insert(pos, (now, reply));
        }
        Ok(())
    }

    fn bytes_available(&self) -> Result<usize> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(self.state.lock().unwrap().arrived(Instant::now()))
    }

    fn clear_input(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        state.inbound.retain(|(at, _)| *at > now);
        state.clears += 1;
        Ok(())
    }

    async fn receive(&mut self, max: usize, wait: Duration) -> Result<BytesMut> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let deadline = Instant::now() + wait;
        let next = {
            let state = self.state.lock().unwrap();
            state.inbound.front().map(|(at, _)| *at)
        };

        match next {
            Some(at) if at <= deadline => sleep_until(at).await,
            _ => {
                sleep(wait).await;
                return Ok(BytesMut::new());
            }
        }

        Ok(self.state.lock().unwrap().take_arrived(Instant::now(), max))
    }

    fn port_name(&self) -> String {
        "mock".to_string()
    }
}

/// Read-TID response frame carrying `tid`
pub(crate) fn tid_frame(tid: &[u8; 12]) -> Bytes {
    let mut payload = vec![0x01, 0x02, 0x03, 0x30, 0x00];
    payload.extend_from_slice(tid);
    payload.extend_from_slice(&[0x12, 0x34, 0xFD, 0xA8]);
    Frame::build(Command::ReadTid, &payload).unwrap().into_bytes()
}

/// Inventory frame for `epc` seen on `antenna`
pub(crate) fn tag_frame(antenna: u8, epc: &[u8], rssi_tenths: i16) -> Bytes {
    let words = (epc.len() / 2) as u16;
    let pc = (words << 11).to_be_bytes();
    let mut payload = vec![0x01, 0x0D, antenna, pc[0], pc[1]];
    payload.extend_from_slice(epc);
    payload.extend_from_slice(&[0x12, 0x34]);
    payload.extend_from_slice(&rssi_tenths.to_be_bytes());
    Frame::build(Command::StartInventory, &payload).unwrap().into_bytes()
}

pub(crate) fn concat(parts: &[&[u8]]) -> Bytes {
    Bytes::from(parts.concat())
}
