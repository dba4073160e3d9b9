// Copyright (c) 2022-2023 The MobileCoin Foundation

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    str::FromStr,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, LevelFilter};
use simplelog::SimpleLogger;

use ledger_ada::{
    apdu::status::{Response, StatusCode},
    Exchange,
};

/// Setup logging from the `LOG_LEVEL` environment variable
pub fn setup() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());
}

/// Frames (and their exchange timeouts) recorded by a [MockDevice]
#[derive(Clone, Default)]
pub struct Frames(Arc<Mutex<Vec<(Vec<u8>, Duration)>>>);

impl Frames {
    pub fn get(&self) -> Vec<Vec<u8>> {
        self.0.lock().unwrap().iter().map(|(f, _)| f.clone()).collect()
    }

    /// Timeout provided with each recorded frame
    pub fn timeouts(&self) -> Vec<Duration> {
        self.0.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    /// (INS, P1, P2) for each recorded frame
    pub fn headers(&self) -> Vec<(u8, u8, u8)> {
        self.get().iter().map(|f| (f[1], f[2], f[3])).collect()
    }
}

/// Scripted device, records every frame and replies with queued responses,
/// or an empty success response once the queue is exhausted
pub struct MockDevice {
    frames: Frames,
    responses: VecDeque<Vec<u8>>,
}

impl MockDevice {
    pub fn new() -> (Self, Frames) {
        let frames = Frames::default();

        let d = Self {
            frames: frames.clone(),
            responses: VecDeque::new(),
        };

        (d, frames)
    }

    /// Queue a success response carrying the provided data
    pub fn respond(mut self, data: &[u8]) -> Self {
        self.responses
            .push_back(Response::new(data, StatusCode::Success).to_vec());
        self
    }

    /// Queue a number of empty success responses
    pub fn ack(mut self, n: usize) -> Self {
        for _ in 0..n {
            self = self.respond(&[]);
        }
        self
    }

    /// Queue a raw response, used as-is
    pub fn respond_raw(mut self, raw: Vec<u8>) -> Self {
        self.responses.push_back(raw);
        self
    }

    /// Queue a rejection
    pub fn reject(mut self, status: StatusCode) -> Self {
        self.responses.push_back(Response::new(&[], status).to_vec());
        self
    }
}

#[async_trait]
impl Exchange for MockDevice {
    async fn exchange(
        &mut self,
        command: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, ledger_lib::Error> {
        debug!("mock rx: {}", hex::encode(command));

        self.frames.0.lock().unwrap().push((command.to_vec(), timeout));

        let r = self
            .responses
            .pop_front()
            .unwrap_or_else(|| Response::new(&[], StatusCode::Success).to_vec());

        Ok(r)
    }
}
