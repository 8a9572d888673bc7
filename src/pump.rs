use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Scalar message to the main loop: an opcode and one argument.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Message {
    pub id: usize,
    pub arg: i64,
}

impl Message {
    pub fn scalar(id: usize, arg: i64) -> Self {
        Self { id, arg }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PumpControl {
    Start(u64),
    Stop,
    Quit,
}

/// Handle to a thread that posts `id` to the main loop every interval.
pub struct Pump {
    ctl: Sender<PumpControl>,
    running: bool,
}

impl Pump {
    pub fn spawn(id: usize, main: Sender<Message>) -> Self {
        let (ctl, rx) = mpsc::channel();
        std::thread::spawn(move || pump_thread(id, rx, main));
        Self::new(ctl)
    }

    pub fn new(ctl: Sender<PumpControl>) -> Self {
        Self { ctl, running: false }
    }

    pub fn start(&mut self, interval_ms: u64) {
        if !self.running {
            self.running = true;
            self.ctl.send(PumpControl::Start(interval_ms)).ok();
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.ctl.send(PumpControl::Stop).ok();
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
        self.ctl.send(PumpControl::Quit).ok();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

fn pump_thread(id: usize, ctl: Receiver<PumpControl>, main: Sender<Message>) {
    let mut interval = Duration::from_millis(1000);
    let mut running = false;

    loop {
        // Block while stopped, wake each interval while running
        let control = if running {
            match ctl.recv_timeout(interval) {
                Ok(c) => Some(c),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match ctl.recv() {
                Ok(c) => Some(c),
                Err(_) => break,
            }
        };

        match control {
            None => {
                if main.send(Message::scalar(id, 0)).is_err() {
                    break;
                }
            }
            Some(PumpControl::Start(ms)) => {
                interval = Duration::from_millis(if ms == 0 { 100 } else { ms });
                running = true;
            }
            Some(PumpControl::Stop) => running = false,
            Some(PumpControl::Quit) => break,
        }
    }
    log::debug!("pump {} exiting", id);
}
