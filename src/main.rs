mod alerts;
mod controls;
mod pump;
mod storage;
mod ui;

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use alarm_core::{AlarmClock, BlinkScheduler, Clock, Transition};
use num_traits::{FromPrimitive, ToPrimitive};

use crate::alerts::{fire_alert, open_ringer, AlertConfig, Ringer};
use crate::controls::{parse_control, Control};
use crate::pump::{Message, Pump};
use crate::storage::SettingsStorage;

const TICK_INTERVAL_MS: u64 = 1000;
const MIN_BLINK_INTERVAL_MS: u64 = 50;

#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
enum AppOp {
    Redraw = 0,
    Adjust,
    Cancel,
    Preview,
    ToggleAudio,
    RingSeconds,
    Help,
    Pump,
    Blink,
    Quit,
}

impl AppOp {
    fn id(&self) -> usize {
        self.to_usize().unwrap_or(usize::MAX)
    }

    fn msg(self, arg: i64) -> Message {
        Message::scalar(self.id(), arg)
    }
}

fn control_message(control: Control) -> Message {
    match control {
        Control::Adjust(delta) => AppOp::Adjust.msg(delta),
        Control::Cancel => AppOp::Cancel.msg(0),
        Control::Preview => AppOp::Preview.msg(0),
        Control::ToggleAudio => AppOp::ToggleAudio.msg(0),
        Control::RingSeconds(secs) => AppOp::RingSeconds.msg(i64::try_from(secs).unwrap_or(i64::MAX)),
        Control::Redraw => AppOp::Redraw.msg(0),
        Control::Help => AppOp::Help.msg(0),
        Control::Quit => AppOp::Quit.msg(0),
    }
}

struct KClockApp<C: Clock> {
    alarm: AlarmClock<C>,
    blink: BlinkScheduler,
    alert_config: AlertConfig,
    storage: SettingsStorage,
    ringer: Box<dyn Ringer>,
    preview: Box<dyn Ringer>,
    out: Box<dyn Write>,
    tick_pump: Pump,
    blink_pump: Pump,
}

impl<C: Clock> KClockApp<C> {
    fn new(
        alarm: AlarmClock<C>,
        storage: SettingsStorage,
        ringer: Box<dyn Ringer>,
        preview: Box<dyn Ringer>,
        out: Box<dyn Write>,
        tick_pump: Pump,
        blink_pump: Pump,
    ) -> Self {
        let alert_config = storage.load_alert_config();
        let blink_ms = alert_config.blink_interval_ms.max(MIN_BLINK_INTERVAL_MS);
        Self {
            alarm,
            blink: BlinkScheduler::new(Duration::from_millis(blink_ms)),
            alert_config,
            storage,
            ringer,
            preview,
            out,
            tick_pump,
            blink_pump,
        }
    }

    fn redraw(&mut self) {
        let now = self.alarm.now();
        let line = ui::status_line(
            &self.alarm,
            now,
            &chrono::Local,
            &self.blink,
            &self.alert_config,
            self.preview.is_ringing(),
        );
        if let Err(e) = ui::draw_status(&mut self.out, &line) {
            log::warn!("can't draw status: {}", e);
        }
    }

    fn show_help(&mut self) {
        if let Err(e) = ui::draw_help(&mut self.out, &self.alert_config) {
            log::warn!("can't draw help: {}", e);
        }
        self.redraw();
    }

    /// React to a state change reported by the alarm clock.
    fn apply(&mut self, transition: Transition) {
        if transition.left_alarming() {
            self.ringer.stop();
            self.blink.stop();
            self.blink_pump.stop();
        }
        if transition.entered_alarming() {
            fire_alert(&self.alert_config, self.ringer.as_mut(), "Time's up!");
            self.blink.start();
            let blink_ms = self.blink.interval().as_millis() as u64;
            self.blink_pump.start(blink_ms);
        }
        if transition.is_change() {
            log::info!("alarm {:?}", transition.to);
        }
        self.sync_tick_pump();
    }

    fn sync_tick_pump(&mut self) {
        if self.alarm.is_idle() && !self.preview.is_ringing() {
            self.tick_pump.stop();
        } else {
            self.tick_pump.start(TICK_INTERVAL_MS);
        }
    }

    fn handle_adjust(&mut self, delta_secs: i64) {
        let transition = self.alarm.adjust(delta_secs);
        self.apply(transition);
        self.redraw();
    }

    fn handle_cancel(&mut self) {
        let transition = self.alarm.cancel();
        self.apply(transition);
        self.redraw();
    }

    fn handle_pump(&mut self) {
        let now = self.alarm.now();
        let transition = self.alarm.tick(now);
        self.apply(transition);

        if let Some(rang_at) = self.alarm.rang_at() {
            if self.ringer.is_ringing() && !transition.entered_alarming() {
                if self.alert_config.should_silence(now - rang_at) {
                    log::info!("alarm sound stopped after {}s", self.alert_config.ring_seconds);
                    self.ringer.stop();
                } else if let Err(e) = self.ringer.pulse() {
                    log::warn!("can't play alarm sound: {}", e);
                }
            }
        }
        if self.preview.is_ringing() {
            if let Err(e) = self.preview.pulse() {
                log::warn!("can't play preview: {}", e);
            }
        }
        self.redraw();
    }

    fn handle_blink(&mut self) {
        if self.alarm.is_alarming() {
            self.blink.toggle();
        } else {
            self.blink.stop();
            self.blink_pump.stop();
        }
        self.redraw();
    }

    fn toggle_preview(&mut self) {
        if self.preview.is_ringing() {
            self.preview.stop();
        } else if let Err(e) = self.preview.start() {
            log::warn!("can't play preview: {}", e);
            self.preview.stop();
        }
        self.sync_tick_pump();
        self.redraw();
    }

    fn toggle_audio(&mut self) {
        self.alert_config.audio = !self.alert_config.audio;
        if !self.alert_config.audio && self.ringer.is_ringing() {
            self.ringer.stop();
        }
        self.storage.save_alert_config(&self.alert_config);
        self.redraw();
    }

    fn set_ring_seconds(&mut self, secs: u64) {
        self.alert_config.ring_seconds = secs;
        self.storage.save_alert_config(&self.alert_config);
        self.redraw();
    }

    fn stop_all(&mut self) {
        self.ringer.stop();
        self.preview.stop();
        self.blink.stop();
        self.tick_pump.stop();
        self.blink_pump.stop();
    }
}

fn input_thread(main: Sender<Message>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("can't read input: {}", e);
                break;
            }
        };
        let msg = match parse_control(&line) {
            Some(control) => control_message(control),
            None => {
                log::warn!("unknown command {:?}, 'h' for help", line.trim());
                continue;
            }
        };
        if main.send(msg).is_err() {
            return;
        }
    }
    main.send(AppOp::Quit.msg(0)).ok();
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("KClock PID is {}", std::process::id());

    let (tx, rx) = mpsc::channel();
    let tick_pump = Pump::spawn(AppOp::Pump.id(), tx.clone());
    let blink_pump = Pump::spawn(AppOp::Blink.id(), tx.clone());
    let input_tx = tx.clone();
    std::thread::spawn(move || input_thread(input_tx));
    drop(tx);

    let storage = SettingsStorage::new();
    let config = storage.load_alert_config();
    let ringer = open_ringer(&config);
    let preview = open_ringer(&config);
    let mut app = KClockApp::new(
        AlarmClock::system(),
        storage,
        ringer,
        preview,
        Box::new(io::stdout()),
        tick_pump,
        blink_pump,
    );
    app.show_help();

    for msg in rx.iter() {
        match FromPrimitive::from_usize(msg.id) {
            Some(AppOp::Redraw) => app.redraw(),
            Some(AppOp::Adjust) => app.handle_adjust(msg.arg),
            Some(AppOp::Cancel) => app.handle_cancel(),
            Some(AppOp::Preview) => app.toggle_preview(),
            Some(AppOp::ToggleAudio) => app.toggle_audio(),
            Some(AppOp::RingSeconds) => app.set_ring_seconds(u64::try_from(msg.arg).unwrap_or(0)),
            Some(AppOp::Help) => app.show_help(),
            Some(AppOp::Pump) => app.handle_pump(),
            Some(AppOp::Blink) => app.handle_blink(),
            Some(AppOp::Quit) => break,
            None => log::error!("unknown opcode: {:?}", msg),
        }
    }

    app.stop_all();
    app.tick_pump.quit();
    app.blink_pump.quit();
    writeln!(app.out).ok();
    log::info!("KClock exiting");
}
