//! The per-controller session: composition root for handshake, decoder,
//! scheduler and feedback.
//!
//! # Threading
//!
//! Every method takes `&self`; share the session through an `Arc` between the
//! tick driver, the radio receive loop and game threads. The command buffer
//! and scheduling flags live behind one mutex. [`Ds4Session::tick`] only
//! ever `try_lock`s it and skips on contention; [`Ds4Session::rumble`] blocks
//! until it gets it. The transport is always called with the mutex released.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;

use bluepad_hid_ds4_protocol::{BatteryLevel, CommandBuffer};
use parking_lot::{Mutex, RwLock};

use crate::config::ConfigSource;
use crate::decoder::{GestureState, IdleState, InputDecoder};
use crate::error::SessionResult;
use crate::feedback::FeedbackState;
use crate::handshake::{Handshake, HandshakeStep};
use crate::scheduler::{OutputScheduler, Transmission};
use crate::stats::{SessionStats, StatsSnapshot};
use crate::transport::{Channel, ConnectionState, DeviceHandle, InputSink, Transport};

#[derive(Debug)]
struct OutputState {
    scheduler: OutputScheduler,
    feedback: FeedbackState,
}

pub struct Ds4Session<T, C, S> {
    handle: DeviceHandle,
    transport: T,
    config: C,
    sink: S,
    output: Mutex<OutputState>,
    handshake: Mutex<Handshake>,
    decoder: Mutex<InputDecoder>,
    connection: RwLock<ConnectionState>,
    player_slot: RwLock<Option<u8>>,
    accepts_commands: AtomicBool,
    battery: AtomicU8,
    stats: SessionStats,
}

impl<T, C, S> Ds4Session<T, C, S>
where
    T: Transport,
    C: ConfigSource,
    S: InputSink,
{
    /// Create a disconnected session. Call [`Self::start`] once the link is up.
    pub fn new(handle: DeviceHandle, transport: T, config: C, sink: S) -> Self {
        let buffer = CommandBuffer::new(config.current().update_rate);
        Self {
            handle,
            transport,
            config,
            sink,
            output: Mutex::new(OutputState {
                scheduler: OutputScheduler::new(buffer, Instant::now()),
                feedback: FeedbackState::new(),
            }),
            handshake: Mutex::new(Handshake::default()),
            decoder: Mutex::new(InputDecoder::new()),
            connection: RwLock::new(ConnectionState::Disconnected),
            player_slot: RwLock::new(None),
            accepts_commands: AtomicBool::new(false),
            battery: AtomicU8::new(BatteryLevel::Full.as_u8()),
            stats: SessionStats::new(),
        }
    }

    /// Bring the session up: mark connected, write the configured report rate
    /// and send a motors-off baseline.
    pub fn start(&self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&self, now: Instant) {
        self.accepts_commands.store(false, Ordering::SeqCst);
        self.set_connection_state(ConnectionState::Connected);

        let rate = self.config.current().update_rate;
        {
            let mut output = self.output.lock();
            output.scheduler.buffer_mut().set_update_rate(rate);
            output.scheduler.reset_last_send(now);
        }
        tracing::info!(handle = self.handle.0, rate = ?rate, "DS4 session started");

        self.rumble_at(0, 0, now);
    }

    /// Send the next handshake fragment.
    ///
    /// Returns `true` once every fragment has gone out; the call that returns
    /// `true` sends nothing.
    pub fn advance_handshake(&self) -> bool {
        let step = self.handshake.lock().advance();
        match step {
            HandshakeStep::Fragment(fragment) => {
                match self
                    .transport
                    .send_command(self.handle, Channel::ServiceDiscovery, fragment)
                {
                    Ok(()) => self.stats.inc_handshake_fragment_sent(),
                    Err(err) => {
                        self.stats.inc_transport_error();
                        tracing::warn!(
                            handle = self.handle.0,
                            error = %err,
                            "handshake fragment send failed"
                        );
                    }
                }
                false
            }
            HandshakeStep::Complete => {
                if !self.accepts_commands.swap(true, Ordering::SeqCst) {
                    tracing::info!(handle = self.handle.0, "handshake complete");
                }
                true
            }
        }
    }

    /// Decode one raw report and push the snapshot to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SessionError::Decode`] for short or foreign reports;
    /// nothing is published in that case.
    pub fn handle_input_report(&self, raw: &[u8]) -> SessionResult<()> {
        self.handle_input_report_at(raw, Instant::now())
    }

    /// [`Self::handle_input_report`] with an explicit receive time.
    ///
    /// # Errors
    ///
    /// See [`Self::handle_input_report`].
    pub fn handle_input_report_at(&self, raw: &[u8], now: Instant) -> SessionResult<()> {
        let decoded = match self.decoder.lock().decode(raw, now) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.stats.inc_report_rejected();
                tracing::debug!(handle = self.handle.0, len = raw.len(), error = %err, "input report rejected");
                return Err(err.into());
            }
        };

        self.battery
            .store(decoded.snapshot.battery.as_u8(), Ordering::Relaxed);
        self.stats.inc_report_decoded();
        self.sink.publish(decoded.snapshot);
        Ok(())
    }

    /// Periodic driver entry point.
    pub fn tick(&self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&self, now: Instant) {
        if self.connection_state() != ConnectionState::Connected {
            return;
        }

        let Some(mut output) = self.output.try_lock() else {
            self.stats.inc_tick_skipped();
            tracing::trace!(handle = self.handle.0, "tick skipped, output locked");
            return;
        };

        let config = self.config.current();
        let slot = self.player_slot();
        let battery = self.battery_level();

        let OutputState {
            scheduler,
            feedback,
        } = &mut *output;
        if feedback.apply(&config, slot, battery, scheduler.buffer_mut()) {
            scheduler.mark_pending();
        }
        let transmission = scheduler.poll(now);
        drop(output);

        if let Some(transmission) = transmission {
            self.transmit(&transmission);
        }
    }

    /// Set motor intensities. Never fails and never drops the request: it
    /// waits for the output lock, and if a send is in flight the new values go
    /// out with the next tick.
    pub fn rumble(&self, large: u8, small: u8) {
        self.rumble_at(large, small, Instant::now());
    }

    pub fn rumble_at(&self, large: u8, small: u8, now: Instant) {
        let transmission = {
            let mut output = self.output.lock();
            let (large, small) = if self.config.current().rumble_disabled {
                (0, 0)
            } else {
                (large, small)
            };
            let sent = output
                .scheduler
                .submit(now, |buffer| buffer.set_rumble(large, small));
            if sent.is_none() {
                self.stats.inc_coalesced_write();
            }
            sent
        };

        if let Some(transmission) = transmission {
            self.transmit(&transmission);
        }
    }

    fn transmit(&self, transmission: &Transmission) {
        match self.transport.send_command(
            self.handle,
            Channel::HidInterrupt,
            transmission.as_bytes(),
        ) {
            Ok(()) => {
                self.stats.inc_command_sent();
                tracing::debug!(handle = self.handle.0, "command sent");
            }
            Err(err) => {
                self.stats.inc_transport_error();
                tracing::warn!(handle = self.handle.0, error = %err, "command send failed");
            }
        }
        self.output.lock().scheduler.complete();
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub fn set_connection_state(&self, state: ConnectionState) {
        *self.connection.write() = state;
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.read()
    }

    /// Player slot assigned by the host; `None` (or anything outside 1–4)
    /// shows red.
    pub fn assign_player_slot(&self, slot: Option<u8>) {
        *self.player_slot.write() = slot;
    }

    pub fn player_slot(&self) -> Option<u8> {
        *self.player_slot.read()
    }

    /// Whether the handshake has completed since the last start.
    pub fn accepts_commands(&self) -> bool {
        self.accepts_commands.load(Ordering::SeqCst)
    }

    pub fn handshake_cursor(&self) -> usize {
        self.handshake.lock().cursor()
    }

    pub fn packet_counter(&self) -> u64 {
        self.decoder.lock().packet_counter()
    }

    pub fn idle_state(&self) -> IdleState {
        self.decoder.lock().idle_state()
    }

    /// Quick-disconnect chord state. Acting on a long hold is left to the
    /// caller.
    pub fn disconnect_gesture(&self) -> GestureState {
        self.decoder.lock().gesture_state()
    }

    /// Battery level from the most recent report (`Full` before any report).
    pub fn battery_level(&self) -> BatteryLevel {
        BatteryLevel::from_u8(self.battery.load(Ordering::Relaxed))
    }

    /// Copy of the command buffer as it stands.
    pub fn command_buffer(&self) -> CommandBuffer {
        self.output.lock().scheduler.buffer().clone()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}
