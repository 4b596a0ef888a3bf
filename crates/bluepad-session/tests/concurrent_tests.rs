//! Concurrency tests: coalescing while a send is in flight, try-lock tick
//! skipping, and mixed producers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use bluepad_hid_ds4_protocol::output::offsets;
use bluepad_session::prelude::*;
use bluepad_session::transport::mock::{RecordingSink, RecordingTransport};

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Transport that parks the first armed interrupt send until released.
#[derive(Clone)]
struct GatedTransport {
    inner: RecordingTransport,
    armed: Arc<AtomicBool>,
    gate: Arc<Barrier>,
}

impl GatedTransport {
    fn new() -> Self {
        Self {
            inner: RecordingTransport::new(),
            armed: Arc::new(AtomicBool::new(false)),
            gate: Arc::new(Barrier::new(2)),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl Transport for GatedTransport {
    fn send_command(
        &self,
        handle: DeviceHandle,
        channel: Channel,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let result = self.inner.send_command(handle, channel, payload);
        if channel == Channel::HidInterrupt && self.armed.swap(false, Ordering::SeqCst) {
            self.gate.wait(); // in flight
            self.gate.wait(); // released
        }
        result
    }
}

/// Config source that parks the first armed read until released.
#[derive(Clone)]
struct GatedConfig {
    config: SessionConfig,
    armed: Arc<AtomicBool>,
    gate: Arc<Barrier>,
}

impl ConfigSource for GatedConfig {
    fn current(&self) -> SessionConfig {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.gate.wait();
            self.gate.wait();
        }
        self.config
    }
}

fn join(handle: thread::JoinHandle<()>) -> TestResult {
    handle.join().map_err(|_| "worker thread panicked")?;
    Ok(())
}

#[test]
fn test_rumbles_during_send_coalesce_into_one() -> TestResult {
    let transport = GatedTransport::new();
    let session = Arc::new(Ds4Session::new(
        DeviceHandle(1),
        transport.clone(),
        SessionConfig::default(),
        RecordingSink::new(),
    ));
    let t0 = Instant::now();
    session.start_at(t0);
    session.tick_at(t0);
    let baseline = transport.inner.count_on(Channel::HidInterrupt);

    transport.arm();
    let worker = {
        let session = Arc::clone(&session);
        thread::spawn(move || session.rumble_at(0x10, 0x10, t0))
    };
    transport.gate.wait();

    // The first send is parked inside the transport with the lock released.
    for level in [0x20, 0x30, 0x40, 0x50] {
        session.rumble_at(level, level, t0);
    }
    session.tick_at(t0);
    assert_eq!(transport.inner.count_on(Channel::HidInterrupt), baseline + 1);
    assert_eq!(session.stats().coalesced_writes, 4);

    transport.gate.wait();
    join(worker)?;

    session.tick_at(t0);
    let sent = transport.inner.payloads_on(Channel::HidInterrupt);
    assert_eq!(sent.len(), baseline + 2, "one flush for four coalesced writes");
    let flushed = sent.last().ok_or("nothing flushed")?;
    assert_eq!(flushed[offsets::RUMBLE_LARGE], 0x50);
    assert_eq!(flushed[offsets::RUMBLE_SMALL], 0x50);

    session.tick_at(t0);
    assert_eq!(transport.inner.count_on(Channel::HidInterrupt), baseline + 2);
    Ok(())
}

#[test]
fn test_tick_skips_while_rumble_holds_lock() -> TestResult {
    let transport = RecordingTransport::new();
    let config = GatedConfig {
        config: SessionConfig::default(),
        armed: Arc::new(AtomicBool::new(false)),
        gate: Arc::new(Barrier::new(2)),
    };
    let session = Arc::new(Ds4Session::new(
        DeviceHandle(2),
        transport.clone(),
        config.clone(),
        RecordingSink::new(),
    ));
    let t0 = Instant::now();
    session.start_at(t0);
    let baseline = transport.count_on(Channel::HidInterrupt);

    config.armed.store(true, Ordering::SeqCst);
    let worker = {
        let session = Arc::clone(&session);
        thread::spawn(move || session.rumble_at(0x33, 0x11, t0))
    };
    config.gate.wait();

    session.tick_at(t0);
    assert_eq!(session.stats().ticks_skipped, 1);
    assert_eq!(transport.count_on(Channel::HidInterrupt), baseline);

    config.gate.wait();
    join(worker)?;

    assert_eq!(transport.count_on(Channel::HidInterrupt), baseline + 1);
    assert_eq!(session.command_buffer().rumble(), (0x33, 0x11));
    Ok(())
}

#[test]
fn test_concurrent_producers_converge() -> TestResult {
    let transport = RecordingTransport::new();
    let session = Arc::new(Ds4Session::new(
        DeviceHandle(3),
        transport.clone(),
        SessionConfig::default(),
        RecordingSink::new(),
    ));
    session.start();

    let stop = Arc::new(AtomicBool::new(false));
    let ticker = {
        let session = Arc::clone(&session);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                session.tick();
                thread::sleep(Duration::from_micros(200));
            }
        })
    };

    let mut producers = Vec::new();
    for id in 0..4u8 {
        let session = Arc::clone(&session);
        producers.push(thread::spawn(move || {
            for step in 0..50u8 {
                session.rumble(id.wrapping_mul(50).wrapping_add(step), step);
            }
        }));
    }
    for producer in producers {
        join(producer)?;
    }
    stop.store(true, Ordering::SeqCst);
    join(ticker)?;

    // Whatever is still pending goes out on the next tick.
    session.tick();
    let sent = transport.payloads_on(Channel::HidInterrupt);
    let last = sent.last().ok_or("nothing sent")?;
    let (large, small) = session.command_buffer().rumble();
    assert_eq!(last[offsets::RUMBLE_LARGE], large);
    assert_eq!(last[offsets::RUMBLE_SMALL], small);

    let stats = session.stats();
    assert_eq!(usize::try_from(stats.commands_sent)?, sent.len());
    assert_eq!(stats.transport_errors, 0);
    Ok(())
}

#[test]
fn test_input_and_output_paths_are_independent() -> TestResult {
    let transport = RecordingTransport::new();
    let sink = RecordingSink::new();
    let session = Arc::new(Ds4Session::new(
        DeviceHandle(4),
        transport,
        SessionConfig::default(),
        sink.clone(),
    ));
    session.start();

    let reader = {
        let session = Arc::clone(&session);
        thread::spawn(move || {
            let raw = bluepad_hid_ds4_protocol::input::neutral_raw_report();
            for _ in 0..100 {
                if session.handle_input_report(&raw).is_err() {
                    return;
                }
            }
        })
    };
    for step in 0..100u8 {
        session.rumble(step, step);
        session.tick();
    }
    join(reader)?;

    assert_eq!(sink.len(), 100);
    assert_eq!(session.packet_counter(), 100);
    Ok(())
}
