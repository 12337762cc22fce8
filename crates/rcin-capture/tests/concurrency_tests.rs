//! Concurrency tests for the shared snapshot and capture engine.
//!
//! On the host, `critical_section::with` is a process-wide lock, so threads
//! stand in for an interrupt handler preempting the main loop.

#![cfg(test)]

use std::sync::Arc;
use std::thread;

use rcin_capture::prelude::*;
use rcin_timer::TimerState;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn half_us() -> TimerState {
    TimerState {
        count_resolution: 65_536,
        prescale_shift: 3,
        input_clock_hz: 16_000_000,
        running: true,
    }
}

#[test]
fn test_reader_never_sees_mixed_reading() -> TestResult {
    let snapshot = Arc::new(ChannelSnapshot::new(1, NO_SIGNAL_US));
    let old = ChannelReading::live(1_000);
    let new = ChannelReading::initial(NO_SIGNAL_US);

    let writer = {
        let snapshot = Arc::clone(&snapshot);
        thread::spawn(move || {
            for i in 0..10_000 {
                let reading = if i % 2 == 0 { old } else { new };
                snapshot.publish(0, reading);
            }
        })
    };

    let reader = {
        let snapshot = Arc::clone(&snapshot);
        thread::spawn(move || {
            let mut mixed = 0u32;
            for _ in 0..10_000 {
                let reading = snapshot.read(0);
                if reading != old && reading != new {
                    mixed += 1;
                }
            }
            mixed
        })
    };

    writer.join().map_err(|_| "writer thread panicked")?;
    let mixed = reader.join().map_err(|_| "reader thread panicked")?;
    assert_eq!(mixed, 0, "Reader observed a torn reading");
    Ok(())
}

#[test]
fn test_concurrent_channels_are_isolated() -> TestResult {
    let config = ReceiverConfig::builder().pins(&[0, 1, 2, 3]).build()?;
    let engine = Arc::new(CaptureEngine::new(&config));
    let mut handles = vec![];

    for channel in 0..4usize {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let timer = half_us();
            // Channel n produces 1000 + 100 n us pulses
            let width_ticks = 2_000 + 200 * u32::try_from(channel).unwrap_or(0);
            for frame in 0..500u32 {
                let rise = (frame * 40_000) % 65_536;
                critical_section::with(|cs| {
                    engine.on_edge(cs, channel, Edge::Rising, rise, &timer);
                    let fall = (rise + width_ticks) % 65_536;
                    engine.on_edge(cs, channel, Edge::Falling, fall, &timer);
                });
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| "capture thread panicked")?;
    }

    for channel in 0..4u16 {
        let reading = engine.reading(usize::from(channel));
        assert_eq!(reading, ChannelReading::live(1_000 + 100 * channel));
    }
    let stats = engine.stats();
    assert_eq!(stats.accepted, 2_000);
    assert_eq!(stats.edges, 4_000);
    Ok(())
}

#[test]
fn test_timer_wraps_race_with_edges() -> TestResult {
    let config = ReceiverConfig::builder()
        .pins(&[0, 1])
        .timeout_wraps(1)
        .build()?;
    let engine = Arc::new(CaptureEngine::new(&config));

    let wrapper = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..1_000 {
                critical_section::with(|cs| engine.on_timer_wrap(cs));
            }
        })
    };

    let capturer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            let timer = half_us();
            for _ in 0..1_000 {
                critical_section::with(|cs| {
                    engine.on_edge(cs, 0, Edge::Rising, 0, &timer);
                    engine.on_edge(cs, 0, Edge::Falling, 3_000, &timer);
                });
            }
        })
    };

    wrapper.join().map_err(|_| "wrap thread panicked")?;
    capturer.join().map_err(|_| "capture thread panicked")?;

    // Every reading is either the last accepted pulse or the dead sentinel
    let reading = engine.reading(0);
    assert!(
        reading == ChannelReading::live(1_500) || reading == ChannelReading::NO_SIGNAL
    );
    assert_eq!(engine.reading(1), ChannelReading::NO_SIGNAL);
    Ok(())
}
