//! Integration tests for the round-robin time-division decoder.

#![cfg(all(test, feature = "time-division"))]

use rcin_backends::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;
type Decoder<'a> = TimeDivisionDecoder<&'a SimulatedCounter, &'a SimulatedPinInterrupts>;

/// Deliver `edge` on `pin` only if the hardware has it attached.
fn fire(pins: &SimulatedPinInterrupts, decoder: &Decoder<'_>, pin: u8, edge: Edge) -> bool {
    if pins.attached(pin) == Some(edge) {
        decoder.on_pin_edge(pin, edge);
        true
    } else {
        false
    }
}

fn elapse(counter: &SimulatedCounter, decoder: &Decoder<'_>, ticks: u32) {
    for _ in 0..counter.advance(ticks) {
        decoder.on_timer_overflow();
    }
}

fn pulse(
    counter: &SimulatedCounter,
    pins: &SimulatedPinInterrupts,
    decoder: &Decoder<'_>,
    pin: u8,
    width_us: u32,
) {
    fire(pins, decoder, pin, Edge::Rising);
    elapse(counter, decoder, width_us * 2);
    fire(pins, decoder, pin, Edge::Falling);
}

#[test]
fn test_rotation_measures_each_channel() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let pins = SimulatedPinInterrupts::new();
    let config = ReceiverConfig::builder().pins(&[2, 3, 4]).build()?;
    let mut decoder = TimeDivisionDecoder::new(&counter, &pins, config)?;
    decoder.initialize()?;

    for (pin, width) in [(2, 1_100), (3, 1_500), (4, 1_900)] {
        elapse(&counter, &decoder, 1_000);
        pulse(&counter, &pins, &decoder, pin, width);
    }

    assert_eq!(decoder.get_channel_value(0), 1_100);
    assert_eq!(decoder.get_channel_value(1), 1_500);
    assert_eq!(decoder.get_channel_value(2), 1_900);
    assert_eq!(decoder.active_channel(), 0);
    assert_eq!(pins.attached(2), Some(Edge::Rising));
    assert_eq!(pins.attached_pins().count(), 1);
    Ok(())
}

#[test]
fn test_only_active_pin_is_serviced() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let pins = SimulatedPinInterrupts::new();
    let config = ReceiverConfig::builder().pins(&[2, 3]).build()?;
    let mut decoder = TimeDivisionDecoder::new(&counter, &pins, config)?;
    decoder.initialize()?;

    // Channel 1's pin is detached, and a stray call is ignored too
    assert!(!fire(&pins, &decoder, 3, Edge::Rising));
    decoder.on_pin_edge(3, Edge::Rising);
    assert_eq!(decoder.stats().edges, 0);
    assert_eq!(decoder.active_channel(), 0);
    Ok(())
}

#[test]
fn test_silent_channel_times_out_and_rotation_continues() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let pins = SimulatedPinInterrupts::new();
    let config = ReceiverConfig::builder().pins(&[2, 3]).build()?;
    let mut decoder = TimeDivisionDecoder::new(&counter, &pins, config)?;
    decoder.initialize()?;

    pulse(&counter, &pins, &decoder, 2, 1_200);
    pulse(&counter, &pins, &decoder, 3, 1_600);
    assert_eq!(decoder.reading(1), ChannelReading::live(1_600));

    // Channel 1 stops producing pulses
    pulse(&counter, &pins, &decoder, 2, 1_200);
    assert_eq!(decoder.active_channel(), 1);
    elapse(&counter, &decoder, 65_536);

    assert_eq!(decoder.reading(1), ChannelReading::NO_SIGNAL);
    assert_eq!(decoder.reading(0), ChannelReading::live(1_200));
    assert_eq!(decoder.active_channel(), 0);
    assert_eq!(pins.attached(2), Some(Edge::Rising));
    assert_eq!(pins.attached(3), None);
    assert_eq!(decoder.stats().timeouts, 1);
    Ok(())
}

#[test]
fn test_stuck_high_channel_released_after_period() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let pins = SimulatedPinInterrupts::new();
    let config = ReceiverConfig::builder().pins(&[2, 3]).build()?;
    let mut decoder = TimeDivisionDecoder::new(&counter, &pins, config)?;
    decoder.initialize()?;

    // Rise seen, fall never comes
    assert!(fire(&pins, &decoder, 2, Edge::Rising));
    assert_eq!(pins.attached(2), Some(Edge::Falling));
    elapse(&counter, &decoder, 65_536);

    assert_eq!(decoder.active_channel(), 1);
    assert_eq!(pins.attached(2), None);
    assert_eq!(pins.attached(3), Some(Edge::Rising));

    // Channel 1 still gets its turn
    pulse(&counter, &pins, &decoder, 3, 1_500);
    assert_eq!(decoder.reading(1), ChannelReading::live(1_500));
    assert!(decoder.is_stale(0));
    Ok(())
}

#[test]
fn test_implausible_pulse_still_advances() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let pins = SimulatedPinInterrupts::new();
    let config = ReceiverConfig::builder().pins(&[2, 3]).build()?;
    let mut decoder = TimeDivisionDecoder::new(&counter, &pins, config)?;
    decoder.initialize()?;

    pulse(&counter, &pins, &decoder, 2, 1_500);
    pulse(&counter, &pins, &decoder, 3, 1_500);
    pulse(&counter, &pins, &decoder, 2, 4_000);

    assert_eq!(decoder.reading(0), ChannelReading::live(1_500));
    assert_eq!(decoder.active_channel(), 1);
    assert_eq!(decoder.stats().rejected_width, 1);
    Ok(())
}

#[test]
fn test_duplicate_rise_resynchronizes() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let pins = SimulatedPinInterrupts::new();
    let config = ReceiverConfig::builder().pins(&[2]).build()?;
    let mut decoder = TimeDivisionDecoder::new(&counter, &pins, config)?;
    decoder.initialize()?;

    decoder.on_pin_edge(2, Edge::Rising);
    decoder.on_pin_edge(2, Edge::Rising);
    assert_eq!(decoder.stats().sequence_anomalies, 1);

    // The fall that follows is out of order too and hands the turn on
    elapse(&counter, &decoder, 3_000);
    decoder.on_pin_edge(2, Edge::Falling);
    assert_eq!(decoder.stats().sequence_anomalies, 2);
    assert_eq!(pins.attached(2), Some(Edge::Rising));

    pulse(&counter, &pins, &decoder, 2, 1_300);
    assert_eq!(decoder.reading(0), ChannelReading::live(1_300));
    Ok(())
}
