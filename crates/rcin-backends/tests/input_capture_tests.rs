//! Integration tests for the per-pin input-capture decoder.

#![cfg(all(test, feature = "input-capture"))]

use rcin_backends::input_capture::default_config;
use rcin_backends::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;
type Decoder<'a> = InputCaptureDecoder<&'a SimulatedCounter, &'a SimulatedCaptureUnits>;

/// Latch `count` on `unit` and raise its capture interrupt.
fn capture(units: &SimulatedCaptureUnits, decoder: &Decoder<'_>, unit: u8, count: u32) {
    units.latch(unit, count);
    decoder.on_capture(unit);
}

#[test]
fn test_interleaved_units_measured_independently() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let units = SimulatedCaptureUnits::new();
    let mut decoder = InputCaptureDecoder::new(&counter, &units, default_config())?;
    decoder.initialize()?;

    capture(&units, &decoder, 0, 1_000);
    capture(&units, &decoder, 1, 1_500);
    capture(&units, &decoder, 0, 4_000);
    capture(&units, &decoder, 2, 4_200);
    capture(&units, &decoder, 1, 5_100);
    capture(&units, &decoder, 2, 6_200);

    assert_eq!(decoder.reading(0), ChannelReading::live(1_500));
    assert_eq!(decoder.reading(1), ChannelReading::live(1_800));
    assert_eq!(decoder.reading(2), ChannelReading::live(1_000));
    assert_eq!(decoder.reading(3), ChannelReading::initial(CENTER_US));
    Ok(())
}

#[test]
fn test_capture_window_excludes_900_and_2100() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let units = SimulatedCaptureUnits::new();
    let mut decoder = InputCaptureDecoder::new(&counter, &units, default_config())?;
    decoder.initialize()?;

    for (rise, fall) in [(0, 1_800), (10_000, 14_200)] {
        capture(&units, &decoder, 0, rise);
        capture(&units, &decoder, 0, fall);
    }
    assert!(decoder.is_stale(0));
    assert_eq!(decoder.stats().rejected_width, 2);

    capture(&units, &decoder, 0, 20_000);
    capture(&units, &decoder, 0, 21_802);
    assert_eq!(decoder.reading(0), ChannelReading::live(901));
    Ok(())
}

#[test]
fn test_silent_unit_times_out_on_overflow() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let units = SimulatedCaptureUnits::new();
    let mut decoder = InputCaptureDecoder::new(&counter, &units, default_config())?;
    decoder.initialize()?;

    for unit in 0..2 {
        capture(&units, &decoder, unit, 100);
        capture(&units, &decoder, unit, 3_100);
    }

    // Unit 0 keeps capturing between wraps, unit 1 goes quiet
    for _ in 0..2 {
        decoder.on_timer_overflow();
        capture(&units, &decoder, 0, 40_000);
        capture(&units, &decoder, 0, 43_000);
    }

    assert_eq!(decoder.reading(0), ChannelReading::live(1_500));
    assert_eq!(decoder.reading(1), ChannelReading::NO_SIGNAL);
    Ok(())
}

#[test]
fn test_capture_spanning_a_full_period_rejected() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let units = SimulatedCaptureUnits::new();
    let mut decoder = InputCaptureDecoder::new(&counter, &units, default_config())?;
    decoder.initialize()?;

    capture(&units, &decoder, 0, 100);
    capture(&units, &decoder, 0, 3_100);

    // Rise latched at 10000, one overflow, fall latched at 12000
    capture(&units, &decoder, 0, 10_000);
    decoder.on_timer_overflow();
    capture(&units, &decoder, 0, 12_000);

    assert_eq!(decoder.reading(0), ChannelReading::live(1_500));
    assert_eq!(decoder.stats().rejected_width, 1);

    // A pulse straddling the overflow is still measured
    capture(&units, &decoder, 0, 63_000);
    decoder.on_timer_overflow();
    capture(&units, &decoder, 0, 2_400);
    assert_eq!(decoder.reading(0), ChannelReading::live(1_700));

    // Exactly one period high: same count either side of the overflow
    capture(&units, &decoder, 0, 20_000);
    decoder.on_timer_overflow();
    capture(&units, &decoder, 0, 20_000);
    assert_eq!(decoder.reading(0), ChannelReading::live(1_700));
    assert_eq!(decoder.stats().rejected_width, 2);
    Ok(())
}

#[test]
fn test_missed_capture_resynchronizes() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let units = SimulatedCaptureUnits::new();
    let mut decoder = InputCaptureDecoder::new(&counter, &units, default_config())?;
    decoder.initialize()?;

    capture(&units, &decoder, 0, 1_000);
    // Fall lost: the unit stays armed for a fall and latches the next one,
    // a frame later
    capture(&units, &decoder, 0, 44_000);
    assert_eq!(decoder.stats().rejected_width, 1);
    assert_eq!(units.polarity(0), Edge::Rising);

    capture(&units, &decoder, 0, 50_000);
    capture(&units, &decoder, 0, 53_000);
    assert_eq!(decoder.reading(0), ChannelReading::live(1_500));
    Ok(())
}

#[test]
fn test_reinitialize_restores_center() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let units = SimulatedCaptureUnits::new();
    let mut decoder = InputCaptureDecoder::new(&counter, &units, default_config())?;
    decoder.initialize()?;

    capture(&units, &decoder, 5, 0);
    capture(&units, &decoder, 5, 2_400);
    assert_eq!(decoder.get_channel_value(5), 1_200);

    decoder.initialize()?;
    assert_eq!(decoder.reading(5), ChannelReading::initial(CENTER_US));
    assert_eq!(units.polarity(5), Edge::Rising);
    Ok(())
}

#[test]
fn test_unit_outside_hardware_rejected() -> TestResult {
    let counter = SimulatedCounter::avr_16bit();
    let units = SimulatedCaptureUnits::new();
    let config = ReceiverConfig::builder().pins(&[0, 8]).build()?;
    let result = InputCaptureDecoder::new(&counter, &units, config);
    assert!(matches!(
        result,
        Err(CaptureError::PinOutOfRange { pin: 8, .. })
    ));
    Ok(())
}
