//! Unit tests for the timer service.

#![cfg(test)]

use rcin_timer::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

mod configuration {
    use super::*;

    #[test]
    fn test_init_selects_finest_prescaler() -> TestResult {
        let mut timer = TimerService::new(SimulatedCounter::avr_16bit());
        let setup = timer.init(2_000)?;
        assert_eq!(setup.prescaler, Prescaler::Div1);
        assert_eq!(timer.state().prescale_shift, 0);
        assert_eq!(timer.ticks_to_us(16), 1);
        Ok(())
    }

    #[test]
    fn test_init_clamps_infeasible_period() -> TestResult {
        let mut timer = TimerService::new(SimulatedCounter::avr_16bit());
        let setup = timer.init(u32::MAX)?;
        assert!(setup.clamped);
        assert_eq!(setup.prescaler, Prescaler::COARSEST);
        assert_eq!(timer.counter().top(), 65_535);
        // 16 MHz / 1024 = 15625 Hz -> 64 us per tick
        assert_eq!(timer.ticks_to_us(1), 64);
        Ok(())
    }

    #[test]
    fn test_init_rejects_zero_period() {
        let mut timer = TimerService::new(SimulatedCounter::avr_16bit());
        assert_eq!(timer.init(0), Err(TimerError::ZeroPeriod));
    }

    #[test]
    fn test_free_running_rejects_zero_clock() {
        let mut timer = TimerService::new(SimulatedCounter::new(0, 65_536));
        assert_eq!(
            timer.init_free_running(Prescaler::Div8),
            Err(TimerError::ZeroClock)
        );
    }

    #[test]
    fn test_free_running_rejects_prescaler_larger_than_clock() {
        let mut timer = TimerService::new(SimulatedCounter::new(512, 65_536));
        assert!(matches!(
            timer.init_free_running(Prescaler::Div1024),
            Err(TimerError::PrescalerTooLarge { divisor: 1024, .. })
        ));
    }

    #[test]
    fn test_reinit_stops_running_timer() -> TestResult {
        let mut timer = TimerService::new(SimulatedCounter::avr_16bit());
        timer.init_free_running(Prescaler::Div8)?;
        timer.start();
        assert!(timer.is_running());
        timer.init(10_000)?;
        assert!(!timer.is_running());
        assert!(!timer.counter().is_clock_enabled());
        Ok(())
    }
}

mod reads {
    use super::*;

    fn running_half_us_timer() -> Result<TimerService<SimulatedCounter>, TimerError> {
        let mut timer = TimerService::new(SimulatedCounter::avr_16bit());
        timer.init_free_running(Prescaler::Div8)?;
        timer.start();
        Ok(timer)
    }

    #[test]
    fn test_torn_and_safe_agree_without_skew() -> TestResult {
        let timer = running_half_us_timer()?;
        timer.counter().advance(12_345);
        assert_eq!(timer.read_now_torn(), 12_345);
        assert_eq!(timer.read_now_safe(), 12_345);
        Ok(())
    }

    #[test]
    fn test_safe_read_resolves_single_increment_race() -> TestResult {
        let timer = running_half_us_timer()?;
        timer.counter().advance(999);
        timer.counter().set_read_skew(1, 1);
        // First sample 999, counter ticks to 1000, second sample disagrees,
        // third agrees at 1000.
        assert_eq!(timer.read_now_safe(), 1_000);
        Ok(())
    }

    #[test]
    fn test_safe_read_nested_in_critical_section() -> TestResult {
        let timer = running_half_us_timer()?;
        timer.counter().advance(42);
        let value = critical_section::with(|_cs| timer.read_now_safe());
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_micros_conversion() -> TestResult {
        let timer = running_half_us_timer()?;
        timer.counter().advance(3_000);
        assert_eq!(timer.micros_torn(), 1_500);
        assert_eq!(timer.micros_safe(), 1_500);
        Ok(())
    }

    #[test]
    fn test_elapsed_through_service_wraps() -> TestResult {
        let timer = running_half_us_timer()?;
        assert_eq!(timer.elapsed_ticks(60_000, 2_000), 7_536);
        assert_eq!(timer.ticks_to_us(7_536), 3_768);
        Ok(())
    }

    #[test]
    fn test_overflow_count_reported_by_advance() -> TestResult {
        let timer = running_half_us_timer()?;
        let wraps = timer.counter().advance(65_536 * 3 + 10);
        assert_eq!(wraps, 3);
        assert_eq!(timer.read_now_torn(), 10);
        Ok(())
    }
}
