//! nexgauge - Dashboard Gauge Firmware
//!
//! Main firmware binary for RP2040-based gauge controllers. Counts engine
//! and wheel pulses, reads a DS18B20 coolant probe, and writes the values
//! to a serial touchscreen display.
//!
//! Edge counting runs on a high-priority interrupt executor. Sampling is a
//! blocking loop on the thread executor that owns the 1-wire bus and the
//! display UART.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, SendSpawner, SpawnError, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use nexgauge_core::config::{GaugeConfig, PinConfig, TemperatureTaskConfig};
use nexgauge_core::pulse::PulseCounter;
use nexgauge_core::scheduler::{PollReport, Sample, SampleContext, SampleScheduler, StopSignal};
use nexgauge_drivers::onewire::{OneWire, OneWireError};
use nexgauge_drivers::sensor::{Ds18b20, Resolution};
use nexgauge_hal::{MonotonicClock, UartConfig};
use nexgauge_hal_rp2040::pins::check_display_pins;
use nexgauge_hal_rp2040::{DisplayUart, EmbassyClock, OpenDrainPin, PinBank, PinError, PulseInput};

mod config;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit gauge.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../gauge.toml");

// Edge counters shared between the pulse tasks and the sampler
static RPM_PULSES: PulseCounter = PulseCounter::new();
static SPEED_PULSES: PulseCounter = PulseCounter::new();

/// Raised to end the sampling loop
static STOP: StopSignal = StopSignal::new();

/// Runs the pulse tasks above the blocking sampler
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// DS18B20 on a bit-banged bus
type Probe = Ds18b20<OneWire<OpenDrainPin<'static>, Delay>, Delay>;

/// Hardware setup failures
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum SetupError {
    Pin(PinError),
    OneWire(OneWireError),
    Spawn(SpawnError),
}

impl From<PinError> for SetupError {
    fn from(e: PinError) -> Self {
        SetupError::Pin(e)
    }
}

impl From<OneWireError> for SetupError {
    fn from(e: OneWireError) -> Self {
        SetupError::OneWire(e)
    }
}

impl From<SpawnError> for SetupError {
    fn from(e: SpawnError) -> Self {
        SetupError::Spawn(e)
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("nexgauge firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load(EMBEDDED_CONFIG);
    config::log_summary(&config);

    if let Err(e) = check_display_pins(config.display.tx_pin, config.display.rx_pin) {
        error!("Display must be wired to gpio0/gpio1: {}", e);
        halt().await;
    }

    let (display_peripherals, mut pins) = PinBank::split(p);
    let uart_config = UartConfig::with_baudrate(config.display.baudrate);
    let uart = DisplayUart::new(display_peripherals, &uart_config);
    info!("Display UART initialized");

    // Edge interrupts wake tasks on this executor
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);

    let (rpm_counter, speed_counter, probe) = match setup_sensors(&config, &mut pins, spawner) {
        Ok(sensors) => sensors,
        Err(e) => {
            error!("Sensor setup failed: {}", e);
            halt().await
        }
    };

    let clock = EmbassyClock;
    let ctx = SampleContext {
        rpm_counter,
        speed_counter,
        probe,
        display: uart,
    };

    let mut scheduler = match SampleScheduler::new(&config, ctx, clock.now_ms()) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Sampler rejected configuration: {}", e);
            halt().await
        }
    };

    if let Err(e) = scheduler.start() {
        warn!("Banner write failed: {}", e);
    }

    info!("Sampling started");
    scheduler.run(&clock, &STOP, log_report);

    info!("Sampling stopped after {} commands", scheduler.display().sent());
    halt().await
}

/// Claim sensor pins, start the pulse tasks and open the probe
fn setup_sensors(
    config: &GaugeConfig,
    pins: &mut PinBank,
    spawner: SendSpawner,
) -> Result<
    (
        Option<&'static PulseCounter>,
        Option<&'static PulseCounter>,
        Option<Probe>,
    ),
    SetupError,
> {
    let rpm_counter = match &config.rpm {
        Some(rpm) => Some(start_pulse_input(
            spawner,
            pins,
            &rpm.pin,
            &RPM_PULSES,
            "rpm",
        )?),
        None => None,
    };

    let speed_counter = match &config.speed {
        Some(speed) => Some(start_pulse_input(
            spawner,
            pins,
            &speed.pin,
            &SPEED_PULSES,
            "speed",
        )?),
        None => None,
    };

    let probe = match &config.temperature {
        Some(temp) => Some(open_probe(pins, temp)?),
        None => None,
    };

    Ok((rpm_counter, speed_counter, probe))
}

fn start_pulse_input(
    spawner: SendSpawner,
    pins: &mut PinBank,
    pin: &PinConfig,
    counter: &'static PulseCounter,
    name: &'static str,
) -> Result<&'static PulseCounter, SetupError> {
    let input = PulseInput::new(pins.take(pin.pin)?, pin);
    spawner.spawn(tasks::pulse_task(input, counter, name))?;
    Ok(counter)
}

/// Bring up the 1-wire bus and configure every DS18B20 on it
///
/// An empty or faulty bus is not fatal; the display shows the sensor as
/// disconnected until it answers.
fn open_probe(pins: &mut PinBank, config: &TemperatureTaskConfig) -> Result<Probe, SetupError> {
    let line = OpenDrainPin::new(pins.take(config.pin.pin)?, config.pin.pull_up);
    let bus = OneWire::new(line, Delay)?;
    let resolution = Resolution::from_bits(config.resolution_bits).unwrap_or_default();
    let mut probe = Ds18b20::new(bus, Delay, resolution);

    match probe.scan() {
        Ok(0) => warn!("No DS18B20 on gpio{}", config.pin.pin),
        Ok(n) => info!("Found {} DS18B20 on gpio{}", n, config.pin.pin),
        Err(e) => warn!("1-wire search failed: {}", e),
    }

    match probe.configure() {
        Ok(()) => info!("DS18B20 resolution set to {}", resolution),
        Err(e) => warn!("DS18B20 configure failed: {}", e),
    }

    Ok(probe)
}

fn log_report(report: &PollReport) {
    for fired in report.iter() {
        match &fired.sample {
            Sample::Rpm { pulses, rpm } => {
                debug!("rpm: {} pulses in {}ms = {}", pulses, fired.elapsed_ms, rpm)
            }
            Sample::Temperature(reading) => match reading.celsius() {
                Some(celsius) => debug!("temperature: {}°C", celsius),
                None => warn!("temperature: sensor disconnected"),
            },
            Sample::Speed { pulses, kmh } => {
                debug!("speed: {} pulses in {}ms = {}km/h", pulses, fired.elapsed_ms, kmh)
            }
        }

        if let Err(e) = &fired.link {
            warn!("{}: display write failed: {}", fired.kind.name(), e);
        }
    }
}

async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
