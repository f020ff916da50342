//! Button-driven LED controller on simulated hardware
//!
//! Wires the pieces together the way a board would: one event pool, the LED
//! active object and the button service. The user button is a [`SimButton`]
//! scripted from the command line, so a run is a sequence of presses of given
//! lengths followed by a report of what the LEDs did.
//!
//! ```text
//! blinky --press 500 --press 3000 --press 9000
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ao::{ActiveObject, ActiveObjectConfig};
use clap::{Parser, ValueEnum};
use hal::sim::{SimButton, SimLeds};
use hal::{Led, LedStatus};
use log::{error, info};
use mempool::PoolStats;
use svc::{
    ButtonService, ButtonServiceConfig, DebounceConfig, EmitPolicy, EmitStats, LedEmitter,
    LedPool, LedResponder,
};

/// Pool sizes this binary is built for.
const POOL_SIZES: [usize; 7] = [1, 2, 4, 8, 10, 16, 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Block until the LED queue has room.
    Drop,
    /// Give up after --send-timeout-ms.
    Backpressure,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Button-driven LED controller on simulated hardware")]
struct Opts {
    /// Event blocks in the pool
    #[arg(long, default_value_t = 10, value_name = "N")]
    pool_blocks: usize,

    /// Capacity of the LED active object's queue
    #[arg(long, default_value_t = ao::DEFAULT_QUEUE_CAPACITY, value_name = "N")]
    queue_capacity: usize,

    /// Debounce period
    #[arg(long, default_value_t = 40, value_name = "MS")]
    debounce_ms: u32,

    /// Sampling period of the button worker
    #[arg(long, default_value_t = 1, value_name = "MS")]
    tick_ms: u32,

    /// What to do when the LED queue is full
    #[arg(long, value_enum, default_value_t = Policy::Drop)]
    policy: Policy,

    /// Send timeout under the backpressure policy
    #[arg(long, default_value_t = 100, value_name = "MS")]
    send_timeout_ms: u64,

    /// Hold the button for this long; repeat for a sequence of presses
    #[arg(long = "press", value_name = "MS")]
    presses: Vec<u64>,

    /// Released time after each press
    #[arg(long, default_value_t = 250, value_name = "MS")]
    gap_ms: u64,

    /// Enable debug messages
    #[arg(short, long)]
    verbose: bool,
}

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    pool_blocks: usize,
    led: ActiveObjectConfig,
    button: ButtonServiceConfig,
    policy: EmitPolicy,
    presses: Vec<Duration>,
    gap: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pool_blocks: 10,
            led: ActiveObjectConfig::named("led"),
            button: ButtonServiceConfig::default(),
            policy: EmitPolicy::Drop,
            presses: [500, 3000, 9000].map(Duration::from_millis).to_vec(),
            gap: Duration::from_millis(250),
        }
    }
}

impl AppConfig {
    fn from_opts(opts: &Opts) -> Result<Self> {
        let defaults = Self::default();

        if !POOL_SIZES.contains(&opts.pool_blocks) {
            bail!(
                "unsupported pool size {} (supported: {:?})",
                opts.pool_blocks,
                POOL_SIZES
            );
        }

        let debounce = DebounceConfig::builder()
            .tick_ms(opts.tick_ms)
            .debounce_ms(opts.debounce_ms)
            .build()
            .context("invalid debounce settings")?;

        let policy = match opts.policy {
            Policy::Drop => EmitPolicy::Drop,
            Policy::Backpressure => EmitPolicy::Backpressure {
                timeout: Duration::from_millis(opts.send_timeout_ms),
            },
        };

        let presses = if opts.presses.is_empty() {
            defaults.presses
        } else {
            opts.presses.iter().copied().map(Duration::from_millis).collect()
        };

        Ok(Self {
            pool_blocks: opts.pool_blocks,
            led: ActiveObjectConfig::builder()
                .name("led")
                .queue_capacity(opts.queue_capacity)
                .build(),
            button: ButtonServiceConfig {
                debounce,
                ..defaults.button
            },
            policy,
            presses,
            gap: Duration::from_millis(opts.gap_ms),
        })
    }
}

/// What the run left behind.
struct Report {
    history: Vec<(Led, LedStatus)>,
    leds: [LedStatus; Led::COUNT],
    pool: PoolStats,
    emit: EmitStats,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if opts.verbose {
        builder.filter(None, log::LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter(None, log::LevelFilter::Info);
    }
    builder.init();

    let config = AppConfig::from_opts(&opts)?;
    info!(
        "starting: {} pool blocks, queue capacity {}, {:?}",
        config.pool_blocks, config.led.queue_capacity, config.policy
    );

    let report = match config.pool_blocks {
        1 => run::<1>(&config),
        2 => run::<2>(&config),
        4 => run::<4>(&config),
        8 => run::<8>(&config),
        10 => run::<10>(&config),
        16 => run::<16>(&config),
        32 => run::<32>(&config),
        other => bail!("unsupported pool size {other}"),
    }?;

    print_report(&report);
    Ok(())
}

fn run<const N: usize>(config: &AppConfig) -> Result<Report> {
    let pool = LedPool::<N>::shared();
    let leds = SimLeds::new();
    let button = SimButton::default();

    let led_ao = ActiveObject::start(
        config.led,
        LedResponder::new(leds.clone(), Arc::clone(&pool)),
    )
    .inspect_err(|err| error!("cannot start LED active object: {err}"))
    .context("LED active object")?;

    let emitter = LedEmitter::new(Arc::clone(&pool), led_ao.sender(), config.policy);
    let worker = ButtonService::new(config.button, button.clone(), emitter)?
        .spawn()
        .inspect_err(|err| error!("cannot start button service: {err}"))
        .context("button service")?;

    for (n, hold) in config.presses.iter().enumerate() {
        info!("press {}: holding for {:?}", n + 1, hold);
        button.press();
        thread::sleep(*hold);
        button.release();
        thread::sleep(config.gap);
    }

    let service = worker.stop()?;
    let emit = service.stats();
    drop(service);
    led_ao.join()?;

    Ok(Report {
        history: leds.history(),
        leds: Led::ALL.map(|led| leds.status(led)),
        pool: pool.stats(),
        emit,
    })
}

fn print_report(report: &Report) {
    println!("LED history:");
    if report.history.is_empty() {
        println!("  (none)");
    }
    for (n, (led, status)) in report.history.iter().enumerate() {
        println!("  {:>3}. {:<5} {:?}", n + 1, led, status);
    }

    println!("Final LED state:");
    for (led, status) in Led::ALL.iter().zip(report.leds) {
        println!("  {:<5} {:?}", led, status);
    }

    let pool = &report.pool;
    println!(
        "Pool: {} blocks, {} free, low water mark {} ({}% peak use)",
        pool.total_blocks,
        pool.free_blocks,
        pool.min_free_blocks,
        pool.peak_utilization()
    );
    let emit = &report.emit;
    println!(
        "Events: {} sent, {} dropped (pool exhausted), {} dropped (send failed)",
        emit.sent, emit.dropped_no_block, emit.dropped_send_failed
    );
}
