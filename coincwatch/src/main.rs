use anyhow::{Context, Result};
use coincwatch::driver::PipelineDriver;
use coincwatch::source::{FrameSource, MockSource, QuerySource, SampleSource};
use coincwatch::{timer, CliArgs, Event};
use coinctools::cfg::Monitor;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::time::{Duration, Instant};
use tracing::{info, warn};

fn main() -> Result<()> {
    let args: CliArgs = argh::from_env();

    if args.version {
        println!(
            concat!(env!("CARGO_BIN_NAME"), " {}"),
            env!("CARGO_PKG_VERSION"),
        );
        return Ok(());
    }

    tracing_subscriber::fmt::init();

    let config: Monitor = match &args.config {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("opening config {}", path))?;
            serde_json::from_reader(BufReader::new(f)).context("parsing config")?
        }
        None => Monitor::default(),
    };

    // CLI flags override the config file
    let source: Box<dyn SampleSource> = if args.mock || config.mock == Some(true) {
        info!("using synthetic data");
        Box::new(MockSource::new())
    } else {
        let port = args
            .port
            .as_deref()
            .context("no --port given; pass --mock to run without a device")?;
        if args.query {
            info!(port, "polling samples over the text protocol");
            let handle = OpenOptions::new()
                .read(true)
                .write(true)
                .open(port)
                .with_context(|| format!("opening {}", port))?;
            Box::new(QuerySource::new(handle))
        } else {
            info!(port, "reading framed samples");
            Box::new(FrameSource::new(
                File::open(port).with_context(|| format!("opening {}", port))?,
            ))
        }
    };

    let start = Instant::now();
    let mut driver = PipelineDriver::new(source, config.window_capacity(), start);

    // A capture requested up front starts with the run
    if let Some((path, limit)) = args.capture_request(&config) {
        driver.start_capture(path, limit, start)?;
    }

    let (tx_event, rx_event) = flume::unbounded();
    timer::main(tx_event, Duration::from_millis(args.tick_rate))?;

    let run_limit = args.limit.map(Duration::from_secs);
    while let Ok(Event::Tick) = rx_event.recv() {
        match driver.tick(Instant::now()) {
            Ok(Some(snap)) => {
                let s = snap.stats;
                match snap.correlation {
                    Some(c) => info!(
                        "A {:.0}±{:.0}  B {:.0}±{:.0}  AB {:.0}±{:.0}  AB' {:.0}±{:.0}  ABB' {:.1}±{:.1}  g2 {:.2}±{:.3} ({:.2}σ below 1)",
                        s.a.mean, s.a.dev, s.b.mean, s.b.dev, s.ab.mean, s.ab.dev,
                        s.abp.mean, s.abp.dev, s.abbp.mean, s.abbp.dev,
                        c.g2, c.g2_dev, c.sigma_below_one,
                    ),
                    None => info!(
                        "A {:.0}±{:.0}  B {:.0}±{:.0}  AB {:.0}±{:.0}  AB' {:.0}±{:.0}  ABB' {:.1}±{:.1}  g2 n/a",
                        s.a.mean, s.a.dev, s.b.mean, s.b.dev, s.ab.mean, s.ab.dev,
                        s.abp.mean, s.abp.dev, s.abbp.mean, s.abbp.dev,
                    ),
                }
            }
            Ok(None) => {}
            Err(e) => warn!("tick failed: {:#}", e),
        }
        if let Some(d) = run_limit {
            if start.elapsed() > d {
                break;
            }
        }
    }

    Ok(())
}
