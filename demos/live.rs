//! Interactive tour of the live display.
//!
//! ```text
//! cargo run --example live -- multi
//! RUST_LOG=live_progress=debug cargo run --example live -- all
//! ```

use std::{
    error::Error,
    io::{self, Read as _},
    thread,
    time::Duration,
};

use clap::{Parser, ValueEnum};
use live_progress::{
    Bar, BarColumn, Color, Columns, DescriptionColumn, EtaColumn, LiveProgress, PercentageColumn,
    ProgressIteratorExt as _, ProgressReader, Sink as _, Spinner, Style, TermSink,
    TransferSpeedColumn, spinner,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Demo {
    /// One bar rendered once, without the live engine.
    Static,
    /// A single bar filling up.
    Live,
    /// Three bars fed by three worker threads.
    Multi,
    /// Spinner styles finishing one after another.
    Spinner,
    /// Bytes read through a tracking reader, shown with transfer columns.
    File,
    /// Bars with custom glyphs and colors.
    Custom,
    /// Every demo in turn.
    All,
}

#[derive(Parser, Debug)]
#[command(about = "Live progress bars and spinners")]
struct Args {
    /// Which demo to run.
    #[arg(value_enum, default_value = "all")]
    demo: Demo,

    /// Milliseconds between repaints.
    #[arg(long, default_value_t = 100)]
    refresh_ms: u64,

    /// Erase the progress block when a demo finishes.
    #[arg(long)]
    transient: bool,
}

fn engine(args: &Args) -> LiveProgress {
    LiveProgress::builder()
        .refresh_interval(Duration::from_millis(args.refresh_ms))
        .transient(args.transient)
        .build(TermSink::stdout())
}

fn static_demo() {
    let sink = TermSink::stdout();
    let mut bar = Bar::new(100).with_description("Static");
    bar.set_position(42);
    println!("{}", bar.render(sink.width()).to_escape(sink.color_mode()));
}

fn live_demo(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut live = engine(args);
    let registry = live.registry().clone();
    let id = registry.add_bar("Processing", 100);

    live.start()?;
    for _ in 0..100 {
        registry.advance(id, 1);
        thread::sleep(Duration::from_millis(30));
    }
    registry.complete(id);
    live.stop()?;
    Ok(())
}

fn multi_demo(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut live = engine(args);
    let registry = live.registry().clone();

    live.start()?;
    let workers: Vec<_> = [("Download", 1000, 20, 10), ("Process", 500, 40, 5), ("Upload", 750, 25, 8)]
        .into_iter()
        .map(|(name, total, pause_ms, step)| {
            let registry = registry.clone();
            let id = registry.add_bar(name, total);
            thread::spawn(move || {
                for _ in (0..total).step_by(step) {
                    registry.advance(id, i64::try_from(step).unwrap_or(i64::MAX));
                    thread::sleep(Duration::from_millis(pause_ms));
                }
                registry.complete(id);
            })
        })
        .collect();

    for worker in workers {
        worker.join().map_err(|_| "worker panicked")?;
    }
    live.stop()?;
    Ok(())
}

fn spinner_demo(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut live = engine(args);
    let registry = live.registry().clone();
    let styles = [
        (spinner::DOTS, "Loading data...", Color::Cyan),
        (spinner::ARC, "Processing...", Color::Magenta),
        (spinner::CIRCLE, "Analyzing...", Color::Yellow),
    ];
    let ids: Vec<_> = styles
        .into_iter()
        .map(|(frames, description, color)| {
            registry.add_spinner_with(
                Spinner::new(frames.iter().copied())
                    .with_description(description)
                    .with_style(Style::new().fg(color)),
            )
        })
        .collect();

    live.start()?;
    for id in ids {
        thread::sleep(Duration::from_secs(2));
        registry.complete(id);
    }
    live.stop()?;
    Ok(())
}

fn file_demo(args: &Args) -> Result<(), Box<dyn Error>> {
    const SIZE: usize = 4 * 1024 * 1024;

    let mut live = engine(args);
    let registry = live.registry().clone();
    let columns = Columns::new(vec![
        Box::new(DescriptionColumn::new()),
        Box::new(BarColumn::new()),
        Box::new(PercentageColumn::new()),
        Box::new(TransferSpeedColumn::new()),
        Box::new(EtaColumn::new()),
    ]);
    let id = registry.add_with_columns(
        Bar::new(SIZE as u64).with_description("Upload"),
        columns,
    );

    live.start()?;
    let mut reader = ProgressReader::new(io::repeat(0).take(SIZE as u64), registry.clone(), id);
    let mut chunk = vec![0u8; 32 * 1024];
    while reader.read(&mut chunk)? > 0 {
        thread::sleep(Duration::from_millis(10));
    }
    registry.complete(id);
    live.stop()?;
    Ok(())
}

fn custom_demo(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut live = engine(args);
    let registry = live.registry().clone();
    let bars = [
        Bar::new(100)
            .with_description("Green")
            .with_complete_style(Style::new().fg(Color::Green)),
        Bar::new(100)
            .with_description("Hashes")
            .with_width(30)
            .with_complete_glyph("#")
            .with_remaining_glyph("-"),
        Bar::new(100)
            .with_description("Bold")
            .with_complete_style(Style::new().fg(Color::Rgb(255, 135, 0)).bold())
            .with_remaining_style(Style::new().dim()),
    ];
    let ids: Vec<_> = bars.into_iter().map(|bar| registry.add(bar)).collect();

    live.start()?;
    for step in (0..100).progress_in(&registry, "Steps") {
        for (offset, id) in (1..).zip(&ids) {
            registry.update(*id, (step + 1) * offset);
        }
        thread::sleep(Duration::from_millis(30));
    }
    live.stop()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let demos: &[Demo] = match args.demo {
        Demo::All => &[
            Demo::Static,
            Demo::Live,
            Demo::Multi,
            Demo::Spinner,
            Demo::File,
            Demo::Custom,
        ],
        ref single => std::slice::from_ref(single),
    };

    for demo in demos {
        println!("== {demo:?} ==");
        match demo {
            Demo::Static => static_demo(),
            Demo::Live => live_demo(&args)?,
            Demo::Multi => multi_demo(&args)?,
            Demo::Spinner => spinner_demo(&args)?,
            Demo::File => file_demo(&args)?,
            Demo::Custom => custom_demo(&args)?,
            Demo::All => {}
        }
    }
    Ok(())
}
