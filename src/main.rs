use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::Builder;
use jazelle::EventAssembler;
use log::LevelFilter;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(
    name = "jazelle",
    about = "A streaming decoder for SLD MiniDST (JAZELLE) event files.",
    author = "Yan <mindv0rtex@users.noreply.github.com>"
)]
struct Opt {
    /// Input JAZELLE file
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Output directory; defaults to the input file's own directory
    #[structopt(parse(from_os_str), short, long)]
    output: Option<PathBuf>,

    /// Output compression codec, threaded through to the external serializer
    #[structopt(short, long)]
    codec: Option<String>,

    /// Verbosity; repeat for more detail (-v info, -vv debug, -vvv trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Log progress every N events
    #[structopt(long)]
    progress_interval: Option<u64>,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new().filter_level(level).init();
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logger(opt.verbose);

    if let Some(codec) = &opt.codec {
        log::debug!("codec {codec} is accepted for the downstream serializer only");
    }
    if let Some(output) = &opt.output {
        log::debug!("output directory {} is accepted for the downstream serializer only", output.display());
    }

    let file = File::open(&opt.input)
        .with_context(|| format!("opening {}", opt.input.display()))?;
    let assembler =
        EventAssembler::new(file).with_context(|| format!("reading {}", opt.input.display()))?;

    let progress_interval = opt.progress_interval.unwrap_or(0);
    let mut count: u64 = 0;
    for event in assembler {
        let event = event.with_context(|| format!("decoding {}", opt.input.display()))?;
        count += 1;
        if progress_interval > 0 && count % progress_interval == 0 {
            log::info!("decoded {count} events (run {}, event {})", event.run, event.event);
        }
    }

    log::info!("decoded {count} events from {}", opt.input.display());
    Ok(())
}
