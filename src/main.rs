use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use engine::prelude::*;

mod logging;
mod map_view;
mod script;

#[derive(Parser, Debug)]
#[command(about = "Run a scripted session on a text map floor")]
struct Args {
    /// Text map of the floor to play on.
    #[arg(long)]
    map: PathBuf,

    /// IDM file with option overrides.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Command script to feed the player.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Give up after this many world ticks.
    #[arg(long, default_value_t = 100_000)]
    ticks: usize,

    /// Show debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let layout = Floor::parse(&read(&args.map)?)
        .with_context(|| format!("bad map {}", args.map.display()))?;

    let options = match &args.options {
        Some(path) => Options::parse(&read(path)?)
            .with_context(|| format!("bad options {}", path.display()))?,
        None => Default::default(),
    };

    let mut input = match &args.script {
        Some(path) => script::parse(&read(path)?)?,
        None => VecDeque::new(),
    };
    log::info!("loaded {} script commands", input.len());

    let mut r = Runtime::new(layout, options);
    report(&mut r);

    loop {
        let spent = r.now().ticks() as usize;
        if spent >= args.ticks {
            log::warn!("tick limit {} reached", args.ticks);
            break;
        }

        let phase = r.run_ticks(&mut input, args.ticks - spent);
        report(&mut r);

        match phase {
            Phase::Interrupted => log::info!("interrupted at {:?}", r.now()),
            Phase::Terminated => {
                log::info!("session over at {:?}", r.now());
                break;
            }
            Phase::Ready => {
                log::info!("script done at {:?}", r.now());
                break;
            }
            Phase::Idle | Phase::Acting => {}
        }
    }

    let p = r.player();
    log::info!("player at {}, hp {}/{}", p.pos, p.hp, p.mhp);
    print!("{}", map_view::render(&r));

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("can't read {}", path.display()))
}

/// Log what the core wants the outside world to know.
fn report(r: &mut Runtime) {
    for notice in r.take_notices() {
        match notice {
            Notice::Refused(why) => log::info!("{why}"),
            Notice::HitpointWarning => log::warn!("hit points are low"),
            Notice::Status => log::debug!("status changed"),
            Notice::PanelShift(origin) => {
                log::debug!("panel moved to {origin}")
            }
            Notice::Redraw(_) | Notice::Memorized(_) => {}
        }
    }
    if r.take_flush() {
        log::debug!("input flush requested");
    }
}
