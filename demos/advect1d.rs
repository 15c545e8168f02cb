use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use lockstep::array::FieldArray;
use lockstep::config::{PhysicsConfig, TimeConfig};
use lockstep::driver;
use lockstep::solvers::advect1d;
use lockstep::task_list::TimeIntegratorTaskList;

/// The initial model: a square pulse over a low-density background.
///
struct Model {}

impl Model {
    fn density_at(&self, x: f64) -> f64 {
        if (0.25..0.5).contains(&x) {
            1.0
        } else {
            0.1
        }
    }
}

/// The simulation solution state
///
#[derive(serde::Serialize)]
struct State {
    time: f64,
    iteration: u64,
    conserved: Vec<FieldArray>,
}

#[derive(Debug, Parser)]
struct Opts {
    #[clap(short = 'n', long, default_value = "16")]
    num_blocks: usize,

    #[clap(short = 'b', long, default_value = "64")]
    block_size: usize,

    #[clap(short = 'i', long, default_value = "vl2")]
    integrator: String,

    #[clap(short = 's', long, default_value = "serial", help = "serial|rayon")]
    strategy: String,

    #[clap(long, default_value = "0.8")]
    cfl: f64,

    #[clap(long, default_value = "1.0")]
    speed: f64,

    #[clap(long, default_value = "0.5")]
    tfinal: f64,
}

fn main() {
    let opts = Opts::parse();
    init_logging();
    info!("{:?}", opts);

    let time_config = TimeConfig::new(opts.cfl).with_integrator(&opts.integrator);
    let phys = PhysicsConfig::default();

    let list = match TimeIntegratorTaskList::new(&time_config, &phys) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let model = Model {};
    let mut blocks = advect1d::block_chain(
        opts.num_blocks,
        opts.block_size,
        opts.speed,
        list.cfl_number(),
        |x| model.density_at(x),
    );

    let parallel = match opts.strategy.as_str() {
        "serial" => false,
        "rayon" => true,
        _ => {
            eprintln!("Error: --strategy options are [serial|rayon]");
            return;
        }
    };

    let total_zones = (opts.num_blocks * opts.block_size) as f64;
    let dx = 1.0 / total_zones;
    let mut dt = list.cfl_number() * dx / opts.speed.abs();
    let mut time = 0.0;
    let mut iteration = 0;

    println!("num blocks .... {}", opts.num_blocks);
    println!("integrator .... {}", list.integrator().name());
    println!();

    while opts.tfinal - time > 1e-12 {
        let start = std::time::Instant::now();

        time = if parallel {
            driver::advance_step_par(&list, &mut blocks, time, dt)
        } else {
            driver::advance_step(&list, &mut blocks, time, dt)
        };
        iteration += 1;

        // each block proposed its next timestep on the final stage
        dt = driver::min_block_dt(&blocks).min(opts.tfinal - time);

        let step_seconds = start.elapsed().as_secs_f64();
        let mzps = total_zones / 1e6 / step_seconds;

        println!("[{}] t={:.4} Mzps={:.2}", iteration, time, mzps);
    }

    let state = State {
        time,
        iteration,
        conserved: blocks.iter().map(|pmb| pmb.hydro.u.clone()).collect(),
    };

    let file = std::fs::File::create("state.cbor").unwrap();
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&state, &mut buffer).unwrap();
}

fn init_logging() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();
}
