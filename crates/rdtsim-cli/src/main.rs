use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rdtsim_core::{Simulator, Stats};
use rdtsim_protocols::build_endpoints;
use rdtsim_types::{Protocol, SimulationOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reliable data transport protocol simulator")]
struct Args {
    /// Number of layer-5 messages to inject.
    #[arg(short = 'n', long = "num-msgs", default_value_t = 10)]
    num_msgs: u32,

    /// Mean interarrival time; actual arrivals are uniform in [0, 2d].
    #[arg(short = 'd', long = "interarrival-time", default_value_t = 100.0)]
    interarrival_time: f64,

    /// Sequence/ack number modulus.
    #[arg(short = 'z', long = "seqnum-limit", default_value_t = 16)]
    seqnum_limit: u32,

    /// Per-packet loss probability.
    #[arg(short = 'l', long = "loss-prob", default_value_t = 0.0)]
    loss_prob: f64,

    /// Per-packet corruption probability.
    #[arg(short = 'c', long = "corrupt-prob", default_value_t = 0.0)]
    corrupt_prob: f64,

    /// PRNG seed; omit to derive one from the wall clock.
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Trace verbosity, 0-3.
    #[arg(short = 'v', long = "trace", default_value_t = 0)]
    trace: u8,

    /// Protocol personality to simulate.
    #[arg(long, value_enum, default_value_t = ProtocolArg::Gbn)]
    protocol: ProtocolArg,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
enum ProtocolArg {
    Abp,
    Gbn,
}

impl From<ProtocolArg> for Protocol {
    fn from(p: ProtocolArg) -> Self {
        match p {
            ProtocolArg::Abp => Protocol::Abp,
            ProtocolArg::Gbn => Protocol::Gbn,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.trace);
    info!("rdtsim starting...");

    let options = SimulationOptions {
        num_msgs: args.num_msgs,
        interarrival_time: args.interarrival_time,
        seqnum_limit: args.seqnum_limit,
        loss_prob: args.loss_prob,
        corrupt_prob: args.corrupt_prob,
        random_seed: args.seed,
        trace: args.trace,
        protocol: args.protocol.into(),
    };
    options
        .validate()
        .context("invalid simulation configuration")?;

    report_config(&options);

    let (sender, receiver) = build_endpoints(options.protocol, options.seqnum_limit);
    let mut sim = Simulator::new(&options, sender, receiver);
    sim.run();

    let stats = sim.stats();
    report_results(&stats);

    Ok(())
}

fn init_logging(trace: u8) {
    let level = match trace {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn report_config(options: &SimulationOptions) {
    println!("-----  Simulator configuration -----");
    println!("nSimMax            = {}", options.num_msgs);
    println!("interarrivalTime   = {}", options.interarrival_time);
    println!("seqnumLimit        = {}", options.seqnum_limit);
    println!("lossProb           = {}", options.loss_prob);
    println!("corruptProb        = {}", options.corrupt_prob);
    println!("randomSeed         = {:?}", options.random_seed);
    println!("trace              = {}", options.trace);
    println!(
        "protocol           = {}",
        match options.protocol {
            Protocol::Abp => "abp",
            Protocol::Gbn => "gbn",
        }
    );
    println!("-------------------------------------");
}

fn report_results(stats: &Stats) {
    println!("\n-----  Simulation results -----");
    println!("nSim               = {}", stats.n_sim);
    println!("time               = {}", stats.time);
    println!("nToLayer3A         = {}", stats.n_to_layer3_a);
    println!("nToLayer3B         = {}", stats.n_to_layer3_b);
    println!("nLost              = {}", stats.n_lost);
    println!("nCorrupt           = {}", stats.n_corrupt);
    println!("nToLayer5A         = {}", stats.n_to_layer5_a);
    println!("nToLayer5B         = {}", stats.n_to_layer5_b);
    println!("throughputB        = {:.6}", stats.throughput_b());
    println!("--------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_arg_maps_to_protocol() {
        assert_eq!(Protocol::from(ProtocolArg::Abp), Protocol::Abp);
        assert_eq!(Protocol::from(ProtocolArg::Gbn), Protocol::Gbn);
    }
}
