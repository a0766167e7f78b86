/*
 * This file is part of Smctherm.
 *
 * Copyright (C) 2026 Smctherm contributors
 *
 * Smctherm is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Smctherm is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Smctherm. If not, see <https://www.gnu.org/licenses/>.
 */

mod cache;
mod catalog;
mod decode;
mod display;
mod logger;
mod persist;
mod resolver;
mod system;
mod transport;
mod types;

#[cfg(test)]
mod test_utils;

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::Context;

use persist::{LastValidStore, Metric};
use resolver::TempResolver;
use transport::SystemSmc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    None,
    CpuTemp,
    GpuTemp,
    IndividualCpuTemps,
    IndividualGpuTemps,
    ListAll,
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    op: Op,
    attempts: u32,
    interval_ms: u64,
    fail_soft: bool,
    show_version: bool,
    logging: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            op: Op::None,
            attempts: 1,
            interval_ms: 1_000,
            fail_soft: false,
            show_version: false,
            logging: false,
        }
    }
}

fn usage(prog: &str) {
    println!(
        "Check temperature by using the Apple System Management Controller {}",
        VERSION
    );
    println!("Usage:");
    println!("{} [options]", prog);
    println!("    -c         : list CPU temperatures (Celsius)");
    println!("    -g         : list GPU temperatures (Celsius)");
    println!("    -C         : list individual CPU core temperatures (Celsius)");
    println!("    -G         : list individual GPU core temperatures (Celsius)");
    println!("    -h         : help");
    println!("    -i         : set interval in milliseconds (e.g. -i25, valid range is 20-1000, default: 1000)");
    println!("    -l         : list all keys and values");
    println!("    -f         : fail-soft mode. Shows last valid value if current sensor read fails.");
    println!("    -v         : version");
    println!("    -n         : tries to query the temperature sensors for n times (e.g. -n3) until a valid value is returned");
}

/// Parses getopt-style flags: short options may be clustered ("-cf") and the
/// `-i`/`-n` values may be attached ("-i25") or given as the next argument.
fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--logging" {
            opts.logging = true;
            i += 1;
            continue;
        }
        if !arg.starts_with('-') || arg.len() < 2 {
            i += 1;
            continue;
        }
        let mut chars = arg[1..].chars();
        while let Some(c) = chars.next() {
            match c {
                'c' => opts.op = Op::CpuTemp,
                'g' => opts.op = Op::GpuTemp,
                'C' => opts.op = Op::IndividualCpuTemps,
                'G' => opts.op = Op::IndividualGpuTemps,
                'l' => opts.op = Op::ListAll,
                'f' => opts.fail_soft = true,
                'v' => opts.show_version = true,
                'i' => {
                    let value = take_value(&mut chars, args, &mut i).ok_or_else(|| {
                        "Invalid argument provided for -i (integer between 20 and 1000 is required)"
                            .to_string()
                    })?;
                    match value.parse::<u64>() {
                        Ok(ms) if (20..=1000).contains(&ms) => opts.interval_ms = ms,
                        _ => {
                            return Err(
                                "Invalid argument provided for -i (integer between 20 and 1000 is required)"
                                    .to_string(),
                            )
                        }
                    }
                    break;
                }
                'n' => {
                    let value = take_value(&mut chars, args, &mut i).ok_or_else(|| {
                        "Invalid argument provided for -n (integer is required)".to_string()
                    })?;
                    match value.parse::<u32>() {
                        Ok(n) => opts.attempts = n,
                        Err(_) => {
                            return Err(
                                "Invalid argument provided for -n (integer is required)"
                                    .to_string(),
                            )
                        }
                    }
                    break;
                }
                // '-h' and anything unrecognized both land on the usage path.
                _ => opts.op = Op::None,
            }
        }
        i += 1;
    }
    Ok(opts)
}

/// Value attached to the flag ("-i25") or taken from the next argument.
fn take_value(
    chars: &mut std::str::Chars<'_>,
    args: &[String],
    i: &mut usize,
) -> Option<String> {
    let rest: String = chars.collect();
    if !rest.is_empty() {
        return Some(rest);
    }
    *i += 1;
    args.get(*i).cloned()
}

fn read_metric_with_retries(
    resolver: &TempResolver<SystemSmc>,
    metric: Metric,
    opts: &CliOptions,
) -> f64 {
    let range = resolver.range();
    let mut temp = 0.0;
    let mut attempts_left = opts.attempts;
    while attempts_left > 0 {
        temp = match metric {
            Metric::Cpu => resolver.cpu_temp(),
            Metric::Gpu => resolver.gpu_temp(),
        };
        if range.is_valid(temp) {
            break;
        }
        thread::sleep(Duration::from_millis(opts.interval_ms));
        attempts_left -= 1;
    }
    if opts.fail_soft && !range.is_valid(temp) {
        match resolver.last_valid_temp(metric) {
            Ok(v) => temp = v,
            Err(e) => {
                eprintln!("warning: no stored {} fallback: {}", metric.as_str(), e);
                temp = 0.0;
            }
        }
    }
    temp
}

fn read_individual_with_retries(
    resolver: &TempResolver<SystemSmc>,
    metric: Metric,
    opts: &CliOptions,
) -> Vec<(String, f64)> {
    let mut temps = Vec::new();
    let mut attempts_left = opts.attempts;
    while attempts_left > 0 {
        temps = match metric {
            Metric::Cpu => resolver.individual_cpu_temps(),
            Metric::Gpu => resolver.individual_gpu_temps(),
        };
        if !temps.is_empty() {
            break;
        }
        thread::sleep(Duration::from_millis(opts.interval_ms));
        attempts_left -= 1;
    }
    temps
}

fn retry_hint() {
    eprintln!("Could not get valid sensor value. Please use `-n` option and `-i` option.");
    eprintln!("In M2 Mac, it would be work fine with `-i25 -n180 -f` options.");
}

fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let prog = argv
        .first()
        .map(String::as_str)
        .unwrap_or("smctherm")
        .to_string();

    let opts = match parse_args(&argv[1..]) {
        Ok(o) => o,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
    };

    if opts.logging {
        logger::init_logging();
        logger::log_event(
            "startup",
            serde_json::json!({
                "mode": "cli",
                "args": argv,
            }),
        );
    }

    if opts.show_version {
        println!("{}", VERSION);
        return Ok(());
    }

    if opts.op == Op::None {
        usage(&prog);
        std::process::exit(1);
    }

    let transport = SystemSmc::open().context("failed to open SMC service")?;
    let brand = system::cpu_brand_string();
    let family = catalog::detect_family(&brand);
    let store = LastValidStore::new(LastValidStore::default_path());
    let resolver = TempResolver::new(transport, family, store);

    if opts.logging {
        logger::log_event(
            "hardware_detected",
            serde_json::json!({
                "brand": brand,
                "family": format!("{:?}", family),
            }),
        );
    }

    match opts.op {
        Op::ListAll => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if let Err(e) = resolver.print_all(&mut out) {
                eprintln!("Error: list all keys: {}", e);
            }
            let _ = out.flush();
        }
        Op::CpuTemp | Op::GpuTemp => {
            let metric = if opts.op == Op::CpuTemp {
                Metric::Cpu
            } else {
                Metric::Gpu
            };
            let temp = read_metric_with_retries(&resolver, metric, &opts);
            println!("{:.1}", temp);
            if temp == 0.0 {
                retry_hint();
                std::process::exit(1);
            }
        }
        Op::IndividualCpuTemps | Op::IndividualGpuTemps => {
            let metric = if opts.op == Op::IndividualCpuTemps {
                Metric::Cpu
            } else {
                Metric::Gpu
            };
            let temps = read_individual_with_retries(&resolver, metric, &opts);
            if temps.is_empty() {
                retry_hint();
                std::process::exit(1);
            }
            for (label, temp) in temps {
                println!("{}: {:.1}\u{00b0}C", label, temp);
            }
        }
        Op::None => unreachable!(),
    }

    Ok(())
}
