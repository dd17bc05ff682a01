extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate num;
extern crate num_cpus;
extern crate quadbrot;

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use num::Complex;
use quadbrot::tiled::{Device, TiledKernelComputer};
use quadbrot::{CountGrid, RegionComputer, SampleGrid, Viewport};
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

/// Split `s` once at `separator` and parse both sides, e.g. "80x40".
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    let (left, right) = (&s[..index], &s[index + separator.len_utf8()..]);
    Some((left.parse().ok()?, right.parse().ok()?))
}

/// A corner of the viewport, written "re,im".
fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_| ())
        .ok_or_else(|| err.to_string())
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    not_a_number: &str,
    out_of_range: &str,
) -> Result<(), String> {
    let value: T = s.parse().map_err(|_| not_a_number.to_string())?;
    if low <= value && value <= high {
        Ok(())
    } else {
        Err(out_of_range.to_string())
    }
}

const MODE: &str = "mode";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("quadbrot")
        .version("0.1.0")
        .about("Mandelbrot escape-count renderer; prints the count grid, top row first")
        .arg(
            Arg::with_name(MODE)
                .required(false)
                .long(MODE)
                .short("m")
                .takes_value(true)
                .possible_values(&["region", "tiled"])
                .default_value("region")
                .help("Quadrant workers or one block-tiled launch"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("80x40")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse grid size"))
                .help("Size of the count grid"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .allow_hyphen_values(true)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .default_value("-2.0,-1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the viewport"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .allow_hyphen_values(true)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .default_value("1.0,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the viewport"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of region workers, or device units in tiled mode"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        200_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 200000",
                    )
                })
                .help("Maximum iterations per point"),
        )
        .get_matches()
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("Missing value for --{}", name))
}

fn render(matches: &ArgMatches) -> Result<CountGrid, Error> {
    let (width, height) = parse_pair::<usize>(value(matches, SIZE)?, 'x')
        .ok_or_else(|| format_err!("Error parsing grid size"))?;
    let leftlower = parse_complex(value(matches, LEFTLOWER)?)
        .ok_or_else(|| format_err!("Error parsing left lower point"))?;
    let rightupper = parse_complex(value(matches, RIGHTUPPER)?)
        .ok_or_else(|| format_err!("Error parsing right upper point"))?;
    let threads = usize::from_str(value(matches, THREADS)?)?;
    let iterations = u32::from_str(value(matches, ITERATIONS)?)?;

    let viewport = Viewport::from_corners(leftlower, rightupper)?;
    let grid = SampleGrid::new(width, height)?;
    let image = match value(matches, MODE)? {
        "tiled" => TiledKernelComputer::new(Device::acquire(threads)?).compute(
            &viewport,
            grid,
            iterations,
        )?,
        _ => {
            RegionComputer::new(threads)?
                .render(&viewport, grid, iterations)?
                .grid
        }
    };
    Ok(image)
}

fn write_grid(grid: &CountGrid) -> Result<(), io::Error> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in grid.rows().rev() {
        let line: Vec<String> = row.iter().map(|count| count.to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()
}

fn main() {
    env_logger::init();
    let matches = args();

    let result = render(&matches).and_then(|grid| write_grid(&grid).map_err(Error::from));
    if let Err(e) = result {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_split_at_the_first_separator() {
        assert_eq!(parse_pair::<usize>("80x40", 'x'), Some((80, 40)));
        assert_eq!(parse_pair::<f64>("-2.0,-1.5", ','), Some((-2.0, -1.5)));
        assert_eq!(parse_pair::<usize>("80", 'x'), None);
        assert_eq!(parse_pair::<usize>("80x", 'x'), None);
        assert_eq!(parse_pair::<usize>("80x40x2", 'x'), None);
    }

    #[test]
    fn corners_parse_as_complex_numbers() {
        assert_eq!(parse_complex("1.0,1.5"), Some(Complex::new(1.0, 1.5)));
        assert_eq!(parse_complex("1.0;1.5"), None);
    }

    #[test]
    fn range_validation_reports_which_check_failed() {
        assert_eq!(validate_range("4", 1, 8, "nan", "range"), Ok(()));
        assert_eq!(validate_range("9", 1, 8, "nan", "range"), Err("range".to_string()));
        assert_eq!(validate_range("four", 1, 8, "nan", "range"), Err("nan".to_string()));
        assert_eq!(validate_pair::<u16>("80x40", 'x', "bad"), Ok(()));
        assert_eq!(validate_pair::<u16>("80by40", 'x', "bad"), Err("bad".to_string()));
    }
}
