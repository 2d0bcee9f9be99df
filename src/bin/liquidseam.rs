use liquidseam::{Axis, Carver, CarverConfig, EnergyFunction, MaskLayer, ResizeOrder};

extern crate clap;
extern crate image;

use clap::{value_t, App, Arg, ArgMatches};
use failure::Error;
use image::GenericImageView;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};

const BAR_LENGTH: u64 = 1000;

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(BAR_LENGTH);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:>6} [{bar:40.cyan/blue}] {percent:>3}% {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

// Load a mask image and hand it to `add` as an RGBA layer.
fn with_mask<F>(path: &str, add: F) -> Result<(), Error>
where
    F: FnOnce(MaskLayer<'_>) -> liquidseam::Result<()>,
{
    let mask = image::open(path)?;
    let (width, height) = mask.dimensions();
    let pixels = mask.to_rgba8().into_raw();
    add(MaskLayer::new(&pixels, width as usize, height as usize, 4))?;
    Ok(())
}

fn config_from(matches: &ArgMatches) -> Result<CarverConfig, Error> {
    Ok(CarverConfig::new()
        .with_energy(value_t!(matches, "energy", EnergyFunction)?)
        .with_rigidity(value_t!(matches, "rigidity", f64)?)
        .with_delta_x(value_t!(matches, "delta-x", usize)?)
        .with_resize_order(value_t!(matches, "order", ResizeOrder)?)
        .with_enlargement_step(value_t!(matches, "enl-step", f64)?)
        .with_record_seams(matches.is_present("seams")))
}

fn main() -> Result<(), Error> {
    let matches = App::new("liquidseam")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Content-aware image resizing")
        .arg(
            Arg::with_name("input")
                .help("The image to resize")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Where to write the result")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .takes_value(true)
                .help("Target width (default: unchanged)"),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .takes_value(true)
                .help("Target height (default: unchanged)"),
        )
        .arg(
            Arg::with_name("energy")
                .long("energy")
                .takes_value(true)
                .default_value("norm")
                .possible_values(&["norm", "bias", "sumabs", "xabs", "yabs", "null"])
                .help("Gradient energy function"),
        )
        .arg(
            Arg::with_name("rigidity")
                .long("rigidity")
                .takes_value(true)
                .default_value("0")
                .help("Penalty for seams that wander sideways"),
        )
        .arg(
            Arg::with_name("delta-x")
                .long("delta-x")
                .takes_value(true)
                .default_value("1")
                .help("Widest sideways step a seam may take per row"),
        )
        .arg(
            Arg::with_name("order")
                .long("order")
                .takes_value(true)
                .default_value("width")
                .possible_values(&["width", "height", "width-first", "height-first"])
                .help("Which axis to resize first"),
        )
        .arg(
            Arg::with_name("enl-step")
                .long("enl-step")
                .takes_value(true)
                .default_value("2")
                .help("Largest growth factor of a single enlargement pass"),
        )
        .arg(
            Arg::with_name("preserve")
                .long("preserve")
                .takes_value(true)
                .value_name("FILE")
                .help("Mask of areas to protect"),
        )
        .arg(
            Arg::with_name("discard")
                .long("discard")
                .takes_value(true)
                .value_name("FILE")
                .help("Mask of areas to remove first"),
        )
        .arg(
            Arg::with_name("strength")
                .long("strength")
                .takes_value(true)
                .default_value("1000")
                .help("Weight of the preserve and discard masks"),
        )
        .arg(
            Arg::with_name("rigidity-mask")
                .long("rigidity-mask")
                .takes_value(true)
                .value_name("FILE")
                .help("Mask scaling the rigidity per pixel"),
        )
        .arg(
            Arg::with_name("seams")
                .long("seams")
                .takes_value(true)
                .value_name("PREFIX")
                .help("Write the seams of each pass to PREFIX-<n>-<axis>.png"),
        )
        .arg(
            Arg::with_name("dump-energy")
                .long("dump-energy")
                .takes_value(true)
                .value_name("FILE")
                .help("Write the energy map of the input as a grayscale image"),
        )
        .arg(
            Arg::with_name("no-progress")
                .long("no-progress")
                .help("Do not draw a progress bar"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more; repeat for even more"),
        )
        .get_matches();

    init_logging(matches.occurrences_of("verbose"));

    let input = image::open(matches.value_of("input").unwrap_or_default())?;
    let mut carver = Carver::from_image(&input, config_from(&matches)?)?;

    let strength = value_t!(matches, "strength", i32)?;
    if let Some(path) = matches.value_of("preserve") {
        with_mask(path, |layer| carver.bias_add(layer, strength))?;
    }
    if let Some(path) = matches.value_of("discard") {
        with_mask(path, |layer| carver.bias_add(layer, -strength))?;
    }
    if let Some(path) = matches.value_of("rigidity-mask") {
        with_mask(path, |layer| carver.rigidity_mask_add(layer))?;
    }
    if let Some(path) = matches.value_of("dump-energy") {
        carver.energy_image()?.save(path)?;
    }

    let width = if matches.is_present("width") {
        value_t!(matches, "width", usize)?
    } else {
        carver.width()
    };
    let height = if matches.is_present("height") {
        value_t!(matches, "height", usize)?
    } else {
        carver.height()
    };

    let bar = if matches.is_present("no-progress") {
        None
    } else {
        Some(progress_bar())
    };
    if let Some(bar) = bar.clone() {
        carver.set_progress(move |axis: Axis, fraction: f64| {
            bar.set_message(axis.to_string());
            bar.set_position((fraction * BAR_LENGTH as f64) as u64);
        });
    }

    info!(
        "{}: {}x{} -> {}x{}",
        matches.value_of("input").unwrap_or_default(),
        carver.width(),
        carver.height(),
        width,
        height
    );
    carver.resize(width, height)?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    carver.to_image()?.save(matches.value_of("output").unwrap_or_default())?;

    if let Some(prefix) = matches.value_of("seams") {
        for (n, map) in carver.seam_maps().iter().enumerate() {
            map.image.save(format!("{}-{}-{}.png", prefix, n, map.axis))?;
        }
    }
    Ok(())
}
