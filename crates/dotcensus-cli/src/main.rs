use dotcensus::render::HeadlessChart;
use dotcensus::{ChartConfig, StaticSource, parse_census_csv};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Data(dotcensus::Error),
    Render(dotcensus::render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Data(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<dotcensus::Error> for CliError {
    fn from(value: dotcensus::Error) -> Self {
        Self::Data(value)
    }
}

impl From<dotcensus::render::Error> for CliError {
    fn from(value: dotcensus::render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Layout,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    measure: Option<String>,
    comparison: Option<String>,
    width: f64,
    height: f64,
    seed: u64,
    ticks: usize,
    pretty: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    "dotcensus-cli\n\
\n\
USAGE:\n\
  dotcensus-cli [render] --measure <name> --comparison <name> [--width <px>] [--height <px>] [--seed <n>] [--ticks <n>] [--out <path>] [<path>|-]\n\
  dotcensus-cli layout --measure <name> --comparison <name> [--pretty] [--width <px>] [--height <px>] [--seed <n>] [--ticks <n>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', CSV rows are read from stdin.\n\
  - The CSV header must name measure, comparison, group and value columns.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - layout prints the settled scene as JSON.\n\
  - --ticks caps the dot settle loop; the simulation usually cools in about 300 steps.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let defaults = ChartConfig::default();
    let mut args = Args {
        command: Command::Render,
        width: defaults.width,
        height: defaults.height,
        seed: defaults.random_seed,
        ticks: 1000,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "layout" => args.command = Command::Layout,
            "--measure" => {
                let Some(measure) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.measure = Some(measure.clone());
            }
            "--comparison" => {
                let Some(comparison) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.comparison = Some(comparison.clone());
            }
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--ticks" => {
                let Some(ticks) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.ticks = ticks.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--pretty" => args.pretty = true,
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                while it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.measure.is_none() || args.comparison.is_none() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let Some(measure) = args.measure.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let Some(comparison) = args.comparison.as_deref() else {
        return Err(CliError::Usage(usage()));
    };

    let text = read_input(args.input.as_deref())?;
    let records = parse_census_csv(&text)?;

    let config = ChartConfig {
        width: args.width,
        height: args.height,
        random_seed: args.seed,
        ..ChartConfig::default()
    };
    let mut chart = HeadlessChart::new(config);
    chart.set_source(Box::new(StaticSource::new(records)));
    chart.select(measure, comparison)?;
    chart.settle(args.ticks);

    match args.command {
        Command::Render => write_text(&chart.render_svg(), args.out.as_deref()),
        Command::Layout => write_json(&chart.layout(), args.pretty),
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
