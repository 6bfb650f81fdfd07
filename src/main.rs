// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use finsvg::svgfetch::{CacheScope, HttpFetcher, Resolver, SceneMap};
use pico_args::Arguments;

macro_rules! timed {
    ($args:expr, $name:expr, $task:expr) => {
        if $args.perf {
            let now = std::time::Instant::now();
            let res = $task;
            eprintln!("{}: {:.2}ms", $name, now.elapsed().as_micros() as f64 / 1000.0);
            res
        } else {
            $task
        }
    };
}

const HELP: &str = "\
finsvg finalizes rendered SVG files: embeds referenced icons and illustrations,
removes editor-only elements and fits the viewBox to the content.

USAGE:
  finsvg [OPTIONS] <in-svg> <out-svg>  # from file to file
  finsvg [OPTIONS] <in-svg> -c         # from file to stdout
  finsvg [OPTIONS] - <out-svg>         # from stdin to file
  finsvg [OPTIONS] - -c                # from stdin to stdout

  Elements like <use href=\"#id\" data-scene=\"icon\" data-resource=\"mdi/home\"/>
  are resolved into embedded symbols.

OPTIONS:
  -h, --help                        Prints help information
  -V, --version                     Prints version information
  -c                                Prints the output SVG to the stdout

  --optimize                        Minifies the output
  --padding NUM                     Sets the viewBox padding used when the input
                                    has no valid viewBox
                                    [default: 20]
  --max-wait MS                     Sets how long to wait for fragments
                                    [default: 5000]
  --poll-interval MS                Sets how often to check for fragments
                                    [default: 100]
  --timeout SECS                    Sets the fragment request timeout
                                    [default: 30]
  --scene NAME=URL                  Sets a base URL of a scene.
                                    This option can be set multiple times
                                    [default: built-in 'icon' and 'illus' scenes]
  --offline                         Do not fetch any fragments
  --indent INDENT                   Sets the XML nodes indent
                                    [values: none, 0, 1, 2, 3, 4, tabs] [default: 4]
  --attrs-indent INDENT             Sets the XML attributes indent
                                    [values: none, 0, 1, 2, 3, 4, tabs] [default: none]

  --perf                            Prints performance stats
  --quiet                           Disables warnings
  --verbose                         Enables debug output

ARGS:
  <in-svg>                          Input file
  <out-svg>                         Output file
";

#[derive(Debug)]
struct Args {
    optimize: bool,
    padding: f64,
    max_wait: u64,
    poll_interval: u64,
    timeout: u64,
    scenes: Vec<(String, String)>,
    offline: bool,
    indent: svgtree::Indent,
    attrs_indent: svgtree::Indent,

    perf: bool,
    quiet: bool,
    verbose: bool,

    input: String,
    output: String,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    Ok(Args {
        optimize: input.contains("--optimize"),
        padding: input
            .opt_value_from_fn("--padding", parse_padding)?
            .unwrap_or(20.0),
        max_wait: input
            .opt_value_from_fn("--max-wait", parse_millis)?
            .unwrap_or(5000),
        poll_interval: input
            .opt_value_from_fn("--poll-interval", parse_millis)?
            .unwrap_or(100),
        timeout: input
            .opt_value_from_fn("--timeout", parse_timeout)?
            .unwrap_or(30),
        scenes: input.values_from_fn("--scene", parse_scene)?,
        offline: input.contains("--offline"),
        indent: input
            .opt_value_from_fn("--indent", parse_indent)?
            .unwrap_or(svgtree::Indent::Spaces(4)),
        attrs_indent: input
            .opt_value_from_fn("--attrs-indent", parse_indent)?
            .unwrap_or(svgtree::Indent::None),

        perf: input.contains("--perf"),
        quiet: input.contains("--quiet"),
        verbose: input.contains("--verbose"),

        input: input.free_from_str()?,
        output: input.free_from_str()?,
    })
}

fn parse_padding(s: &str) -> Result<f64, String> {
    let n: f64 = s.parse().map_err(|_| "invalid padding")?;

    if n.is_finite() && n >= 0.0 {
        Ok(n)
    } else {
        Err("padding cannot be negative".to_string())
    }
}

fn parse_millis(s: &str) -> Result<u64, String> {
    s.parse().map_err(|_| "invalid number of milliseconds".to_string())
}

fn parse_timeout(s: &str) -> Result<u64, String> {
    let n: u64 = s.parse().map_err(|_| "invalid number of seconds")?;

    if n > 0 {
        Ok(n)
    } else {
        Err("timeout cannot be zero".to_string())
    }
}

fn parse_scene(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, url)) if !name.is_empty() && !url.is_empty() => {
            Ok((name.to_string(), url.to_string()))
        }
        _ => Err("scene should be set as NAME=URL".to_string()),
    }
}

fn parse_indent(s: &str) -> Result<svgtree::Indent, String> {
    let indent = match s {
        "none" => svgtree::Indent::None,
        "0" => svgtree::Indent::Spaces(0),
        "1" => svgtree::Indent::Spaces(1),
        "2" => svgtree::Indent::Spaces(2),
        "3" => svgtree::Indent::Spaces(3),
        "4" => svgtree::Indent::Spaces(4),
        "tabs" => svgtree::Indent::Tabs,
        _ => return Err("invalid INDENT value".to_string()),
    };

    Ok(indent)
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom<'a> {
    Stdin,
    File(&'a str),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo<'a> {
    Stdout,
    File(&'a str),
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            if args.verbose {
                log::set_max_level(log::LevelFilter::Debug);
            } else {
                log::set_max_level(log::LevelFilter::Warn);
            }
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        process::exit(1);
    }
}

fn process(args: Args) -> Result<(), String> {
    let (in_svg, out_svg) = {
        let in_svg = args.input.as_str();
        let out_svg = args.output.as_str();

        let svg_from = if in_svg == "-" {
            InputFrom::Stdin
        } else if in_svg == "-c" {
            return Err("-c should be set after input".to_string());
        } else {
            InputFrom::File(in_svg)
        };

        let svg_to = if out_svg == "-c" {
            OutputTo::Stdout
        } else {
            OutputTo::File(out_svg)
        };

        (svg_from, svg_to)
    };

    let input_svg = timed!(args, "Reading", match in_svg {
        InputFrom::Stdin => load_stdin(),
        InputFrom::File(path) => std::fs::read(path).map_err(|e| e.to_string()),
    })?;

    let scene = finsvg::PrerenderedScene::from_data(&input_svg).map_err(|e| e.to_string())?;

    let loader = if args.offline {
        finsvg::ResourceLoader::offline()
    } else {
        let mut scenes = SceneMap::default();
        for (name, url) in &args.scenes {
            scenes = scenes.with_scene(name.as_str(), url.as_str());
        }

        let fetcher = HttpFetcher::new().with_timeout(Duration::from_secs(args.timeout));
        let resolver = Resolver::new(Arc::new(fetcher), CacheScope::new()).with_scenes(scenes);
        finsvg::ResourceLoader::new(resolver)
    };

    let options = finsvg::Options {
        default_padding: args.padding,
        max_wait: Duration::from_millis(args.max_wait),
        poll_interval: Duration::from_millis(args.poll_interval),
        optimize: args.optimize,
        write: svgtree::WriteOptions {
            use_single_quote: false,
            indent: args.indent,
            attributes_indent: args.attrs_indent,
        },
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| e.to_string())?;

    let s = timed!(args, "Finalizing", runtime.block_on(
        finsvg::render_to_string(&scene, &loader, &options)
    ))
    .map_err(|e| e.to_string())?;

    match out_svg {
        OutputTo::Stdout => {
            io::stdout()
                .write_all(s.as_bytes())
                .map_err(|_| "failed to write to the stdout".to_string())?;
        }
        OutputTo::File(path) => {
            let path = Path::new(path);
            if let Some(dir) = path.parent() {
                if !dir.as_os_str().is_empty() && !dir.exists() {
                    std::fs::create_dir_all(dir)
                        .map_err(|_| "failed to create the output directory".to_string())?;
                }
            }

            timed!(args, "Saving", std::fs::write(path, s.as_bytes()))
                .map_err(|_| "failed to write to the output file".to_string())?;
        }
    }

    Ok(())
}

fn load_stdin() -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    handle
        .read_to_end(&mut buf)
        .map_err(|_| "failed to read from stdin".to_string())?;

    Ok(buf)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
