//! `classroom` command line: inspect and color SVG pages, call the API

mod config;
mod logging;
mod script;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use classroom_api::{AuthenticatedClient, ClientError, IdentityCache};
use classroom_coloring::ColoringCanvas;
use config::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;

fn cli() -> Command {
    Command::new("classroom")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classroom API client and coloring engine")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value("classroom.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Path to the TOML configuration file"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("regions")
                .about("List the regions of a coloring page")
                .arg(
                    Arg::new("svg")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("SVG coloring page"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("color")
                .about("Apply a paint script to a coloring page and export it")
                .arg(
                    Arg::new("svg")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("SVG coloring page"),
                )
                .arg(
                    Arg::new("script")
                        .long("script")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Paint script (paint/undo/redo/reset, one per line)"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Activity title used to name the exported file"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value(".")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory to write the exported image into"),
                )
                .arg(
                    Arg::new("confirm-reset")
                        .long("confirm-reset")
                        .action(ArgAction::SetTrue)
                        .help("Allow reset steps to discard the painting"),
                ),
        )
        .subcommand(
            Command::new("fetch")
                .about("GET an API path with the session cookie, refreshing it if needed")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .help("API path, e.g. /quizzes"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("classroom.toml"));
    let config = AppConfig::load(&config_path)?;
    logging::init(&config.log)?;

    match matches.subcommand() {
        Some(("regions", args)) => regions(&config, args).await,
        Some(("color", args)) => color(&config, args).await,
        Some(("fetch", args)) => fetch(&config, args).await,
        _ => Ok(()),
    }
}

fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument: {name}"))
}

async fn regions(config: &AppConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let svg = path_arg(args, "svg")?;
    let canvas = ColoringCanvas::open(svg, config.coloring.clone())
        .await
        .with_context(|| format!("loading {}", svg.display()))?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(canvas.regions().as_slice())?);
        return Ok(());
    }

    println!("{:<6} {:<16} {:<9} {:<12} outline", "region", "element", "kind", "fill");
    for region in canvas.regions().iter() {
        println!(
            "{:<6} {:<16} {:<9} {:<12} {}",
            region.id.0,
            region.element_id.as_deref().unwrap_or("-"),
            region.kind.tag(),
            region.current_color,
            if region.is_outline { "yes" } else { "" }
        );
    }
    Ok(())
}

async fn color(config: &AppConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let svg = path_arg(args, "svg")?;
    let script_path = path_arg(args, "script")?;
    let out = path_arg(args, "out")?;

    let mut canvas = ColoringCanvas::open(svg, config.coloring.clone())
        .await
        .with_context(|| format!("loading {}", svg.display()))?;
    if let Some(title) = args.get_one::<String>("title") {
        canvas = canvas.with_title(title.clone());
    }

    let text = tokio::fs::read_to_string(script_path)
        .await
        .with_context(|| format!("reading {}", script_path.display()))?;
    let steps = script::parse(&text)?;
    let summary = script::run(&mut canvas, &steps, args.get_flag("confirm-reset"));

    let image = canvas.export()?;
    let path = image.save_to(out).await?;

    println!(
        "painted {}, skipped {}, undone {}, redone {}, resets {}",
        summary.painted, summary.skipped, summary.undone, summary.redone, summary.resets
    );
    println!("wrote {}", path.display());
    Ok(())
}

async fn fetch(config: &AppConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let path = args
        .get_one::<String>("path")
        .context("missing argument: path")?;

    let (client, host) =
        AuthenticatedClient::from_config(config.api.clone(), Arc::new(IdentityCache::new()))?;

    match client.send(classroom_api::ApiRequest::get(path.as_str())).await {
        Ok(response) => {
            println!("{}", response.text());
            Ok(())
        }
        Err(err @ (ClientError::Unauthorized { .. } | ClientError::RefreshFailed(_))) => {
            if let Some(route) = host.take_redirect() {
                eprintln!("session expired: sign in again at {route}");
            }
            Err(err.into())
        }
        Err(err) => Err(err).with_context(|| format!("GET {path}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn color_subcommand_parses() {
        let matches = cli()
            .try_get_matches_from([
                "classroom",
                "color",
                "page.svg",
                "--script",
                "steps.txt",
                "--title",
                "Farm",
                "--confirm-reset",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "color");
        assert_eq!(path_arg(args, "out").unwrap(), &PathBuf::from("."));
        assert!(args.get_flag("confirm-reset"));
    }

    #[tokio::test]
    async fn color_writes_export() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("page.svg");
        let steps = dir.path().join("steps.txt");
        std::fs::write(&svg, classroom_test_utils::SIMPLE_SVG).unwrap();
        std::fs::write(&steps, "paint a red\n").unwrap();

        let matches = cli()
            .try_get_matches_from([
                "classroom",
                "color",
                svg.to_str().unwrap(),
                "--script",
                steps.to_str().unwrap(),
                "--title",
                "Shapes",
                "--out",
                dir.path().to_str().unwrap(),
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        color(&AppConfig::default(), args).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("Shapes.svg")).unwrap();
        assert!(written.contains(r#"fill="red""#));
    }
}
