mod cli;

use invlint::report::{rule, Report};
use invlint::{candidate, conflicts, dupkeys, indent};
use std::path::Path;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("INVLINT_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(2);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(2);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Check(check_cli) => check(check_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    match command_result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            for error in e.chain() {
                eprintln!("{error}")
            }
            std::process::exit(2);
        }
    }
}

pub fn check(cli: cli::CheckCommand) -> anyhow::Result<i32> {
    let mut checked: Vec<(Report, String)> = Vec::new();

    if cli.paths.is_empty() {
        let text = std::io::read_to_string(std::io::stdin())?;
        checked.push((
            Report::new("<stdin>".to_string(), rule::INDENT, indent::check(&text)),
            text.clone(),
        ));
        checked.push((
            Report::new("<stdin>".to_string(), rule::DUPLICATE_KEY, dupkeys::errors(&text)),
            text,
        ));
    } else {
        for path in &cli.paths {
            checked.extend(check_path(path)?);
        }
    }

    let failed = checked.iter().any(|(report, _)| !report.is_clean());
    output(&cli.format, &checked)?;

    Ok(if failed { 1 } else { 0 })
}

fn check_path(path: &Path) -> anyhow::Result<Vec<(Report, String)>> {
    let Some(kind) = candidate::classify(path) else {
        tracing::debug!(path=%path.display(), "no recognized file role, skipping");
        return Ok(Vec::new());
    };
    tracing::info!(path=%path.display(), ?kind, "checking");

    let text = std::fs::read_to_string(path)?;
    let path_string = path.display().to_string();
    let mut checked = Vec::new();

    if kind.checks_indentation() {
        checked.push((
            Report::new(path_string.clone(), rule::INDENT, indent::check(&text)),
            text.clone(),
        ));
    }
    if kind.checks_duplicate_keys() {
        checked.push((
            Report::new(path_string.clone(), rule::DUPLICATE_KEY, dupkeys::errors(&text)),
            text.clone(),
        ));
    }
    if kind.checks_group_conflicts() {
        checked.push((conflicts::review(path), text.clone()));
    }

    Ok(checked)
}

fn output(format: &cli::OutputFormat, checked: &[(Report, String)]) -> anyhow::Result<()> {
    match format {
        cli::OutputFormat::Text => {
            for (report, source) in checked {
                if !report.is_clean() {
                    println!("{}", report.render(Some(source)));
                }
            }
        }
        cli::OutputFormat::Json => {
            let reports: Vec<&Report> = checked.iter().map(|(report, _)| report).collect();
            serde_json::to_writer_pretty(std::io::stdout(), &reports)?;
        }
        cli::OutputFormat::Yaml => {
            let reports: Vec<&Report> = checked.iter().map(|(report, _)| report).collect();
            serde_yaml::to_writer(std::io::stdout(), &reports)?;
        }
    };

    Ok(())
}

/// (invlint-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<i32> {
    match cli.command {
        cli::DevSubCommand::Inventory { path } => {
            let inventory = invlint::inventory::Inventory::load(&path)?;
            println!("{inventory:#?}");
        }
    }

    Ok(0)
}
