//! Entry point for the sentrytop TUI. Parses args, resolves the profile and runs the App.

use std::env;
use std::io::{self, Write};

use sentrytop::app::App;
use sentrytop::demo::{spawn_demo_feed, FeedConfig};
use sentrytop::logging::init_logging;
use sentrytop::profiles::{
    load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile,
};
use sentrytop::rate::RateMode;
use tracing::{info, warn};

struct ParsedArgs {
    url: Option<String>,
    tls_ca: Option<String>,
    profile: Option<String>,
    rate_mode: Option<RateMode>,
    save: bool,
    demo: bool,
    dry_run: bool,
}

enum CliExit {
    /// --help: print and exit successfully
    Help(String),
    /// Bad invocation: print and exit with status 2
    Usage(String),
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--tls-ca CERT_PEM|-t CERT_PEM] [--profile NAME|-P NAME] [--save] [--rate-mode precomputed|derived|-r MODE] [--demo] [--dry-run] [ws://HOST:PORT/ws]"
    )
}

fn parse_rate_mode(v: Option<String>, prog: &str) -> Result<Option<RateMode>, CliExit> {
    match v {
        Some(v) => v
            .parse::<RateMode>()
            .map(Some)
            .map_err(|e| CliExit::Usage(format!("{e}\n{}", usage(prog)))),
        None => Err(CliExit::Usage(format!(
            "--rate-mode needs a value\n{}",
            usage(prog)
        ))),
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, CliExit> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "sentrytop".into());
    let mut url: Option<String> = None;
    let mut tls_ca: Option<String> = None;
    let mut profile: Option<String> = None;
    let mut rate_mode: Option<RateMode> = None;
    let mut save = false; // --save
    let mut demo = false; // --demo
    let mut dry_run = false; // --dry-run

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(CliExit::Help(usage(&prog))),
            "--tls-ca" | "-t" => {
                tls_ca = it.next();
            }
            "--profile" | "-P" => {
                profile = it.next();
            }
            "--rate-mode" | "-r" => {
                rate_mode = parse_rate_mode(it.next(), &prog)?;
            }
            "--save" => {
                save = true;
            }
            "--demo" => {
                demo = true;
            }
            "--dry-run" => {
                dry_run = true;
            }
            _ if arg.starts_with("--tls-ca=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        tls_ca = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--rate-mode=") => {
                let v = arg.split_once('=').map(|(_, v)| v.to_string());
                rate_mode = parse_rate_mode(v, &prog)?;
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(CliExit::Usage(format!(
                        "Unexpected argument. {}",
                        usage(&prog)
                    )));
                }
            }
        }
    }
    Ok(ParsedArgs {
        url,
        tls_ca,
        profile,
        rate_mode,
        save,
        demo,
        dry_run,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(CliExit::Help(msg)) => {
            println!("{msg}");
            return Ok(());
        }
        Err(CliExit::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    if let Some(path) = init_logging()? {
        eprintln!("logging to {}", path.display());
    }

    // Demo mode short-circuit (ignore other args except the rate mode)
    if parsed.demo || matches!(parsed.profile.as_deref(), Some("demo")) {
        if parsed.dry_run {
            return Ok(());
        }
        return run_demo_mode(parsed.rate_mode.unwrap_or_default()).await;
    }

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        tls_ca: parsed.tls_ca.clone(),
        rate_mode: parsed.rate_mode,
    };
    let resolved = req.resolve(&profiles_file);

    // Determine final connection parameters (and maybe mutated profiles to persist)
    let mut profiles_mut = profiles_file.clone();
    let entry: ProfileEntry = match resolved {
        ResolveProfile::Direct(entry) => {
            if let Some(name) = parsed.profile.as_ref() {
                match profiles_mut.profiles.get(name) {
                    None => {
                        // New profile: auto-save immediately
                        profiles_mut.profiles.insert(name.clone(), entry.clone());
                        persist(&profiles_mut);
                    }
                    Some(existing) if *existing != entry => {
                        let overwrite = parsed.save
                            || prompt_yes_no(&format!(
                                "Overwrite existing profile '{name}'? [y/N]: "
                            ));
                        if overwrite {
                            profiles_mut.profiles.insert(name.clone(), entry.clone());
                            persist(&profiles_mut);
                        }
                    }
                    Some(_) => {}
                }
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(mut names) => {
            // Always add demo option to list
            if !names.iter().any(|n| n == "demo") {
                names.push("demo".into());
            }
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let Some(name) = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
            else {
                return Ok(());
            };
            if name == "demo" {
                return run_demo_mode(parsed.rate_mode.unwrap_or_default()).await;
            }
            match profiles_mut.profiles.get(name) {
                Some(entry) => ProfileEntry {
                    rate_mode: parsed.rate_mode.or(entry.rate_mode),
                    ..entry.clone()
                },
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (ws://HOST:PORT/ws or wss://...): ")?;
            if url.trim().is_empty() {
                return Ok(());
            }
            let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                tls_ca: Some(ca.trim().to_string()).filter(|c| !c.is_empty()),
                rate_mode: parsed.rate_mode,
            };
            profiles_mut.profiles.insert(name, entry.clone());
            persist(&profiles_mut);
            entry
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            eprintln!("{}", usage("sentrytop"));
            return Ok(());
        }
    };

    let rate_mode = entry.rate_mode.unwrap_or_default();
    if parsed.dry_run {
        eprintln!("would connect to {} (rate mode: {rate_mode})", entry.url);
        return Ok(());
    }

    info!(url = %entry.url, %rate_mode, "starting dashboard");
    let mut app = App::new(rate_mode);
    app.run(&entry.url, entry.tls_ca.as_deref()).await
}

fn persist(profiles: &sentrytop::profiles::ProfilesFile) {
    if let Err(e) = save_profiles(profiles) {
        warn!(error = %e, "failed to save profiles");
        eprintln!("warning: could not save profiles: {e}");
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// --- Demo Mode ---

async fn run_demo_mode(rate_mode: RateMode) -> anyhow::Result<()> {
    let feed = spawn_demo_feed(
        0,
        FeedConfig {
            rate_mode,
            ..FeedConfig::default()
        },
    )
    .await?;
    let url = feed.url();
    let mut app = App::new(rate_mode);
    // Dropping the feed stops its server task
    tokio::select! {
        res = app.run(&url, None) => { drop(feed); res }
        _ = tokio::signal::ctrl_c() => {
            drop(feed);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("sentrytop")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_long_short_and_assign_forms() {
        let Ok(p) = parse_args(args(&["-t", "/tmp/ca.pem", "-P", "lab", "-r", "derived", "ws://h:1/ws"]))
        else {
            panic!("parse failed");
        };
        assert_eq!(p.tls_ca.as_deref(), Some("/tmp/ca.pem"));
        assert_eq!(p.profile.as_deref(), Some("lab"));
        assert_eq!(p.rate_mode, Some(RateMode::Derived));
        assert_eq!(p.url.as_deref(), Some("ws://h:1/ws"));

        let Ok(p) = parse_args(args(&["--rate-mode=precomputed", "--profile=x", "--dry-run", "--save"]))
        else {
            panic!("parse failed");
        };
        assert_eq!(p.rate_mode, Some(RateMode::Precomputed));
        assert_eq!(p.profile.as_deref(), Some("x"));
        assert!(p.dry_run && p.save && !p.demo);
    }

    #[test]
    fn rejects_bad_mode_and_extra_positional() {
        assert!(matches!(
            parse_args(args(&["--rate-mode", "fast"])),
            Err(CliExit::Usage(_))
        ));
        assert!(matches!(
            parse_args(args(&["ws://a/ws", "ws://b/ws"])),
            Err(CliExit::Usage(_))
        ));
        assert!(matches!(parse_args(args(&["-h"])), Err(CliExit::Help(_))));
    }
}
