mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;

use cmis_xml::codec::{deserialize, serialize, serialize_into, Options};
use cmis_xml::enums::AllowableAction;
use cmis_xml::message::Message;

use config::read_config;

const DEFAULT_CONFIG: &str = "cmis-tool.toml";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Output formatting, see the [output] section. A missing default file is not an error.
    #[clap(short, long, env = "CMIS_TOOL_CONFIG")]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a message and print a summary of it
    Inspect {
        file: PathBuf,
    },
    /// Decode a message and write it back with the configured formatting
    Normalize {
        file: PathBuf,

        /// Write to this file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that messages survive a decode/encode/decode cycle
    Check {
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the wire names of all allowable actions
    Actions,
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "cmis_tool=info,cmis_xml=info")
    }

    // Abort on panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("{}", panic_info);
        eprintln!("{:?}", backtrace::Backtrace::new());
        std::process::abort();
    }));

    tracer();

    let args = Args::parse();
    let config = match args.config_file {
        Some(path) => read_config(path, false)?,
        None => read_config(PathBuf::from(DEFAULT_CONFIG), true)?,
    };
    let opts = config.output.options()?;

    match args.command {
        Command::Inspect { file } => inspect(file).await,
        Command::Normalize { file, output } => normalize(file, output, &opts).await,
        Command::Check { files } => check(files, &opts).await,
        Command::Actions => {
            for action in AllowableAction::ALL {
                println!("{}", action.value());
            }
            Ok(())
        }
    }
}

fn tracer() {
    tracing_subscriber::fmt::init();
}

async fn load(file: &PathBuf) -> Result<Message> {
    let src = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("unable to read {}", file.display()))?;
    let msg = deserialize::<Message>(&src)
        .await
        .with_context(|| format!("{} is not a CMIS message", file.display()))?;
    Ok(msg)
}

async fn inspect(file: PathBuf) -> Result<()> {
    let msg = load(&file).await?;

    println!("message: {}", msg.name());
    if let Some(repo) = msg.repository_id() {
        println!("repository: {}", repo);
    }
    if let Message::Fault(fault) = &msg {
        println!("fault: {} ({})", fault.kind, fault.code);
        println!("reason: {}", fault.message);
    }

    let objects = msg.objects();
    if !objects.is_empty() {
        let all = objects.iter().flat_map(|o| o.walk()).collect::<Vec<_>>();
        let props: usize = all
            .iter()
            .filter_map(|o| o.properties.as_ref())
            .map(|p| p.properties.len())
            .sum();
        println!("objects: {} ({} with descendants)", objects.len(), all.len());
        println!("properties: {}", props);
        for id in all.iter().filter_map(|o| o.object_id()) {
            println!("  {}", id);
        }
    }
    Ok(())
}

async fn normalize(file: PathBuf, output: Option<PathBuf>, opts: &Options) -> Result<()> {
    let msg = load(&file).await?;
    match output {
        Some(path) => {
            let out = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("unable to create {}", path.display()))?;
            serialize_into(&msg, out, opts).await?;
            tracing::info!(message = msg.name(), path = %path.display(), "normalized");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            serialize_into(&msg, &mut stdout, opts).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

async fn check_one(file: &PathBuf, opts: &Options) -> Result<&'static str> {
    let first = load(file).await?;
    let encoded = serialize(&first, opts).await?;
    let second = deserialize::<Message>(&encoded)
        .await
        .context("re-encoded message does not decode")?;
    if first != second {
        tracing::debug!(before = ?first, after = ?second, "values differ");
        bail!("value changed after re-encoding");
    }
    Ok(first.name())
}

async fn check(files: Vec<PathBuf>, opts: &Options) -> Result<()> {
    let results =
        futures::future::join_all(files.iter().map(|file| check_one(file, opts))).await;

    let mut failed = 0;
    for (file, res) in files.iter().zip(results) {
        match res {
            Ok(name) => tracing::info!(file = %file.display(), message = name, "ok"),
            Err(e) => {
                failed += 1;
                tracing::error!(file = %file.display(), err = ?e, "check failed");
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} messages failed the check", failed, files.len());
    }
    Ok(())
}
