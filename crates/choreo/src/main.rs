use choreo::ImageRef;
use choreo::layout::{self, Layout, LayoutParams};
use choreo::remote::{Command, SOCKET_PATH};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "choreo", version, about = "Remote control for the tinsel viewer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Gather the cards into the tree.
    Formed,
    /// Burst the cards out into the carousel.
    Chaos,
    /// Switch between tree and carousel.
    Toggle,
    /// Report whether both hands are raised (selects the card nearest the camera).
    Hands { state: Switch },
    /// Report the tracked hand position, normalized to 0..1, or `off` when lost.
    Pointer {
        x: String,
        y: Option<f32>,
    },
    /// Replace the displayed photos.
    Load { paths: Vec<PathBuf> },
    /// Re-read the viewer's config file.
    Reload,
    /// Print the tree and carousel positions for `count` cards.
    Layout { count: usize },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Switch {
    On,
    Off,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Formed => Command::Mode(Layout::Formed),
        Commands::Chaos => Command::Mode(Layout::Chaos),
        Commands::Toggle => Command::Toggle,
        Commands::Hands { state } => Command::Hands(matches!(state, Switch::On)),
        Commands::Pointer { x, y } => pointer_command(&x, y)?,
        Commands::Load { paths } => Command::Load(
            paths
                .iter()
                .map(|p| absolute(p).map(|p| ImageRef::new(p.to_string_lossy())))
                .collect::<anyhow::Result<_>>()?,
        ),
        Commands::Reload => Command::Reload,
        Commands::Layout { count } => {
            print_layout(count);
            return Ok(());
        }
    };

    send_command(&command)
}

fn pointer_command(x: &str, y: Option<f32>) -> anyhow::Result<Command> {
    match (x, y) {
        ("off", None) => Ok(Command::Pointer(None)),
        (x, Some(y)) => {
            let x: f32 = x
                .parse()
                .map_err(|_| anyhow::anyhow!("pointer x must be a number, got '{}'", x))?;
            Ok(Command::Pointer(Some((x, y))))
        }
        _ => anyhow::bail!("usage: choreo pointer <x> <y> | choreo pointer off"),
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn print_layout(count: usize) {
    let positions = layout::generate(count, &LayoutParams::default());
    println!("{:>4}  {:>26}  {:>26}", "id", "formed", "chaos");
    for (i, (f, c)) in positions.formed.iter().zip(&positions.chaos).enumerate() {
        println!(
            "{:>4}  ({:>7.3}, {:>6.3}, {:>7.3})  ({:>7.3}, {:>6.3}, {:>7.3})",
            i, f.x, f.y, f.z, c.x, c.y, c.z
        );
    }
}

fn send_command(cmd: &Command) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to tinsel at {}: {}. Is tinsel running?",
            SOCKET_PATH,
            e
        )
    })?;

    log::debug!("Sending '{}'", cmd);
    writeln!(stream, "{}", cmd)?;
    Ok(())
}
