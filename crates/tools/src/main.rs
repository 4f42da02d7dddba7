use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mission::{
    mission_names, DrawEvent, GeometryCapture, HttpMissionRepository, MissionRepository,
    MissionSubmissionService, NullOverlay, RepositoryError, ShapeStage,
};

#[derive(Parser)]
#[command(name = "mission", about = "Stage drawn shapes and submit them as missions")]
struct Cli {
    /// Base URL of the mission server.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON draw-event log into the stage and submit it as one mission.
    Submit {
        /// Path to a JSON array of draw events.
        events: PathBuf,
        /// Mission name stamped on every staged shape.
        #[arg(long)]
        name: String,
    },
    /// List persisted missions and their shape counts.
    List,
    /// Delete every shape persisted under a mission name.
    Delete { name: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let repository = HttpMissionRepository::new(cli.server);

    match cli.command {
        Command::Submit { events, name } => {
            let text = tokio::fs::read_to_string(&events)
                .await
                .map_err(|e| format!("failed to read {events:?}: {e}"))?;
            let events: Vec<DrawEvent> =
                serde_json::from_str(&text).map_err(|e| format!("invalid event log: {e}"))?;
            let total = events.len();

            let mut stage = ShapeStage::new();
            let mut capture = GeometryCapture::new(NullOverlay);
            for event in events {
                capture.on_draw_complete(&mut stage, event);
            }
            let staged = stage.len();
            if staged < total {
                eprintln!("skipped {} unrecognized event(s)", total - staged);
            }

            let mut service = MissionSubmissionService::new(repository);
            let receipt = service
                .submit(&mut stage, &name)
                .await
                .map_err(|e| e.to_string())?;
            println!(
                "submitted {} shape(s) under {:?}",
                receipt.count(),
                receipt.mission_name
            );
        }
        Command::List => {
            let shapes = repository
                .list_missions()
                .await
                .map_err(|e| e.to_string())?;
            for name in mission_names(&shapes) {
                let count = shapes
                    .iter()
                    .filter(|s| s.mission_name.as_deref() == Some(name.as_str()))
                    .count();
                println!("{name}: {count} shape(s)");
            }
        }
        Command::Delete { name } => match repository.delete_mission(&name).await {
            Ok(deleted) => println!("deleted {deleted} shape(s) from {name:?}"),
            Err(RepositoryError::NotFound { mission }) => {
                return Err(format!("mission {mission:?} not found"));
            }
            Err(e) => return Err(e.to_string()),
        },
    }

    Ok(())
}
