use clap::Subcommand;
use todopro_core::{Database, SessionStore};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List all recorded sessions as JSON, oldest first
    List {
        /// Only completed sessions
        #[arg(long)]
        completed: bool,
    },
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionsAction::List { completed } => {
            let store = SessionStore::open(Database::open()?);
            let sessions: Vec<_> = store
                .list_all()
                .iter()
                .filter(|s| !completed || s.completed)
                .collect();
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
