use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use userprofiles::client::api::DEFAULT_API_URL;
use userprofiles::client::{ApiFailure, HttpProfileApi, Notifier, ProfileApi, ProfileShell, SubmitOutcome};
use userprofiles::validation::Field;

#[derive(Parser)]
#[command(name = "profilectl", about = "Manage user profiles on a profile service")]
struct Cli {
    #[arg(long, env = "PROFILES_API_URL", default_value = DEFAULT_API_URL, help = "Base URL of the profile service")]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all profiles
    List,
    /// Show one profile
    Show { id: i64 },
    /// Create a profile
    Create(FieldArgs),
    /// Edit a profile; only the given fields change
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a profile
    Delete {
        id: i64,
        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Args, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long = "avatar-url")]
    avatar_url: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    website: Option<String>,
}

impl FieldArgs {
    fn changes(self) -> Vec<(Field, String)> {
        [
            (Field::Name, self.name),
            (Field::Email, self.email),
            (Field::Bio, self.bio),
            (Field::AvatarUrl, self.avatar_url),
            (Field::Phone, self.phone),
            (Field::Location, self.location),
            (Field::Website, self.website),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

struct Console {
    assume_yes: bool,
}

impl Notifier for Console {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", question);
        let _ = io::stderr().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn submit(shell: &mut ProfileShell<HttpProfileApi>, changes: Vec<(Field, String)>) -> ExitCode {
    let mut ui = Console { assume_yes: false };
    if let Some(form) = shell.form_mut() {
        for (field, value) in changes {
            form.change(field, value);
        }
    }

    match shell.submit_form(&mut ui) {
        SubmitOutcome::Saved(profile) => {
            println!("Saved profile {}", profile.id);
            ExitCode::SUCCESS
        }
        SubmitOutcome::Invalid | SubmitOutcome::Rejected => {
            if let Some(form) = shell.form() {
                for (field, message) in form.errors().iter() {
                    eprintln!("{}: {}", field, message);
                }
            }
            ExitCode::FAILURE
        }
        SubmitOutcome::Failed | SubmitOutcome::Ignored => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut shell = ProfileShell::new(HttpProfileApi::new(&cli.api_url));

    match cli.command {
        Command::List => {
            if !shell.refresh() {
                eprintln!("Error fetching profiles from {}", cli.api_url);
                return ExitCode::FAILURE;
            }
            print!("{}", shell.render_list());
            if !shell.profiles().is_empty() {
                println!();
            }
            ExitCode::SUCCESS
        }
        Command::Show { id } => match shell.api().get(id) {
            Ok(profile) => match serde_json::to_string_pretty(&profile) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::Create(fields) => {
            shell.open_create();
            submit(&mut shell, fields.changes())
        }
        Command::Edit { id, fields } => {
            match shell.open_edit_fetched(id) {
                Ok(()) => submit(&mut shell, fields.changes()),
                Err(ApiFailure::Rejected { status: 404, .. }) => {
                    eprintln!("Profile not found with id: {}", id);
                    ExitCode::FAILURE
                }
                Err(e) => {
                    eprintln!("Error fetching profile {}: {}", id, e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Delete { id, yes } => {
            let mut ui = Console { assume_yes: yes };
            if shell.delete(id, &mut ui) {
                println!("Deleted profile {}", id);
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn only_given_fields_change() {
        let cli = Cli::try_parse_from([
            "profilectl",
            "--api-url",
            "http://127.0.0.1:9",
            "edit",
            "3",
            "--bio",
            "",
            "--avatar-url",
            "https://example.com/a.png",
        ])
        .unwrap();
        let Command::Edit { id, fields } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(id, 3);
        assert_eq!(
            fields.changes(),
            vec![
                (Field::Bio, String::new()),
                (Field::AvatarUrl, "https://example.com/a.png".to_string()),
            ]
        );
    }
}
