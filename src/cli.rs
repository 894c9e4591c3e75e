//! Command-line interface definition for therakit
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, data browsing, the activity
//! assistant chat, and enrollment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// therakit - practice management client
///
/// Browse learners, sessions, and goals from a pediatric therapy
/// practice, chat with the activity assistant, and enroll new learners.
#[derive(Parser, Debug, Clone)]
#[command(name = "therakit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the API base URL
    #[arg(long, env = "THERAKIT_API_BASE")]
    pub api_base: Option<String>,

    /// Override the activity log database path
    #[arg(long)]
    pub activity_db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for therakit
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage the stored bearer token
    Auth {
        /// Token management subcommand
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// List learners
    Learners {
        /// Only learners assigned to you
        #[arg(long, conflicts_with = "temp")]
        mine: bool,

        /// Only learners awaiting therapist assignment
        #[arg(long)]
        temp: bool,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a learner's goals
    Goals {
        /// Learner id
        learner_id: String,

        /// Bypass the cache and fetch fresh data
        #[arg(short, long)]
        force: bool,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show or update a learner's assistant preferences
    Prefs {
        /// Learner id
        learner_id: String,

        /// Replace the stored preference text
        #[arg(long, value_name = "TEXT")]
        set: Option<String>,
    },

    /// List therapy sessions
    Sessions {
        /// Only sessions scheduled for today
        #[arg(long)]
        today: bool,

        /// Aggregate sessions by month
        #[arg(long, conflicts_with = "today")]
        summary: bool,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Refresh every collection and report per-collection state
    Refresh,

    /// Chat with the activity assistant about one learner
    Chat {
        /// Learner id
        learner_id: String,

        /// Do not attach recent session notes to messages
        #[arg(long)]
        no_notes: bool,

        /// Do not attach saved AI preferences to messages
        #[arg(long)]
        no_prefs: bool,
    },

    /// Enroll a new learner from a YAML intake form
    Enroll {
        /// Path to the intake form
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Manage supporting documents
    Docs {
        /// Document subcommand
        #[command(subcommand)]
        command: DocsCommand,
    },

    /// Inspect or append to the recent-activity log
    Activity {
        /// Activity subcommand; lists entries when omitted
        #[command(subcommand)]
        command: Option<ActivityCommand>,
    },
}

/// Bearer token management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Store a bearer token in the system keyring
    Login {
        /// Token value; prompts interactively when omitted
        #[arg(long)]
        token: Option<String>,

        /// Token lifetime in seconds from now
        #[arg(long)]
        expires_in: Option<i64>,

        /// Friendly label for the token
        #[arg(long)]
        label: Option<String>,
    },

    /// Remove the stored token
    Logout,

    /// Show whether a usable token is stored
    Status,
}

/// Supporting document subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DocsCommand {
    /// Upload a local file
    Upload {
        /// File to upload
        path: PathBuf,

        /// Learner to attach the document to
        #[arg(long)]
        child_id: Option<String>,
    },

    /// Delete a stored document
    Delete {
        /// File id returned at upload time
        file_id: String,
    },

    /// Fetch a view link for a stored document
    View {
        /// File id returned at upload time
        file_id: String,
    },
}

/// Recent-activity log subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ActivityCommand {
    /// List retained entries, newest first
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Append an entry
    Add {
        /// Entry text
        message: String,

        /// Entry kind: session, assessment, learner, report, or login
        #[arg(long, default_value = "session")]
        kind: String,
    },

    /// Remove every entry
    Clear,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            api_base: None,
            activity_db: None,
            verbose: false,
            command: Commands::Refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, None);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Refresh));
    }

    #[test]
    fn test_cli_parse_learners() {
        let cli = Cli::try_parse_from(["therakit", "learners"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Learners { mine, temp, json } = cli.command {
            assert!(!mine);
            assert!(!temp);
            assert!(!json);
        } else {
            panic!("Expected Learners command");
        }
    }

    #[test]
    fn test_cli_parse_learners_mine() {
        let cli = Cli::try_parse_from(["therakit", "learners", "--mine"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Learners { mine, temp, json: _ } = cli.command {
            assert!(mine);
            assert!(!temp);
        } else {
            panic!("Expected Learners command");
        }
    }

    #[test]
    fn test_cli_parse_learners_mine_and_temp_conflict() {
        let cli = Cli::try_parse_from(["therakit", "learners", "--mine", "--temp"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_goals() {
        let cli = Cli::try_parse_from(["therakit", "goals", "child-1", "--force"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Goals {
            learner_id,
            force,
            json,
        } = cli.command
        {
            assert_eq!(learner_id, "child-1");
            assert!(force);
            assert!(!json);
        } else {
            panic!("Expected Goals command");
        }
    }

    #[test]
    fn test_cli_parse_goals_requires_learner_id() {
        let cli = Cli::try_parse_from(["therakit", "goals"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_prefs_show_and_set() {
        let cli = Cli::try_parse_from(["therakit", "prefs", "child-1"]).unwrap();
        if let Commands::Prefs { learner_id, set } = cli.command {
            assert_eq!(learner_id, "child-1");
            assert_eq!(set, None);
        } else {
            panic!("Expected Prefs command");
        }

        let cli = Cli::try_parse_from([
            "therakit",
            "prefs",
            "child-1",
            "--set",
            "Short visual prompts work best",
        ])
        .unwrap();
        if let Commands::Prefs { set, .. } = cli.command {
            assert_eq!(set, Some("Short visual prompts work best".to_string()));
        } else {
            panic!("Expected Prefs command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_flags() {
        let cli = Cli::try_parse_from(["therakit", "sessions", "--today", "--json"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Sessions {
            today,
            summary,
            json,
        } = cli.command
        {
            assert!(today);
            assert!(!summary);
            assert!(json);
        } else {
            panic!("Expected Sessions command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_today_and_summary_conflict() {
        let cli = Cli::try_parse_from(["therakit", "sessions", "--today", "--summary"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_refresh() {
        let cli = Cli::try_parse_from(["therakit", "refresh"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Refresh));
    }

    #[test]
    fn test_cli_parse_chat() {
        let cli = Cli::try_parse_from(["therakit", "chat", "child-1", "--no-notes"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Chat {
            learner_id,
            no_notes,
            no_prefs,
        } = cli.command
        {
            assert_eq!(learner_id, "child-1");
            assert!(no_notes);
            assert!(!no_prefs);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_chat_requires_learner_id() {
        let cli = Cli::try_parse_from(["therakit", "chat"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_auth_login_with_token() {
        let cli = Cli::try_parse_from([
            "therakit",
            "auth",
            "login",
            "--token",
            "secret",
            "--expires-in",
            "3600",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Auth { command } = cli.command {
            if let AuthCommand::Login {
                token,
                expires_in,
                label,
            } = command
            {
                assert_eq!(token, Some("secret".to_string()));
                assert_eq!(expires_in, Some(3600));
                assert_eq!(label, None);
            } else {
                panic!("Expected Login command");
            }
        } else {
            panic!("Expected Auth command");
        }
    }

    #[test]
    fn test_cli_parse_auth_logout_and_status() {
        let cli = Cli::try_parse_from(["therakit", "auth", "logout"]).unwrap();
        if let Commands::Auth { command } = cli.command {
            assert!(matches!(command, AuthCommand::Logout));
        } else {
            panic!("Expected Auth command");
        }

        let cli = Cli::try_parse_from(["therakit", "auth", "status"]).unwrap();
        if let Commands::Auth { command } = cli.command {
            assert!(matches!(command, AuthCommand::Status));
        } else {
            panic!("Expected Auth command");
        }
    }

    #[test]
    fn test_cli_parse_enroll_requires_file() {
        let cli = Cli::try_parse_from(["therakit", "enroll"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["therakit", "enroll", "--file", "intake.yaml"]);
        assert!(cli.is_ok());
        if let Commands::Enroll { file } = cli.unwrap().command {
            assert_eq!(file, PathBuf::from("intake.yaml"));
        } else {
            panic!("Expected Enroll command");
        }
    }

    #[test]
    fn test_cli_parse_docs_upload() {
        let cli = Cli::try_parse_from([
            "therakit",
            "docs",
            "upload",
            "evaluation.pdf",
            "--child-id",
            "child-1",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Docs { command } = cli.command {
            if let DocsCommand::Upload { path, child_id } = command {
                assert_eq!(path, PathBuf::from("evaluation.pdf"));
                assert_eq!(child_id, Some("child-1".to_string()));
            } else {
                panic!("Expected Upload command");
            }
        } else {
            panic!("Expected Docs command");
        }
    }

    #[test]
    fn test_cli_parse_docs_delete_and_view() {
        let cli = Cli::try_parse_from(["therakit", "docs", "delete", "file-9"]).unwrap();
        if let Commands::Docs { command } = cli.command {
            if let DocsCommand::Delete { file_id } = command {
                assert_eq!(file_id, "file-9");
            } else {
                panic!("Expected Delete command");
            }
        } else {
            panic!("Expected Docs command");
        }

        let cli = Cli::try_parse_from(["therakit", "docs", "view", "file-9"]).unwrap();
        if let Commands::Docs { command } = cli.command {
            assert!(matches!(command, DocsCommand::View { .. }));
        } else {
            panic!("Expected Docs command");
        }
    }

    #[test]
    fn test_cli_parse_activity_defaults_to_list() {
        let cli = Cli::try_parse_from(["therakit", "activity"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Activity { command } = cli.command {
            assert!(command.is_none());
        } else {
            panic!("Expected Activity command");
        }
    }

    #[test]
    fn test_cli_parse_activity_add_with_kind() {
        let cli = Cli::try_parse_from([
            "therakit",
            "activity",
            "add",
            "Completed session with Maya",
            "--kind",
            "session",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Activity { command } = cli.command {
            if let Some(ActivityCommand::Add { message, kind }) = command {
                assert_eq!(message, "Completed session with Maya");
                assert_eq!(kind, "session");
            } else {
                panic!("Expected Add command");
            }
        } else {
            panic!("Expected Activity command");
        }
    }

    #[test]
    fn test_cli_parse_activity_add_default_kind() {
        let cli = Cli::try_parse_from(["therakit", "activity", "add", "note"]).unwrap();
        if let Commands::Activity {
            command: Some(ActivityCommand::Add { kind, .. }),
        } = cli.command
        {
            assert_eq!(kind, "session");
        } else {
            panic!("Expected Activity add command");
        }
    }

    #[test]
    fn test_cli_parse_activity_clear() {
        let cli = Cli::try_parse_from(["therakit", "activity", "clear"]).unwrap();
        if let Commands::Activity { command } = cli.command {
            assert!(matches!(command, Some(ActivityCommand::Clear)));
        } else {
            panic!("Expected Activity command");
        }
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "therakit",
            "--config",
            "custom.yaml",
            "--api-base",
            "https://staging.practice.example.com",
            "refresh",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
        assert_eq!(
            cli.api_base,
            Some("https://staging.practice.example.com".to_string())
        );
    }

    #[test]
    fn test_cli_parse_with_verbose() {
        let cli = Cli::try_parse_from(["therakit", "-v", "refresh"]);
        assert!(cli.is_ok());
        assert!(cli.unwrap().verbose);
    }

    #[test]
    fn test_cli_parse_activity_db_override() {
        let cli = Cli::try_parse_from(["therakit", "--activity-db", "/tmp/audit.db", "activity"]);
        assert!(cli.is_ok());
        assert_eq!(
            cli.unwrap().activity_db,
            Some(PathBuf::from("/tmp/audit.db"))
        );
    }

    #[test]
    fn test_cli_parse_missing_command() {
        let cli = Cli::try_parse_from(["therakit"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        let cli = Cli::try_parse_from(["therakit", "invalid"]);
        assert!(cli.is_err());
    }
}
