use crate::admin::{
    activate_questionnaire, import_profiles, import_questions, purge, seed_default_profiles,
    ActivateArgs, ProfileImportArgs, QuestionImportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mbti_survey::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "mbti-survey",
    about = "Serve the MBTI personality survey and manage its question bank",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Import test questions from a CSV export
    Questions {
        #[command(subcommand)]
        command: QuestionsCommand,
    },
    /// Manage the per-type profile texts shown on result pages
    Profiles {
        #[command(subcommand)]
        command: ProfilesCommand,
    },
    /// Switch the questionnaire served to respondents
    Questionnaire {
        #[command(subcommand)]
        command: QuestionnaireCommand,
    },
    /// Delete every stored response and result
    Purge,
}

#[derive(Subcommand, Debug)]
enum QuestionsCommand {
    /// Upsert questions into a questionnaire and make it the active one
    Import(QuestionImportArgs),
}

#[derive(Subcommand, Debug)]
enum ProfilesCommand {
    /// Upsert type profiles keyed by their four-letter code
    Import(ProfileImportArgs),
    /// Insert the sixteen built-in profiles without overwriting existing rows
    Defaults,
}

#[derive(Subcommand, Debug)]
enum QuestionnaireCommand {
    /// Activate a questionnaire by key and deactivate all others
    Activate(ActivateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Questions {
            command: QuestionsCommand::Import(args),
        } => import_questions(args).await,
        Command::Profiles {
            command: ProfilesCommand::Import(args),
        } => import_profiles(args).await,
        Command::Profiles {
            command: ProfilesCommand::Defaults,
        } => seed_default_profiles().await,
        Command::Questionnaire {
            command: QuestionnaireCommand::Activate(args),
        } => activate_questionnaire(args).await,
        Command::Purge => purge().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["mbti-survey"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn questions_import_defaults_the_key() {
        let cli = Cli::try_parse_from(["mbti-survey", "questions", "import", "--csv", "bank.csv"])
            .expect("parses");
        match cli.command {
            Some(Command::Questions {
                command: QuestionsCommand::Import(args),
            }) => {
                assert_eq!(args.csv.to_str(), Some("bank.csv"));
                assert_eq!(args.key, mbti_survey::survey::seed::DEFAULT_QUESTIONNAIRE_KEY);
                assert!(args.name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn activate_requires_a_key() {
        assert!(Cli::try_parse_from(["mbti-survey", "questionnaire", "activate"]).is_err());
        assert!(
            Cli::try_parse_from(["mbti-survey", "questionnaire", "activate", "--key", "v2"])
                .is_ok()
        );
    }
}
