//! examhall CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "examhall", version, about = "Computer-based-testing platform")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and an example question bank
    Init,

    /// Manage exams
    Exam {
        #[command(subcommand)]
        command: ExamCommands,
    },

    /// Load and validate question banks
    Bank {
        #[command(subcommand)]
        command: BankCommands,
    },

    /// Manage questions
    Question {
        #[command(subcommand)]
        command: QuestionCommands,
    },

    /// Manage teacher accounts
    Teacher {
        #[command(subcommand)]
        command: TeacherCommands,
    },

    /// Manage exam rosters
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },

    /// Start and submit exam sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Inspect recorded results
    Result {
        #[command(subcommand)]
        command: ResultCommands,
    },
}

#[derive(Subcommand)]
enum ExamCommands {
    /// Create a new draft exam
    Create {
        /// Exam title
        #[arg(long)]
        title: String,

        /// Session time limit in minutes (config default if omitted)
        #[arg(long)]
        duration: Option<u32>,

        /// Grouping tag
        #[arg(long)]
        tag: Option<String>,

        /// Teacher API token (the exam becomes teacher-owned)
        #[arg(long)]
        teacher_token: Option<String>,
    },

    /// Open an exam for sessions
    Open {
        /// Exam id
        #[arg(long)]
        exam_id: String,
    },

    /// Close an exam
    Close {
        /// Exam id
        #[arg(long)]
        exam_id: String,
    },

    /// List all exams
    List,
}

#[derive(Subcommand)]
enum BankCommands {
    /// Load a TOML question bank, creating a new exam or filling an existing one
    Load {
        /// Path to the .toml bank file
        #[arg(long)]
        file: PathBuf,

        /// Existing exam to load into (a new exam is created if omitted)
        #[arg(long)]
        exam_id: Option<String>,

        /// Delete the exam's existing questions first
        #[arg(long)]
        overwrite: bool,

        /// Teacher API token
        #[arg(long)]
        teacher_token: Option<String>,
    },

    /// Validate bank files without touching the database
    Validate {
        /// Path to a .toml bank file or a directory of banks
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// Add a question to an exam
    Add {
        /// Exam id
        #[arg(long)]
        exam_id: String,

        /// Question text
        #[arg(long)]
        prompt: String,

        /// Choices in authored order (repeat the flag)
        #[arg(long = "choice", required = true)]
        choices: Vec<String>,

        /// Correct answer as an index ("2") or letter ("C")
        #[arg(long)]
        answer: String,

        /// Teacher API token
        #[arg(long)]
        teacher_token: Option<String>,
    },

    /// List an exam's questions with their answer keys
    List {
        /// Exam id
        #[arg(long)]
        exam_id: String,
    },
}

#[derive(Subcommand)]
enum TeacherCommands {
    /// Register a teacher (pending approval)
    Register {
        /// Login name
        #[arg(long)]
        name: String,

        /// Password
        #[arg(long)]
        password: String,

        /// Subject taught
        #[arg(long)]
        subject: Option<String>,
    },

    /// Approve a pending teacher and issue their API token
    Approve {
        /// Teacher id
        #[arg(long)]
        teacher_id: String,
    },

    /// List teachers awaiting approval
    Pending,

    /// Log in and print the API token
    Login {
        /// Login name
        #[arg(long)]
        name: String,

        /// Password
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum StudentCommands {
    /// Register a student on an exam's roster
    Add {
        /// Exam id
        #[arg(long)]
        exam_id: String,

        /// Student name
        #[arg(long)]
        name: String,
    },

    /// List an exam's roster
    List {
        /// Exam id
        #[arg(long)]
        exam_id: String,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Start a timed session against an open exam
    Start {
        /// Exam id
        #[arg(long)]
        exam_id: String,

        /// Student name
        #[arg(long)]
        name: Option<String>,
    },

    /// Submit answers for a session
    Submit {
        /// Session token
        #[arg(long)]
        token: String,

        /// One answer as question_id=selection (repeat the flag)
        #[arg(long = "answer")]
        answers: Vec<String>,

        /// JSON file mapping question ids to selections
        #[arg(long)]
        answers_json: Option<PathBuf>,

        /// Student name (overrides the name captured at start)
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum ResultCommands {
    /// Show the recorded result for a session
    Show {
        /// Session token
        #[arg(long)]
        token: String,
    },

    /// Scoreboard across a teacher's exams
    Scores {
        /// Teacher API token
        #[arg(long)]
        teacher_token: String,
    },

    /// Summary statistics for one exam
    Stats {
        /// Exam id
        #[arg(long)]
        exam_id: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examhall=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Exam { command } => match command {
            ExamCommands::Create {
                title,
                duration,
                tag,
                teacher_token,
            } => commands::exam::create(config_path, title, duration, tag, teacher_token),
            ExamCommands::Open { exam_id } => commands::exam::open(config_path, exam_id),
            ExamCommands::Close { exam_id } => commands::exam::close(config_path, exam_id),
            ExamCommands::List => commands::exam::list(config_path),
        },
        Commands::Bank { command } => match command {
            BankCommands::Load {
                file,
                exam_id,
                overwrite,
                teacher_token,
            } => commands::bank::load(config_path, file, exam_id, overwrite, teacher_token),
            BankCommands::Validate { file } => commands::bank::validate(file),
        },
        Commands::Question { command } => match command {
            QuestionCommands::Add {
                exam_id,
                prompt,
                choices,
                answer,
                teacher_token,
            } => commands::question::add(
                config_path,
                exam_id,
                prompt,
                choices,
                answer,
                teacher_token,
            ),
            QuestionCommands::List { exam_id } => commands::question::list(config_path, exam_id),
        },
        Commands::Teacher { command } => match command {
            TeacherCommands::Register {
                name,
                password,
                subject,
            } => commands::teacher::register(config_path, name, password, subject),
            TeacherCommands::Approve { teacher_id } => {
                commands::teacher::approve(config_path, teacher_id)
            }
            TeacherCommands::Pending => commands::teacher::pending(config_path),
            TeacherCommands::Login { name, password } => {
                commands::teacher::login(config_path, name, password)
            }
        },
        Commands::Student { command } => match command {
            StudentCommands::Add { exam_id, name } => {
                commands::student::add(config_path, exam_id, name)
            }
            StudentCommands::List { exam_id } => commands::student::list(config_path, exam_id),
        },
        Commands::Session { command } => match command {
            SessionCommands::Start { exam_id, name } => {
                commands::session::start(config_path, exam_id, name)
            }
            SessionCommands::Submit {
                token,
                answers,
                answers_json,
                name,
            } => commands::session::submit(config_path, token, answers, answers_json, name),
        },
        Commands::Result { command } => match command {
            ResultCommands::Show { token } => commands::results::show(config_path, token),
            ResultCommands::Scores { teacher_token } => {
                commands::results::scores(config_path, teacher_token)
            }
            ResultCommands::Stats { exam_id } => commands::results::stats(config_path, exam_id),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
