use clap::{Parser, Subcommand};
use nursenote_core::{
    build_prompt, config::visit_data_dir_from_env_value, parse_response, FileVisitRecordStore,
    RecordId, VisitContext, VisitNoteRequest, VisitRecordStore,
};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nursenote")]
#[command(about = "NurseNote visit documentation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse model output into SOAP and care-plan JSON
    Parse {
        /// File holding the model output (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Print the generation prompt for a visit
    Prompt {
        /// Patient name
        name: String,
        /// Primary diagnosis
        diagnosis: String,
        /// Visit date (YYYY-MM-DD)
        date: String,
        /// Start time (HH:MM)
        start: String,
        /// End time (HH:MM)
        end: String,
        /// Attending nurse (repeatable)
        #[arg(long = "nurse")]
        nurses: Vec<String>,
        /// Chief complaint
        #[arg(long, default_value = "")]
        complaint: String,
        /// Subjective notes
        #[arg(short = 's', long = "s-text", default_value = "")]
        s_text: String,
        /// Objective notes
        #[arg(short = 'o', long = "o-text", default_value = "")]
        o_text: String,
    },
    /// List stored visit records
    List,
    /// Show a stored visit record
    Show {
        /// Record id (32 lowercase hex characters)
        id: String,
    },
}

fn read_input(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn record_store() -> FileVisitRecordStore {
    let data_dir = visit_data_dir_from_env_value(std::env::var("VISIT_DATA_DIR").ok());
    FileVisitRecordStore::new(data_dir.join(nursenote_core::constants::RECORDS_DIR_NAME))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Parse { file }) => {
            let text = read_input(file.as_deref())?;
            let parsed = parse_response(&text);
            let missing = parsed.missing_fields();
            if !missing.is_empty() {
                eprintln!("Missing fields: {}", missing.join(", "));
            }
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Some(Commands::Prompt {
            name,
            diagnosis,
            date,
            start,
            end,
            nurses,
            complaint,
            s_text,
            o_text,
        }) => {
            let context = VisitContext::from_request(VisitNoteRequest {
                patient_name: name,
                diagnosis,
                nurses,
                visit_date: date,
                start_time: start,
                end_time: end,
                chief_complaint: complaint,
                s_text,
                o_text,
            })?;
            print!("{}", build_prompt(&context));
        }
        Some(Commands::List) => {
            let records = record_store().list()?;
            if records.is_empty() {
                println!("No visit records found.");
            } else {
                for record in records {
                    println!(
                        "ID: {}, Patient: {}, Visit: {} {}〜{}, Created: {}",
                        record.id,
                        record.patient_name,
                        record.visit_date,
                        record.start_time,
                        record.end_time,
                        record.created_at
                    );
                }
            }
        }
        Some(Commands::Show { id }) => {
            let id = RecordId::parse(&id)?;
            let record = record_store().read(&id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        None => {
            println!("Use --help for available commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_file_argument_is_optional() {
        let cli = Cli::try_parse_from(["nursenote", "parse"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Parse { file: None })));

        let cli = Cli::try_parse_from(["nursenote", "parse", "out.txt"]).unwrap();
        match cli.command {
            Some(Commands::Parse { file: Some(path) }) => {
                assert_eq!(path, PathBuf::from("out.txt"))
            }
            _ => panic!("expected parse with a file"),
        }
    }

    #[test]
    fn test_prompt_collects_repeated_nurses() {
        let cli = Cli::try_parse_from([
            "nursenote",
            "prompt",
            "山田 太郎",
            "統合失調症",
            "2024-01-15",
            "14:00",
            "15:00",
            "--nurse",
            "山田",
            "--nurse",
            "佐藤",
            "--s-text",
            "眠れない",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Prompt {
                nurses,
                s_text,
                o_text,
                ..
            }) => {
                assert_eq!(nurses, ["山田", "佐藤"]);
                assert_eq!(s_text, "眠れない");
                assert_eq!(o_text, "");
            }
            _ => panic!("expected prompt"),
        }
    }

    #[test]
    fn test_read_input_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");
        std::fs::write(&path, "S（主観）\n眠れない").unwrap();

        assert_eq!(read_input(Some(path.as_path())).unwrap(), "S（主観）\n眠れない");
    }

    #[test]
    fn test_read_input_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_input(Some(temp_dir.path().join("absent.txt").as_path())).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
